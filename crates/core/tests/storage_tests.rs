// ═══════════════════════════════════════════════════════════════════
// Storage Tests: TTL cache, JSON repair, holdings file loading
// ═══════════════════════════════════════════════════════════════════

use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::models::holding::fields;
use portfolio_dashboard_core::storage::cache::{spawn_sweeper, TtlCache};
use portfolio_dashboard_core::storage::holdings_file::HoldingsFile;
use portfolio_dashboard_core::storage::repair::parse_lenient;
use std::sync::Arc;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════
// TtlCache
// ═══════════════════════════════════════════════════════════════════

mod ttl_cache {
    use super::*;

    #[test]
    fn get_returns_stored_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("TCS.NS", 42);
        assert_eq!(cache.get("TCS.NS"), Some(42));
        assert_eq!(cache.get("INFY.NS"), None);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("TCS.NS", 1);
        assert_eq!(cache.get("tcs.ns"), None);
    }

    #[test]
    fn set_replaces_previous_entry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("A", 1);
        cache.insert("A", 2);
        assert_eq!(cache.get("A"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_reads_as_missing() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("A", 1, Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("A"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_never_serves() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("A", 1);
        assert_eq!(cache.get("A"), None);
    }

    #[test]
    fn oversized_ttl_never_expires() {
        let cache = TtlCache::new(Duration::from_secs(u64::MAX));
        cache.insert("TCS.NS", 1);
        cache.set("INFY.NS", 2, Duration::MAX);
        assert_eq!(cache.get("TCS.NS"), Some(1));
        assert_eq!(cache.get("INFY.NS"), Some(2));
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn purge_counts_removed_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("short", 1, Duration::from_millis(10));
        cache.insert("long", 2);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[test]
    fn clear_drops_everything() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("A", 1);
        cache.insert("B", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("A"), None);
    }

    #[tokio::test]
    async fn sweeper_evicts_in_background() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        cache.set("A", 1, Duration::from_millis(10));
        cache.insert("B", 2);

        let handle = spawn_sweeper("test", &cache, Duration::from_millis(20)).unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        // `len` ignores expired entries, so check through purge instead.
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.get("B"), Some(2));
        handle.abort();
    }

    #[tokio::test]
    async fn sweeper_stops_when_cache_dropped() {
        let cache = Arc::new(TtlCache::<u32>::new(Duration::from_secs(60)));
        let handle = spawn_sweeper("test", &cache, Duration::from_millis(10)).unwrap();
        drop(cache);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should exit")
            .unwrap();
    }

    #[tokio::test]
    async fn zero_interval_spawns_nothing() {
        let cache = Arc::new(TtlCache::<u32>::new(Duration::from_secs(60)));
        assert!(spawn_sweeper("test", &cache, Duration::ZERO).is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// JSON repair
// ═══════════════════════════════════════════════════════════════════

mod repair {
    use super::*;

    fn parses(text: &str) -> serde_json::Value {
        parse_lenient(text).expect("repaired text should parse")
    }

    #[test]
    fn strips_comments() {
        let v = parses("[\n  // first\n  {\"a\": 1}, # second\n  /* third */ {\"a\": 2}\n]");
        assert_eq!(v.as_array().unwrap().len(), 2);
    }

    #[test]
    fn strips_trailing_commas() {
        let v = parses(r#"[{"a": 1, "b": [1, 2, ], }, ]"#);
        assert_eq!(v[0]["b"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn bare_nan_tokens_become_null() {
        let v = parses(r#"[{"a": NaN, "b": -Infinity, "c": undefined}]"#);
        assert!(v[0]["a"].is_null());
        assert!(v[0]["b"].is_null());
        assert!(v[0]["c"].is_null());
    }

    #[test]
    fn control_characters_are_removed() {
        let v = parses("[{\"name\": \"Tata\u{0007}Power\"}]\u{0000}");
        assert_eq!(v[0]["name"], "Tata Power");
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let v = parses("\u{feff}[]");
        assert!(v.as_array().unwrap().is_empty());
    }

    #[test]
    fn unquoted_keys_and_single_quotes() {
        let v = parses("{holdings: [{'Particulars': 'Infosys', 'CMP': +1500.5,}]}");
        assert_eq!(v["holdings"][0]["Particulars"], "Infosys");
        assert_eq!(v["holdings"][0]["CMP"], 1500.5);
    }

    #[test]
    fn string_contents_are_untouched() {
        let v = parses(r#"[{"note": "NaN, // not a comment,]"}, ]"#);
        assert_eq!(v[0]["note"], "NaN, // not a comment,]");
    }
}

// ═══════════════════════════════════════════════════════════════════
// HoldingsFile
// ═══════════════════════════════════════════════════════════════════

mod holdings_file {
    use super::*;

    #[test]
    fn parses_top_level_array() {
        let holdings = HoldingsFile::parse(r#"[{"Particulars": "TCS", "Qty": 2}]"#).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].number(fields::QTY), Some(2.0));
    }

    #[test]
    fn parses_holdings_wrapper_object() {
        let holdings =
            HoldingsFile::parse(r#"{"holdings": [{"Particulars": "TCS"}, {"Particulars": "Infosys"}]}"#)
                .unwrap();
        assert_eq!(holdings.len(), 2);
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(HoldingsFile::parse("[]").unwrap().is_empty());
    }

    #[test]
    fn repairs_almost_json() {
        let text = "[\n  {\"Particulars\": \"TCS\", \"CMP\": NaN,}, // exported\n]";
        let holdings = HoldingsFile::parse(text).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].number(fields::CMP), None);
    }

    #[test]
    fn unrepairable_text_is_invalid() {
        let err = HoldingsFile::parse("not json at all").unwrap_err();
        assert!(matches!(err, CoreError::InvalidHoldingsFile(_)));
    }

    #[test]
    fn wrong_shape_is_invalid() {
        assert!(matches!(
            HoldingsFile::parse(r#"{"stocks": []}"#),
            Err(CoreError::InvalidHoldingsFile(_))
        ));
        assert!(matches!(
            HoldingsFile::parse("42"),
            Err(CoreError::InvalidHoldingsFile(_))
        ));
    }

    #[test]
    fn non_object_element_is_invalid() {
        let err = HoldingsFile::parse(r#"[{"Particulars": "TCS"}, "oops"]"#).unwrap_err();
        assert!(err.to_string().contains("holding #1 is a string"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut bytes = br#"[{"Particulars": "TCS"#.to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(br#""}]"#);
        let holdings = HoldingsFile::load_from_bytes(&bytes).unwrap();
        assert_eq!(holdings.len(), 1);
    }

    #[tokio::test]
    async fn load_from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        std::fs::write(&path, r#"[{"Particulars": "Infosys", "Qty": 10}]"#).unwrap();

        let holdings = HoldingsFile::load_from_file(&path).await.unwrap();
        assert_eq!(holdings[0].display_name(), Some("Infosys".into()));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HoldingsFile::load_from_file(dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }
}
