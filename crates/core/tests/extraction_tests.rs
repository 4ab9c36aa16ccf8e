// ═══════════════════════════════════════════════════════════════════
// Metric Extraction Tests: individual extractors, fallback order,
// embedded data blocks
// ═══════════════════════════════════════════════════════════════════

use portfolio_dashboard_core::services::metric_extraction::{
    earnings_extractors, extract_metrics, pe_extractors, scan_data_blocks, Metric, PageContent,
};

fn attempt(name: &str, html: &str) -> Option<f64> {
    let page = PageContent::new(html);
    pe_extractors()
        .iter()
        .chain(earnings_extractors())
        .find(|e| e.name() == name)
        .unwrap_or_else(|| panic!("no extractor named {name}"))
        .attempt(&page)
}

// ═══════════════════════════════════════════════════════════════════
// Extractor registry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn pe_chain_order() {
        let names: Vec<&str> = pe_extractors().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["pe_label", "pe_ratio_label", "pe_field"]);
        assert!(pe_extractors().iter().all(|e| e.metric() == Metric::Pe));
    }

    #[test]
    fn earnings_chain_order() {
        let names: Vec<&str> = earnings_extractors().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["earnings_label", "eps_label", "earnings_field", "recent_earnings_label"]
        );
        assert!(earnings_extractors()
            .iter()
            .all(|e| e.metric() == Metric::Earnings));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Individual extractors
// ═══════════════════════════════════════════════════════════════════

mod individual {
    use super::*;

    #[test]
    fn pe_label_across_tags() {
        let html = r#"<div class="gyFHrc"><span>P/E ratio</span><div class="tip">The ratio of current share price to trailing earnings</div><div class="P6K39c">31.25</div></div>"#;
        assert_eq!(attempt("pe_label", html), Some(31.25));
    }

    #[test]
    fn pe_ratio_label_without_slash() {
        assert_eq!(attempt("pe_ratio_label", "<td>PE Ratio</td><td>18.7</td>"), Some(18.7));
        assert_eq!(attempt("pe_label", "<td>PE Ratio</td><td>18.7</td>"), None);
    }

    #[test]
    fn pe_field_in_markup() {
        let html = r#"<script>window.data = {"trailingPE": "22.5"};</script>"#;
        assert_eq!(attempt("pe_field", html), Some(22.5));
    }

    #[test]
    fn earnings_label_is_case_sensitive() {
        assert_eq!(attempt("earnings_label", "<p>Earnings</p><p>1,234.5</p>"), Some(1234.5));
        assert_eq!(attempt("earnings_label", "<p>earnings 99</p>"), None);
    }

    #[test]
    fn eps_label() {
        assert_eq!(attempt("eps_label", "<span>EPS</span> <span>-4.2</span>"), Some(-4.2));
    }

    #[test]
    fn earnings_field_in_markup() {
        assert_eq!(attempt("earnings_field", r#"{"latestEarnings": 812}"#), Some(812.0));
    }

    #[test]
    fn recent_earnings_label() {
        assert_eq!(
            attempt("recent_earnings_label", "<h3>recent earnings</h3><div>77.1</div>"),
            Some(77.1)
        );
    }

    #[test]
    fn label_too_far_from_value_misses() {
        let filler = "x".repeat(400);
        let html = format!("<div>P/E</div><div>{filler}</div><div>12</div>");
        assert_eq!(attempt("pe_label", &html), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// extract_metrics
// ═══════════════════════════════════════════════════════════════════

mod extract {
    use super::*;

    #[test]
    fn finds_both_metrics() {
        let html = "<div>P/E ratio</div><div>24.10</div><div>Earnings</div><div>5,600.00</div>";
        let m = extract_metrics(html);
        assert_eq!(m.pe, Some(24.1));
        assert_eq!(m.earnings, Some(5600.0));
    }

    #[test]
    fn first_extractor_wins() {
        let html = "<div>P/E 10</div><div>PE ratio 20</div>";
        assert_eq!(extract_metrics(html).pe, Some(10.0));
    }

    #[test]
    fn later_extractor_used_when_earlier_misses() {
        let html = "<div>PE ratio 20</div>";
        assert_eq!(extract_metrics(html).pe, Some(20.0));
    }

    #[test]
    fn script_text_is_not_visible_text() {
        let html = "<script>var label = 'P/E 99';</script><div>nothing here</div>";
        assert_eq!(extract_metrics(html).pe, None);
    }

    #[test]
    fn entities_are_decoded() {
        let html = "<div>P&#x2F;E&nbsp;ratio</div><div>15.5</div>";
        assert_eq!(extract_metrics(html).pe, Some(15.5));
    }

    #[test]
    fn page_without_figures_is_empty() {
        let m = extract_metrics("<html><body>Quote not found</body></html>");
        assert!(m.is_empty());
        assert!(extract_metrics("").is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Embedded data blocks
// ═══════════════════════════════════════════════════════════════════

mod data_blocks {
    use super::*;

    const BLOCK: &str = r#"<script>AF_initDataCallback({key: 'ds:1', data: [["ratio", 19.8], ["mcap", 1000]]});</script>"#;

    #[test]
    fn scan_returns_first_pair() {
        assert_eq!(scan_data_blocks(BLOCK), Some(19.8));
    }

    #[test]
    fn other_scripts_are_ignored() {
        let html = r#"<script>var x = {"ratio": 5};</script>"#;
        assert_eq!(scan_data_blocks(html), None);
    }

    #[test]
    fn block_fills_missing_pe_first() {
        let m = extract_metrics(BLOCK);
        assert_eq!(m.pe, Some(19.8));
        assert_eq!(m.earnings, None);
    }

    #[test]
    fn block_fills_earnings_when_pe_found() {
        let html = format!("<div>P/E 12.5</div>{BLOCK}");
        let m = extract_metrics(&html);
        assert_eq!(m.pe, Some(12.5));
        assert_eq!(m.earnings, Some(19.8));
    }
}
