//! Heuristic extraction of P/E and earnings figures from a quote page.
//!
//! Each [`Extractor`] is one independent attempt that either finds a number
//! or contributes nothing. Extractors for a metric run in order and the first
//! numeric match wins. If both label-based chains miss, the embedded
//! `AF_initDataCallback` data blocks are scanned for the first key/number
//! pair, which fills the first still-missing metric (P/E before earnings).

use regex::Regex;
use std::sync::LazyLock;

use crate::models::quote::SecondaryMetric;

/// Optional sign, then either a comma-grouped or a plain decimal.
const NUMBER: &str = r"(-?\d{1,3}(?:,\d{3})+(?:\.\d+)?|-?\d+(?:\.\d+)?)";

/// Maximum run of non-digit text allowed between a label and its value.
/// Quote pages put tooltip prose between the two.
const LABEL_GAP: usize = 160;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>").expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static SCRIPT_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("valid regex"));
static KEY_NUMBER_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([A-Za-z_][A-Za-z0-9_ ./%-]*)"\s*[,:]\s*(-?\d+(?:\.\d+)?)\b"#)
        .expect("valid regex")
});

static PE_EXTRACTORS: LazyLock<Vec<Extractor>> = LazyLock::new(|| {
    vec![
        Extractor::label("pe_label", Metric::Pe, r"(?i)\bP/E\b"),
        Extractor::label("pe_ratio_label", Metric::Pe, r"(?i)\bPE\s+ratio\b"),
        Extractor::structured("pe_field", Metric::Pe, "pe|peRatio|trailingPE|pe_ratio"),
    ]
});

static EARNINGS_EXTRACTORS: LazyLock<Vec<Extractor>> = LazyLock::new(|| {
    vec![
        Extractor::label("earnings_label", Metric::Earnings, r"\bEarnings\b"),
        Extractor::label("eps_label", Metric::Earnings, r"\bEPS\b"),
        Extractor::structured("earnings_field", Metric::Earnings, "eps|earnings|latestEarnings"),
        Extractor::label("recent_earnings_label", Metric::Earnings, r"(?i)\bRecent\s+earnings\b"),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Pe,
    Earnings,
}

/// Where an extractor looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Visible page text (tags stripped, entities decoded).
    Text,
    /// Raw HTML including inline scripts.
    Markup,
}

/// A fetched page in the two forms extractors consume.
#[derive(Debug, Clone)]
pub struct PageContent<'a> {
    markup: &'a str,
    text: String,
}

impl<'a> PageContent<'a> {
    pub fn new(markup: &'a str) -> Self {
        Self {
            markup,
            text: visible_text(markup),
        }
    }

    pub fn markup(&self) -> &str {
        self.markup
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One independent extraction attempt.
#[derive(Debug)]
pub struct Extractor {
    name: &'static str,
    metric: Metric,
    scope: Scope,
    pattern: Regex,
}

impl Extractor {
    /// A label in the visible text followed, within [`LABEL_GAP`]
    /// non-digit characters, by a number.
    fn label(name: &'static str, metric: Metric, label: &str) -> Self {
        let pattern = format!(r"{label}[^0-9]{{0,{LABEL_GAP}}}?{NUMBER}");
        Self {
            name,
            metric,
            scope: Scope::Text,
            pattern: Regex::new(&pattern).expect("valid label pattern"),
        }
    }

    /// A JSON-ish `"key": value` field embedded in the markup.
    fn structured(name: &'static str, metric: Metric, keys: &str) -> Self {
        let pattern = format!(r#"(?i)"(?:{keys})"\s*:\s*"?{NUMBER}"#);
        Self {
            name,
            metric,
            scope: Scope::Markup,
            pattern: Regex::new(&pattern).expect("valid field pattern"),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The first number this extractor finds on `page`, if any.
    pub fn attempt(&self, page: &PageContent<'_>) -> Option<f64> {
        let haystack = match self.scope {
            Scope::Text => page.text(),
            Scope::Markup => page.markup(),
        };
        self.pattern
            .captures_iter(haystack)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| parse_number(m.as_str()))
    }
}

/// P/E extractors in the order they are tried.
pub fn pe_extractors() -> &'static [Extractor] {
    &PE_EXTRACTORS
}

/// Earnings extractors in the order they are tried.
pub fn earnings_extractors() -> &'static [Extractor] {
    &EARNINGS_EXTRACTORS
}

/// Run every heuristic over `html`. Never fails; misses become `None`.
pub fn extract_metrics(html: &str) -> SecondaryMetric {
    let page = PageContent::new(html);
    let mut metric = SecondaryMetric {
        pe: first_match(pe_extractors(), &page),
        earnings: first_match(earnings_extractors(), &page),
    };

    if metric.pe.is_none() || metric.earnings.is_none() {
        if let Some(value) = scan_data_blocks(page.markup()) {
            if metric.pe.is_none() {
                metric.pe = Some(value);
            } else {
                metric.earnings = Some(value);
            }
        }
    }

    metric
}

fn first_match(extractors: &[Extractor], page: &PageContent<'_>) -> Option<f64> {
    extractors.iter().find_map(|extractor| {
        let value = extractor.attempt(page)?;
        tracing::trace!(extractor = extractor.name(), value, "metric extracted");
        Some(value)
    })
}

/// The number from the first `"key", number` or `"key": number` pair inside
/// an `AF_initDataCallback` script block.
pub fn scan_data_blocks(markup: &str) -> Option<f64> {
    SCRIPT_BODY
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|body| body.as_str())
        .filter(|body| body.contains("AF_initDataCallback"))
        .find_map(|body| {
            KEY_NUMBER_PAIR
                .captures_iter(body)
                .filter_map(|caps| caps.get(2))
                .find_map(|m| parse_number(m.as_str()))
        })
}

/// Strip scripts, styles and tags; decode entities; collapse whitespace.
fn visible_text(markup: &str) -> String {
    let without_scripts = SCRIPT_OR_STYLE.replace_all(markup, " ");
    let without_tags = TAG.replace_all(&without_scripts, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Parse a matched number, tolerating thousands separators.
fn parse_number(raw: &str) -> Option<f64> {
    let n: f64 = raw.replace(',', "").parse().ok()?;
    n.is_finite().then_some(n)
}
