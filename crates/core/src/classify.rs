use crate::registry::Registry;

/// Sentinel courier for pages matching no known courier name.
pub const UNKNOWN_COURIER: &str = "UNKNOWN";
/// Sentinel style for pages matching no style-group keyword.
pub const OTHER_STYLE: &str = "Other";
/// Sentinel size for pages carrying no recognizable size token.
pub const SIZE_NA: &str = "NA";

/// The (courier, style, size) triple derived from one page's text.
///
/// The three axes are computed independently from the same text and may
/// contradict real-world expectations when the source text is ambiguous;
/// that is accepted behavior, not a defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub courier: String,
    pub style: String,
    pub size: String,
}

impl Classification {
    /// A page that matched nothing on any axis.
    pub fn is_unparsed(&self) -> bool {
        self.courier == UNKNOWN_COURIER && self.style == OTHER_STYLE && self.size == SIZE_NA
    }
}

/// First courier whose name occurs in `text`, scanned in priority order.
///
/// This is a case-insensitive substring search, not a whole-word search: a
/// courier name embedded inside another word still matches.
pub fn detect_courier<'a>(registry: &'a Registry, text: &str) -> &'a str {
    registry
        .couriers()
        .iter()
        .find(|c| c.matcher.is_match(text))
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_COURIER)
}

/// Canonical name of the first style group with a keyword occurring in
/// `text` as a whole word or phrase.
///
/// Groups are scanned in registry order and keywords in list order within a
/// group; the earliest group wins regardless of keyword length or
/// specificity, so the registry must be ordered from most-specific to
/// least-specific patterns.
pub fn detect_style<'a>(registry: &'a Registry, text: &str) -> &'a str {
    registry
        .groups()
        .iter()
        .find(|g| g.keywords.iter().any(|k| k.is_match(text)))
        .map(|g| g.name.as_str())
        .unwrap_or(OTHER_STYLE)
}

/// First size token occurring in `text` as a whole token, scanned in
/// configured order.
///
/// Whole-token matching keeps a size abbreviation from matching inside an
/// unrelated longer alphanumeric run such as a SKU code.
pub fn detect_size<'a>(registry: &'a Registry, text: &str) -> &'a str {
    registry
        .sizes()
        .iter()
        .find(|s| s.matcher.is_match(text))
        .map(|s| s.token.as_str())
        .unwrap_or(SIZE_NA)
}

/// Classify one page's text on all three axes.
///
/// Pure and total: every input, including the empty string, yields a valid
/// (possibly sentinel-valued) classification.
pub fn classify(registry: &Registry, text: &str) -> Classification {
    Classification {
        courier: detect_courier(registry, text).to_string(),
        style: detect_style(registry, text).to_string(),
        size: detect_size(registry, text).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
