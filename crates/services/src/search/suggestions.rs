//! Offline autocomplete tables.

use domains::LegalCategory;

pub const MAX_LOCAL_SUGGESTIONS: usize = 5;

pub const COMMON_LEGAL_TERMS: [&str; 12] = [
    "annulment",
    "child custody",
    "child support",
    "contract",
    "eviction",
    "illegal dismissal",
    "inheritance",
    "land dispute",
    "small claims",
    "unpaid wages",
    "warranty",
    "theft",
];

/// Suggestions available without the network.
///
/// `#` queries complete to category tags, `@` queries get nothing (user
/// handles cannot be listed offline), and anything else is matched against
/// a short list of common legal terms.
pub fn local_suggestions(query: &str) -> Vec<String> {
    let trimmed = query.trim();

    if let Some(tag) = trimmed.strip_prefix('#') {
        let prefix = format!("#{}", tag.trim().to_lowercase());
        return LegalCategory::TAGGED
            .iter()
            .map(LegalCategory::tag)
            .filter(|candidate| candidate.starts_with(prefix.as_str()))
            .map(str::to_string)
            .collect();
    }

    if trimmed.starts_with('@') {
        return Vec::new();
    }

    let needle = trimmed.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    COMMON_LEGAL_TERMS
        .iter()
        .filter(|term| term.contains(needle.as_str()))
        .take(MAX_LOCAL_SUGGESTIONS)
        .map(|term| term.to_string())
        .collect()
}
