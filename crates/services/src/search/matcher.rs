//! Query classification for the offline search.
//!
//! Precedence: `@` author search, `#` category tag, explicit category
//! option, bare category name, then free text across every field.

use domains::{LegalCategory, SearchMode, SearchQuery, SearchResult};
use regex::{Regex, RegexBuilder};

/// Case-insensitive literal substring matcher.
///
/// The term is escaped before compiling, so `c++`, `(a)` or `.` match
/// themselves.
#[derive(Debug, Clone)]
pub(crate) struct TermPattern {
    regex: Regex,
}

impl TermPattern {
    pub(crate) fn new(term: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()?;
        Ok(Self { regex })
    }

    pub(crate) fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// Character offset of the first match, counted in Unicode scalar
    /// values (not bytes, not UTF-16 units).
    pub(crate) fn position(&self, haystack: &str) -> Option<usize> {
        self.regex
            .find(haystack)
            .map(|found| haystack[..found.start()].chars().count())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    /// `@name`: author username or full name
    Author { pattern: TermPattern },
    /// `#tag` (`tagged`) or a bare category name: exact label equality
    Category { label: String, tagged: bool },
    /// Explicit category option: label equality and a body match
    CategoryContent { label: String, pattern: TermPattern },
    /// Body, username, full name, or category
    Anywhere { pattern: TermPattern },
}

impl Matcher {
    pub(crate) fn build(query: &SearchQuery, category: Option<&str>) -> Result<Self, regex::Error> {
        match query.mode {
            SearchMode::UserHandle => Ok(Self::Author {
                pattern: TermPattern::new(&query.normalized_term)?,
            }),
            SearchMode::CategoryTag => Ok(Self::Category {
                label: resolve_label(&query.normalized_term),
                tagged: true,
            }),
            SearchMode::General => {
                if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
                    return Ok(Self::CategoryContent {
                        label: resolve_label(category),
                        pattern: TermPattern::new(&query.normalized_term)?,
                    });
                }
                if is_category_name(&query.normalized_term) {
                    return Ok(Self::Category {
                        label: resolve_label(&query.normalized_term),
                        tagged: false,
                    });
                }
                Ok(Self::Anywhere {
                    pattern: TermPattern::new(&query.normalized_term)?,
                })
            }
        }
    }

    pub(crate) fn matches(&self, post: &SearchResult) -> bool {
        match self {
            Self::Author { pattern } => author_matches(post, pattern),
            Self::Category { label, .. } => same_category(&post.category, label),
            Self::CategoryContent { label, pattern } => {
                same_category(&post.category, label) && pattern.is_match(&post.body)
            }
            Self::Anywhere { pattern } => {
                pattern.is_match(&post.body)
                    || author_matches(post, pattern)
                    || pattern.is_match(&post.category)
            }
        }
    }

    /// Term used for relevance scoring; category-only searches have none.
    pub(crate) fn ranking_pattern(&self) -> Option<&TermPattern> {
        match self {
            Self::Author { pattern }
            | Self::CategoryContent { pattern, .. }
            | Self::Anywhere { pattern } => Some(pattern),
            Self::Category { .. } => None,
        }
    }

    /// Hint shown when nothing matched.
    pub(crate) fn no_match_message(&self, query: &SearchQuery) -> String {
        match self {
            Self::Author { .. } => format!(
                "No posts found from users matching \"{}\". Try searching without @ or check the spelling.",
                query.raw
            ),
            Self::Category { label, tagged: true } => format!(
                "No posts found in \"{label}\". Valid tags: {}",
                LegalCategory::tag_list()
            ),
            Self::Category { label, tagged: false } => {
                format!("No posts found in \"{label}\".")
            }
            Self::CategoryContent { label, .. } => {
                format!("No posts in \"{label}\" contain \"{}\".", query.raw)
            }
            Self::Anywhere { .. } => format!(
                "No posts found containing \"{}\". Try different keywords.",
                query.raw
            ),
        }
    }
}

/// True when a whole query names a category rather than content.
pub(crate) fn is_category_name(term: &str) -> bool {
    LegalCategory::from_alias(term).is_some() || term.ends_with(" law") || term == "others"
}

/// Maps an alias to its stored label; unknown names are compared as typed.
fn resolve_label(term: &str) -> String {
    LegalCategory::from_alias(term)
        .map(|category| category.label().to_string())
        .unwrap_or_else(|| term.trim().to_string())
}

fn same_category(post_category: &str, label: &str) -> bool {
    post_category.trim().to_lowercase() == label.to_lowercase()
}

/// Anonymous posts never match on author identity.
pub(crate) fn author_matches(post: &SearchResult, pattern: &TermPattern) -> bool {
    !post.is_anonymous
        && (pattern.is_match(&post.users.username) || pattern.is_match(&post.users.full_name))
}
