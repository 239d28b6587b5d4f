//! Search request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;
use super::post::SearchResult;

/// How a query is interpreted, decided by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// `@name`: match author username or full name
    UserHandle,
    /// `#tag`: match the category label exactly
    CategoryTag,
    /// Anything else
    General,
}

/// A classified, normalized search query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw: String,
    pub mode: SearchMode,
    /// `raw` without its mode prefix, trimmed and lower-cased
    pub normalized_term: String,
}

impl SearchQuery {
    /// Classifies `raw`. Returns `None` for empty or whitespace-only input.
    ///
    /// A bare `@` or `#` carries no term, so it is searched as plain text.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (mode, rest) = if let Some(rest) = trimmed.strip_prefix('@') {
            (SearchMode::UserHandle, rest)
        } else if let Some(rest) = trimmed.strip_prefix('#') {
            (SearchMode::CategoryTag, rest)
        } else {
            (SearchMode::General, trimmed)
        };

        let term = rest.trim().to_lowercase();
        if term.is_empty() {
            return Some(Self {
                raw: trimmed.to_string(),
                mode: SearchMode::General,
                normalized_term: trimmed.to_lowercase(),
            });
        }

        Some(Self {
            raw: trimmed.to_string(),
            mode,
            normalized_term: term,
        })
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Identity matches first, then earlier body matches
    #[default]
    Relevance,
    /// Newest `created_at` first
    Date,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "date" | "recent" | "newest" => Ok(Self::Date),
            other => Err(format!("unknown sort order '{other}' (expected relevance or date)")),
        }
    }
}

/// Caller-supplied knobs for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub sort_by: SortBy,
    /// Falls back to the configured default when `None` or zero
    #[serde(default)]
    pub limit: Option<usize>,
    /// Restrict to one category; accepts aliases such as `labour`
    #[serde(default)]
    pub category: Option<String>,
}

/// Query string of `GET /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSearchRequest {
    pub q: String,
    pub sort: SortBy,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Body of a successful `GET /search`.
///
/// Results stay as the server sent them; see [`SearchResponse::from_remote`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSearchPage {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub data: Vec<Value>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Which path produced a [`SearchResponse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Remote,
    Cache,
    /// Nothing was consulted (rejected query, empty cache, bad pattern)
    #[default]
    None,
}

/// Outcome of a search. Failures are carried in `success`/`message`.
///
/// `data` holds posts in the [`SearchResult`] shape. Remote posts may carry
/// extra fields, so they are kept as JSON; [`SearchResponse::results`] gives
/// the typed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<Value>,
    pub total: usize,
    pub query: String,
    pub message: String,
    #[serde(default)]
    pub source: SearchSource,
}

impl SearchResponse {
    pub fn failure(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            total: 0,
            query: query.into(),
            message: message.into(),
            source: SearchSource::None,
        }
    }

    /// Successful search that found nothing worth returning.
    pub fn empty(query: impl Into<String>, message: impl Into<String>, source: SearchSource) -> Self {
        Self {
            success: true,
            data: Vec::new(),
            total: 0,
            query: query.into(),
            message: message.into(),
            source,
        }
    }

    /// Ranked posts from the local cache.
    pub fn from_cache(query: impl Into<String>, hits: Vec<SearchResult>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            total: hits.len(),
            data: hits.into_iter().map(Value::from).collect(),
            query: query.into(),
            message: message.into(),
            source: SearchSource::Cache,
        }
    }

    /// Wraps a server page verbatim, defaulting `total`, `message` and any
    /// result fields the server left out or sent as `null`.
    pub fn from_remote(query: impl Into<String>, page: RemoteSearchPage) -> Self {
        let query = query.into();
        let total = page.total.unwrap_or(page.data.len());
        let message = page
            .message
            .unwrap_or_else(|| found_message(page.data.len(), &query));
        Self {
            success: true,
            data: page.data.into_iter().map(fill_missing_fields).collect(),
            total,
            query,
            message,
            source: SearchSource::Remote,
        }
    }

    /// Typed view of `data`. Entries that are not JSON objects are skipped.
    pub fn results(&self) -> Vec<SearchResult> {
        self.data
            .iter()
            .filter_map(|post| SearchResult::deserialize(post).ok())
            .collect()
    }
}

/// Fills absent or `null` result fields with the defaults the cache path
/// uses. Present values, including unknown fields, are left untouched.
fn fill_missing_fields(mut post: Value) -> Value {
    let Some(fields) = post.as_object_mut() else {
        return post;
    };

    for key in ["id", "body", "category", "created_at"] {
        fill(fields, key, Value::from(""));
    }
    for key in ["is_anonymous", "is_flagged", "is_bookmarked"] {
        fill(fields, key, Value::Bool(false));
    }
    let created_at = fields.get("created_at").cloned().unwrap_or_default();
    fill(fields, "updated_at", created_at);

    fill(fields, "users", Value::Object(Map::new()));
    let author_id = match fields.get_mut("users").and_then(Value::as_object_mut) {
        Some(author) => {
            for key in ["id", "username", "full_name"] {
                fill(author, key, Value::from(""));
            }
            fill(author, "role", Value::from("user"));
            author.get("id").cloned().unwrap_or_default()
        }
        None => Value::from(""),
    };
    fill(fields, "user_id", author_id);

    post
}

fn fill(fields: &mut Map<String, Value>, key: &str, default: Value) {
    let slot = fields.entry(key).or_insert(Value::Null);
    if slot.is_null() {
        *slot = default;
    }
}

/// `Found N posts containing "<query>"`
pub fn found_message(count: usize, query: &str) -> String {
    format!("Found {count} posts containing \"{query}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefixes_select_the_mode() {
        let q = SearchQuery::parse("  @Maria ").unwrap();
        assert_eq!(q.mode, SearchMode::UserHandle);
        assert_eq!(q.normalized_term, "maria");
        assert_eq!(q.raw, "@Maria");

        let q = SearchQuery::parse("#Labour").unwrap();
        assert_eq!(q.mode, SearchMode::CategoryTag);
        assert_eq!(q.normalized_term, "labour");

        let q = SearchQuery::parse("Unpaid Wages").unwrap();
        assert_eq!(q.mode, SearchMode::General);
        assert_eq!(q.normalized_term, "unpaid wages");
    }

    #[test]
    fn blank_queries_do_not_parse() {
        assert!(SearchQuery::parse("").is_none());
        assert!(SearchQuery::parse("   \t").is_none());
    }

    #[test]
    fn bare_prefix_is_plain_text() {
        let q = SearchQuery::parse("@").unwrap();
        assert_eq!(q.mode, SearchMode::General);
        assert_eq!(q.normalized_term, "@");
    }

    #[test]
    fn remote_page_defaults_total_and_message() {
        let page = RemoteSearchPage {
            data: vec![json!({"id": "a"}), json!({"id": "b"})],
            total: None,
            message: None,
        };
        let response = SearchResponse::from_remote("rent", page);
        assert!(response.success);
        assert_eq!(response.total, 2);
        assert_eq!(response.message, "Found 2 posts containing \"rent\"");
        assert_eq!(response.source, SearchSource::Remote);
    }

    #[test]
    fn remote_results_keep_server_values_and_extra_fields() {
        let page: RemoteSearchPage = serde_json::from_value(json!({
            "data": [{
                "id": 17,
                "body": "Deposit withheld",
                "created_at": 1714521600000_i64,
                "updated_at": null,
                "reply_count": 4,
                "users": {"id": "u", "username": "a", "avatar_url": "http://x"}
            }]
        }))
        .unwrap();

        let response = SearchResponse::from_remote("deposit", page);
        let post = &response.data[0];

        assert_eq!(post["id"], 17);
        assert_eq!(post["created_at"], 1714521600000_i64);
        assert_eq!(post["updated_at"], 1714521600000_i64);
        assert_eq!(post["reply_count"], 4);
        assert_eq!(post["users"]["avatar_url"], "http://x");
        assert_eq!(post["users"]["role"], "user");
        assert_eq!(post["users"]["full_name"], "");
        assert_eq!(post["user_id"], "u");
        assert_eq!(post["category"], "");
        assert_eq!(post["is_bookmarked"], false);

        let typed = response.results();
        assert_eq!(typed[0].id, "17");
        assert_eq!(typed[0].users.role, "user");
    }

    #[test]
    fn null_author_becomes_a_default_user() {
        let page = RemoteSearchPage {
            data: vec![json!({"id": "x", "users": null, "user_id": "u7"}), json!("not a post")],
            total: None,
            message: None,
        };
        let response = SearchResponse::from_remote("x", page);

        assert_eq!(response.data[0]["users"]["role"], "user");
        assert_eq!(response.data[0]["user_id"], "u7");
        assert_eq!(response.data[1], "not a post");
        assert_eq!(response.results().len(), 1);
    }

    #[test]
    fn cache_hits_serialize_in_the_result_shape() {
        let hit = SearchResult {
            id: "p1".into(),
            ..SearchResult::default()
        };
        let response = SearchResponse::from_cache("q", vec![hit.clone()], "Found 1 posts containing \"q\"");

        assert_eq!(response.total, 1);
        assert_eq!(response.source, SearchSource::Cache);
        assert_eq!(response.data[0]["users"]["role"], "");
        assert_eq!(response.results(), [hit]);
    }

    #[test]
    fn sort_order_parses_from_cli_text() {
        assert_eq!("Date".parse::<SortBy>(), Ok(SortBy::Date));
        assert_eq!("relevance".parse::<SortBy>(), Ok(SortBy::Relevance));
        assert!("alphabetical".parse::<SortBy>().is_err());
    }
}
