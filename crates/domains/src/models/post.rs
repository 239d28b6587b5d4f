//! Forum posts as they sit in the client cache, and the canonical shape
//! every search path returns.
//!
//! The cache holds posts written by two generations of the client:
//!
//! * current: `body`, snake_case fields, author under `users`
//! * legacy: `content`, camelCase fields, author under `user` with `isLawyer`
//!
//! [`CachedPost::to_search_result`] is the only place that knows about both.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::lenient;

/// Author block of a [`SearchResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: String,
}

/// The search API's post contract. The fallback path produces exactly this
/// shape; remote posts carry at least these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub body: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_anonymous: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_flagged: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_bookmarked: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub users: PostAuthor,
}

impl From<SearchResult> for Value {
    fn from(post: SearchResult) -> Self {
        json!({
            "id": post.id,
            "body": post.body,
            "category": post.category,
            "created_at": post.created_at,
            "updated_at": post.updated_at,
            "user_id": post.user_id,
            "is_anonymous": post.is_anonymous,
            "is_flagged": post.is_flagged,
            "is_bookmarked": post.is_bookmarked,
            "users": {
                "id": post.users.id,
                "username": post.users.username,
                "full_name": post.users.full_name,
                "role": post.users.role,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPost {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    /// Required: its presence is what marks the current shape. A `null`
    /// body still counts and reads as `""`.
    #[serde(deserialize_with = "lenient::string")]
    pub body: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_anonymous: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_flagged: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub users: Option<CurrentUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyUser {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(rename = "fullName", alias = "full_name", default, deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(rename = "isLawyer", default, deserialize_with = "lenient::flag")]
    pub is_lawyer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPost {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    /// Required: its presence is what marks the legacy shape. A `null`
    /// value still counts and reads as `""`.
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(rename = "createdAt", alias = "created_at", default, deserialize_with = "lenient::timestamp")]
    pub created_at: String,
    #[serde(rename = "updatedAt", alias = "updated_at", default, deserialize_with = "lenient::timestamp")]
    pub updated_at: String,
    #[serde(rename = "userId", alias = "user_id", default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(rename = "isAnonymous", alias = "is_anonymous", default, deserialize_with = "lenient::flag")]
    pub is_anonymous: bool,
    #[serde(rename = "isFlagged", alias = "is_flagged", default, deserialize_with = "lenient::flag")]
    pub is_flagged: bool,
    #[serde(rename = "isBookmarked", alias = "is_bookmarked", default, deserialize_with = "lenient::flag")]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub user: Option<LegacyUser>,
}

/// A post as found in the client cache, in whichever shape it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachedPost {
    Current(CurrentPost),
    Legacy(LegacyPost),
}

impl CachedPost {
    pub fn id(&self) -> &str {
        match self {
            Self::Current(post) => &post.id,
            Self::Legacy(post) => &post.id,
        }
    }

    /// Converts either shape into the canonical [`SearchResult`].
    ///
    /// Missing `updated_at` falls back to `created_at`, a missing `user_id`
    /// falls back to the author's id, and a legacy author's role is derived
    /// from `isLawyer`.
    pub fn to_search_result(&self) -> SearchResult {
        match self {
            Self::Current(post) => {
                let author = post.users.clone().unwrap_or_default();
                let role = if author.role.is_empty() {
                    "user".to_string()
                } else {
                    author.role
                };
                SearchResult {
                    id: post.id.clone(),
                    body: post.body.clone(),
                    category: post.category.clone(),
                    created_at: post.created_at.clone(),
                    updated_at: non_empty_or(&post.updated_at, &post.created_at),
                    user_id: non_empty_or(&post.user_id, &author.id),
                    is_anonymous: post.is_anonymous,
                    is_flagged: post.is_flagged,
                    is_bookmarked: post.is_bookmarked,
                    users: PostAuthor {
                        id: author.id,
                        username: author.username,
                        full_name: author.full_name,
                        role,
                    },
                }
            }
            Self::Legacy(post) => {
                let author = post.user.clone().unwrap_or_default();
                SearchResult {
                    id: post.id.clone(),
                    body: post.content.clone(),
                    category: post.category.clone(),
                    created_at: post.created_at.clone(),
                    updated_at: non_empty_or(&post.updated_at, &post.created_at),
                    user_id: non_empty_or(&post.user_id, &author.id),
                    is_anonymous: post.is_anonymous,
                    is_flagged: post.is_flagged,
                    is_bookmarked: post.is_bookmarked,
                    users: PostAuthor {
                        id: author.id,
                        username: author.username,
                        full_name: author.full_name,
                        role: if author.is_lawyer { "lawyer" } else { "user" }.to_string(),
                    },
                }
            }
        }
    }

    /// Parses a cached post list stored as a JSON array.
    ///
    /// The array itself must be valid JSON; individual entries that match
    /// neither shape are skipped so one bad record cannot hide the rest.
    pub fn parse_list(raw: &str) -> Result<Vec<CachedPost>, serde_json::Error> {
        let items: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        let total = items.len();
        let posts: Vec<CachedPost> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if posts.len() < total {
            tracing::debug!(skipped = total - posts.len(), "ignored unrecognized cached posts");
        }
        Ok(posts)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() { fallback } else { value }.to_string()
}
