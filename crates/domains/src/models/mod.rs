//! # Domain Models
//!
//! The guest-session record, the legal category table, the two historical
//! cached-post shapes, and the search request/response types.

mod lenient;

pub mod category;
pub mod post;
pub mod search;
pub mod session;

pub use category::LegalCategory;
pub use post::{CachedPost, CurrentPost, CurrentUser, LegacyPost, LegacyUser, PostAuthor, SearchResult};
pub use search::{
    found_message, RemoteSearchPage, RemoteSearchRequest, SearchMode, SearchOptions,
    SearchQuery, SearchResponse, SearchSource, SortBy,
};
pub use session::{GuestSession, SessionState, SessionStatus};
