//! # services
//!
//! Business logic of the LexAssist client core: the guest prompt quota and
//! the forum search with its offline fallback. Everything here talks to the
//! outside world only through the ports defined in `domains`.

pub mod guest_session;
pub mod humanize;
pub mod scheduler;
pub mod search;

pub use guest_session::{GuestSessionConfig, GuestSessionManager};
pub use humanize::humanize_duration;
pub use scheduler::{ScheduledResult, SearchScheduler};
pub use search::{ForumSearchFallback, SearchConfig};
