//! # storage-adapters
//!
//! Concrete implementations of the storage-side ports in `domains`:
//! key-value stores, the in-memory post cache, and the system clock and
//! session id generator.

pub mod file_kv;
pub mod memory_kv;
pub mod post_cache;
pub mod system;

pub use file_kv::FileKvStore;
pub use memory_kv::MemoryKvStore;
pub use post_cache::MemoryPostCache;
pub use system::{SystemClock, UuidSessionIdGenerator};
