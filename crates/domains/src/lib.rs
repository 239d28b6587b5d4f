//! # domains
//!
//! Models and port traits for the LexAssist client core.
//! Nothing in this crate performs I/O; adapters live in their own crates.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
