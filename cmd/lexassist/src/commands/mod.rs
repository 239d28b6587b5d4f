pub mod live;
pub mod search;
pub mod session;
