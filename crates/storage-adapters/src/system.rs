//! Production clock and session id generator.

use chrono::Utc;
use domains::{Clock, SessionIdGenerator};
use uuid::Uuid;

pub const GUEST_ID_PREFIX: &str = "guest_";

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// `guest_` followed by a v4 UUID in simple (hyphenless) form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSessionIdGenerator;

impl SessionIdGenerator for UuidSessionIdGenerator {
    fn generate(&self) -> String {
        format!("{GUEST_ID_PREFIX}{}", Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let ids = UuidSessionIdGenerator;
        let a = ids.generate();
        let b = ids.generate();

        assert!(a.starts_with(GUEST_ID_PREFIX));
        assert_eq!(a.len(), GUEST_ID_PREFIX.len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn clock_is_close_to_now() {
        let now = Utc::now().timestamp_millis();
        assert!((SystemClock.now_ms() - now).abs() < 5_000);
    }
}
