use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use domains::{CachedPost, Clock, SessionIdGenerator};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn at(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// `guest_1`, `guest_2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SessionIdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("guest_{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// A forum cache as the app leaves it after a few fetches: current-shape
/// posts mixed with ones written by the previous app version.
pub const FORUM_CACHE_JSON: &str = r#"[
    {"id": "p1", "body": "My employer has not paid overtime since March", "category": "Labor Law",
     "created_at": "2024-04-01T08:00:00Z",
     "users": {"id": "u1", "username": "juan_dc", "full_name": "Juan Dela Cruz", "role": "user"}},
    {"id": "p2", "content": "Store refused a refund for a broken phone", "category": "Consumer Law",
     "createdAt": "2024-04-03T08:00:00Z", "userId": "u2",
     "user": {"id": "u2", "username": "maria_santos", "fullName": "Maria Santos", "isLawyer": false}},
    {"id": "p3", "body": "Neighbor built a fence on my lot", "category": "Civil Law",
     "created_at": "2024-04-02T08:00:00Z",
     "users": {"id": "u3", "username": "atty_cruz", "full_name": "Ana Cruz", "role": "lawyer"}},
    {"id": "p4", "content": "Charged with theft after a misunderstanding", "category": "Criminal Law",
     "createdAt": 1711785600000,
     "user": {"id": "u4", "username": "atty_lim", "fullName": "Grace Lim", "isLawyer": true}},
    {"id": "p5", "body": "Is a labour contract valid without a signature?", "category": "Labor Law",
     "created_at": "2024-04-04T08:00:00Z", "is_anonymous": true,
     "users": {"id": "u5", "username": "hidden_user", "full_name": "Hidden User", "role": "user"}}
]"#;

pub fn forum_cache() -> Vec<CachedPost> {
    CachedPost::parse_list(FORUM_CACHE_JSON).expect("fixture cache parses")
}

/// Ids of the posts in a response's `data`, in order.
pub fn ids(posts: &[serde_json::Value]) -> Vec<&str> {
    posts.iter().filter_map(|post| post["id"].as_str()).collect()
}
