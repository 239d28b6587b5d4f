//! Guest session record and its derived views.

use serde::{Deserialize, Serialize};

/// An anonymous, time-boxed usage grant with a bounded prompt quota.
///
/// Persisted as camelCase JSON so records written by the mobile client
/// (`{"id","promptCount","createdAt","expiresAt"}`) load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSession {
    pub id: String,
    pub prompt_count: u32,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    /// `created_at + ttl`, milliseconds since the Unix epoch
    pub expires_at: i64,
}

impl GuestSession {
    pub fn new(id: impl Into<String>, now_ms: i64, ttl_ms: i64) -> Self {
        Self {
            id: id.into(),
            prompt_count: 0,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    /// Parses a persisted record, returning `None` for anything that is not
    /// a structurally sound session (missing fields, wrong types, empty id,
    /// or an expiry that does not follow creation).
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .filter(Self::is_well_formed)
    }

    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && self.created_at >= 0 && self.expires_at > self.created_at
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Milliseconds left before expiry, never negative.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at - now_ms).max(0)
    }
}

/// Lifecycle position of the guest session, evaluated lazily on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoSession,
    Active,
    Expired,
    LimitReached,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::LimitReached => "limit_reached",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the UI shows about the guest quota, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub session: Option<GuestSession>,
    pub prompts_remaining: u32,
    pub has_reached_limit: bool,
    pub time_until_reset: Option<String>,
}
