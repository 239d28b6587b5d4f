//! # Guest Session Manager
//!
//! Owns the single anonymous session of this installation: creates it,
//! reuses it, expires it, and enforces its prompt quota.
//!
//! Expiry is detected lazily when the session is next touched; there is no
//! background timer. Storage failures never reach the caller: reads degrade
//! to "no session" and failed writes leave the in-memory state authoritative.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use domains::{Clock, GuestSession, KeyValueStore, SessionIdGenerator, SessionState, SessionStatus};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::humanize::humanize_duration;

pub const DEFAULT_PROMPT_LIMIT: u32 = 10;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_STORAGE_KEY: &str = "guest_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestSessionConfig {
    pub prompt_limit: u32,
    pub ttl: Duration,
    /// Key of the session record in the key-value store
    pub storage_key: String,
}

impl Default for GuestSessionConfig {
    fn default() -> Self {
        Self {
            prompt_limit: DEFAULT_PROMPT_LIMIT,
            ttl: DEFAULT_SESSION_TTL,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// What the key-value store held under the session key.
enum Persisted {
    Absent,
    Invalid,
    Found(GuestSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validity {
    Valid,
    Expired,
    Invalid,
}

pub struct GuestSessionManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn SessionIdGenerator>,
    config: GuestSessionConfig,
    current: RwLock<Option<GuestSession>>,
    /// Held for the whole of every operation that may touch storage, so a
    /// second `start` queued behind the first sees its session instead of
    /// creating another one.
    gate: Mutex<()>,
}

impl GuestSessionManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn SessionIdGenerator>,
        config: GuestSessionConfig,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            config,
            current: RwLock::new(None),
            gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &GuestSessionConfig {
        &self.config
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Returns the current valid session, creating one if there is none.
    ///
    /// An existing valid session is returned unchanged and nothing is
    /// written; storage is only written when a new session is created.
    pub async fn start(&self) -> GuestSession {
        let _gate = self.gate.lock().await;
        self.start_locked().await
    }

    /// Restores a persisted session into memory without creating one.
    ///
    /// Expired or malformed records are removed.
    pub async fn load(&self) -> Option<GuestSession> {
        let _gate = self.gate.lock().await;
        let now = self.clock.now_ms();

        match self.read_persisted().await {
            Persisted::Found(session) => match self.validity(&session, now) {
                Validity::Valid => {
                    debug!(session_id = %session.id, "restored guest session");
                    self.hold(Some(session.clone()));
                    Some(session)
                }
                Validity::Expired => {
                    info!(session_id = %session.id, "discarding expired guest session");
                    self.clear_locked().await;
                    None
                }
                Validity::Invalid => {
                    warn!(session_id = %session.id, "discarding guest session over its prompt limit");
                    self.clear_locked().await;
                    None
                }
            },
            Persisted::Invalid => {
                warn!("discarding malformed guest session record");
                self.clear_locked().await;
                None
            }
            Persisted::Absent => {
                self.hold(None);
                None
            }
        }
    }

    /// Replaces the session id (server-issued rotation), keeping the prompt
    /// count and timestamps. Starts a session first if there is none.
    pub async fn update_session_id(&self, new_id: &str) -> GuestSession {
        let _gate = self.gate.lock().await;
        let mut session = self.start_locked().await;

        let new_id = new_id.trim();
        if new_id.is_empty() {
            warn!(session_id = %session.id, "ignoring rotation to an empty session id");
            return session;
        }
        if session.id == new_id {
            return session;
        }

        info!(old_id = %session.id, new_id = %new_id, "rotating guest session id");
        session.id = new_id.to_string();
        self.persist(&session).await;
        self.hold(Some(session.clone()));
        session
    }

    /// Records one prompt against the quota.
    ///
    /// Returns `false` when the session is malformed, expired, or already at
    /// its limit; nothing is mutated in those cases. When no session exists
    /// at all, a fresh one is started and `true` is returned without
    /// counting the prompt.
    pub async fn increment_prompt_count(&self) -> bool {
        let _gate = self.gate.lock().await;
        let now = self.clock.now_ms();

        let candidate = match self.snapshot() {
            Some(session) => Persisted::Found(session),
            None => self.read_persisted().await,
        };

        match candidate {
            Persisted::Absent => {
                info!("prompt without a guest session; starting one");
                self.start_locked().await;
                true
            }
            Persisted::Invalid => {
                warn!("rejecting prompt: malformed guest session record");
                self.clear_locked().await;
                false
            }
            Persisted::Found(mut session) => match self.validity(&session, now) {
                Validity::Invalid => {
                    warn!(session_id = %session.id, "rejecting prompt: guest session over its limit");
                    self.clear_locked().await;
                    false
                }
                Validity::Expired => {
                    info!(session_id = %session.id, "rejecting prompt: guest session expired");
                    self.clear_locked().await;
                    false
                }
                Validity::Valid if session.prompt_count >= self.config.prompt_limit => {
                    debug!(
                        session_id = %session.id,
                        limit = self.config.prompt_limit,
                        "rejecting prompt: limit reached"
                    );
                    false
                }
                Validity::Valid => {
                    session.prompt_count += 1;
                    debug!(
                        session_id = %session.id,
                        prompt_count = session.prompt_count,
                        "recorded guest prompt"
                    );
                    self.persist(&session).await;
                    self.hold(Some(session));
                    true
                }
            },
        }
    }

    /// Removes the persisted record and forgets the in-memory session.
    pub async fn clear(&self) {
        let _gate = self.gate.lock().await;
        self.clear_locked().await;
        info!("cleared guest session");
    }

    // ========================================================================
    // Derived values (computed on every call)
    // ========================================================================

    /// The session held in memory, expired or not.
    pub fn session(&self) -> Option<GuestSession> {
        self.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.state_at(self.clock.now_ms())
    }

    /// `limit - prompt_count`; the full limit when there is no live session.
    pub fn prompts_remaining(&self) -> u32 {
        self.prompts_remaining_at(self.clock.now_ms())
    }

    pub fn has_reached_limit(&self) -> bool {
        self.has_reached_limit_at(self.clock.now_ms())
    }

    /// Humanized time until the session expires, `None` without a live session.
    pub fn time_until_reset(&self) -> Option<String> {
        self.time_until_reset_at(self.clock.now_ms())
    }

    pub fn status(&self) -> SessionStatus {
        let now = self.clock.now_ms();
        SessionStatus {
            state: self.state_at(now),
            session: self.snapshot(),
            prompts_remaining: self.prompts_remaining_at(now),
            has_reached_limit: self.has_reached_limit_at(now),
            time_until_reset: self.time_until_reset_at(now),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn start_locked(&self) -> GuestSession {
        let now = self.clock.now_ms();

        if let Some(session) = self.snapshot() {
            if self.validity(&session, now) == Validity::Valid {
                debug!(session_id = %session.id, "reusing in-memory guest session");
                return session;
            }
        }

        match self.read_persisted().await {
            Persisted::Found(session) => match self.validity(&session, now) {
                Validity::Valid => {
                    debug!(session_id = %session.id, "reusing persisted guest session");
                    self.hold(Some(session.clone()));
                    return session;
                }
                Validity::Expired => {
                    info!(session_id = %session.id, "replacing expired guest session")
                }
                Validity::Invalid => {
                    warn!(session_id = %session.id, "replacing guest session over its limit")
                }
            },
            Persisted::Invalid => warn!("replacing malformed guest session record"),
            Persisted::Absent => {}
        }

        let session = GuestSession::new(self.ids.generate(), now, self.ttl_ms());
        self.persist(&session).await;
        self.hold(Some(session.clone()));
        info!(
            session_id = %session.id,
            expires_at = session.expires_at,
            "started guest session"
        );
        session
    }

    async fn clear_locked(&self) {
        if let Err(err) = self.store.remove(&self.config.storage_key).await {
            warn!(error = %err, "failed to remove guest session record");
        }
        self.hold(None);
    }

    async fn read_persisted(&self) -> Persisted {
        match self.store.get(&self.config.storage_key).await {
            Ok(Some(raw)) => match GuestSession::from_json(&raw) {
                Some(session) => Persisted::Found(session),
                None => Persisted::Invalid,
            },
            Ok(None) => Persisted::Absent,
            Err(err) => {
                warn!(error = %err, "failed to read guest session; treating as absent");
                Persisted::Absent
            }
        }
    }

    async fn persist(&self, session: &GuestSession) {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(err) => {
                error!(session_id = %session.id, error = %err, "failed to encode guest session");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.config.storage_key, &raw).await {
            warn!(
                session_id = %session.id,
                error = %err,
                "failed to persist guest session; continuing in memory"
            );
        }
    }

    fn validity(&self, session: &GuestSession, now: i64) -> Validity {
        if !session.is_well_formed() || session.prompt_count > self.config.prompt_limit {
            Validity::Invalid
        } else if session.is_expired(now) {
            Validity::Expired
        } else {
            Validity::Valid
        }
    }

    /// The held session if it is still valid at `now`.
    fn live_session(&self, now: i64) -> Option<GuestSession> {
        self.snapshot()
            .filter(|session| self.validity(session, now) == Validity::Valid)
    }

    fn state_at(&self, now: i64) -> SessionState {
        match self.snapshot() {
            None => SessionState::NoSession,
            Some(session) => match self.validity(&session, now) {
                Validity::Invalid => SessionState::NoSession,
                Validity::Expired => SessionState::Expired,
                Validity::Valid if session.prompt_count >= self.config.prompt_limit => {
                    SessionState::LimitReached
                }
                Validity::Valid => SessionState::Active,
            },
        }
    }

    fn prompts_remaining_at(&self, now: i64) -> u32 {
        self.live_session(now)
            .map(|session| self.config.prompt_limit.saturating_sub(session.prompt_count))
            .unwrap_or(self.config.prompt_limit)
    }

    fn has_reached_limit_at(&self, now: i64) -> bool {
        self.live_session(now)
            .is_some_and(|session| session.prompt_count >= self.config.prompt_limit)
    }

    fn time_until_reset_at(&self, now: i64) -> Option<String> {
        self.live_session(now)
            .map(|session| humanize_duration(session.remaining_ms(now)))
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.config.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    fn snapshot(&self) -> Option<GuestSession> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn hold(&self, session: Option<GuestSession>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}
