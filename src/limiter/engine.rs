//! Core admission engine.

use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Result, TurnstileError};

use super::store::{ClientLimits, ClientState, ClientStore};

/// Outcome of one admission check.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Whether the request may proceed
    pub admitted: bool,
    /// The client's state as stored after this call
    pub state: ClientState,
}

/// The rate limiter: per-client fixed-window counters behind a single lock.
///
/// This struct is thread-safe and is shared across request handlers via
/// `Arc`. Every admission check and configuration update runs as one critical
/// section over the whole store, so concurrent calls for the same identity
/// are linearized.
///
/// Identities are expected to be non-empty; the transport layer rejects empty
/// ones before they reach the limiter.
pub struct RateLimiter {
    /// Counter state per client identity
    store: Mutex<ClientStore>,
    /// Limits applied to identities with no explicit configuration
    defaults: ClientLimits,
}

impl RateLimiter {
    /// Create a new rate limiter seeding unseen identities with `defaults`.
    pub fn new(defaults: ClientLimits) -> Self {
        Self {
            store: Mutex::new(ClientStore::new()),
            defaults,
        }
    }

    /// Decide whether the request identified by `identity` at time `now` is
    /// admitted, updating the stored counter state accordingly.
    ///
    /// An unseen identity is seeded with the process-wide defaults before the
    /// decision is made, so the entry exists even if this call is rejected. A
    /// window older than its duration is reset first; the reset survives
    /// regardless of the decision. Rejected requests never increment the
    /// count.
    pub fn check_and_admit(&self, identity: &str, now: Instant) -> Decision {
        let mut store = self.store.lock();

        trace!(identity, "checking admission");

        let mut state = match store.get(identity) {
            Some(existing) => {
                let mut state = existing.clone();
                // Strictly greater: a request at exactly window_start + window
                // still counts against the old window.
                if now.duration_since(state.window_start) > state.window {
                    debug!(identity, "window expired, resetting counter");
                    state.count = 0;
                    state.window_start = now;
                    store.set(identity, state.clone());
                }
                state
            }
            None => {
                debug!(
                    identity,
                    limit = self.defaults.limit,
                    window = ?self.defaults.window,
                    "seeding state for new client"
                );
                let state = ClientState::fresh(self.defaults, now);
                store.set(identity, state.clone());
                state
            }
        };

        if state.count >= state.limit {
            debug!(
                identity,
                count = state.count,
                limit = state.limit,
                "rate limit exceeded"
            );
            return Decision {
                admitted: false,
                state,
            };
        }

        state.count += 1;
        store.set(identity, state.clone());

        Decision {
            admitted: true,
            state,
        }
    }

    /// Replace the limits for `identity`, resetting its counter and window.
    ///
    /// Fails with [`TurnstileError::InvalidLimits`] if the limit or window is
    /// zero, leaving any existing entry untouched.
    pub fn apply_config(
        &self,
        identity: &str,
        limits: ClientLimits,
        now: Instant,
    ) -> Result<()> {
        if limits.limit == 0 || limits.window.is_zero() {
            return Err(TurnstileError::InvalidLimits);
        }

        let mut store = self.store.lock();
        debug!(
            identity,
            limit = limits.limit,
            window = ?limits.window,
            "applying client limits"
        );
        store.set(identity, ClientState::fresh(limits, now));
        Ok(())
    }

    /// Snapshot of the current state for `identity`, if any.
    pub fn lookup(&self, identity: &str) -> Option<ClientState> {
        self.store.lock().get(identity).cloned()
    }

    /// Number of identities with tracked state.
    pub fn client_count(&self) -> usize {
        self.store.lock().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(ClientLimits::default())
    }
}
