//! Client counter state and the identity-keyed store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default rate limit when no client-specific limit is configured.
pub const DEFAULT_LIMIT: u32 = 100;
/// Default time window when no client-specific window is configured.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Limit parameters for a single client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientLimits {
    /// Maximum requests allowed per window
    pub limit: u32,
    /// Length of the fixed window
    pub window: Duration,
}

impl Default for ClientLimits {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Counter state for a single client identity.
///
/// `limit` and `window` are set by configuration and never change during
/// admission checks; only `count` and `window_start` do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    /// Requests admitted within the current window
    pub count: u32,
    /// Maximum requests allowed per window
    pub limit: u32,
    /// Length of the fixed window
    pub window: Duration,
    /// When the current window began
    pub window_start: Instant,
}

impl ClientState {
    /// A fresh state for a window starting at `now`, with nothing counted yet.
    pub fn fresh(limits: ClientLimits, now: Instant) -> Self {
        Self {
            count: 0,
            limit: limits.limit,
            window: limits.window,
            window_start: now,
        }
    }

    /// Remaining quota within the current window.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }
}

/// Mapping from client identity to counter state.
///
/// Absence is signaled via `None`, never an error. The store does no locking
/// itself; [`RateLimiter`](super::RateLimiter) holds it behind a mutex and
/// performs every read-modify-write under a single lock acquisition.
///
/// Entries live for the process lifetime. There is no eviction of idle
/// identities, so the map grows with the number of distinct clients seen.
#[derive(Debug, Default)]
pub struct ClientStore {
    entries: HashMap<String, ClientState>,
}

impl ClientStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure lookup, no mutation.
    pub fn get(&self, identity: &str) -> Option<&ClientState> {
        self.entries.get(identity)
    }

    /// Insert or fully overwrite the entry for `identity`.
    pub fn set(&mut self, identity: &str, state: ClientState) {
        self.entries.insert(identity.to_owned(), state);
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_absent_identity() {
        let store = ClientStore::new();
        assert!(store.get("nobody").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let mut store = ClientStore::new();
        let now = Instant::now();
        let state = ClientState::fresh(ClientLimits::default(), now);

        store.set("client_a", state.clone());

        assert_eq!(store.get("client_a"), Some(&state));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let mut store = ClientStore::new();
        let now = Instant::now();

        let mut first = ClientState::fresh(ClientLimits::default(), now);
        first.count = 7;
        store.set("client_a", first);

        let limits = ClientLimits {
            limit: 3,
            window: Duration::from_secs(5),
        };
        store.set("client_a", ClientState::fresh(limits, now));

        let state = store.get("client_a").unwrap();
        assert_eq!(state.count, 0);
        assert_eq!(state.limit, 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remaining_quota() {
        let now = Instant::now();
        let mut state = ClientState::fresh(
            ClientLimits {
                limit: 5,
                window: Duration::from_secs(1),
            },
            now,
        );

        assert_eq!(state.remaining(), 5);
        state.count = 3;
        assert_eq!(state.remaining(), 2);
        state.count = 5;
        assert_eq!(state.remaining(), 0);
    }
}
