//! Rate limiting logic and state management.

mod engine;
mod store;

pub use engine::{Decision, RateLimiter};
pub use store::{ClientLimits, ClientState, ClientStore, DEFAULT_LIMIT, DEFAULT_WINDOW};
