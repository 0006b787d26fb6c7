//! JamLink Core - discovery and matching core for the JamLink collaboration app
//!
//! This library implements the swipe-based discovery flow used by the JamLink
//! app: building the candidate feed, scoring compatibility, turning drag
//! gestures into decisions, and recording accepted pairs as mutual matches.

pub mod config;
pub mod core;
pub mod discovery;
pub mod models;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use crate::core::{build_feed, DiscoveryFeed, MatchCoordinator, Scorer, SwipeController};
pub use discovery::{DiscoveryConfig, DiscoverySession};
pub use models::{DecisionOutcome, Match, Profile, SwipeDecision};
pub use session::{Session, SessionError, SessionLoader};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let feed = build_feed("viewer", vec![], &[]);
        assert!(feed.is_exhausted());
    }
}
