// Core algorithm exports
pub mod coordinator;
pub mod feed;
pub mod scoring;
pub mod swipe;

pub use coordinator::MatchCoordinator;
pub use feed::{build_feed, DiscoveryFeed};
pub use scoring::{ScoreWeights, Scorer, NEUTRAL_SCORE};
pub use swipe::{SwipeController, SwipeDirection, SwipePhase};
