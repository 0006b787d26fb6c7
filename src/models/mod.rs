// Model exports
pub mod domain;

pub use domain::{CollabRole, DecisionOutcome, Highlight, HighlightKind, Match, Profile, QuotaVerdict, SwipeDecision};
