// Service exports
pub mod rest;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Match, Profile, QuotaVerdict};

/// Errors that can occur when talking to a backend store
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of the profile pool and the session user's own profile
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// The session user's profile, or None if they have not completed setup
    async fn current_profile(&self) -> Result<Option<Profile>, BackendError>;

    /// The full candidate pool
    async fn all_profiles(&self) -> Result<Vec<Profile>, BackendError>;
}

/// Durable store of mutual matches
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn matches(&self) -> Result<Vec<Match>, BackendError>;

    async fn add_match(&self, m: &Match) -> Result<(), BackendError>;
}

/// Per-tier accept-action quota
///
/// Consulted once per decision cycle; the verdict is never cached across
/// cycles.
#[async_trait]
pub trait QuotaGate: Send + Sync {
    async fn can_accept_now(&self) -> Result<QuotaVerdict, BackendError>;

    /// Spend one quota unit. Irreversible once it succeeds.
    async fn consume_one(&self) -> Result<(), BackendError>;
}

pub use rest::{RestBackend, RestCollections};
