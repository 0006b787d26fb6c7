use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::feed::{build_feed, DiscoveryFeed};
use crate::models::Profile;
use crate::services::{MatchStore, ProfileSource};

/// Errors surfaced by session bootstrap
///
/// The variants deliberately split by recovery action: a timeout suggests a
/// retry, a missing profile redirects to profile setup.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Viewer profile could not be fetched: {0}")]
    ProfileUnavailable(String),

    #[error("No profile exists for the session user")]
    ProfileNotFound,

    #[error("Session load timed out")]
    Timeout,
}

/// Retry and timeout tuning for session bootstrap
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Attempts for the viewer-profile fetch
    pub retry_attempts: u32,
    /// Base backoff delay, doubled per attempt
    pub retry_base_delay_ms: u64,
    /// Bound on the entire load
    pub load_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_base_delay_ms: 200,
            load_timeout_secs: 10,
        }
    }
}

/// A bootstrapped discovery session: the viewer plus their candidate queue
#[derive(Debug, Clone)]
pub struct Session {
    pub viewer: Profile,
    pub feed: DiscoveryFeed,
}

/// Resilient session bootstrap
///
/// The viewer profile is the one unrecoverable input, so its fetch retries
/// with exponential backoff. Pool fetches are best-effort: a failed pool
/// degrades to an empty collection and a smaller (possibly empty) feed
/// rather than an unusable session.
pub struct SessionLoader<S, M> {
    source: Arc<S>,
    store: Arc<M>,
    config: SessionConfig,
}

impl<S, M> SessionLoader<S, M>
where
    S: ProfileSource,
    M: MatchStore,
{
    pub fn new(source: Arc<S>, store: Arc<M>, config: SessionConfig) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Load the viewer profile and build the initial feed.
    ///
    /// The whole load is bounded by `load_timeout_secs`.
    pub async fn load(&self) -> Result<Session, SessionError> {
        let timeout = Duration::from_secs(self.config.load_timeout_secs);

        tokio::time::timeout(timeout, self.load_inner())
            .await
            .map_err(|_| {
                tracing::warn!("Session load exceeded {:?}", timeout);
                SessionError::Timeout
            })?
    }

    async fn load_inner(&self) -> Result<Session, SessionError> {
        let viewer = self.fetch_viewer_with_retry().await?;

        // Pool fetches are best-effort; the session stays usable with a
        // smaller feed
        let profiles = match self.source.all_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!("Profile pool unavailable, loading with empty feed: {}", e);
                Vec::new()
            }
        };

        let matches = match self.store.matches().await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Match list unavailable, feed may repeat matched users: {}", e);
                Vec::new()
            }
        };

        let feed = build_feed(&viewer.id, profiles, &matches);

        tracing::info!(
            "Session loaded for {}: {} candidates",
            viewer.id,
            feed.len()
        );

        Ok(Session { viewer, feed })
    }

    async fn fetch_viewer_with_retry(&self) -> Result<Profile, SessionError> {
        let attempts = self.config.retry_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match self.source.current_profile().await {
                // A definitive "no profile" is not retried; the caller
                // redirects to profile setup instead
                Ok(None) => return Err(SessionError::ProfileNotFound),
                Ok(Some(profile)) => return Ok(profile),
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!(
                        "Viewer profile fetch failed (attempt {}/{}): {}",
                        attempt + 1,
                        attempts,
                        e
                    );

                    if attempt + 1 < attempts {
                        let delay = self.config.retry_base_delay_ms * (1u64 << attempt);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        Err(SessionError::ProfileUnavailable(last_error))
    }
}
