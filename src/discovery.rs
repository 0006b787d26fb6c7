use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::coordinator::MatchCoordinator;
use crate::core::feed::{build_feed, DiscoveryFeed};
use crate::core::scoring::{ScoreWeights, Scorer};
use crate::core::swipe::{SwipeController, SwipeDirection};
use crate::models::{DecisionOutcome, Profile, SwipeDecision};
use crate::services::{MatchStore, ProfileSource, QuotaGate};
use crate::session::{Session, SessionConfig, SessionError, SessionLoader};

/// Tuning for a discovery session
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Minimum horizontal drag distance that commits a decision
    pub commit_threshold: f32,
    pub weights: ScoreWeights,
    pub session: SessionConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            commit_threshold: 110.0,
            weights: ScoreWeights::default(),
            session: SessionConfig::default(),
        }
    }
}

/// One user's discovery session: feed, gesture state and decision cycle.
///
/// This is the surface the presentation layer talks to. Gesture input and
/// decision handling are serialized per session: a committed decision
/// latches the controller until its side effects resolve, so a user
/// swiping faster than the backend responds cannot overlap two cycles.
///
/// Every completed cycle emits exactly one `DecisionOutcome` on the event
/// channel handed out at load time. Side effects always run to completion;
/// if the receiver is gone (the UI tore the session down mid-cycle) the
/// outcome is discarded, never the write.
pub struct DiscoverySession<S, M, Q> {
    viewer: Profile,
    feed: DiscoveryFeed,
    controller: SwipeController,
    scorer: Scorer,
    coordinator: MatchCoordinator<M, Q>,
    source: Arc<S>,
    events: mpsc::UnboundedSender<DecisionOutcome>,
}

impl<S, M, Q> DiscoverySession<S, M, Q>
where
    S: ProfileSource,
    M: MatchStore,
    Q: QuotaGate,
{
    /// Bootstrap a session and hand back the decision event stream.
    pub async fn load(
        source: Arc<S>,
        store: Arc<M>,
        quota: Arc<Q>,
        config: DiscoveryConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DecisionOutcome>), SessionError> {
        let loader = SessionLoader::new(source.clone(), store.clone(), config.session.clone());
        let Session { viewer, feed } = loader.load().await?;

        let (events, receiver) = mpsc::unbounded_channel();

        let session = Self {
            viewer,
            feed,
            controller: SwipeController::new(config.commit_threshold),
            scorer: Scorer::new(config.weights),
            coordinator: MatchCoordinator::new(store, quota),
            source,
            events,
        };

        Ok((session, receiver))
    }

    pub fn viewer(&self) -> &Profile {
        &self.viewer
    }

    /// The candidate currently presented, or None once the feed is exhausted
    pub fn current_candidate(&self) -> Option<&Profile> {
        self.feed.current()
    }

    pub fn remaining_candidates(&self) -> usize {
        self.feed.remaining()
    }

    /// Advisory compatibility score for a candidate, 0-100
    pub fn compatibility_of(&self, candidate: &Profile) -> u8 {
        self.scorer.score(&self.viewer, candidate)
    }

    pub fn current_compatibility(&self) -> Option<u8> {
        self.feed
            .current()
            .map(|candidate| self.scorer.score(&self.viewer, candidate))
    }

    /// Live drag offset for card rendering
    pub fn gesture_offset(&self) -> Option<(f32, f32)> {
        self.controller.offset()
    }

    /// Pointer down. Ignored while a prior decision is still settling.
    pub fn on_gesture_start(&mut self) {
        if !self.controller.begin_gesture() {
            tracing::debug!("Gesture start ignored while a decision is in flight");
        }
    }

    /// Pointer moved to a cumulative offset from the gesture start
    pub fn on_gesture_sample(&mut self, dx: f32, dy: f32) {
        self.controller.sample(dx, dy);
    }

    /// Pointer up: run the decision cycle if the gesture committed.
    pub async fn on_gesture_end(&mut self) {
        let Some(direction) = self.controller.end_gesture() else {
            return;
        };

        let decision = match direction {
            SwipeDirection::Accept => SwipeDecision::Like,
            SwipeDirection::Reject => SwipeDecision::Pass,
        };

        self.run_cycle(decision).await;
    }

    /// Discrete button action, equivalent to a committed gesture.
    pub async fn on_discrete_action(&mut self, decision: SwipeDecision) {
        if !self.controller.try_latch() {
            tracing::debug!("Discrete action ignored while a decision is in flight");
            return;
        }

        self.run_cycle(decision).await;
    }

    /// Rebuild the feed from fresh pool data, resetting the cursor.
    ///
    /// Pool failures degrade to an empty feed, same as at load time.
    pub async fn refresh(&mut self) {
        let profiles = match self.source.all_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!("Refresh failed, feed left empty: {}", e);
                Vec::new()
            }
        };

        let matches = match self.coordinator.store().matches().await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Match list unavailable during refresh: {}", e);
                Vec::new()
            }
        };

        self.feed = build_feed(&self.viewer.id, profiles, &matches);

        tracing::info!(
            "Feed refreshed for {}: {} candidates",
            self.viewer.id,
            self.feed.len()
        );
    }

    async fn run_cycle(&mut self, decision: SwipeDecision) {
        let outcome = self
            .coordinator
            .decide(&mut self.feed, &self.viewer.id, decision)
            .await;

        // Side effects are already durable at this point. A closed channel
        // means the UI went away; the outcome is dropped, nothing else.
        if self.events.send(outcome).is_err() {
            tracing::debug!("Decision outcome discarded: session torn down");
        }

        self.controller.resolve();
    }
}
