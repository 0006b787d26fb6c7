use std::sync::Arc;

use crate::core::feed::DiscoveryFeed;
use crate::models::{DecisionOutcome, Match, SwipeDecision};
use crate::services::{MatchStore, QuotaGate};

/// Orchestrates one full decision cycle: quota, persistence, cursor.
///
/// The protocol is strictly ordered and each step's failure short-circuits
/// the rest. The cursor advances exactly once per completed cycle on every
/// branch except a quota block, which leaves the candidate showing so the
/// user can retry after upgrading or waiting for the reset.
pub struct MatchCoordinator<M, Q> {
    store: Arc<M>,
    quota: Arc<Q>,
}

impl<M, Q> MatchCoordinator<M, Q>
where
    M: MatchStore,
    Q: QuotaGate,
{
    pub fn new(store: Arc<M>, quota: Arc<Q>) -> Self {
        Self { store, quota }
    }

    pub fn store(&self) -> &Arc<M> {
        &self.store
    }

    /// Run one decision cycle against the feed's current candidate.
    ///
    /// A rejection is free and unlimited: no quota call, no persistence.
    /// An accept walks quota check -> quota consume -> persist; a unit
    /// spent on a failed persist stays spent rather than requiring a
    /// transaction across two independently-owned stores.
    pub async fn decide(
        &self,
        feed: &mut DiscoveryFeed,
        viewer_id: &str,
        decision: SwipeDecision,
    ) -> DecisionOutcome {
        let Some(candidate) = feed.current() else {
            tracing::debug!("Decision on an exhausted feed ignored");
            return DecisionOutcome::Skipped;
        };
        let candidate_id = candidate.id.clone();

        if !decision.is_accept() {
            feed.advance();
            tracing::debug!("{} passed on {}", viewer_id, candidate_id);
            return DecisionOutcome::Skipped;
        }

        // Quota verdict is fetched per cycle, never cached. Gate errors
        // fail closed: nothing is spent and the candidate stays put.
        let verdict = match self.quota.can_accept_now().await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Quota gate unavailable, blocking accept: {}", e);
                return DecisionOutcome::QuotaExceeded {
                    reason: "Quota service unavailable".to_string(),
                };
            }
        };

        if !verdict.allowed {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "Daily like limit reached".to_string());
            tracing::info!("Accept blocked by quota for {}: {}", viewer_id, reason);
            return DecisionOutcome::QuotaExceeded { reason };
        }

        if let Err(e) = self.quota.consume_one().await {
            tracing::warn!("Failed to consume quota unit, blocking accept: {}", e);
            return DecisionOutcome::QuotaExceeded {
                reason: "Quota service unavailable".to_string(),
            };
        }

        let m = Match::new(viewer_id, &candidate_id);

        match self.store.add_match(&m).await {
            Ok(()) => {
                feed.advance();
                tracing::info!("Matched {} with {}", viewer_id, candidate_id);
                DecisionOutcome::Matched(m)
            }
            Err(e) => {
                // The feed moves on regardless: a transient backend error
                // must not trap the user on one candidate. The quota unit
                // stays spent.
                feed.advance();
                tracing::error!("Failed to persist match with {}: {}", candidate_id, e);
                DecisionOutcome::PersistenceFailed { candidate_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feed::build_feed;
    use crate::models::{CollabRole, Profile, QuotaVerdict};
    use crate::services::BackendError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("User {}", id),
            role: Some(CollabRole::Vocalist),
            location: "Berlin".to_string(),
            genres: vec!["jazz".to_string()],
            bio: String::new(),
            rating: 4.0,
            verified: false,
            highlights: vec![],
        }
    }

    #[derive(Default)]
    struct FakeStore {
        matches: Mutex<Vec<Match>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl MatchStore for FakeStore {
        async fn matches(&self) -> Result<Vec<Match>, BackendError> {
            Ok(self.matches.lock().unwrap().clone())
        }

        async fn add_match(&self, m: &Match) -> Result<(), BackendError> {
            if self.fail_writes {
                return Err(BackendError::ApiError("write failed".into()));
            }
            let mut matches = self.matches.lock().unwrap();
            // The store enforces pair uniqueness
            if matches
                .iter()
                .any(|existing| existing.is_between(&m.user_id, &m.matched_user_id))
            {
                return Err(BackendError::ApiError("duplicate pair".into()));
            }
            matches.push(m.clone());
            Ok(())
        }
    }

    struct FakeQuota {
        verdict: QuotaVerdict,
        consumed: Mutex<u32>,
        fail_gate: bool,
    }

    impl FakeQuota {
        fn allowing() -> Self {
            Self {
                verdict: QuotaVerdict::allow(),
                consumed: Mutex::new(0),
                fail_gate: false,
            }
        }

        fn blocking(reason: &str) -> Self {
            Self {
                verdict: QuotaVerdict::block(reason),
                consumed: Mutex::new(0),
                fail_gate: false,
            }
        }
    }

    #[async_trait]
    impl QuotaGate for FakeQuota {
        async fn can_accept_now(&self) -> Result<QuotaVerdict, BackendError> {
            if self.fail_gate {
                return Err(BackendError::ApiError("gate down".into()));
            }
            Ok(self.verdict.clone())
        }

        async fn consume_one(&self) -> Result<(), BackendError> {
            *self.consumed.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_pass_is_free_and_advances() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota::blocking("would block an accept"));
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![profile("a"), profile("b")], &[]);
        let outcome = coordinator.decide(&mut feed, "me", SwipeDecision::Pass).await;

        // Pass never consults the gate, even a blocking one
        assert!(matches!(outcome, DecisionOutcome::Skipped));
        assert_eq!(feed.position(), 1);
        assert_eq!(*quota.consumed.lock().unwrap(), 0);
        assert!(store.matches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_like_persists_and_advances() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota::allowing());
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![profile("a"), profile("b")], &[]);
        let outcome = coordinator.decide(&mut feed, "me", SwipeDecision::Like).await;

        match outcome {
            DecisionOutcome::Matched(m) => assert!(m.is_between("me", "a")),
            other => panic!("Expected Matched, got {:?}", other),
        }
        assert_eq!(feed.position(), 1);
        assert_eq!(*quota.consumed.lock().unwrap(), 1);
        assert_eq!(store.matches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quota_block_leaves_candidate_showing() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota::blocking("upgrade to keep liking"));
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![profile("a")], &[]);
        let outcome = coordinator.decide(&mut feed, "me", SwipeDecision::Like).await;

        match outcome {
            DecisionOutcome::QuotaExceeded { reason } => {
                assert_eq!(reason, "upgrade to keep liking")
            }
            other => panic!("Expected QuotaExceeded, got {:?}", other),
        }
        // Candidate not consumed by the blocked attempt
        assert_eq!(feed.position(), 0);
        assert_eq!(feed.current().unwrap().id, "a");
        assert_eq!(*quota.consumed.lock().unwrap(), 0);
        assert!(store.matches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gate_error_fails_closed() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota {
            verdict: QuotaVerdict::allow(),
            consumed: Mutex::new(0),
            fail_gate: true,
        });
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![profile("a")], &[]);
        let outcome = coordinator.decide(&mut feed, "me", SwipeDecision::Like).await;

        assert!(matches!(outcome, DecisionOutcome::QuotaExceeded { .. }));
        assert_eq!(feed.position(), 0);
        assert!(store.matches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_still_advances() {
        let store = Arc::new(FakeStore {
            matches: Mutex::new(vec![]),
            fail_writes: true,
        });
        let quota = Arc::new(FakeQuota::allowing());
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![profile("a"), profile("b")], &[]);
        let outcome = coordinator.decide(&mut feed, "me", SwipeDecision::Like).await;

        match outcome {
            DecisionOutcome::PersistenceFailed { candidate_id } => {
                assert_eq!(candidate_id, "a")
            }
            other => panic!("Expected PersistenceFailed, got {:?}", other),
        }
        // The user is not trapped on the candidate, and the quota unit
        // stays spent
        assert_eq!(feed.position(), 1);
        assert_eq!(*quota.consumed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_super_like_behaves_like_like() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota::allowing());
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![profile("a")], &[]);
        let outcome = coordinator
            .decide(&mut feed, "me", SwipeDecision::SuperLike)
            .await;

        assert!(matches!(outcome, DecisionOutcome::Matched(_)));
        assert_eq!(*quota.consumed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_feed_is_a_noop() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota::allowing());
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        let mut feed = build_feed("me", vec![], &[]);
        let outcome = coordinator.decide(&mut feed, "me", SwipeDecision::Like).await;

        assert!(matches!(outcome, DecisionOutcome::Skipped));
        assert_eq!(*quota.consumed.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_duplicate_match_per_pair() {
        let store = Arc::new(FakeStore::default());
        let quota = Arc::new(FakeQuota::allowing());
        let coordinator = MatchCoordinator::new(store.clone(), quota.clone());

        // Two feeds that both surface "a" (e.g. a stale refresh)
        let mut first = build_feed("me", vec![profile("a")], &[]);
        let outcome = coordinator.decide(&mut first, "me", SwipeDecision::Like).await;
        assert!(matches!(outcome, DecisionOutcome::Matched(_)));

        let mut stale = build_feed("me", vec![profile("a")], &[]);
        let outcome = coordinator.decide(&mut stale, "me", SwipeDecision::Like).await;

        // The store rejects the duplicate pair; exactly one match survives
        assert!(matches!(outcome, DecisionOutcome::PersistenceFailed { .. }));
        assert_eq!(store.matches.lock().unwrap().len(), 1);

        // A feed built from current matches no longer surfaces "a"
        let matches = store.matches().await.unwrap();
        let rebuilt = build_feed("me", vec![profile("a")], &matches);
        assert!(rebuilt.is_exhausted());
    }
}
