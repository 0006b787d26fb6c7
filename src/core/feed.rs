use std::collections::HashSet;

use crate::models::{Match, Profile};

/// Ordered, de-duplicated candidate queue for one viewer
///
/// Built fresh on every load or refresh, never persisted. The cursor is
/// owned exclusively by one session; only the match coordinator advances it.
#[derive(Debug, Clone)]
pub struct DiscoveryFeed {
    candidates: Vec<Profile>,
    cursor: usize,
}

impl DiscoveryFeed {
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            cursor: 0,
        }
    }

    /// The candidate currently presented, or None once the feed is exhausted
    pub fn current(&self) -> Option<&Profile> {
        self.candidates.get(self.cursor)
    }

    /// Move past the current candidate.
    ///
    /// Advancing an exhausted feed is a no-op; the cursor never runs past
    /// the end.
    pub fn advance(&mut self) {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Build the discovery feed for a viewer from the raw profile pool.
///
/// Keeps source order: the score shown on a card is advisory metadata, not
/// a sort key. Excluded outright: the viewer's own profile, anyone already
/// matched with the viewer, incomplete records, duplicate ids. An empty
/// result is a normal terminal state, not an error.
pub fn build_feed(viewer_id: &str, profiles: Vec<Profile>, matches: &[Match]) -> DiscoveryFeed {
    let matched_ids: HashSet<&str> = matches
        .iter()
        .filter_map(|m| m.partner_of(viewer_id))
        .collect();

    let total = profiles.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for profile in profiles {
        if profile.id == viewer_id {
            continue;
        }
        if matched_ids.contains(profile.id.as_str()) {
            continue;
        }
        if !profile.is_complete() {
            tracing::debug!("Dropping incomplete profile record: {}", profile.id);
            continue;
        }
        if !seen.insert(profile.id.clone()) {
            continue;
        }
        candidates.push(profile);
    }

    tracing::debug!(
        "Built feed for {}: {} candidates ({} excluded)",
        viewer_id,
        candidates.len(),
        total - candidates.len()
    );

    DiscoveryFeed {
        candidates,
        cursor: 0,
    }
}
