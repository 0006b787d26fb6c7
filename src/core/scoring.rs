use crate::models::{CollabRole, Profile};

/// Neutral score returned for incomplete or malformed profiles.
///
/// One bad record must never block the feed, so the scorer degrades to the
/// midpoint instead of failing the caller.
pub const NEUTRAL_SCORE: u8 = 50;

/// Base score every scoreable pair starts from
const BASE_SCORE: f64 = 50.0;

/// Term weights for the compatibility score
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub genre: f64,
    pub role_complement: f64,
    pub role_identical: f64,
    pub location: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            genre: 40.0,
            role_complement: 30.0,
            role_identical: 15.0,
            location: 20.0,
        }
    }
}

/// Compatibility scorer - pure and deterministic
///
/// Scoring formula:
/// score = clamp(
///     50                           # base
///     + genre_overlap * 40         # shared genres, normalized
///     + role term (30 / 15 / 0)    # complementary / identical / neither
///     + location term (20 / 0),    # exact location match
///     0, 100)
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }

    /// Score a candidate against the viewer, 0-100.
    ///
    /// Incomplete profiles on either side yield exactly `NEUTRAL_SCORE`.
    pub fn score(&self, viewer: &Profile, candidate: &Profile) -> u8 {
        if !viewer.is_complete() || !candidate.is_complete() {
            return NEUTRAL_SCORE;
        }

        let genre = genre_overlap_term(&viewer.genres, &candidate.genres, self.weights.genre);
        let role = role_term(viewer.role, candidate.role, &self.weights);
        let location = location_term(&viewer.location, &candidate.location, self.weights.location);

        let total = BASE_SCORE + genre + role + location;

        total.clamp(0.0, 100.0).round() as u8
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Genre overlap term (0 to `weight`)
///
/// Overlap is normalized against the larger genre set; genre lists are
/// treated as sets, so duplicate entries do not inflate the overlap.
#[inline]
fn genre_overlap_term(viewer_genres: &[String], candidate_genres: &[String], weight: f64) -> f64 {
    use std::collections::HashSet;

    let viewer: HashSet<&str> = viewer_genres.iter().map(String::as_str).collect();
    let candidate: HashSet<&str> = candidate_genres.iter().map(String::as_str).collect();

    if viewer.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let shared = viewer.intersection(&candidate).count() as f64;
    let denom = viewer.len().max(candidate.len()).max(1) as f64;

    ((shared / denom) * weight).clamp(0.0, weight)
}

/// Role term: complementary pairs score highest, identical roles half that
#[inline]
fn role_term(viewer: Option<CollabRole>, candidate: Option<CollabRole>, weights: &ScoreWeights) -> f64 {
    match (viewer, candidate) {
        (Some(a), Some(b)) if roles_complement(a, b) => weights.role_complement,
        (Some(a), Some(b)) if a == b => weights.role_identical,
        _ => 0.0,
    }
}

/// Fixed complementary-role table, symmetric
fn roles_complement(a: CollabRole, b: CollabRole) -> bool {
    use CollabRole::*;

    const PAIRS: &[(CollabRole, CollabRole)] = &[
        (Producer, Vocalist),
        (Producer, Songwriter),
        (Songwriter, Vocalist),
        (Engineer, Producer),
        (Dj, Vocalist),
        (Guitarist, Drummer),
        (Bassist, Drummer),
        (Keyboardist, Vocalist),
    ];

    PAIRS.iter().any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Location term: exact, case-sensitive equality.
///
/// Known to be brittle for real geographic proximity; kept as an exact
/// match until location data gets normalized upstream.
#[inline]
fn location_term(viewer: &str, candidate: &str, weight: f64) -> f64 {
    if !viewer.is_empty() && viewer == candidate {
        weight
    } else {
        0.0
    }
}
