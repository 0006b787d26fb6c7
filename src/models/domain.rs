use serde::{Deserialize, Serialize};

/// Collaboration roles a profile can advertise.
///
/// This is a closed set; documents carrying an unknown role fail to
/// deserialize and are dropped at the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollabRole {
    Producer,
    Vocalist,
    Guitarist,
    Bassist,
    Drummer,
    Keyboardist,
    Dj,
    Songwriter,
    Engineer,
}

/// Media highlight attached to a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HighlightKind,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Audio,
    Video,
    Image,
}

/// Collaborator profile with role, genre and media data
///
/// All non-id fields default so partially-present documents still decode;
/// `is_complete` is the eligibility predicate applied before a profile is
/// shown or scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<CollabRole>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(rename = "isVerified", default)]
    pub verified: bool,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

impl Profile {
    /// A profile is presentable only with an id, a non-blank name and a role.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.name.trim().is_empty() && self.role.is_some()
    }
}

/// Mutual match between two users
///
/// The pair is unordered: a match between A and B is the same match
/// regardless of who initiated it. `is_read` belongs to messaging and is
/// carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "matchedUserId")]
    pub matched_user_id: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
}

impl Match {
    /// Create a fresh match with a new id and the current timestamp
    pub fn new(user_id: &str, matched_user_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            matched_user_id: matched_user_id.to_string(),
            matched_at: chrono::Utc::now(),
            is_read: false,
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.matched_user_id == user_id
    }

    /// The other side of the pair, if `user_id` is part of it
    pub fn partner_of(&self, user_id: &str) -> Option<&str> {
        if self.user_id == user_id {
            Some(&self.matched_user_id)
        } else if self.matched_user_id == user_id {
            Some(&self.user_id)
        } else {
            None
        }
    }

    /// Order-insensitive pair equality
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.user_id == a && self.matched_user_id == b)
            || (self.user_id == b && self.matched_user_id == a)
    }
}

/// A single swipe decision
///
/// SuperLike is quota- and match-identical to Like; the distinction is
/// presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDecision {
    Pass,
    Like,
    SuperLike,
}

impl SwipeDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, SwipeDecision::Like | SwipeDecision::SuperLike)
    }
}

/// Current quota standing for an accept action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaVerdict {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl QuotaVerdict {
    pub fn allow() -> Self {
        Self { allowed: true, reason: None }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self { allowed: false, reason: Some(reason.into()) }
    }
}

/// Outcome of one full decision cycle, emitted on the decision event stream
#[derive(Debug, Clone)]
pub enum DecisionOutcome {
    /// Candidate was passed on; nothing persisted
    Skipped,
    /// Accept persisted as a mutual match
    Matched(Match),
    /// Accept blocked by the quota gate; the candidate is still showing
    QuotaExceeded { reason: String },
    /// Match could not be persisted; the feed moved on regardless
    PersistenceFailed { candidate_id: String },
}
