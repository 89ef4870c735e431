//! Team and Participant data structures (rosters come from the registration side).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches, standings, and brackets).
pub type TeamId = Uuid;

/// Unique identifier for a participant (a fencer on a team roster).
pub type ParticipantId = Uuid;

/// A team roster holds at most 7 fencers, one per duel position.
pub const MAX_ROSTER: usize = 7;

/// A fencer on a team roster. Roster order defines the duel position (1-7).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Optional dan/kyu grade, display metadata only.
    pub rank: Option<String>,
}

impl Participant {
    /// Create a new participant with no grade.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rank: None,
        }
    }

    /// Create a new participant with a grade (e.g. "3-dan").
    pub fn with_rank(name: impl Into<String>, rank: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rank: Some(rank.into()),
        }
    }
}

/// A registered team: affiliation ("dojo") plus an ordered roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Affiliation key; the seed group generator spreads same-dojo teams apart.
    pub dojo: String,
    /// Ordered roster, at most 7. Position i fences duel i+1.
    pub roster: Vec<Participant>,
    /// Assigned when the team qualifies out of the seed groups.
    pub seed_ranking: Option<u32>,
    /// Assigned when the bracket is finalized.
    pub final_ranking: Option<u32>,
}

impl Team {
    pub fn new(name: impl Into<String>, dojo: impl Into<String>, roster: Vec<Participant>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            dojo: dojo.into(),
            roster,
            seed_ranking: None,
            final_ranking: None,
        }
    }

    /// Participant fencing the given duel position (1-7), if the roster reaches it.
    pub fn participant_at(&self, position: u8) -> Option<&Participant> {
        if position == 0 {
            return None;
        }
        self.roster.get(position as usize - 1)
    }
}
