//! Seed group: a small round-robin pool with fixtures and standings.

use crate::models::team::{Team, TeamId};
use crate::models::team_match::{MatchStatus, Stage, TeamMatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a seed group.
pub type GroupId = Uuid;

/// Seed groups never hold more than this many teams.
pub const MAX_GROUP_TEAMS: usize = 3;

/// One row of a group standings table. Fully derived: safe to rebuild from
/// the group's completed matches at any time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team: TeamId,
    pub wins: u32,
    pub losses: u32,
    /// 2 per win, 1 per drawn team match.
    pub points: u32,
    /// 1-based, recomputed on every update.
    pub ranking: u32,
}

impl TeamStanding {
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            wins: 0,
            losses: 0,
            points: 0,
            ranking: 0,
        }
    }
}

/// A seed group. Team membership is fixed at creation; only match state and
/// the derived standings change afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub teams: Vec<TeamId>,
    /// Complete unordered round-robin pairing: n*(n-1)/2 matches.
    pub matches: Vec<TeamMatch>,
    pub standings: Vec<TeamStanding>,
}

impl Group {
    /// Create a group over the given member teams, generating the full
    /// round-robin fixture list and a zeroed standings table.
    pub fn new(name: impl Into<String>, members: &[&Team]) -> Self {
        let mut matches = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                matches.push(TeamMatch::new(members[i], members[j], Stage::Seed));
            }
        }
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams: members.iter().map(|t| t.id).collect(),
            matches,
            standings: members.iter().map(|t| TeamStanding::new(t.id)).collect(),
        }
    }

    /// True once every fixture in the group has been completed.
    pub fn is_finished(&self) -> bool {
        self.matches.iter().all(|m| m.status == MatchStatus::Completed)
    }

    pub fn standing_of(&self, team: TeamId) -> Option<&TeamStanding> {
        self.standings.iter().find(|s| s.team == team)
    }
}
