//! Team match: 7 sequential duels, aggregate score, and match status.

use crate::models::scoring::{Duel, Overtime, Side};
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team match.
pub type MatchId = Uuid;

/// Duels per team match, one per roster position.
pub const SETS_PER_MATCH: usize = 7;

/// Which phase of the tournament the match belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Round-robin seed group match.
    Seed,
    /// Double-elimination bracket match.
    Main,
}

/// Lifecycle of a team match. `Overtime` means all 7 duels are complete but
/// both set wins and points are tied; only the overtime engine can complete it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Overtime,
    Completed,
}

/// Match-level aggregate, recomputed from the 7 duels after every change.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub red_set_wins: u32,
    pub white_set_wins: u32,
    pub red_points: u32,
    pub white_points: u32,
    /// Always exactly 7 entries, positions 1-7 in order.
    pub sets: Vec<Duel>,
}

/// A team match between two registered teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamMatch {
    pub id: MatchId,
    pub red_team: TeamId,
    pub white_team: TeamId,
    pub stage: Stage,
    pub status: MatchStatus,
    /// First not-yet-completed duel position (stays at 7 once all are done).
    pub current_set: u8,
    pub score: MatchScore,
    pub winner: Option<TeamId>,
    pub overtime: Option<Overtime>,
}

impl TeamMatch {
    /// Create a scheduled match, snapshotting duel participants from the two
    /// rosters. Positions one roster does not reach pre-resolve as forfeits.
    pub fn new(red: &Team, white: &Team, stage: Stage) -> Self {
        let sets: Vec<Duel> = (1..=SETS_PER_MATCH as u8)
            .map(|pos| {
                Duel::new(
                    pos,
                    red.participant_at(pos).map(|p| p.id),
                    white.participant_at(pos).map(|p| p.id),
                )
            })
            .collect();
        Self {
            id: Uuid::new_v4(),
            red_team: red.id,
            white_team: white.id,
            stage,
            status: MatchStatus::Scheduled,
            current_set: 1,
            score: MatchScore {
                red_set_wins: 0,
                white_set_wins: 0,
                red_points: 0,
                white_points: 0,
                sets,
            },
            winner: None,
            overtime: None,
        }
    }

    pub fn team_for(&self, side: Side) -> TeamId {
        match side {
            Side::Red => self.red_team,
            Side::White => self.white_team,
        }
    }

    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.red_team {
            Some(Side::Red)
        } else if team == self.white_team {
            Some(Side::White)
        } else {
            None
        }
    }

    /// Duel at the given position (1-7).
    pub fn set(&self, position: u8) -> Option<&Duel> {
        if position == 0 {
            return None;
        }
        self.score.sets.get(position as usize - 1)
    }

    pub fn set_mut(&mut self, position: u8) -> Option<&mut Duel> {
        if position == 0 {
            return None;
        }
        self.score.sets.get_mut(position as usize - 1)
    }

    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        self.side_of(team).map(|s| self.team_for(s.opponent()))
    }
}
