//! Double-elimination bracket: an arena of matches linked by typed indices.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Index of a match within the bracket arena. Links between matches are these
/// handles rather than string ids.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct BracketMatchId(pub usize);

/// Which elimination ladder a bracket match belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    /// Waiting on upstream matches to fill both slots.
    Pending,
    /// Both slots filled, can be played.
    Ready,
    InProgress,
    Completed,
}

/// One slot-based bracket match. Slots for rounds beyond the first start empty
/// and fill in as upstream matches complete.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: BracketMatchId,
    pub side: BracketSide,
    /// 1-based round number within its bracket side.
    pub round: u32,
    pub slots: [Option<TeamId>; 2],
    pub status: BracketStatus,
    pub winner: Option<TeamId>,
    pub loser: Option<TeamId>,
    /// Where the winner goes next. None only for the grand final.
    pub next_winner: Option<BracketMatchId>,
    /// Where the loser drops. Set on winners-side matches only; losing in the
    /// losers bracket is elimination.
    pub next_loser: Option<BracketMatchId>,
    /// Structurally only one team can ever arrive here; auto-advances on fill.
    pub bye: bool,
}

impl BracketMatch {
    pub(crate) fn new(id: BracketMatchId, side: BracketSide, round: u32) -> Self {
        Self {
            id,
            side,
            round,
            slots: [None, None],
            status: BracketStatus::Pending,
            winner: None,
            loser: None,
            next_winner: None,
            next_loser: None,
            bye: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == BracketStatus::Completed
    }
}

/// Final placement of one team once the bracket has finished.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamPlacement {
    pub team: TeamId,
    /// 1-based; teams eliminated in the same losers round share a placement.
    pub placement: u32,
}

/// The whole double-elimination structure: winners rounds, losers rounds, and
/// a single grand final, all living in one arena.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub matches: Vec<BracketMatch>,
    pub winners_rounds: u32,
    pub losers_rounds: u32,
    pub grand_final: BracketMatchId,
}

impl Bracket {
    pub fn get(&self, id: BracketMatchId) -> Option<&BracketMatch> {
        self.matches.get(id.0)
    }

    pub fn get_mut(&mut self, id: BracketMatchId) -> Option<&mut BracketMatch> {
        self.matches.get_mut(id.0)
    }

    /// True once the grand final has a recorded winner.
    pub fn is_finished(&self) -> bool {
        self.get(self.grand_final)
            .map(|m| m.is_completed())
            .unwrap_or(false)
    }

    /// Matches on one side of the bracket in a given round, arena order.
    pub fn round_matches(&self, side: BracketSide, round: u32) -> Vec<&BracketMatch> {
        self.matches
            .iter()
            .filter(|m| m.side == side && m.round == round)
            .collect()
    }
}
