//! Duel-level scoring: action kinds, the per-duel action logs, and overtime data.

use crate::models::team::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A duel is won by the first side to reach this many points.
pub const POINTS_TO_WIN: u32 = 2;

/// Which side of a duel or team match a team/fencer fights on.
/// The first listed team takes red, the second white (ribbon convention).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Red,
    White,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::White,
            Side::White => Side::Red,
        }
    }
}

/// What a scoring action records: a valid strike, a foul, or a point credited
/// from the opponent's converted fouls.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Men,
    Kote,
    Tsuki,
    Do,
    Hansoku,
    /// Awarded by the engine when the opponent accumulates two fouls.
    /// Never accepted from callers.
    HansokuPoint,
}

impl ActionKind {
    /// One of the four valid strikes (the only kinds legal in overtime).
    pub fn is_strike(self) -> bool {
        matches!(
            self,
            ActionKind::Men | ActionKind::Kote | ActionKind::Tsuki | ActionKind::Do
        )
    }

    /// Whether this kind counts toward a side's point total.
    pub fn scores(self) -> bool {
        matches!(
            self,
            ActionKind::Men
                | ActionKind::Kote
                | ActionKind::Tsuki
                | ActionKind::Do
                | ActionKind::HansokuPoint
        )
    }
}

/// One append-only entry in a duel action log.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoringAction {
    pub id: Uuid,
    pub kind: ActionKind,
    pub participant: ParticipantId,
    pub confirmed: bool,
    pub recorded_at: DateTime<Utc>,
}

impl ScoringAction {
    pub fn new(kind: ActionKind, participant: ParticipantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            participant,
            confirmed: true,
            recorded_at: Utc::now(),
        }
    }
}

/// Outcome of a single duel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SetResult {
    Pending,
    /// Reached 2 points first.
    Win { side: Side },
    /// Clock ran out with this side ahead.
    TimeExpired { side: Side },
    Draw,
    /// The named side wins because the opponent forfeited or never showed.
    Forfeit { winner: Side },
}

impl SetResult {
    pub fn is_decided(&self) -> bool {
        !matches!(self, SetResult::Pending)
    }

    /// The side credited with a set win, if any (draws and pending yield none).
    pub fn winning_side(&self) -> Option<Side> {
        match self {
            SetResult::Win { side } | SetResult::TimeExpired { side } => Some(*side),
            SetResult::Forfeit { winner } => Some(*winner),
            SetResult::Pending | SetResult::Draw => None,
        }
    }
}

/// One duel (a "set") between the fencers at a roster position.
///
/// A missing participant on one side pre-resolves the duel as a forfeit for
/// the opponent; two missing participants pre-resolve it as a pointless draw.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Duel {
    /// Duel position within the team match, 1-7.
    pub position: u8,
    pub red: Option<ParticipantId>,
    pub white: Option<ParticipantId>,
    pub result: SetResult,
    pub red_actions: Vec<ScoringAction>,
    pub white_actions: Vec<ScoringAction>,
    /// Derived from the action logs; kept up to date by the scoring engine.
    pub red_points: u32,
    pub white_points: u32,
    pub time_limit_secs: Option<u32>,
    pub time_remaining_secs: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Duel {
    pub fn new(position: u8, red: Option<ParticipantId>, white: Option<ParticipantId>) -> Self {
        let (result, completed_at) = match (red, white) {
            (Some(_), Some(_)) => (SetResult::Pending, None),
            (Some(_), None) => (SetResult::Forfeit { winner: Side::Red }, Some(Utc::now())),
            (None, Some(_)) => (SetResult::Forfeit { winner: Side::White }, Some(Utc::now())),
            // Neither roster reaches this position: nothing to fence.
            (None, None) => (SetResult::Draw, Some(Utc::now())),
        };
        Self {
            position,
            red,
            white,
            result,
            red_actions: Vec::new(),
            white_actions: Vec::new(),
            red_points: 0,
            white_points: 0,
            time_limit_secs: None,
            time_remaining_secs: None,
            started_at: None,
            completed_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_decided()
    }

    pub fn participant_for(&self, side: Side) -> Option<ParticipantId> {
        match side {
            Side::Red => self.red,
            Side::White => self.white,
        }
    }

    pub fn actions(&self, side: Side) -> &Vec<ScoringAction> {
        match side {
            Side::Red => &self.red_actions,
            Side::White => &self.white_actions,
        }
    }

    pub fn actions_mut(&mut self, side: Side) -> &mut Vec<ScoringAction> {
        match side {
            Side::Red => &mut self.red_actions,
            Side::White => &mut self.white_actions,
        }
    }

    pub fn points(&self, side: Side) -> u32 {
        match side {
            Side::Red => self.red_points,
            Side::White => self.white_points,
        }
    }
}

/// Sudden-death tiebreak: one nominee per side, first valid strike wins the
/// whole team match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Overtime {
    pub red_nominee: ParticipantId,
    pub white_nominee: ParticipantId,
    /// Strike kinds only; fouls are not scored in overtime.
    pub actions: Vec<ScoringAction>,
    pub winner: Option<Side>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Overtime {
    pub fn new(red_nominee: ParticipantId, white_nominee: ParticipantId) -> Self {
        Self {
            red_nominee,
            white_nominee,
            actions: Vec::new(),
            winner: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn nominee_for(&self, side: Side) -> ParticipantId {
        match side {
            Side::Red => self.red_nominee,
            Side::White => self.white_nominee,
        }
    }
}
