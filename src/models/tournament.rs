//! Tournament container, phases, and TournamentError.

use crate::models::bracket::Bracket;
use crate::models::group::{Group, GroupId};
use crate::models::team::{Participant, ParticipantId, Team, TeamId, MAX_ROSTER};
use crate::models::team_match::{MatchId, TeamMatch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Tournament is not in a phase that allows this action.
    InvalidState,
    /// Not enough teams for this operation.
    NotEnoughTeams { required: usize, have: usize },
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// A team needs at least one roster member.
    EmptyRoster,
    /// Rosters hold at most 7 fencers.
    RosterTooLarge { size: usize },
    TeamNotFound(TeamId),
    MatchNotFound(MatchId),
    /// Duel positions run 1-7.
    InvalidSetPosition(u8),
    /// The duel already has a result; no further actions accepted.
    SetAlreadyCompleted,
    /// The team match is completed and terminal.
    MatchAlreadyCompleted,
    /// Bracket match is not ready to be played (slots still empty).
    MatchNotReady,
    /// Action references a fencer who is not on that side of the duel.
    UnknownParticipant(ParticipantId),
    /// The duel slot has no fencer on that side.
    MissingParticipant,
    /// Action kind not accepted from callers (e.g. hansoku_point).
    IllegalAction,
    /// Only the four strikes are legal in overtime.
    IllegalOvertimeAction,
    /// Overtime only starts after a full tie on set wins and points.
    OvertimeNotRequired,
    OvertimeAlreadyStarted,
    OvertimeNotStarted,
    /// Overtime already produced a winner; the match is decided.
    OvertimeAlreadyDecided,
    /// Undo requested on an empty action log.
    NothingToUndo,
    /// Cannot advance the stage while matches are unfinished.
    StageNotComplete { unfinished: usize },
    BracketMatchNotFound(usize),
    /// Placements require a completed grand final.
    BracketNotFinished,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::NotEnoughTeams { required, have } => {
                write!(f, "Need at least {} teams (have {})", required, have)
            }
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::EmptyRoster => write!(f, "A team needs at least one roster member"),
            TournamentError::RosterTooLarge { size } => {
                write!(f, "Roster has {} members; at most {} allowed", size, MAX_ROSTER)
            }
            TournamentError::TeamNotFound(_) => write!(f, "Team not found"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::InvalidSetPosition(p) => {
                write!(f, "Duel position {} is out of range (1-7)", p)
            }
            TournamentError::SetAlreadyCompleted => write!(f, "Duel already has a result"),
            TournamentError::MatchAlreadyCompleted => write!(f, "Team match is already completed"),
            TournamentError::MatchNotReady => write!(f, "Bracket match is not ready to be played"),
            TournamentError::UnknownParticipant(_) => {
                write!(f, "Fencer is not fighting on that side of the duel")
            }
            TournamentError::MissingParticipant => {
                write!(f, "No fencer on that side of the duel")
            }
            TournamentError::IllegalAction => write!(f, "Action kind not accepted from callers"),
            TournamentError::IllegalOvertimeAction => {
                write!(f, "Only the four strikes are legal in overtime")
            }
            TournamentError::OvertimeNotRequired => {
                write!(f, "Overtime only starts after a full tie on set wins and points")
            }
            TournamentError::OvertimeAlreadyStarted => write!(f, "Overtime already started"),
            TournamentError::OvertimeNotStarted => write!(f, "Overtime has not been started"),
            TournamentError::OvertimeAlreadyDecided => {
                write!(f, "Overtime already produced a winner")
            }
            TournamentError::NothingToUndo => write!(f, "No action to undo"),
            TournamentError::StageNotComplete { unfinished } => {
                write!(f, "{} match(es) still unfinished in this stage", unfinished)
            }
            TournamentError::BracketMatchNotFound(i) => {
                write!(f, "No bracket match at index {}", i)
            }
            TournamentError::BracketNotFinished => {
                write!(f, "Grand final has not been completed yet")
            }
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Registering teams; not started.
    #[default]
    Registration,
    /// Round-robin seed groups in play.
    SeedStage,
    /// Double-elimination bracket in play.
    BracketStage,
    /// Bracket finished; final rankings assigned.
    Completed,
}

/// Full tournament state: registered teams, seed groups, and the bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub teams: Vec<Team>,
    /// Requested seed group count (the generator may open more).
    pub group_count: usize,
    pub groups: Vec<Group>,
    pub bracket: Option<Bracket>,
    /// In-flight main-stage team matches, keyed by bracket arena index.
    pub bracket_matches: HashMap<usize, TeamMatch>,
    pub state: TournamentState,
}

impl Tournament {
    /// Create a new tournament in Registration with no teams.
    pub fn new(name: impl Into<String>, group_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams: Vec::new(),
            group_count: group_count.max(1),
            groups: Vec::new(),
            bracket: None,
            bracket_matches: HashMap::new(),
            state: TournamentState::Registration,
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// Register a team (Registration only). Names are unique, case-insensitive;
    /// the roster must have 1-7 members.
    pub fn register_team(
        &mut self,
        name: impl Into<String>,
        dojo: impl Into<String>,
        roster: Vec<Participant>,
    ) -> Result<TeamId, TournamentError> {
        if self.state != TournamentState::Registration {
            return Err(TournamentError::InvalidState);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::InvalidState);
        }
        if self
            .teams
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(name_trimmed))
        {
            return Err(TournamentError::DuplicateTeamName);
        }
        if roster.is_empty() {
            return Err(TournamentError::EmptyRoster);
        }
        if roster.len() > MAX_ROSTER {
            return Err(TournamentError::RosterTooLarge { size: roster.len() });
        }
        let team = Team::new(name_trimmed, dojo, roster);
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Remove a team by id (Registration only).
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        if self.state != TournamentState::Registration {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Mutable reference to a team match anywhere in the tournament
    /// (seed group fixtures first, then in-flight bracket matches).
    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut TeamMatch> {
        for group in &mut self.groups {
            if let Some(m) = group.matches.iter_mut().find(|m| m.id == id) {
                return Some(m);
            }
        }
        self.bracket_matches.values_mut().find(|m| m.id == id)
    }

    /// Id of the seed group owning a match, for standings recomputation.
    pub fn group_of_match(&self, id: MatchId) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|g| g.matches.iter().any(|m| m.id == id))
            .map(|g| g.id)
    }

    /// Bracket arena index of an in-flight main-stage match.
    pub fn bracket_index_of_match(&self, id: MatchId) -> Option<usize> {
        self.bracket_matches
            .iter()
            .find(|(_, m)| m.id == id)
            .map(|(idx, _)| *idx)
    }
}
