//! Data structures for the kendo tournament: teams, groups, matches, brackets.

mod bracket;
mod group;
mod scoring;
mod team;
mod team_match;
mod tournament;

pub use bracket::{
    Bracket, BracketMatch, BracketMatchId, BracketSide, BracketStatus, TeamPlacement,
};
pub use group::{Group, GroupId, TeamStanding, MAX_GROUP_TEAMS};
pub use scoring::{
    ActionKind, Duel, Overtime, ScoringAction, SetResult, Side, POINTS_TO_WIN,
};
pub use team::{Participant, ParticipantId, Team, TeamId, MAX_ROSTER};
pub use team_match::{MatchId, MatchScore, MatchStatus, Stage, TeamMatch, SETS_PER_MATCH};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentState};
