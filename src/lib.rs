//! Team kendo tournament web app: library with models and the scoring engine.

pub mod logic;
pub mod models;

pub use logic::{
    advance_after_match, advance_to_bracket, build_bracket, finalize_tournament,
    generate_seed_groups, recompute_standings, record_action, record_strike, refresh,
    start_overtime, start_seed_stage, team_placements, MatchProgress,
};
pub use models::{
    ActionKind, Bracket, BracketMatch, BracketMatchId, BracketSide, BracketStatus, Duel, Group,
    GroupId, MatchId, MatchScore, MatchStatus, Overtime, Participant, ParticipantId, ScoringAction,
    SetResult, Side, Stage, Team, TeamId, TeamMatch, TeamPlacement, TeamStanding, Tournament,
    TournamentError, TournamentId, TournamentState, MAX_GROUP_TEAMS, MAX_ROSTER, POINTS_TO_WIN,
    SETS_PER_MATCH,
};
