//! Tournament engine: seeding, standings, duel scoring, team matches,
//! overtime, and the double-elimination bracket.

mod bracket;
mod duel;
mod overtime;
mod seeding;
mod stage;
mod standings;
mod team_match;

pub use bracket::{advance_after_match, build_bracket, team_placements};
pub use duel::{add_action, expire_time, override_result, undo_last_action};
pub use overtime::{record_strike, start_overtime};
pub use seeding::generate_seed_groups;
pub use stage::{
    advance_to_bracket, finalize_tournament, start_seed_stage, QUALIFIERS_PER_GROUP,
};
pub use standings::recompute_standings;
pub use team_match::{
    expire_set, override_set, record_action, refresh, undo_action, MatchProgress,
};
