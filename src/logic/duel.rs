//! Duel scoring engine: one set between two fencers.
//!
//! The action logs are the authoritative representation. Penalty conversion
//! runs after every append, so at tally time a side's residual foul count is
//! always below two and points are just a count of scoring actions in the
//! side's own log.

use crate::models::{
    ActionKind, Duel, ParticipantId, ScoringAction, SetResult, Side, TournamentError, POINTS_TO_WIN,
};
use chrono::Utc;

/// Record one scoring action for a fencer and re-derive the duel state.
///
/// Rejected once the duel has a result, for `hansoku_point` (engine-awarded
/// only), and for fencers not fighting on the given side.
pub fn add_action(
    duel: &mut Duel,
    side: Side,
    participant: ParticipantId,
    kind: ActionKind,
) -> Result<(), TournamentError> {
    if duel.is_completed() {
        return Err(TournamentError::SetAlreadyCompleted);
    }
    if kind == ActionKind::HansokuPoint {
        return Err(TournamentError::IllegalAction);
    }
    let expected = duel
        .participant_for(side)
        .ok_or(TournamentError::MissingParticipant)?;
    if expected != participant {
        return Err(TournamentError::UnknownParticipant(participant));
    }
    if duel.started_at.is_none() {
        duel.started_at = Some(Utc::now());
    }
    duel.actions_mut(side).push(ScoringAction::new(kind, participant));
    convert_penalties(duel)?;
    retally(duel);
    check_completion(duel);
    Ok(())
}

/// Every two fouls by one side convert into one point credited to the
/// opponent's log; the converted fouls are removed (fouls reset modulo 2).
fn convert_penalties(duel: &mut Duel) -> Result<(), TournamentError> {
    for side in [Side::Red, Side::White] {
        let fouls = duel
            .actions(side)
            .iter()
            .filter(|a| a.kind == ActionKind::Hansoku)
            .count();
        let pairs = fouls / 2;
        if pairs == 0 {
            continue;
        }
        let opponent = duel
            .participant_for(side.opponent())
            .ok_or(TournamentError::MissingParticipant)?;
        let mut to_remove = pairs * 2;
        duel.actions_mut(side).retain(|a| {
            if a.kind == ActionKind::Hansoku && to_remove > 0 {
                to_remove -= 1;
                false
            } else {
                true
            }
        });
        for _ in 0..pairs {
            duel.actions_mut(side.opponent())
                .push(ScoringAction::new(ActionKind::HansokuPoint, opponent));
        }
    }
    Ok(())
}

/// Re-derive the stored point totals from the action logs.
pub(crate) fn retally(duel: &mut Duel) {
    duel.red_points = tally(&duel.red_actions);
    duel.white_points = tally(&duel.white_actions);
}

fn tally(log: &[ScoringAction]) -> u32 {
    log.iter().filter(|a| a.confirmed && a.kind.scores()).count() as u32
}

/// First side to reach 2 points wins immediately. Also reverses an
/// action-derived win when an undo drops a side back below the threshold.
fn check_completion(duel: &mut Duel) {
    if duel.red_points >= POINTS_TO_WIN {
        duel.result = SetResult::Win { side: Side::Red };
        duel.completed_at = Some(Utc::now());
    } else if duel.white_points >= POINTS_TO_WIN {
        duel.result = SetResult::Win { side: Side::White };
        duel.completed_at = Some(Utc::now());
    } else if matches!(duel.result, SetResult::Win { .. }) {
        duel.result = SetResult::Pending;
        duel.completed_at = None;
    }
}

/// Remove the most recently recorded action for one side, then re-run the
/// completion check (this may un-complete a won duel). Override results
/// (forfeit, draw, time expiry) are not action-derived and cannot be undone here.
pub fn undo_last_action(duel: &mut Duel, side: Side) -> Result<(), TournamentError> {
    match duel.result {
        SetResult::Pending | SetResult::Win { .. } => {}
        _ => return Err(TournamentError::SetAlreadyCompleted),
    }
    if duel.actions_mut(side).pop().is_none() {
        return Err(TournamentError::NothingToUndo);
    }
    retally(duel);
    check_completion(duel);
    Ok(())
}

/// Set a result directly, bypassing action-based scoring (forfeits, no-shows,
/// moderator corrections). Completes the duel immediately.
pub fn override_result(duel: &mut Duel, result: SetResult) -> Result<(), TournamentError> {
    if matches!(result, SetResult::Pending) {
        return Err(TournamentError::IllegalAction);
    }
    duel.result = result;
    duel.completed_at = Some(Utc::now());
    Ok(())
}

/// Live-clock variant: time ran out. Higher point total wins, equal totals draw.
pub fn expire_time(duel: &mut Duel) -> Result<(), TournamentError> {
    if duel.is_completed() {
        return Err(TournamentError::SetAlreadyCompleted);
    }
    duel.time_remaining_secs = Some(0);
    duel.result = if duel.red_points > duel.white_points {
        SetResult::TimeExpired { side: Side::Red }
    } else if duel.white_points > duel.red_points {
        SetResult::TimeExpired { side: Side::White }
    } else {
        SetResult::Draw
    };
    duel.completed_at = Some(Utc::now());
    Ok(())
}
