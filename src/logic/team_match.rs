//! Team match engine: 7 duels, aggregate tallies, winner determination.

use crate::logic::duel;
use crate::models::{
    ActionKind, MatchStatus, ParticipantId, SetResult, Side, TeamId, TeamMatch, TournamentError,
    SETS_PER_MATCH,
};

/// What the submission collaborator gets back after every duel-state change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchProgress {
    pub status: MatchStatus,
    pub winner: Option<TeamId>,
    pub needs_overtime: bool,
}

fn ensure_open(m: &TeamMatch) -> Result<(), TournamentError> {
    if m.status == MatchStatus::Completed {
        return Err(TournamentError::MatchAlreadyCompleted);
    }
    Ok(())
}

fn duel_at(m: &mut TeamMatch, position: u8) -> Result<&mut crate::models::Duel, TournamentError> {
    m.set_mut(position)
        .ok_or(TournamentError::InvalidSetPosition(position))
}

/// Record a scoring action in one duel of the match.
pub fn record_action(
    m: &mut TeamMatch,
    position: u8,
    side: Side,
    participant: ParticipantId,
    kind: ActionKind,
) -> Result<MatchProgress, TournamentError> {
    ensure_open(m)?;
    duel::add_action(duel_at(m, position)?, side, participant, kind)?;
    Ok(refresh(m))
}

/// Undo the most recent action for one side of one duel (may un-complete it).
pub fn undo_action(
    m: &mut TeamMatch,
    position: u8,
    side: Side,
) -> Result<MatchProgress, TournamentError> {
    ensure_open(m)?;
    duel::undo_last_action(duel_at(m, position)?, side)?;
    Ok(refresh(m))
}

/// Manually set one duel's result (forfeits, corrections). Allowed until the
/// match itself is completed, including re-overriding an already-decided duel.
pub fn override_set(
    m: &mut TeamMatch,
    position: u8,
    result: SetResult,
) -> Result<MatchProgress, TournamentError> {
    ensure_open(m)?;
    duel::override_result(duel_at(m, position)?, result)?;
    Ok(refresh(m))
}

/// Resolve one duel by time expiry (live-clock flow).
pub fn expire_set(m: &mut TeamMatch, position: u8) -> Result<MatchProgress, TournamentError> {
    ensure_open(m)?;
    duel::expire_time(duel_at(m, position)?)?;
    Ok(refresh(m))
}

/// Re-derive the match aggregate from its 7 duels and decide the outcome.
///
/// Winner rules once all duels are complete: more set wins; else more total
/// points; else a full tie, which the engine refuses to finalize - status
/// becomes `Overtime` and no winner is assigned until the overtime engine
/// produces one. Mid-match the aggregates always reflect current tallies so
/// a persisted snapshot can be resumed.
pub fn refresh(m: &mut TeamMatch) -> MatchProgress {
    let mut red_wins = 0;
    let mut white_wins = 0;
    let mut red_points = 0;
    let mut white_points = 0;
    for d in &m.score.sets {
        red_points += d.red_points;
        white_points += d.white_points;
        match d.result.winning_side() {
            Some(Side::Red) => red_wins += 1,
            Some(Side::White) => white_wins += 1,
            None => {}
        }
    }
    m.score.red_set_wins = red_wins;
    m.score.white_set_wins = white_wins;
    m.score.red_points = red_points;
    m.score.white_points = white_points;
    m.current_set = m
        .score
        .sets
        .iter()
        .find(|d| !d.is_completed())
        .map(|d| d.position)
        .unwrap_or(SETS_PER_MATCH as u8);

    // A decided overtime settles the match regardless of duel tallies.
    if let Some(side) = m.overtime.as_ref().and_then(|ot| ot.winner) {
        m.winner = Some(m.team_for(side));
        m.status = MatchStatus::Completed;
        return progress(m);
    }

    let all_done = m.score.sets.iter().all(|d| d.is_completed());
    if !all_done {
        m.winner = None;
        let touched = m
            .score
            .sets
            .iter()
            .any(|d| d.is_completed() || !d.red_actions.is_empty() || !d.white_actions.is_empty());
        m.status = if touched {
            MatchStatus::InProgress
        } else {
            MatchStatus::Scheduled
        };
        // A correction re-opened the match: an unfinished overtime no longer applies.
        m.overtime = None;
        return progress(m);
    }

    let winning_side = if red_wins != white_wins {
        Some(if red_wins > white_wins { Side::Red } else { Side::White })
    } else if red_points != white_points {
        Some(if red_points > white_points { Side::Red } else { Side::White })
    } else {
        None
    };
    match winning_side {
        Some(side) => {
            m.winner = Some(m.team_for(side));
            m.status = MatchStatus::Completed;
            // The tie this overtime was answering no longer exists.
            if m.overtime.as_ref().map(|ot| ot.winner.is_none()).unwrap_or(false) {
                m.overtime = None;
            }
        }
        None => {
            m.winner = None;
            m.status = MatchStatus::Overtime;
        }
    }
    progress(m)
}

fn progress(m: &TeamMatch) -> MatchProgress {
    MatchProgress {
        status: m.status,
        winner: m.winner,
        needs_overtime: m.status == MatchStatus::Overtime,
    }
}
