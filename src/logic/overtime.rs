//! Overtime engine: sudden-death single duel, first valid strike takes the match.

use crate::logic::team_match::{self, MatchProgress};
use crate::models::{
    ActionKind, MatchStatus, Overtime, ParticipantId, ScoringAction, Side, TeamMatch,
    TournamentError,
};
use chrono::Utc;

/// Open overtime with one caller-nominated fencer per side (typically the
/// captains' picks). Only legal once the match has tied on both set wins and
/// points. Nominees must have fought in one of their side's duel slots.
pub fn start_overtime(
    m: &mut TeamMatch,
    red_nominee: ParticipantId,
    white_nominee: ParticipantId,
) -> Result<(), TournamentError> {
    if m.status != MatchStatus::Overtime {
        return Err(TournamentError::OvertimeNotRequired);
    }
    if m.overtime.is_some() {
        return Err(TournamentError::OvertimeAlreadyStarted);
    }
    if !m.score.sets.iter().any(|d| d.red == Some(red_nominee)) {
        return Err(TournamentError::UnknownParticipant(red_nominee));
    }
    if !m.score.sets.iter().any(|d| d.white == Some(white_nominee)) {
        return Err(TournamentError::UnknownParticipant(white_nominee));
    }
    m.overtime = Some(Overtime::new(red_nominee, white_nominee));
    Ok(())
}

/// Record a strike by one nominee. The first confirmed strike ends the whole
/// team match; fouls are rejected and there is no re-entry once decided.
pub fn record_strike(
    m: &mut TeamMatch,
    side: Side,
    participant: ParticipantId,
    kind: ActionKind,
) -> Result<MatchProgress, TournamentError> {
    let ot = m.overtime.as_mut().ok_or(TournamentError::OvertimeNotStarted)?;
    if ot.winner.is_some() {
        return Err(TournamentError::OvertimeAlreadyDecided);
    }
    if !kind.is_strike() {
        return Err(TournamentError::IllegalOvertimeAction);
    }
    if participant != ot.nominee_for(side) {
        return Err(TournamentError::UnknownParticipant(participant));
    }
    ot.actions.push(ScoringAction::new(kind, participant));
    ot.winner = Some(side);
    ot.completed_at = Some(Utc::now());
    Ok(team_match::refresh(m))
}
