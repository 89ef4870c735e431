//! Whole-tournament phase transitions: registration -> seed groups -> bracket.

use crate::logic::{bracket, seeding, standings};
use crate::models::{
    MatchStatus, TeamId, TeamPlacement, Tournament, TournamentError, TournamentState,
};

/// Teams advancing out of each seed group into the bracket.
pub const QUALIFIERS_PER_GROUP: u32 = 2;

/// Start the seed stage: partition registered teams into groups with
/// round-robin fixtures and zeroed standings.
pub fn start_seed_stage(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Registration {
        return Err(TournamentError::InvalidState);
    }
    if tournament.teams.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            required: 2,
            have: tournament.teams.len(),
        });
    }
    let mut groups = seeding::generate_seed_groups(&tournament.teams, tournament.group_count)?;
    for group in &mut groups {
        standings::recompute_standings(group);
    }
    tournament.groups = groups;
    tournament.state = TournamentState::SeedStage;
    Ok(())
}

/// Close the seed stage and build the double-elimination bracket.
///
/// Refused while any group fixture is unfinished. Qualifiers are the top 2 of
/// each group: all group winners take the first seed ranks (group order),
/// then all runners-up. Within-group full ties are already resolved by the
/// standings calculator's stable ordering.
pub fn advance_to_bracket(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::SeedStage {
        return Err(TournamentError::InvalidState);
    }
    let unfinished: usize = tournament
        .groups
        .iter()
        .flat_map(|g| g.matches.iter())
        .filter(|m| m.status != MatchStatus::Completed)
        .count();
    if unfinished > 0 {
        return Err(TournamentError::StageNotComplete { unfinished });
    }
    for group in &mut tournament.groups {
        standings::recompute_standings(group);
    }

    let mut qualifiers: Vec<(TeamId, u32)> = Vec::new();
    let mut seed = 1u32;
    for level in 1..=QUALIFIERS_PER_GROUP {
        for group in &tournament.groups {
            if let Some(row) = group.standings.iter().find(|s| s.ranking == level) {
                qualifiers.push((row.team, seed));
                seed += 1;
            }
        }
    }
    if qualifiers.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            required: 2,
            have: qualifiers.len(),
        });
    }
    for &(team, rank) in &qualifiers {
        if let Some(t) = tournament.team_mut(team) {
            t.seed_ranking = Some(rank);
        }
    }
    tournament.bracket = Some(bracket::build_bracket(&qualifiers)?);
    tournament.state = TournamentState::BracketStage;
    Ok(())
}

/// Finish the tournament once the grand final is decided: write final
/// rankings onto the teams and return the placements.
pub fn finalize_tournament(
    tournament: &mut Tournament,
) -> Result<Vec<TeamPlacement>, TournamentError> {
    if tournament.state != TournamentState::BracketStage {
        return Err(TournamentError::InvalidState);
    }
    let b = tournament.bracket.as_ref().ok_or(TournamentError::InvalidState)?;
    let placements = bracket::team_placements(b)?;
    for p in &placements {
        if let Some(t) = tournament.team_mut(p.team) {
            t.final_ranking = Some(p.placement);
        }
    }
    tournament.state = TournamentState::Completed;
    Ok(placements)
}
