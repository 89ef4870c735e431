//! Standings calculator: a pure fold over a group's completed matches.

use crate::models::{Group, MatchStatus, TeamStanding};

/// Rebuild a group's standings table from scratch.
///
/// Always a full refold, never an incremental delta: corrections to an
/// already-counted match stay safe because every recomputation starts from
/// zeroed tallies. 2 points and a win to the winner, a loss to the other
/// side; 1 point each when a team match ends drawn. Ranking sorts by points
/// desc, wins desc, losses asc; full ties keep team registration order
/// (stable sort).
pub fn recompute_standings(group: &mut Group) {
    let mut table: Vec<TeamStanding> = group.teams.iter().map(|&t| TeamStanding::new(t)).collect();

    for m in group.matches.iter().filter(|m| m.status == MatchStatus::Completed) {
        match m.winner {
            Some(winner) => {
                if let Some(row) = table.iter_mut().find(|s| s.team == winner) {
                    row.wins += 1;
                    row.points += 2;
                }
                if let Some(loser) = m.opponent_of(winner) {
                    if let Some(row) = table.iter_mut().find(|s| s.team == loser) {
                        row.losses += 1;
                    }
                }
            }
            None => {
                for team in [m.red_team, m.white_team] {
                    if let Some(row) = table.iter_mut().find(|s| s.team == team) {
                        row.points += 1;
                    }
                }
            }
        }
    }

    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.wins.cmp(&a.wins))
            .then(a.losses.cmp(&b.losses))
    });
    for (i, row) in table.iter_mut().enumerate() {
        row.ranking = i as u32 + 1;
    }
    group.standings = table;
}
