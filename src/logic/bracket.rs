//! Double-elimination bracket: construction, advancement, and placement.
//!
//! Matches live in one arena (`Vec<BracketMatch>`) and reference each other
//! through `BracketMatchId` indices. Winners rounds halve; the losers bracket
//! has `2 * winners_rounds - 1` rounds alternating drop and consolidation
//! shapes that mirror the winners halving. Matches whose link structure can
//! only ever deliver a single team are marked as byes and auto-advance.

use crate::models::{
    Bracket, BracketMatch, BracketMatchId, BracketSide, BracketStatus, TeamId, TeamPlacement,
    TournamentError,
};
use std::collections::BTreeMap;

fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Build the bracket from qualified teams tagged with their seed ranking.
///
/// Seeds sort ascending (best group finishers first); winners round 1 pairs
/// seed `i` against seed `N-1-i`, and on odd `N` the middle seed gets a bye
/// match pre-marked completed.
pub fn build_bracket(qualifiers: &[(TeamId, u32)]) -> Result<Bracket, TournamentError> {
    if qualifiers.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            required: 2,
            have: qualifiers.len(),
        });
    }
    let mut seeds: Vec<(TeamId, u32)> = qualifiers.to_vec();
    seeds.sort_by_key(|&(_, rank)| rank);
    let n = seeds.len();

    // Round shapes. m1 counts the bye match on odd n.
    let m1 = div_ceil(n, 2);
    let mut wsizes = vec![m1];
    while *wsizes.last().unwrap_or(&1) > 1 {
        let next = div_ceil(wsizes[wsizes.len() - 1], 2);
        wsizes.push(next);
    }
    let w = wsizes.len();
    let lrounds = 2 * w - 1;
    let lsizes: Vec<usize> = (1..=lrounds)
        .map(|k| div_ceil(m1, 1 << ((k + 1) / 2)).max(1))
        .collect();

    // Allocate the arena: winners rounds, losers rounds, grand final.
    let mut matches: Vec<BracketMatch> = Vec::new();
    let mut windex: Vec<Vec<BracketMatchId>> = Vec::with_capacity(w);
    for (r, &size) in wsizes.iter().enumerate() {
        let mut round = Vec::with_capacity(size);
        for _ in 0..size {
            let id = BracketMatchId(matches.len());
            matches.push(BracketMatch::new(id, BracketSide::Winners, r as u32 + 1));
            round.push(id);
        }
        windex.push(round);
    }
    let mut lindex: Vec<Vec<BracketMatchId>> = Vec::with_capacity(lrounds);
    for (r, &size) in lsizes.iter().enumerate() {
        let mut round = Vec::with_capacity(size);
        for _ in 0..size {
            let id = BracketMatchId(matches.len());
            matches.push(BracketMatch::new(id, BracketSide::Losers, r as u32 + 1));
            round.push(id);
        }
        lindex.push(round);
    }
    let grand_final = BracketMatchId(matches.len());
    matches.push(BracketMatch::new(grand_final, BracketSide::GrandFinal, 1));

    // Feeder index mapping: identical round sizes line up 1:1, halved rounds
    // merge adjacent pairs.
    let map_to = |from: usize, to: usize, j: usize| if from == to { j } else { j / 2 };

    // Winner links within the winners bracket, then into the grand final.
    for r in 0..w - 1 {
        for j in 0..wsizes[r] {
            matches[windex[r][j].0].next_winner =
                Some(windex[r + 1][map_to(wsizes[r], wsizes[r + 1], j)]);
        }
    }
    matches[windex[w - 1][0].0].next_winner = Some(grand_final);

    // Loser drops: round 1 losers pair up in losers round 1, later winners
    // rounds drop into losers round 2r-2.
    for j in 0..wsizes[0] {
        matches[windex[0][j].0].next_loser = Some(lindex[0][map_to(wsizes[0], lsizes[0], j)]);
    }
    for r in 1..w {
        let target = 2 * r - 1; // 0-based losers round index
        for j in 0..wsizes[r] {
            matches[windex[r][j].0].next_loser =
                Some(lindex[target][map_to(wsizes[r], lsizes[target], j)]);
        }
    }

    // Winner links within the losers bracket, then into the grand final.
    for k in 0..lrounds - 1 {
        for j in 0..lsizes[k] {
            matches[lindex[k][j].0].next_winner =
                Some(lindex[k + 1][map_to(lsizes[k], lsizes[k + 1], j)]);
        }
    }
    matches[lindex[lrounds - 1][0].0].next_winner = Some(grand_final);

    // Seed round 1. Standard pairing i vs N-1-i; the odd team out gets a bye.
    for i in 0..n / 2 {
        let m = &mut matches[windex[0][i].0];
        m.slots = [Some(seeds[i].0), Some(seeds[n - 1 - i].0)];
        m.status = BracketStatus::Ready;
    }
    if n % 2 == 1 {
        let team = seeds[n / 2].0;
        let m = &mut matches[windex[0][n / 2].0];
        m.slots[0] = Some(team);
        m.bye = true;
        m.status = BracketStatus::Completed;
        m.winner = Some(team);
    }

    // Mark structural byes: any match that can only ever receive one team.
    // Iterated to a fixpoint because a bye produces no loser, and a match
    // that can receive no team at all (dead) produces no winner either;
    // both starve downstream losers matches in turn.
    let mut dead = vec![false; matches.len()];
    loop {
        let mut inbound = vec![0usize; matches.len()];
        for m in &matches {
            inbound[m.id.0] += m.slots.iter().filter(|s| s.is_some()).count();
            if dead[m.id.0] {
                continue;
            }
            if let Some(next) = m.next_winner {
                inbound[next.0] += 1;
            }
            if let Some(next) = m.next_loser {
                if !m.bye {
                    inbound[next.0] += 1;
                }
            }
        }
        let mut changed = false;
        for m in matches.iter_mut() {
            let fed = inbound[m.id.0];
            if fed == 0 && !dead[m.id.0] {
                dead[m.id.0] = true;
                changed = true;
            }
            if fed <= 1 && !m.bye {
                m.bye = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Cascade pre-completed byes (round 1 odd team) into their next matches.
    let pre: Vec<(BracketMatchId, TeamId)> = matches
        .iter()
        .filter(|m| m.status == BracketStatus::Completed)
        .filter_map(|m| m.next_winner.zip(m.winner))
        .collect();
    for (next, team) in pre {
        place_team(&mut matches, next, team);
    }

    Ok(Bracket {
        matches,
        winners_rounds: w as u32,
        losers_rounds: lrounds as u32,
        grand_final,
    })
}

/// Drop a team into the first open slot of a match. Bye matches complete
/// immediately and push the team onward; regular matches become ready once
/// both slots are filled.
fn place_team(matches: &mut [BracketMatch], id: BracketMatchId, team: TeamId) {
    let next = {
        let m = &mut matches[id.0];
        if let Some(slot) = m.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(team);
        }
        if m.bye {
            m.status = BracketStatus::Completed;
            m.winner = Some(team);
            m.next_winner
        } else {
            if m.slots.iter().all(|s| s.is_some()) && m.status == BracketStatus::Pending {
                m.status = BracketStatus::Ready;
            }
            None
        }
    };
    if let Some(next) = next {
        place_team(matches, next, team);
    }
}

/// Record a finished bracket match and route the winner (and, for
/// winners-side matches, the loser) into their destination slots.
pub fn advance_after_match(
    bracket: &mut Bracket,
    id: BracketMatchId,
    winner: TeamId,
) -> Result<(), TournamentError> {
    let (loser, next_winner, next_loser) = {
        let m = bracket
            .get_mut(id)
            .ok_or(TournamentError::BracketMatchNotFound(id.0))?;
        match m.status {
            BracketStatus::Ready | BracketStatus::InProgress => {}
            BracketStatus::Completed => return Err(TournamentError::MatchAlreadyCompleted),
            BracketStatus::Pending => return Err(TournamentError::MatchNotReady),
        }
        let [a, b] = m.slots;
        let (Some(a), Some(b)) = (a, b) else {
            return Err(TournamentError::MatchNotReady);
        };
        let loser = if winner == a {
            b
        } else if winner == b {
            a
        } else {
            return Err(TournamentError::TeamNotFound(winner));
        };
        m.status = BracketStatus::Completed;
        m.winner = Some(winner);
        m.loser = Some(loser);
        (loser, m.next_winner, m.next_loser)
    };
    if let Some(next) = next_winner {
        place_team(&mut bracket.matches, next, winner);
    }
    if let Some(next) = next_loser {
        place_team(&mut bracket.matches, next, loser);
    }
    Ok(())
}

/// Final placements: grand-final winner 1st, loser 2nd, everyone else grouped
/// by the losers round that eliminated them (a later round places higher;
/// ties within a round share the same placement number).
pub fn team_placements(bracket: &Bracket) -> Result<Vec<TeamPlacement>, TournamentError> {
    let gf = bracket
        .get(bracket.grand_final)
        .ok_or(TournamentError::BracketNotFinished)?;
    let (Some(winner), Some(loser)) = (gf.winner, gf.loser) else {
        return Err(TournamentError::BracketNotFinished);
    };
    let mut placements = vec![
        TeamPlacement { team: winner, placement: 1 },
        TeamPlacement { team: loser, placement: 2 },
    ];

    let mut eliminated: BTreeMap<u32, Vec<TeamId>> = BTreeMap::new();
    for m in &bracket.matches {
        if m.side == BracketSide::Losers {
            if let Some(l) = m.loser {
                eliminated.entry(m.round).or_default().push(l);
            }
        }
    }
    let mut place = 3;
    for (_, teams) in eliminated.iter().rev() {
        for &team in teams {
            placements.push(TeamPlacement { team, placement: place });
        }
        place += teams.len() as u32;
    }
    Ok(placements)
}
