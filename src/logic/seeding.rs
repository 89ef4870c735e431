//! Seed group generator: partition teams into groups of at most 3, spreading
//! same-dojo teams apart, and emit round-robin fixtures.

use crate::models::{Group, Team, TournamentError, MAX_GROUP_TEAMS};
use std::collections::HashMap;

/// Partition teams into `max(requested, ceil(n/3))` groups.
///
/// Affiliations are processed largest first so teams from a big dojo land
/// early, while the group buckets still have room to spread them. Each team
/// goes to the group with the fewest same-dojo members, ties broken by group
/// size, then group order. A greedy heuristic: dojo separation is a soft
/// preference, not a hard constraint. If every group is full a new one opens,
/// so no team is ever dropped.
pub fn generate_seed_groups(
    teams: &[Team],
    requested_groups: usize,
) -> Result<Vec<Group>, TournamentError> {
    if teams.is_empty() {
        return Err(TournamentError::NotEnoughTeams { required: 1, have: 0 });
    }
    let target = requested_groups
        .max(1)
        .max((teams.len() + MAX_GROUP_TEAMS - 1) / MAX_GROUP_TEAMS);

    // Tally dojos, keeping first-seen order for a stable sort.
    let mut dojo_order: Vec<&str> = Vec::new();
    let mut dojo_counts: HashMap<&str, usize> = HashMap::new();
    for team in teams {
        let entry = dojo_counts.entry(team.dojo.as_str()).or_insert(0);
        if *entry == 0 {
            dojo_order.push(team.dojo.as_str());
        }
        *entry += 1;
    }
    dojo_order.sort_by_key(|d| std::cmp::Reverse(dojo_counts[d]));

    // Affiliation-major queue: all teams of the largest dojo first.
    let mut queue: Vec<&Team> = Vec::with_capacity(teams.len());
    for dojo in &dojo_order {
        queue.extend(teams.iter().filter(|t| t.dojo == *dojo));
    }

    let mut buckets: Vec<Vec<&Team>> = (0..target).map(|_| Vec::new()).collect();
    for team in queue {
        let mut best: Option<(usize, usize, usize)> = None; // (clashes, size, index)
        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.len() >= MAX_GROUP_TEAMS {
                continue;
            }
            let clashes = bucket.iter().filter(|t| t.dojo == team.dojo).count();
            let candidate = (clashes, bucket.len(), i);
            if best.map(|b| candidate < b).unwrap_or(true) {
                best = Some(candidate);
            }
        }
        let slot = match best {
            Some((_, _, i)) => i,
            None => {
                buckets.push(Vec::new());
                buckets.len() - 1
            }
        };
        buckets[slot].push(team);
    }

    // More requested groups than teams leaves empty buckets; don't emit those.
    let groups = buckets
        .iter()
        .filter(|b| !b.is_empty())
        .enumerate()
        .map(|(i, members)| Group::new(group_name(i), members))
        .collect();
    Ok(groups)
}

fn group_name(index: usize) -> String {
    // A, B, ... Z, then Group 27 onwards (tens of teams at most in practice).
    if index < 26 {
        format!("Group {}", (b'A' + index as u8) as char)
    } else {
        format!("Group {}", index + 1)
    }
}
