//! Integration tests for the seed group generator: partitioning, dojo
//! spreading, and round-robin fixture generation.

use kendo_tournament_web::{
    generate_seed_groups, MatchStatus, Participant, Stage, Team, TournamentError, MAX_GROUP_TEAMS,
};

fn team(name: &str, dojo: &str, members: usize) -> Team {
    let roster: Vec<Participant> = (0..members)
        .map(|i| Participant::new(format!("{name} fencer {i}")))
        .collect();
    Team::new(name, dojo, roster)
}

#[test]
fn no_teams_is_an_error() {
    assert!(matches!(
        generate_seed_groups(&[], 4),
        Err(TournamentError::NotEnoughTeams { .. })
    ));
}

#[test]
fn single_team_gets_one_group_without_fixtures() {
    let teams = vec![team("Solo", "D1", 7)];
    let groups = generate_seed_groups(&teams, 4).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].teams, vec![teams[0].id]);
    assert!(groups[0].matches.is_empty());
    assert_eq!(groups[0].standings.len(), 1);
}

#[test]
fn covers_every_team_once_with_groups_of_at_most_three() {
    let teams: Vec<Team> = (0..10).map(|i| team(&format!("T{i}"), &format!("D{i}"), 7)).collect();
    let groups = generate_seed_groups(&teams, 4).unwrap();

    let mut seen: Vec<_> = groups.iter().flat_map(|g| g.teams.iter().copied()).collect();
    seen.sort();
    let mut expected: Vec<_> = teams.iter().map(|t| t.id).collect();
    expected.sort();
    assert_eq!(seen, expected);
    for g in &groups {
        assert!(!g.teams.is_empty() && g.teams.len() <= MAX_GROUP_TEAMS);
    }
}

#[test]
fn requested_group_count_expands_to_fit_all_teams() {
    // 7 teams cannot fit 1 group of 3: ceil(7/3) = 3 groups.
    let teams: Vec<Team> = (0..7).map(|i| team(&format!("T{i}"), "D1", 7)).collect();
    let groups = generate_seed_groups(&teams, 1).unwrap();
    assert_eq!(groups.len(), 3);
}

#[test]
fn fixtures_are_the_complete_round_robin() {
    let teams: Vec<Team> = (0..9).map(|i| team(&format!("T{i}"), &format!("D{i}"), 7)).collect();
    let groups = generate_seed_groups(&teams, 4).unwrap();
    for g in &groups {
        let n = g.teams.len();
        assert_eq!(g.matches.len(), n * (n - 1) / 2);
        for m in &g.matches {
            assert_eq!(m.stage, Stage::Seed);
            assert_eq!(m.status, MatchStatus::Scheduled);
            assert_eq!(m.score.sets.len(), 7);
            assert_eq!(m.score.red_set_wins, 0);
            assert_eq!(m.score.white_set_wins, 0);
            assert!(m.winner.is_none());
            // Both ends of the pairing belong to the group.
            assert!(g.teams.contains(&m.red_team));
            assert!(g.teams.contains(&m.white_team));
            assert_ne!(m.red_team, m.white_team);
        }
        // Every unordered pair appears exactly once.
        let mut pairs: Vec<(usize, usize)> = g
            .matches
            .iter()
            .map(|m| {
                let a = g.teams.iter().position(|&t| t == m.red_team).unwrap();
                let b = g.teams.iter().position(|&t| t == m.white_team).unwrap();
                (a.min(b), a.max(b))
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), n * (n - 1) / 2);
    }
}

#[test]
fn same_dojo_teams_are_spread_across_groups() {
    // 9 teams, 3 dojos of 3. With 4 groups open, no group should ever see
    // two teams from the same dojo, let alone all three.
    let mut teams = Vec::new();
    for d in 0..3 {
        for i in 0..3 {
            teams.push(team(&format!("D{d} team {i}"), &format!("Dojo{d}"), 7));
        }
    }
    let groups = generate_seed_groups(&teams, 4).unwrap();
    assert!(groups.len() >= 3);

    let dojo_of = |id| teams.iter().find(|t| t.id == id).map(|t| t.dojo.clone()).unwrap();
    for g in &groups {
        assert!(g.teams.len() <= MAX_GROUP_TEAMS);
        for (i, &a) in g.teams.iter().enumerate() {
            for &b in &g.teams[i + 1..] {
                assert_ne!(dojo_of(a), dojo_of(b), "same-dojo pair in {}", g.name);
            }
        }
    }
}

#[test]
fn zero_initialized_standings_cover_the_members() {
    let teams: Vec<Team> = (0..6).map(|i| team(&format!("T{i}"), &format!("D{i}"), 7)).collect();
    let groups = generate_seed_groups(&teams, 2).unwrap();
    for g in &groups {
        assert_eq!(g.standings.len(), g.teams.len());
        for s in &g.standings {
            assert_eq!((s.wins, s.losses, s.points), (0, 0, 0));
            assert!(g.teams.contains(&s.team));
        }
    }
}
