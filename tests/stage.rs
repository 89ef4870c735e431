//! End-to-end run through the tournament phases: registration, seed groups,
//! double-elimination bracket, final rankings.

use kendo_tournament_web::{
    logic, BracketStatus, MatchStatus, Participant, SetResult, Side, Tournament, TournamentError,
    TournamentState,
};

fn roster(team: usize) -> Vec<Participant> {
    (1..=7).map(|p| Participant::new(format!("Fencer {team}-{p}"))).collect()
}

/// Nine teams across three dojos, three requested groups.
fn registered() -> Tournament {
    let mut t = Tournament::new("Club Cup", 3);
    let dojos = ["Seibukan", "Hokushin", "Tozando"];
    for i in 0..9 {
        t.register_team(format!("Team {}", i + 1), dojos[i % 3], roster(i + 1))
            .unwrap();
    }
    t
}

/// Complete every seed group fixture with a 7-0 win for the red side.
fn sweep_seed_stage(t: &mut Tournament) {
    for g in 0..t.groups.len() {
        for mi in 0..t.groups[g].matches.len() {
            let m = &mut t.groups[g].matches[mi];
            for pos in 1..=7 {
                logic::override_set(m, pos, SetResult::Win { side: Side::Red }).unwrap();
            }
            assert_eq!(t.groups[g].matches[mi].status, MatchStatus::Completed);
        }
    }
}

/// Advance every ready bracket match, first slot winning.
fn sweep_bracket(t: &mut Tournament) {
    let bracket = t.bracket.as_mut().unwrap();
    while !bracket.is_finished() {
        let next: Vec<_> = bracket
            .matches
            .iter()
            .filter(|m| m.status == BracketStatus::Ready)
            .map(|m| (m.id, m.slots[0].unwrap()))
            .collect();
        for (id, winner) in next {
            logic::advance_after_match(bracket, id, winner).unwrap();
        }
    }
}

#[test]
fn seed_stage_needs_at_least_two_teams() {
    let mut t = Tournament::new("Empty", 2);
    t.register_team("Solo", "Seibukan", roster(1)).unwrap();
    assert_eq!(
        logic::start_seed_stage(&mut t),
        Err(TournamentError::NotEnoughTeams { required: 2, have: 1 })
    );
}

#[test]
fn registration_closes_once_the_seed_stage_starts() {
    let mut t = registered();
    logic::start_seed_stage(&mut t).unwrap();
    assert_eq!(t.state, TournamentState::SeedStage);
    assert_eq!(
        t.register_team("Latecomer", "Tozando", roster(10)),
        Err(TournamentError::InvalidState)
    );
}

#[test]
fn bracket_refused_while_group_fixtures_are_open() {
    let mut t = registered();
    logic::start_seed_stage(&mut t).unwrap();
    // 3 groups of 3 teams, 3 fixtures each.
    assert_eq!(
        logic::advance_to_bracket(&mut t),
        Err(TournamentError::StageNotComplete { unfinished: 9 })
    );
}

#[test]
fn nine_teams_run_to_final_rankings() {
    let mut t = registered();
    logic::start_seed_stage(&mut t).unwrap();
    assert_eq!(t.groups.len(), 3);
    for g in &t.groups {
        assert_eq!(g.teams.len(), 3);
        assert_eq!(g.matches.len(), 3);
    }

    sweep_seed_stage(&mut t);
    logic::advance_to_bracket(&mut t).unwrap();
    assert_eq!(t.state, TournamentState::BracketStage);
    assert!(t.bracket.is_some());

    // Group winners took seed ranks 1-3 (group order), runners-up 4-6.
    for (gi, g) in t.groups.iter().enumerate() {
        let first = g.standings.iter().find(|s| s.ranking == 1).unwrap();
        let second = g.standings.iter().find(|s| s.ranking == 2).unwrap();
        assert_eq!(first.wins, 2);
        assert_eq!(first.points, 4);
        assert_eq!(
            t.team(first.team).unwrap().seed_ranking,
            Some(gi as u32 + 1)
        );
        assert_eq!(
            t.team(second.team).unwrap().seed_ranking,
            Some(gi as u32 + 4)
        );
        let third = g.standings.iter().find(|s| s.ranking == 3).unwrap();
        assert_eq!(t.team(third.team).unwrap().seed_ranking, None);
    }

    sweep_bracket(&mut t);
    let placements = logic::finalize_tournament(&mut t).unwrap();
    assert_eq!(t.state, TournamentState::Completed);
    assert_eq!(placements.len(), 6);

    for p in &placements {
        assert_eq!(t.team(p.team).unwrap().final_ranking, Some(p.placement));
    }
    let champion = placements.iter().find(|p| p.placement == 1).unwrap();
    assert!(t.team(champion.team).unwrap().seed_ranking.is_some());
    // Teams eliminated in the group stage stay unranked.
    assert_eq!(
        t.teams.iter().filter(|t| t.final_ranking.is_none()).count(),
        3
    );
}

#[test]
fn finalize_requires_a_finished_bracket() {
    let mut t = registered();
    logic::start_seed_stage(&mut t).unwrap();
    sweep_seed_stage(&mut t);
    logic::advance_to_bracket(&mut t).unwrap();
    assert_eq!(
        logic::finalize_tournament(&mut t),
        Err(TournamentError::BracketNotFinished)
    );
    assert_eq!(t.state, TournamentState::BracketStage);
}
