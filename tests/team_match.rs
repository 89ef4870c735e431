//! Integration tests for the team match engine, overtime, and standings.

use kendo_tournament_web::{
    logic, ActionKind, Group, MatchStatus, Participant, ParticipantId, SetResult, Side, Stage,
    Team, TeamMatch, TournamentError,
};

fn team7(name: &str, dojo: &str) -> Team {
    let roster: Vec<Participant> = (1..=7)
        .map(|i| Participant::with_rank(format!("{name} fencer {i}"), "2-dan"))
        .collect();
    Team::new(name, dojo, roster)
}

fn fencer(team: &Team, position: u8) -> ParticipantId {
    team.roster[position as usize - 1].id
}

/// Win one duel for `side` with two clean men strikes.
fn win_set(m: &mut TeamMatch, red: &Team, white: &Team, position: u8, side: Side) {
    let participant = match side {
        Side::Red => fencer(red, position),
        Side::White => fencer(white, position),
    };
    logic::record_action(m, position, side, participant, ActionKind::Men).unwrap();
    logic::record_action(m, position, side, participant, ActionKind::Men).unwrap();
}

/// Complete position 7 as a drawn duel via time expiry with no points.
fn draw_last_set(m: &mut TeamMatch) {
    logic::expire_set(m, 7).unwrap();
    assert_eq!(m.set(7).unwrap().result, SetResult::Draw);
}

#[test]
fn mid_match_progress_has_no_winner() {
    let red = team7("Red", "D1");
    let white = team7("White", "D2");
    let mut m = TeamMatch::new(&red, &white, Stage::Seed);
    assert_eq!(m.status, MatchStatus::Scheduled);

    win_set(&mut m, &red, &white, 1, Side::Red);
    win_set(&mut m, &red, &white, 2, Side::White);
    assert_eq!(m.status, MatchStatus::InProgress);
    assert_eq!(m.current_set, 3);
    assert_eq!(m.score.red_set_wins, 1);
    assert_eq!(m.score.white_set_wins, 1);
    assert_eq!(m.score.red_points, 2);
    assert_eq!(m.score.white_points, 2);
    assert!(m.winner.is_none());
}

#[test]
fn more_set_wins_decides_the_match() {
    let red = team7("Red", "D1");
    let white = team7("White", "D2");
    let mut m = TeamMatch::new(&red, &white, Stage::Seed);

    for pos in 1..=4 {
        win_set(&mut m, &red, &white, pos, Side::Red);
    }
    for pos in 5..=7 {
        win_set(&mut m, &red, &white, pos, Side::White);
    }
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(red.id));
    assert_eq!(m.score.red_set_wins, 4);
    assert_eq!(m.score.white_set_wins, 3);
}

#[test]
fn equal_set_wins_fall_back_to_points() {
    let red = team7("Red", "D1");
    let white = team7("White", "D2");
    let mut m = TeamMatch::new(&red, &white, Stage::Seed);

    // Red wins 1-3 cleanly; white wins 4-6 but concedes one point per duel.
    for pos in 1..=3 {
        win_set(&mut m, &red, &white, pos, Side::Red);
    }
    for pos in 4..=6 {
        logic::record_action(&mut m, pos, Side::Red, fencer(&red, pos), ActionKind::Kote).unwrap();
        win_set(&mut m, &red, &white, pos, Side::White);
    }
    draw_last_set(&mut m);

    assert_eq!(m.score.red_set_wins, 3);
    assert_eq!(m.score.white_set_wins, 3);
    assert_eq!(m.score.red_points, 9);
    assert_eq!(m.score.white_points, 6);
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(red.id));
}

fn tied_match() -> (Team, Team, TeamMatch) {
    let red = team7("Red", "D1");
    let white = team7("White", "D2");
    let mut m = TeamMatch::new(&red, &white, Stage::Seed);
    for pos in 1..=3 {
        win_set(&mut m, &red, &white, pos, Side::Red);
    }
    for pos in 4..=6 {
        win_set(&mut m, &red, &white, pos, Side::White);
    }
    draw_last_set(&mut m);
    (red, white, m)
}

#[test]
fn full_tie_requires_overtime_and_assigns_no_winner() {
    let (_, _, m) = tied_match();
    assert_eq!(m.status, MatchStatus::Overtime);
    assert!(m.winner.is_none());
    assert_eq!(m.score.red_set_wins, m.score.white_set_wins);
    assert_eq!(m.score.red_points, m.score.white_points);
}

#[test]
fn overtime_first_strike_wins_the_match() {
    let (red, white, mut m) = tied_match();
    let red_ace = fencer(&red, 1);
    let white_ace = fencer(&white, 1);
    logic::start_overtime(&mut m, red_ace, white_ace).unwrap();

    // Fouls are not legal overtime actions.
    assert_eq!(
        logic::record_strike(&mut m, Side::White, white_ace, ActionKind::Hansoku),
        Err(TournamentError::IllegalOvertimeAction)
    );
    let progress = logic::record_strike(&mut m, Side::White, white_ace, ActionKind::Do).unwrap();
    assert_eq!(progress.winner, Some(white.id));
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.overtime.as_ref().unwrap().winner, Some(Side::White));
    assert_eq!(m.overtime.as_ref().unwrap().actions.len(), 1);

    // No re-entry once decided.
    assert_eq!(
        logic::record_strike(&mut m, Side::Red, red_ace, ActionKind::Men),
        Err(TournamentError::OvertimeAlreadyDecided)
    );
}

#[test]
fn overtime_refuses_to_start_without_a_tie() {
    let red = team7("Red", "D1");
    let white = team7("White", "D2");
    let mut m = TeamMatch::new(&red, &white, Stage::Seed);
    assert_eq!(
        logic::start_overtime(&mut m, fencer(&red, 1), fencer(&white, 1)),
        Err(TournamentError::OvertimeNotRequired)
    );
}

#[test]
fn overtime_nominees_must_have_fought_for_their_side() {
    let (red, _, mut m) = tied_match();
    let stranger = uuid::Uuid::new_v4();
    assert_eq!(
        logic::start_overtime(&mut m, fencer(&red, 1), stranger),
        Err(TournamentError::UnknownParticipant(stranger))
    );
}

#[test]
fn completed_match_is_terminal() {
    let red = team7("Red", "D1");
    let white = team7("White", "D2");
    let mut m = TeamMatch::new(&red, &white, Stage::Seed);
    for pos in 1..=7 {
        logic::override_set(&mut m, pos, SetResult::Forfeit { winner: Side::Red }).unwrap();
    }
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(red.id));
    assert_eq!(
        logic::record_action(&mut m, 1, Side::White, fencer(&white, 1), ActionKind::Men),
        Err(TournamentError::MatchAlreadyCompleted)
    );
    assert_eq!(
        logic::override_set(&mut m, 2, SetResult::Draw),
        Err(TournamentError::MatchAlreadyCompleted)
    );
}

#[test]
fn correction_can_break_a_detected_tie() {
    let (red, _, mut m) = tied_match();
    assert_eq!(m.status, MatchStatus::Overtime);
    // Moderator corrects set 7: red actually won it.
    logic::override_set(&mut m, 7, SetResult::Win { side: Side::Red }).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(red.id));
    assert!(m.overtime.is_none());
}

fn complete_for_red(group: &mut Group, index: usize) {
    for pos in 1..=7 {
        logic::override_set(&mut group.matches[index], pos, SetResult::Forfeit { winner: Side::Red })
            .unwrap();
    }
}

#[test]
fn standings_fold_completed_matches_and_rank() {
    let a = team7("A", "D1");
    let b = team7("B", "D2");
    let c = team7("C", "D3");
    let mut group = Group::new("Group A", &[&a, &b, &c]);
    assert_eq!(group.matches.len(), 3);

    // Fixtures are (a,b), (a,c), (b,c); the red (first) team wins each.
    for i in 0..3 {
        complete_for_red(&mut group, i);
    }
    logic::recompute_standings(&mut group);

    let ranks: Vec<_> = group.standings.iter().map(|s| s.team).collect();
    assert_eq!(ranks, vec![a.id, b.id, c.id]);
    let top = &group.standings[0];
    assert_eq!((top.wins, top.losses, top.points, top.ranking), (2, 0, 4, 1));
    let mid = &group.standings[1];
    assert_eq!((mid.wins, mid.losses, mid.points, mid.ranking), (1, 1, 2, 2));
    let bottom = &group.standings[2];
    assert_eq!((bottom.wins, bottom.losses, bottom.points, bottom.ranking), (0, 2, 0, 3));
}

#[test]
fn standings_recomputation_is_idempotent() {
    let a = team7("A", "D1");
    let b = team7("B", "D2");
    let c = team7("C", "D3");
    let mut group = Group::new("Group A", &[&a, &b, &c]);
    complete_for_red(&mut group, 0);
    complete_for_red(&mut group, 2);

    logic::recompute_standings(&mut group);
    let first = group.standings.clone();
    logic::recompute_standings(&mut group);
    assert_eq!(group.standings, first);
}

#[test]
fn drawn_team_match_gives_a_point_each() {
    let a = team7("A", "D1");
    let b = team7("B", "D2");
    let mut group = Group::new("Group B", &[&a, &b]);
    // Force a completed drawn match: no winner, status completed.
    group.matches[0].status = MatchStatus::Completed;
    group.matches[0].winner = None;
    logic::recompute_standings(&mut group);

    for s in &group.standings {
        assert_eq!((s.wins, s.losses, s.points), (0, 0, 1));
    }
}
