//! Single binary web server: moderator page from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use kendo_tournament_web::{
    advance_after_match, advance_to_bracket, finalize_tournament, logic, recompute_standings,
    start_seed_stage, ActionKind, BracketMatchId, BracketStatus, GroupId, MatchProgress,
    MatchStatus, Participant, SetResult, Side, Stage, TeamMatch, Tournament, TournamentId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default = "default_group_count")]
    group_count: usize,
}

fn default_group_count() -> usize {
    4
}

#[derive(Deserialize)]
struct RosterEntryBody {
    name: String,
    #[serde(default)]
    rank: Option<String>,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    name: String,
    dojo: String,
    roster: Vec<RosterEntryBody>,
}

#[derive(Deserialize)]
struct ActionBody {
    position: u8,
    side: Side,
    participant_id: Uuid,
    kind: ActionKind,
}

#[derive(Deserialize)]
struct UndoBody {
    position: u8,
    side: Side,
}

#[derive(Deserialize)]
struct OverrideSetBody {
    result: SetResult,
}

#[derive(Deserialize)]
struct OvertimeBody {
    red_nominee: Uuid,
    white_nominee: Uuid,
}

#[derive(Deserialize)]
struct OvertimeStrikeBody {
    side: Side,
    participant_id: Uuid,
    kind: ActionKind,
}

#[derive(Deserialize)]
struct BracketWinnerBody {
    team_id: Uuid,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id.
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: Uuid,
}

/// Path segments: tournament id and team match id.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

/// Path segments: tournament id, match id, and duel position (1-7).
#[derive(Deserialize)]
struct TournamentSetPath {
    id: TournamentId,
    match_id: Uuid,
    position: u8,
}

/// Path segments: tournament id and bracket arena index.
#[derive(Deserialize)]
struct TournamentBracketPath {
    id: TournamentId,
    index: usize,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "kendo-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let tournament = Tournament::new(body.name.trim(), body.group_count);
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Register a team with its dojo and ordered roster (Registration only).
#[post("/api/tournaments/{id}/teams")]
async fn api_register_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let roster: Vec<Participant> = body
        .roster
        .iter()
        .map(|r| match &r.rank {
            Some(rank) => Participant::with_rank(r.name.trim(), rank),
            None => Participant::new(r.name.trim()),
        })
        .collect();
    match t.register_team(body.name.trim(), body.dojo.trim(), roster) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Remove a team by id (Registration only).
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.remove_team(path.team_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Bulk team import from CSV rows: team,dojo,member1,...,member7.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut imported = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("CSV parse error: {}", e) }))
            }
        };
        let name = record.get(0).unwrap_or("").trim();
        let dojo = record.get(1).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        let roster: Vec<Participant> = record
            .iter()
            .skip(2)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(Participant::new)
            .collect();
        if let Err(e) = t.register_team(name, dojo, roster) {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": format!("row '{}': {}", name, e) }));
        }
        imported += 1;
    }
    log::info!("Imported {} team(s) into tournament {}", imported, t.id);
    HttpResponse::Ok().json(t)
}

/// Start the seed stage: build groups and round-robin fixtures.
#[post("/api/tournaments/{id}/seed/start")]
async fn api_start_seed(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match start_seed_stage(t) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// After any duel-state change: refresh the owning group's standings, and
/// auto-advance the bracket when an in-flight bracket match just completed.
fn after_match_update(
    t: &mut Tournament,
    group_id: Option<GroupId>,
    bracket_index: Option<usize>,
    progress: MatchProgress,
) -> Result<(), kendo_tournament_web::TournamentError> {
    if let Some(gid) = group_id {
        if let Some(group) = t.groups.iter_mut().find(|g| g.id == gid) {
            recompute_standings(group);
        }
    }
    if let (Some(index), Some(winner)) = (bracket_index, progress.winner) {
        if progress.status == MatchStatus::Completed {
            if let Some(bracket) = t.bracket.as_mut() {
                advance_after_match(bracket, BracketMatchId(index), winner)?;
            }
        }
    }
    Ok(())
}

/// Record a scoring action (strike or foul) in one duel of a match.
#[post("/api/tournaments/{id}/matches/{match_id}/actions")]
async fn api_match_action(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<ActionBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let group_id = t.group_of_match(path.match_id);
    let bracket_index = t.bracket_index_of_match(path.match_id);
    let m = match t.find_match_mut(path.match_id) {
        Some(m) => m,
        None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Match not found" })),
    };
    let progress = match logic::record_action(m, body.position, body.side, body.participant_id, body.kind) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    match after_match_update(t, group_id, bracket_index, progress) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Undo the most recent action for one side of one duel.
#[post("/api/tournaments/{id}/matches/{match_id}/undo")]
async fn api_match_undo(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<UndoBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let group_id = t.group_of_match(path.match_id);
    let bracket_index = t.bracket_index_of_match(path.match_id);
    let m = match t.find_match_mut(path.match_id) {
        Some(m) => m,
        None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Match not found" })),
    };
    let progress = match logic::undo_action(m, body.position, body.side) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    match after_match_update(t, group_id, bracket_index, progress) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Manually set a duel result (forfeits, no-shows, corrections).
#[put("/api/tournaments/{id}/matches/{match_id}/sets/{position}")]
async fn api_override_set(
    state: AppState,
    path: Path<TournamentSetPath>,
    body: Json<OverrideSetBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let group_id = t.group_of_match(path.match_id);
    let bracket_index = t.bracket_index_of_match(path.match_id);
    let m = match t.find_match_mut(path.match_id) {
        Some(m) => m,
        None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Match not found" })),
    };
    let progress = match logic::override_set(m, path.position, body.result) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    match after_match_update(t, group_id, bracket_index, progress) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Open sudden-death overtime with the two nominated fencers.
#[post("/api/tournaments/{id}/matches/{match_id}/overtime")]
async fn api_start_overtime(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<OvertimeBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let m = match t.find_match_mut(path.match_id) {
        Some(m) => m,
        None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Match not found" })),
    };
    match logic::start_overtime(m, body.red_nominee, body.white_nominee) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Record an overtime strike; the first valid strike wins the whole match.
#[post("/api/tournaments/{id}/matches/{match_id}/overtime/strike")]
async fn api_overtime_strike(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<OvertimeStrikeBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let group_id = t.group_of_match(path.match_id);
    let bracket_index = t.bracket_index_of_match(path.match_id);
    let m = match t.find_match_mut(path.match_id) {
        Some(m) => m,
        None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Match not found" })),
    };
    let progress = match logic::record_strike(m, body.side, body.participant_id, body.kind) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    match after_match_update(t, group_id, bracket_index, progress) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Close the seed stage and build the double-elimination bracket from the
/// top 2 of each group.
#[post("/api/tournaments/{id}/bracket/start")]
async fn api_start_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match advance_to_bracket(t) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Open a main-stage team match for a ready bracket slot. Scoring then goes
/// through the regular match endpoints; completion auto-advances the bracket.
#[post("/api/tournaments/{id}/bracket/matches/{index}/start")]
async fn api_start_bracket_match(state: AppState, path: Path<TournamentBracketPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let (red_id, white_id) = {
        let bracket = match t.bracket.as_ref() {
            Some(b) => b,
            None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "No bracket yet" })),
        };
        let bm = match bracket.get(BracketMatchId(path.index)) {
            Some(m) => m,
            None => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("No bracket match at index {}", path.index) }))
            }
        };
        if bm.status != BracketStatus::Ready {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Bracket match is not ready to be played" }));
        }
        match bm.slots {
            [Some(a), Some(b)] => (a, b),
            _ => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": "Bracket match is not ready to be played" }))
            }
        }
    };
    let (red, white) = match (t.team(red_id).cloned(), t.team(white_id).cloned()) {
        (Some(r), Some(w)) => (r, w),
        _ => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Team not found" })),
    };
    let team_match = TeamMatch::new(&red, &white, Stage::Main);
    if let Some(bm) = t.bracket.as_mut().and_then(|b| b.get_mut(BracketMatchId(path.index))) {
        bm.status = BracketStatus::InProgress;
    }
    t.bracket_matches.insert(path.index, team_match);
    HttpResponse::Ok().json(t)
}

/// Manually report a bracket match winner (when the match was fought off-system).
#[put("/api/tournaments/{id}/bracket/matches/{index}/winner")]
async fn api_report_bracket_winner(
    state: AppState,
    path: Path<TournamentBracketPath>,
    body: Json<BracketWinnerBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    let bracket = match t.bracket.as_mut() {
        Some(b) => b,
        None => return HttpResponse::BadRequest().json(serde_json::json!({ "error": "No bracket yet" })),
    };
    match advance_after_match(bracket, BracketMatchId(path.index), body.team_id) {
        Ok(()) => {
            t.bracket_matches.remove(&path.index);
            HttpResponse::Ok().json(t)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Finish the tournament: compute final placements from the bracket.
#[post("/api/tournaments/{id}/finish")]
async fn api_finish_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match finalize_tournament(t) {
        Ok(placements) => HttpResponse::Ok().json(serde_json::json!({
            "placements": placements,
            "tournament": t,
        })),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_register_team)
            .service(api_remove_team)
            .service(api_import_teams)
            .service(api_start_seed)
            .service(api_match_action)
            .service(api_match_undo)
            .service(api_override_set)
            .service(api_start_overtime)
            .service(api_overtime_strike)
            .service(api_start_bracket)
            .service(api_start_bracket_match)
            .service(api_report_bracket_winner)
            .service(api_finish_tournament)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
