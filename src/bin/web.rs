//! Bracket service over REST, backed by the in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, INACTIVITY_TIMEOUT_HOURS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::models::{
    AddMatchRequest, AddRoundRequest, AssignSlotRequest, ConfirmAdvancementRequest, MatchId,
    ReorderMatchRequest, ReorderRoundsRequest, RoundUpdate, SetResultRequest, Standing,
};
use bracket_engine::{
    build_generation_request, validate, BracketConfig, BracketRemote, EngineError, MemoryRemote,
    SeedList, ServerConfig, TournamentId,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

type AppState = Data<MemoryRemote>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Configuration as edited by the organizer, with its seed list.
#[derive(Deserialize)]
struct ConfigBody {
    config: BracketConfig,
    seeds: SeedList,
}

#[derive(Deserialize)]
struct StandingsBody {
    standings: Vec<Standing>,
    #[serde(rename = "final", default)]
    final_standings: bool,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id}/bracket)
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct RoundPath {
    id: TournamentId,
    round: u32,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct StagePath {
    id: TournamentId,
    order: u32,
}

fn error_response(e: &EngineError) -> HttpResponse {
    let body = json!({ "error": e.to_string() });
    match e {
        EngineError::Configuration(report) => HttpResponse::UnprocessableEntity()
            .json(json!({ "error": e.to_string(), "violations": report.violations })),
        EngineError::InvalidArgument(_) => HttpResponse::BadRequest().json(body),
        EngineError::StructuralConflict(_) | EngineError::StateConflict(_) => {
            HttpResponse::Conflict().json(body)
        }
        EngineError::NotFound(_) => HttpResponse::NotFound().json(body),
        EngineError::Remote(_) => HttpResponse::BadGateway().json(body),
    }
}

/// Answer a mutation with the stored bracket, as the client refetches after every change.
async fn with_bracket(
    state: &AppState,
    tournament: TournamentId,
    result: Result<(), EngineError>,
) -> HttpResponse {
    if let Err(e) = result {
        return error_response(&e);
    }
    match state.get_bracket(tournament).await {
        Ok(Some(bracket)) => HttpResponse::Ok().json(bracket),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "No bracket" })),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Validate a configuration without generating anything. Warnings never block.
#[post("/api/validate")]
async fn api_validate(body: Json<ConfigBody>) -> HttpResponse {
    let report = validate(&body.config, &body.seeds);
    HttpResponse::Ok().json(json!({ "valid": report.is_valid(), "violations": report.violations }))
}

/// Validate, build the generation request and generate the tournament's bracket.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(state: AppState, path: Path<TournamentPath>, body: Json<ConfigBody>) -> HttpResponse {
    let request = match build_generation_request(&body.config, &body.seeds) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };
    match state.generate_bracket(path.id, &request).await {
        Ok(bracket) => HttpResponse::Ok().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Get the tournament's bracket (404 if none). Touching it refreshes its activity time.
#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.get_bracket(path.id).await {
        Ok(Some(bracket)) => HttpResponse::Ok().json(bracket),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "No bracket" })),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/tournaments/{id}/bracket")]
async fn api_delete_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.delete_bracket(path.id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/bracket/rounds")]
async fn api_add_round(state: AppState, path: Path<TournamentPath>, body: Json<AddRoundRequest>) -> HttpResponse {
    let result = state.add_round(path.id, &body).await.map(|_| ());
    with_bracket(&state, path.id, result).await
}

#[post("/api/tournaments/{id}/bracket/rounds/reorder")]
async fn api_reorder_rounds(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<ReorderRoundsRequest>,
) -> HttpResponse {
    let result = state.reorder_rounds(path.id, &body).await;
    with_bracket(&state, path.id, result).await
}

#[put("/api/tournaments/{id}/bracket/rounds/{round}")]
async fn api_update_round(state: AppState, path: Path<RoundPath>, body: Json<RoundUpdate>) -> HttpResponse {
    let result = state.update_round(path.id, path.round, &body).await;
    with_bracket(&state, path.id, result).await
}

/// Delete a round and its matches. Applies immediately: the revision-checked
/// propose/confirm step lives in `BracketSession`, which clients use before calling this.
#[delete("/api/tournaments/{id}/bracket/rounds/{round}")]
async fn api_delete_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    let result = state.delete_round(path.id, path.round).await;
    with_bracket(&state, path.id, result).await
}

#[post("/api/tournaments/{id}/bracket/matches")]
async fn api_add_match(state: AppState, path: Path<TournamentPath>, body: Json<AddMatchRequest>) -> HttpResponse {
    let result = state.add_match(path.id, &body).await.map(|_| ());
    with_bracket(&state, path.id, result).await
}

/// Delete a match. Applies immediately; confirmation is `BracketSession::propose_delete_match`.
#[delete("/api/tournaments/{id}/bracket/matches/{match_id}")]
async fn api_delete_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let result = state.delete_match(path.id, path.match_id).await;
    with_bracket(&state, path.id, result).await
}

#[put("/api/tournaments/{id}/bracket/matches/{match_id}/position")]
async fn api_reorder_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ReorderMatchRequest>,
) -> HttpResponse {
    let result = state.reorder_match(path.id, path.match_id, &body).await;
    with_bracket(&state, path.id, result).await
}

/// Put a participant into a slot, or empty it with `teamId: null`.
#[put("/api/tournaments/{id}/bracket/matches/{match_id}/slot")]
async fn api_assign_slot(state: AppState, path: Path<MatchPath>, body: Json<AssignSlotRequest>) -> HttpResponse {
    let result = state.assign_slot(path.id, path.match_id, &body).await;
    with_bracket(&state, path.id, result).await
}

/// Record scores (with optional winner override) or clear the result with `{ "clear": true }`.
/// Clearing applies immediately; confirmation is `BracketSession::propose_clear_result`.
#[put("/api/tournaments/{id}/bracket/matches/{match_id}/result")]
async fn api_set_result(state: AppState, path: Path<MatchPath>, body: Json<SetResultRequest>) -> HttpResponse {
    let result = state.set_result(path.id, path.match_id, &body).await;
    with_bracket(&state, path.id, result).await
}

/// Complete the bracket. Applies immediately; confirmation is `BracketSession::propose_complete`.
#[post("/api/tournaments/{id}/bracket/complete")]
async fn api_complete_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state.complete_custom_bracket(path.id).await;
    with_bracket(&state, path.id, result).await
}

#[post("/api/tournaments/{id}/bracket/swiss/advance")]
async fn api_advance_swiss(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state.advance_swiss_round(path.id).await.map(|_| ());
    with_bracket(&state, path.id, result).await
}

#[post("/api/tournaments/{id}/bracket/battle-royale/advance")]
async fn api_advance_battle_royale(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state.advance_battle_royale_round(path.id).await.map(|_| ());
    with_bracket(&state, path.id, result).await
}

/// Report a stage's standings; `final: true` completes the stage.
#[put("/api/tournaments/{id}/bracket/stages/{order}/standings")]
async fn api_record_standings(state: AppState, path: Path<StagePath>, body: Json<StandingsBody>) -> HttpResponse {
    let body = body.into_inner();
    let result = state.record_stage_standings(path.id, path.order, body.standings, body.final_standings);
    with_bracket(&state, path.id, result).await
}

/// Proposed qualifiers of a completed stage.
#[get("/api/tournaments/{id}/bracket/stages/{order}/advancement")]
async fn api_calculate_advancement(state: AppState, path: Path<StagePath>) -> HttpResponse {
    match state.calculate_advancement(path.id, path.order).await {
        Ok(proposal) => HttpResponse::Ok().json(proposal),
        Err(e) => error_response(&e),
    }
}

/// Seed the next stage with the confirmed (possibly reordered) qualifiers.
#[post("/api/tournaments/{id}/bracket/stages/{order}/advancement")]
async fn api_confirm_advancement(
    state: AppState,
    path: Path<StagePath>,
    body: Json<ConfirmAdvancementRequest>,
) -> HttpResponse {
    let result = state.confirm_advancement(path.id, path.order, &body).await;
    with_bracket(&state, path.id, result).await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(MemoryRemote::new());

    // Background task: every 30 minutes, remove brackets past the inactivity timeout
    let state_cleanup = state.clone();
    let max_idle = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let removed = state_cleanup.cleanup_inactive(max_idle);
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive bracket(s) (no activity for {:?})",
                    removed,
                    max_idle
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_validate)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_delete_bracket)
            .service(api_add_round)
            .service(api_reorder_rounds)
            .service(api_update_round)
            .service(api_delete_round)
            .service(api_add_match)
            .service(api_delete_match)
            .service(api_reorder_match)
            .service(api_assign_slot)
            .service(api_set_result)
            .service(api_complete_bracket)
            .service(api_advance_swiss)
            .service(api_advance_battle_royale)
            .service(api_record_standings)
            .service(api_calculate_advancement)
            .service(api_confirm_advancement)
    })
    .bind(bind)?
    .run()
    .await
}
