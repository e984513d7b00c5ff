use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{window_fits, Config, MAX_WINDOW_DAYS};
use crate::models::{ApiResponse, ErrorBody, MatchSummary, MatchesResponse, TeamView};
use crate::services::{tag_matches_for_team, DataFetcher, MatchSource, PredictionEngine};
use crate::utils::{parse_date, recent_matches, summarize, validate_team_name};

pub struct AppState {
    pub source: Arc<dyn MatchSource>,
    pub engine: PredictionEngine,
    pub config: Config,
}

impl AppState {
    pub fn new(source: Arc<dyn MatchSource>, config: Config) -> Self {
        Self {
            source,
            engine: PredictionEngine::with_config(config.predictor.clone()),
            config,
        }
    }
}

type SharedState = Arc<AppState>;
type ApiError = (StatusCode, Json<ErrorBody>);

pub async fn serve(config: Config, port: u16) -> anyhow::Result<()> {
    let fetcher = DataFetcher::new(&config.feed)?;
    let state = Arc::new(AppState::new(Arc::new(fetcher), config));

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Prediction API listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/matches", get(matches_handler))
        .route("/api/matches/recent", get(recent_matches_handler))
        .route("/api/teams/{name}", get(team_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Prediction API is running"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    search: Option<String>,
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message)))
}

fn internal_error(message: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(message)))
}

/// Requested window, defaulting either bound from the configured look-back
/// and look-ahead.
fn resolve_window(config: &Config, query: &WindowQuery) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let (default_start, default_end) = config.default_window(Utc::now().date_naive());
    let pick = |raw: &Option<String>, fallback: NaiveDate| match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(fallback),
        Some(raw) => parse_date(raw).map_err(|e| bad_request(format!("invalid date {raw:?}: {e}"))),
    };
    let (start, end) = (pick(&query.start_date, default_start)?, pick(&query.end_date, default_end)?);
    if !window_fits(start, end) {
        return Err(bad_request(format!(
            "window {start} to {end} is longer than {} days",
            2 * MAX_WINDOW_DAYS + 1
        )));
    }
    Ok((start, end))
}

// GET /api/matches - fetch the window and run the predictor over it
async fn matches_handler(
    State(state): State<SharedState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<MatchesResponse>, ApiError> {
    let (start, end) = resolve_window(&state.config, &query)?;
    tracing::info!("Prediction request for {} to {}", start, end);

    let matches = state.source.fetch_window(start, end).await;
    let match_count = matches.len();

    let worker = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || worker.engine.run(&matches, Utc::now()))
        .await
        .map_err(|e| {
            tracing::error!("Prediction task failed: {}", e);
            internal_error("Failed to process match data")
        })?;

    Ok(Json(MatchesResponse {
        match_count,
        predictions: report.predictions,
        status: "success".to_string(),
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
    }))
}

// GET /api/matches/recent - newest results and fixtures, optionally searched
async fn recent_matches_handler(
    State(state): State<SharedState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<Vec<MatchSummary>>>, ApiError> {
    let (start, end) = resolve_window(&state.config, &query)?;
    let matches = state.source.fetch_window(start, end).await;
    let recent = recent_matches(&matches, query.search.as_deref())
        .into_iter()
        .map(summarize)
        .collect();
    Ok(Json(ApiResponse::success(recent)))
}

// GET /api/teams/{name} - a team's results and upcoming fixtures
async fn team_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<TeamView>>, ApiError> {
    if !validate_team_name(&name) {
        return Err(bad_request(format!("invalid team name {name:?}")));
    }
    let (start, end) = resolve_window(&state.config, &query)?;
    let matches = state.source.fetch_window(start, end).await;

    let tagged = tag_matches_for_team(&matches, &name, state.engine.config().name_matching, Utc::now());
    let view = TeamView {
        team: name.trim().to_string(),
        past: tagged.past.into_iter().map(summarize).collect(),
        future: tagged.future.into_iter().map(summarize).collect(),
    };
    Ok(Json(ApiResponse::success(view)))
}
