use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use risk_routing::config::{Config, RiskSourceKind, init_logging};
use risk_routing::directions::DirectionsClient;
use risk_routing::error::RoutingError;
use risk_routing::risk::{self, CellRiskMap, RiskSource, SmoothNoise};
use risk_routing::route::{Route, RouteSummary, score_route_set};

// Shared state for the request handlers
struct AppState {
    directions: DirectionsClient,
    risk: Box<dyn RiskSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // 1. Load configuration
    let config = Config::from_env()?;

    // 2. Pick the risk source backing the scoring pipeline
    let risk: Box<dyn RiskSource> = match config.risk_source {
        RiskSourceKind::Cells => {
            let (lat, lng) = config.risk_center;
            Box::new(CellRiskMap::seeded(lat, lng))
        }
        RiskSourceKind::Synthetic => Box::new(SmoothNoise),
    };

    let directions = DirectionsClient::new(
        reqwest::Client::new(),
        config.google_api_key.clone(),
        config.max_routes,
    );
    let shared_state = Arc::new(AppState { directions, risk });

    // 3. Setup CORS so the map front-end can talk to this API
    let cors = CorsLayer::new()
        .allow_methods(tower_http::cors::Any)
        .allow_origin(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    // 4. Setup Router
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/routes", post(fetch_and_score_routes))
        .layer(cors)
        .with_state(shared_state);

    log::info!("API server running on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- API DTOs ---

#[derive(Deserialize)]
struct RouteRequest {
    origin: String,
    destination: String,
    #[serde(default)]
    mode: String,
}

#[derive(Serialize)]
struct RouteSetResponse {
    routes: Vec<Route>,
    safest_index: Option<usize>,
    fastest_index: Option<usize>,
    shortest_index: Option<usize>,
    summaries: Vec<RouteSummary>,
}

// --- Handler ---

/// One search: fetch alternatives, score them atomically into a RouteSet,
/// attach popup condition samples, reply. Each response fully replaces
/// whatever the client was showing before.
async fn fetch_and_score_routes(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RouteRequest>,
) -> Result<Json<RouteSetResponse>, RoutingError> {
    let upstream = state
        .directions
        .fetch(&payload.origin, &payload.destination, &payload.mode)
        .await?;

    let mut set = score_route_set(&upstream, state.risk.as_ref());
    log::info!(
        "scored {} route(s) for {} -> {}",
        set.routes.len(),
        payload.origin,
        payload.destination
    );

    let mut rng = rand::rng();
    for route in set.routes.iter_mut() {
        route.conditions = risk::mock_conditions(&mut rng, &route.coords, 8);
    }

    let summaries = set.summaries();
    Ok(Json(RouteSetResponse {
        routes: set.routes,
        safest_index: set.safest_index,
        fastest_index: set.fastest_index,
        shortest_index: set.shortest_index,
        summaries,
    }))
}
