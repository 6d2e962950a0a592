use axum::{
  extract::{Query, State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::{Deserialize, Serialize};
use snake_arena::app::time::now_millis;
use snake_arena::config::ServerConfig;
use snake_arena::game::room::Room;
use snake_arena::shared::auth::resolve_display_name;
use snake_arena::transport::ws_session::handle_socket;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
  room: Arc<Room>,
  auth_secret: Option<String>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
  player_count: usize,
  human_count: usize,
  bot_count: usize,
  food_count: usize,
  dead_point_count: usize,
  sessions: usize,
}

#[derive(Debug, Deserialize)]
struct ConnectQuery {
  token: Option<String>,
  name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::from_env();
  if config.auth_secret.is_none() {
    tracing::info!("AUTH_TOKEN_SECRET not set, every connection plays as guest");
  }

  let state = Arc::new(AppState {
    room: Arc::new(Room::new(config.game.clone())),
    auth_secret: config.auth_secret.clone(),
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/stats", get(stats))
    .route("/api/game", get(ws_handler))
    .layer(cors)
    .with_state(state);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!(
    world_width = config.game.world_width,
    world_height = config.game.world_height,
    max_bots = config.game.max_bots,
    "listening on {address}"
  );

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let stats = state.room.stats().await;
  Json(StatsResponse {
    player_count: stats.player_count,
    human_count: stats.human_count,
    bot_count: stats.bot_count,
    food_count: stats.food_count,
    dead_point_count: stats.dead_point_count,
    sessions: state.room.session_count(),
  })
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Query(query): Query<ConnectQuery>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let display_name = resolve_display_name(
    query.token.as_deref(),
    query.name.as_deref(),
    state.auth_secret.as_deref(),
    now_millis(),
  );
  let room = Arc::clone(&state.room);
  ws.on_upgrade(move |socket| handle_socket(socket, room, display_name))
}
