use rand::Rng;
use snake_arena::app::time::now_millis;
use snake_arena::client::connection::game_url;
use snake_arena::client::{ConnectionState, GameConnection, LocalPlayer, Mirror};
use snake_arena::config::env_parse;
use snake_arena::game::constants::{BOT_SPAWN_BATCH, NOMINAL_FRAME_MS};
use snake_arena::game::snake::Controls;
use snake_arena::protocol::ClientMessage;
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

const MAX_RECONNECTS: u32 = 5;
const STEER_HOLD_FRAMES: u32 = 45;
const REPORT_EVERY_FRAMES: u64 = 300;

#[derive(Debug, Clone)]
struct ProbeConfig {
  url: String,
  timeout: Duration,
  run_for: Option<Duration>,
}

impl ProbeConfig {
  fn from_env() -> anyhow::Result<Self> {
    let base = std::env::var("GAME_URL").unwrap_or_else(|_| "ws://127.0.0.1:8787/api/game".to_string());
    let name = std::env::var("PROBE_NAME").ok();
    let token = std::env::var("PROBE_TOKEN").ok();
    Ok(Self {
      url: game_url(&base, token.as_deref(), name.as_deref())?,
      timeout: Duration::from_millis(env_parse("CONNECT_TIMEOUT_MS").unwrap_or(5000)),
      run_for: env_parse::<u64>("PROBE_SECONDS").map(Duration::from_secs),
    })
  }
}

enum SessionEnd {
  Closed,
  Finished,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = ProbeConfig::from_env()?;
  let deadline = config.run_for.map(|run_for| Instant::now() + run_for);
  let mut state = ConnectionState::Connecting;
  let mut reconnects = 0;

  loop {
    let connection = match GameConnection::open(&config.url, config.timeout, state).await {
      Ok(connection) => connection,
      Err(error) if state == ConnectionState::Connecting => return Err(error),
      Err(error) => {
        tracing::warn!(%error, reconnects, "reconnect failed");
        reconnects += 1;
        if reconnects > MAX_RECONNECTS {
          anyhow::bail!("giving up after {MAX_RECONNECTS} reconnects");
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        continue;
      }
    };

    match play(connection, deadline).await {
      SessionEnd::Finished => return Ok(()),
      SessionEnd::Closed => {
        reconnects += 1;
        if reconnects > MAX_RECONNECTS {
          anyhow::bail!("giving up after {MAX_RECONNECTS} reconnects");
        }
        state = ConnectionState::Disconnected.on_retry();
        tracing::info!(reconnects, "connection lost, joining again as a new player");
        tokio::time::sleep(Duration::from_secs(1)).await;
      }
    }
  }
}

async fn play(mut connection: GameConnection, deadline: Option<Instant>) -> SessionEnd {
  let mut mirror = Mirror::new();
  let mut local = LocalPlayer::new();
  let mut rng = rand::thread_rng();
  let mut controls = Controls::default();
  let frame = Duration::from_secs_f64(NOMINAL_FRAME_MS / 1000.0);
  let mut next_frame = Instant::now() + frame;
  let mut last_frame = Instant::now();
  let mut frames: u64 = 0;

  loop {
    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
      connection.close().await;
      return SessionEnd::Finished;
    }

    match tokio::time::timeout_at(next_frame, connection.next_message()).await {
      Ok(Some(message)) => {
        let was_active = connection.state().accepts_gameplay();
        mirror.apply(message);
        if !was_active && connection.state().accepts_gameplay() {
          tracing::info!(player_id = mirror.local_id().unwrap_or_default(), "game initialized");
          connection
            .send(&ClientMessage::RequestMinimumPlayers {
              min_players: BOT_SPAWN_BATCH,
            })
            .await;
        }
        continue;
      }
      Ok(None) => return SessionEnd::Closed,
      Err(_) => {}
    }

    let now = Instant::now();
    let delta_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
    last_frame = now;
    next_frame += frame;
    frames += 1;

    if !connection.state().accepts_gameplay() {
      continue;
    }

    if frames % u64::from(STEER_HOLD_FRAMES) == 0 {
      controls = Controls {
        up: rng.gen_bool(0.3),
        down: rng.gen_bool(0.3),
        left: rng.gen_bool(0.3),
        right: rng.gen_bool(0.3),
      };
    }

    for event in local.frame(&controls, delta_ms, now_millis(), &mut mirror) {
      if let ClientMessage::PlayerDied { player_id, .. } = &event {
        tracing::info!(player_id = %player_id, "reporting death");
      }
      connection.send(&event).await;
    }

    if frames % REPORT_EVERY_FRAMES == 0 {
      if let Some(snake) = mirror.local_snake() {
        tracing::info!(
          score = snake.score,
          length = snake.len(),
          alive = snake.is_alive,
          players = mirror.players.len(),
          "probe status"
        );
      }
    }
  }
}
