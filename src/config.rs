use crate::game::constants::{
  BASE_SPEED, BOT_SPAWN_BATCH, BOT_TICK_MS, FOOD_COUNT, LEADERBOARD_INTERVAL_MS, LEADERBOARD_SIZE,
  MAX_BOTS, MAX_DEAD_POINTS, RESPAWN_DELAY_MS, STARTING_LENGTH, STATS_INTERVAL_MS, WORLD_HEIGHT,
  WORLD_WIDTH,
};
use std::env;
use std::time::Duration;

/// World rules. Clients predict with the same defaults, so overrides only make
/// sense for tests and private servers.
#[derive(Debug, Clone)]
pub struct GameConfig {
  pub world_width: f64,
  pub world_height: f64,
  pub starting_length: usize,
  pub base_speed: f64,
  pub food_count: usize,
  pub max_dead_points: usize,
  pub max_bots: usize,
  pub bot_spawn_batch: usize,
  pub respawn_delay: Duration,
  pub bot_tick: Duration,
  pub stats_interval: Duration,
  pub leaderboard_interval: Duration,
  pub leaderboard_size: usize,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      world_width: WORLD_WIDTH,
      world_height: WORLD_HEIGHT,
      starting_length: STARTING_LENGTH,
      base_speed: BASE_SPEED,
      food_count: FOOD_COUNT,
      max_dead_points: MAX_DEAD_POINTS,
      max_bots: MAX_BOTS,
      bot_spawn_batch: BOT_SPAWN_BATCH,
      respawn_delay: Duration::from_millis(RESPAWN_DELAY_MS),
      bot_tick: Duration::from_millis(BOT_TICK_MS),
      stats_interval: Duration::from_millis(STATS_INTERVAL_MS),
      leaderboard_interval: Duration::from_millis(LEADERBOARD_INTERVAL_MS),
      leaderboard_size: LEADERBOARD_SIZE,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub port: u16,
  pub auth_secret: Option<String>,
  pub game: GameConfig,
}

impl ServerConfig {
  pub fn from_env() -> Self {
    let defaults = GameConfig::default();
    let game = GameConfig {
      world_width: env_parse("WORLD_WIDTH").unwrap_or(defaults.world_width),
      world_height: env_parse("WORLD_HEIGHT").unwrap_or(defaults.world_height),
      food_count: env_parse("FOOD_COUNT").unwrap_or(defaults.food_count),
      max_bots: env_parse("MAX_BOTS").unwrap_or(defaults.max_bots),
      bot_tick: env_parse::<u64>("BOT_TICK_MS")
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
        .unwrap_or(defaults.bot_tick),
      ..defaults
    };

    let auth_secret = env::var("AUTH_TOKEN_SECRET")
      .ok()
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty());

    Self {
      port: env_parse("PORT").unwrap_or(8787),
      auth_secret,
      game,
    }
  }
}

pub fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
  env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
