pub const WORLD_WIDTH: f64 = 2000.0;
pub const WORLD_HEIGHT: f64 = 2000.0;
pub const STARTING_LENGTH: usize = 25;
pub const BASE_SPEED: f64 = 2.0;
pub const BOT_SPEED_FACTOR: f64 = 0.8;
pub const TURNING_SPEED: f64 = 6.0;
pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;
pub const SPAWN_MARGIN: f64 = 200.0;

pub const RADIUS_SCALER: f64 = 0.2;
pub const MIN_SNAKE_RADIUS: f64 = 4.0;
pub const MAX_SNAKE_RADIUS: f64 = 10.0;
pub const PICKUP_TOLERANCE: f64 = 2.0;

pub const FOOD_COUNT: usize = 200;
pub const FOOD_RADIUS: f64 = 5.0;
pub const FOOD_SCORE: u32 = 1;

pub const DEAD_POINT_RADIUS: f64 = 6.0;
pub const CLEANUP_PROTECTION_TIME_MS: i64 = 30_000;
pub const MAX_DEAD_POINTS: usize = 2000;

pub const MAX_BOTS: usize = 10;
pub const BOT_SPAWN_BATCH: usize = 5;
pub const BOT_TURN_PROBABILITY: f64 = 0.05;
pub const BOT_MAX_TURN_DELTA: f64 = 30.0;

pub const RESPAWN_DELAY_MS: u64 = 3000;
pub const BOT_TICK_MS: u64 = 100;
pub const STATS_INTERVAL_MS: u64 = 5000;
pub const LEADERBOARD_INTERVAL_MS: u64 = 1000;
pub const LEADERBOARD_SIZE: usize = 10;

pub const COLOR_POOL: [&str; 8] = [
  "#ff6b6b",
  "#ffd166",
  "#06d6a0",
  "#4dabf7",
  "#f06595",
  "#845ef7",
  "#20c997",
  "#fcc419",
];
