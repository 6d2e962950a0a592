use super::bot::{drive_bot, spawn_bot};
use super::constants::{COLOR_POOL, FOOD_RADIUS, FOOD_SCORE, SPAWN_MARGIN};
use super::leaderboard::{generate_leaderboard, top};
use super::math::random_position;
use super::snake::Snake;
use super::types::{DeadPoint, Food, GameStateSnapshot, LeaderboardEntry, Point};
use crate::config::GameConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
  All,
  AllExcept(String),
  Only(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
  Send {
    audience: Audience,
    message: ServerMessage,
  },
  ScheduleRespawn {
    player_id: String,
    delay: Duration,
  },
}

impl Effect {
  fn broadcast(message: ServerMessage) -> Self {
    Effect::Send {
      audience: Audience::All,
      message,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldStats {
  pub player_count: usize,
  pub human_count: usize,
  pub bot_count: usize,
  pub food_count: usize,
  pub dead_point_count: usize,
}

/// The authoritative registry. Every handler returns the messages and timers it
/// wants realized instead of touching the network itself.
#[derive(Debug)]
pub struct World {
  config: GameConfig,
  players: HashMap<String, Snake>,
  sessions: HashMap<String, String>,
  foods: Vec<Food>,
  dead_points: Vec<DeadPoint>,
  next_bot_index: usize,
  rng: StdRng,
}

impl World {
  pub fn new(config: GameConfig) -> Self {
    Self::with_rng(config, StdRng::from_entropy())
  }

  pub fn with_rng(config: GameConfig, rng: StdRng) -> Self {
    let mut world = Self {
      config,
      players: HashMap::new(),
      sessions: HashMap::new(),
      foods: Vec::new(),
      dead_points: Vec::new(),
      next_bot_index: 1,
      rng,
    };
    let foods = (0..world.config.food_count as u32)
      .map(|id| world.random_food(id))
      .collect();
    world.foods = foods;
    world
  }

  pub fn config(&self) -> &GameConfig {
    &self.config
  }

  pub fn players(&self) -> &HashMap<String, Snake> {
    &self.players
  }

  pub fn player(&self, player_id: &str) -> Option<&Snake> {
    self.players.get(player_id)
  }

  pub fn foods(&self) -> &[Food] {
    &self.foods
  }

  pub fn dead_points(&self) -> &[DeadPoint] {
    &self.dead_points
  }

  pub fn session_player(&self, session_id: &str) -> Option<&str> {
    self.sessions.get(session_id).map(String::as_str)
  }

  pub fn human_count(&self) -> usize {
    self.players.values().filter(|player| !player.is_bot).count()
  }

  pub fn bot_count(&self) -> usize {
    self.players.values().filter(|player| player.is_bot).count()
  }

  pub fn stats(&self) -> WorldStats {
    WorldStats {
      player_count: self.players.len(),
      human_count: self.human_count(),
      bot_count: self.bot_count(),
      food_count: self.foods.len(),
      dead_point_count: self.dead_points.len(),
    }
  }

  pub fn snapshot(&self) -> GameStateSnapshot {
    GameStateSnapshot {
      players: self.players.values().map(Snake::to_record).collect(),
      foods: self.foods.clone(),
      dead_points: self.dead_points.clone(),
      world_width: self.config.world_width,
      world_height: self.config.world_height,
    }
  }

  pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
    generate_leaderboard(self.players.values())
  }

  /// Single dispatch point for everything a client can send.
  pub fn handle_client_message(&mut self, session_id: &str, message: ClientMessage, now: i64) -> Vec<Effect> {
    match message {
      ClientMessage::PlayerMove {
        player_id,
        x,
        y,
        angle,
        points,
      } => self.on_player_move(session_id, &player_id, x, y, angle, points),
      ClientMessage::FoodEaten { player_id, food_id } => self.on_food_eaten(&player_id, food_id),
      ClientMessage::PlayerDied {
        player_id,
        dead_points,
      } => self.on_player_died(&player_id, dead_points, now),
      ClientMessage::DeadPointEaten {
        player_id,
        dead_points,
      } => self.on_dead_point_eaten(&player_id, &dead_points),
      ClientMessage::RequestMinimumPlayers { min_players } => self.ensure_minimum_players(min_players),
    }
  }

  pub fn on_connect(&mut self, session_id: &str, name: String) -> (String, Vec<Effect>) {
    let first_human = self.human_count() == 0;
    let player_id = Uuid::new_v4().to_string();
    let snake = self.spawn_human(player_id.clone(), name);
    let record = snake.to_record();
    self.players.insert(player_id.clone(), snake);
    self.sessions.insert(session_id.to_string(), player_id.clone());

    let mut effects = vec![
      Effect::Send {
        audience: Audience::Only(session_id.to_string()),
        message: ServerMessage::GameInit {
          player_id: player_id.clone(),
          game_state: self.snapshot(),
        },
      },
      Effect::Send {
        audience: Audience::AllExcept(session_id.to_string()),
        message: ServerMessage::PlayerJoined(record),
      },
    ];
    if first_human {
      effects.extend(self.spawn_bots(self.config.bot_spawn_batch));
    }
    tracing::info!(player_id = %player_id, session_id, "player connected");
    (player_id, effects)
  }

  /// Trust-on-receipt: the submitted state replaces ours verbatim.
  pub fn on_player_move(
    &mut self,
    origin_session: &str,
    player_id: &str,
    x: f64,
    y: f64,
    angle: f64,
    points: VecDeque<Point>,
  ) -> Vec<Effect> {
    let Some(player) = self.players.get_mut(player_id) else { return Vec::new() };
    if !player.is_alive {
      return Vec::new();
    }
    player.apply_remote_state(x, y, angle, points);
    vec![Effect::Send {
      audience: Audience::AllExcept(origin_session.to_string()),
      message: ServerMessage::PlayerMoved {
        player_id: player_id.to_string(),
        x,
        y,
        angle: player.angle,
        points: player.points.clone(),
      },
    }]
  }

  pub fn on_food_eaten(&mut self, player_id: &str, food_id: u32) -> Vec<Effect> {
    if !self.players.contains_key(player_id) {
      return Vec::new();
    }
    let Some(index) = self.foods.iter().position(|food| food.id == food_id) else {
      return Vec::new();
    };
    let relocated = self.random_food(food_id);
    self.foods[index] = relocated.clone();

    let Some(player) = self.players.get_mut(player_id) else { return Vec::new() };
    player.score += FOOD_SCORE;
    let score = player.score;

    vec![
      Effect::broadcast(ServerMessage::FoodRegenerated(relocated)),
      Effect::broadcast(ServerMessage::ScoreUpdate {
        player_id: player_id.to_string(),
        score,
      }),
      self.leaderboard_effect(false),
    ]
  }

  pub fn on_dead_point_eaten(&mut self, player_id: &str, eaten: &[DeadPoint]) -> Vec<Effect> {
    if !self.players.contains_key(player_id) || eaten.is_empty() {
      return Vec::new();
    }
    let mut removed = Vec::new();
    self.dead_points.retain(|point| {
      if eaten.iter().any(|target| target.same_position(point)) {
        removed.push(point.clone());
        false
      } else {
        true
      }
    });
    if removed.is_empty() {
      return Vec::new();
    }
    vec![Effect::broadcast(ServerMessage::DeadPointsRemoved { dead_points: removed })]
  }

  pub fn on_player_died(&mut self, player_id: &str, submitted: Vec<DeadPoint>, now: i64) -> Vec<Effect> {
    let Some(player) = self.players.get_mut(player_id) else { return Vec::new() };
    if !player.is_alive {
      return Vec::new();
    }
    let is_bot = player.is_bot;
    let body = player.over(now);
    let mut dead_points = if submitted.is_empty() { body } else { submitted };
    for point in &mut dead_points {
      point.created_at = now;
    }
    self.append_dead_points(dead_points.clone());
    tracing::debug!(player_id, is_bot, dropped = dead_points.len(), "player died");

    let mut effects = vec![Effect::broadcast(ServerMessage::PlayerDied {
      player_id: player_id.to_string(),
      dead_points,
    })];

    if is_bot {
      self.players.remove(player_id);
      effects.push(Effect::broadcast(ServerMessage::PlayerDisconnected(player_id.to_string())));
      effects.push(self.leaderboard_effect(false));
    } else {
      effects.push(Effect::ScheduleRespawn {
        player_id: player_id.to_string(),
        delay: self.config.respawn_delay,
      });
    }
    effects
  }

  /// Runs when a respawn timer fires. The player may have left in the meantime.
  pub fn respawn(&mut self, player_id: &str) -> Vec<Effect> {
    let Some(player) = self.players.get(player_id) else { return Vec::new() };
    if player.is_alive || player.is_bot {
      return Vec::new();
    }
    let name = player.name.clone();
    let color = player.color.clone();
    let mut snake = self.spawn_human(player_id.to_string(), name);
    snake.color = color;
    for point in &mut snake.points {
      point.color.clone_from(&snake.color);
    }
    let record = snake.to_record();
    self.players.insert(player_id.to_string(), snake);
    tracing::debug!(player_id, "player respawned");
    vec![Effect::broadcast(ServerMessage::PlayerRespawned(record))]
  }

  pub fn on_disconnect(&mut self, session_id: &str) -> Vec<Effect> {
    let Some(player_id) = self.sessions.remove(session_id) else { return Vec::new() };
    if self.players.remove(&player_id).is_none() {
      return Vec::new();
    }
    tracing::info!(player_id = %player_id, session_id, "player disconnected");
    vec![Effect::broadcast(ServerMessage::PlayerDisconnected(player_id))]
  }

  /// Spawns up to `count` bots without exceeding the bot cap.
  pub fn spawn_bots(&mut self, count: usize) -> Vec<Effect> {
    let capacity = self.config.max_bots.saturating_sub(self.bot_count());
    let mut effects = Vec::new();
    for _ in 0..count.min(capacity) {
      let id = Uuid::new_v4().to_string();
      let bot = spawn_bot(
        id.clone(),
        self.next_bot_index,
        self.config.world_width,
        self.config.world_height,
        self.config.starting_length,
        self.config.base_speed,
        &mut self.rng,
      );
      self.next_bot_index += 1;
      effects.push(Effect::broadcast(ServerMessage::PlayerJoined(bot.to_record())));
      self.players.insert(id, bot);
    }
    if !effects.is_empty() {
      tracing::debug!(spawned = effects.len(), bots = self.bot_count(), "spawned bots");
    }
    effects
  }

  pub fn ensure_minimum_players(&mut self, min_players: usize) -> Vec<Effect> {
    let shortfall = min_players.saturating_sub(self.players.len());
    if shortfall == 0 {
      return Vec::new();
    }
    self.spawn_bots(shortfall)
  }

  /// Advances every live bot and relays its movement like a remote player's.
  pub fn tick(&mut self, delta_ms: f64) -> Vec<Effect> {
    let (width, height) = (self.config.world_width, self.config.world_height);
    let mut effects = Vec::new();
    for bot in self.players.values_mut().filter(|player| player.is_bot && player.is_alive) {
      drive_bot(bot, width, height, delta_ms, &mut self.rng);
      let (x, y) = bot.position();
      effects.push(Effect::broadcast(ServerMessage::PlayerMoved {
        player_id: bot.id.clone(),
        x,
        y,
        angle: bot.angle,
        points: bot.points.clone(),
      }));
    }
    effects
  }

  pub fn periodic_stats(&self) -> Vec<Effect> {
    let leaderboard = top(&self.leaderboard(), self.config.leaderboard_size);
    vec![Effect::broadcast(ServerMessage::GameStats {
      player_count: self.players.len(),
      food_count: self.foods.len(),
      leaderboard: Some(leaderboard),
    })]
  }

  pub fn leaderboard_update(&self) -> Vec<Effect> {
    vec![self.leaderboard_effect(true)]
  }

  fn leaderboard_effect(&self, include_full: bool) -> Effect {
    let full = self.leaderboard();
    let leaderboard = top(&full, self.config.leaderboard_size);
    Effect::broadcast(ServerMessage::LeaderboardUpdate {
      leaderboard,
      full_leaderboard: include_full.then_some(full),
    })
  }

  /// Appends and, past the cap, keeps only the newest slice.
  fn append_dead_points(&mut self, points: Vec<DeadPoint>) {
    self.dead_points.extend(points);
    let cap = self.config.max_dead_points;
    if self.dead_points.len() > cap {
      let excess = self.dead_points.len() - cap;
      self.dead_points.drain(0..excess);
    }
  }

  fn spawn_human(&mut self, id: String, name: String) -> Snake {
    let (x, y) = random_position(
      &mut self.rng,
      self.config.world_width,
      self.config.world_height,
      SPAWN_MARGIN,
    );
    let angle = self.rng.gen_range(0.0..360.0);
    let color = COLOR_POOL[self.rng.gen_range(0..COLOR_POOL.len())].to_string();
    Snake::new(
      id,
      name,
      x,
      y,
      angle,
      color,
      false,
      self.config.starting_length,
      self.config.base_speed,
    )
  }

  fn random_food(&mut self, id: u32) -> Food {
    let (x, y) = random_position(
      &mut self.rng,
      self.config.world_width,
      self.config.world_height,
      FOOD_RADIUS,
    );
    Food {
      id,
      x,
      y,
      radius: FOOD_RADIUS,
      color: COLOR_POOL[self.rng.gen_range(0..COLOR_POOL.len())].to_string(),
    }
  }
}

#[cfg(test)]
mod tests;
