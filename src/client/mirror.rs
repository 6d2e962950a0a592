use crate::game::constants::{BASE_SPEED, MAX_DEAD_POINTS};
use crate::game::snake::Snake;
use crate::game::types::{DeadPoint, Food, LeaderboardEntry, PlayerRecord};
use crate::protocol::ServerMessage;
use std::collections::HashMap;

/// Client-side projection of the world, fed only by server events.
#[derive(Debug, Default)]
pub struct Mirror {
  local_id: Option<String>,
  pub players: HashMap<String, Snake>,
  pub foods: Vec<Food>,
  pub dead_points: Vec<DeadPoint>,
  pub world_width: f64,
  pub world_height: f64,
  pub player_count: usize,
  pub food_count: usize,
  pub leaderboard: Vec<LeaderboardEntry>,
  pub full_leaderboard: Vec<LeaderboardEntry>,
}

impl Mirror {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_initialized(&self) -> bool {
    self.local_id.is_some()
  }

  pub fn local_id(&self) -> Option<&str> {
    self.local_id.as_deref()
  }

  pub fn local_snake(&self) -> Option<&Snake> {
    self.players.get(self.local_id.as_deref()?)
  }

  pub fn local_snake_mut(&mut self) -> Option<&mut Snake> {
    let id = self.local_id.as_deref()?;
    self.players.get_mut(id)
  }

  fn is_local(&self, player_id: &str) -> bool {
    self.local_id.as_deref() == Some(player_id)
  }

  fn insert_record(&mut self, record: PlayerRecord) {
    let snake = Snake::from_record(record, BASE_SPEED);
    self.players.insert(snake.id.clone(), snake);
  }

  /// Applies one server event. Returns `false` when the event was ignored.
  pub fn apply(&mut self, message: ServerMessage) -> bool {
    if !self.is_initialized() && !matches!(message, ServerMessage::GameInit { .. }) {
      return false;
    }

    match message {
      ServerMessage::GameInit { player_id, game_state } => {
        self.players.clear();
        for record in game_state.players {
          self.insert_record(record);
        }
        self.foods = game_state.foods;
        self.dead_points = game_state.dead_points;
        self.world_width = game_state.world_width;
        self.world_height = game_state.world_height;
        self.player_count = self.players.len();
        self.food_count = self.foods.len();
        self.local_id = Some(player_id);
        true
      }
      ServerMessage::PlayerJoined(record) | ServerMessage::PlayerRespawned(record) => {
        self.insert_record(record);
        true
      }
      ServerMessage::PlayerMoved {
        player_id,
        x,
        y,
        angle,
        points,
      } => {
        if self.is_local(&player_id) {
          return false;
        }
        let Some(snake) = self.players.get_mut(&player_id) else { return false };
        if !snake.is_alive {
          return false;
        }
        snake.apply_remote_state(x, y, angle, points);
        true
      }
      ServerMessage::FoodRegenerated(food) => {
        match self.foods.iter_mut().find(|existing| existing.id == food.id) {
          Some(existing) => *existing = food,
          None => self.foods.push(food),
        }
        true
      }
      ServerMessage::ScoreUpdate { player_id, score } => {
        let Some(snake) = self.players.get_mut(&player_id) else { return false };
        snake.score = score;
        true
      }
      ServerMessage::PlayerDied {
        player_id,
        dead_points,
      } => {
        let Some(snake) = self.players.get_mut(&player_id) else { return false };
        if snake.is_alive {
          snake.over(0);
        }
        self.dead_points.extend(dead_points);
        if self.dead_points.len() > MAX_DEAD_POINTS {
          let excess = self.dead_points.len() - MAX_DEAD_POINTS;
          self.dead_points.drain(..excess);
        }
        true
      }
      ServerMessage::DeadPointsRemoved { dead_points } => {
        let before = self.dead_points.len();
        self
          .dead_points
          .retain(|point| !dead_points.iter().any(|removed| removed.same_position(point)));
        before != self.dead_points.len()
      }
      ServerMessage::PlayerDisconnected(player_id) => self.players.remove(&player_id).is_some(),
      ServerMessage::GameStats {
        player_count,
        food_count,
        leaderboard,
      } => {
        self.player_count = player_count;
        self.food_count = food_count;
        if let Some(leaderboard) = leaderboard {
          self.leaderboard = leaderboard;
        }
        true
      }
      ServerMessage::LeaderboardUpdate {
        leaderboard,
        full_leaderboard,
      } => {
        self.leaderboard = leaderboard;
        if let Some(full) = full_leaderboard {
          self.full_leaderboard = full;
        }
        true
      }
    }
  }

  /// Drops a food locally until the server relocates it.
  pub(crate) fn take_food(&mut self, food_id: u32) {
    self.foods.retain(|food| food.id != food_id);
  }

  pub(crate) fn take_dead_points(&mut self, eaten: &[DeadPoint]) {
    self
      .dead_points
      .retain(|point| !eaten.iter().any(|taken| taken.same_position(point)));
  }
}
