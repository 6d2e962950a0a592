use super::constants::CLEANUP_PROTECTION_TIME_MS;
use super::math::CollisionObject;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
  pub radius: f64,
  pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
  pub id: u32,
  pub x: f64,
  pub y: f64,
  pub radius: f64,
  pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadPoint {
  pub x: f64,
  pub y: f64,
  pub radius: f64,
  pub color: String,
  #[serde(default)]
  pub created_at: i64,
}

impl DeadPoint {
  /// Fresh corpse fragments are protected so nobody can eat them at the death site.
  pub fn is_old_enough_to_consume(&self, now: i64) -> bool {
    now - self.created_at >= CLEANUP_PROTECTION_TIME_MS
  }

  pub fn same_position(&self, other: &DeadPoint) -> bool {
    self.x == other.x && self.y == other.y
  }
}

/// Full player record as it travels in `gameInit`, `playerJoined` and `playerRespawned`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
  pub id: String,
  pub name: String,
  pub x: f64,
  pub y: f64,
  pub angle: f64,
  pub points: VecDeque<Point>,
  pub color: String,
  pub radius: f64,
  pub score: u32,
  pub is_alive: bool,
  pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub id: String,
  pub display_name: String,
  pub score: u32,
  pub rank: usize,
  pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
  pub players: Vec<PlayerRecord>,
  pub foods: Vec<Food>,
  pub dead_points: Vec<DeadPoint>,
  pub world_width: f64,
  pub world_height: f64,
}

impl CollisionObject for Point {
  fn x(&self) -> f64 {
    self.x
  }

  fn y(&self) -> f64 {
    self.y
  }

  fn radius(&self) -> f64 {
    self.radius
  }
}

impl CollisionObject for Food {
  fn x(&self) -> f64 {
    self.x
  }

  fn y(&self) -> f64 {
    self.y
  }

  fn radius(&self) -> f64 {
    self.radius
  }
}

impl CollisionObject for DeadPoint {
  fn x(&self) -> f64 {
    self.x
  }

  fn y(&self) -> f64 {
    self.y
  }

  fn radius(&self) -> f64 {
    self.radius
  }
}

/// Anything a snake head can swallow: it leaves its color on the new segment.
pub trait Edible: CollisionObject {
  fn color(&self) -> &str;
}

impl Edible for Food {
  fn color(&self) -> &str {
    &self.color
  }
}

impl Edible for DeadPoint {
  fn color(&self) -> &str {
    &self.color
  }
}

impl Edible for Point {
  fn color(&self) -> &str {
    &self.color
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dead_point(created_at: i64) -> DeadPoint {
    DeadPoint {
      x: 10.0,
      y: 20.0,
      radius: 6.0,
      color: "#ffffff".to_string(),
      created_at,
    }
  }

  #[test]
  fn fresh_dead_point_is_protected() {
    let point = dead_point(1_000);
    assert!(!point.is_old_enough_to_consume(1_000));
    assert!(!point.is_old_enough_to_consume(1_000 + CLEANUP_PROTECTION_TIME_MS - 1));
  }

  #[test]
  fn dead_point_becomes_consumable_after_protection_window() {
    let point = dead_point(1_000);
    assert!(point.is_old_enough_to_consume(1_000 + CLEANUP_PROTECTION_TIME_MS));
    assert!(point.is_old_enough_to_consume(1_000 + CLEANUP_PROTECTION_TIME_MS * 2));
  }

  #[test]
  fn dead_point_created_at_defaults_when_missing() {
    let point: DeadPoint =
      serde_json::from_str(r##"{"x":1.0,"y":2.0,"radius":6.0,"color":"#000"}"##).expect("point");
    assert_eq!(point.created_at, 0);
  }
}
