use crate::game::types::{DeadPoint, Food, GameStateSnapshot, LeaderboardEntry, PlayerRecord, Point};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Client to server. Frames are `{"type": "<event>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
  #[serde(rename_all = "camelCase")]
  PlayerMove {
    player_id: String,
    x: f64,
    y: f64,
    angle: f64,
    points: VecDeque<Point>,
  },
  #[serde(rename_all = "camelCase")]
  FoodEaten { player_id: String, food_id: u32 },
  #[serde(rename_all = "camelCase")]
  PlayerDied {
    player_id: String,
    #[serde(default)]
    dead_points: Vec<DeadPoint>,
  },
  #[serde(rename_all = "camelCase")]
  DeadPointEaten {
    player_id: String,
    dead_points: Vec<DeadPoint>,
  },
  #[serde(rename_all = "camelCase")]
  RequestMinimumPlayers { min_players: usize },
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
  #[serde(rename_all = "camelCase")]
  GameInit {
    player_id: String,
    game_state: GameStateSnapshot,
  },
  PlayerJoined(PlayerRecord),
  #[serde(rename_all = "camelCase")]
  PlayerMoved {
    player_id: String,
    x: f64,
    y: f64,
    angle: f64,
    points: VecDeque<Point>,
  },
  FoodRegenerated(Food),
  #[serde(rename_all = "camelCase")]
  ScoreUpdate { player_id: String, score: u32 },
  #[serde(rename_all = "camelCase")]
  PlayerDied {
    player_id: String,
    dead_points: Vec<DeadPoint>,
  },
  #[serde(rename_all = "camelCase")]
  DeadPointsRemoved { dead_points: Vec<DeadPoint> },
  PlayerRespawned(PlayerRecord),
  PlayerDisconnected(String),
  #[serde(rename_all = "camelCase")]
  GameStats {
    player_count: usize,
    food_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    leaderboard: Option<Vec<LeaderboardEntry>>,
  },
  #[serde(rename_all = "camelCase")]
  LeaderboardUpdate {
    leaderboard: Vec<LeaderboardEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_leaderboard: Option<Vec<LeaderboardEntry>>,
  },
}

impl ClientMessage {
  pub fn event_name(&self) -> &'static str {
    match self {
      ClientMessage::PlayerMove { .. } => "playerMove",
      ClientMessage::FoodEaten { .. } => "foodEaten",
      ClientMessage::PlayerDied { .. } => "playerDied",
      ClientMessage::DeadPointEaten { .. } => "deadPointEaten",
      ClientMessage::RequestMinimumPlayers { .. } => "requestMinimumPlayers",
    }
  }
}

impl ServerMessage {
  pub fn event_name(&self) -> &'static str {
    match self {
      ServerMessage::GameInit { .. } => "gameInit",
      ServerMessage::PlayerJoined(_) => "playerJoined",
      ServerMessage::PlayerMoved { .. } => "playerMoved",
      ServerMessage::FoodRegenerated(_) => "foodRegenerated",
      ServerMessage::ScoreUpdate { .. } => "scoreUpdate",
      ServerMessage::PlayerDied { .. } => "playerDied",
      ServerMessage::DeadPointsRemoved { .. } => "deadPointsRemoved",
      ServerMessage::PlayerRespawned(_) => "playerRespawned",
      ServerMessage::PlayerDisconnected(_) => "playerDisconnected",
      ServerMessage::GameStats { .. } => "gameStats",
      ServerMessage::LeaderboardUpdate { .. } => "leaderboardUpdate",
    }
  }
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  serde_json::from_str(text).ok()
}

pub fn decode_server_message(text: &str) -> Option<ServerMessage> {
  serde_json::from_str(text).ok()
}

pub fn encode<T: Serialize>(message: &T) -> Option<String> {
  serde_json::to_string(message).ok()
}
