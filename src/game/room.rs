use super::world::{Audience, Effect, World, WorldStats};
use crate::app::time::now_millis;
use crate::config::GameConfig;
use crate::protocol;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct Cadence {
  bot_tick: Duration,
  leaderboard: Duration,
  stats: Duration,
}

/// Owns the world and every connected session. All world mutation happens
/// under `world`, and effects are flushed before the lock is released.
#[derive(Debug)]
pub struct Room {
  world: Mutex<World>,
  sessions: DashMap<String, UnboundedSender<String>>,
  running: AtomicBool,
  cadence: Cadence,
}

impl Room {
  pub fn new(config: GameConfig) -> Self {
    Self::with_world(World::new(config))
  }

  pub fn with_world(world: World) -> Self {
    let config = world.config();
    let cadence = Cadence {
      bot_tick: config.bot_tick,
      leaderboard: config.leaderboard_interval,
      stats: config.stats_interval,
    };
    Self {
      world: Mutex::new(world),
      sessions: DashMap::new(),
      running: AtomicBool::new(false),
      cadence,
    }
  }

  /// Registers the sender and pushes `gameInit` before anything else can reach it.
  pub async fn add_session(self: &Arc<Self>, sender: UnboundedSender<String>, name: String) -> String {
    let session_id = Uuid::new_v4().to_string();
    let mut world = self.world.lock().await;
    self.sessions.insert(session_id.clone(), sender);
    let (_, effects) = world.on_connect(&session_id, name);
    self.dispatch(&mut world, effects);
    drop(world);
    self.ensure_loop();
    session_id
  }

  pub async fn remove_session(self: &Arc<Self>, session_id: &str) {
    let mut world = self.world.lock().await;
    self.sessions.remove(session_id);
    let effects = world.on_disconnect(session_id);
    self.dispatch(&mut world, effects);
  }

  pub async fn handle_text_message(self: &Arc<Self>, session_id: &str, text: &str) {
    let Some(message) = protocol::decode_client_message(text) else {
      tracing::debug!(session_id, "dropping undecodable frame");
      return;
    };
    let mut world = self.world.lock().await;
    let effects = world.handle_client_message(session_id, message, now_millis());
    self.dispatch(&mut world, effects);
  }

  pub async fn stats(&self) -> WorldStats {
    self.world.lock().await.stats()
  }

  pub fn session_count(&self) -> usize {
    self.sessions.len()
  }

  fn ensure_loop(self: &Arc<Self>) {
    if self
      .running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return;
    }

    let room = Arc::clone(self);
    tokio::spawn(async move {
      let mut bot_tick = tokio::time::interval(room.cadence.bot_tick);
      let mut leaderboard = tokio::time::interval(room.cadence.leaderboard);
      let mut stats = tokio::time::interval(room.cadence.stats);
      let mut last_tick = Instant::now();
      loop {
        tokio::select! {
          _ = bot_tick.tick() => {
            let now = Instant::now();
            let delta_ms = now.duration_since(last_tick).as_secs_f64() * 1000.0;
            last_tick = now;
            let mut world = room.world.lock().await;
            if room.sessions.is_empty() {
              room.running.store(false, Ordering::SeqCst);
              break;
            }
            let effects = world.tick(delta_ms);
            room.dispatch(&mut world, effects);
          }
          _ = leaderboard.tick() => {
            let mut world = room.world.lock().await;
            let effects = world.leaderboard_update();
            room.dispatch(&mut world, effects);
          }
          _ = stats.tick() => {
            let mut world = room.world.lock().await;
            let effects = world.periodic_stats();
            room.dispatch(&mut world, effects);
          }
        }
      }
      tracing::debug!("room loop stopped, no sessions left");
    });
  }

  fn dispatch(self: &Arc<Self>, world: &mut World, effects: Vec<Effect>) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
      match effect {
        Effect::Send { audience, message } => {
          let Some(payload) = protocol::encode(&message) else { continue };
          let stale = self.send(&audience, &payload);
          for session_id in stale {
            tracing::warn!(session_id = %session_id, event = message.event_name(), "send failed, dropping session");
            if self.sessions.remove(&session_id).is_some() {
              queue.extend(world.on_disconnect(&session_id));
            }
          }
        }
        Effect::ScheduleRespawn { player_id, delay } => {
          let room = Arc::clone(self);
          tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut world = room.world.lock().await;
            let effects = world.respawn(&player_id);
            room.dispatch(&mut world, effects);
          });
        }
      }
    }
  }

  /// Returns the sessions whose channel is closed.
  fn send(&self, audience: &Audience, payload: &str) -> Vec<String> {
    let mut stale = Vec::new();
    match audience {
      Audience::Only(session_id) => {
        if let Some(sender) = self.sessions.get(session_id) {
          if sender.send(payload.to_string()).is_err() {
            stale.push(session_id.clone());
          }
        }
      }
      Audience::All | Audience::AllExcept(_) => {
        let excluded = match audience {
          Audience::AllExcept(session_id) => Some(session_id.as_str()),
          _ => None,
        };
        for entry in self.sessions.iter() {
          if Some(entry.key().as_str()) == excluded {
            continue;
          }
          if entry.value().send(payload.to_string()).is_err() {
            stale.push(entry.key().clone());
          }
        }
      }
    }
    stale
  }
}
