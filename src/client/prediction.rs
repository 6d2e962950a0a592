use super::mirror::Mirror;
use crate::game::constants::{NOMINAL_FRAME_MS, PICKUP_TOLERANCE};
use crate::game::math::{circles_overlap, find_first_collision};
use crate::game::snake::{Controls, Snake};
use crate::game::types::DeadPoint;
use crate::protocol::ClientMessage;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Drives the locally owned snake ahead of the server.
#[derive(Debug)]
pub struct LocalPlayer {
  since_last_move: f64,
  rng: StdRng,
}

impl Default for LocalPlayer {
  fn default() -> Self {
    Self::new()
  }
}

impl LocalPlayer {
  pub fn new() -> Self {
    Self::with_rng(StdRng::from_entropy())
  }

  pub fn with_rng(rng: StdRng) -> Self {
    Self {
      since_last_move: NOMINAL_FRAME_MS,
      rng,
    }
  }

  /// One prediction step. Effects land on the local snake immediately and the
  /// returned events tell the server about them.
  pub fn frame(&mut self, controls: &Controls, delta_ms: f64, now: i64, mirror: &mut Mirror) -> Vec<ClientMessage> {
    let Some(local_id) = mirror.local_id().map(str::to_string) else { return Vec::new() };
    let Some(mut snake) = mirror.players.remove(&local_id) else { return Vec::new() };

    let mut events = Vec::new();
    if snake.is_alive {
      snake.advance(Some(controls), delta_ms, &mut self.rng);
      resolve_collisions(&mut snake, now, mirror, &mut events);
    }

    self.since_last_move += delta_ms;
    if snake.is_alive && self.since_last_move >= NOMINAL_FRAME_MS {
      self.since_last_move = 0.0;
      let (x, y) = snake.position();
      events.push(ClientMessage::PlayerMove {
        player_id: local_id.clone(),
        x,
        y,
        angle: snake.angle,
        points: snake.points.clone(),
      });
    }

    mirror.players.insert(local_id, snake);
    events
  }
}

fn resolve_collisions(snake: &mut Snake, now: i64, mirror: &mut Mirror, events: &mut Vec<ClientMessage>) {
  if let Some(dead_points) = snake.check_collisions_with_boundary(mirror.world_width, mirror.world_height, now) {
    events.push(ClientMessage::PlayerDied {
      player_id: snake.id.clone(),
      dead_points,
    });
    return;
  }

  let target = snake
    .head()
    .and_then(|head| find_first_collision(head, &mirror.foods, PICKUP_TOLERANCE));
  let eaten_food = target
    .and_then(|food| snake.check_collisions_with_food(food))
    .map(|food| food.id);
  if let Some(food_id) = eaten_food {
    snake.score += 1;
    mirror.take_food(food_id);
    events.push(ClientMessage::FoodEaten {
      player_id: snake.id.clone(),
      food_id,
    });
  }

  let consumable: Vec<DeadPoint> = match snake.head() {
    Some(head) => mirror
      .dead_points
      .iter()
      .filter(|point| point.is_old_enough_to_consume(now) && circles_overlap(head, *point, PICKUP_TOLERANCE))
      .cloned()
      .collect(),
    None => Vec::new(),
  };
  if !consumable.is_empty() {
    for point in &consumable {
      snake.eat(&point.color);
    }
    mirror.take_dead_points(&consumable);
    events.push(ClientMessage::DeadPointEaten {
      player_id: snake.id.clone(),
      dead_points: consumable,
    });
  }

  let collision = mirror
    .players
    .values()
    .find_map(|other| snake.check_collisions_with_other_snakes(other, now));
  if let Some(collision) = collision {
    tracing::debug!(collided_with = %collision.collided_with, points = collision.points, "local snake died");
    if let Some(winner) = mirror.players.get_mut(&collision.collided_with) {
      winner.eat_snake(collision.points);
    }
    events.push(ClientMessage::PlayerDied {
      player_id: snake.id.clone(),
      dead_points: collision.dead_points,
    });
    return;
  }

  for bot in mirror.players.values_mut().filter(|player| player.is_bot && player.is_alive) {
    let Some(bot_head) = bot.head() else { continue };
    if !snake.points.iter().any(|point| circles_overlap(bot_head, point, 0.0)) {
      continue;
    }
    let bot_length = bot.len();
    let dead_points = bot.over(now);
    snake.eat_snake(bot_length);
    events.push(ClientMessage::PlayerDied {
      player_id: bot.id.clone(),
      dead_points,
    });
  }
}
