use super::constants::{
  BOT_MAX_TURN_DELTA, BOT_SPEED_FACTOR, BOT_TURN_PROBABILITY, COLOR_POOL, NOMINAL_FRAME_MS,
  SPAWN_MARGIN,
};
use super::math::{clamp, heading_vector, normalize_angle, random_position};
use super::snake::Snake;
use rand::Rng;

/// With small probability, nudge the heading by a bounded random delta.
pub fn wander_heading<R: Rng + ?Sized>(angle: f64, rng: &mut R) -> f64 {
  if rng.gen_bool(BOT_TURN_PROBABILITY) {
    normalize_angle(angle + rng.gen_range(-BOT_MAX_TURN_DELTA..=BOT_MAX_TURN_DELTA))
  } else {
    angle
  }
}

pub fn spawn_bot<R: Rng + ?Sized>(
  id: String,
  index: usize,
  width: f64,
  height: f64,
  length: usize,
  base_speed: f64,
  rng: &mut R,
) -> Snake {
  let (x, y) = random_position(rng, width, height, SPAWN_MARGIN);
  let angle = rng.gen_range(0.0..360.0);
  let color = COLOR_POOL[rng.gen_range(0..COLOR_POOL.len())].to_string();
  Snake::new(
    id,
    format!("Bot-{index}"),
    x,
    y,
    angle,
    color,
    true,
    length,
    base_speed * BOT_SPEED_FACTOR,
  )
}

/// One bot tick: wander, bounce off walls instead of dying, then drag the body along.
pub fn drive_bot<R: Rng + ?Sized>(bot: &mut Snake, width: f64, height: f64, delta_ms: f64, rng: &mut R) {
  if !bot.is_alive {
    return;
  }
  let Some(head) = bot.head() else { return };
  let (head_x, head_y) = (head.x, head.y);
  let radius = bot.radius;
  let distance = bot.base_speed * (delta_ms / NOMINAL_FRAME_MS) * bot.speed_multiplier;

  bot.angle = wander_heading(bot.angle, rng);

  let (dx, dy) = heading_vector(bot.angle);
  let (next_x, next_y) = (head_x + dx * distance, head_y + dy * distance);
  if next_x - radius < 0.0 || next_x + radius > width {
    bot.angle = normalize_angle(180.0 - bot.angle);
  }
  if next_y - radius < 0.0 || next_y + radius > height {
    bot.angle = normalize_angle(-bot.angle);
  }

  let (dx, dy) = heading_vector(bot.angle);
  let x = clamp(head_x + dx * distance, radius, (width - radius).max(radius));
  let y = clamp(head_y + dy * distance, radius, (height - radius).max(radius));

  follow_head(bot, x, y);
}

fn follow_head(bot: &mut Snake, x: f64, y: f64) {
  for index in (1..bot.points.len()).rev() {
    let (ahead_x, ahead_y) = (bot.points[index - 1].x, bot.points[index - 1].y);
    let point = &mut bot.points[index];
    point.x = ahead_x;
    point.y = ahead_y;
  }
  if let Some(head) = bot.points.front_mut() {
    head.x = x;
    head.y = y;
  }
}
