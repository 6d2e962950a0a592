use super::bot::wander_heading;
use super::constants::{
    COLOR_POOL, DEAD_POINT_RADIUS, MAX_SNAKE_RADIUS, MIN_SNAKE_RADIUS, NOMINAL_FRAME_MS,
    PICKUP_TOLERANCE, RADIUS_SCALER, TURNING_SPEED,
};
use super::math::{
    boundary_violation, circles_overlap, clamp, heading_vector, normalize_angle,
    shortest_angle_delta,
};
use super::types::{DeadPoint, Edible, PlayerRecord, Point};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Directional keys held during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Controls {
    /// Compass angle for the held combination, or `None` when nothing (or only
    /// opposing keys) is held.
    pub fn target_angle(&self) -> Option<f64> {
        let horizontal = (self.right as i8) - (self.left as i8);
        let vertical = (self.up as i8) - (self.down as i8);
        match (horizontal, vertical) {
            (1, 0) => Some(0.0),
            (1, 1) => Some(45.0),
            (0, 1) => Some(90.0),
            (-1, 1) => Some(135.0),
            (-1, 0) => Some(180.0),
            (-1, -1) => Some(225.0),
            (0, -1) => Some(270.0),
            (1, -1) => Some(315.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakeCollision {
    pub collided_with: String,
    pub points: usize,
    pub dead_points: Vec<DeadPoint>,
}

#[derive(Debug, Clone)]
pub struct Snake {
    pub id: String,
    pub name: String,
    pub points: VecDeque<Point>,
    pub angle: f64,
    pub base_speed: f64,
    pub turning_speed: f64,
    pub speed_multiplier: f64,
    pub radius: f64,
    pub color: String,
    pub is_alive: bool,
    pub is_bot: bool,
    pub score: u32,
    pub final_score: Option<usize>,
    pub death_position: Option<(f64, f64)>,
}

pub fn radius_for_length(length: usize) -> f64 {
    clamp(length as f64 * RADIUS_SCALER, MIN_SNAKE_RADIUS, MAX_SNAKE_RADIUS)
}

impl Snake {
    /// Lays out `length` segments in a straight line trailing behind the head.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        name: String,
        x: f64,
        y: f64,
        angle: f64,
        color: String,
        is_bot: bool,
        length: usize,
        base_speed: f64,
    ) -> Self {
        let angle = normalize_angle(angle);
        let radius = radius_for_length(length.max(1));
        let (dx, dy) = heading_vector(angle);
        let points = (0..length.max(1))
            .map(|index| Point {
                x: x - dx * base_speed * index as f64,
                y: y - dy * base_speed * index as f64,
                radius,
                color: color.clone(),
            })
            .collect();

        Self {
            id,
            name,
            points,
            angle,
            base_speed,
            turning_speed: TURNING_SPEED,
            speed_multiplier: 1.0,
            radius,
            color,
            is_alive: true,
            is_bot,
            score: 0,
            final_score: None,
            death_position: None,
        }
    }

    pub fn head(&self) -> Option<&Point> {
        self.points.front()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Head position while alive, the cached death spot afterwards.
    pub fn position(&self) -> (f64, f64) {
        match (self.head(), self.death_position) {
            (Some(head), _) => (head.x, head.y),
            (None, Some(position)) => position,
            (None, None) => (0.0, 0.0),
        }
    }

    /// Analog steering (joystick). `advance` leaves this heading alone when no key is held.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = normalize_angle(angle);
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, controls: Option<&Controls>, delta_ms: f64, rng: &mut R) {
        if !self.is_alive || self.points.is_empty() {
            return;
        }
        let frames = delta_ms / NOMINAL_FRAME_MS;

        if self.is_bot {
            self.angle = wander_heading(self.angle, rng);
        } else if let Some(target) = controls.and_then(Controls::target_angle) {
            self.turn_toward(target, frames);
        }

        let distance = self.base_speed * frames * self.speed_multiplier;
        let (dx, dy) = heading_vector(self.angle);
        let Some(head) = self.head() else { return };
        let next = (head.x + dx * distance, head.y + dy * distance);
        self.push_head(next.0, next.1);
    }

    fn turn_toward(&mut self, target: f64, frames: f64) {
        let max_turn = self.turning_speed * frames;
        let delta = clamp(shortest_angle_delta(self.angle, target), -max_turn, max_turn);
        self.angle = normalize_angle(self.angle + delta);
    }

    /// Prepends a head at (x, y) and drops the tail, recycling the tail's allocation.
    pub(crate) fn push_head(&mut self, x: f64, y: f64) {
        let Some(mut recycled) = self.points.pop_back() else { return };
        recycled.x = x;
        recycled.y = y;
        recycled.radius = self.radius;
        recycled.color.clone_from(&self.color);
        self.points.push_front(recycled);
    }

    fn tail_position(&self) -> (f64, f64) {
        self.points
            .back()
            .map(|point| (point.x, point.y))
            .unwrap_or_else(|| self.position())
    }

    pub fn eat(&mut self, color: &str) {
        let (x, y) = self.tail_position();
        self.points.push_back(Point {
            x,
            y,
            radius: self.radius,
            color: color.to_string(),
        });
        self.update_radius();
    }

    pub fn eat_snake(&mut self, points_count: usize) {
        let (x, y) = self.tail_position();
        for _ in 0..points_count {
            self.points.push_back(Point {
                x,
                y,
                radius: self.radius,
                color: self.color.clone(),
            });
        }
        self.update_radius();
    }

    fn update_radius(&mut self) {
        self.radius = radius_for_length(self.points.len());
    }

    pub fn check_collisions_with_food<'a, T: Edible>(&mut self, target: &'a T) -> Option<&'a T> {
        if !self.is_alive {
            return None;
        }
        let head = self.head()?;
        if !circles_overlap(head, target, PICKUP_TOLERANCE) {
            return None;
        }
        self.eat(target.color());
        Some(target)
    }

    /// Head against every segment of `other`. On contact this snake dies and the
    /// result names `other` as the one owed this snake's former length.
    pub fn check_collisions_with_other_snakes(&mut self, other: &Snake, now: i64) -> Option<SnakeCollision> {
        if !self.is_alive || !other.is_alive || other.id == self.id {
            return None;
        }
        let head = self.head()?;
        if !other.points.iter().any(|point| circles_overlap(head, point, 0.0)) {
            return None;
        }
        let points = self.points.len();
        let dead_points = self.over(now);
        Some(SnakeCollision {
            collided_with: other.id.clone(),
            points,
            dead_points,
        })
    }

    pub fn check_collisions_with_boundary(&mut self, width: f64, height: f64, now: i64) -> Option<Vec<DeadPoint>> {
        if !self.is_alive {
            return None;
        }
        let head = self.head()?;
        if !boundary_violation(head, width, height) {
            return None;
        }
        Some(self.over(now))
    }

    /// Converts the body to dead points. Calling it on a dead or empty snake yields nothing.
    pub fn over(&mut self, now: i64) -> Vec<DeadPoint> {
        if !self.is_alive || self.points.is_empty() {
            return Vec::new();
        }
        let mut rng = rand::thread_rng();
        self.death_position = self.head().map(|head| (head.x, head.y));
        self.final_score = Some(self.points.len());
        self.is_alive = false;
        self.points
            .drain(..)
            .map(|point| DeadPoint {
                x: point.x,
                y: point.y,
                radius: DEAD_POINT_RADIUS,
                color: COLOR_POOL
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(COLOR_POOL[0])
                    .to_string(),
                created_at: now,
            })
            .collect()
    }

    /// Trust-on-receipt overwrite with a remote snapshot.
    pub fn apply_remote_state(&mut self, x: f64, y: f64, angle: f64, points: VecDeque<Point>) {
        self.angle = normalize_angle(angle);
        self.points = points;
        if self.points.is_empty() {
            self.points.push_back(Point {
                x,
                y,
                radius: self.radius,
                color: self.color.clone(),
            });
        }
        self.update_radius();
    }

    pub fn to_record(&self) -> PlayerRecord {
        let (x, y) = self.position();
        PlayerRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            x,
            y,
            angle: self.angle,
            points: self.points.clone(),
            color: self.color.clone(),
            radius: self.radius,
            score: self.score,
            is_alive: self.is_alive,
            is_bot: self.is_bot,
        }
    }

    pub fn from_record(record: PlayerRecord, base_speed: f64) -> Self {
        let death_position = if record.is_alive {
            None
        } else {
            Some((record.x, record.y))
        };
        Self {
            id: record.id,
            name: record.name,
            points: record.points,
            angle: normalize_angle(record.angle),
            base_speed,
            turning_speed: TURNING_SPEED,
            speed_multiplier: 1.0,
            radius: record.radius,
            color: record.color,
            is_alive: record.is_alive,
            is_bot: record.is_bot,
            score: record.score,
            final_score: None,
            death_position,
        }
    }
}
