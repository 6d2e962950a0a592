use rand::Rng;

/// A circle in world space. Food, snake segments and dead points all collide as one.
pub trait CollisionObject {
  fn x(&self) -> f64;
  fn y(&self) -> f64;
  fn radius(&self) -> f64;
}

pub fn distance<A: CollisionObject + ?Sized, B: CollisionObject + ?Sized>(a: &A, b: &B) -> f64 {
  ((a.x() - b.x()).powi(2) + (a.y() - b.y()).powi(2)).sqrt()
}

pub fn circles_overlap<A: CollisionObject + ?Sized, B: CollisionObject + ?Sized>(
  a: &A,
  b: &B,
  tolerance: f64,
) -> bool {
  distance(a, b) <= a.radius() + b.radius() + tolerance
}

pub fn boundary_violation<P: CollisionObject + ?Sized>(point: &P, width: f64, height: f64) -> bool {
  let r = point.radius();
  point.x() - r < 0.0 || point.x() + r > width || point.y() - r < 0.0 || point.y() + r > height
}

/// Linear scan, first overlapping candidate wins.
pub fn find_first_collision<'a, P, C>(point: &P, candidates: &'a [C], tolerance: f64) -> Option<&'a C>
where
  P: CollisionObject + ?Sized,
  C: CollisionObject,
{
  candidates
    .iter()
    .find(|candidate| circles_overlap(point, *candidate, tolerance))
}

pub fn normalize_angle(angle: f64) -> f64 {
  let wrapped = angle.rem_euclid(360.0);
  if wrapped >= 360.0 {
    0.0
  } else {
    wrapped
  }
}

/// Signed shortest rotation from `from` to `to`, in (-180, 180].
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
  let delta = (to - from).rem_euclid(360.0);
  if delta > 180.0 {
    delta - 360.0
  } else {
    delta
  }
}

/// Unit step for a heading in degrees. Screen space: 90 degrees points up (negative y).
pub fn heading_vector(angle: f64) -> (f64, f64) {
  let radians = angle.to_radians();
  (radians.cos(), -radians.sin())
}

pub fn random_position<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, margin: f64) -> (f64, f64) {
  let margin_x = margin.min(width / 2.0);
  let margin_y = margin.min(height / 2.0);
  let x = if width - margin_x > margin_x {
    rng.gen_range(margin_x..width - margin_x)
  } else {
    width / 2.0
  };
  let y = if height - margin_y > margin_y {
    rng.gen_range(margin_y..height - margin_y)
  } else {
    height / 2.0
  };
  (x, y)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
  value.min(max).max(min)
}
