use super::snake::Snake;
use super::types::LeaderboardEntry;

/// Ranks live snakes by score, highest first. Ties keep iteration order.
pub fn generate_leaderboard<'a, I>(snakes: I) -> Vec<LeaderboardEntry>
where
  I: IntoIterator<Item = &'a Snake>,
{
  let mut live: Vec<&Snake> = snakes.into_iter().filter(|snake| snake.is_alive).collect();
  live.sort_by(|a, b| b.score.cmp(&a.score));
  live
    .into_iter()
    .enumerate()
    .map(|(index, snake)| LeaderboardEntry {
      id: snake.id.clone(),
      display_name: snake.name.clone(),
      score: snake.score,
      rank: index + 1,
      is_bot: snake.is_bot,
    })
    .collect()
}

pub fn top(entries: &[LeaderboardEntry], size: usize) -> Vec<LeaderboardEntry> {
  entries.iter().take(size).cloned().collect()
}
