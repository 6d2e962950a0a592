pub mod bot;
pub mod constants;
pub mod leaderboard;
pub mod math;
pub mod room;
pub mod snake;
pub mod types;
pub mod world;
