pub mod connection;
pub mod mirror;
pub mod prediction;

pub use connection::{ConnectionState, GameConnection};
pub use mirror::Mirror;
pub use prediction::LocalPlayer;
