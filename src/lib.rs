pub mod app;
pub mod client;
pub mod config;
pub mod game;
pub mod protocol;
pub mod shared;
pub mod transport;
