pub mod auth;
pub mod names;
