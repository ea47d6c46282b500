// Library root: re-exports all modules so integration tests and the
// `scoutdesk` binary can access the crate's public API.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod player;
pub mod position;
pub mod rating;
pub mod roster;
pub mod seed;
pub mod squad;
pub mod store;
