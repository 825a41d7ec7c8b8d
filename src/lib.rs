//! Session-aware relay and cached client for an OGame game server.

pub mod cache;
pub mod config;
pub mod game;
pub mod logging;
pub mod server;
