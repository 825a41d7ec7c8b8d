//! Client for one account on one game server: session handling, the
//! execution engine, the inbound relay and typed page accessors.

pub mod api_types;
pub mod client;
pub mod engine;
pub mod error;
pub mod lobby;
pub mod pages;
pub mod relay;
pub mod session;
pub mod transport;
pub mod types;

pub use client::GameClient;
pub use engine::Executor;
pub use error::{Error, Result};
