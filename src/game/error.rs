//! Failure kinds surfaced by the game client.
//!
//! Expected outcomes (login rejected, path refused, retry exhausted) are
//! plain values here rather than panics, so callers can match on them and
//! pick their own retry policy.

use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Network-level failure while talking to a remote host.
#[derive(Error, Debug)]
pub enum TransportError {
  /// The request URL could not be assembled
  #[error("Invalid request URL {url}: {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  /// DNS, TLS, connection reset, timeout, ...
  #[error("Transport error: {0}")]
  Http(#[from] reqwest::Error),
}

impl TransportError {
  /// Whether the failure was the per-call timeout firing.
  pub fn is_timeout(&self) -> bool {
    matches!(self, Self::Http(e) if e.is_timeout())
  }
}

/// The identity broker refused or failed to hand out a server token.
#[derive(Error, Debug)]
pub enum BrokerError {
  #[error("Lobby request failed: {0}")]
  Transport(#[from] TransportError),

  #[error("Lobby returned status {0}")]
  Status(StatusCode),

  #[error("Lobby response could not be decoded: {0}")]
  Decode(String),
}

/// Login against the game server did not produce a valid session.
#[derive(Error, Debug)]
pub enum LoginFailure {
  #[error("Unable to obtain server token: {0}")]
  Broker(#[from] BrokerError),

  #[error("Unable to login to server: invalid status code {0}")]
  Status(StatusCode),

  #[error("Unable to login to server: invalid host {0}")]
  Host(String),

  #[error("Unable to login to server: {0}")]
  Transport(#[from] TransportError),
}

/// Rejection of an inbound relay request. Always raised before any remote call.
#[derive(Error, Debug)]
pub enum RelayError {
  #[error("Unsupported path: {0}")]
  UnsupportedPath(String),

  #[error("Unsupported method: {0}")]
  UnsupportedMethod(String),

  #[error("Request body exceeds {limit} bytes")]
  PayloadTooLarge { limit: usize },

  #[error("Failed to read request body: {0}")]
  Body(String),
}

/// Top-level error for engine and client operations.
#[derive(Error, Debug)]
pub enum Error {
  /// Explicit login requested by the caller failed
  #[error(transparent)]
  Login(Arc<LoginFailure>),

  /// Session expired mid-call and the renewal login failed. Calls that were
  /// waiting on the same renewal share one failure.
  #[error("Session renewal failed: {0}")]
  SessionRenewalFailed(#[source] Arc<LoginFailure>),

  /// Session expired again right after a successful renewal
  #[error("Session expired again after renewal while requesting {0}")]
  ExpiredSessionRetryExhausted(String),

  #[error(transparent)]
  Relay(#[from] RelayError),

  #[error(transparent)]
  Transport(#[from] TransportError),

  /// An ajax endpoint returned something that is not the expected JSON
  #[error("Failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// The server answered but refused the action
  #[error("Request rejected: {0}")]
  Rejected(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
