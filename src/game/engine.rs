//! Request execution: cache check, transport call, expiry detection,
//! session renewal and a single retry.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::error::{Error, LoginFailure, Result};
use super::session::SessionManager;
use super::transport::Transport;
use super::types::{OutboundRequest, Response, Session};
use crate::cache::{Clock, ResponseCache, SystemClock};

/// Current session plus the login history concurrent renewals look at.
#[derive(Debug, Default)]
struct SessionSlot {
  session: Option<Session>,
  /// Successful logins
  epoch: u64,
  /// Login attempts, successful or not
  attempts: u64,
  /// Set when the latest attempt failed
  last_failure: Option<Arc<LoginFailure>>,
}

/// Owns the session and the response cache for one client instance.
///
/// Any number of `execute` calls may run concurrently. Session replacement
/// goes through a single renewal lock; a task that detects expiry only logs
/// in again if nobody else has attempted a login since it sent its request.
/// Otherwise it takes that attempt's outcome, so a burst of expired
/// responses costs one login whether it succeeds or fails.
pub struct Executor {
  transport: Arc<dyn Transport>,
  sessions: SessionManager,
  cache: ResponseCache,
  clock: Arc<dyn Clock>,
  slot: RwLock<SessionSlot>,
  renewal: Mutex<()>,
}

impl Executor {
  pub fn new(transport: Arc<dyn Transport>, sessions: SessionManager) -> Self {
    Self {
      transport,
      sessions,
      cache: ResponseCache::new(),
      clock: Arc::new(SystemClock),
      slot: RwLock::new(SessionSlot::default()),
      renewal: Mutex::new(()),
    }
  }

  /// Replace the time source used for cache freshness.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn host(&self) -> &str {
    self.sessions.host()
  }

  pub fn cache(&self) -> &ResponseCache {
    &self.cache
  }

  /// Snapshot of the live session, if a login has succeeded.
  pub async fn session(&self) -> Option<Session> {
    self.slot.read().await.session.clone()
  }

  /// Number of successful logins so far.
  pub async fn session_epoch(&self) -> u64 {
    self.slot.read().await.epoch
  }

  async fn login_attempts(&self) -> u64 {
    self.slot.read().await.attempts
  }

  /// Log in unconditionally and install the new session.
  pub async fn login(&self) -> Result<Session> {
    let _guard = self.renewal.lock().await;
    self.install_new_session().await.map_err(Error::Login)
  }

  /// Run one request through the cache/transport/renewal protocol.
  ///
  /// Only GET requests with `use_cache` set read from or write to the cache.
  /// Renewal happens at most once per call; an expiry seen right after a
  /// renewal fails with [`Error::ExpiredSessionRetryExhausted`].
  pub async fn execute(&self, request: &OutboundRequest, use_cache: bool) -> Result<Response> {
    let cacheable = use_cache && request.method.is_cacheable();
    let key = request.path_and_query();

    if cacheable {
      if let Some(hit) = self.cache.lookup(&key, self.clock.now()) {
        debug!(key = %key, "cache hit");
        return Ok(hit);
      }
      debug!(key = %key, "cache miss");
    }

    let observed_attempts = self.login_attempts().await;
    let mut response = self.transport.send(self.host(), request).await?;

    if self.is_expired(&response) {
      warn!(
        key = %key,
        status = %response.status,
        landed = %response.host(),
        "session expired, renewing"
      );
      self
        .renew(observed_attempts)
        .await
        .map_err(Error::SessionRenewalFailed)?;

      response = self.transport.send(self.host(), request).await?;
      if self.is_expired(&response) {
        warn!(key = %key, "session expired again after renewal");
        return Err(Error::ExpiredSessionRetryExhausted(key));
      }
    }

    // A response from the post-renewal retry is stored like any other.
    if cacheable && response.status.is_success() {
      self.cache.store(&key, response.clone(), self.clock.now());
    }

    Ok(response)
  }

  /// A response bounced off the game host with an auth failure means the
  /// session is gone.
  fn is_expired(&self, response: &Response) -> bool {
    response.is_auth_failure() && response.host() != self.host()
  }

  async fn renew(&self, observed_attempts: u64) -> std::result::Result<(), Arc<LoginFailure>> {
    let _guard = self.renewal.lock().await;

    {
      let slot = self.slot.read().await;
      if slot.attempts != observed_attempts {
        debug!(
          failed = slot.last_failure.is_some(),
          "renewal already attempted by a concurrent call"
        );
        return match &slot.last_failure {
          Some(failure) => Err(failure.clone()),
          None => Ok(()),
        };
      }
    }

    self.install_new_session().await.map(|_| ())
  }

  /// Caller must hold the renewal lock.
  async fn install_new_session(&self) -> std::result::Result<Session, Arc<LoginFailure>> {
    let outcome = self.sessions.login().await;

    let mut slot = self.slot.write().await;
    slot.attempts += 1;
    match outcome {
      Ok(session) => {
        slot.session = Some(session.clone());
        slot.epoch += 1;
        slot.last_failure = None;
        info!(epoch = slot.epoch, "session installed");
        Ok(session)
      }
      Err(failure) => {
        let failure = Arc::new(failure);
        slot.last_failure = Some(failure.clone());
        Err(failure)
      }
    }
  }
}
