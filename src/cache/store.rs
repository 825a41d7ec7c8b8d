//! TTL response store.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::game::types::Response;

/// How long a stored response is served before it must be re-fetched.
pub const CACHE_TTL: Duration = Duration::seconds(60);

/// A stored response and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub fetched_at: DateTime<Utc>,
  pub response: Response,
}

impl CacheEntry {
  /// Fresh iff `now - fetched_at < ttl`.
  pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - self.fetched_at < ttl
  }
}

/// Path+query keyed response cache.
///
/// Each lookup and store is a single critical section, so concurrent callers
/// never observe a half-written entry. Two concurrent misses on the same key
/// both fetch; the last store wins.
pub struct ResponseCache {
  entries: Mutex<HashMap<String, CacheEntry>>,
  ttl: Duration,
}

impl Default for ResponseCache {
  fn default() -> Self {
    Self::new()
  }
}

impl ResponseCache {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      ttl: CACHE_TTL,
    }
  }

  /// Return the stored response for `key` if it is still fresh at `now`.
  pub fn lookup(&self, key: &str, now: DateTime<Utc>) -> Option<Response> {
    let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    entries
      .get(key)
      .filter(|entry| entry.is_fresh(now, self.ttl))
      .map(|entry| entry.response.clone())
  }

  /// Store `response` under `key`, replacing whatever was there.
  pub fn store(&self, key: &str, response: Response, now: DateTime<Utc>) {
    let entry = CacheEntry {
      fetched_at: now,
      response,
    };
    let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_string(), entry);
  }

  /// Number of keys ever stored (stale entries are never expunged).
  pub fn len(&self) -> usize {
    self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
