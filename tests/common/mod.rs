// Shared stubs for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

use ogrelay::game::engine::Executor;
use ogrelay::game::error::{BrokerError, TransportError};
use ogrelay::game::lobby::IdentityBroker;
use ogrelay::game::pages::EndpointCatalog;
use ogrelay::game::session::SessionManager;
use ogrelay::game::transport::Transport;
use ogrelay::game::types::{Account, OutboundRequest, Response, Server};

pub const HOST: &str = "s5-en.example.com";
pub const LOGIN_PATH: &str = "/game/lobbylogin.php";

type Handler = Box<dyn Fn(&str, &OutboundRequest) -> Response + Send + Sync>;

/// Transport that records every request and answers from a closure.
pub struct StubTransport {
  handler: Handler,
  requests: Mutex<Vec<OutboundRequest>>,
}

impl StubTransport {
  pub fn new(handler: impl Fn(&str, &OutboundRequest) -> Response + Send + Sync + 'static) -> Arc<Self> {
    Arc::new(Self {
      handler: Box::new(handler),
      requests: Mutex::new(Vec::new()),
    })
  }

  /// Always answers 200 on the game host.
  pub fn healthy() -> Arc<Self> {
    Self::new(|_, request| ok(request, "page"))
  }

  pub fn requests(&self) -> Vec<OutboundRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn game_calls(&self) -> usize {
    self.requests().iter().filter(|r| !is_login(r)).count()
  }

  pub fn login_calls(&self) -> usize {
    self.requests().iter().filter(|r| is_login(r)).count()
  }
}

#[async_trait]
impl Transport for StubTransport {
  async fn send(&self, host: &str, request: &OutboundRequest) -> Result<Response, TransportError> {
    self.requests.lock().unwrap().push(request.clone());
    Ok((self.handler)(host, request))
  }
}

/// Broker that hands out numbered tokens, or always fails.
#[derive(Default)]
pub struct StubBroker {
  fail: AtomicBool,
  calls: AtomicUsize,
}

impl StubBroker {
  pub fn failing() -> Arc<Self> {
    let broker = Self::default();
    broker.fail.store(true, Ordering::SeqCst);
    Arc::new(broker)
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl IdentityBroker for StubBroker {
  async fn server_token(&self, _account: &Account) -> Result<String, BrokerError> {
    let n = self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail.load(Ordering::SeqCst) {
      return Err(BrokerError::Status(StatusCode::UNAUTHORIZED));
    }
    Ok(format!("token-{}", n))
  }
}

pub fn account() -> Account {
  Account {
    id: 100123,
    server: Server {
      number: 5,
      language: "en".to_string(),
    },
  }
}

pub fn is_login(request: &OutboundRequest) -> bool {
  request.path == LOGIN_PATH
}

pub fn response(status: StatusCode, url: &str, body: &str) -> Response {
  let mut headers = HeaderMap::new();
  headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=UTF-8"));
  Response {
    status,
    url: Url::parse(url).unwrap(),
    headers,
    body: Bytes::from(body.to_string()),
  }
}

/// 200 on the game host for the given request.
pub fn ok(request: &OutboundRequest, body: &str) -> Response {
  response(
    StatusCode::OK,
    &format!("https://{}{}", HOST, request.path_and_query()),
    body,
  )
}

/// What a dead session looks like: bounced to the lobby with 403.
pub fn expired() -> Response {
  response(StatusCode::FORBIDDEN, "https://lobby.example.com/", "forbidden")
}

pub fn session_manager(transport: Arc<StubTransport>, broker: Arc<StubBroker>) -> SessionManager {
  SessionManager::new(
    account(),
    HOST.to_string(),
    &EndpointCatalog::standard(),
    broker,
    transport,
  )
}

pub fn executor(transport: Arc<StubTransport>, broker: Arc<StubBroker>) -> Executor {
  let sessions = session_manager(transport.clone(), broker);
  Executor::new(transport, sessions)
}
