use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use url::{form_urlencoded, Url};

/// Game server an account lives on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Server {
  pub number: u32,
  pub language: String,
}

/// Game account (one per client instance)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
  pub id: u64,
  pub server: Server,
}

impl Account {
  /// Host every request for this account is sent to, e.g. `s5-en.ogame.gameforge.com`.
  pub fn server_host(&self, domain: &str) -> String {
    format!("s{}-{}.{}", self.server.number, self.server.language, domain)
  }
}

/// The live authenticated identity plus its bound remote host.
///
/// The one-time server token is spent on the login call; what keeps the
/// session alive afterwards is the cookie the transport's jar received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub host: String,
  pub account_id: u64,
}

/// Verbs the relay and the client know how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
  Head,
  Options,
  Patch,
  Merge,
  Copy,
}

impl Method {
  /// Case-sensitive parse of a method token.
  pub fn parse(token: &str) -> Option<Self> {
    let method = match token {
      "GET" => Self::Get,
      "POST" => Self::Post,
      "PUT" => Self::Put,
      "DELETE" => Self::Delete,
      "HEAD" => Self::Head,
      "OPTIONS" => Self::Options,
      "PATCH" => Self::Patch,
      "MERGE" => Self::Merge,
      "COPY" => Self::Copy,
      _ => return None,
    };
    Some(method)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Delete => "DELETE",
      Self::Head => "HEAD",
      Self::Options => "OPTIONS",
      Self::Patch => "PATCH",
      Self::Merge => "MERGE",
      Self::Copy => "COPY",
    }
  }

  /// Only plain reads may be cached.
  pub fn is_cacheable(&self) -> bool {
    matches!(self, Self::Get)
  }

  /// Methods that may change server state and therefore carry a body.
  pub fn is_state_changing(&self) -> bool {
    !matches!(self, Self::Get | Self::Head | Self::Options)
  }
}

impl From<Method> for reqwest::Method {
  fn from(method: Method) -> Self {
    match method {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Delete => reqwest::Method::DELETE,
      Method::Head => reqwest::Method::HEAD,
      Method::Options => reqwest::Method::OPTIONS,
      Method::Patch => reqwest::Method::PATCH,
      // Extension tokens are always valid method names
      Method::Merge | Method::Copy => {
        reqwest::Method::from_bytes(method.as_str().as_bytes()).unwrap_or(reqwest::Method::GET)
      }
    }
  }
}

/// Body attached verbatim to an outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
  pub content_type: String,
  pub data: Bytes,
}

/// Request as the engine sends it to the game server.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
  pub method: Method,
  pub path: String,
  /// Serialized query string, without the leading `?`
  pub query: Option<String>,
  pub headers: HeaderMap,
  pub cookies: Vec<(String, String)>,
  pub body: Option<RequestBody>,
}

impl OutboundRequest {
  /// Build a request from a path that may already carry a query string.
  pub fn new(method: Method, path_and_query: &str) -> Self {
    let (path, query) = match path_and_query.split_once('?') {
      Some((path, query)) => (path, Some(query.to_string())),
      None => (path_and_query, None),
    };

    Self {
      method,
      path: path.to_string(),
      query: query.filter(|q| !q.is_empty()),
      headers: HeaderMap::new(),
      cookies: Vec::new(),
      body: None,
    }
  }

  pub fn get(path_and_query: &str) -> Self {
    Self::new(Method::Get, path_and_query)
  }

  pub fn post(path_and_query: &str) -> Self {
    Self::new(Method::Post, path_and_query)
  }

  /// Append a query parameter, form-encoding the pair.
  pub fn with_query(mut self, key: &str, value: impl AsRef<str>) -> Self {
    let mut serializer = form_urlencoded::Serializer::new(self.query.take().unwrap_or_default());
    serializer.append_pair(key, value.as_ref());
    self.query = Some(serializer.finish());
    self
  }

  pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
    self.headers.insert(name, value);
    self
  }

  /// Path plus query exactly as sent; this is also the cache key.
  pub fn path_and_query(&self) -> String {
    match &self.query {
      Some(query) => format!("{}?{}", self.path, query),
      None => self.path.clone(),
    }
  }

  /// `Cookie` header value for the forwarded cookies, if any.
  pub fn cookie_header(&self) -> Option<String> {
    if self.cookies.is_empty() {
      return None;
    }
    let pairs: Vec<String> = self
      .cookies
      .iter()
      .map(|(name, value)| format!("{}={}", name, value))
      .collect();
    Some(pairs.join("; "))
  }
}

/// Response as received from the game server, fully buffered.
#[derive(Debug, Clone)]
pub struct Response {
  pub status: StatusCode,
  /// Final URL after redirects
  pub url: Url,
  pub headers: HeaderMap,
  pub body: Bytes,
}

impl Response {
  /// Host (and port, when explicit) the response finally resolved to.
  pub fn host(&self) -> String {
    authority(&self.url)
  }

  pub fn is_auth_failure(&self) -> bool {
    self.status == StatusCode::UNAUTHORIZED || self.status == StatusCode::FORBIDDEN
  }

  pub fn content_type(&self) -> Option<&str> {
    self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
  }

  pub fn text(&self) -> String {
    String::from_utf8_lossy(&self.body).into_owned()
  }

  pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
    serde_json::from_slice(&self.body)
  }
}

/// `host[:port]` of a URL, as used to compare against a session host.
pub fn authority(url: &Url) -> String {
  let host = url.host_str().unwrap_or_default();
  match url.port() {
    Some(port) => format!("{}:{}", host, port),
    None => host.to_string(),
  }
}

/// Raw page content handed to field extraction
pub type Document = String;

/// Character classes a player can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClass {
  NoClass = 0,
  Collector = 1,
  General = 2,
  Discoverer = 3,
}

impl PlayerClass {
  pub fn id(self) -> u8 {
    self as u8
  }
}
