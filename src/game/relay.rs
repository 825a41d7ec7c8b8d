//! Translation of browser-origin requests into outbound game requests.

use axum::body::Body;
use bytes::BytesMut;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, CONTENT_TYPE, COOKIE};
use tracing::debug;

use super::error::RelayError;
use super::types::{Method, OutboundRequest, RequestBody};

/// Path prefixes the relay is willing to forward. Anything else is refused so
/// the relay cannot be used as an open proxy.
pub const SERVED_PREFIXES: [&str; 5] = ["/game/", "/cdn/", "/assets/", "/headerCache/", "/favicon.ico"];

/// Inbound headers copied onto the outbound request (lowercase).
pub const FORWARD_HEADERS: [&str; 1] = ["x-requested-with"];

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// A request received from the browser side.
#[derive(Debug)]
pub struct InboundRequest {
  pub path_and_query: String,
  pub method: String,
  pub headers: HeaderMap,
  pub cookies: Vec<(String, String)>,
  pub content_type: Option<String>,
  pub body: Body,
}

impl InboundRequest {
  /// Split an HTTP request into the parts the relay cares about.
  pub fn from_http(request: axum::extract::Request) -> Self {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
      .uri
      .path_and_query()
      .map(|pq| pq.as_str().to_string())
      .unwrap_or_else(|| parts.uri.path().to_string());

    let cookies = parse_cookies(&parts.headers);
    let content_type = parts
      .headers
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(String::from);

    Self {
      path_and_query,
      method: parts.method.as_str().to_string(),
      headers: parts.headers,
      cookies,
      content_type,
      body,
    }
  }
}

/// Knobs for translation
#[derive(Debug, Clone)]
pub struct RelayPolicy {
  /// Largest body read from an inbound request
  pub max_body_bytes: usize,
  /// Reject unknown method tokens instead of downgrading them to GET
  pub strict_methods: bool,
}

impl Default for RelayPolicy {
  fn default() -> Self {
    Self {
      max_body_bytes: DEFAULT_MAX_BODY_BYTES,
      strict_methods: false,
    }
  }
}

/// Validates inbound requests and translates them for the engine.
#[derive(Debug, Clone, Default)]
pub struct Relay {
  policy: RelayPolicy,
}

impl Relay {
  pub fn new(policy: RelayPolicy) -> Self {
    Self { policy }
  }

  /// Translate an inbound request, rejecting it before any remote I/O if it
  /// falls outside the served paths. Dot segments are refused outright, since
  /// URL parsing on the way out would resolve them past the prefix check.
  pub async fn translate(&self, inbound: InboundRequest) -> Result<OutboundRequest, RelayError> {
    if !is_served(&inbound.path_and_query) {
      return Err(RelayError::UnsupportedPath(inbound.path_and_query));
    }

    let method = self.translate_method(&inbound.method)?;
    let mut request = OutboundRequest::new(method, &inbound.path_and_query);

    if method.is_state_changing() {
      if let Some(content_type) = inbound.content_type {
        let data = read_capped(inbound.body, self.policy.max_body_bytes).await?;
        request.body = Some(RequestBody {
          content_type,
          data: data.freeze(),
        });
      }
    }

    request.cookies = inbound.cookies;
    request.headers = forwarded_headers(&inbound.headers);

    debug!(
      method = method.as_str(),
      path = %request.path_and_query(),
      "translated relay request"
    );

    Ok(request)
  }

  fn translate_method(&self, token: &str) -> Result<Method, RelayError> {
    match Method::parse(token) {
      Some(method) => Ok(method),
      None if self.policy.strict_methods => Err(RelayError::UnsupportedMethod(token.to_string())),
      None => {
        debug!(token, "unknown method downgraded to GET");
        Ok(Method::Get)
      }
    }
  }
}

pub fn is_served(path_and_query: &str) -> bool {
  SERVED_PREFIXES
    .iter()
    .any(|prefix| path_and_query.starts_with(prefix))
    && !has_dot_segment(path_and_query)
}

/// Whether the path part contains a `.` or `..` segment in any spelling URL
/// parsing accepts: percent-encoded dots in either case, and backslash as a
/// separator.
fn has_dot_segment(path_and_query: &str) -> bool {
  let path = path_and_query
    .split_once('?')
    .map_or(path_and_query, |(path, _)| path);

  path.split(['/', '\\']).any(|segment| {
    let segment = segment.to_ascii_lowercase().replace("%2e", ".");
    segment == "." || segment == ".."
  })
}

fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
  let mut headers = HeaderMap::new();
  for name in FORWARD_HEADERS {
    let name = HeaderName::from_static(name);
    for value in inbound.get_all(&name) {
      headers.append(name.clone(), value.clone());
    }
  }
  headers
}

async fn read_capped(body: Body, limit: usize) -> Result<BytesMut, RelayError> {
  let mut stream = body.into_data_stream();
  let mut buf = BytesMut::new();

  while let Some(chunk) = stream.next().await {
    let chunk = chunk.map_err(|e| RelayError::Body(e.to_string()))?;
    if buf.len() + chunk.len() > limit {
      return Err(RelayError::PayloadTooLarge { limit });
    }
    buf.extend_from_slice(&chunk);
  }

  Ok(buf)
}

/// All `name=value` pairs from every `Cookie` header, unfiltered.
pub fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
  headers
    .get_all(COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| {
      let (name, value) = pair.trim().split_once('=')?;
      let name = name.trim();
      if name.is_empty() {
        return None;
      }
      Some((name.to_string(), value.trim().to_string()))
    })
    .collect()
}
