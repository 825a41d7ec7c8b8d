//! HTTP transport to the game server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::error::TransportError;
use super::types::{OutboundRequest, Response};

/// Sends one request to one host. Implementations keep the remote cookie jar.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, host: &str, request: &OutboundRequest) -> Result<Response, TransportError>;
}

/// reqwest-backed transport with a persistent cookie store.
pub struct ReqwestTransport {
  client: Client,
  jar: Arc<Jar>,
  scheme: String,
}

impl ReqwestTransport {
  pub fn new(scheme: &str, timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
    let jar = Arc::new(Jar::default());
    let client = Client::builder()
      .cookie_provider(jar.clone())
      .timeout(timeout)
      .user_agent(user_agent)
      .build()?;

    Ok(Self {
      client,
      jar,
      scheme: scheme.to_string(),
    })
  }

  fn url_for(&self, host: &str, request: &OutboundRequest) -> Result<Url, TransportError> {
    let url = format!("{}://{}{}", self.scheme, host, request.path_and_query());
    Url::parse(&url).map_err(|source| TransportError::InvalidUrl { url, source })
  }

  /// `Cookie` header for a request that forwards its own cookies.
  ///
  /// reqwest leaves the jar out once a `Cookie` header is set, so the jar's
  /// cookies for `url` go first and the forwarded pairs are appended.
  fn cookie_header(&self, url: &Url, request: &OutboundRequest) -> Option<HeaderValue> {
    let forwarded = request.cookie_header()?;
    let stored = self.jar.cookies(url);
    let merged = match stored.as_ref().and_then(|v| v.to_str().ok()) {
      Some(stored) => format!("{}; {}", stored, forwarded),
      None => forwarded,
    };
    HeaderValue::from_str(&merged).ok()
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, host: &str, request: &OutboundRequest) -> Result<Response, TransportError> {
    let url = self.url_for(host, request)?;
    debug!(method = request.method.as_str(), %url, "sending request");

    let cookies = self.cookie_header(&url, request);
    let mut builder = self
      .client
      .request(request.method.into(), url)
      .headers(request.headers.clone());

    if let Some(cookies) = cookies {
      builder = builder.header(COOKIE, cookies);
    }

    if let Some(body) = &request.body {
      builder = builder
        .header(CONTENT_TYPE, body.content_type.as_str())
        .body(body.data.clone());
    }

    let response = builder.send().await?;
    let status = response.status();
    let url = response.url().clone();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    debug!(%status, %url, bytes = body.len(), "received response");

    Ok(Response {
      status,
      url,
      headers,
      body,
    })
  }
}
