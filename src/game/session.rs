//! Login against the game server.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{info, warn};

use super::error::LoginFailure;
use super::lobby::IdentityBroker;
use super::pages::{EndpointCatalog, Page};
use super::transport::Transport;
use super::types::{Account, OutboundRequest, Session};

/// Produces validated sessions for one account on one host.
pub struct SessionManager {
  account: Account,
  host: String,
  login_path: String,
  broker: Arc<dyn IdentityBroker>,
  transport: Arc<dyn Transport>,
}

impl SessionManager {
  pub fn new(
    account: Account,
    host: String,
    catalog: &EndpointCatalog,
    broker: Arc<dyn IdentityBroker>,
    transport: Arc<dyn Transport>,
  ) -> Self {
    Self {
      account,
      host,
      login_path: catalog.path(Page::LobbyLogin).to_string(),
      broker,
      transport,
    }
  }

  /// Host a valid session must resolve to.
  pub fn host(&self) -> &str {
    &self.host
  }

  pub fn account(&self) -> &Account {
    &self.account
  }

  /// Log in once. No retry here; the caller decides.
  ///
  /// Succeeds only when the login call returns 200 and its final URL is on
  /// the expected host. A redirect elsewhere (typically back to the lobby)
  /// means the token was refused.
  pub async fn login(&self) -> Result<Session, LoginFailure> {
    let token = self.broker.server_token(&self.account).await?;

    let request = OutboundRequest::get(&self.login_path)
      .with_query("id", self.account.id.to_string())
      .with_query("token", &token);

    let response = self.transport.send(&self.host, &request).await?;

    if response.status != StatusCode::OK {
      warn!(status = %response.status, "login rejected");
      return Err(LoginFailure::Status(response.status));
    }

    let landed = response.host();
    if landed != self.host {
      warn!(expected = %self.host, landed = %landed, "login landed on unexpected host");
      return Err(LoginFailure::Host(landed));
    }

    info!(account = self.account.id, host = %self.host, "logged in");

    Ok(Session {
      host: self.host.clone(),
      account_id: self.account.id,
    })
  }
}
