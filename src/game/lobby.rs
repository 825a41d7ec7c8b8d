//! Identity broker: the lobby hands out one-time server tokens.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::api_types::ApiLoginLink;
use super::error::{BrokerError, TransportError};
use super::types::Account;

/// Issues one-time tokens that let an account log into its game server.
#[async_trait]
pub trait IdentityBroker: Send + Sync {
  async fn server_token(&self, account: &Account) -> Result<String, BrokerError>;
}

/// Lobby API client authenticated with a bearer token.
pub struct LobbyBroker {
  client: Client,
  base_url: String,
  bearer: String,
}

impl LobbyBroker {
  pub fn new(client: Client, base_url: &str, bearer: String) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      bearer,
    }
  }

  fn login_link_url(&self, account: &Account) -> Result<Url, BrokerError> {
    let raw = format!("{}/api/users/me/loginLink", self.base_url);
    let mut url = Url::parse(&raw).map_err(|source| {
      BrokerError::Transport(TransportError::InvalidUrl {
        url: raw.clone(),
        source,
      })
    })?;

    url
      .query_pairs_mut()
      .append_pair("id", &account.id.to_string())
      .append_pair("server[language]", &account.server.language)
      .append_pair("server[number]", &account.server.number.to_string())
      .append_pair("clickedButton", "account_list");

    Ok(url)
  }
}

#[async_trait]
impl IdentityBroker for LobbyBroker {
  async fn server_token(&self, account: &Account) -> Result<String, BrokerError> {
    let url = self.login_link_url(account)?;
    debug!(account = account.id, "requesting server token from lobby");

    let response = self
      .client
      .get(url)
      .bearer_auth(&self.bearer)
      .send()
      .await
      .map_err(TransportError::from)?;

    let status = response.status();
    if !status.is_success() {
      return Err(BrokerError::Status(status));
    }

    let link: ApiLoginLink = response
      .json()
      .await
      .map_err(|e| BrokerError::Decode(e.to_string()))?;

    token_from_login_link(&link.url)
  }
}

/// Pull the `token` query parameter out of a lobby login link.
pub fn token_from_login_link(link: &str) -> Result<String, BrokerError> {
  let url = Url::parse(link).map_err(|e| BrokerError::Decode(format!("{}: {}", link, e)))?;
  url
    .query_pairs()
    .find(|(key, _)| key == "token")
    .map(|(_, value)| value.into_owned())
    .filter(|token| !token.is_empty())
    .ok_or_else(|| BrokerError::Decode(format!("login link has no token: {}", link)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_token_from_login_link() {
    let token = token_from_login_link(
      "https://s5-en.example.com/game/lobbylogin.php?id=100123&token=d3adb33f-0000",
    )
    .unwrap();
    assert_eq!(token, "d3adb33f-0000");
  }

  #[test]
  fn test_login_link_without_token() {
    let err = token_from_login_link("https://s5-en.example.com/game/lobbylogin.php?id=1");
    assert!(matches!(err, Err(BrokerError::Decode(_))));
  }
}
