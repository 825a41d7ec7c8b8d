use std::sync::Arc;

use color_eyre::{eyre::eyre, Result as EyreResult};
use reqwest::header::{HeaderName, HeaderValue, REFERER};
use reqwest::StatusCode;
use serde_json::Value;

use super::api_types::ApiClassSelectionResponse;
use super::engine::Executor;
use super::error::{Error, Result};
use super::lobby::LobbyBroker;
use super::pages::{EndpointCatalog, Page};
use super::relay::{InboundRequest, Relay};
use super::session::SessionManager;
use super::transport::ReqwestTransport;
use super::types::{Document, OutboundRequest, PlayerClass, Response, Session};
use crate::config::Config;

/// Game client: typed page accessors plus the relay entry point.
///
/// Accessors return raw documents; turning them into domain values is left to
/// field extraction.
#[derive(Clone)]
pub struct GameClient {
  executor: Arc<Executor>,
  catalog: Arc<EndpointCatalog>,
  relay: Relay,
}

impl GameClient {
  pub fn new(executor: Executor, catalog: Arc<EndpointCatalog>, relay: Relay) -> Self {
    Self {
      executor: Arc::new(executor),
      catalog,
      relay,
    }
  }

  /// Wire up the live HTTP transport and lobby broker from configuration.
  pub fn from_config(config: &Config) -> EyreResult<Self> {
    let token = Config::get_lobby_token()?;
    let catalog = Arc::new(EndpointCatalog::standard());

    let transport = ReqwestTransport::new(
      &config.remote.scheme,
      config.http.timeout(),
      &config.http.user_agent,
    )
    .map_err(|e| eyre!("Failed to create game transport: {}", e))?;

    let lobby_http = reqwest::Client::builder()
      .timeout(config.http.timeout())
      .user_agent(config.http.user_agent.as_str())
      .build()
      .map_err(|e| eyre!("Failed to create lobby client: {}", e))?;
    let broker = LobbyBroker::new(lobby_http, &config.lobby.url, token);

    let transport = Arc::new(transport);
    let sessions = SessionManager::new(
      config.account.clone(),
      config.server_host(),
      &catalog,
      Arc::new(broker),
      transport.clone(),
    );
    let executor = Executor::new(transport, sessions);

    Ok(Self::new(executor, catalog, Relay::new(config.relay.policy())))
  }

  pub fn executor(&self) -> &Executor {
    &self.executor
  }

  pub async fn login(&self) -> Result<Session> {
    self.executor.login().await
  }

  /// Forward a browser-origin request. Relayed calls never touch the cache.
  pub async fn relay(&self, inbound: InboundRequest) -> Result<Response> {
    let request = self.relay.translate(inbound).await?;
    self.executor.execute(&request, false).await
  }

  fn page(&self, page: Page) -> OutboundRequest {
    OutboundRequest::get(self.catalog.path(page))
  }

  async fn document(&self, request: OutboundRequest, use_cache: bool) -> Result<Document> {
    let response = self.executor.execute(&request, use_cache).await?;
    Ok(response.text())
  }

  async fn json(&self, request: OutboundRequest, use_cache: bool) -> Result<Value> {
    let response = self.executor.execute(&request, use_cache).await?;
    Ok(response.json()?)
  }

  /// Overview page; source of player, server and celestial details.
  pub async fn overview(&self, use_cache: bool) -> Result<Document> {
    self.document(self.page(Page::Overview), use_cache).await
  }

  pub async fn rewards(&self, use_cache: bool) -> Result<Document> {
    self.document(self.page(Page::Rewards), use_cache).await
  }

  pub async fn fleet_dispatch(&self, use_cache: bool) -> Result<Document> {
    self.document(self.page(Page::FleetDispatch), use_cache).await
  }

  pub async fn research_page(&self, use_cache: bool) -> Result<Document> {
    self.document(self.page(Page::Research), use_cache).await
  }

  pub async fn resource_settings(&self, celestial_id: u64, use_cache: bool) -> Result<Document> {
    let request = self
      .page(Page::ResourceSettings)
      .with_query("cp", celestial_id.to_string());
    self.document(request, use_cache).await
  }

  pub async fn facilities_page(&self, celestial_id: u64, use_cache: bool) -> Result<Document> {
    let request = self
      .page(Page::Facilities)
      .with_query("cp", celestial_id.to_string());
    self.document(request, use_cache).await
  }

  pub async fn galaxy(&self, galaxy: u32, system: u32, use_cache: bool) -> Result<Document> {
    let request = self
      .page(Page::Galaxy)
      .with_query("galaxy", galaxy.to_string())
      .with_query("system", system.to_string());
    self.document(request, use_cache).await
  }

  /// Buildings, research, ships and defences of a celestial, as JSON.
  pub async fn techs(&self, celestial_id: u64, use_cache: bool) -> Result<Value> {
    let request = self
      .page(Page::FetchTechs)
      .with_query("ajax", "1")
      .with_query("cp", celestial_id.to_string());
    self.json(request, use_cache).await
  }

  /// Research levels are account-wide, so no celestial is needed.
  pub async fn researches(&self, use_cache: bool) -> Result<Value> {
    let request = self.page(Page::FetchTechs).with_query("ajax", "1");
    self.json(request, use_cache).await
  }

  /// Resource amounts and production of a celestial, as JSON.
  pub async fn resources(&self, celestial_id: u64, use_cache: bool) -> Result<Value> {
    let request = self
      .page(Page::FetchResources)
      .with_query("ajax", "1")
      .with_query("asJson", "1")
      .with_query("cp", celestial_id.to_string());
    self.json(request, use_cache).await
  }

  /// Pick the character class of a fresh account. Write operation, never cached.
  pub async fn select_initial_player_class(&self, class: PlayerClass) -> Result<()> {
    let path = self.catalog.path(Page::CharacterClassSelection);
    let referer = format!("https://{}{}", self.executor.host(), path);

    let mut request = OutboundRequest::post(path)
      .with_query("ajax", "1")
      .with_query("asJson", "1")
      .with_query("characterClassId", class.id().to_string())
      .with_query("action", "selectClass")
      .with_header(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
      );
    if let Ok(value) = HeaderValue::from_str(&referer) {
      request = request.with_header(REFERER, value);
    }

    let response = self.executor.execute(&request, false).await?;
    if response.status != StatusCode::OK {
      return Err(Error::Rejected(format!(
        "failed to select player class {:?}: status {}",
        class, response.status
      )));
    }

    let selection: ApiClassSelectionResponse = response.json()?;
    if selection.status != "success" {
      return Err(Error::Rejected(format!(
        "failed to select player class {:?}: {}",
        class, selection.message
      )));
    }

    Ok(())
  }
}
