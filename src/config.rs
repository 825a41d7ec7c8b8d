use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::game::relay::{RelayPolicy, DEFAULT_MAX_BODY_BYTES};
use crate::game::types::Account;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub account: Account,
  #[serde(default)]
  pub remote: RemoteConfig,
  #[serde(default)]
  pub lobby: LobbyConfig,
  #[serde(default)]
  pub relay: RelayConfig,
  #[serde(default)]
  pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Provider domain game hosts live under
  #[serde(default = "default_domain")]
  pub domain: String,
  #[serde(default = "default_scheme")]
  pub scheme: String,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      domain: default_domain(),
      scheme: default_scheme(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LobbyConfig {
  #[serde(default = "default_lobby_url")]
  pub url: String,
}

impl Default for LobbyConfig {
  fn default() -> Self {
    Self {
      url: default_lobby_url(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
  /// Local address the relay server listens on
  #[serde(default = "default_listen")]
  pub listen: SocketAddr,
  #[serde(default = "default_max_body_bytes")]
  pub max_body_bytes: usize,
  /// Reject unknown HTTP methods instead of sending them as GET
  #[serde(default)]
  pub strict_methods: bool,
}

impl Default for RelayConfig {
  fn default() -> Self {
    Self {
      listen: default_listen(),
      max_body_bytes: default_max_body_bytes(),
      strict_methods: false,
    }
  }
}

impl RelayConfig {
  pub fn policy(&self) -> RelayPolicy {
    RelayPolicy {
      max_body_bytes: self.max_body_bytes,
      strict_methods: self.strict_methods,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
  /// Upper bound for a single remote call, in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      timeout_secs: default_timeout_secs(),
      user_agent: default_user_agent(),
    }
  }
}

impl HttpConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

fn default_domain() -> String {
  "ogame.gameforge.com".to_string()
}

fn default_scheme() -> String {
  "https".to_string()
}

fn default_lobby_url() -> String {
  "https://lobby.ogame.gameforge.com".to_string()
}

fn default_listen() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 8765))
}

fn default_max_body_bytes() -> usize {
  DEFAULT_MAX_BODY_BYTES
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_user_agent() -> String {
  concat!("ogrelay/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./ogrelay.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/ogrelay/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/ogrelay/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("ogrelay.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("ogrelay").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.http.timeout_secs == 0 {
      return Err(eyre!("http.timeout_secs must be greater than zero"));
    }
    Ok(config)
  }

  /// Game host for the configured account.
  pub fn server_host(&self) -> String {
    self.account.server_host(&self.remote.domain)
  }

  /// Get the lobby bearer token from environment variables.
  ///
  /// Checks OGRELAY_LOBBY_TOKEN first, then GAMEFORGE_TOKEN as fallback.
  pub fn get_lobby_token() -> Result<String> {
    std::env::var("OGRELAY_LOBBY_TOKEN")
      .or_else(|_| std::env::var("GAMEFORGE_TOKEN"))
      .map_err(|_| {
        eyre!("Lobby token not found. Set OGRELAY_LOBBY_TOKEN or GAMEFORGE_TOKEN environment variable.")
      })
  }
}
