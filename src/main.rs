use clap::Parser;
use color_eyre::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

use ogrelay::config::Config;
use ogrelay::game::GameClient;
use ogrelay::logging;
use ogrelay::server::RelayServer;

#[derive(Parser, Debug)]
#[command(name = "ogrelay")]
#[command(about = "Session-aware relay for an OGame game server")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/ogrelay/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Address the relay listens on, overriding the config file
  #[arg(short, long)]
  listen: Option<SocketAddr>,

  /// Skip the login at startup; the first expired call logs in instead
  #[arg(long)]
  no_login: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init()?;

  let listen = args.listen.unwrap_or(config.relay.listen);

  let client = GameClient::from_config(&config)?;
  info!(host = %config.server_host(), account = config.account.id, "client ready");

  if !args.no_login {
    if let Err(e) = client.login().await {
      // Not fatal: the engine renews on the first expired response
      warn!("initial login failed: {}", e);
    }
  }

  let server = RelayServer::start(client, listen).await?;
  println!("ogrelay listening on http://{}", server.addr());

  tokio::signal::ctrl_c().await?;
  info!("shutting down");
  server.shutdown().await;

  Ok(())
}
