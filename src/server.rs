// Axum relay server: hands every browser request to the game client.

use std::net::SocketAddr;

use axum::{
  extract::{Request, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Router,
};
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::game::error::{Error, RelayError};
use crate::game::relay::InboundRequest;
use crate::game::GameClient;

pub struct RelayServer {
  addr: SocketAddr,
  shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
  handle: tokio::task::JoinHandle<()>,
}

impl RelayServer {
  /// Bind `addr` and start serving in the background.
  pub async fn start(client: GameClient, addr: SocketAddr) -> Result<Self> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let app = router(client);

    let handle = tokio::spawn(async move {
      let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
          let _ = shutdown_rx.await;
        })
        .await;
      if let Err(e) = served {
        error!("relay server stopped: {}", e);
      }
    });

    info!(%addr, "relay listening");

    Ok(Self {
      addr,
      shutdown_tx: Some(shutdown_tx),
      handle,
    })
  }

  pub fn addr(&self) -> SocketAddr {
    self.addr
  }

  /// Shutdown the server gracefully and wait for in-flight requests.
  pub async fn shutdown(mut self) {
    if let Some(tx) = self.shutdown_tx.take() {
      let _ = tx.send(());
    }
    let _ = self.handle.await;
  }
}

/// Every path goes to the relay handler; the allow-list lives in the relay.
pub fn router(client: GameClient) -> Router {
  Router::new().fallback(relay_handler).with_state(client)
}

async fn relay_handler(State(client): State<GameClient>, request: Request) -> Response {
  let inbound = InboundRequest::from_http(request);
  let method = inbound.method.clone();
  let path = inbound.path_and_query.clone();
  debug!(%method, %path, "relay request");

  match client.relay(inbound).await {
    Ok(response) => {
      let mut builder = Response::builder().status(response.status);
      if let Some(content_type) = response.content_type() {
        builder = builder.header(header::CONTENT_TYPE, content_type);
      }
      builder
        .body(axum::body::Body::from(response.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
    Err(e) => {
      let status = status_for(&e);
      if status.is_server_error() {
        warn!(%method, %path, "relay failed: {}", e);
      } else {
        debug!(%method, %path, "relay refused: {}", e);
      }
      (status, e.to_string()).into_response()
    }
  }
}

fn status_for(error: &Error) -> StatusCode {
  match error {
    Error::Relay(RelayError::UnsupportedPath(_)) => StatusCode::NOT_FOUND,
    Error::Relay(RelayError::UnsupportedMethod(_)) => StatusCode::METHOD_NOT_ALLOWED,
    Error::Relay(RelayError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
    Error::Relay(RelayError::Body(_)) => StatusCode::BAD_REQUEST,
    Error::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
    _ => StatusCode::BAD_GATEWAY,
  }
}
