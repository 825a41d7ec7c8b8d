// Login validation against stub transports.

mod common;

use std::sync::Arc;

use reqwest::StatusCode;

use common::{ok, response, session_manager, StubBroker, StubTransport, HOST, LOGIN_PATH};
use ogrelay::game::error::{BrokerError, LoginFailure};

#[tokio::test]
async fn test_login_success() {
  let transport = StubTransport::healthy();
  let sessions = session_manager(transport.clone(), Arc::new(StubBroker::default()));

  let session = sessions.login().await.unwrap();

  assert_eq!(session.host, HOST);
  assert_eq!(session.account_id, 100123);

  let requests = transport.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].path, LOGIN_PATH);
  assert_eq!(requests[0].query.as_deref(), Some("id=100123&token=token-0"));
}

#[tokio::test]
async fn test_login_rejects_foreign_host_even_with_200() {
  let transport = StubTransport::new(|_, _| {
    response(
      StatusCode::OK,
      "https://s5-en.otherhost.example/game/index.php",
      "",
    )
  });
  let sessions = session_manager(transport, Arc::new(StubBroker::default()));

  let err = sessions.login().await.unwrap_err();
  assert!(matches!(err, LoginFailure::Host(ref host) if host == "s5-en.otherhost.example"));
}

#[tokio::test]
async fn test_login_rejects_non_200() {
  let transport = StubTransport::new(|_, request| {
    let mut response = ok(request, "");
    response.status = StatusCode::NO_CONTENT;
    response
  });
  let sessions = session_manager(transport, Arc::new(StubBroker::default()));

  let err = sessions.login().await.unwrap_err();
  assert!(matches!(err, LoginFailure::Status(s) if s == StatusCode::NO_CONTENT));
}

#[tokio::test]
async fn test_login_without_token_makes_no_call() {
  let transport = StubTransport::healthy();
  let sessions = session_manager(transport.clone(), StubBroker::failing());

  let err = sessions.login().await.unwrap_err();
  assert!(matches!(err, LoginFailure::Broker(BrokerError::Status(_))));
  assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_login_does_not_retry() {
  let transport = StubTransport::new(|_, _| response(StatusCode::FORBIDDEN, "https://lobby.example.com/", ""));
  let broker = Arc::new(StubBroker::default());
  let sessions = session_manager(transport.clone(), broker.clone());

  assert!(sessions.login().await.is_err());
  assert_eq!(broker.calls(), 1);
  assert_eq!(transport.requests().len(), 1);
}
