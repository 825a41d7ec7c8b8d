// Typed accessors on GameClient.

mod common;

use std::sync::Arc;

use reqwest::header::REFERER;
use reqwest::StatusCode;

use common::{executor, ok, response, StubBroker, StubTransport, HOST};
use ogrelay::game::error::Error;
use ogrelay::game::pages::EndpointCatalog;
use ogrelay::game::relay::Relay;
use ogrelay::game::types::{Method, PlayerClass};
use ogrelay::game::GameClient;

fn client(transport: Arc<StubTransport>) -> GameClient {
  GameClient::new(
    executor(transport, Arc::new(StubBroker::default())),
    Arc::new(EndpointCatalog::standard()),
    Relay::default(),
  )
}

#[tokio::test]
async fn test_overview_accessors_share_one_fetch() {
  let transport = StubTransport::new(|_, request| ok(request, "<html>overview</html>"));
  let client = client(transport.clone());

  let first = client.overview(true).await.unwrap();
  let second = client.overview(true).await.unwrap();
  assert_eq!(first, "<html>overview</html>");
  assert_eq!(first, second);
  assert_eq!(transport.game_calls(), 1);

  client.overview(false).await.unwrap();
  assert_eq!(transport.game_calls(), 2);
}

#[tokio::test]
async fn test_resources_request_shape() {
  let transport = StubTransport::new(|_, request| ok(request, r#"{"resources":{"metal":{"amount":500}}}"#));
  let client = client(transport.clone());

  let value = client.resources(33620011, true).await.unwrap();
  assert_eq!(value["resources"]["metal"]["amount"], 500);

  let sent = &transport.requests()[0];
  assert_eq!(
    sent.path_and_query(),
    "/game/index.php?page=fetchResources&ajax=1&asJson=1&cp=33620011"
  );
}

#[tokio::test]
async fn test_techs_and_researches() {
  let transport = StubTransport::new(|_, request| ok(request, r#"{"113":{"level":4}}"#));
  let client = client(transport.clone());

  client.techs(1, true).await.unwrap();
  client.researches(true).await.unwrap();

  let paths: Vec<String> = transport.requests().iter().map(|r| r.path_and_query()).collect();
  assert_eq!(
    paths,
    vec![
      "/game/index.php?page=fetchTechs&ajax=1&cp=1".to_string(),
      "/game/index.php?page=fetchTechs&ajax=1".to_string(),
    ]
  );
}

#[tokio::test]
async fn test_json_accessor_rejects_html() {
  let transport = StubTransport::new(|_, request| ok(request, "<html>login</html>"));
  let client = client(transport);

  let err = client.resources(1, false).await.unwrap_err();
  assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_galaxy_query() {
  let transport = StubTransport::healthy();
  let client = client(transport.clone());

  client.galaxy(4, 120, false).await.unwrap();
  assert_eq!(
    transport.requests()[0].path_and_query(),
    "/game/index.php?page=ingame&component=galaxy&galaxy=4&system=120"
  );
}

#[tokio::test]
async fn test_select_player_class() {
  let transport = StubTransport::new(|_, request| ok(request, r#"{"status":"success","message":""}"#));
  let client = client(transport.clone());

  client
    .select_initial_player_class(PlayerClass::Discoverer)
    .await
    .unwrap();

  let sent = &transport.requests()[0];
  assert_eq!(sent.method, Method::Post);
  assert_eq!(
    sent.path_and_query(),
    "/game/index.php?page=ingame&component=characterclassselection&ajax=1&asJson=1&characterClassId=3&action=selectClass"
  );
  assert_eq!(sent.headers.get("x-requested-with").unwrap(), "XMLHttpRequest");
  assert_eq!(
    sent.headers.get(REFERER).unwrap().to_str().unwrap(),
    format!(
      "https://{}/game/index.php?page=ingame&component=characterclassselection",
      HOST
    )
  );
  assert!(client.executor().cache().is_empty());
}

#[tokio::test]
async fn test_select_player_class_rejected() {
  let transport = StubTransport::new(|_, request| ok(request, r#"{"status":"failure","message":"already selected"}"#));
  let client = client(transport);

  let err = client
    .select_initial_player_class(PlayerClass::Collector)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Rejected(ref m) if m.contains("already selected")));
}

#[tokio::test]
async fn test_select_player_class_bad_status() {
  let transport = StubTransport::new(|_, request| {
    response(
      StatusCode::INTERNAL_SERVER_ERROR,
      &format!("https://{}{}", HOST, request.path_and_query()),
      "",
    )
  });
  let client = client(transport);

  let err = client
    .select_initial_player_class(PlayerClass::General)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Rejected(_)));
}
