//! Serde-deserializable types matching lobby and ajax responses.
//!
//! Only the fields the client itself acts on are modelled; everything else
//! is left for field extraction.

use serde::Deserialize;

/// `GET /api/users/me/loginLink` response
#[derive(Debug, Deserialize)]
pub struct ApiLoginLink {
  pub url: String,
}

/// Character class selection ajax response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClassSelectionResponse {
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub redirect_url: String,
  #[serde(default)]
  pub new_ajax_token: String,
}
