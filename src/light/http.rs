//! HTTP client for a LIFX-style light API.
//!
//! Endpoints:
//! - `PUT lights/{selector}/state` — apply one state
//! - `PUT lights/states` — apply a batch with defaults
//! - `POST lights/{selector}/toggle` — flip power
//! - `POST lights/{selector}/effects/{breathe|pulse}` — run an effect
//! - `POST lights/{selector}/cycle` — advance through saved states
//! - `PUT scenes/scene_id:{id}/activate` — activate a scene
//! - `GET lights/all`, `GET scenes` — discovery listings
//!
//! The bearer token is an explicit constructor argument; nothing here reads
//! the process environment.

use serde_json::json;
use tracing::trace;

use super::{LightError, LightInfo, LightService, SceneInfo};
use crate::resolver::{EffectKind, StatePayload};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.lifx.com/v1/";

/// Owned handle to the light API. Created once at startup and passed down;
/// dropped at process exit.
#[derive(Debug, Clone)]
pub struct LifxHttpClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl LifxHttpClient {
    /// Build a client for `base_url`, authenticating every request with
    /// `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}", self.base_url, suffix)
    }

    async fn send(&self, request: reqwest::RequestBuilder, endpoint: &str) -> Result<(), LightError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        trace!(target: "lightclick::light", endpoint, status = status.as_u16(), "Light API call");
        if status.is_success() {
            Ok(())
        } else {
            Err(LightError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            })
        }
    }

    /// Optional-duration body shared by toggle/effect/scene calls.
    fn duration_body(duration: Option<f64>) -> serde_json::Value {
        match duration {
            Some(duration) => json!({ "duration": duration }),
            None => json!({}),
        }
    }
}

impl LightService for LifxHttpClient {
    async fn set_state(&self, selector: &str, state: &StatePayload) -> Result<(), LightError> {
        // The selector lives in the URL, not the body.
        let body = StatePayload {
            selector: None,
            ..state.clone()
        };
        let endpoint = format!("lights/{selector}/state");
        self.send(self.http.put(self.url(&endpoint)).json(&body), &endpoint)
            .await
    }

    async fn set_states(
        &self,
        states: &[StatePayload],
        default: Option<&StatePayload>,
    ) -> Result<(), LightError> {
        let body = json!({
            "states": states,
            "defaults": default.cloned().unwrap_or_default(),
        });
        let endpoint = "lights/states";
        self.send(self.http.put(self.url(endpoint)).json(&body), endpoint)
            .await
    }

    async fn toggle(&self, selector: &str, duration: Option<f64>) -> Result<(), LightError> {
        let endpoint = format!("lights/{selector}/toggle");
        self.send(
            self.http
                .post(self.url(&endpoint))
                .json(&Self::duration_body(duration)),
            &endpoint,
        )
        .await
    }

    async fn effect(
        &self,
        kind: EffectKind,
        selector: &str,
        duration: Option<f64>,
    ) -> Result<(), LightError> {
        // Cycle is not grouped under effects/ by the API.
        let endpoint = match kind {
            EffectKind::Cycle => format!("lights/{selector}/cycle"),
            other => format!("lights/{selector}/effects/{}", other.as_str()),
        };
        self.send(
            self.http
                .post(self.url(&endpoint))
                .json(&Self::duration_body(duration)),
            &endpoint,
        )
        .await
    }

    async fn activate_scene(
        &self,
        scene_id: &str,
        duration: Option<f64>,
    ) -> Result<(), LightError> {
        let endpoint = format!("scenes/scene_id:{scene_id}/activate");
        self.send(
            self.http
                .put(self.url(&endpoint))
                .json(&Self::duration_body(duration)),
            &endpoint,
        )
        .await
    }

    async fn list_lights(&self) -> Result<Vec<LightInfo>, LightError> {
        let response = self
            .http
            .get(self.url("lights/all"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LightError::Status {
                status: status.as_u16(),
                endpoint: "lights/all".to_string(),
            });
        }
        Ok(response.json().await?)
    }

    async fn list_scenes(&self) -> Result<Vec<SceneInfo>, LightError> {
        let response = self
            .http
            .get(self.url("scenes"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LightError::Status {
                status: status.as_u16(),
                endpoint: "scenes".to_string(),
            });
        }
        Ok(response.json().await?)
    }
}
