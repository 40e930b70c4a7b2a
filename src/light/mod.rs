//! Light-service port.
//!
//! The core hands fully-resolved commands to this boundary and never looks
//! past success/failure. Implementations:
//! - `http.rs` -> [`LifxHttpClient`], the real HTTP client.
//! - `dry_run.rs` -> [`DryRunLightService`], logs calls instead of doing I/O.

use serde::Deserialize;
use std::future::Future;
use thiserror::Error;

use crate::resolver::{EffectKind, StatePayload};

pub mod dry_run;
pub mod http;

pub use dry_run::DryRunLightService;
pub use http::LifxHttpClient;

/// Failure talking to the light service. The core logs these and keeps
/// listening; no retry policy lives here.
#[derive(Debug, Error)]
pub enum LightError {
    #[error("light API request failed")]
    Http(#[from] reqwest::Error),
    #[error("light API returned status {status} for {endpoint}")]
    Status { status: u16, endpoint: String },
}

/// A light known to the service, as reported by the listing endpoint. Used
/// only for discovery output; payloads are otherwise not inspected.
#[derive(Debug, Clone, Deserialize)]
pub struct LightInfo {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub group: Option<GroupRef>,
    #[serde(default)]
    pub location: Option<GroupRef>,
}

/// Group or location membership of a light.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

/// A server-side saved scene.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneInfo {
    pub uuid: String,
    pub name: String,
}

/// Port to the external light-control service.
///
/// All command methods are fire-and-forget from the core's perspective:
/// success or a [`LightError`], nothing else is inspected.
pub trait LightService: Send + Sync {
    /// Apply a single state to the lights matched by `selector`.
    fn set_state(
        &self,
        selector: &str,
        state: &StatePayload,
    ) -> impl Future<Output = Result<(), LightError>> + Send;

    /// Apply a batch of selector-carrying states, with an optional default
    /// for lights not matched by any entry.
    fn set_states(
        &self,
        states: &[StatePayload],
        default: Option<&StatePayload>,
    ) -> impl Future<Output = Result<(), LightError>> + Send;

    /// Flip power for the lights matched by `selector`.
    fn toggle(
        &self,
        selector: &str,
        duration: Option<f64>,
    ) -> impl Future<Output = Result<(), LightError>> + Send;

    /// Run a visual effect on the lights matched by `selector`.
    fn effect(
        &self,
        kind: EffectKind,
        selector: &str,
        duration: Option<f64>,
    ) -> impl Future<Output = Result<(), LightError>> + Send;

    /// Activate a saved scene, optionally over `duration` seconds.
    fn activate_scene(
        &self,
        scene_id: &str,
        duration: Option<f64>,
    ) -> impl Future<Output = Result<(), LightError>> + Send;

    /// List all lights the service knows about (discovery mode).
    fn list_lights(&self) -> impl Future<Output = Result<Vec<LightInfo>, LightError>> + Send;

    /// List all saved scenes (discovery mode).
    fn list_scenes(&self) -> impl Future<Output = Result<Vec<SceneInfo>, LightError>> + Send;
}
