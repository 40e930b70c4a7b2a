//! Dry-run light service: logs every call instead of touching the network.
//! Selected with `--dry-run`, and handy for exercising a config file before
//! pointing the client at real lights.

use tracing::info;

use super::{LightError, LightInfo, LightService, SceneInfo};
use crate::resolver::{EffectKind, StatePayload};

/// A [`LightService`] that performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct DryRunLightService;

impl DryRunLightService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LightService for DryRunLightService {
    async fn set_state(&self, selector: &str, state: &StatePayload) -> Result<(), LightError> {
        info!(target: "lightclick::light", selector, ?state, "DRY-RUN set_state");
        Ok(())
    }

    async fn set_states(
        &self,
        states: &[StatePayload],
        default: Option<&StatePayload>,
    ) -> Result<(), LightError> {
        info!(
            target: "lightclick::light",
            count = states.len(),
            has_default = default.is_some(),
            "DRY-RUN set_states"
        );
        Ok(())
    }

    async fn toggle(&self, selector: &str, duration: Option<f64>) -> Result<(), LightError> {
        info!(target: "lightclick::light", selector, ?duration, "DRY-RUN toggle");
        Ok(())
    }

    async fn effect(
        &self,
        kind: EffectKind,
        selector: &str,
        duration: Option<f64>,
    ) -> Result<(), LightError> {
        info!(
            target: "lightclick::light",
            effect = kind.as_str(),
            selector,
            ?duration,
            "DRY-RUN effect"
        );
        Ok(())
    }

    async fn activate_scene(
        &self,
        scene_id: &str,
        duration: Option<f64>,
    ) -> Result<(), LightError> {
        info!(target: "lightclick::light", scene_id, ?duration, "DRY-RUN activate_scene");
        Ok(())
    }

    async fn list_lights(&self) -> Result<Vec<LightInfo>, LightError> {
        info!(target: "lightclick::light", "DRY-RUN list_lights");
        Ok(Vec::new())
    }

    async fn list_scenes(&self) -> Result<Vec<SceneInfo>, LightError> {
        info!(target: "lightclick::light", "DRY-RUN list_scenes");
        Ok(Vec::new())
    }
}
