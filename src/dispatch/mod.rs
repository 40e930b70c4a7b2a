//! Dispatch boundary.
//!
//! One dispatcher owns the config snapshot and the light-service handle.
//! Events arrive serially from the source channel; queued click replays are
//! discarded before resolution (only live presses trigger light actions),
//! and every dispatch-time failure is logged and swallowed so a single
//! misconfigured button never stops the event loop.

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::light::LightService;
use crate::resolver::{self, Command, ResolveError};
use crate::sources::{ButtonEvent, EventKind};

/// Routes resolved commands to the light service and everything else to the
/// log.
pub struct Dispatcher<S> {
    config: Config,
    service: S,
}

impl<S: LightService> Dispatcher<S> {
    /// Create a dispatcher over a loaded config and a light-service handle.
    pub fn new(config: Config, service: S) -> Self {
        Self { config, service }
    }

    /// Returns a reference to the configuration snapshot.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one transport event. Never returns an error: dispatch-time
    /// failures are reported and the loop continues.
    pub async fn handle_event(&self, event: &ButtonEvent) {
        match &event.kind {
            EventKind::Connection { status } => {
                debug!(
                    target: "lightclick::dispatch",
                    address = %event.address,
                    %status,
                    "Button connection status changed"
                );
            }
            EventKind::Click {
                click_type,
                was_queued,
            } => {
                if *was_queued {
                    // Stale press replayed after reconnect; at-most-once-live.
                    debug!(
                        target: "lightclick::dispatch",
                        address = %event.address,
                        click = %click_type,
                        "Discarding queued click replay"
                    );
                    return;
                }
                info!(
                    target: "lightclick::dispatch",
                    address = %event.address,
                    click = %click_type,
                    "Button pressed"
                );
                match resolver::resolve(&self.config, &event.address, *click_type) {
                    Ok(command) => self.send(command).await,
                    Err(err) => report_resolve_error(&err),
                }
            }
        }
    }

    /// Hand a resolved command to the light service. Fire-and-forget: a
    /// failed request is logged, nothing is retried here.
    async fn send(&self, command: Command) {
        let result = match &command {
            Command::SetState { state } => {
                let selector = state.selector.as_deref().unwrap_or("all");
                self.service.set_state(selector, state).await
            }
            Command::SetStates { states, default } => {
                self.service.set_states(states, default.as_ref()).await
            }
            Command::Toggle { selector, duration } => {
                self.service.toggle(selector, *duration).await
            }
            Command::Effect {
                kind,
                selector,
                duration,
            } => self.service.effect(*kind, selector, *duration).await,
            Command::ActivateScene { scene_id, duration } => {
                self.service.activate_scene(scene_id, *duration).await
            }
        };
        if let Err(err) = result {
            error!(
                target: "lightclick::dispatch",
                error = %err,
                ?command,
                "Light service call failed"
            );
        }
    }
}

/// Expected conditions (a button without config, an unbound click type) log
/// quietly; dangling references mean the config is out of sync and warrant a
/// warning.
fn report_resolve_error(err: &ResolveError) {
    match err {
        ResolveError::UnknownButton { .. } | ResolveError::NoActionBound { .. } => {
            debug!(target: "lightclick::dispatch", %err, "Ignoring event");
        }
        ResolveError::DanglingActionReference { .. }
        | ResolveError::DanglingStateReference { .. } => {
            warn!(target: "lightclick::dispatch", %err, "Ignoring event");
        }
    }
}
