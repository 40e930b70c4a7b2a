//! Action resolution.
//!
//! Pure lookup and expansion: given the immutable config snapshot, a button
//! address, and a click type, produce the fully-formed command the light
//! service should execute. No I/O happens here; resolving the same triple
//! twice yields identical commands. All errors are dispatch-time
//! recoverable and handled by the caller.

use serde::Serialize;
use thiserror::Error;

use crate::config::{Action, ActionKind, ClickType, Config, Power, State};

/// The light properties carried by a single state, ready for the wire.
/// Only populated fields are serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct StatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl From<&State> for StatePayload {
    fn from(state: &State) -> Self {
        Self {
            selector: state.selector.clone(),
            power: state.power,
            color: state.color.clone(),
            brightness: state.brightness,
            duration: state.duration,
        }
    }
}

/// Selector-keyed visual effects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Breathe,
    Pulse,
    Cycle,
}

impl EffectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breathe => "breathe",
            Self::Pulse => "pulse",
            Self::Cycle => "cycle",
        }
    }
}

/// A fully-resolved command, carrying everything the light service needs and
/// nothing about transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Command {
    /// Apply a single state to the lights it selects.
    SetState { state: StatePayload },
    /// Apply a batch of states, with an optional fallback for lights not
    /// covered by any entry.
    SetStates {
        states: Vec<StatePayload>,
        default: Option<StatePayload>,
    },
    /// Flip power for everything the selector matches.
    Toggle {
        selector: String,
        duration: Option<f64>,
    },
    /// Run a visual effect on everything the selector matches.
    Effect {
        kind: EffectKind,
        selector: String,
        duration: Option<f64>,
    },
    /// Activate a server-side scene by identifier.
    ActivateScene {
        scene_id: String,
        duration: Option<f64>,
    },
}

/// Why a button event produced no command. Every variant is non-fatal: the
/// dispatcher logs it and keeps listening.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The transport can deliver events for buttons the config never
    /// mentions.
    #[error("no config entry for button {address}")]
    UnknownButton { address: String },
    /// The button exists but leaves this click type unbound.
    #[error("button {address} has no action bound for {click}")]
    NoActionBound { address: String, click: ClickType },
    /// The binding names an action that is not in the snapshot. The loader
    /// reports these at load time; this is the defensive backstop.
    #[error("button {address} is bound to undeclared action '{action}'")]
    DanglingActionReference { address: String, action: String },
    /// The action references a state that is not in the snapshot.
    #[error("action '{action}' references undeclared state '{state}'")]
    DanglingStateReference { action: String, state: String },
}

/// Resolve a button event to a command.
///
/// 1. Look up the button by address.
/// 2. Select the binding for the click type.
/// 3. Look up the bound action.
/// 4. Expand the action, resolving any referenced states.
pub fn resolve(
    config: &Config,
    address: &str,
    click: ClickType,
) -> Result<Command, ResolveError> {
    let button = config
        .buttons
        .get(address)
        .ok_or_else(|| ResolveError::UnknownButton {
            address: address.to_string(),
        })?;

    let action_name = button
        .binding(click)
        .ok_or_else(|| ResolveError::NoActionBound {
            address: address.to_string(),
            click,
        })?;

    let action =
        config
            .actions
            .get(action_name)
            .ok_or_else(|| ResolveError::DanglingActionReference {
                address: address.to_string(),
                action: action_name.to_string(),
            })?;

    expand(config, action)
}

/// Expand an action into its command, resolving state references.
fn expand(config: &Config, action: &Action) -> Result<Command, ResolveError> {
    match action.kind {
        ActionKind::SetState => {
            // The builder guarantees state_ref is present for this kind.
            let name = action.state_ref.as_deref().unwrap_or_default();
            let state = lookup_state(config, action, name)?;
            Ok(Command::SetState {
                state: StatePayload::from(state),
            })
        }
        ActionKind::SetStates => {
            // Stop on the first missing reference.
            let mut states = Vec::with_capacity(action.state_refs.len());
            for name in &action.state_refs {
                states.push(StatePayload::from(lookup_state(config, action, name)?));
            }
            let default = action
                .default_state_ref
                .as_deref()
                .map(|name| lookup_state(config, action, name).map(StatePayload::from))
                .transpose()?;
            Ok(Command::SetStates { states, default })
        }
        ActionKind::Toggle => Ok(Command::Toggle {
            selector: action.selector.clone().unwrap_or_default(),
            duration: action.duration,
        }),
        ActionKind::Breathe => Ok(effect(action, EffectKind::Breathe)),
        ActionKind::Pulse => Ok(effect(action, EffectKind::Pulse)),
        ActionKind::Cycle => Ok(effect(action, EffectKind::Cycle)),
        ActionKind::ActivateScene => Ok(Command::ActivateScene {
            scene_id: action.scene_id.clone().unwrap_or_default(),
            duration: action.duration,
        }),
    }
}

fn effect(action: &Action, kind: EffectKind) -> Command {
    Command::Effect {
        kind,
        selector: action.selector.clone().unwrap_or_default(),
        duration: action.duration,
    }
}

fn lookup_state<'a>(
    config: &'a Config,
    action: &Action,
    name: &str,
) -> Result<&'a State, ResolveError> {
    config
        .states
        .get(name)
        .ok_or_else(|| ResolveError::DanglingStateReference {
            action: action.name.clone(),
            state: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;

    const MINIMAL: &str = "\
ACTION Morning
  setstate = Bright
STATE Bright
  power = on
  brightness = 1.0
BUTTON aa:bb:cc:dd:ee:ff
  singleclick = Morning
";

    #[test]
    fn minimal_end_to_end() {
        let config = load_from_str(MINIMAL).unwrap();
        let command = resolve(&config, "aa:bb:cc:dd:ee:ff", ClickType::SingleClick).unwrap();
        assert_eq!(
            command,
            Command::SetState {
                state: StatePayload {
                    selector: None,
                    power: Some(Power::On),
                    color: None,
                    brightness: Some(1.0),
                    duration: None,
                }
            }
        );
    }

    #[test]
    fn payload_carries_exactly_the_set_fields() {
        let config = load_from_str(
            "ACTION A\n setstate = S\nSTATE S\n power = on\n brightness = 0.8\nBUTTON b\n singleclick = A\n",
        )
        .unwrap();
        let command = resolve(&config, "b", ClickType::SingleClick).unwrap();
        let Command::SetState { state } = command else {
            panic!("expected SetState");
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({"power": "on", "brightness": 0.8}));
    }

    #[test]
    fn resolution_is_idempotent() {
        let config = load_from_str(MINIMAL).unwrap();
        let first = resolve(&config, "aa:bb:cc:dd:ee:ff", ClickType::SingleClick).unwrap();
        let second = resolve(&config, "aa:bb:cc:dd:ee:ff", ClickType::SingleClick).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_button() {
        let config = load_from_str(MINIMAL).unwrap();
        assert_eq!(
            resolve(&config, "11:22:33:44:55:66", ClickType::SingleClick),
            Err(ResolveError::UnknownButton {
                address: "11:22:33:44:55:66".into()
            })
        );
    }

    #[test]
    fn unbound_click_types_on_bare_button() {
        let config = load_from_str("BUTTON aa:bb\n  name = desk\n").unwrap();
        for click in ClickType::ALL {
            assert_eq!(
                resolve(&config, "aa:bb", click),
                Err(ResolveError::NoActionBound {
                    address: "aa:bb".into(),
                    click
                })
            );
        }
    }

    #[test]
    fn dangling_action_reference() {
        let config = load_from_str("BUTTON aa:bb\n  singleclick = Ghost\n").unwrap();
        assert_eq!(
            resolve(&config, "aa:bb", ClickType::SingleClick),
            Err(ResolveError::DanglingActionReference {
                address: "aa:bb".into(),
                action: "Ghost".into()
            })
        );
    }

    #[test]
    fn dangling_state_reference() {
        let config =
            load_from_str("ACTION A\n setstate = Missing\nBUTTON b\n hold = A\n").unwrap();
        assert_eq!(
            resolve(&config, "b", ClickType::Hold),
            Err(ResolveError::DanglingStateReference {
                action: "A".into(),
                state: "Missing".into()
            })
        );
    }

    #[test]
    fn setstates_expands_ordered_batch_with_default() {
        let config = load_from_str(
            "\
ACTION Evening
  setstates = Desk, Shelf
  default = Off
STATE Desk
  selector = id:d1
  brightness = 0.6
STATE Shelf
  selector = id:d2
  color = red
STATE Off
  power = off
BUTTON b
  doubleclick = Evening
",
        )
        .unwrap();
        let command = resolve(&config, "b", ClickType::DoubleClick).unwrap();
        let Command::SetStates { states, default } = command else {
            panic!("expected SetStates");
        };
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].selector.as_deref(), Some("id:d1"));
        assert_eq!(states[0].brightness, Some(0.6));
        assert_eq!(states[1].selector.as_deref(), Some("id:d2"));
        assert_eq!(states[1].color.as_deref(), Some("red"));
        assert_eq!(default.unwrap().power, Some(Power::Off));
    }

    #[test]
    fn setstates_stops_on_first_missing_reference() {
        let config = load_from_str(
            "ACTION E\n setstates = Known, Unknown\nSTATE Known\n power = on\nBUTTON b\n hold = E\n",
        )
        .unwrap();
        assert_eq!(
            resolve(&config, "b", ClickType::Hold),
            Err(ResolveError::DanglingStateReference {
                action: "E".into(),
                state: "Unknown".into()
            })
        );
    }

    #[test]
    fn toggle_carries_selector_and_duration() {
        let config = load_from_str(
            "ACTION Flip\n toggle = group:Kitchen\n duration = 2.0\nBUTTON b\n singleclick = Flip\n",
        )
        .unwrap();
        assert_eq!(
            resolve(&config, "b", ClickType::SingleClick).unwrap(),
            Command::Toggle {
                selector: "group:Kitchen".into(),
                duration: Some(2.0)
            }
        );
    }

    #[test]
    fn effect_kinds_map_through() {
        let config = load_from_str(
            "\
ACTION B
  breathe = all
ACTION P
  pulse = all
ACTION C
  cycle = all
BUTTON b
  singleclick = B
  doubleclick = P
  hold = C
",
        )
        .unwrap();
        for (click, kind) in [
            (ClickType::SingleClick, EffectKind::Breathe),
            (ClickType::DoubleClick, EffectKind::Pulse),
            (ClickType::Hold, EffectKind::Cycle),
        ] {
            let command = resolve(&config, "b", click).unwrap();
            assert_eq!(
                command,
                Command::Effect {
                    kind,
                    selector: "all".into(),
                    duration: None
                }
            );
        }
    }

    #[test]
    fn activate_scene() {
        let config = load_from_str(
            "ACTION Movie\n activatescene = abc-123\n duration = 5\nBUTTON b\n hold = Movie\n",
        )
        .unwrap();
        assert_eq!(
            resolve(&config, "b", ClickType::Hold).unwrap(),
            Command::ActivateScene {
                scene_id: "abc-123".into(),
                duration: Some(5.0)
            }
        );
    }

    #[test]
    fn every_declared_binding_resolves_or_reports() {
        // load + resolve over all declared bindings never panics; each yields
        // either a command or a recoverable error.
        let config = load_from_str(
            "\
ACTION Real
  toggle = all
BUTTON one
  singleclick = Real
  doubleclick = Ghost
BUTTON two
  hold = Real
",
        )
        .unwrap();
        for button in config.buttons.values() {
            for click in ClickType::ALL {
                let _ = resolve(&config, &button.address, click);
            }
        }
    }
}
