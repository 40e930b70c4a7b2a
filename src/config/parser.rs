//! Section grammar and entity builders.
//!
//! A section header is a line matching `^[A-Z]+\s(.+)$` whose leading token
//! is one of `ACTION`, `BUTTON`, `STATE`. The classifier turns a header into
//! a `(kind, name)` pair; one builder per kind turns the section's key/value
//! pairs into a typed entity. Every error here is load-time recoverable: the
//! loader reports it and skips the offending section.

use thiserror::Error;

use super::models::{Action, ActionKind, Button, Power, State};

/// The kind token of a section header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SectionKind {
    Action,
    Button,
    State,
}

/// A section header that could not be classified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    /// The header does not match `<UPPERCASE-TOKEN><whitespace><name>`.
    #[error("invalid section header '{header}'")]
    InvalidHeader { header: String },
    /// The header is well-formed but its kind token is not in the vocabulary.
    #[error("unknown section kind '{kind}' in header '{header}'")]
    UnknownKind { kind: String, header: String },
}

/// A section that classified fine but whose fields do not form a valid entity.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("{kind} '{name}' is missing required field '{field}'")]
    MissingField {
        kind: &'static str,
        name: String,
        field: &'static str,
    },
    /// One action, one unambiguous kind: a second kind-selecting key is a
    /// load-time error rather than a silent override.
    #[error("action '{name}' declares conflicting kinds '{first}' and '{second}'")]
    ConflictingActionKind {
        name: String,
        first: ActionKind,
        second: ActionKind,
    },
    #[error("{kind} '{name}': invalid value '{value}' for key '{key}'")]
    InvalidValue {
        kind: &'static str,
        name: String,
        key: String,
        value: String,
    },
}

/// Classify a raw section header into its kind and name.
pub fn classify_section(header: &str) -> Result<(SectionKind, &str), SectionError> {
    let Some((token, rest)) = header.split_once(char::is_whitespace) else {
        return Err(SectionError::InvalidHeader {
            header: header.to_string(),
        });
    };
    let name = rest.trim();
    if token.is_empty()
        || name.is_empty()
        || !token.chars().all(|c| c.is_ascii_uppercase())
    {
        return Err(SectionError::InvalidHeader {
            header: header.to_string(),
        });
    }
    match token {
        "ACTION" => Ok((SectionKind::Action, name)),
        "BUTTON" => Ok((SectionKind::Button, name)),
        "STATE" => Ok((SectionKind::State, name)),
        _ => Err(SectionError::UnknownKind {
            kind: token.to_string(),
            header: header.to_string(),
        }),
    }
}

/// Build an [`Action`] from a section's key/value pairs, in file order.
///
/// Keys matching the kind vocabulary (case/spacing insensitive) select the
/// action's kind and carry its primary value; the secondary keys `selector`,
/// `duration`, and `default` populate the corresponding optional fields
/// regardless of kind. Any other key is ignored.
pub fn build_action(name: &str, pairs: &[(String, String)]) -> Result<Action, BuildError> {
    let mut action = Action {
        name: name.to_string(),
        kind: ActionKind::Toggle, // overwritten below; sections without a kind key are rejected
        selector: None,
        state_ref: None,
        state_refs: Vec::new(),
        default_state_ref: None,
        scene_id: None,
        duration: None,
    };
    let mut kind: Option<ActionKind> = None;

    for (key, value) in pairs {
        if let Some(k) = ActionKind::from_key(key) {
            if let Some(first) = kind {
                return Err(BuildError::ConflictingActionKind {
                    name: name.to_string(),
                    first,
                    second: k,
                });
            }
            kind = Some(k);
            match k {
                ActionKind::SetState => {
                    action.state_ref = non_empty(value);
                }
                ActionKind::SetStates => {
                    action.state_refs = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                ActionKind::ActivateScene => {
                    action.scene_id = non_empty(value);
                }
                // For the selector-bearing kinds the kind key's value, when
                // present, is the selector itself.
                ActionKind::Toggle | ActionKind::Breathe | ActionKind::Pulse | ActionKind::Cycle => {
                    if let Some(sel) = non_empty(value) {
                        action.selector = Some(sel);
                    }
                }
            }
        } else {
            match key.as_str() {
                "selector" => action.selector = non_empty(value),
                "duration" => {
                    action.duration = Some(parse_number("action", name, key, value)?);
                }
                "default" => action.default_state_ref = non_empty(value),
                _ => {} // stray keys are tolerated
            }
        }
    }

    let Some(kind) = kind else {
        return Err(BuildError::MissingField {
            kind: "action",
            name: name.to_string(),
            field: "action kind",
        });
    };
    action.kind = kind;

    match kind {
        ActionKind::SetState if action.state_ref.is_none() => Err(BuildError::MissingField {
            kind: "action",
            name: name.to_string(),
            field: "setstate",
        }),
        ActionKind::SetStates if action.state_refs.is_empty() => Err(BuildError::MissingField {
            kind: "action",
            name: name.to_string(),
            field: "setstates",
        }),
        ActionKind::ActivateScene if action.scene_id.is_none() => Err(BuildError::MissingField {
            kind: "action",
            name: name.to_string(),
            field: "activatescene",
        }),
        k if k.needs_selector() && action.selector.is_none() => Err(BuildError::MissingField {
            kind: "action",
            name: name.to_string(),
            field: "selector",
        }),
        _ => Ok(action),
    }
}

/// Build a [`Button`] from a section's key/value pairs.
///
/// Exactly the keys `singleclick`, `doubleclick`, and `hold` are recognized;
/// stray keys are ignored without a report so scratch entries never fail the
/// load. A button with zero recognized keys is still a valid entity.
pub fn build_button(address: &str, pairs: &[(String, String)]) -> Button {
    let mut button = Button {
        address: address.to_string(),
        ..Button::default()
    };
    for (key, value) in pairs {
        match key.as_str() {
            "singleclick" => button.single_click = non_empty(value),
            "doubleclick" => button.double_click = non_empty(value),
            "hold" => button.hold = non_empty(value),
            _ => {}
        }
    }
    button
}

/// Build a [`State`] from a section's key/value pairs.
///
/// Recognizes `power`, `color`, `brightness`, `duration`, `selector`;
/// unrecognized keys are silently ignored.
pub fn build_state(name: &str, pairs: &[(String, String)]) -> Result<State, BuildError> {
    let mut state = State {
        name: name.to_string(),
        ..State::default()
    };
    for (key, value) in pairs {
        match key.as_str() {
            "power" => {
                state.power = Some(Power::parse(value).ok_or_else(|| BuildError::InvalidValue {
                    kind: "state",
                    name: name.to_string(),
                    key: key.clone(),
                    value: value.clone(),
                })?);
            }
            "color" => state.color = non_empty(value),
            "brightness" => {
                let brightness = parse_number("state", name, key, value)?;
                if !(0.0..=1.0).contains(&brightness) {
                    return Err(BuildError::InvalidValue {
                        kind: "state",
                        name: name.to_string(),
                        key: key.clone(),
                        value: value.clone(),
                    });
                }
                state.brightness = Some(brightness);
            }
            "duration" => state.duration = Some(parse_number("state", name, key, value)?),
            "selector" => state.selector = non_empty(value),
            _ => {}
        }
    }
    Ok(state)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_number(
    kind: &'static str,
    name: &str,
    key: &str,
    value: &str,
) -> Result<f64, BuildError> {
    value.trim().parse::<f64>().map_err(|_| BuildError::InvalidValue {
        kind,
        name: name.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn classify_valid_headers() {
        assert_eq!(
            classify_section("ACTION Morning"),
            Ok((SectionKind::Action, "Morning"))
        );
        assert_eq!(
            classify_section("BUTTON aa:bb:cc:dd:ee:ff"),
            Ok((SectionKind::Button, "aa:bb:cc:dd:ee:ff"))
        );
        assert_eq!(
            classify_section("STATE Bright White"),
            Ok((SectionKind::State, "Bright White"))
        );
    }

    #[test]
    fn classify_rejects_unknown_kind() {
        assert_eq!(
            classify_section("FOO Bar"),
            Err(SectionError::UnknownKind {
                kind: "FOO".into(),
                header: "FOO Bar".into(),
            })
        );
    }

    #[test]
    fn classify_rejects_malformed_headers() {
        assert!(matches!(
            classify_section("ACTION"),
            Err(SectionError::InvalidHeader { .. })
        ));
        assert!(matches!(
            classify_section("ACTION   "),
            Err(SectionError::InvalidHeader { .. })
        ));
        assert!(matches!(
            classify_section("action Morning"),
            Err(SectionError::InvalidHeader { .. })
        ));
        assert!(matches!(
            classify_section("A1 name"),
            Err(SectionError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn action_setstate() {
        let action = build_action("Morning", &pairs(&[("setstate", "Bright")])).unwrap();
        assert_eq!(action.kind, ActionKind::SetState);
        assert_eq!(action.state_ref.as_deref(), Some("Bright"));
        assert!(action.selector.is_none());
        assert!(action.duration.is_none());
    }

    #[test]
    fn action_setstates_with_default() {
        let action = build_action(
            "Evening",
            &pairs(&[("setstates", "Dim, Warm ,Accent"), ("default", "Off")]),
        )
        .unwrap();
        assert_eq!(action.kind, ActionKind::SetStates);
        assert_eq!(action.state_refs, vec!["Dim", "Warm", "Accent"]);
        assert_eq!(action.default_state_ref.as_deref(), Some("Off"));
    }

    #[test]
    fn action_toggle_selector_from_kind_value() {
        let action = build_action("Flip", &pairs(&[("toggle", "group:Kitchen")])).unwrap();
        assert_eq!(action.kind, ActionKind::Toggle);
        assert_eq!(action.selector.as_deref(), Some("group:Kitchen"));
    }

    #[test]
    fn action_toggle_selector_from_secondary_key() {
        let action = build_action(
            "Flip",
            &pairs(&[("toggle", ""), ("selector", "all"), ("duration", "2.5")]),
        )
        .unwrap();
        assert_eq!(action.selector.as_deref(), Some("all"));
        assert_eq!(action.duration, Some(2.5));
    }

    #[test]
    fn action_kind_key_spacing_insensitive() {
        let action = build_action("Scene", &pairs(&[("Activate Scene", "abc-123")])).unwrap();
        assert_eq!(action.kind, ActionKind::ActivateScene);
        assert_eq!(action.scene_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn action_conflicting_kinds_rejected() {
        let err = build_action(
            "Broken",
            &pairs(&[("setstate", "Bright"), ("toggle", "all")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::ConflictingActionKind {
                name: "Broken".into(),
                first: ActionKind::SetState,
                second: ActionKind::Toggle,
            }
        );
    }

    #[test]
    fn action_missing_kind_rejected() {
        let err = build_action("Empty", &pairs(&[("selector", "all")])).unwrap_err();
        assert!(matches!(
            err,
            BuildError::MissingField { field: "action kind", .. }
        ));
    }

    #[test]
    fn action_toggle_without_selector_rejected() {
        let err = build_action("Flip", &pairs(&[("toggle", "")])).unwrap_err();
        assert!(matches!(err, BuildError::MissingField { field: "selector", .. }));
    }

    #[test]
    fn action_bad_duration_rejected() {
        let err =
            build_action("Slow", &pairs(&[("toggle", "all"), ("duration", "soon")])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { .. }));
    }

    #[test]
    fn button_recognizes_fixed_keys_only() {
        let button = build_button(
            "aa:bb:cc:dd:ee:ff",
            &pairs(&[
                ("singleclick", "Morning"),
                ("hold", "Night"),
                ("SingleClick", "WrongCase"),
                ("tripleclick", "Nope"),
            ]),
        );
        assert_eq!(button.single_click.as_deref(), Some("Morning"));
        assert_eq!(button.double_click, None);
        assert_eq!(button.hold.as_deref(), Some("Night"));
    }

    #[test]
    fn button_with_no_bindings_still_builds() {
        let button = build_button("aa:bb", &[]);
        assert_eq!(button.address, "aa:bb");
        for click in crate::config::ClickType::ALL {
            assert_eq!(button.binding(click), None);
        }
    }

    #[test]
    fn state_full() {
        let state = build_state(
            "Bright",
            &pairs(&[
                ("power", "on"),
                ("color", "kelvin:3500"),
                ("brightness", "0.8"),
                ("duration", "1.5"),
                ("selector", "group:Office"),
                ("mood", "cosy"),
            ]),
        )
        .unwrap();
        assert_eq!(state.power, Some(Power::On));
        assert_eq!(state.color.as_deref(), Some("kelvin:3500"));
        assert_eq!(state.brightness, Some(0.8));
        assert_eq!(state.duration, Some(1.5));
        assert_eq!(state.selector.as_deref(), Some("group:Office"));
    }

    #[test]
    fn state_invalid_power_rejected() {
        let err = build_state("Odd", &pairs(&[("power", "dim")])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { .. }));
    }

    #[test]
    fn state_brightness_out_of_range_rejected() {
        let err = build_state("Blinding", &pairs(&[("brightness", "1.5")])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { .. }));
    }
}
