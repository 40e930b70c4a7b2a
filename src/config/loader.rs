//! Config loading.
//!
//! Loading is best-effort over the set of sections: a section that fails to
//! classify or build is reported with a diagnostic and skipped, and the rest
//! of the file still loads. Only two conditions are fatal: the file does not
//! exist, or it declares no sections at all.

use std::path::Path;
use tracing::{debug, warn};

use super::models::Config;
use super::parser::{self, SectionKind};
use thiserror::Error;

/// Fatal configuration errors. Everything recoverable is logged inside the
/// loader and never surfaces here.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file found at {path}; run in config mode to view light data and create one")]
    NotFound { path: String },
    #[error("config file {path} declares no sections; add some before running the client")]
    Empty { path: String },
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A raw section: its header line plus the key/value pairs under it, in file
/// order.
#[derive(Debug)]
struct RawSection {
    header: String,
    pairs: Vec<(String, String)>,
}

/// Load the configuration snapshot from a file path.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let display_path = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::NotFound { path: display_path });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display_path.clone(),
        source,
    })?;
    let config = load_from_str_named(&text, &display_path)?;
    debug!(target: "lightclick::config", path = %display_path, "Loaded config");
    Ok(config)
}

/// Load the configuration snapshot from a string.
pub fn load_from_str(text: &str) -> Result<Config, ConfigError> {
    load_from_str_named(text, "<string>")
}

fn load_from_str_named(text: &str, origin: &str) -> Result<Config, ConfigError> {
    let sections = split_sections(text);
    if sections.is_empty() {
        return Err(ConfigError::Empty {
            path: origin.to_string(),
        });
    }
    let config = build_config(&sections);
    validate_references(&config);
    Ok(config)
}

/// Split the raw text into sections. Blank lines and `;`/`#` comments are
/// ignored; a line containing `=` is a key/value pair for the current
/// section; any other non-blank line starts a new section.
fn split_sections(text: &str) -> Vec<RawSection> {
    let mut sections: Vec<RawSection> = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match sections.last_mut() {
                Some(section) => section.pairs.push((key, value)),
                None => warn!(
                    target: "lightclick::config",
                    line = idx + 1,
                    "Key/value pair before any section header; ignoring"
                ),
            }
        } else {
            sections.push(RawSection {
                header: line.to_string(),
                pairs: Vec::new(),
            });
        }
    }
    sections
}

/// Classify and build every section, skipping (with a report) the ones that
/// fail. Later sections with the same kind and name replace earlier ones.
fn build_config(sections: &[RawSection]) -> Config {
    let mut config = Config::default();
    for section in sections {
        let (kind, name) = match parser::classify_section(&section.header) {
            Ok(classified) => classified,
            Err(err) => {
                warn!(target: "lightclick::config", %err, "Skipping section");
                continue;
            }
        };
        match kind {
            SectionKind::Action => match parser::build_action(name, &section.pairs) {
                Ok(action) => {
                    config.actions.insert(name.to_string(), action);
                }
                Err(err) => warn!(target: "lightclick::config", %err, "Skipping action section"),
            },
            SectionKind::Button => {
                let button = parser::build_button(name, &section.pairs);
                config.buttons.insert(name.to_string(), button);
            }
            SectionKind::State => match parser::build_state(name, &section.pairs) {
                Ok(state) => {
                    config.states.insert(name.to_string(), state);
                }
                Err(err) => warn!(target: "lightclick::config", %err, "Skipping state section"),
            },
        }
    }
    config
}

/// Cross-reference check: report every dangling name so misconfigurations
/// show up at load time instead of on the first button press. Entities are
/// kept; the resolver stays defensive about these at dispatch time.
fn validate_references(config: &Config) {
    for button in config.buttons.values() {
        for click in crate::config::ClickType::ALL {
            if let Some(action_name) = button.binding(click) {
                if !config.actions.contains_key(action_name) {
                    warn!(
                        target: "lightclick::config",
                        button = %button.address,
                        %click,
                        action = action_name,
                        "Button binds an action that is not declared"
                    );
                }
            }
        }
    }
    for action in config.actions.values() {
        let refs = action
            .state_ref
            .iter()
            .chain(action.state_refs.iter())
            .chain(action.default_state_ref.iter());
        for state_name in refs {
            if !config.states.contains_key(state_name) {
                warn!(
                    target: "lightclick::config",
                    action = %action.name,
                    state = %state_name,
                    "Action references a state that is not declared"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{ActionKind, Power};
    use std::io::Write;

    const SAMPLE: &str = "\
ACTION Morning
  setstate = Bright

STATE Bright
  power = on
  brightness = 1.0

BUTTON aa:bb:cc:dd:ee:ff
  singleclick = Morning
";

    #[test]
    fn loads_minimal_config() {
        let config = load_from_str(SAMPLE).unwrap();
        assert_eq!(config.actions.len(), 1);
        assert_eq!(config.buttons.len(), 1);
        assert_eq!(config.states.len(), 1);

        let action = &config.actions["Morning"];
        assert_eq!(action.kind, ActionKind::SetState);
        assert_eq!(action.state_ref.as_deref(), Some("Bright"));

        let state = &config.states["Bright"];
        assert_eq!(state.power, Some(Power::On));
        assert_eq!(state.brightness, Some(1.0));

        let button = &config.buttons["aa:bb:cc:dd:ee:ff"];
        assert_eq!(button.single_click.as_deref(), Some("Morning"));
    }

    #[test]
    fn empty_config_is_fatal() {
        assert!(matches!(
            load_from_str("; just a comment\n\n"),
            Err(ConfigError::Empty { .. })
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_from_path("/definitely/not/here/button_actions.cfg").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn invalid_section_header_is_skipped() {
        let text = format!("FOO Bar\n  power = on\n\n{SAMPLE}");
        let config = load_from_str(&text).unwrap();
        // The FOO section and its keys are dropped; everything else loads.
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn broken_entity_is_skipped_others_load() {
        let text = format!("ACTION Broken\n  setstate = A\n  toggle = all\n\n{SAMPLE}");
        let config = load_from_str(&text).unwrap();
        assert!(!config.actions.contains_key("Broken"));
        assert!(config.actions.contains_key("Morning"));
    }

    #[test]
    fn dangling_reference_still_loads() {
        let text = "BUTTON aa:bb\n  singleclick = Ghost\n";
        let config = load_from_str(text).unwrap();
        assert_eq!(config.buttons["aa:bb"].single_click.as_deref(), Some("Ghost"));
        assert!(config.actions.is_empty());
    }

    #[test]
    fn comments_and_stray_pairs_ignored() {
        let text = "\
# top-of-file note
orphan = value
STATE Dim
  ; half brightness
  brightness = 0.5
";
        let config = load_from_str(text).unwrap();
        assert_eq!(config.states["Dim"].brightness, Some(0.5));
    }

    #[test]
    fn later_section_replaces_earlier() {
        let text = "STATE Dim\n  brightness = 0.5\nSTATE Dim\n  brightness = 0.2\n";
        let config = load_from_str(text).unwrap();
        assert_eq!(config.states["Dim"].brightness, Some(0.2));
    }
}
