use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification of a button press pattern.
///
/// The transport bridge reports these in snake_case on the wire
/// (`"single_click"`, `"double_click"`, `"hold"`).
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClickType {
    SingleClick,
    DoubleClick,
    Hold,
}

impl ClickType {
    /// All click types, in binding-field order.
    pub const ALL: [Self; 3] = [Self::SingleClick, Self::DoubleClick, Self::Hold];
}

impl fmt::Display for ClickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleClick => write!(f, "single click"),
            Self::DoubleClick => write!(f, "double click"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// The closed vocabulary of action kinds. The kind determines which other
/// fields of an [`Action`] are mandatory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionKind {
    SetState,
    SetStates,
    Toggle,
    Breathe,
    Pulse,
    Cycle,
    ActivateScene,
}

impl ActionKind {
    /// Match a config key against the kind vocabulary, insensitive to case
    /// and spacing (`Set State`, `SETSTATE`, and `set_state` all match).
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "setstate" => Some(Self::SetState),
            "setstates" => Some(Self::SetStates),
            "toggle" => Some(Self::Toggle),
            "breathe" => Some(Self::Breathe),
            "pulse" => Some(Self::Pulse),
            "cycle" => Some(Self::Cycle),
            "activatescene" => Some(Self::ActivateScene),
            _ => None,
        }
    }

    /// Does this kind target lights through a selector expression?
    pub fn needs_selector(self) -> bool {
        matches!(self, Self::Toggle | Self::Breathe | Self::Pulse | Self::Cycle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetState => "setstate",
            Self::SetStates => "setstates",
            Self::Toggle => "toggle",
            Self::Breathe => "breathe",
            Self::Pulse => "pulse",
            Self::Cycle => "cycle",
            Self::ActivateScene => "activatescene",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named light action declared by an `ACTION` section.
///
/// Which optional fields are populated is dictated by `kind`; the builder
/// enforces the mandatory ones at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub kind: ActionKind,
    /// Target selector, required for toggle/breathe/pulse/cycle.
    pub selector: Option<String>,
    /// Referenced state name, required for setstate.
    pub state_ref: Option<String>,
    /// Ordered referenced state names, required for setstates.
    pub state_refs: Vec<String>,
    /// Fallback state name, only meaningful with setstates.
    pub default_state_ref: Option<String>,
    /// Scene identifier, required for activatescene.
    pub scene_id: Option<String>,
    /// Transition duration in seconds.
    pub duration: Option<f64>,
}

/// A physical button declared by a `BUTTON` section, keyed by its hardware
/// address. Each binding is either empty or the name of an [`Action`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Button {
    pub address: String,
    pub single_click: Option<String>,
    pub double_click: Option<String>,
    pub hold: Option<String>,
}

impl Button {
    /// The action name bound to the given click type, if any.
    pub fn binding(&self, click: ClickType) -> Option<&str> {
        match click {
            ClickType::SingleClick => self.single_click.as_deref(),
            ClickType::DoubleClick => self.double_click.as_deref(),
            ClickType::Hold => self.hold.as_deref(),
        }
    }
}

/// Light power setting.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// A named, reusable bundle of light properties declared by a `STATE`
/// section. Having at least one of power/color/brightness set is advisory,
/// not enforced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub name: String,
    pub power: Option<Power>,
    /// Service-specific color spec, passed through verbatim.
    pub color: Option<String>,
    /// 0.0 to 1.0.
    pub brightness: Option<f64>,
    /// Transition duration in seconds.
    pub duration: Option<f64>,
    pub selector: Option<String>,
}

/// The immutable configuration snapshot: three name-keyed maps built once at
/// load and held read-only for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub actions: BTreeMap<String, Action>,
    pub buttons: BTreeMap<String, Button>,
    pub states: BTreeMap<String, State>,
}

impl Config {
    /// Total number of entities across all three maps.
    pub fn len(&self) -> usize {
        self.actions.len() + self.buttons.len() + self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
