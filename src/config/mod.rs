//! Configuration module for Lightclick.
//!
//! This module wires together the data models, the section grammar, and the
//! loader used throughout the crate. Import from here for a convenient,
//! stable API.
//!
//! Example:
//! use lightclick::config::{Config, load_from_path};
//!
//! let cfg = load_from_path("button_actions.cfg")?;

pub mod loader;
pub mod models;
pub mod parser;

// Re-export core data models
pub use models::{Action, ActionKind, Button, ClickType, Config, Power, State};

// Re-export grammar and loader utilities
pub use loader::{ConfigError, load_from_path, load_from_str};
pub use parser::{BuildError, SectionError, SectionKind, classify_section};
