#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Lightclick — a configuration-driven bridge from physical button presses to
//! smart-light actions.
//!
//! A section-based config file declares named actions, button bindings, and
//! reusable light states. At runtime, button events arrive from a transport
//! bridge, the resolver looks up the bound action and expands it into a
//! concrete command, and the dispatcher hands that command to the light API.
//!
//! Module map:
//! - `config`: Section grammar, entity builders, loader, and the immutable snapshot.
//! - `resolver`: Pure lookup/expansion from (button, click type) to a command.
//! - `dispatch`: Event handling, queued-click suppression, command routing.
//! - `light`: The light-service port, its HTTP client and dry-run implementations.
//! - `sources`: Button-event sources (stdin, TCP bridge).
//! - `discovery`: Config-authoring mode (light listings, button address echo).
//!
//! Use `lightclick::prelude::*` to bring commonly used items into scope quickly.

/// Public module: configuration (grammar, builders, loader, snapshot).
pub mod config;
/// Public module: config-authoring discovery mode.
pub mod discovery;
/// Public module: event handling and command routing.
pub mod dispatch;
/// Public module: light-service port and implementations.
pub mod light;
/// Public module: action resolution (pure, no I/O).
pub mod resolver;
/// Public module: button-event sources (stdin, tcp).
pub mod sources;

/// Crate-level constants for consumers that want to inspect package metadata at runtime.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version (e.g., "0.1.0").
#[inline]
pub const fn version() -> &'static str {
    PKG_VERSION
}

/// Initialize tracing (logging) with a reasonable default.
/// - Honors the `RUST_LOG` environment variable if set.
/// - Falls back to `info` level.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_tracing() {
    use tracing::Level;
    use tracing_subscriber::fmt;

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| match s.to_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        })
        .unwrap_or(Level::INFO);

    // Ignore the error if the global subscriber was already set.
    let _ = fmt().with_max_level(level).try_init();
}

/// A convenient set of exports for most consumers.
///
/// Bring this into scope with:
/// `use lightclick::prelude::*;`
pub mod prelude {
    // Common result/error handling
    pub use anyhow::{Context, Error, Result, anyhow, bail, ensure};

    // Serialization
    pub use serde::{Deserialize, Serialize};

    // Tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};

    // Frequently used internal modules and types
    pub use crate as lightclick;
    pub use crate::config::{self, ClickType, Config};
    pub use crate::dispatch::Dispatcher;
    pub use crate::light::LightService;
    pub use crate::resolver::{self, Command};
    pub use crate::sources::{self, ButtonEvent};
}
