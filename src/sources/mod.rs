/*!
Button-event sources.

The Bluetooth session daemon is an external collaborator; this crate only
sees its notifications as newline-delimited JSON, one event per line:

```text
{"event":"click","address":"aa:bb:cc:dd:ee:ff","click_type":"single_click","was_queued":false}
{"event":"connection","address":"aa:bb:cc:dd:ee:ff","status":"ready"}
```

Concrete implementations live in their own files:

- `stdin_source.rs` -> `StdinSource` (NDJSON from standard input)
- `tcp.rs`          -> `TcpSource`   (NDJSON over TCP from the bridge daemon)

Each source is responsible for:
- Parsing raw lines into [`ButtonEvent`]s
- Pushing events via `Sender<ButtonEvent>` while respecting backpressure
- Logging malformed input and continuing (never panicking inside tasks)
- Ending cleanly when the channel closes
*/

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::info;

use crate::config::ClickType;

pub mod stdin_source;
pub mod tcp;

pub use stdin_source::StdinSource;
pub use tcp::TcpSource;

/// A notification from the button transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonEvent {
    /// Hardware address of the button.
    pub address: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// What happened at the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// Connection status change for a verified button.
    Connection { status: String },
    /// A button press. `was_queued` marks presses buffered while the button
    /// was disconnected and replayed on reconnect; those are stale and must
    /// not trigger light actions.
    Click {
        click_type: ClickType,
        #[serde(default)]
        was_queued: bool,
    },
}

impl ButtonEvent {
    /// Parse one NDJSON line into an event.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Trait implemented by all button-event sources.
///
/// A source spawns an asynchronous task that produces events and sends them
/// into the provided channel. Tasks log and continue on bad input, and exit
/// gracefully when the channel is closed.
pub trait EventSource: Send + Sync {
    /// Static human-readable identifier (used in logs).
    fn name(&self) -> &'static str;

    /// Start the source in the background.
    fn start(&self, sender: Sender<ButtonEvent>) -> JoinHandle<()>;
}

/// Construct the configured source: a TCP listener when `listen` is given,
/// stdin otherwise.
pub fn build_source(listen: Option<&str>) -> Box<dyn EventSource> {
    match listen {
        Some(bind) => Box::new(TcpSource::new(bind.to_string())),
        None => Box::new(StdinSource::new()),
    }
}

/// Spawn a source, returning its `JoinHandle`. The application typically
/// keeps the handle detached and relies on process lifetime for shutdown.
pub fn spawn_source(source: &dyn EventSource, sender: Sender<ButtonEvent>) -> JoinHandle<()> {
    info!(
        target: "lightclick::sources",
        source = %source.name(),
        "Starting source task"
    );
    source.start(sender)
}
