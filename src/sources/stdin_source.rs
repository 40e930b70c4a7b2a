//! Stdin event source.
//!
//! Reads newline-delimited JSON button events from standard input, which is
//! how a bridge process pipes Flic notifications in:
//!
//! ```text
//! flic-bridge | lightclick button_actions.cfg
//! ```
//!
//! Malformed lines are logged with `warn!` and ignored; EOF or a closed
//! channel terminates the task gracefully.

use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::mpsc::Sender,
    task::JoinHandle,
};
use tracing::{error, info, trace, warn};

use super::{ButtonEvent, EventSource};

/// Source that reads newline-delimited JSON button events from stdin.
#[derive(Debug, Clone, Default)]
pub struct StdinSource;

impl StdinSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for StdinSource {
    fn name(&self) -> &'static str {
        "stdin"
    }

    fn start(&self, sender: Sender<ButtonEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(target: "lightclick::sources", "StdinSource task started (reading lines)");
            let stdin = io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        info!(target: "lightclick::sources", "EOF on stdin; StdinSource exiting");
                        break;
                    }
                    Ok(_) => {
                        let raw = line.trim();
                        if raw.is_empty() {
                            continue;
                        }
                        match ButtonEvent::parse(raw) {
                            Ok(event) => {
                                trace!(
                                    target: "lightclick::sources",
                                    address = %event.address,
                                    "Parsed button event from stdin line"
                                );
                                if sender.send(event).await.is_err() {
                                    error!(
                                        target: "lightclick::sources",
                                        "Channel closed while sending stdin event; terminating task"
                                    );
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(
                                    target: "lightclick::sources",
                                    error = %e,
                                    line = raw,
                                    "Failed to parse stdin event line"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        warn!(
                            target: "lightclick::sources",
                            error = %e,
                            "Error reading from stdin; terminating task"
                        );
                        break;
                    }
                }
            }

            trace!(target: "lightclick::sources", "StdinSource task ended");
        })
    }
}
