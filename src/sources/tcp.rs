//! TCP event source.
//!
//! Listens on a bind address for connections from the button bridge daemon
//! and reads newline-delimited JSON button events from each connection.
//! The bridge reconnects after restarts, so the accept loop keeps running;
//! connections are handled one line at a time and malformed lines are
//! logged and skipped.

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::TcpListener,
    sync::mpsc::Sender,
    task::JoinHandle,
};
use tracing::{error, info, trace, warn};

use super::{ButtonEvent, EventSource};

/// Source that accepts NDJSON button events over TCP.
#[derive(Debug, Clone)]
pub struct TcpSource {
    bind: String,
}

impl TcpSource {
    /// Create a new `TcpSource` listening on `bind` (e.g. "127.0.0.1:5551").
    pub fn new(bind: String) -> Self {
        Self { bind }
    }
}

impl EventSource for TcpSource {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn start(&self, sender: Sender<ButtonEvent>) -> JoinHandle<()> {
        let bind = self.bind.clone();

        tokio::spawn(async move {
            let listener = match TcpListener::bind(&bind).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!(
                        target: "lightclick::sources",
                        %bind, error = %e,
                        "Failed to bind TCP source; terminating task"
                    );
                    return;
                }
            };
            info!(target: "lightclick::sources", %bind, "TcpSource listening");

            loop {
                let (stream, peer) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(
                            target: "lightclick::sources",
                            error = %e,
                            "Failed to accept connection; continuing"
                        );
                        continue;
                    }
                };
                info!(target: "lightclick::sources", %peer, "Bridge connected");

                let mut lines = BufReader::new(stream).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            let raw = line.trim();
                            if raw.is_empty() {
                                continue;
                            }
                            match ButtonEvent::parse(raw) {
                                Ok(event) => {
                                    trace!(
                                        target: "lightclick::sources",
                                        address = %event.address,
                                        "Parsed button event from bridge"
                                    );
                                    if sender.send(event).await.is_err() {
                                        error!(
                                            target: "lightclick::sources",
                                            "Channel closed; TcpSource terminating"
                                        );
                                        return;
                                    }
                                }
                                Err(e) => {
                                    warn!(
                                        target: "lightclick::sources",
                                        error = %e,
                                        line = raw,
                                        "Failed to parse bridge event line"
                                    );
                                }
                            }
                        }
                        Ok(None) => {
                            info!(target: "lightclick::sources", %peer, "Bridge disconnected");
                            break;
                        }
                        Err(e) => {
                            warn!(
                                target: "lightclick::sources",
                                %peer, error = %e,
                                "Error reading from bridge connection"
                            );
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn forwards_events_and_skips_malformed_lines() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // free the port for the source

        let (tx, mut rx) = mpsc::channel::<ButtonEvent>(8);
        let source = TcpSource::new(addr.to_string());
        let handle = source.start(tx);

        // Give the listener a moment to bind, then connect as the bridge.
        let mut stream = None;
        for _ in 0..100 {
            match tokio::net::TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        }
        let mut stream = stream.expect("source did not start listening");
        stream
            .write_all(
                b"not json\n{\"event\":\"click\",\"address\":\"aa:bb\",\"click_type\":\"hold\"}\n",
            )
            .await
            .unwrap();
        stream.flush().await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.address, "aa:bb");
        handle.abort();
    }
}
