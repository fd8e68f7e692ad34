//! TCP transport to a device-side endpoint
//!
//! Frames are newline-delimited JSON. On attach the transport ships the
//! agent script as a `load` frame, then splits into a writer task draining
//! the outbound queue and a reader task forwarding inbound frames to the
//! dispatcher channel. A dropped connection is logged and the transport
//! marks itself disconnected; waiting requests are left hanging, matching
//! the no-failover contract.

use crate::error::ProbeError;
use crate::traits::TargetTransport;
use common::TargetKind;
use router::dispatch::SourceMessage;
use router::{InboundMessage, OutboundMessage};
use serde_json::json;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Transport over one TCP connection to an instrumented target
pub struct TcpTransport {
    kind: TargetKind,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    connected: Arc<AtomicBool>,
}

impl TcpTransport {
    /// Connect to `endpoint`, ship the agent `script`, and spawn the
    /// reader/writer tasks. Inbound frames go to `inbound`; both tasks stop
    /// on `shutdown`.
    pub async fn connect(
        kind: TargetKind,
        endpoint: &str,
        script: &str,
        inbound: mpsc::UnboundedSender<SourceMessage>,
        shutdown: CancellationToken,
    ) -> Result<Self, ProbeError> {
        let stream = TcpStream::connect(endpoint)
            .await
            .map_err(|source| ProbeError::Connect {
                kind,
                endpoint: endpoint.to_owned(),
                source,
            })?;
        info!(target = %kind, endpoint, "attached to target");

        let (read_half, write_half) = stream.into_split();
        let connected = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::unbounded_channel();

        let load_frame = serde_json::to_string(&json!({"type": "load", "script": script}))?;
        tokio::spawn(write_loop(
            kind,
            write_half,
            load_frame,
            rx,
            Arc::clone(&connected),
            shutdown.clone(),
        ));
        tokio::spawn(read_loop(
            kind,
            read_half,
            inbound,
            Arc::clone(&connected),
            shutdown,
        ));

        Ok(Self {
            kind,
            outbound: tx,
            connected,
        })
    }
}

impl TargetTransport for TcpTransport {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn post(&self, message: &OutboundMessage) -> Result<(), ProbeError> {
        if !self.is_connected() {
            return Err(ProbeError::Disconnected { kind: self.kind });
        }
        self.outbound
            .send(message.clone())
            .map_err(|_| ProbeError::Disconnected { kind: self.kind })
    }
}

async fn write_loop(
    kind: TargetKind,
    mut write_half: OwnedWriteHalf,
    load_frame: String,
    mut outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    // The script goes first; the device side loads it once per attachment.
    if let Err(e) = write_line(&mut write_half, &load_frame).await {
        error!(target = %kind, %e, "failed to deliver agent script");
        connected.store(false, Ordering::SeqCst);
        return;
    }
    debug!(target = %kind, "agent script delivered");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = outbound.recv() => {
                let Some(message) = next else { break };
                let line = match serde_json::to_string(&message) {
                    Ok(line) => line,
                    Err(e) => {
                        error!(target = %kind, %e, "failed to encode outbound message");
                        continue;
                    }
                };
                if let Err(e) = write_line(&mut write_half, &line).await {
                    warn!(target = %kind, %e, "write to target failed; marking disconnected");
                    connected.store(false, Ordering::SeqCst);
                    break;
                }
                debug!(target = %kind, "forwarded outbound message");
            }
        }
    }
}

async fn read_loop(
    kind: TargetKind,
    read_half: OwnedReadHalf,
    inbound: mpsc::UnboundedSender<SourceMessage>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => match serde_json::from_str::<InboundMessage>(&line) {
                    Ok(message) => {
                        if inbound.send(SourceMessage { source: kind, message }).is_err() {
                            // Dispatcher gone; the process is shutting down.
                            break;
                        }
                    }
                    Err(e) => warn!(target = %kind, %e, "unparseable inbound frame; ignoring"),
                },
                Ok(None) => {
                    warn!(target = %kind, "target closed the connection");
                    connected.store(false, Ordering::SeqCst);
                    break;
                }
                Err(e) => {
                    warn!(target = %kind, %e, "read from target failed");
                    connected.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }
}

async fn write_line(write_half: &mut OwnedWriteHalf, line: &str) -> io::Result<()> {
    write_half.write_all(line.as_bytes()).await?;
    write_half.write_all(b"\n").await
}
