//! Supervised TCP link to the simulator.
//!
//! One owning task per link drives a connect/serve/backoff cycle and is the
//! only place the connection state changes. Callers talk to it through
//! [`SimulatorLink`], a cheap-to-clone handle. Sends are best-effort: a shot
//! arriving while the link is down is dropped (and logged), never queued.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::gsp::protocol::{ShotMessage, SimulatorMessage};
use crate::gsp::reframe;
use crate::state::ConnectionState;

/// Simulator target. The peer is a local process on a fixed port, so this is
/// a constant rather than part of the configuration surface.
pub const DEFAULT_ADDR: &str = "127.0.0.1:921";

/// Fixed delay between reconnect attempts.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Handle to a running simulator link.
#[derive(Clone)]
pub struct SimulatorLink {
    commands: mpsc::Sender<LinkCommand>,
    state: watch::Receiver<ConnectionState>,
    stopped: watch::Receiver<bool>,
}

enum LinkCommand {
    Send(ShotMessage),
    Stop,
}

impl SimulatorLink {
    /// Spawn the owning task. Decoded inbound messages are delivered on
    /// `inbound`.
    pub fn spawn(addr: impl Into<String>, inbound: mpsc::Sender<SimulatorMessage>) -> Self {
        Self::spawn_with_backoff(addr.into(), RECONNECT_BACKOFF, inbound)
    }

    fn spawn_with_backoff(
        addr: String,
        backoff: Duration,
        inbound: mpsc::Sender<SimulatorMessage>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (stopped_tx, stopped_rx) = watch::channel(false);
        tokio::spawn(run(addr, backoff, cmd_rx, inbound, state_tx, stopped_tx));
        Self {
            commands: cmd_tx,
            state: state_rx,
            stopped: stopped_rx,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Hand an envelope to the link for delivery. Best-effort: failures are
    /// logged by the owning task, not surfaced here.
    pub async fn send(&self, message: ShotMessage) {
        if self.commands.send(LinkCommand::Send(message)).await.is_err() {
            warn!(target: "gsp", "link task is gone; dropping outbound message");
        }
    }

    /// Flag the stop request, trigger disconnect, and wait until the owning
    /// task acknowledges shutdown. Idempotent; after this returns no further
    /// reconnect attempt occurs.
    pub async fn disconnect_and_stop(&self) {
        let _ = self.commands.send(LinkCommand::Stop).await;
        let mut stopped = self.stopped.clone();
        // Err means the task is already gone, which is as stopped as it gets.
        let _ = stopped.wait_for(|s| *s).await;
    }
}

// ---------------------------------------------------------------------------
// Owning task
// ---------------------------------------------------------------------------

async fn run(
    addr: String,
    backoff: Duration,
    mut commands: mpsc::Receiver<LinkCommand>,
    inbound: mpsc::Sender<SimulatorMessage>,
    state: watch::Sender<ConnectionState>,
    stopped: watch::Sender<bool>,
) {
    loop {
        let _ = state.send(ConnectionState::Connecting);
        let Some(mut stream) = connect(&addr, backoff, &mut commands).await else {
            break; // stop requested while connecting
        };
        let _ = state.send(ConnectionState::Connected);
        info!(target: "gsp", "connected to simulator at {addr}");

        let stop = serve(&mut stream, &mut commands, &inbound).await;
        drop(stream);
        let _ = state.send(ConnectionState::Disconnected);
        if stop || wait_backoff(backoff, &mut commands).await {
            break;
        }
    }
    let _ = state.send(ConnectionState::Disconnected);
    let _ = stopped.send(true);
}

/// Attempt connections until one succeeds, backing off between failures.
/// Returns `None` if a stop request arrives first.
async fn connect(
    addr: &str,
    backoff: Duration,
    commands: &mut mpsc::Receiver<LinkCommand>,
) -> Option<TcpStream> {
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Some(stream),
            Err(e) => {
                log_socket_error(&e);
                if wait_backoff(backoff, commands).await {
                    return None;
                }
            }
        }
    }
}

/// Serve one established connection. Returns true if a stop was requested.
async fn serve(
    stream: &mut TcpStream,
    commands: &mut mpsc::Receiver<LinkCommand>,
    inbound: &mpsc::Sender<SimulatorMessage>,
) -> bool {
    let mut buf = vec![0u8; 4096];
    loop {
        tokio::select! {
            res = stream.read(&mut buf) => match res {
                Ok(0) => {
                    error!(target: "gsp", "simulator closed the connection");
                    return false;
                }
                Ok(n) => handle_chunk(&buf[..n], inbound).await,
                Err(e) => {
                    log_socket_error(&e);
                    return false;
                }
            },
            cmd = commands.recv() => match cmd {
                Some(LinkCommand::Send(message)) => {
                    match serde_json::to_string(&message) {
                        Ok(text) => {
                            debug!(target: "gsp", ">> {text}");
                            if let Err(e) = stream.write_all(text.as_bytes()).await {
                                // Not retried; the reconnect cycle owns recovery.
                                error!(target: "gsp", "send failed: {e}");
                                return false;
                            }
                        }
                        Err(e) => error!(target: "gsp", "could not encode envelope: {e}"),
                    }
                }
                Some(LinkCommand::Stop) | None => return true,
            },
        }
    }
}

/// Sleep out the backoff while still answering commands. Returns true if a
/// stop request arrives during the wait.
async fn wait_backoff(backoff: Duration, commands: &mut mpsc::Receiver<LinkCommand>) -> bool {
    let deadline = Instant::now() + backoff;
    loop {
        tokio::select! {
            _ = sleep_until(deadline) => return false,
            cmd = commands.recv() => match cmd {
                Some(LinkCommand::Send(_)) => {
                    warn!(target: "gsp", "not connected; dropping outbound message");
                }
                Some(LinkCommand::Stop) | None => return true,
            },
        }
    }
}

async fn handle_chunk(bytes: &[u8], inbound: &mpsc::Sender<SimulatorMessage>) {
    let text = String::from_utf8_lossy(bytes);
    debug!(target: "gsp", "<< {text}");
    match reframe::decode(&text) {
        Ok(messages) => {
            for message in messages {
                if inbound.send(message).await.is_err() {
                    return; // receiver gone; nothing downstream to deliver to
                }
            }
        }
        Err(e) => error!(target: "gsp", "error parsing inbound chunk: {e}"),
    }
}

fn log_socket_error(e: &io::Error) {
    // Idle-poll timeouts are routine; everything else is worth a line.
    if e.kind() != io::ErrorKind::TimedOut {
        error!(target: "gsp", "socket error: {e}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    const FAST: Duration = Duration::from_millis(50);

    async fn listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    #[tokio::test]
    async fn delivers_envelopes_and_inbound_messages() {
        let (listener, addr) = listener().await;
        let (inbound_tx, mut inbound_rx) = mpsc::channel(8);
        let link = SimulatorLink::spawn_with_backoff(addr, FAST, inbound_tx);

        let (mut peer, _) = listener.accept().await.unwrap();
        link.send(ShotMessage::ready(true)).await;

        let mut buf = vec![0u8; 4096];
        let n = peer.read(&mut buf).await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(sent["ShotDataOptions"]["LaunchMonitorIsReady"], true);

        peer.write_all(br#"{"Code":201,"Player":{"Club":5}}"#)
            .await
            .unwrap();
        let msg = timeout(Duration::from_secs(2), inbound_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.club(), Some(5));
    }

    #[tokio::test]
    async fn reconnects_after_peer_disconnect() {
        let (listener, addr) = listener().await;
        let (inbound_tx, _inbound_rx) = mpsc::channel(8);
        let _link = SimulatorLink::spawn_with_backoff(addr, FAST, inbound_tx);

        let (peer, _) = listener.accept().await.unwrap();
        drop(peer);

        // The link should come back on its own after the backoff.
        let second = timeout(Duration::from_secs(2), listener.accept()).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn no_reconnect_after_stop() {
        let (listener, addr) = listener().await;
        let (inbound_tx, _inbound_rx) = mpsc::channel(8);
        let link = SimulatorLink::spawn_with_backoff(addr, FAST, inbound_tx);

        let (peer, _) = listener.accept().await.unwrap();
        link.disconnect_and_stop().await;
        assert_eq!(link.state(), ConnectionState::Disconnected);

        // The transport reporting disconnected after the stop must not
        // trigger another attempt.
        drop(peer);
        let attempt = timeout(Duration::from_millis(300), listener.accept()).await;
        assert!(attempt.is_err(), "link reconnected after stop");
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (listener, addr) = listener().await;
        let (inbound_tx, _inbound_rx) = mpsc::channel(8);
        let link = SimulatorLink::spawn_with_backoff(addr, FAST, inbound_tx);
        let _ = listener.accept().await.unwrap();

        link.disconnect_and_stop().await;
        link.disconnect_and_stop().await;
    }
}
