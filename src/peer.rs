// File: peer.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

//! A stand-in JDWP endpoint used to drive the prober through its positive
//! and negative paths without a real JVM.

use crate::config::DEFAULT_PEER_READ_TIMEOUT;
use crate::error::{PeerError, ProbeError};
use crate::handshake::{
    is_handshake_request, printable, JDWP_HANDSHAKE_RESPONSE, NOT_JDWP_MARKER, PEER_READ_CAP,
};
use log::{debug, info, trace, warn};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub host: String,
    pub port: u16,
    pub vulnerable: bool,
    pub read_timeout: Duration,
}

impl PeerConfig {
    pub fn new(host: impl Into<String>, port: u16, vulnerable: bool) -> Self {
        Self {
            host: host.into(),
            port,
            vulnerable,
            read_timeout: DEFAULT_PEER_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// Terminal state of one accepted connection. Every state is followed by close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    MatchedVulnerable,
    MatchedNotVulnerable,
    NoMatch,
    TimedOut,
    Reset,
    Failed,
}

/// Number of recent session outcomes a running peer remembers.
pub const SESSION_HISTORY: usize = 256;

/// Served-connection counter plus the most recent outcomes, oldest first.
#[derive(Debug, Default)]
struct SessionHistory {
    served: usize,
    recent: VecDeque<SessionOutcome>,
}

impl SessionHistory {
    fn record(&mut self, outcome: SessionOutcome) {
        self.served += 1;
        if self.recent.len() == SESSION_HISTORY {
            self.recent.pop_front();
        }
        self.recent.push_back(outcome);
    }
}

type SessionLog = Arc<Mutex<SessionHistory>>;

pub struct SimulatedPeer {
    config: PeerConfig,
    local_addr: Option<SocketAddr>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    sessions: SessionLog,
}

impl SimulatedPeer {
    pub fn new(config: PeerConfig) -> Self {
        Self {
            config,
            local_addr: None,
            shutdown: None,
            task: None,
            sessions: Arc::new(Mutex::new(SessionHistory::default())),
        }
    }

    /// Bound address while running. Differs from the configured port when that was 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Outcomes of the most recent sessions (up to `SESSION_HISTORY`), in completion order.
    pub fn sessions(&self) -> Vec<SessionOutcome> {
        match self.sessions.lock() {
            Ok(history) => history.recent.iter().copied().collect(),
            Err(poisoned) => poisoned.into_inner().recent.iter().copied().collect(),
        }
    }

    /// Total number of connections served since construction.
    pub fn served(&self) -> usize {
        match self.sessions.lock() {
            Ok(history) => history.served,
            Err(poisoned) => poisoned.into_inner().served,
        }
    }

    /// Returns once the listener is bound and accepting.
    pub async fn start(&mut self) -> Result<SocketAddr, PeerError> {
        if self.is_running() {
            return Err(PeerError::AlreadyRunning);
        }

        let addr = resolve(&self.config.host, self.config.port).await?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| PeerError::Bind(addr, e))?;
        let local_addr = listener.local_addr().map_err(|e| PeerError::Bind(addr, e))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let vulnerable = self.config.vulnerable;
        let read_timeout = self.config.read_timeout;
        let sessions = Arc::clone(&self.sessions);

        self.task = Some(tokio::spawn(async move {
            accept_loop(listener, vulnerable, read_timeout, shutdown_rx, sessions).await;
        }));
        self.shutdown = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        info!(
            "Mock JDWP peer serving on {} (vulnerable={})",
            local_addr, vulnerable
        );
        Ok(local_addr)
    }

    /// Closes the listener and waits until the accept task has finished.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Mock JDWP peer task ended abnormally: {}", e);
            }
            info!("Mock JDWP peer stopped.");
        }
        self.local_addr = None;
    }
}

impl Drop for SimulatedPeer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, PeerError> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| PeerError::InvalidAddress(format!("{}:{}", host, port)))?;
    addrs
        .next()
        .ok_or_else(|| PeerError::InvalidAddress(format!("{}:{}", host, port)))
}

async fn accept_loop(
    listener: TcpListener,
    vulnerable: bool,
    read_timeout: Duration,
    mut shutdown: oneshot::Receiver<()>,
    sessions: SessionLog,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    let outcome = handle_connection(stream, remote, vulnerable, read_timeout).await;
                    match sessions.lock() {
                        Ok(mut history) => history.record(outcome),
                        Err(poisoned) => poisoned.into_inner().record(outcome),
                    }
                }
                Err(e) => {
                    warn!("Mock JDWP peer accept error: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
    drop(listener);
}

/// Serves one connection and always closes it, whichever branch was taken.
pub async fn handle_connection(
    mut stream: TcpStream,
    remote: SocketAddr,
    vulnerable: bool,
    read_timeout: Duration,
) -> SessionOutcome {
    debug!("Received connection from {}", remote);

    let outcome = respond(&mut stream, vulnerable, read_timeout).await;

    if let Err(e) = stream.shutdown().await {
        trace!("Shutdown of {} failed: {}", remote, e);
    }
    debug!("Closing client connection {} ({:?})", remote, outcome);
    outcome
}

async fn respond(stream: &mut TcpStream, vulnerable: bool, read_timeout: Duration) -> SessionOutcome {
    let mut buffer = [0u8; PEER_READ_CAP];
    let read = match timeout(read_timeout, stream.read(&mut buffer)).await {
        Ok(Ok(read)) => read,
        Ok(Err(e)) => return classify(e),
        Err(_) => {
            debug!("Timeout waiting for client data");
            return SessionOutcome::TimedOut;
        }
    };

    let received = &buffer[..read];
    trace!("Received from client: '{}'", printable(received));

    if !is_handshake_request(received) {
        debug!("Client sent incorrect handshake");
        return SessionOutcome::NoMatch;
    }

    let (reply, outcome) = if vulnerable {
        (JDWP_HANDSHAKE_RESPONSE, SessionOutcome::MatchedVulnerable)
    } else {
        (NOT_JDWP_MARKER, SessionOutcome::MatchedNotVulnerable)
    };

    if let Err(e) = stream.write_all(reply).await {
        return classify(e);
    }
    if let Err(e) = stream.flush().await {
        return classify(e);
    }
    outcome
}

fn classify(error: std::io::Error) -> SessionOutcome {
    match ProbeError::from(error) {
        ProbeError::ConnectionReset => {
            debug!("Client closed the connection unexpectedly");
            SessionOutcome::Reset
        }
        e => {
            warn!("Error handling client: {}", e);
            SessionOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::JDWP_HANDSHAKE_REQUEST;

    async fn connected_pair() -> (TcpStream, TcpStream, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, remote) = listener.accept().await.unwrap();
        (client, server, remote)
    }

    async fn read_to_end(mut client: TcpStream) -> Vec<u8> {
        let mut reply = Vec::new();
        let _ = client.read_to_end(&mut reply).await;
        reply
    }

    #[test]
    fn test_peer_config_defaults() {
        let config = PeerConfig::new("127.0.0.1", 5005, true);
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert!(config.vulnerable);

        let config = config.with_read_timeout(Duration::from_millis(10));
        assert_eq!(config.read_timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_session_history_is_bounded() {
        let mut history = SessionHistory::default();
        history.record(SessionOutcome::Reset);
        for _ in 0..SESSION_HISTORY {
            history.record(SessionOutcome::NoMatch);
        }

        assert_eq!(history.served, SESSION_HISTORY + 1);
        assert_eq!(history.recent.len(), SESSION_HISTORY);
        assert!(history.recent.iter().all(|o| *o == SessionOutcome::NoMatch));
    }

    #[test]
    fn test_classify_io_errors() {
        use std::io::{Error, ErrorKind};

        assert_eq!(
            classify(Error::from(ErrorKind::ConnectionReset)),
            SessionOutcome::Reset
        );
        assert_eq!(
            classify(Error::from(ErrorKind::ConnectionAborted)),
            SessionOutcome::Reset
        );
        assert_eq!(
            classify(Error::from(ErrorKind::BrokenPipe)),
            SessionOutcome::Failed
        );
        assert_eq!(
            classify(Error::from(ErrorKind::PermissionDenied)),
            SessionOutcome::Failed
        );
    }

    #[tokio::test]
    async fn test_vulnerable_branch_echoes_token() {
        let (mut client, server, remote) = connected_pair().await;
        client.write_all(JDWP_HANDSHAKE_REQUEST).await.unwrap();

        let outcome = handle_connection(server, remote, true, Duration::from_secs(2)).await;

        assert_eq!(outcome, SessionOutcome::MatchedVulnerable);
        assert_eq!(read_to_end(client).await, JDWP_HANDSHAKE_RESPONSE);
    }

    #[tokio::test]
    async fn test_not_vulnerable_branch_sends_marker() {
        let (mut client, server, remote) = connected_pair().await;
        client.write_all(JDWP_HANDSHAKE_REQUEST).await.unwrap();

        let outcome = handle_connection(server, remote, false, Duration::from_secs(2)).await;

        assert_eq!(outcome, SessionOutcome::MatchedNotVulnerable);
        assert_eq!(read_to_end(client).await, NOT_JDWP_MARKER);
    }

    #[tokio::test]
    async fn test_wrong_request_gets_no_reply() {
        let (mut client, server, remote) = connected_pair().await;
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

        let outcome = handle_connection(server, remote, true, Duration::from_secs(2)).await;

        assert_eq!(outcome, SessionOutcome::NoMatch);
        assert!(read_to_end(client).await.is_empty());
    }

    #[tokio::test]
    async fn test_silent_client_times_out() {
        let (client, server, remote) = connected_pair().await;

        let outcome = handle_connection(server, remote, true, Duration::from_millis(100)).await;

        assert_eq!(outcome, SessionOutcome::TimedOut);
        assert!(read_to_end(client).await.is_empty());
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let mut peer = SimulatedPeer::new(PeerConfig::new("127.0.0.1", 0, true));
        assert!(!peer.is_running());

        let addr = peer.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(peer.local_addr(), Some(addr));
        assert!(matches!(peer.start().await, Err(PeerError::AlreadyRunning)));

        peer.stop().await;
        assert!(!peer.is_running());
        assert_eq!(peer.local_addr(), None);

        // The port is free again once stop() has returned.
        let rebound = TcpListener::bind(addr).await;
        assert!(rebound.is_ok());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let holder = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = holder.local_addr().unwrap().port();

        let mut peer = SimulatedPeer::new(PeerConfig::new("127.0.0.1", port, true));
        assert!(matches!(peer.start().await, Err(PeerError::Bind(_, _))));
        assert!(!peer.is_running());
    }
}
