// File: prober.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ConfigParameter;
use crate::error::{HandshakeResult, ProbeError};
use crate::handshake::{
    is_handshake_response, printable, JDWP_HANDSHAKE_REQUEST, PROBE_READ_CAP,
};
use log::{debug, trace, warn};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Result of a single handshake attempt.
///
/// `Unreachable` means no TCP session was established. `Rejected` means a
/// session existed but the exact handshake echo never arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Confirmed,
    Rejected,
    Unreachable,
}

impl ProbeOutcome {
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checks whether `host:port` answers the JDWP handshake.
///
/// Uses the default timeouts and never fails: every network fault becomes `false`.
pub async fn probe(host: &str, port: u16) -> bool {
    probe_with(host, port, &ConfigParameter::default())
        .await
        .is_vulnerable()
}

/// One connection, one write, one bounded read. No retries.
pub async fn probe_with(host: &str, port: u16, config: &ConfigParameter) -> ProbeOutcome {
    let mut stream = match connect(host, port, config.connect_timeout()).await {
        Ok(stream) => stream,
        Err(e) if e.is_connect_failure() => {
            debug!("Connection to {}:{} failed: {}", host, port, e);
            return ProbeOutcome::Unreachable;
        }
        Err(e) => {
            warn!("Failed to connect to {}:{}: {}", host, port, e);
            return ProbeOutcome::Unreachable;
        }
    };
    debug!("Connected to {}:{}", host, port);

    let exchanged = exchange(&mut stream, config.read_timeout()).await;

    if let Err(e) = stream.shutdown().await {
        trace!("Shutdown of {}:{} failed: {}", host, port, e);
    }
    drop(stream);

    match exchanged {
        Ok(response) if is_handshake_response(&response) => {
            debug!("JDWP handshake confirmed at {}:{}", host, port);
            ProbeOutcome::Confirmed
        }
        Ok(response) => {
            debug!(
                "Unexpected handshake response from {}:{}: '{}' ({} bytes)",
                host,
                port,
                printable(&response),
                response.len()
            );
            ProbeOutcome::Rejected
        }
        Err(e @ (ProbeError::ReadTimeout | ProbeError::ConnectionReset)) => {
            debug!("No handshake response from {}:{}: {}", host, port, e);
            ProbeOutcome::Rejected
        }
        Err(e) => {
            warn!("Handshake with {}:{} aborted: {}", host, port, e);
            ProbeOutcome::Rejected
        }
    }
}

async fn connect(host: &str, port: u16, connect_timeout: Duration) -> HandshakeResult<TcpStream> {
    match timeout(connect_timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(connect_error(e)),
        Err(_) => Err(ProbeError::ConnectTimeout),
    }
}

/// An OS-level ETIMEDOUT while connecting is a connect timeout, not a read timeout.
fn connect_error(error: std::io::Error) -> ProbeError {
    match error.kind() {
        std::io::ErrorKind::TimedOut => ProbeError::ConnectTimeout,
        _ => error.into(),
    }
}

async fn exchange(stream: &mut TcpStream, read_timeout: Duration) -> HandshakeResult<Vec<u8>> {
    stream.write_all(JDWP_HANDSHAKE_REQUEST).await?;
    stream.flush().await?;
    trace!("Sent '{}'", printable(JDWP_HANDSHAKE_REQUEST));

    let mut buffer = [0u8; PROBE_READ_CAP];
    let read = match timeout(read_timeout, stream.read(&mut buffer)).await {
        Ok(read) => read?,
        Err(_) => return Err(ProbeError::ReadTimeout),
    };
    trace!("Received '{}'", printable(&buffer[..read]));

    Ok(buffer[..read].to_vec())
}
