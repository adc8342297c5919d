// File: error.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::fmt;
use std::io;
use std::net::SocketAddr;

#[derive(Debug)]
pub enum ProbeError {
    ConnectionRefused,
    ConnectTimeout,
    ReadTimeout,
    ConnectionReset,
    Io(io::Error),
}

impl ProbeError {
    /// True for failures that happen before a TCP session exists.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::ConnectionRefused | Self::ConnectTimeout)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionRefused => write!(f, "Connection refused"),
            Self::ConnectTimeout => write!(f, "Connection timeout"),
            Self::ReadTimeout => write!(f, "Timeout waiting for response"),
            Self::ConnectionReset => write!(f, "Connection reset by peer"),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProbeError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                Self::ConnectionReset
            }
            io::ErrorKind::TimedOut => Self::ReadTimeout,
            _ => Self::Io(error),
        }
    }
}

#[derive(Debug)]
pub enum PeerError {
    Bind(SocketAddr, io::Error),
    InvalidAddress(String),
    AlreadyRunning,
}

impl fmt::Display for PeerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
            Self::InvalidAddress(addr) => write!(f, "Invalid listen address: {}", addr),
            Self::AlreadyRunning => write!(f, "Simulated peer is already running"),
        }
    }
}

impl std::error::Error for PeerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind(_, e) => Some(e),
            Self::InvalidAddress(_) => None,
            Self::AlreadyRunning => None,
        }
    }
}

pub type HandshakeResult<T> = Result<T, ProbeError>;
