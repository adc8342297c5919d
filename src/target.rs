// File: target.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Port used by `-agentlib:jdwp=transport=dt_socket,address=...` in most setups.
pub const DEFAULT_JDWP_PORT: u16 = 5005;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    host: String,
    port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    Empty,
    MalformedHost(String),
    InvalidPort(String),
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty target"),
            Self::MalformedHost(input) => write!(f, "Malformed host in target: '{}'", input),
            Self::InvalidPort(port) => write!(f, "Invalid port: '{}'", port),
        }
    }
}

impl std::error::Error for TargetError {}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accepts `host:port`, `[v6]:port`, a bare host, or a bare IPv6 address.
    /// A missing port falls back to [`DEFAULT_JDWP_PORT`].
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| TargetError::MalformedHost(s.to_string()))?;
            if host.is_empty() {
                return Err(TargetError::MalformedHost(s.to_string()));
            }
            let port = match tail {
                "" => DEFAULT_JDWP_PORT,
                t => parse_port(
                    t.strip_prefix(':')
                        .ok_or_else(|| TargetError::MalformedHost(s.to_string()))?,
                )?,
            };
            return Ok(Self::new(host, port));
        }

        match s.matches(':').count() {
            0 => Ok(Self::new(s, DEFAULT_JDWP_PORT)),
            1 => {
                let (host, port) = s
                    .split_once(':')
                    .ok_or_else(|| TargetError::MalformedHost(s.to_string()))?;
                if host.is_empty() {
                    return Err(TargetError::MalformedHost(s.to_string()));
                }
                Ok(Self::new(host, parse_port(port)?))
            }
            _ => Ok(Self::new(s, DEFAULT_JDWP_PORT)),
        }
    }
}

fn parse_port(port: &str) -> Result<u16, TargetError> {
    match port.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(TargetError::InvalidPort(port.to_string())),
        Ok(p) => Ok(p),
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parses one target per line, skipping blanks and `#` comments.
pub fn parse_target_lines<'a, I>(lines: I) -> (Vec<Target>, Vec<(String, TargetError)>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut targets = Vec::new();
    let mut rejected = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match Target::parse(line) {
            Ok(target) => targets.push(target),
            Err(e) => rejected.push((line.to_string(), e)),
        }
    }
    (targets, rejected)
}
