// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::new_without_default)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod getstate;
pub mod handshake;
pub mod peer;
pub mod prober;
pub mod report;
pub mod scanner;
pub mod target;


pub use error::{PeerError, ProbeError};
pub use peer::{PeerConfig, SessionOutcome, SimulatedPeer};
pub use prober::{probe, probe_with, ProbeOutcome};
