// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use colored::*;

use crate::cli::{PeerArgs, ScanArgs};

pub mod peer;
pub mod scan;

pub type CommandResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub async fn handle_scan_command(args: &ScanArgs) -> CommandResult {
    scan::execute(args).await
}

pub async fn handle_peer_command(args: &PeerArgs) -> CommandResult {
    peer::execute(args).await
}

fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

fn format_duration(ms: u64) -> String {
    if ms >= 60000 {
        format!("{}m {:.1}s", ms / 60000, (ms % 60000) as f64 / 1000.0)
    } else if ms >= 1000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{}ms", ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(3000), "3.00s");
        assert_eq!(format_duration(61500), "1m 1.5s");
    }
}
