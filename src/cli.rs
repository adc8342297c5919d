// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ConfigParameter;
use crate::report::ReportFormat;
use crate::target::DEFAULT_JDWP_PORT;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long = "log-level", default_value = "warn", global = true)]
    pub log_level: String,

    #[arg(long = "no-color", help = "Disable colored output", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe targets for an exposed JDWP handshake
    Scan(ScanArgs),
    /// Run a simulated JDWP peer until interrupted
    Peer(PeerArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(help = "Targets as host:port, [v6]:port or host (default port 5005)")]
    pub targets: Vec<String>,

    #[arg(short = 'i', long = "input-file")]
    pub input_file: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "timeout",
        default_value_t = 3,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Handshake read timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        long = "connect-timeout",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout: u64,

    #[arg(short = 'w', long = "workers", default_value_t = 10)]
    pub workers: u32,

    #[arg(short = 'r', long = "rate-limit", default_value_t = 10)]
    pub rate_limit: u32,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(
        short = 'S',
        long = "show-unresponsive",
        help = "Show rejected/unreachable targets in output"
    )]
    pub show_unresponsive: bool,

    #[arg(
        short = 's',
        long = "suppress-stats",
        help = "Suppress scan summary and statistics"
    )]
    pub suppress_stats: bool,

    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl ScanArgs {
    pub fn to_config(&self) -> ConfigParameter {
        let mut config = ConfigParameter::new();
        config.set_read_timeout(Duration::from_secs(self.timeout));
        config.set_connect_timeout(Duration::from_secs(self.connect_timeout));
        config.set_workers(self.workers);
        config.set_print_failed(self.show_unresponsive);
        config.set_suppress_stats(self.suppress_stats);
        config.set_progress(!self.no_progress);
        config
    }
}

#[derive(Args, Debug)]
pub struct PeerArgs {
    #[arg(long = "host", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_JDWP_PORT)]
    pub port: u16,

    #[arg(
        long = "not-vulnerable",
        help = "Answer the handshake with a wrong payload"
    )]
    pub not_vulnerable: bool,

    #[arg(
        long = "read-timeout",
        default_value_t = 2,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub read_timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["jdwprobe", "scan", "127.0.0.1:5005"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan subcommand");
        };
        assert_eq!(args.targets, vec!["127.0.0.1:5005".to_string()]);

        let config = args.to_config();
        assert_eq!(config.read_timeout(), Duration::from_secs(3));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.workers(), 10);
        assert!(config.progress());
        assert!(!config.print_failed());
    }

    #[test]
    fn test_scan_flags() {
        let cli = Cli::try_parse_from([
            "jdwprobe", "scan", "-t", "1", "-w", "2", "-S", "-s", "--no-progress", "-f", "json",
            "a:1", "b:2",
        ])
        .unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan subcommand");
        };
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.targets.len(), 2);

        let config = args.to_config();
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.workers(), 2);
        assert!(config.print_failed());
        assert!(config.suppress_stats());
        assert!(!config.progress());
    }

    #[test]
    fn test_peer_args() {
        let cli = Cli::try_parse_from([
            "jdwprobe",
            "--log-level",
            "debug",
            "peer",
            "--port",
            "12345",
            "--not-vulnerable",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        let Commands::Peer(args) = cli.command else {
            panic!("expected peer subcommand");
        };
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 12345);
        assert!(args.not_vulnerable);
        assert_eq!(args.read_timeout, 2);
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        for args in [
            &["jdwprobe", "scan", "-t", "0", "a:1"][..],
            &["jdwprobe", "scan", "--connect-timeout", "0", "a:1"][..],
            &["jdwprobe", "peer", "--read-timeout", "0"][..],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "accepted {:?}", args);
        }

        assert!(Cli::try_parse_from(["jdwprobe", "scan", "-t", "1", "a:1"]).is_ok());
    }
}
