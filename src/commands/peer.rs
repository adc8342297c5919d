// File: peer.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::time::Duration;

use super::{print_info, CommandResult};
use crate::cli::PeerArgs;
use crate::peer::{PeerConfig, SimulatedPeer};

pub async fn execute(args: &PeerArgs) -> CommandResult {
    let config = PeerConfig::new(args.host.clone(), args.port, !args.not_vulnerable)
        .with_read_timeout(Duration::from_secs(args.read_timeout));
    let mut peer = SimulatedPeer::new(config);

    let addr = peer.start().await?;
    print_info(&format!(
        "Simulated JDWP peer listening on {} ({}). Press Ctrl-C to stop.",
        addr,
        if args.not_vulnerable {
            "not vulnerable"
        } else {
            "vulnerable"
        }
    ));

    tokio::signal::ctrl_c().await?;
    peer.stop().await;

    print_info(&format!("Served {} connections", peer.served()));
    Ok(())
}
