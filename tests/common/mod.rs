// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use jdwprobe::peer::{PeerConfig, SimulatedPeer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const LOCALHOST: &str = "127.0.0.1";

pub async fn start_peer(vulnerable: bool) -> (SimulatedPeer, SocketAddr) {
    let mut peer = SimulatedPeer::new(PeerConfig::new(LOCALHOST, 0, vulnerable));
    let addr = peer.start().await.expect("peer should bind an ephemeral port");
    (peer, addr)
}

/// A port that had a listener a moment ago and has none now.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Accepts one connection, reads the request, answers with `payload`, closes.
pub async fn spawn_responder(payload: Vec<u8>) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 128];
        let n = socket.read(&mut request).await.unwrap_or(0);
        if !payload.is_empty() {
            let _ = socket.write_all(&payload).await;
        }
        let _ = socket.shutdown().await;
        request[..n].to_vec()
    });
    (addr, handle)
}

/// Accepts one connection and keeps it open without ever answering.
pub async fn spawn_silent_listener(hold: Duration) -> SocketAddr {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(hold).await;
            drop(socket);
        }
    });
    addr
}

/// Accepts one connection and drops it immediately.
pub async fn spawn_dropper() -> SocketAddr {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });
    addr
}

/// Accepts one connection, reads the request, then aborts it with an RST.
pub async fn spawn_resetter() -> SocketAddr {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 128];
            let _ = socket.read(&mut request).await;
            abort_on_drop(&socket);
            drop(socket);
        }
    });
    addr
}

/// Connects to `addr` and aborts the connection before sending anything.
pub async fn connect_and_reset(addr: SocketAddr) {
    let stream = TcpStream::connect(addr).await.unwrap();
    abort_on_drop(&stream);
    drop(stream);
}

/// Zero linger makes the close send RST instead of FIN.
#[allow(deprecated)]
fn abort_on_drop(stream: &TcpStream) {
    stream.set_linger(Some(Duration::ZERO)).unwrap();
}

/// Polls until the peer has served `count` connections.
pub async fn wait_for_served(peer: &SimulatedPeer, count: usize) {
    let waited = tokio::time::timeout(Duration::from_secs(3), async {
        while peer.served() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "peer served {} of {} connections", peer.served(), count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_peer_helper_binds() {
        let (mut peer, addr) = start_peer(true).await;
        assert_ne!(addr.port(), 0);
        peer.stop().await;
    }
}
