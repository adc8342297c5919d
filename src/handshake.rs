// File: handshake.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

/// Magic string a JDWP agent expects first and echoes back verbatim.
pub const JDWP_HANDSHAKE_REQUEST: &[u8] = b"JDWP-Handshake";

/// The only response accepted as proof of a live JDWP agent.
pub const JDWP_HANDSHAKE_RESPONSE: &[u8] = JDWP_HANDSHAKE_REQUEST;

/// Reply of a simulated peer that speaks something other than JDWP.
pub const NOT_JDWP_MARKER: &[u8] = b"NOT-JDWP";

/// Slack on top of the token length so oversized replies are read and rejected.
pub const RESPONSE_SLACK: usize = 10;

/// Upper bound of a single prober read.
pub const PROBE_READ_CAP: usize = JDWP_HANDSHAKE_RESPONSE.len() + RESPONSE_SLACK;

/// Upper bound of a single simulated peer read.
pub const PEER_READ_CAP: usize = 100;

/// Byte-exact comparison against the handshake response.
pub fn is_handshake_response(payload: &[u8]) -> bool {
    payload == JDWP_HANDSHAKE_RESPONSE
}

/// Byte-exact comparison against the handshake request.
pub fn is_handshake_request(payload: &[u8]) -> bool {
    payload == JDWP_HANDSHAKE_REQUEST
}

/// Lossy rendering for log lines; payloads from the wire are not trusted to be ASCII.
pub fn printable(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).escape_debug().to_string()
}
