// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PEER_READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct ConfigParameter {
    print_failed: bool,
    suppress_stats: bool,
    progress: bool,
    connect_timeout: Duration,
    read_timeout: Duration,
    workers: u32,
}

impl Default for ConfigParameter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParameter {
    pub fn new() -> Self {
        Self {
            print_failed: false,
            suppress_stats: false,
            progress: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            workers: 10,
        }
    }

    pub fn set_print_failed(&mut self, print_failed: bool) {
        self.print_failed = print_failed;
    }

    pub fn print_failed(&self) -> bool {
        self.print_failed
    }

    pub fn suppress_stats(&self) -> bool {
        self.suppress_stats
    }

    pub fn set_suppress_stats(&mut self, suppress_stats: bool) {
        self.suppress_stats = suppress_stats;
    }

    pub fn progress(&self) -> bool {
        self.progress
    }

    pub fn set_progress(&mut self, progress: bool) {
        self.progress = progress;
    }

    pub fn set_connect_timeout(&mut self, connect_timeout: Duration) {
        self.connect_timeout = connect_timeout;
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Zero is bumped to one so a scan always makes progress.
    pub fn set_workers(&mut self, workers: u32) {
        self.workers = workers.max(1);
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }
}
