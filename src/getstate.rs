/*
Copyright 2022 Volker Schwaberow <volker@schwaberow.de>
Permission is hereby granted, free of charge, to any person obtaining a
copy of this software and associated documentation files (the
"Software"), to deal in the Software without restriction, including without
limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the
Software is furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be
included in all copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR
OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE,
ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
DEALINGS IN THE SOFTWARE.
Author(s): Volker Schwaberow
*/

use crate::prober::ProbeOutcome;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Scan counters shared between probe tasks.
#[derive(Debug, Default)]
pub struct GetState {
    total_requests: AtomicU64,
    confirmed: AtomicUsize,
    rejected: AtomicUsize,
    unreachable: AtomicUsize,
    start_time: AtomicU64,
    end_time: AtomicU64,
}

impl GetState {
    pub fn new() -> GetState {
        GetState::default()
    }

    pub fn record(&self, outcome: ProbeOutcome) {
        let counter = match outcome {
            ProbeOutcome::Confirmed => &self.confirmed,
            ProbeOutcome::Rejected => &self.rejected,
            ProbeOutcome::Unreachable => &self.unreachable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn set_total_requests(&self, total_requests: u64) {
        self.total_requests.store(total_requests, Ordering::Relaxed);
    }

    pub fn confirmed(&self) -> usize {
        self.confirmed.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn unreachable(&self) -> usize {
        self.unreachable.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> usize {
        self.confirmed() + self.rejected() + self.unreachable()
    }

    pub fn set_start_time(&self, start_time: u64) {
        self.start_time.store(start_time, Ordering::Relaxed);
    }

    pub fn start_time(&self) -> u64 {
        self.start_time.load(Ordering::Relaxed)
    }

    pub fn set_end_time(&self, end_time: u64) {
        self.end_time.store(end_time, Ordering::Relaxed);
    }

    pub fn end_time(&self) -> u64 {
        self.end_time.load(Ordering::Relaxed)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.end_time().saturating_sub(self.start_time())
    }
}

pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
