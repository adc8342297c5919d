// File: scanner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ConfigParameter;
use crate::getstate::{now_millis, GetState};
use crate::prober::{probe_with, ProbeOutcome};
use crate::target::Target;
use futures::stream::{FuturesUnordered, StreamExt};
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use log::{info, warn};
use serde::Serialize;
use std::fmt::Write;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub target: Target,
    pub outcome: ProbeOutcome,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    pub state_ptr: Arc<GetState>,
    pub config_ptr: ConfigParameter,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl Scanner {
    pub fn new(state_ptr: Arc<GetState>, config_ptr: ConfigParameter, rate_limit: NonZeroU32) -> Self {
        Scanner {
            state_ptr,
            config_ptr,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate_limit))),
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config_ptr.progress() {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            pb.set_style(
                style
                    .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                        let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                    })
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
        }
        pb
    }

    /// Probes every target concurrently, bounded by the worker count and the
    /// rate limit. Results come back in input order.
    pub async fn work(&self, targets: Arc<Vec<Target>>) -> Vec<ProbeResult> {
        let pb = self.progress_bar(targets.len() as u64);
        let semaphore = Arc::new(Semaphore::new(self.config_ptr.workers() as usize));

        self.state_ptr.set_total_requests(targets.len() as u64);
        self.state_ptr.set_start_time(now_millis());
        info!(
            "Probing {} targets with {} workers",
            targets.len(),
            self.config_ptr.workers()
        );

        let mut futures = FuturesUnordered::new();

        for (index, target) in targets.iter().enumerate() {
            let target = target.clone();
            let config = self.config_ptr;
            let semaphore = Arc::clone(&semaphore);
            let rate_limiter = Arc::clone(&self.rate_limiter);
            let state_ptr = Arc::clone(&self.state_ptr);
            futures.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                rate_limiter.until_ready().await;

                let started = Instant::now();
                let outcome = probe_with(target.host(), target.port(), &config).await;
                state_ptr.record(outcome);

                (
                    index,
                    ProbeResult {
                        target,
                        outcome,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    },
                )
            }));
        }

        let mut results = Vec::with_capacity(targets.len());
        while let Some(task) = futures.next().await {
            match task {
                Ok(result) => results.push(result),
                Err(e) => warn!("Probe task failed: {}", e),
            }
            pb.inc(1);
        }
        pb.finish();

        self.state_ptr.set_end_time(now_millis());
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
