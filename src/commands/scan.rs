// File: scan.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::{DateTime, Utc};
use colored::*;
use log::debug;
use std::io::{self, BufRead};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::{format_duration, print_info, print_warning, CommandResult};
use crate::cli::ScanArgs;
use crate::getstate::GetState;
use crate::report::ReportGenerator;
use crate::scanner::Scanner;
use crate::target::{parse_target_lines, Target};

pub async fn execute(args: &ScanArgs) -> CommandResult {
    let targets = collect_targets(args)?;
    if targets.is_empty() {
        print_warning("No targets to probe");
        return Ok(());
    }

    let config = args.to_config();
    let rate_limit = NonZeroU32::new(args.rate_limit).unwrap_or(NonZeroU32::MIN);
    let state = Arc::new(GetState::new());
    let scanner = Scanner::new(Arc::clone(&state), config, rate_limit);

    let results = scanner.work(Arc::new(targets)).await;

    let entries = ReportGenerator::build_entries(&results, &config);
    let rendered = ReportGenerator::render(&entries, args.format.into())?;
    print!("{}", rendered);
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        println!();
    }

    if !config.suppress_stats() {
        print_summary(&state);
    }
    Ok(())
}

fn collect_targets(args: &ScanArgs) -> Result<Vec<Target>, Box<dyn std::error::Error + Send + Sync>> {
    let mut lines: Vec<String> = args.targets.clone();

    if let Some(path) = &args.input_file {
        let content = std::fs::read_to_string(path)?;
        lines.extend(content.lines().map(str::to_string));
    } else if args.targets.is_empty() {
        debug!("Reading targets from stdin");
        for line in io::stdin().lock().lines() {
            lines.push(line?);
        }
    }

    let (targets, rejected) = parse_target_lines(lines.iter().map(String::as_str));
    for (line, e) in rejected {
        print_warning(&format!("Skipping '{}': {}", line, e));
    }
    Ok(targets)
}

fn human_time(millis: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn print_summary(state: &GetState) {
    print_info(&format!(
        "{} targets. Started at {} / Ended at {}. {}.",
        state.total_requests(),
        human_time(state.start_time()),
        human_time(state.end_time()),
        format_duration(state.elapsed_ms())
    ));
    eprintln!(
        "  {} {}  {} {}  {} {}",
        "Confirmed:".red().bold(),
        state.confirmed(),
        "Rejected:".yellow(),
        state.rejected(),
        "Unreachable:".dimmed(),
        state.unreachable()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_time() {
        assert_eq!(human_time(0), "1970-01-01 00:00:00 UTC");
    }
}
