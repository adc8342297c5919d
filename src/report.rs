// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ConfigParameter;
use crate::prober::ProbeOutcome;
use crate::scanner::ProbeResult;
use crate::target::Target;
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::fmt::Write;

pub const VULNERABILITY_PUBLISHER: &str = "GOOGLE";
pub const VULNERABILITY_ID: &str = "JDWP_RCE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
}

/// A detection is only emitted once the handshake has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionStatus {
    VulnerabilityVerified,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub publisher: String,
    pub id: String,
    pub status: DetectionStatus,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub detail: String,
    pub detected_at: DateTime<Utc>,
}

impl DetectionReport {
    pub fn for_target(target: &Target) -> Self {
        Self {
            publisher: VULNERABILITY_PUBLISHER.to_string(),
            id: VULNERABILITY_ID.to_string(),
            status: DetectionStatus::VulnerabilityVerified,
            severity: Severity::Critical,
            title: "Exposed Java Debug Wire Protocol (JDWP) Service".to_string(),
            description: "The Java Debug Wire Protocol (JDWP) service is publicly exposed. \
                This service, by design, often allows unauthenticated remote code execution. \
                A successful JDWP handshake was performed with the service, confirming an \
                active JDWP service."
                .to_string(),
            recommendation: "Either disable the service, limit it to localhost or configure a \
                firewall to limit exposure."
                .to_string(),
            detail: format!(
                "Successfully performed JDWP handshake with the service at {}.",
                target
            ),
            detected_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub target: String,
    pub status: ProbeOutcome,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionReport>,
}

impl ReportEntry {
    pub fn from_result(result: &ProbeResult) -> Self {
        Self {
            target: result.target.to_string(),
            status: result.outcome,
            elapsed_ms: result.elapsed_ms,
            detection: result
                .outcome
                .is_vulnerable()
                .then(|| DetectionReport::for_target(&result.target)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Unconfirmed targets are kept only when `print_failed` is set.
    pub fn build_entries(results: &[ProbeResult], config: &ConfigParameter) -> Vec<ReportEntry> {
        results
            .iter()
            .filter(|result| config.print_failed() || result.outcome.is_vulnerable())
            .map(ReportEntry::from_result)
            .collect()
    }

    pub fn render(entries: &[ReportEntry], format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(Self::render_text(entries)),
            ReportFormat::Json => Self::render_json(entries),
        }
    }

    pub fn render_text(entries: &[ReportEntry]) -> String {
        let mut out = String::new();
        for entry in entries {
            let status = match entry.status {
                ProbeOutcome::Confirmed => "CONFIRMED".red().bold(),
                ProbeOutcome::Rejected => "REJECTED".yellow(),
                ProbeOutcome::Unreachable => "UNREACHABLE".dimmed(),
            };
            let detail = match &entry.detection {
                Some(detection) => format!("{} ({})", detection.title, detection.severity_label()),
                None => "no JDWP handshake".to_string(),
            };
            let _ = writeln!(out, "{} [{}] {}", entry.target, status, detail);
        }
        out
    }

    pub fn render_json(entries: &[ReportEntry]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(entries)
    }
}

impl DetectionReport {
    fn severity_label(&self) -> &'static str {
        match self.severity {
            Severity::Critical => "CRITICAL",
        }
    }
}
