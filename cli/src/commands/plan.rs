// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Study plan commands
//!
//! Commands: validate, hours

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use edumap_core::{
    application::PlanValidationService,
    domain::{
        plan::{calculate_hours, PlanRow},
        validation::{ValidationReport, ValidationSeverity},
    },
    infrastructure::event_bus::EventBus,
};

use super::read_json;

#[derive(Subcommand)]
pub enum PlanCommand {
    /// Check a plan matrix against the credit and workload rules
    Validate {
        /// Plan file (JSON array of rows)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with success even when the plan has blocking findings
        #[arg(long)]
        no_fail: bool,
    },

    /// Show the hour breakdown of every discipline in a plan
    Hours {
        /// Plan file (JSON array of rows)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub async fn handle_command(command: PlanCommand) -> Result<()> {
    match command {
        PlanCommand::Validate {
            file,
            json,
            no_fail,
        } => validate(file, json, no_fail).await,
        PlanCommand::Hours { file } => hours(file).await,
    }
}

async fn validate(file: PathBuf, as_json: bool, no_fail: bool) -> Result<()> {
    let rows: Vec<PlanRow> = read_json(&file)?;

    let service = PlanValidationService::new(Arc::new(EventBus::with_default_capacity()));
    let report = service
        .validate(&rows)
        .with_context(|| format!("Cannot validate {:?}", file))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if !report.is_valid && !no_fail {
        anyhow::bail!("Plan has blocking findings");
    }
    Ok(())
}

/// Human-readable report, one finding per line.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    for finding in &report.results {
        let tag = match finding.severity {
            ValidationSeverity::Blocking => "error".red().bold(),
            ValidationSeverity::Warning => "warning".yellow().bold(),
        };
        let rule = serde_json::to_value(finding.rule)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        out.push_str(&format!("{} [{}] {}\n", tag, rule.dimmed(), finding.message));
    }

    let blocking = report.count(ValidationSeverity::Blocking);
    let warnings = report.count(ValidationSeverity::Warning);
    let summary = format!("{} blocking, {} warnings", blocking, warnings);
    if report.is_valid {
        out.push_str(&format!("{} ({})\n", "✓ Plan is valid".green(), summary));
    } else {
        out.push_str(&format!("{} ({})\n", "✗ Plan is invalid".red(), summary));
    }
    out
}

async fn hours(file: PathBuf) -> Result<()> {
    let rows: Vec<PlanRow> = read_json(&file)?;

    for row in &rows {
        println!("{}", row.name.bold());
        for (index, semester) in row.data.iter().enumerate() {
            for discipline in semester {
                let h = calculate_hours(discipline);
                let independent = if h.total_independent > 0 {
                    h.total_independent.to_string().normal()
                } else {
                    h.total_independent.to_string().red()
                };
                println!(
                    "  {:>2}  {:<40} total {:>4}  classroom {:>4} ({:>5.1}%)  contact {:>4}  independent {:>4}",
                    index + 1,
                    discipline.name,
                    h.total,
                    h.classroom,
                    h.classroom_percentage(),
                    h.contact,
                    independent,
                );
            }
        }
    }
    Ok(())
}
