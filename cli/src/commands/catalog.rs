// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog commands
//!
//! Commands: import, check

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use edumap_core::application::CatalogSeed;

use crate::embedded::EmbeddedServices;

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Import departments, disciplines, control types, competencies and directions
    Import {
        /// Catalog seed file (YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse a seed file without touching the store
    Check {
        /// Catalog seed file (YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub async fn handle_command(
    command: CatalogCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        CatalogCommand::Import { file } => import(file, config_override).await,
        CatalogCommand::Check { file } => check(file),
    }
}

async fn import(file: PathBuf, config_override: Option<PathBuf>) -> Result<()> {
    let services = EmbeddedServices::new(config_override).await?;
    let summary = services.import_catalog(&file).await?;

    println!(
        "{}",
        format!(
            "✓ Catalog imported: {} created, {} skipped",
            summary.created, summary.skipped
        )
        .green()
    );
    Ok(())
}

fn check(file: PathBuf) -> Result<()> {
    let seed = CatalogSeed::from_yaml_file(&file)
        .with_context(|| format!("Failed to read catalog {:?}", file))?;

    println!("{}", "Catalog contents:".bold());
    println!("  Departments:   {}", seed.departments.len());
    println!("  Disciplines:   {}", seed.disciplines.len());
    println!("  Control types: {}", seed.control_types.len());
    println!("  Competencies:  {}", seed.competencies.len());
    println!("  Directions:    {}", seed.directions.len());

    let known: Vec<&str> = seed
        .departments
        .iter()
        .map(|d| d.short_name.as_str())
        .collect();
    let unresolved: Vec<&str> = seed
        .disciplines
        .iter()
        .map(|d| d.department.as_str())
        .filter(|short| !known.contains(short))
        .collect();
    if !unresolved.is_empty() {
        println!(
            "{}",
            format!(
                "! Departments not defined in this file (must already be stored): {}",
                unresolved.join(", ")
            )
            .yellow()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rejects_malformed_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, "departments: [{name: only-name}]").unwrap();
        assert!(check(path).is_err());
    }

    #[test]
    fn test_check_accepts_partial_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, "control_types:\n  - name: Зачет\n").unwrap();
        assert!(check(path).is_ok());
    }
}
