// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Curriculum map commands
//!
//! Commands: load, unload, unload-core
//!
//! With the in-memory backend the store lives only as long as the command,
//! so `--catalog` seeds the reference data first and `load --show` prints
//! the map as stored.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use edumap_core::{
    application::MapService,
    domain::{direction::DirectionId, map::MapLoad, map_core::MapCoreId},
};

use super::read_json;
use crate::embedded::EmbeddedServices;

#[derive(Args)]
pub struct MapArgs {
    /// Catalog seed file imported before the command runs
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: MapCommand,
}

#[derive(Subcommand)]
pub enum MapCommand {
    /// Replace a direction's map with a load payload
    Load {
        /// Direction ID
        #[arg(value_name = "DIRECTION_ID")]
        direction_id: i64,

        /// Load payload (JSON with `map_cores`)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the stored map after loading
        #[arg(long)]
        show: bool,
    },

    /// Print the nested map of a direction
    Unload {
        /// Direction ID
        #[arg(value_name = "DIRECTION_ID")]
        direction_id: i64,

        /// Write JSON here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print a single map core
    UnloadCore {
        /// Map core ID
        #[arg(value_name = "MAP_CORE_ID")]
        map_core_id: i64,

        /// Write JSON here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

pub async fn handle_command(args: MapArgs, config_override: Option<PathBuf>) -> Result<()> {
    let services = EmbeddedServices::new(config_override).await?;

    if let Some(catalog) = &args.catalog {
        let summary = services.import_catalog(catalog).await?;
        println!(
            "{}",
            format!(
                "Catalog: {} created, {} skipped",
                summary.created, summary.skipped
            )
            .dimmed()
        );
    }

    match args.command {
        MapCommand::Load {
            direction_id,
            file,
            show,
        } => load(&services, DirectionId(direction_id), file, show).await,
        MapCommand::Unload {
            direction_id,
            output,
        } => unload(&services, DirectionId(direction_id), output).await,
        MapCommand::UnloadCore {
            map_core_id,
            output,
        } => unload_core(&services, MapCoreId(map_core_id), output).await,
    }
}

async fn load(
    services: &EmbeddedServices,
    direction_id: DirectionId,
    file: PathBuf,
    show: bool,
) -> Result<()> {
    let payload: MapLoad = read_json(&file)?;
    let cores = payload.map_cores.len();

    services
        .map_service
        .load(direction_id, payload)
        .await
        .with_context(|| format!("Failed to load map for direction {}", direction_id))?;

    println!(
        "{}",
        format!("✓ Loaded {} map cores into direction {}", cores, direction_id).green()
    );

    if show {
        let map = services
            .map_service
            .unload(direction_id)
            .await
            .context("Failed to read back the map")?;
        write_json(&map, None)?;
    }
    Ok(())
}

async fn unload(
    services: &EmbeddedServices,
    direction_id: DirectionId,
    output: Option<PathBuf>,
) -> Result<()> {
    let map = services
        .map_service
        .unload(direction_id)
        .await
        .with_context(|| format!("Failed to unload direction {}", direction_id))?;
    write_json(&map, output)
}

async fn unload_core(
    services: &EmbeddedServices,
    map_core_id: MapCoreId,
    output: Option<PathBuf>,
) -> Result<()> {
    let core = services
        .map_service
        .unload_map_core(map_core_id)
        .await
        .with_context(|| format!("Failed to unload map core {}", map_core_id))?;
    write_json(&core, output)
}

fn write_json<T: Serialize>(value: &T, output: Option<PathBuf>) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(&path, body)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("{}", format!("✓ Written to {}", path.display()).green());
        }
        None => println!("{}", body),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edumap_core::domain::config::EdumapConfig;

    const CATALOG: &str = r#"
departments:
  - name: Кафедра информационных систем и технологий
    short_name: ИСТ
disciplines:
  - name: Программирование
    short_name: Прог
    department: ИСТ
control_types:
  - name: Экзамен
competencies:
  - code: УК-1
    name: Системное мышление
    group_id: 1
directions:
  - name: Информационные системы и технологии
    educational_level_id: 1
    educational_form_id: 1
    semester_count: 8
"#;

    const PAYLOAD: &str = r#"{
  "map_cores": [{
    "name": "Базовое ядро",
    "semesters_count": 8,
    "discipline_blocks": [{
      "discipline_id": 1, "credit_units": 4, "control_type_id": 1,
      "lecture_hours": 36, "practice_hours": 18, "lab_hours": 18,
      "semester_number": 1, "competencies": [{"id": 1}]
    }]
  }]
}"#;

    #[tokio::test]
    async fn test_load_then_unload_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.yaml");
        let payload = dir.path().join("map.json");
        let output = dir.path().join("out.json");
        std::fs::write(&catalog, CATALOG).unwrap();
        std::fs::write(&payload, PAYLOAD).unwrap();

        let services = EmbeddedServices::from_config(&EdumapConfig::default())
            .await
            .unwrap();
        services.import_catalog(&catalog).await.unwrap();

        load(&services, DirectionId(1), payload, false).await.unwrap();
        unload(&services, DirectionId(1), Some(output.clone()))
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let block = &written["map_cores"][0]["discipline_blocks"][0];
        assert_eq!(block["discipline"]["department"]["short_name"], "ИСТ");
        assert_eq!(block["competencies"][0]["code"], "УК-1");
    }

    #[tokio::test]
    async fn test_load_into_unknown_direction_fails() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("map.json");
        std::fs::write(&payload, r#"{"map_cores": []}"#).unwrap();

        let services = EmbeddedServices::from_config(&EdumapConfig::default())
            .await
            .unwrap();
        let err = load(&services, DirectionId(42), payload, false)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Direction not found: 42"));
    }
}
