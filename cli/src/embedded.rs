// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process service wiring
//!
//! Every command runs the core services in the CLI process against the
//! record store selected by configuration.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use edumap_core::{
    application::{
        create_unit_of_work_factory, CatalogImportService, CatalogSeed, ImportSummary,
        PlanValidationService, StandardMapService,
    },
    domain::config::EdumapConfig,
    infrastructure::event_bus::EventBus,
};

pub struct EmbeddedServices {
    pub map_service: StandardMapService,
    pub catalog_service: CatalogImportService,
    pub validation_service: PlanValidationService,
    pub event_bus: Arc<EventBus>,
}

impl EmbeddedServices {
    pub async fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config =
            EdumapConfig::load_or_default(config_path).context("Failed to load configuration")?;

        config
            .validate()
            .context("Configuration validation failed")?;

        Self::from_config(&config).await
    }

    pub async fn from_config(config: &EdumapConfig) -> Result<Self> {
        let store = create_unit_of_work_factory(
            &config.storage_backend(),
            config.spec.storage.run_migrations,
        )
        .await
        .context("Failed to initialize record store")?;
        let event_bus = Arc::new(EventBus::new(config.spec.events.capacity));

        Ok(Self {
            map_service: StandardMapService::new(store.clone(), event_bus.clone()),
            catalog_service: CatalogImportService::new(store, event_bus.clone()),
            validation_service: PlanValidationService::new(event_bus.clone()),
            event_bus,
        })
    }

    /// Import a catalog seed file into the configured store.
    pub async fn import_catalog(&self, path: &Path) -> Result<ImportSummary> {
        let seed = CatalogSeed::from_yaml_file(path)
            .with_context(|| format!("Failed to read catalog {:?}", path))?;
        let summary = self
            .catalog_service
            .import(&seed)
            .await
            .context("Catalog import failed")?;
        info!(created = summary.created, skipped = summary.skipped, "Catalog seeded");
        Ok(summary)
    }
}
