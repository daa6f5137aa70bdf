// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Record Store Factory - Application Layer
//!
//! Builds the concrete [`UnitOfWorkFactory`] for the configured storage
//! backend, keeping the domain layer free of infrastructure types.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::repository::{StorageBackend, UnitOfWorkFactory};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres::PostgresStore;
use crate::infrastructure::repositories::InMemoryStore;

/// Creates the record store for the configured backend. For PostgreSQL this
/// connects the pool and, when requested, applies pending migrations.
pub async fn create_unit_of_work_factory(
    backend: &StorageBackend,
    run_migrations: bool,
) -> Result<Arc<dyn UnitOfWorkFactory>> {
    match backend {
        StorageBackend::InMemory => {
            info!("Using in-memory record store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::PostgreSQL(config) => {
            let database = Database::new(config)
                .await
                .context("Failed to connect to PostgreSQL")?;
            if run_migrations {
                database.migrate().await.context("Failed to apply migrations")?;
            }
            info!("Using PostgreSQL record store");
            Ok(Arc::new(PostgresStore::new(database.get_pool().clone())))
        }
    }
}
