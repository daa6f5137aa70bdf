// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Record Store Contracts
//!
//! Persistence contracts for the curriculum collections. Every collection is
//! reached through the same capability set, [`Repository`], parameterized by
//! the stored [`Entity`] type:
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `get_all` | every record, in store iteration order |
//! | `get_by_id` | `Option<E>` |
//! | `create` | the created record with its generated id |
//! | `update` | the patched record, `None` if the id is unknown |
//! | `delete` | `true` if a record was removed |
//! | `filter_by` | records matching every set filter field |
//! | `exists` | whether `filter_by` would return anything |
//!
//! Repositories are never used directly by application services: they are
//! borrowed from a [`UnitOfWork`], which scopes every read and write of one
//! aggregate operation to a single transaction.
//!
//! ## Storage Backend Abstraction
//!
//! Concrete implementations are selected at startup from configuration
//! (`edumap-config.yaml`): the in-memory store for development and tests,
//! PostgreSQL for production.

use async_trait::async_trait;

use crate::domain::catalog::{Competency, ControlType, Department, Discipline};
use crate::domain::direction::{Direction, DirectionId};
use crate::domain::discipline_block::{DisciplineBlock, DisciplineBlockCompetency};
use crate::domain::entity::Entity;
use crate::domain::map_core::{DirectionMapCore, MapCore};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// Keyed CRUD over one collection.
#[async_trait]
pub trait Repository<E: Entity>: Send {
    async fn get_all(&mut self) -> Result<Vec<E>, RepositoryError>;

    async fn get_by_id(&mut self, id: E::Id) -> Result<Option<E>, RepositoryError>;

    async fn create(&mut self, new: E::New) -> Result<E, RepositoryError>;

    async fn update(&mut self, id: E::Id, patch: E::Patch) -> Result<Option<E>, RepositoryError>;

    async fn delete(&mut self, id: E::Id) -> Result<bool, RepositoryError>;

    async fn filter_by(&mut self, filter: &E::Filter) -> Result<Vec<E>, RepositoryError>;

    async fn exists(&mut self, filter: &E::Filter) -> Result<bool, RepositoryError>;
}

/// One transaction over every curriculum collection.
///
/// Changes become visible to other units of work only after [`commit`].
/// Dropping a unit of work without committing discards all of its changes,
/// so every early return (`?`) rolls back.
///
/// [`commit`]: UnitOfWork::commit
#[async_trait]
pub trait UnitOfWork: Send {
    fn directions(&mut self) -> &mut dyn Repository<Direction>;
    fn map_cores(&mut self) -> &mut dyn Repository<MapCore>;
    fn direction_map_cores(&mut self) -> &mut dyn Repository<DirectionMapCore>;
    fn discipline_blocks(&mut self) -> &mut dyn Repository<DisciplineBlock>;
    fn discipline_block_competencies(&mut self) -> &mut dyn Repository<DisciplineBlockCompetency>;
    fn disciplines(&mut self) -> &mut dyn Repository<Discipline>;
    fn departments(&mut self) -> &mut dyn Repository<Department>;
    fn control_types(&mut self) -> &mut dyn Repository<ControlType>;
    fn competencies(&mut self) -> &mut dyn Repository<Competency>;

    /// Take the backend's advisory write lock for a direction. Held until
    /// the unit of work commits or is dropped.
    async fn lock_direction(&mut self, id: DirectionId) -> Result<(), RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Opens units of work against a configured backend.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction already finished")]
    TransactionFinished,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}
