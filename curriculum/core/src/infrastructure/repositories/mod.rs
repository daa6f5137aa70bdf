// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Record Store Implementations
//!
//! Infrastructure implementations of the [`Repository`] and [`UnitOfWork`]
//! contracts defined in the domain layer.
//!
//! # Available Implementations
//!
//! ## PostgreSQL
//!
//! [`postgres::PostgresStore`] opens one database transaction per unit of
//! work. Direction locks are transaction-scoped advisory locks.
//!
//! ## In-Memory
//!
//! [`InMemoryStore`] keeps every collection in a [`Table`] behind a single
//! async mutex. A unit of work holds the mutex for its whole lifetime and
//! edits a private copy of the tables; commit swaps the copy in, drop throws
//! it away. Used for development and tests.
//!
//! # Usage
//!
//! ```no_run
//! use edumap_core::domain::repository::UnitOfWorkFactory;
//! use edumap_core::infrastructure::repositories::InMemoryStore;
//!
//! # async fn run() -> Result<(), edumap_core::domain::repository::RepositoryError> {
//! let store = InMemoryStore::new();
//! let mut uow = store.begin().await?;
//! let cores = uow.map_cores().get_all().await?;
//! uow.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod postgres;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::catalog::{Competency, ControlType, Department, Discipline};
use crate::domain::direction::{Direction, DirectionId};
use crate::domain::discipline_block::{DisciplineBlock, DisciplineBlockCompetency};
use crate::domain::entity::{Entity, RecordId};
use crate::domain::map_core::{DirectionMapCore, MapCore};
use crate::domain::repository::{Repository, RepositoryError, UnitOfWork, UnitOfWorkFactory};

/// One in-memory collection. Ids are handed out monotonically and never
/// reused, so iteration order is creation order.
#[derive(Debug, Clone)]
pub struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E: Entity> Table<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for Table<E> {
    async fn get_all(&mut self) -> Result<Vec<E>, RepositoryError> {
        Ok(self.rows.values().cloned().collect())
    }

    async fn get_by_id(&mut self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        Ok(self.rows.get(&id).cloned())
    }

    async fn create(&mut self, new: E::New) -> Result<E, RepositoryError> {
        self.last_id += 1;
        let id = E::Id::from_raw(self.last_id);
        let record = E::from_new(id, new);
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&mut self, id: E::Id, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        Ok(self.rows.get_mut(&id).map(|record| {
            record.apply(patch);
            record.clone()
        }))
    }

    async fn delete(&mut self, id: E::Id) -> Result<bool, RepositoryError> {
        Ok(self.rows.remove(&id).is_some())
    }

    async fn filter_by(&mut self, filter: &E::Filter) -> Result<Vec<E>, RepositoryError> {
        Ok(self
            .rows
            .values()
            .filter(|record| record.matches(filter))
            .cloned()
            .collect())
    }

    async fn exists(&mut self, filter: &E::Filter) -> Result<bool, RepositoryError> {
        Ok(self.rows.values().any(|record| record.matches(filter)))
    }
}

/// Every curriculum collection.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub directions: Table<Direction>,
    pub map_cores: Table<MapCore>,
    pub direction_map_cores: Table<DirectionMapCore>,
    pub discipline_blocks: Table<DisciplineBlock>,
    pub discipline_block_competencies: Table<DisciplineBlockCompetency>,
    pub disciplines: Table<Discipline>,
    pub departments: Table<Department>,
    pub control_types: Table<ControlType>,
    pub competencies: Table<Competency>,
}

/// Thread-safe in-memory record store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> Tables {
        self.tables.lock().await.clone()
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryUnitOfWork { guard, working }))
    }
}

/// Exclusive transaction over an [`InMemoryStore`].
pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn directions(&mut self) -> &mut dyn Repository<Direction> {
        &mut self.working.directions
    }

    fn map_cores(&mut self) -> &mut dyn Repository<MapCore> {
        &mut self.working.map_cores
    }

    fn direction_map_cores(&mut self) -> &mut dyn Repository<DirectionMapCore> {
        &mut self.working.direction_map_cores
    }

    fn discipline_blocks(&mut self) -> &mut dyn Repository<DisciplineBlock> {
        &mut self.working.discipline_blocks
    }

    fn discipline_block_competencies(&mut self) -> &mut dyn Repository<DisciplineBlockCompetency> {
        &mut self.working.discipline_block_competencies
    }

    fn disciplines(&mut self) -> &mut dyn Repository<Discipline> {
        &mut self.working.disciplines
    }

    fn departments(&mut self) -> &mut dyn Repository<Department> {
        &mut self.working.departments
    }

    fn control_types(&mut self) -> &mut dyn Repository<ControlType> {
        &mut self.working.control_types
    }

    fn competencies(&mut self) -> &mut dyn Repository<Competency> {
        &mut self.working.competencies
    }

    async fn lock_direction(&mut self, _id: DirectionId) -> Result<(), RepositoryError> {
        // The store mutex is already held exclusively.
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::map_core::{MapCoreFilter, MapCoreId, MapCorePatch, NewMapCore};

    fn new_core(name: &str) -> NewMapCore {
        NewMapCore {
            name: name.to_string(),
            semesters_count: 8,
        }
    }

    #[tokio::test]
    async fn test_table_crud() {
        let mut table: Table<MapCore> = Table::new();

        let first = table.create(new_core("Ядро")).await.unwrap();
        let second = table.create(new_core("Базовое ядро")).await.unwrap();
        assert_eq!(first.id, MapCoreId(1));
        assert_eq!(second.id, MapCoreId(2));

        let patched = table
            .update(
                first.id,
                MapCorePatch {
                    semesters_count: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.semesters_count, 4);
        assert_eq!(patched.name, "Ядро");

        assert!(table.update(MapCoreId(99), MapCorePatch::default()).await.unwrap().is_none());

        assert!(table.delete(first.id).await.unwrap());
        assert!(!table.delete(first.id).await.unwrap());
        assert_eq!(table.get_all().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let mut table: Table<MapCore> = Table::new();
        let first = table.create(new_core("a")).await.unwrap();
        table.delete(first.id).await.unwrap();
        let next = table.create(new_core("b")).await.unwrap();
        assert_eq!(next.id, MapCoreId(2));
    }

    #[tokio::test]
    async fn test_filter_and_exists() {
        let mut table: Table<MapCore> = Table::new();
        table.create(new_core("a")).await.unwrap();
        table.create(new_core("b")).await.unwrap();

        let filter = MapCoreFilter {
            name: Some("b".to_string()),
        };
        assert_eq!(table.filter_by(&filter).await.unwrap().len(), 1);
        assert!(table.exists(&filter).await.unwrap());
        assert_eq!(table.filter_by(&MapCoreFilter::default()).await.unwrap().len(), 2);

        let missing = MapCoreFilter {
            name: Some("c".to_string()),
        };
        assert!(!table.exists(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.map_cores().create(new_core("Ядро")).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(store.snapshot().await.map_cores.len(), 1);
    }

    #[tokio::test]
    async fn test_drop_discards_changes() {
        let store = InMemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.map_cores().create(new_core("Ядро")).await.unwrap();
        }

        assert!(store.snapshot().await.map_cores.is_empty());

        // The dropped unit of work released the store.
        let mut uow = store.begin().await.unwrap();
        assert!(uow.map_cores().get_all().await.unwrap().is_empty());
    }
}
