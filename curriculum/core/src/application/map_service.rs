// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Map Aggregate Application Service
//!
//! Keeps a direction's map cores, discipline blocks and competency links in
//! step with the most recently loaded payload, and rebuilds the nested view
//! on demand.
//!
//! # Load
//!
//! One unit of work per call, in two phases:
//!
//! 1. **Check.** The direction, the payload shape, every reused map core and
//!    every referenced discipline, control type and competency are verified.
//!    Nothing has been written yet, so any failure leaves the store untouched.
//! 2. **Replace.** The direction's map-core links are dropped; each reused
//!    map core loses all of its blocks (and their links); new map cores are
//!    created; links, blocks and competency links are recreated in payload
//!    order.
//!
//! The unit of work commits only after the last write. Events go out after
//! the commit.
//!
//! # Concurrency
//!
//! Loads of the same direction are serialized twice: by an in-process lock
//! registry and by the backend's direction lock, which also covers other
//! processes writing to the same database.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::domain::catalog::{CompetencyId, ControlTypeId, DepartmentId, DisciplineId};
use crate::domain::direction::DirectionId;
use crate::domain::discipline_block::{
    DisciplineBlockCompetencyFilter, DisciplineBlockFilter, NewDisciplineBlockCompetency,
};
use crate::domain::events::MapEvent;
use crate::domain::map::{
    DisciplineBlockLoad, DisciplineBlockUnload, DisciplineUnload, MapCoreUnload, MapLoad,
    MapUnload, PayloadError,
};
use crate::domain::map_core::{DirectionMapCoreFilter, MapCoreId, NewDirectionMapCore, NewMapCore};
use crate::domain::repository::{RepositoryError, UnitOfWork, UnitOfWorkFactory};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("Direction not found: {0}")]
    DirectionNotFound(DirectionId),

    #[error("Map core not found: {0}")]
    MapCoreNotFound(MapCoreId),

    #[error("Discipline not found: {0}")]
    DisciplineNotFound(DisciplineId),

    #[error("Department not found: {0}")]
    DepartmentNotFound(DepartmentId),

    #[error("Control type not found: {0}")]
    ControlTypeNotFound(ControlTypeId),

    #[error("Competency not found: {0}")]
    CompetencyNotFound(CompetencyId),

    #[error("Invalid map payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MapError {
    /// True for every dangling-reference error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MapError::DirectionNotFound(_)
                | MapError::MapCoreNotFound(_)
                | MapError::DisciplineNotFound(_)
                | MapError::DepartmentNotFound(_)
                | MapError::ControlTypeNotFound(_)
                | MapError::CompetencyNotFound(_)
        )
    }
}

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait MapService: Send + Sync {
    /// Replace the direction's map with the payload.
    async fn load(&self, direction_id: DirectionId, payload: MapLoad) -> Result<(), MapError>;

    /// Nested view of every map core linked to the direction.
    async fn unload(&self, direction_id: DirectionId) -> Result<MapUnload, MapError>;

    /// Nested view of a single map core.
    async fn unload_map_core(&self, map_core_id: MapCoreId) -> Result<MapCoreUnload, MapError>;
}

// ============================================================================
// Direction lock registry
// ============================================================================

/// In-process write locks, one per direction.
#[derive(Default)]
pub struct DirectionLocks {
    locks: DashMap<DirectionId, Arc<Mutex<()>>>,
}

impl DirectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, direction_id: DirectionId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(direction_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        lock.lock_owned().await
    }
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct StandardMapService {
    store: Arc<dyn UnitOfWorkFactory>,
    event_bus: Arc<EventBus>,
    locks: DirectionLocks,
}

impl StandardMapService {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>, event_bus: Arc<EventBus>) -> Self {
        Self {
            store,
            event_bus,
            locks: DirectionLocks::new(),
        }
    }
}

/// Referents already confirmed during one check phase.
#[derive(Default)]
struct CheckedRefs {
    disciplines: HashSet<DisciplineId>,
    control_types: HashSet<ControlTypeId>,
    competencies: HashSet<CompetencyId>,
}

impl CheckedRefs {
    async fn check_block(
        &mut self,
        uow: &mut dyn UnitOfWork,
        block: &DisciplineBlockLoad,
    ) -> Result<(), MapError> {
        if !self.disciplines.contains(&block.discipline_id) {
            uow.disciplines()
                .get_by_id(block.discipline_id)
                .await?
                .ok_or(MapError::DisciplineNotFound(block.discipline_id))?;
            self.disciplines.insert(block.discipline_id);
        }

        if !self.control_types.contains(&block.control_type_id) {
            uow.control_types()
                .get_by_id(block.control_type_id)
                .await?
                .ok_or(MapError::ControlTypeNotFound(block.control_type_id))?;
            self.control_types.insert(block.control_type_id);
        }

        for competency in &block.competencies {
            if !self.competencies.contains(&competency.id) {
                uow.competencies()
                    .get_by_id(competency.id)
                    .await?
                    .ok_or(MapError::CompetencyNotFound(competency.id))?;
                self.competencies.insert(competency.id);
            }
        }

        Ok(())
    }
}

/// Fails unless every record the payload points at exists.
async fn check_payload(
    uow: &mut dyn UnitOfWork,
    direction_id: DirectionId,
    payload: &MapLoad,
) -> Result<(), MapError> {
    uow.directions()
        .get_by_id(direction_id)
        .await?
        .ok_or(MapError::DirectionNotFound(direction_id))?;

    payload.validate()?;

    let mut checked = CheckedRefs::default();
    for (index, core) in payload.map_cores.iter().enumerate() {
        let semesters_count = match core.id {
            Some(id) => {
                uow.map_cores()
                    .get_by_id(id)
                    .await?
                    .ok_or(MapError::MapCoreNotFound(id))?
                    .semesters_count
            }
            None => core.semesters_count,
        };
        core.check_semesters(index, semesters_count)?;

        for block in &core.discipline_blocks {
            checked.check_block(uow, block).await?;
        }
    }
    Ok(())
}

/// Deletes every block of a map core together with its competency links.
/// Returns the number of blocks removed.
async fn clear_blocks(uow: &mut dyn UnitOfWork, map_core_id: MapCoreId) -> Result<usize, MapError> {
    let blocks = uow
        .discipline_blocks()
        .filter_by(&DisciplineBlockFilter {
            map_core_id: Some(map_core_id),
            ..Default::default()
        })
        .await?;

    for block in &blocks {
        let links = uow
            .discipline_block_competencies()
            .filter_by(&DisciplineBlockCompetencyFilter {
                discipline_block_id: Some(block.id),
                ..Default::default()
            })
            .await?;
        for link in links {
            uow.discipline_block_competencies().delete(link.id).await?;
        }
        uow.discipline_blocks().delete(block.id).await?;
    }

    Ok(blocks.len())
}

/// Creates the blocks of one map core and their competency links.
async fn create_blocks(
    uow: &mut dyn UnitOfWork,
    map_core_id: MapCoreId,
    blocks: &[DisciplineBlockLoad],
) -> Result<usize, MapError> {
    for block in blocks {
        let created = uow.discipline_blocks().create(block.to_new(map_core_id)).await?;
        for competency in &block.competencies {
            uow.discipline_block_competencies()
                .create(NewDisciplineBlockCompetency {
                    discipline_block_id: created.id,
                    competency_id: competency.id,
                })
                .await?;
        }
    }
    Ok(blocks.len())
}

async fn read_map_core(
    uow: &mut dyn UnitOfWork,
    map_core_id: MapCoreId,
) -> Result<MapCoreUnload, MapError> {
    let core = uow
        .map_cores()
        .get_by_id(map_core_id)
        .await?
        .ok_or(MapError::MapCoreNotFound(map_core_id))?;

    let blocks = uow
        .discipline_blocks()
        .filter_by(&DisciplineBlockFilter {
            map_core_id: Some(map_core_id),
            ..Default::default()
        })
        .await?;

    let mut discipline_blocks = Vec::with_capacity(blocks.len());
    for block in blocks {
        let discipline = uow
            .disciplines()
            .get_by_id(block.discipline_id)
            .await?
            .ok_or(MapError::DisciplineNotFound(block.discipline_id))?;
        let department = uow
            .departments()
            .get_by_id(discipline.department_id)
            .await?
            .ok_or(MapError::DepartmentNotFound(discipline.department_id))?;
        let control_type = uow
            .control_types()
            .get_by_id(block.control_type_id)
            .await?
            .ok_or(MapError::ControlTypeNotFound(block.control_type_id))?;

        let links = uow
            .discipline_block_competencies()
            .filter_by(&DisciplineBlockCompetencyFilter {
                discipline_block_id: Some(block.id),
                ..Default::default()
            })
            .await?;
        let mut competencies = Vec::with_capacity(links.len());
        for link in links {
            match uow.competencies().get_by_id(link.competency_id).await? {
                Some(competency) => competencies.push(competency),
                None => warn!(
                    discipline_block_id = %block.id,
                    competency_id = %link.competency_id,
                    "Skipping link to missing competency"
                ),
            }
        }

        discipline_blocks.push(DisciplineBlockUnload {
            id: block.id,
            discipline: DisciplineUnload {
                id: discipline.id,
                name: discipline.name,
                short_name: discipline.short_name,
                department,
            },
            credit_units: block.credit_units,
            control_type,
            lecture_hours: block.lecture_hours,
            practice_hours: block.practice_hours,
            lab_hours: block.lab_hours,
            semester_number: block.semester_number,
            competencies,
        });
    }

    Ok(MapCoreUnload {
        id: core.id,
        name: core.name,
        semesters_count: core.semesters_count,
        discipline_blocks,
    })
}

#[async_trait]
impl MapService for StandardMapService {
    async fn load(&self, direction_id: DirectionId, payload: MapLoad) -> Result<(), MapError> {
        let started = Instant::now();

        let _direction_guard = self.locks.acquire(direction_id).await;
        let mut uow = self.store.begin().await?;
        uow.lock_direction(direction_id).await?;

        if let Err(e) = check_payload(uow.as_mut(), direction_id, &payload).await {
            metrics::counter!("edumap_map_loads_total", "outcome" => "rejected").increment(1);
            return Err(e);
        }

        let old_links = uow
            .direction_map_cores()
            .filter_by(&DirectionMapCoreFilter {
                direction_id: Some(direction_id),
                ..Default::default()
            })
            .await?;
        for link in &old_links {
            uow.direction_map_cores().delete(link.id).await?;
        }
        debug!(direction_id = %direction_id, removed = old_links.len(), "Direction map-core links cleared");

        let mut events = Vec::new();
        let mut map_core_ids = Vec::with_capacity(payload.map_cores.len());
        let mut block_total = 0;

        for core in &payload.map_cores {
            let (map_core_id, removed_blocks) = match core.id {
                Some(id) => (id, Some(clear_blocks(uow.as_mut(), id).await?)),
                None => {
                    let created = uow
                        .map_cores()
                        .create(NewMapCore {
                            name: core.name.clone(),
                            semesters_count: core.semesters_count,
                        })
                        .await?;
                    events.push(MapEvent::MapCoreCreated {
                        direction_id,
                        map_core_id: created.id,
                        name: created.name.clone(),
                        created_at: Utc::now(),
                    });
                    (created.id, None)
                }
            };

            uow.direction_map_cores()
                .create(NewDirectionMapCore {
                    direction_id,
                    map_core_id,
                })
                .await?;

            let created_blocks = create_blocks(uow.as_mut(), map_core_id, &core.discipline_blocks).await?;
            block_total += created_blocks;

            if let Some(removed_blocks) = removed_blocks {
                events.push(MapEvent::MapCoreBlocksReplaced {
                    direction_id,
                    map_core_id,
                    removed_blocks,
                    created_blocks,
                    replaced_at: Utc::now(),
                });
            }
            map_core_ids.push(map_core_id);
        }

        uow.commit().await?;

        info!(
            direction_id = %direction_id,
            map_cores = map_core_ids.len(),
            discipline_blocks = block_total,
            "Map loaded"
        );
        metrics::counter!("edumap_map_loads_total", "outcome" => "committed").increment(1);
        metrics::histogram!("edumap_map_load_duration_seconds").record(started.elapsed().as_secs_f64());

        for event in events {
            self.event_bus.publish_map_event(event);
        }
        self.event_bus.publish_map_event(MapEvent::MapLoaded {
            direction_id,
            map_core_ids,
            discipline_block_count: block_total,
            loaded_at: Utc::now(),
        });

        Ok(())
    }

    async fn unload(&self, direction_id: DirectionId) -> Result<MapUnload, MapError> {
        let mut uow = self.store.begin().await?;

        uow.directions()
            .get_by_id(direction_id)
            .await?
            .ok_or(MapError::DirectionNotFound(direction_id))?;

        let links = uow
            .direction_map_cores()
            .filter_by(&DirectionMapCoreFilter {
                direction_id: Some(direction_id),
                ..Default::default()
            })
            .await?;

        let mut map_cores = Vec::with_capacity(links.len());
        for link in links {
            map_cores.push(read_map_core(uow.as_mut(), link.map_core_id).await?);
        }

        debug!(direction_id = %direction_id, map_cores = map_cores.len(), "Map unloaded");
        metrics::counter!("edumap_map_unloads_total").increment(1);
        Ok(MapUnload { map_cores })
    }

    async fn unload_map_core(&self, map_core_id: MapCoreId) -> Result<MapCoreUnload, MapError> {
        let mut uow = self.store.begin().await?;
        let core = read_map_core(uow.as_mut(), map_core_id).await?;
        debug!(map_core_id = %map_core_id, blocks = core.discipline_blocks.len(), "Map core unloaded");
        Ok(core)
    }
}
