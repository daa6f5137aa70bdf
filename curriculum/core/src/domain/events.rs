// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain events published after a curriculum operation has committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::direction::DirectionId;
use crate::domain::map_core::MapCoreId;

/// Map aggregate events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MapEvent {
    MapCoreCreated {
        direction_id: DirectionId,
        map_core_id: MapCoreId,
        name: String,
        created_at: DateTime<Utc>,
    },
    /// Blocks of a map core were regenerated from a load payload
    MapCoreBlocksReplaced {
        direction_id: DirectionId,
        map_core_id: MapCoreId,
        removed_blocks: usize,
        created_blocks: usize,
        replaced_at: DateTime<Utc>,
    },
    MapLoaded {
        direction_id: DirectionId,
        map_core_ids: Vec<MapCoreId>,
        discipline_block_count: usize,
        loaded_at: DateTime<Utc>,
    },
}

impl MapEvent {
    pub fn direction_id(&self) -> DirectionId {
        match self {
            MapEvent::MapCoreCreated { direction_id, .. }
            | MapEvent::MapCoreBlocksReplaced { direction_id, .. }
            | MapEvent::MapLoaded { direction_id, .. } => *direction_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanEvent {
    PlanValidated {
        semesters_count: usize,
        is_valid: bool,
        blocking_count: usize,
        warning_count: usize,
        validated_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CatalogEvent {
    CatalogImported {
        created: usize,
        skipped: usize,
        imported_at: DateTime<Utc>,
    },
}
