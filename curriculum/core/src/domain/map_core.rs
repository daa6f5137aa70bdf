// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Map Core
//!
//! A map core (ядро карты) is a reusable curriculum skeleton: a named set of
//! discipline blocks spanning a fixed number of semesters. Directions reach
//! their map cores through [`DirectionMapCore`] link records, so one core
//! may be shared by several directions.

use serde::{Deserialize, Serialize};

use crate::domain::direction::DirectionId;
use crate::domain::entity::{field_matches, patch_field, Entity};

crate::record_id!(MapCoreId);
crate::record_id!(DirectionMapCoreId);

/// Longest accepted map core name.
pub const MAP_CORE_NAME_MAX_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCore {
    pub id: MapCoreId,
    pub name: String,
    pub semesters_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMapCore {
    pub name: String,
    pub semesters_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MapCorePatch {
    pub name: Option<String>,
    pub semesters_count: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct MapCoreFilter {
    pub name: Option<String>,
}

impl Entity for MapCore {
    type Id = MapCoreId;
    type New = NewMapCore;
    type Patch = MapCorePatch;
    type Filter = MapCoreFilter;

    const COLLECTION: &'static str = "map_cores";

    fn id(&self) -> MapCoreId {
        self.id
    }

    fn from_new(id: MapCoreId, new: NewMapCore) -> Self {
        Self {
            id,
            name: new.name,
            semesters_count: new.semesters_count,
        }
    }

    fn apply(&mut self, patch: MapCorePatch) {
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.semesters_count, patch.semesters_count);
    }

    fn matches(&self, filter: &MapCoreFilter) -> bool {
        field_matches(&filter.name, &self.name)
    }
}

/// Association between a direction and one of its map cores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionMapCore {
    pub id: DirectionMapCoreId,
    pub direction_id: DirectionId,
    pub map_core_id: MapCoreId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirectionMapCore {
    pub direction_id: DirectionId,
    pub map_core_id: MapCoreId,
}

/// Link rows are replaced, never edited; the patch carries the same columns
/// for uniformity with the other collections.
#[derive(Debug, Clone, Default)]
pub struct DirectionMapCorePatch {
    pub direction_id: Option<DirectionId>,
    pub map_core_id: Option<MapCoreId>,
}

#[derive(Debug, Clone, Default)]
pub struct DirectionMapCoreFilter {
    pub direction_id: Option<DirectionId>,
    pub map_core_id: Option<MapCoreId>,
}

impl Entity for DirectionMapCore {
    type Id = DirectionMapCoreId;
    type New = NewDirectionMapCore;
    type Patch = DirectionMapCorePatch;
    type Filter = DirectionMapCoreFilter;

    const COLLECTION: &'static str = "direction_map_cores";

    fn id(&self) -> DirectionMapCoreId {
        self.id
    }

    fn from_new(id: DirectionMapCoreId, new: NewDirectionMapCore) -> Self {
        Self {
            id,
            direction_id: new.direction_id,
            map_core_id: new.map_core_id,
        }
    }

    fn apply(&mut self, patch: DirectionMapCorePatch) {
        patch_field(&mut self.direction_id, patch.direction_id);
        patch_field(&mut self.map_core_id, patch.map_core_id);
    }

    fn matches(&self, filter: &DirectionMapCoreFilter) -> bool {
        field_matches(&filter.direction_id, &self.direction_id)
            && field_matches(&filter.map_core_id, &self.map_core_id)
    }
}
