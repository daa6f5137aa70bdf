// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Map Payloads
//!
//! The nested shapes exchanged with callers of the map aggregate service:
//!
//! - [`MapLoad`]: what a client submits to replace a direction's map
//! - [`MapUnload`]: the read view rebuilt by joining map cores, blocks,
//!   disciplines, departments, control types and competencies
//!
//! Payload field names follow the wire format (`snake_case`). The historical
//! `map_cors` spelling is accepted on input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::{
    Competency, CompetencyId, ControlType, ControlTypeId, Department, DisciplineId,
};
use crate::domain::discipline_block::{DisciplineBlockId, NewDisciplineBlock};
use crate::domain::map_core::{MapCoreId, MAP_CORE_NAME_MAX_LEN};

// ============================================================================
// Load payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLoad {
    #[serde(alias = "map_cors")]
    pub map_cores: Vec<MapCoreLoad>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCoreLoad {
    /// Absent for a new map core; present to reuse (and regenerate) an existing one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MapCoreId>,
    pub name: String,
    pub semesters_count: u32,
    #[serde(default)]
    pub discipline_blocks: Vec<DisciplineBlockLoad>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineBlockLoad {
    pub discipline_id: DisciplineId,
    pub credit_units: u32,
    pub control_type_id: ControlTypeId,
    pub lecture_hours: u32,
    pub practice_hours: u32,
    pub lab_hours: u32,
    pub semester_number: u32,
    #[serde(default)]
    pub competencies: Vec<CompetencyRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyRef {
    pub id: CompetencyId,
}

/// Structural problems in a load payload, found before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("map core #{index}: name must be between 1 and {max} characters")]
    InvalidName { index: usize, max: usize },

    #[error("map core #{index}: semesters_count must be positive")]
    ZeroSemesters { index: usize },

    #[error("map core #{core}, block #{block}: credit_units must be positive")]
    ZeroCredits { core: usize, block: usize },

    #[error("map core #{core}, block #{block}: semester {semester} is outside 1..={semesters_count}")]
    SemesterOutOfRange {
        core: usize,
        block: usize,
        semester: u32,
        semesters_count: u32,
    },
}

impl MapLoad {
    /// Checks that do not need the record store.
    pub fn validate(&self) -> Result<(), PayloadError> {
        for (index, core) in self.map_cores.iter().enumerate() {
            let name_len = core.name.trim().chars().count();
            if name_len == 0 || core.name.chars().count() > MAP_CORE_NAME_MAX_LEN {
                return Err(PayloadError::InvalidName {
                    index,
                    max: MAP_CORE_NAME_MAX_LEN,
                });
            }
            if core.semesters_count == 0 {
                return Err(PayloadError::ZeroSemesters { index });
            }
            for (block_index, block) in core.discipline_blocks.iter().enumerate() {
                if block.credit_units == 0 {
                    return Err(PayloadError::ZeroCredits {
                        core: index,
                        block: block_index,
                    });
                }
            }
        }
        Ok(())
    }
}

impl MapCoreLoad {
    /// Every block's semester must fall inside the owning core's span.
    pub fn check_semesters(&self, index: usize, semesters_count: u32) -> Result<(), PayloadError> {
        for (block_index, block) in self.discipline_blocks.iter().enumerate() {
            if block.semester_number == 0 || block.semester_number > semesters_count {
                return Err(PayloadError::SemesterOutOfRange {
                    core: index,
                    block: block_index,
                    semester: block.semester_number,
                    semesters_count,
                });
            }
        }
        Ok(())
    }
}

impl DisciplineBlockLoad {
    pub fn to_new(&self, map_core_id: MapCoreId) -> NewDisciplineBlock {
        NewDisciplineBlock {
            discipline_id: self.discipline_id,
            credit_units: self.credit_units,
            control_type_id: self.control_type_id,
            lecture_hours: self.lecture_hours,
            practice_hours: self.practice_hours,
            lab_hours: self.lab_hours,
            semester_number: self.semester_number,
            map_core_id,
        }
    }
}

// ============================================================================
// Unload view
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapUnload {
    pub map_cores: Vec<MapCoreUnload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCoreUnload {
    pub id: MapCoreId,
    pub name: String,
    pub semesters_count: u32,
    pub discipline_blocks: Vec<DisciplineBlockUnload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineBlockUnload {
    pub id: DisciplineBlockId,
    pub discipline: DisciplineUnload,
    pub credit_units: u32,
    pub control_type: ControlType,
    pub lecture_hours: u32,
    pub practice_hours: u32,
    pub lab_hours: u32,
    pub semester_number: u32,
    pub competencies: Vec<Competency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineUnload {
    pub id: DisciplineId,
    pub name: String,
    pub short_name: String,
    pub department: Department,
}
