// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Discipline Block
//!
//! One curriculum line of a map core: a discipline taught in a given
//! semester with its credit units, hours, control type and linked
//! competencies. Blocks are always regenerated as a whole when their map core
//! is reloaded.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CompetencyId, ControlTypeId, DisciplineId};
use crate::domain::entity::{field_matches, patch_field, Entity};
use crate::domain::map_core::MapCoreId;

crate::record_id!(DisciplineBlockId);
crate::record_id!(DisciplineBlockCompetencyId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineBlock {
    pub id: DisciplineBlockId,
    pub discipline_id: DisciplineId,
    pub credit_units: u32,
    pub control_type_id: ControlTypeId,
    pub lecture_hours: u32,
    pub practice_hours: u32,
    pub lab_hours: u32,
    /// 1-based, at most the owning map core's semester count
    pub semester_number: u32,
    pub map_core_id: MapCoreId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDisciplineBlock {
    pub discipline_id: DisciplineId,
    pub credit_units: u32,
    pub control_type_id: ControlTypeId,
    pub lecture_hours: u32,
    pub practice_hours: u32,
    pub lab_hours: u32,
    pub semester_number: u32,
    pub map_core_id: MapCoreId,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplineBlockPatch {
    pub discipline_id: Option<DisciplineId>,
    pub credit_units: Option<u32>,
    pub control_type_id: Option<ControlTypeId>,
    pub lecture_hours: Option<u32>,
    pub practice_hours: Option<u32>,
    pub lab_hours: Option<u32>,
    pub semester_number: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplineBlockFilter {
    pub map_core_id: Option<MapCoreId>,
    pub discipline_id: Option<DisciplineId>,
    pub semester_number: Option<u32>,
}

impl Entity for DisciplineBlock {
    type Id = DisciplineBlockId;
    type New = NewDisciplineBlock;
    type Patch = DisciplineBlockPatch;
    type Filter = DisciplineBlockFilter;

    const COLLECTION: &'static str = "discipline_blocks";

    fn id(&self) -> DisciplineBlockId {
        self.id
    }

    fn from_new(id: DisciplineBlockId, new: NewDisciplineBlock) -> Self {
        Self {
            id,
            discipline_id: new.discipline_id,
            credit_units: new.credit_units,
            control_type_id: new.control_type_id,
            lecture_hours: new.lecture_hours,
            practice_hours: new.practice_hours,
            lab_hours: new.lab_hours,
            semester_number: new.semester_number,
            map_core_id: new.map_core_id,
        }
    }

    fn apply(&mut self, patch: DisciplineBlockPatch) {
        patch_field(&mut self.discipline_id, patch.discipline_id);
        patch_field(&mut self.credit_units, patch.credit_units);
        patch_field(&mut self.control_type_id, patch.control_type_id);
        patch_field(&mut self.lecture_hours, patch.lecture_hours);
        patch_field(&mut self.practice_hours, patch.practice_hours);
        patch_field(&mut self.lab_hours, patch.lab_hours);
        patch_field(&mut self.semester_number, patch.semester_number);
    }

    fn matches(&self, filter: &DisciplineBlockFilter) -> bool {
        field_matches(&filter.map_core_id, &self.map_core_id)
            && field_matches(&filter.discipline_id, &self.discipline_id)
            && field_matches(&filter.semester_number, &self.semester_number)
    }
}

/// Link between a discipline block and a competency it develops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineBlockCompetency {
    pub id: DisciplineBlockCompetencyId,
    pub discipline_block_id: DisciplineBlockId,
    pub competency_id: CompetencyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDisciplineBlockCompetency {
    pub discipline_block_id: DisciplineBlockId,
    pub competency_id: CompetencyId,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplineBlockCompetencyPatch {
    pub competency_id: Option<CompetencyId>,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplineBlockCompetencyFilter {
    pub discipline_block_id: Option<DisciplineBlockId>,
    pub competency_id: Option<CompetencyId>,
}

impl Entity for DisciplineBlockCompetency {
    type Id = DisciplineBlockCompetencyId;
    type New = NewDisciplineBlockCompetency;
    type Patch = DisciplineBlockCompetencyPatch;
    type Filter = DisciplineBlockCompetencyFilter;

    const COLLECTION: &'static str = "discipline_block_competencies";

    fn id(&self) -> DisciplineBlockCompetencyId {
        self.id
    }

    fn from_new(id: DisciplineBlockCompetencyId, new: NewDisciplineBlockCompetency) -> Self {
        Self {
            id,
            discipline_block_id: new.discipline_block_id,
            competency_id: new.competency_id,
        }
    }

    fn apply(&mut self, patch: DisciplineBlockCompetencyPatch) {
        patch_field(&mut self.competency_id, patch.competency_id);
    }

    fn matches(&self, filter: &DisciplineBlockCompetencyFilter) -> bool {
        field_matches(&filter.discipline_block_id, &self.discipline_block_id)
            && field_matches(&filter.competency_id, &self.competency_id)
    }
}
