// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Direction of study (направление подготовки): the program a map is loaded for.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{field_matches, patch_field, Entity};

crate::record_id!(DirectionId);
crate::record_id!(
    /// Educational level (bachelor, master, ...), referenced by id only
    EducationalLevelId
);
crate::record_id!(
    /// Educational form (full-time, part-time, ...), referenced by id only
    EducationalFormId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub id: DirectionId,
    pub name: String,
    pub educational_level_id: EducationalLevelId,
    pub educational_form_id: EducationalFormId,
    pub semester_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirection {
    pub name: String,
    pub educational_level_id: EducationalLevelId,
    pub educational_form_id: EducationalFormId,
    pub semester_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DirectionPatch {
    pub name: Option<String>,
    pub educational_level_id: Option<EducationalLevelId>,
    pub educational_form_id: Option<EducationalFormId>,
    pub semester_count: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct DirectionFilter {
    pub name: Option<String>,
    pub educational_level_id: Option<EducationalLevelId>,
    pub educational_form_id: Option<EducationalFormId>,
}

impl Entity for Direction {
    type Id = DirectionId;
    type New = NewDirection;
    type Patch = DirectionPatch;
    type Filter = DirectionFilter;

    const COLLECTION: &'static str = "directions";

    fn id(&self) -> DirectionId {
        self.id
    }

    fn from_new(id: DirectionId, new: NewDirection) -> Self {
        Self {
            id,
            name: new.name,
            educational_level_id: new.educational_level_id,
            educational_form_id: new.educational_form_id,
            semester_count: new.semester_count,
        }
    }

    fn apply(&mut self, patch: DirectionPatch) {
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.educational_level_id, patch.educational_level_id);
        patch_field(&mut self.educational_form_id, patch.educational_form_id);
        patch_field(&mut self.semester_count, patch.semester_count);
    }

    fn matches(&self, filter: &DirectionFilter) -> bool {
        field_matches(&filter.name, &self.name)
            && field_matches(&filter.educational_level_id, &self.educational_level_id)
            && field_matches(&filter.educational_form_id, &self.educational_form_id)
    }
}
