// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Reference Catalog
//!
//! Records a discipline block points at: departments, disciplines, control
//! types (exam, credit, graded credit) and competencies. They are maintained
//! outside the map aggregate and only read by it.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{field_matches, patch_field, Entity};

crate::record_id!(
    /// Department (кафедра) identifier
    DepartmentId
);
crate::record_id!(DisciplineId);
crate::record_id!(ControlTypeId);
crate::record_id!(CompetencyId);
crate::record_id!(
    /// Competency group identifier; groups are referenced, not stored here
    CompetencyGroupId
);

// ============================================================================
// Department
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentFilter {
    pub name: Option<String>,
    pub short_name: Option<String>,
}

impl Entity for Department {
    type Id = DepartmentId;
    type New = NewDepartment;
    type Patch = DepartmentPatch;
    type Filter = DepartmentFilter;

    const COLLECTION: &'static str = "departments";

    fn id(&self) -> DepartmentId {
        self.id
    }

    fn from_new(id: DepartmentId, new: NewDepartment) -> Self {
        Self {
            id,
            name: new.name,
            short_name: new.short_name,
        }
    }

    fn apply(&mut self, patch: DepartmentPatch) {
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.short_name, patch.short_name);
    }

    fn matches(&self, filter: &DepartmentFilter) -> bool {
        field_matches(&filter.name, &self.name) && field_matches(&filter.short_name, &self.short_name)
    }
}

// ============================================================================
// Discipline
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: DisciplineId,
    pub name: String,
    pub short_name: String,
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiscipline {
    pub name: String,
    pub short_name: String,
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplinePatch {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplineFilter {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub department_id: Option<DepartmentId>,
}

impl Entity for Discipline {
    type Id = DisciplineId;
    type New = NewDiscipline;
    type Patch = DisciplinePatch;
    type Filter = DisciplineFilter;

    const COLLECTION: &'static str = "disciplines";

    fn id(&self) -> DisciplineId {
        self.id
    }

    fn from_new(id: DisciplineId, new: NewDiscipline) -> Self {
        Self {
            id,
            name: new.name,
            short_name: new.short_name,
            department_id: new.department_id,
        }
    }

    fn apply(&mut self, patch: DisciplinePatch) {
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.short_name, patch.short_name);
        patch_field(&mut self.department_id, patch.department_id);
    }

    fn matches(&self, filter: &DisciplineFilter) -> bool {
        field_matches(&filter.name, &self.name)
            && field_matches(&filter.short_name, &self.short_name)
            && field_matches(&filter.department_id, &self.department_id)
    }
}

// ============================================================================
// Control type
// ============================================================================

/// Form of final control of a discipline block (экзамен, зачет, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlType {
    pub id: ControlTypeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewControlType {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ControlTypePatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ControlTypeFilter {
    pub name: Option<String>,
}

impl Entity for ControlType {
    type Id = ControlTypeId;
    type New = NewControlType;
    type Patch = ControlTypePatch;
    type Filter = ControlTypeFilter;

    const COLLECTION: &'static str = "control_types";

    fn id(&self) -> ControlTypeId {
        self.id
    }

    fn from_new(id: ControlTypeId, new: NewControlType) -> Self {
        Self { id, name: new.name }
    }

    fn apply(&mut self, patch: ControlTypePatch) {
        patch_field(&mut self.name, patch.name);
    }

    fn matches(&self, filter: &ControlTypeFilter) -> bool {
        field_matches(&filter.name, &self.name)
    }
}

// ============================================================================
// Competency
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competency {
    pub id: CompetencyId,
    /// Accreditation code, e.g. `УК-3`
    pub code: String,
    pub name: String,
    pub description: String,
    pub competency_group_id: CompetencyGroupId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompetency {
    pub code: String,
    pub name: String,
    pub description: String,
    pub competency_group_id: CompetencyGroupId,
}

#[derive(Debug, Clone, Default)]
pub struct CompetencyPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub competency_group_id: Option<CompetencyGroupId>,
}

#[derive(Debug, Clone, Default)]
pub struct CompetencyFilter {
    pub code: Option<String>,
    pub competency_group_id: Option<CompetencyGroupId>,
}

impl Entity for Competency {
    type Id = CompetencyId;
    type New = NewCompetency;
    type Patch = CompetencyPatch;
    type Filter = CompetencyFilter;

    const COLLECTION: &'static str = "competencies";

    fn id(&self) -> CompetencyId {
        self.id
    }

    fn from_new(id: CompetencyId, new: NewCompetency) -> Self {
        Self {
            id,
            code: new.code,
            name: new.name,
            description: new.description,
            competency_group_id: new.competency_group_id,
        }
    }

    fn apply(&mut self, patch: CompetencyPatch) {
        patch_field(&mut self.code, patch.code);
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.description, patch.description);
        patch_field(&mut self.competency_group_id, patch.competency_group_id);
    }

    fn matches(&self, filter: &CompetencyFilter) -> bool {
        field_matches(&filter.code, &self.code)
            && field_matches(&filter.competency_group_id, &self.competency_group_id)
    }
}
