// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog Import Use Case
//!
//! Seeds the reference collections a map refers to (departments,
//! disciplines, control types, competencies, directions) from a YAML file.
//! Records whose natural key already exists are skipped, so importing the
//! same file twice is harmless. The whole import is one unit of work.
//!
//! ```yaml
//! departments:
//!   - name: Кафедра информационных систем и технологий
//!     short_name: ИСТ
//! disciplines:
//!   - name: Программирование
//!     short_name: Прог
//!     department: ИСТ
//! control_types:
//!   - name: Экзамен
//! competencies:
//!   - code: УК-1
//!     name: Системное мышление
//!     group_id: 1
//! directions:
//!   - name: Информационные системы и технологии
//!     educational_level_id: 1
//!     educational_form_id: 1
//!     semester_count: 8
//! ```

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::catalog::{
    CompetencyFilter, CompetencyGroupId, ControlTypeFilter, DepartmentFilter, DisciplineFilter,
    NewCompetency, NewControlType, NewDepartment, NewDiscipline,
};
use crate::domain::direction::{DirectionFilter, EducationalFormId, EducationalLevelId, NewDirection};
use crate::domain::entity::Entity;
use crate::domain::events::CatalogEvent;
use crate::domain::repository::{Repository, RepositoryError, UnitOfWorkFactory};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub departments: Vec<DepartmentSeed>,
    #[serde(default)]
    pub disciplines: Vec<DisciplineSeed>,
    #[serde(default)]
    pub control_types: Vec<ControlTypeSeed>,
    #[serde(default)]
    pub competencies: Vec<CompetencySeed>,
    #[serde(default)]
    pub directions: Vec<DirectionSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSeed {
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineSeed {
    pub name: String,
    pub short_name: String,
    /// Short name of the owning department
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTypeSeed {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencySeed {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub group_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionSeed {
    pub name: String,
    pub educational_level_id: i64,
    pub educational_form_id: i64,
    pub semester_count: u32,
}

impl CatalogSeed {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Department not found: {0}")]
    DepartmentNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
}

async fn create_unless_exists<E: Entity>(
    repo: &mut dyn Repository<E>,
    filter: E::Filter,
    new: E::New,
    summary: &mut ImportSummary,
) -> Result<(), RepositoryError> {
    if repo.exists(&filter).await? {
        debug!(collection = E::COLLECTION, ?filter, "Already present, skipping");
        summary.skipped += 1;
    } else {
        let created = repo.create(new).await?;
        debug!(collection = E::COLLECTION, id = %created.id(), "Imported");
        summary.created += 1;
    }
    Ok(())
}

pub struct CatalogImportService {
    store: Arc<dyn UnitOfWorkFactory>,
    event_bus: Arc<EventBus>,
}

impl CatalogImportService {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>, event_bus: Arc<EventBus>) -> Self {
        Self { store, event_bus }
    }

    pub async fn import(&self, seed: &CatalogSeed) -> Result<ImportSummary, CatalogError> {
        let mut summary = ImportSummary::default();
        let mut uow = self.store.begin().await?;

        for department in &seed.departments {
            create_unless_exists(
                uow.departments(),
                DepartmentFilter {
                    short_name: Some(department.short_name.clone()),
                    ..Default::default()
                },
                NewDepartment {
                    name: department.name.clone(),
                    short_name: department.short_name.clone(),
                },
                &mut summary,
            )
            .await?;
        }

        for discipline in &seed.disciplines {
            let department = uow
                .departments()
                .filter_by(&DepartmentFilter {
                    short_name: Some(discipline.department.clone()),
                    ..Default::default()
                })
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| CatalogError::DepartmentNotFound(discipline.department.clone()))?;

            create_unless_exists(
                uow.disciplines(),
                DisciplineFilter {
                    name: Some(discipline.name.clone()),
                    department_id: Some(department.id),
                    ..Default::default()
                },
                NewDiscipline {
                    name: discipline.name.clone(),
                    short_name: discipline.short_name.clone(),
                    department_id: department.id,
                },
                &mut summary,
            )
            .await?;
        }

        for control_type in &seed.control_types {
            create_unless_exists(
                uow.control_types(),
                ControlTypeFilter {
                    name: Some(control_type.name.clone()),
                },
                NewControlType {
                    name: control_type.name.clone(),
                },
                &mut summary,
            )
            .await?;
        }

        for competency in &seed.competencies {
            create_unless_exists(
                uow.competencies(),
                CompetencyFilter {
                    code: Some(competency.code.clone()),
                    ..Default::default()
                },
                NewCompetency {
                    code: competency.code.clone(),
                    name: competency.name.clone(),
                    description: competency.description.clone(),
                    competency_group_id: CompetencyGroupId(competency.group_id),
                },
                &mut summary,
            )
            .await?;
        }

        for direction in &seed.directions {
            create_unless_exists(
                uow.directions(),
                DirectionFilter {
                    name: Some(direction.name.clone()),
                    ..Default::default()
                },
                NewDirection {
                    name: direction.name.clone(),
                    educational_level_id: EducationalLevelId(direction.educational_level_id),
                    educational_form_id: EducationalFormId(direction.educational_form_id),
                    semester_count: direction.semester_count,
                },
                &mut summary,
            )
            .await?;
        }

        uow.commit().await?;

        info!(created = summary.created, skipped = summary.skipped, "Catalog imported");
        metrics::counter!("edumap_catalog_records_created_total").increment(summary.created as u64);
        self.event_bus.publish_catalog_event(CatalogEvent::CatalogImported {
            created: summary.created,
            skipped: summary.skipped,
            imported_at: Utc::now(),
        });

        Ok(summary)
    }
}
