// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Record Store
//!
//! Production [`UnitOfWorkFactory`] backed by the tables created in
//! `migrations/0001_curriculum.sql`. Each unit of work owns one database
//! transaction; every repository it hands out runs its statements on that
//! transaction.
//!
//! Statements are assembled per collection from a [`PgEntity`] column
//! description with `sqlx::QueryBuilder`, so values are always bound and
//! never interpolated. Integer columns are `BIGINT`; counts and hours are
//! range-checked into `u32` when decoded.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::catalog::{
    Competency, CompetencyFilter, CompetencyGroupId, CompetencyId, CompetencyPatch, ControlType,
    ControlTypeFilter, ControlTypeId, ControlTypePatch, Department, DepartmentFilter, DepartmentId,
    DepartmentPatch, Discipline, DisciplineFilter, DisciplineId, DisciplinePatch, NewCompetency,
    NewControlType, NewDepartment, NewDiscipline,
};
use crate::domain::direction::{
    Direction, DirectionFilter, DirectionId, DirectionPatch, EducationalFormId,
    EducationalLevelId, NewDirection,
};
use crate::domain::discipline_block::{
    DisciplineBlock, DisciplineBlockCompetency, DisciplineBlockCompetencyFilter,
    DisciplineBlockCompetencyId, DisciplineBlockCompetencyPatch, DisciplineBlockFilter,
    DisciplineBlockId, DisciplineBlockPatch, NewDisciplineBlock, NewDisciplineBlockCompetency,
};
use crate::domain::entity::{Entity, RecordId};
use crate::domain::map_core::{
    DirectionMapCore, DirectionMapCoreFilter, DirectionMapCoreId, DirectionMapCorePatch, MapCore,
    MapCoreFilter, MapCoreId, MapCorePatch, NewDirectionMapCore, NewMapCore,
};
use crate::domain::repository::{Repository, RepositoryError, UnitOfWork, UnitOfWorkFactory};

type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// A bindable column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

fn id_value<I: RecordId>(id: I) -> SqlValue {
    SqlValue::Int(id.raw())
}

/// Table layout of an entity stored in PostgreSQL.
pub trait PgEntity: Entity {
    const TABLE: &'static str;

    /// Every column except `id`, in select order.
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    fn new_columns(new: &Self::New) -> Vec<(&'static str, SqlValue)>;

    fn patch_columns(patch: &Self::Patch) -> Vec<(&'static str, SqlValue)>;

    fn filter_columns(filter: &Self::Filter) -> Vec<(&'static str, SqlValue)>;
}

fn get_id<I: RecordId>(row: &PgRow, column: &str) -> Result<I, sqlx::Error> {
    Ok(I::from_raw(row.try_get::<i64, _>(column)?))
}

fn get_u32(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Appends `(column, value)` for every set option.
macro_rules! columns {
    ($($column:literal => $value:expr),* $(,)?) => {{
        let mut columns: Vec<(&'static str, SqlValue)> = Vec::new();
        $(
            if let Some(value) = $value {
                columns.push(($column, SqlValue::from(value)));
            }
        )*
        columns
    }};
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Int(v) => {
            qb.push_bind(v);
        }
        SqlValue::Text(v) => {
            qb.push_bind(v);
        }
    }
}

fn push_select<E: PgEntity>(qb: &mut QueryBuilder<'static, Postgres>) {
    qb.push("id");
    for column in E::COLUMNS {
        qb.push(", ").push(*column);
    }
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, conditions: Vec<(&'static str, SqlValue)>) {
    for (i, (column, value)) in conditions.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(column).push(" = ");
        push_value(qb, value);
    }
}

fn select<E: PgEntity>() -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    push_select::<E>(&mut qb);
    qb.push(" FROM ").push(E::TABLE);
    qb
}

/// One collection seen through a shared transaction.
pub struct PgTable<E> {
    tx: SharedTx,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgTable<E> {
    fn new(tx: SharedTx) -> Self {
        Self {
            tx,
            _entity: PhantomData,
        }
    }
}

impl<E: PgEntity> PgTable<E> {
    async fn fetch_all(&self, mut qb: QueryBuilder<'static, Postgres>) -> Result<Vec<E>, RepositoryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RepositoryError::TransactionFinished)?;
        let rows = qb.build().fetch_all(&mut **tx).await?;
        rows.iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    async fn fetch_optional(
        &self,
        mut qb: QueryBuilder<'static, Postgres>,
    ) -> Result<Option<E>, RepositoryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RepositoryError::TransactionFinished)?;
        let row = qb.build().fetch_optional(&mut **tx).await?;
        row.as_ref()
            .map(E::from_row)
            .transpose()
            .map_err(RepositoryError::from)
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgTable<E> {
    async fn get_all(&mut self) -> Result<Vec<E>, RepositoryError> {
        let mut qb = select::<E>();
        qb.push(" ORDER BY id");
        self.fetch_all(qb).await
    }

    async fn get_by_id(&mut self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let mut qb = select::<E>();
        push_where(&mut qb, vec![("id", id_value(id))]);
        self.fetch_optional(qb).await
    }

    async fn create(&mut self, new: E::New) -> Result<E, RepositoryError> {
        let columns = E::new_columns(&new);
        let mut qb = QueryBuilder::new("INSERT INTO ");
        qb.push(E::TABLE).push(" (");
        for (i, (column, _)) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column);
        }
        qb.push(") VALUES (");
        for (i, (_, value)) in columns.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(") RETURNING ");
        push_select::<E>(&mut qb);

        let created = self
            .fetch_optional(qb)
            .await?
            .ok_or_else(|| RepositoryError::Database(format!("insert into {} returned no row", E::TABLE)))?;
        debug!(collection = E::COLLECTION, id = %created.id(), "Record created");
        Ok(created)
    }

    async fn update(&mut self, id: E::Id, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let columns = E::patch_columns(&patch);
        if columns.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(E::TABLE).push(" SET ");
        for (i, (column, value)) in columns.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column).push(" = ");
            push_value(&mut qb, value);
        }
        push_where(&mut qb, vec![("id", id_value(id))]);
        qb.push(" RETURNING ");
        push_select::<E>(&mut qb);
        self.fetch_optional(qb).await
    }

    async fn delete(&mut self, id: E::Id) -> Result<bool, RepositoryError> {
        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(E::TABLE);
        push_where(&mut qb, vec![("id", id_value(id))]);

        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RepositoryError::TransactionFinished)?;
        let result = qb.build().execute(&mut **tx).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn filter_by(&mut self, filter: &E::Filter) -> Result<Vec<E>, RepositoryError> {
        let mut qb = select::<E>();
        push_where(&mut qb, E::filter_columns(filter));
        qb.push(" ORDER BY id");
        self.fetch_all(qb).await
    }

    async fn exists(&mut self, filter: &E::Filter) -> Result<bool, RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM ");
        qb.push(E::TABLE);
        push_where(&mut qb, E::filter_columns(filter));
        qb.push(")");

        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RepositoryError::TransactionFinished)?;
        let row = qb.build().fetch_one(&mut **tx).await?;
        Ok(row.try_get::<bool, _>(0)?)
    }
}

// ============================================================================
// Table layouts
// ============================================================================

impl PgEntity for Direction {
    const TABLE: &'static str = "directions";
    const COLUMNS: &'static [&'static str] =
        &["name", "educational_level_id", "educational_form_id", "semester_count"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Direction {
            id: get_id::<DirectionId>(row, "id")?,
            name: row.try_get("name")?,
            educational_level_id: get_id::<EducationalLevelId>(row, "educational_level_id")?,
            educational_form_id: get_id::<EducationalFormId>(row, "educational_form_id")?,
            semester_count: get_u32(row, "semester_count")?,
        })
    }

    fn new_columns(new: &NewDirection) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", new.name.as_str().into()),
            ("educational_level_id", id_value(new.educational_level_id)),
            ("educational_form_id", id_value(new.educational_form_id)),
            ("semester_count", new.semester_count.into()),
        ]
    }

    fn patch_columns(patch: &DirectionPatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => patch.name.clone(),
            "educational_level_id" => patch.educational_level_id.map(|id| id.0),
            "educational_form_id" => patch.educational_form_id.map(|id| id.0),
            "semester_count" => patch.semester_count,
        }
    }

    fn filter_columns(filter: &DirectionFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => filter.name.clone(),
            "educational_level_id" => filter.educational_level_id.map(|id| id.0),
            "educational_form_id" => filter.educational_form_id.map(|id| id.0),
        }
    }
}

impl PgEntity for MapCore {
    const TABLE: &'static str = "map_cores";
    const COLUMNS: &'static [&'static str] = &["name", "semesters_count"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(MapCore {
            id: get_id::<MapCoreId>(row, "id")?,
            name: row.try_get("name")?,
            semesters_count: get_u32(row, "semesters_count")?,
        })
    }

    fn new_columns(new: &NewMapCore) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", new.name.as_str().into()),
            ("semesters_count", new.semesters_count.into()),
        ]
    }

    fn patch_columns(patch: &MapCorePatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => patch.name.clone(),
            "semesters_count" => patch.semesters_count,
        }
    }

    fn filter_columns(filter: &MapCoreFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => filter.name.clone(),
        }
    }
}

impl PgEntity for DirectionMapCore {
    const TABLE: &'static str = "direction_map_cores";
    const COLUMNS: &'static [&'static str] = &["direction_id", "map_core_id"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(DirectionMapCore {
            id: get_id::<DirectionMapCoreId>(row, "id")?,
            direction_id: get_id::<DirectionId>(row, "direction_id")?,
            map_core_id: get_id::<MapCoreId>(row, "map_core_id")?,
        })
    }

    fn new_columns(new: &NewDirectionMapCore) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("direction_id", id_value(new.direction_id)),
            ("map_core_id", id_value(new.map_core_id)),
        ]
    }

    fn patch_columns(patch: &DirectionMapCorePatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "direction_id" => patch.direction_id.map(|id| id.0),
            "map_core_id" => patch.map_core_id.map(|id| id.0),
        }
    }

    fn filter_columns(filter: &DirectionMapCoreFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "direction_id" => filter.direction_id.map(|id| id.0),
            "map_core_id" => filter.map_core_id.map(|id| id.0),
        }
    }
}

impl PgEntity for DisciplineBlock {
    const TABLE: &'static str = "discipline_blocks";
    const COLUMNS: &'static [&'static str] = &[
        "discipline_id",
        "credit_units",
        "control_type_id",
        "lecture_hours",
        "practice_hours",
        "lab_hours",
        "semester_number",
        "map_core_id",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(DisciplineBlock {
            id: get_id::<DisciplineBlockId>(row, "id")?,
            discipline_id: get_id::<DisciplineId>(row, "discipline_id")?,
            credit_units: get_u32(row, "credit_units")?,
            control_type_id: get_id::<ControlTypeId>(row, "control_type_id")?,
            lecture_hours: get_u32(row, "lecture_hours")?,
            practice_hours: get_u32(row, "practice_hours")?,
            lab_hours: get_u32(row, "lab_hours")?,
            semester_number: get_u32(row, "semester_number")?,
            map_core_id: get_id::<MapCoreId>(row, "map_core_id")?,
        })
    }

    fn new_columns(new: &NewDisciplineBlock) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("discipline_id", id_value(new.discipline_id)),
            ("credit_units", new.credit_units.into()),
            ("control_type_id", id_value(new.control_type_id)),
            ("lecture_hours", new.lecture_hours.into()),
            ("practice_hours", new.practice_hours.into()),
            ("lab_hours", new.lab_hours.into()),
            ("semester_number", new.semester_number.into()),
            ("map_core_id", id_value(new.map_core_id)),
        ]
    }

    fn patch_columns(patch: &DisciplineBlockPatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "discipline_id" => patch.discipline_id.map(|id| id.0),
            "credit_units" => patch.credit_units,
            "control_type_id" => patch.control_type_id.map(|id| id.0),
            "lecture_hours" => patch.lecture_hours,
            "practice_hours" => patch.practice_hours,
            "lab_hours" => patch.lab_hours,
            "semester_number" => patch.semester_number,
        }
    }

    fn filter_columns(filter: &DisciplineBlockFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "map_core_id" => filter.map_core_id.map(|id| id.0),
            "discipline_id" => filter.discipline_id.map(|id| id.0),
            "semester_number" => filter.semester_number,
        }
    }
}

impl PgEntity for DisciplineBlockCompetency {
    const TABLE: &'static str = "discipline_block_competencies";
    const COLUMNS: &'static [&'static str] = &["discipline_block_id", "competency_id"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(DisciplineBlockCompetency {
            id: get_id::<DisciplineBlockCompetencyId>(row, "id")?,
            discipline_block_id: get_id::<DisciplineBlockId>(row, "discipline_block_id")?,
            competency_id: get_id::<CompetencyId>(row, "competency_id")?,
        })
    }

    fn new_columns(new: &NewDisciplineBlockCompetency) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("discipline_block_id", id_value(new.discipline_block_id)),
            ("competency_id", id_value(new.competency_id)),
        ]
    }

    fn patch_columns(patch: &DisciplineBlockCompetencyPatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "competency_id" => patch.competency_id.map(|id| id.0),
        }
    }

    fn filter_columns(filter: &DisciplineBlockCompetencyFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "discipline_block_id" => filter.discipline_block_id.map(|id| id.0),
            "competency_id" => filter.competency_id.map(|id| id.0),
        }
    }
}

impl PgEntity for Discipline {
    const TABLE: &'static str = "disciplines";
    const COLUMNS: &'static [&'static str] = &["name", "short_name", "department_id"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Discipline {
            id: get_id::<DisciplineId>(row, "id")?,
            name: row.try_get("name")?,
            short_name: row.try_get("short_name")?,
            department_id: get_id::<DepartmentId>(row, "department_id")?,
        })
    }

    fn new_columns(new: &NewDiscipline) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", new.name.as_str().into()),
            ("short_name", new.short_name.as_str().into()),
            ("department_id", id_value(new.department_id)),
        ]
    }

    fn patch_columns(patch: &DisciplinePatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => patch.name.clone(),
            "short_name" => patch.short_name.clone(),
            "department_id" => patch.department_id.map(|id| id.0),
        }
    }

    fn filter_columns(filter: &DisciplineFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => filter.name.clone(),
            "short_name" => filter.short_name.clone(),
            "department_id" => filter.department_id.map(|id| id.0),
        }
    }
}

impl PgEntity for Department {
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] = &["name", "short_name"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Department {
            id: get_id::<DepartmentId>(row, "id")?,
            name: row.try_get("name")?,
            short_name: row.try_get("short_name")?,
        })
    }

    fn new_columns(new: &NewDepartment) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", new.name.as_str().into()),
            ("short_name", new.short_name.as_str().into()),
        ]
    }

    fn patch_columns(patch: &DepartmentPatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => patch.name.clone(),
            "short_name" => patch.short_name.clone(),
        }
    }

    fn filter_columns(filter: &DepartmentFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => filter.name.clone(),
            "short_name" => filter.short_name.clone(),
        }
    }
}

impl PgEntity for ControlType {
    const TABLE: &'static str = "control_types";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(ControlType {
            id: get_id::<ControlTypeId>(row, "id")?,
            name: row.try_get("name")?,
        })
    }

    fn new_columns(new: &NewControlType) -> Vec<(&'static str, SqlValue)> {
        vec![("name", new.name.as_str().into())]
    }

    fn patch_columns(patch: &ControlTypePatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => patch.name.clone(),
        }
    }

    fn filter_columns(filter: &ControlTypeFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "name" => filter.name.clone(),
        }
    }
}

impl PgEntity for Competency {
    const TABLE: &'static str = "competencies";
    const COLUMNS: &'static [&'static str] = &["code", "name", "description", "competency_group_id"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Competency {
            id: get_id::<CompetencyId>(row, "id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            competency_group_id: get_id::<CompetencyGroupId>(row, "competency_group_id")?,
        })
    }

    fn new_columns(new: &NewCompetency) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("code", new.code.as_str().into()),
            ("name", new.name.as_str().into()),
            ("description", new.description.as_str().into()),
            ("competency_group_id", id_value(new.competency_group_id)),
        ]
    }

    fn patch_columns(patch: &CompetencyPatch) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "code" => patch.code.clone(),
            "name" => patch.name.clone(),
            "description" => patch.description.clone(),
            "competency_group_id" => patch.competency_group_id.map(|id| id.0),
        }
    }

    fn filter_columns(filter: &CompetencyFilter) -> Vec<(&'static str, SqlValue)> {
        columns! {
            "code" => filter.code.clone(),
            "competency_group_id" => filter.competency_group_id.map(|id| id.0),
        }
    }
}

// ============================================================================
// Unit of work
// ============================================================================

/// Opens one PostgreSQL transaction per unit of work.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

pub struct PostgresUnitOfWork {
    tx: SharedTx,
    directions: PgTable<Direction>,
    map_cores: PgTable<MapCore>,
    direction_map_cores: PgTable<DirectionMapCore>,
    discipline_blocks: PgTable<DisciplineBlock>,
    discipline_block_competencies: PgTable<DisciplineBlockCompetency>,
    disciplines: PgTable<Discipline>,
    departments: PgTable<Department>,
    control_types: PgTable<ControlType>,
    competencies: PgTable<Competency>,
}

impl PostgresUnitOfWork {
    fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx: SharedTx = Arc::new(Mutex::new(Some(tx)));
        Self {
            directions: PgTable::new(tx.clone()),
            map_cores: PgTable::new(tx.clone()),
            direction_map_cores: PgTable::new(tx.clone()),
            discipline_blocks: PgTable::new(tx.clone()),
            discipline_block_competencies: PgTable::new(tx.clone()),
            disciplines: PgTable::new(tx.clone()),
            departments: PgTable::new(tx.clone()),
            control_types: PgTable::new(tx.clone()),
            competencies: PgTable::new(tx.clone()),
            tx,
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn directions(&mut self) -> &mut dyn Repository<Direction> {
        &mut self.directions
    }

    fn map_cores(&mut self) -> &mut dyn Repository<MapCore> {
        &mut self.map_cores
    }

    fn direction_map_cores(&mut self) -> &mut dyn Repository<DirectionMapCore> {
        &mut self.direction_map_cores
    }

    fn discipline_blocks(&mut self) -> &mut dyn Repository<DisciplineBlock> {
        &mut self.discipline_blocks
    }

    fn discipline_block_competencies(&mut self) -> &mut dyn Repository<DisciplineBlockCompetency> {
        &mut self.discipline_block_competencies
    }

    fn disciplines(&mut self) -> &mut dyn Repository<Discipline> {
        &mut self.disciplines
    }

    fn departments(&mut self) -> &mut dyn Repository<Department> {
        &mut self.departments
    }

    fn control_types(&mut self) -> &mut dyn Repository<ControlType> {
        &mut self.control_types
    }

    fn competencies(&mut self) -> &mut dyn Repository<Competency> {
        &mut self.competencies
    }

    async fn lock_direction(&mut self, id: DirectionId) -> Result<(), RepositoryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RepositoryError::TransactionFinished)?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(id.0)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(RepositoryError::TransactionFinished)?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_columns_only_lists_set_fields() {
        let patch = DisciplineBlockPatch {
            credit_units: Some(4),
            semester_number: Some(2),
            ..Default::default()
        };
        assert_eq!(
            DisciplineBlock::patch_columns(&patch),
            vec![("credit_units", SqlValue::Int(4)), ("semester_number", SqlValue::Int(2))]
        );
        assert!(MapCore::patch_columns(&MapCorePatch::default()).is_empty());
    }

    #[test]
    fn test_new_columns_follow_column_list() {
        let new = NewDisciplineBlock {
            discipline_id: DisciplineId(1),
            credit_units: 3,
            control_type_id: ControlTypeId(2),
            lecture_hours: 18,
            practice_hours: 18,
            lab_hours: 0,
            semester_number: 1,
            map_core_id: MapCoreId(5),
        };
        let names: Vec<&str> = DisciplineBlock::new_columns(&new).into_iter().map(|(c, _)| c).collect();
        assert_eq!(names, DisciplineBlock::COLUMNS);
    }

    #[test]
    fn test_filter_sql() {
        let filter = DisciplineBlockFilter {
            map_core_id: Some(MapCoreId(3)),
            ..Default::default()
        };
        let mut qb = select::<DisciplineBlock>();
        push_where(&mut qb, DisciplineBlock::filter_columns(&filter));
        assert_eq!(
            qb.sql(),
            "SELECT id, discipline_id, credit_units, control_type_id, lecture_hours, \
             practice_hours, lab_hours, semester_number, map_core_id \
             FROM discipline_blocks WHERE map_core_id = $1"
        );
    }
}
