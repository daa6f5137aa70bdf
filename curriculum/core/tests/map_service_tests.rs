// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use async_trait::async_trait;
use edumap_core::application::map_service::{MapError, MapService, StandardMapService};
use edumap_core::domain::catalog::{
    Competency, CompetencyGroupId, CompetencyId, ControlType, ControlTypeId, Department,
    Discipline, DisciplineId, NewCompetency, NewControlType, NewDepartment, NewDiscipline,
};
use edumap_core::domain::direction::{
    Direction, DirectionId, EducationalFormId, EducationalLevelId, NewDirection,
};
use edumap_core::domain::discipline_block::{
    DisciplineBlock, DisciplineBlockCompetency, DisciplineBlockCompetencyFilter,
    DisciplineBlockCompetencyId, DisciplineBlockCompetencyPatch, NewDisciplineBlockCompetency,
};
use edumap_core::domain::events::MapEvent;
use edumap_core::domain::map::{
    CompetencyRef, DisciplineBlockLoad, MapCoreLoad, MapCoreUnload, MapLoad, PayloadError,
};
use edumap_core::domain::map_core::{DirectionMapCore, MapCore, MapCoreId};
use edumap_core::domain::repository::{
    Repository, RepositoryError, UnitOfWork, UnitOfWorkFactory,
};
use edumap_core::infrastructure::event_bus::EventBus;
use edumap_core::infrastructure::repositories::InMemoryStore;

struct Fixture {
    store: InMemoryStore,
    event_bus: Arc<EventBus>,
    service: StandardMapService,
    direction: DirectionId,
    other_direction: DirectionId,
    disciplines: Vec<DisciplineId>,
    exam: ControlTypeId,
    credit: ControlTypeId,
    competencies: Vec<CompetencyId>,
}

async fn fixture() -> Fixture {
    let store = InMemoryStore::new();
    let mut uow = store.begin().await.unwrap();

    let mut direction_ids = Vec::new();
    for name in ["Информационные системы и технологии", "Прикладная информатика"] {
        let direction = uow
            .directions()
            .create(NewDirection {
                name: name.to_string(),
                educational_level_id: EducationalLevelId(1),
                educational_form_id: EducationalFormId(1),
                semester_count: 8,
            })
            .await
            .unwrap();
        direction_ids.push(direction.id);
    }

    let department = uow
        .departments()
        .create(NewDepartment {
            name: "Кафедра информационных систем и технологий".to_string(),
            short_name: "ИСТ".to_string(),
        })
        .await
        .unwrap();

    let mut disciplines = Vec::new();
    for (name, short_name) in [("Программирование", "Прог"), ("Базы данных", "БД"), ("Сети", "Сети")] {
        let discipline = uow
            .disciplines()
            .create(NewDiscipline {
                name: name.to_string(),
                short_name: short_name.to_string(),
                department_id: department.id,
            })
            .await
            .unwrap();
        disciplines.push(discipline.id);
    }

    let exam = uow
        .control_types()
        .create(NewControlType { name: "Экзамен".to_string() })
        .await
        .unwrap();
    let credit = uow
        .control_types()
        .create(NewControlType { name: "Зачет".to_string() })
        .await
        .unwrap();

    let mut competencies = Vec::new();
    for code in ["УК-1", "ОПК-2", "ПК-3"] {
        let competency = uow
            .competencies()
            .create(NewCompetency {
                code: code.to_string(),
                name: format!("Компетенция {}", code),
                description: String::new(),
                competency_group_id: CompetencyGroupId(1),
            })
            .await
            .unwrap();
        competencies.push(competency.id);
    }

    uow.commit().await.unwrap();

    let event_bus = Arc::new(EventBus::new(64));
    let service = StandardMapService::new(Arc::new(store.clone()), event_bus.clone());

    Fixture {
        store,
        event_bus,
        service,
        direction: direction_ids[0],
        other_direction: direction_ids[1],
        disciplines,
        exam: exam.id,
        credit: credit.id,
        competencies,
    }
}

fn block(
    discipline_id: DisciplineId,
    control_type_id: ControlTypeId,
    semester_number: u32,
    competencies: &[CompetencyId],
) -> DisciplineBlockLoad {
    DisciplineBlockLoad {
        discipline_id,
        credit_units: 4,
        control_type_id,
        lecture_hours: 36,
        practice_hours: 18,
        lab_hours: 18,
        semester_number,
        competencies: competencies.iter().map(|&id| CompetencyRef { id }).collect(),
    }
}

fn new_core(name: &str, blocks: Vec<DisciplineBlockLoad>) -> MapCoreLoad {
    MapCoreLoad {
        id: None,
        name: name.to_string(),
        semesters_count: 8,
        discipline_blocks: blocks,
    }
}

impl Fixture {
    fn three_blocks(&self) -> Vec<DisciplineBlockLoad> {
        vec![
            block(self.disciplines[0], self.exam, 1, &[self.competencies[0], self.competencies[1]]),
            block(self.disciplines[1], self.credit, 2, &[self.competencies[2]]),
            block(self.disciplines[2], self.exam, 3, &[]),
        ]
    }

    /// Loads a single new core and returns its generated id.
    async fn load_new_core(&self, blocks: Vec<DisciplineBlockLoad>) -> MapCoreId {
        self.service
            .load(
                self.direction,
                MapLoad {
                    map_cores: vec![new_core("Ядро ИСТ", blocks)],
                },
            )
            .await
            .unwrap();
        let unload = self.service.unload(self.direction).await.unwrap();
        unload.map_cores[0].id
    }

    async fn counts(&self) -> (usize, usize, usize, usize) {
        let tables = self.store.snapshot().await;
        (
            tables.map_cores.len(),
            tables.direction_map_cores.len(),
            tables.discipline_blocks.len(),
            tables.discipline_block_competencies.len(),
        )
    }
}

/// Block content without the regenerated block ids.
fn content(core: &MapCoreUnload) -> Vec<(DisciplineId, u32, String, Vec<CompetencyId>)> {
    core.discipline_blocks
        .iter()
        .map(|b| {
            (
                b.discipline.id,
                b.semester_number,
                b.control_type.name.clone(),
                b.competencies.iter().map(|c| c.id).collect(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_load_then_unload_builds_nested_view() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;

    let unload = fx.service.unload(fx.direction).await.unwrap();
    assert_eq!(unload.map_cores.len(), 1);

    let core = &unload.map_cores[0];
    assert_eq!(core.id, core_id);
    assert_eq!(core.name, "Ядро ИСТ");
    assert_eq!(core.semesters_count, 8);
    assert_eq!(core.discipline_blocks.len(), 3);

    let first = &core.discipline_blocks[0];
    assert_eq!(first.discipline.name, "Программирование");
    assert_eq!(first.discipline.short_name, "Прог");
    assert_eq!(first.discipline.department.short_name, "ИСТ");
    assert_eq!(first.control_type.name, "Экзамен");
    assert_eq!(first.credit_units, 4);
    assert_eq!((first.lecture_hours, first.practice_hours, first.lab_hours), (36, 18, 18));
    let codes: Vec<&str> = first.competencies.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["УК-1", "ОПК-2"]);

    // Blocks come back in the order they were stored.
    let semesters: Vec<u32> = core.discipline_blocks.iter().map(|b| b.semester_number).collect();
    assert_eq!(semesters, vec![1, 2, 3]);

    let single = fx.service.unload_map_core(core_id).await.unwrap();
    assert_eq!(&single, core);
}

#[tokio::test]
async fn test_reload_with_same_payload_is_idempotent() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;

    let mut reused = new_core("Ядро ИСТ", fx.three_blocks());
    reused.id = Some(core_id);
    let payload = MapLoad { map_cores: vec![reused] };

    fx.service.load(fx.direction, payload.clone()).await.unwrap();
    let once = fx.service.unload(fx.direction).await.unwrap();
    let counts_once = fx.counts().await;

    fx.service.load(fx.direction, payload).await.unwrap();
    let twice = fx.service.unload(fx.direction).await.unwrap();

    assert_eq!(once.map_cores.len(), 1);
    assert_eq!(twice.map_cores.len(), 1);
    assert_eq!(once.map_cores[0].id, twice.map_cores[0].id);
    assert_eq!(content(&once.map_cores[0]), content(&twice.map_cores[0]));
    assert_eq!(fx.counts().await, counts_once);

    // Blocks are regenerated, never kept.
    let old_ids: Vec<_> = once.map_cores[0].discipline_blocks.iter().map(|b| b.id).collect();
    let new_ids: Vec<_> = twice.map_cores[0].discipline_blocks.iter().map(|b| b.id).collect();
    assert!(old_ids.iter().all(|id| !new_ids.contains(id)));
}

#[tokio::test]
async fn test_reload_with_fewer_blocks_leaves_no_stale_blocks() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;
    assert_eq!(fx.counts().await, (1, 1, 3, 3));

    let mut shrunk = new_core("Ядро ИСТ", vec![block(fx.disciplines[1], fx.credit, 5, &[fx.competencies[0]])]);
    shrunk.id = Some(core_id);
    fx.service
        .load(fx.direction, MapLoad { map_cores: vec![shrunk] })
        .await
        .unwrap();

    let core = fx.service.unload_map_core(core_id).await.unwrap();
    assert_eq!(core.discipline_blocks.len(), 1);
    assert_eq!(core.discipline_blocks[0].semester_number, 5);
    // Links of the removed blocks are gone too.
    assert_eq!(fx.counts().await, (1, 1, 1, 1));
}

#[tokio::test]
async fn test_repeated_map_core_id_last_entry_wins() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;

    let mut first = new_core("Ядро ИСТ", fx.three_blocks());
    first.id = Some(core_id);
    let mut second = new_core("Ядро ИСТ", vec![block(fx.disciplines[2], fx.credit, 4, &[fx.competencies[1]])]);
    second.id = Some(core_id);

    fx.service
        .load(fx.direction, MapLoad { map_cores: vec![first, second] })
        .await
        .unwrap();

    // Two links to the same core; only the second entry's blocks remain.
    assert_eq!(fx.counts().await, (1, 2, 1, 1));
    let unload = fx.service.unload(fx.direction).await.unwrap();
    assert_eq!(unload.map_cores.len(), 2);
    for core in &unload.map_cores {
        assert_eq!(core.id, core_id);
        assert_eq!(
            content(core),
            vec![(fx.disciplines[2], 4, "Зачет".to_string(), vec![fx.competencies[1]])]
        );
    }
}

#[tokio::test]
async fn test_empty_payload_unlinks_without_deleting_cores() {
    let fx = fixture().await;
    fx.load_new_core(fx.three_blocks()).await;

    fx.service
        .load(fx.direction, MapLoad { map_cores: vec![] })
        .await
        .unwrap();

    assert!(fx.service.unload(fx.direction).await.unwrap().map_cores.is_empty());
    assert_eq!(fx.counts().await, (1, 0, 3, 3));
}

#[tokio::test]
async fn test_shared_map_core_survives_other_direction_reload() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;

    let mut shared = new_core("Ядро ИСТ", fx.three_blocks());
    shared.id = Some(core_id);
    fx.service
        .load(fx.other_direction, MapLoad { map_cores: vec![shared] })
        .await
        .unwrap();

    fx.service
        .load(fx.direction, MapLoad { map_cores: vec![new_core("Другое ядро", vec![])] })
        .await
        .unwrap();

    let other = fx.service.unload(fx.other_direction).await.unwrap();
    assert_eq!(other.map_cores.len(), 1);
    assert_eq!(other.map_cores[0].id, core_id);
    assert_eq!(other.map_cores[0].discipline_blocks.len(), 3);

    let own = fx.service.unload(fx.direction).await.unwrap();
    assert_eq!(own.map_cores.len(), 1);
    assert_eq!(own.map_cores[0].name, "Другое ядро");
}

#[tokio::test]
async fn test_missing_direction_fails_before_any_mutation() {
    let fx = fixture().await;
    fx.load_new_core(fx.three_blocks()).await;
    let before = fx.store.snapshot().await;

    let err = fx
        .service
        .load(
            DirectionId(999),
            MapLoad {
                map_cores: vec![new_core("Ядро", fx.three_blocks())],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MapError::DirectionNotFound(DirectionId(999))));
    let after = fx.store.snapshot().await;
    assert_eq!(after.map_cores.len(), before.map_cores.len());
    assert_eq!(after.direction_map_cores.len(), before.direction_map_cores.len());
    assert_eq!(after.discipline_blocks.len(), before.discipline_blocks.len());
    assert_eq!(
        after.discipline_block_competencies.len(),
        before.discipline_block_competencies.len()
    );
}

#[tokio::test]
async fn test_missing_direction_reported_before_payload_shape() {
    let fx = fixture().await;
    let mut bad = new_core("", vec![]);
    bad.semesters_count = 0;

    let err = fx
        .service
        .load(DirectionId(999), MapLoad { map_cores: vec![bad] })
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::DirectionNotFound(DirectionId(999))));
    assert_eq!(fx.counts().await, (0, 0, 0, 0));
}

#[tokio::test]
async fn test_dangling_references_keep_previous_map() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;
    let before = fx.service.unload(fx.direction).await.unwrap();

    let mut reused = new_core("Ядро ИСТ", vec![block(DisciplineId(404), fx.exam, 1, &[])]);
    reused.id = Some(core_id);
    let err = fx
        .service
        .load(fx.direction, MapLoad { map_cores: vec![reused.clone()] })
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::DisciplineNotFound(DisciplineId(404))));

    reused.discipline_blocks = vec![block(fx.disciplines[0], ControlTypeId(404), 1, &[])];
    let err = fx
        .service
        .load(fx.direction, MapLoad { map_cores: vec![reused.clone()] })
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::ControlTypeNotFound(ControlTypeId(404))));

    reused.discipline_blocks = vec![block(fx.disciplines[0], fx.exam, 1, &[CompetencyId(404)])];
    let err = fx
        .service
        .load(fx.direction, MapLoad { map_cores: vec![reused] })
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::CompetencyNotFound(CompetencyId(404))));

    let err = fx
        .service
        .load(
            fx.direction,
            MapLoad {
                map_cores: vec![MapCoreLoad {
                    id: Some(MapCoreId(404)),
                    ..new_core("Ядро", vec![])
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::MapCoreNotFound(MapCoreId(404))));
    assert!(err.is_not_found());

    assert_eq!(fx.service.unload(fx.direction).await.unwrap(), before);
}

#[tokio::test]
async fn test_semester_checked_against_stored_map_core() {
    let fx = fixture().await;
    let mut short = new_core("Короткое ядро", vec![]);
    short.semesters_count = 4;
    fx.service
        .load(fx.direction, MapLoad { map_cores: vec![short] })
        .await
        .unwrap();
    let core_id = fx.service.unload(fx.direction).await.unwrap().map_cores[0].id;

    // The payload claims 8 semesters but the stored core has 4.
    let mut reused = new_core("Короткое ядро", vec![block(fx.disciplines[0], fx.exam, 6, &[])]);
    reused.id = Some(core_id);
    let err = fx
        .service
        .load(fx.direction, MapLoad { map_cores: vec![reused] })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MapError::InvalidPayload(PayloadError::SemesterOutOfRange {
            semester: 6,
            semesters_count: 4,
            ..
        })
    ));
}

#[tokio::test]
async fn test_invalid_payload_rejected_without_touching_store() {
    let fx = fixture().await;
    let mut bad = new_core("", fx.three_blocks());
    bad.name = String::new();

    let err = fx
        .service
        .load(fx.direction, MapLoad { map_cores: vec![bad] })
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::InvalidPayload(PayloadError::InvalidName { index: 0, .. })));
    assert_eq!(fx.counts().await, (0, 0, 0, 0));
}

#[tokio::test]
async fn test_unload_skips_links_to_deleted_competencies() {
    let fx = fixture().await;
    let core_id = fx.load_new_core(fx.three_blocks()).await;

    let mut uow = fx.store.begin().await.unwrap();
    assert!(uow.competencies().delete(fx.competencies[1]).await.unwrap());
    uow.commit().await.unwrap();

    let core = fx.service.unload_map_core(core_id).await.unwrap();
    let first: Vec<CompetencyId> = core.discipline_blocks[0].competencies.iter().map(|c| c.id).collect();
    assert_eq!(first, vec![fx.competencies[0]]);

    // The link itself is still stored.
    let tables = fx.store.snapshot().await;
    assert_eq!(tables.discipline_block_competencies.len(), 3);
}

#[tokio::test]
async fn test_unload_reports_missing_targets() {
    let fx = fixture().await;

    let err = fx.service.unload(DirectionId(77)).await.unwrap_err();
    assert!(matches!(err, MapError::DirectionNotFound(DirectionId(77))));

    let err = fx.service.unload_map_core(MapCoreId(77)).await.unwrap_err();
    assert!(matches!(err, MapError::MapCoreNotFound(MapCoreId(77))));

    // A deleted discipline is a dangling reference, not an orphan link.
    let core_id = fx.load_new_core(fx.three_blocks()).await;
    let mut uow = fx.store.begin().await.unwrap();
    uow.disciplines().delete(fx.disciplines[2]).await.unwrap();
    uow.commit().await.unwrap();

    let err = fx.service.unload_map_core(core_id).await.unwrap_err();
    assert!(matches!(err, MapError::DisciplineNotFound(id) if id == fx.disciplines[2]));
}

#[tokio::test]
async fn test_load_publishes_events_after_commit() {
    let fx = fixture().await;
    let mut receiver = fx.event_bus.subscribe_direction(fx.direction);

    let core_id = fx.load_new_core(fx.three_blocks()).await;

    match receiver.recv().await.unwrap() {
        MapEvent::MapCoreCreated { map_core_id, name, .. } => {
            assert_eq!(map_core_id, core_id);
            assert_eq!(name, "Ядро ИСТ");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match receiver.recv().await.unwrap() {
        MapEvent::MapLoaded {
            map_core_ids,
            discipline_block_count,
            ..
        } => {
            assert_eq!(map_core_ids, vec![core_id]);
            assert_eq!(discipline_block_count, 3);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let mut reused = new_core("Ядро ИСТ", vec![block(fx.disciplines[0], fx.exam, 1, &[])]);
    reused.id = Some(core_id);
    fx.service
        .load(fx.direction, MapLoad { map_cores: vec![reused] })
        .await
        .unwrap();

    match receiver.recv().await.unwrap() {
        MapEvent::MapCoreBlocksReplaced {
            removed_blocks,
            created_blocks,
            ..
        } => {
            assert_eq!(removed_blocks, 3);
            assert_eq!(created_blocks, 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_loads_of_one_direction_are_serialized() {
    let fx = Arc::new(fixture().await);

    let loads = (0..4).map(|i| {
        let fx = fx.clone();
        async move {
            let blocks = vec![block(fx.disciplines[0], fx.exam, 1, &[fx.competencies[0]])];
            fx.service
                .load(
                    fx.direction,
                    MapLoad {
                        map_cores: vec![new_core(&format!("Ядро {}", i), blocks)],
                    },
                )
                .await
        }
    });
    for result in futures::future::join_all(loads).await {
        result.unwrap();
    }

    // Every load replaced the links of the one before it.
    let unload = fx.service.unload(fx.direction).await.unwrap();
    assert_eq!(unload.map_cores.len(), 1);
    assert_eq!(fx.counts().await, (4, 1, 4, 4));
}

// ============================================================================
// Rollback on a failure in the middle of the replace phase
// ============================================================================

/// Link collection whose writes always fail.
struct BrokenLinks;

#[async_trait]
impl Repository<DisciplineBlockCompetency> for BrokenLinks {
    async fn get_all(&mut self) -> Result<Vec<DisciplineBlockCompetency>, RepositoryError> {
        Ok(vec![])
    }

    async fn get_by_id(
        &mut self,
        _id: DisciplineBlockCompetencyId,
    ) -> Result<Option<DisciplineBlockCompetency>, RepositoryError> {
        Ok(None)
    }

    async fn create(
        &mut self,
        _new: NewDisciplineBlockCompetency,
    ) -> Result<DisciplineBlockCompetency, RepositoryError> {
        Err(RepositoryError::Database("disk full".to_string()))
    }

    async fn update(
        &mut self,
        _id: DisciplineBlockCompetencyId,
        _patch: DisciplineBlockCompetencyPatch,
    ) -> Result<Option<DisciplineBlockCompetency>, RepositoryError> {
        Err(RepositoryError::Database("disk full".to_string()))
    }

    async fn delete(
        &mut self,
        _id: DisciplineBlockCompetencyId,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Database("disk full".to_string()))
    }

    async fn filter_by(
        &mut self,
        _filter: &DisciplineBlockCompetencyFilter,
    ) -> Result<Vec<DisciplineBlockCompetency>, RepositoryError> {
        Ok(vec![])
    }

    async fn exists(&mut self, _filter: &DisciplineBlockCompetencyFilter) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}

struct BrokenUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    links: BrokenLinks,
}

#[async_trait]
impl UnitOfWork for BrokenUnitOfWork {
    fn directions(&mut self) -> &mut dyn Repository<Direction> {
        self.inner.directions()
    }
    fn map_cores(&mut self) -> &mut dyn Repository<MapCore> {
        self.inner.map_cores()
    }
    fn direction_map_cores(&mut self) -> &mut dyn Repository<DirectionMapCore> {
        self.inner.direction_map_cores()
    }
    fn discipline_blocks(&mut self) -> &mut dyn Repository<DisciplineBlock> {
        self.inner.discipline_blocks()
    }
    fn discipline_block_competencies(&mut self) -> &mut dyn Repository<DisciplineBlockCompetency> {
        &mut self.links
    }
    fn disciplines(&mut self) -> &mut dyn Repository<Discipline> {
        self.inner.disciplines()
    }
    fn departments(&mut self) -> &mut dyn Repository<Department> {
        self.inner.departments()
    }
    fn control_types(&mut self) -> &mut dyn Repository<ControlType> {
        self.inner.control_types()
    }
    fn competencies(&mut self) -> &mut dyn Repository<Competency> {
        self.inner.competencies()
    }

    async fn lock_direction(&mut self, id: DirectionId) -> Result<(), RepositoryError> {
        self.inner.lock_direction(id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }
}

struct BrokenStore(InMemoryStore);

#[async_trait]
impl UnitOfWorkFactory for BrokenStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        Ok(Box::new(BrokenUnitOfWork {
            inner: self.0.begin().await?,
            links: BrokenLinks,
        }))
    }
}

#[tokio::test]
async fn test_failure_mid_load_rolls_back_everything() {
    let fx = fixture().await;
    fx.load_new_core(fx.three_blocks()).await;
    let before = fx.counts().await;

    let broken = StandardMapService::new(Arc::new(BrokenStore(fx.store.clone())), fx.event_bus.clone());
    let err = broken
        .load(
            fx.direction,
            MapLoad {
                map_cores: vec![new_core("Новое ядро", vec![block(fx.disciplines[0], fx.exam, 1, &[fx.competencies[0]])])],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MapError::Repository(RepositoryError::Database(_))));
    // The link deletion and the new core were discarded with the unit of work.
    assert_eq!(fx.counts().await, before);
    let unload = fx.service.unload(fx.direction).await.unwrap();
    assert_eq!(unload.map_cores[0].name, "Ядро ИСТ");
}
