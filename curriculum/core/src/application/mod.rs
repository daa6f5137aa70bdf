// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod map_service;
pub mod validation_service;
pub mod catalog_import;
pub mod repository_factory;

pub use map_service::{MapError, MapService, StandardMapService};
pub use validation_service::{PlanValidationError, PlanValidationService};
pub use catalog_import::{CatalogError, CatalogImportService, CatalogSeed, ImportSummary};
pub use repository_factory::create_unit_of_work_factory;
