// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # edumap core
//!
//! Curriculum ("educational map") management: the map aggregate service that
//! loads and unloads a direction's map cores, discipline blocks and
//! competency links, and the rule engine that checks a flattened study plan
//! against credit and workload constraints.
//!
//! # Architecture
//!
//! - **Domain:** entities, record-store contracts, the pure plan validator
//! - **Application:** map aggregate service, plan validation service, catalog import
//! - **Infrastructure:** in-memory and PostgreSQL record stores, event bus

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
