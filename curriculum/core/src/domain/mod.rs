// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: curriculum entities, record-store contracts, map payloads,
//! study plans and the plan validation rules.

pub mod entity;
pub mod catalog;
pub mod direction;
pub mod map_core;
pub mod discipline_block;
pub mod repository;
pub mod map;
pub mod plan;
pub mod validation;
pub mod events;
pub mod config;
