// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the edumap CLI

pub mod catalog;
pub mod config;
pub mod map;
pub mod plan;

pub use self::catalog::CatalogCommand;
pub use self::config::ConfigCommand;
pub use self::map::MapCommand;
pub use self::plan::PlanCommand;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON document from disk.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}
