// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Stored Entity Contract
//!
//! Every record kept by the record store implements [`Entity`]. The trait
//! names the four value types a collection works with:
//!
//! | Associated type | Used by | Shape |
//! |-----------------|---------|-------|
//! | `Id` | `get_by_id`, `delete`, `update` | integer newtype |
//! | `New` | `create` | every column except the id |
//! | `Patch` | `update` | `Option` per mutable column, `None` = keep |
//! | `Filter` | `filter_by`, `exists` | `Option` per filterable column, all set fields must match |
//!
//! Patches and filters are plain structs, so the set of columns a caller may
//! touch is checked at compile time.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Integer primary key shared by all record ids.
pub trait RecordId:
    Copy + Eq + Ord + Hash + Debug + Display + Send + Sync + 'static
{
    fn from_raw(raw: i64) -> Self;
    fn raw(self) -> i64;
}

/// Defines an integer id newtype for a stored record.
#[macro_export]
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $crate::domain::entity::RecordId for $name {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn raw(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// A record kept in one collection of the record store.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: RecordId;
    type New: Clone + Debug + Send + Sync;
    type Patch: Clone + Debug + Default + Send + Sync;
    type Filter: Clone + Debug + Default + Send + Sync;

    /// Collection name used in logs and error messages.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Materialize a freshly created record.
    fn from_new(id: Self::Id, new: Self::New) -> Self;

    /// Apply every `Some` field of the patch.
    fn apply(&mut self, patch: Self::Patch);

    /// True when every set field of the filter equals the record's value.
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Matches an optional filter field against a value.
pub(crate) fn field_matches<T: PartialEq>(expected: &Option<T>, actual: &T) -> bool {
    expected.as_ref().map_or(true, |e| e == actual)
}

/// Overwrites `target` when the patch field is set.
pub(crate) fn patch_field<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
