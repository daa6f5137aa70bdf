// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Plan Validation Application Service
//!
//! Runs the pure rule engine from [`crate::domain::validation`] and reports
//! the outcome through logs, metrics and a [`PlanEvent`]. Holds no state
//! besides the event bus, so one instance can serve concurrent callers.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::events::PlanEvent;
use crate::domain::plan::PlanRow;
use crate::domain::validation::{
    validate_plan, PlanShapeError, ValidationReport, ValidationSeverity,
};
use crate::infrastructure::event_bus::EventBus;

/// The plan could not be evaluated at all.
#[derive(Debug, Error)]
pub enum PlanValidationError {
    #[error("Plan has no rows")]
    EmptyPlan,

    #[error("Row {row} has {actual} semesters, expected {expected}")]
    InconsistentSemesters {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl From<PlanShapeError> for PlanValidationError {
    fn from(err: PlanShapeError) -> Self {
        match err {
            PlanShapeError::EmptyPlan => PlanValidationError::EmptyPlan,
            PlanShapeError::InconsistentSemesters {
                row,
                expected,
                actual,
            } => PlanValidationError::InconsistentSemesters {
                row,
                expected,
                actual,
            },
        }
    }
}

pub struct PlanValidationService {
    event_bus: Arc<EventBus>,
}

impl PlanValidationService {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self { event_bus }
    }

    /// Evaluate every rule. Findings never fail the call; only a plan whose
    /// shape cannot be evaluated does.
    pub fn validate(&self, rows: &[PlanRow]) -> Result<ValidationReport, PlanValidationError> {
        let report = match validate_plan(rows) {
            Ok(report) => report,
            Err(e) => {
                warn!("Rejected malformed plan: {}", e);
                metrics::counter!("edumap_plan_validations_total", "outcome" => "malformed")
                    .increment(1);
                return Err(e.into());
            }
        };

        let blocking_count = report.count(ValidationSeverity::Blocking);
        let warning_count = report.count(ValidationSeverity::Warning);
        let semesters_count = rows.first().map_or(0, |row| row.data.len());

        info!(
            semesters = semesters_count,
            is_valid = report.is_valid,
            blocking = blocking_count,
            warnings = warning_count,
            "Plan validated"
        );
        let outcome = if report.is_valid { "valid" } else { "invalid" };
        metrics::counter!("edumap_plan_validations_total", "outcome" => outcome).increment(1);

        self.event_bus.publish_plan_event(PlanEvent::PlanValidated {
            semesters_count,
            is_valid: report.is_valid,
            blocking_count,
            warning_count,
            validated_at: Utc::now(),
        });

        Ok(report)
    }
}
