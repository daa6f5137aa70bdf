// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Study Plan Matrix
//!
//! The flattened curriculum a client submits for validation: rows (display
//! groups) × semesters × disciplines. Field names follow the plan editor's
//! camelCase wire format.
//!
//! [`calculate_hours`] decomposes a discipline's workload in academic hours
//! (1 credit unit = 36 hours):
//!
//! ```text
//! total          = credits * 36
//! exam           = 9 for an exam, else 0
//! exam_prep      = 27 for an exam, else 0
//! individual     = 2 (credit) + 2 (graded credit) + 2 (course work) + 1 (practical work)
//! classroom      = lecture + lab + practical
//! contact        = individual + exam + classroom
//! total_independent   = total - contact
//! current_independent = total - contact - exam_prep
//! ```

use serde::{Deserialize, Serialize};

/// Academic hours in one credit unit.
pub const HOURS_PER_CREDIT: i64 = 36;
/// Contact hours of the exam itself.
pub const EXAM_HOURS: i64 = 9;
/// Independent preparation hours attached to an exam.
pub const EXAM_PREP_HOURS: i64 = 27;
/// Individual contact hours for a credit or graded credit.
pub const CREDIT_INDIVIDUAL_HOURS: i64 = 2;
pub const COURSE_WORK_HOURS: i64 = 2;
pub const PRACTICAL_WORK_HOURS: i64 = 1;

/// One display row of the plan; `data[semester]` lists its disciplines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub data: Vec<Vec<PlanDiscipline>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDiscipline {
    pub id: i64,
    pub name: String,
    pub credits: u32,
    pub exam_type: ExamType,
    #[serde(default)]
    pub has_course_work: bool,
    #[serde(default)]
    pub has_practical_work: bool,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub competence_codes: Vec<i64>,
    #[serde(default)]
    pub lecture_hours: u32,
    #[serde(default)]
    pub lab_hours: u32,
    #[serde(default)]
    pub practical_hours: u32,
    /// Editor cell coordinates, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<serde_json::Value>,
}

/// Form of final control, as spelled in the plan editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExamType {
    /// Экзамен
    Exam,
    /// Зачет
    Credit,
    /// Дифференцированный зачет
    DifferentiatedCredit,
    /// Anything else, including an empty string
    Other(String),
}

impl ExamType {
    pub const EXAM: &'static str = "Экзамен";
    pub const CREDIT: &'static str = "Зачет";
    pub const DIFFERENTIATED_CREDIT: &'static str = "Дифференцированный зачет";

    pub fn as_str(&self) -> &str {
        match self {
            ExamType::Exam => Self::EXAM,
            ExamType::Credit => Self::CREDIT,
            ExamType::DifferentiatedCredit => Self::DIFFERENTIATED_CREDIT,
            ExamType::Other(s) => s,
        }
    }
}

impl From<String> for ExamType {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::EXAM => ExamType::Exam,
            Self::CREDIT => ExamType::Credit,
            Self::DIFFERENTIATED_CREDIT => ExamType::DifferentiatedCredit,
            _ => ExamType::Other(value),
        }
    }
}

impl From<ExamType> for String {
    fn from(value: ExamType) -> Self {
        match value {
            ExamType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workload decomposition of one discipline, in academic hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBreakdown {
    pub total: i64,
    pub exam: i64,
    pub exam_prep: i64,
    pub individual: i64,
    pub classroom: i64,
    pub contact: i64,
    pub total_independent: i64,
    pub current_independent: i64,
}

impl HourBreakdown {
    /// Share of classroom hours in the total, in percent. Zero-credit
    /// disciplines report 0.
    pub fn classroom_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.classroom as f64 / self.total as f64 * 100.0
    }
}

pub fn calculate_hours(discipline: &PlanDiscipline) -> HourBreakdown {
    let total = i64::from(discipline.credits) * HOURS_PER_CREDIT;
    let is_exam = discipline.exam_type == ExamType::Exam;
    let exam = if is_exam { EXAM_HOURS } else { 0 };
    let exam_prep = if is_exam { EXAM_PREP_HOURS } else { 0 };

    let mut individual = 0;
    if matches!(discipline.exam_type, ExamType::Credit | ExamType::DifferentiatedCredit) {
        individual += CREDIT_INDIVIDUAL_HOURS;
    }
    if discipline.has_course_work {
        individual += COURSE_WORK_HOURS;
    }
    if discipline.has_practical_work {
        individual += PRACTICAL_WORK_HOURS;
    }

    let classroom = i64::from(discipline.lecture_hours)
        + i64::from(discipline.lab_hours)
        + i64::from(discipline.practical_hours);
    let contact = individual + exam + classroom;

    HourBreakdown {
        total,
        exam,
        exam_prep,
        individual,
        classroom,
        contact,
        total_independent: total - contact,
        current_independent: total - contact - exam_prep,
    }
}
