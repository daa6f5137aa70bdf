// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Study Plan Validation Rules
//!
//! Pure rule engine over a [`PlanRow`] matrix. Nothing here touches storage;
//! the same input always yields the same report.
//!
//! ## Rules
//!
//! | Rule | Scope | Severity | Constraint |
//! |------|-------|----------|------------|
//! | `SemesterCredits` | semester | blocking | credits in `24..=36` |
//! | `CourseWorks` | semester | warning | at most 2 course works |
//! | `TotalCredits` | plan | blocking | 240 for 8 semesters, else 120 |
//! | `ClassroomShare` | discipline | warning | classroom hours ≤ 40% of total |
//! | `IndependentWork` | discipline | blocking | independent hours > 0 |
//! | `ExamShare` | semester | warning | exams in `25..=35`% |
//! | `CreditShare` | semester | warning | credits (зачет) in `30..=40`% |
//! | `DifferentiatedCreditShare` | semester | warning | graded credits in `30..=40`% |
//!
//! Findings are reported in evaluation order: per semester credits and
//! course works, then the plan total, then per discipline (row by row,
//! semester by semester), then the per-semester control-form shares. The
//! share rules skip semesters without disciplines.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::domain::plan::{calculate_hours, ExamType, PlanDiscipline, PlanRow};

pub const SEMESTER_CREDITS_MIN: u64 = 24;
pub const SEMESTER_CREDITS_MAX: u64 = 36;
pub const COURSE_WORKS_MAX: usize = 2;
pub const CLASSROOM_SHARE_MAX: f64 = 40.0;
pub const EXAM_SHARE_RANGE: (f64, f64) = (25.0, 35.0);
pub const CREDIT_SHARE_RANGE: (f64, f64) = (30.0, 40.0);
pub const DIFFERENTIATED_CREDIT_SHARE_RANGE: (f64, f64) = (30.0, 40.0);

/// Expected plan total: 30 credits per semester over the two supported
/// program lengths.
pub fn expected_total_credits(semesters_count: usize) -> u64 {
    if semesters_count == 8 {
        240
    } else {
        120
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Invalidates the whole plan
    Blocking,
    /// Advisory only
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    SemesterCredits,
    CourseWorks,
    TotalCredits,
    ClassroomShare,
    IndependentWork,
    ExamShare,
    CreditShare,
    DifferentiatedCreditShare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub rule: ValidationRule,
    pub message: String,
    pub severity: ValidationSeverity,
    #[serde(default)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub results: Vec<ValidationFinding>,
}

impl ValidationReport {
    fn from_findings(results: Vec<ValidationFinding>) -> Self {
        let is_valid = !results
            .iter()
            .any(|r| r.severity == ValidationSeverity::Blocking);
        Self { is_valid, results }
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.results.iter().filter(|r| r.severity == severity).count()
    }

    pub fn by_rule(&self, rule: ValidationRule) -> impl Iterator<Item = &ValidationFinding> {
        self.results.iter().filter(move |r| r.rule == rule)
    }
}

/// Plans the rule engine cannot evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanShapeError {
    #[error("plan has no rows")]
    EmptyPlan,

    #[error("row {row} has {actual} semesters, expected {expected}")]
    InconsistentSemesters {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Semester count of the plan, taken from the first row and required to be
/// the same in every other row.
pub fn semesters_count(rows: &[PlanRow]) -> Result<usize, PlanShapeError> {
    let first = rows.first().ok_or(PlanShapeError::EmptyPlan)?;
    let expected = first.data.len();
    for (row, plan_row) in rows.iter().enumerate().skip(1) {
        if plan_row.data.len() != expected {
            return Err(PlanShapeError::InconsistentSemesters {
                row,
                expected,
                actual: plan_row.data.len(),
            });
        }
    }
    Ok(expected)
}

/// Runs every rule over the plan.
pub fn validate_plan(rows: &[PlanRow]) -> Result<ValidationReport, PlanShapeError> {
    let semesters = semesters_count(rows)?;
    let mut findings = Vec::new();

    let mut total_credits: u64 = 0;
    for semester in 0..semesters {
        let semester_credits: u64 = semester_disciplines(rows, semester)
            .map(|d| u64::from(d.credits))
            .sum();
        total_credits += semester_credits;
        check_semester_credits(semester, semester_credits, &mut findings);

        let course_works = semester_disciplines(rows, semester)
            .filter(|d| d.has_course_work)
            .count();
        check_course_works(semester, course_works, &mut findings);
    }

    check_total_credits(semesters, total_credits, &mut findings);

    for row in rows {
        for discipline in row.data.iter().flatten() {
            check_discipline_hours(discipline, &mut findings);
        }
    }

    for semester in 0..semesters {
        check_control_forms(rows, semester, &mut findings);
    }

    Ok(ValidationReport::from_findings(findings))
}

fn semester_disciplines(rows: &[PlanRow], semester: usize) -> impl Iterator<Item = &PlanDiscipline> {
    rows.iter().flat_map(move |row| row.data[semester].iter())
}

fn details<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn check_semester_credits(semester: usize, credits: u64, findings: &mut Vec<ValidationFinding>) {
    if (SEMESTER_CREDITS_MIN..=SEMESTER_CREDITS_MAX).contains(&credits) {
        return;
    }
    findings.push(ValidationFinding {
        rule: ValidationRule::SemesterCredits,
        message: format!(
            "В семестре {} количество з.е.: {} (должно быть 30 ± 6)",
            semester + 1,
            credits
        ),
        severity: ValidationSeverity::Blocking,
        details: details([
            ("semester", json!(semester + 1)),
            ("credits", json!(credits)),
        ]),
    });
}

fn check_course_works(semester: usize, count: usize, findings: &mut Vec<ValidationFinding>) {
    if count <= COURSE_WORKS_MAX {
        return;
    }
    findings.push(ValidationFinding {
        rule: ValidationRule::CourseWorks,
        message: format!(
            "В семестре {} количество курсовых работ: {} (должно быть не больше {})",
            semester + 1,
            count,
            COURSE_WORKS_MAX
        ),
        severity: ValidationSeverity::Warning,
        details: details([
            ("semester", json!(semester + 1)),
            ("course_works_count", json!(count)),
        ]),
    });
}

fn check_total_credits(semesters: usize, total: u64, findings: &mut Vec<ValidationFinding>) {
    let expected = expected_total_credits(semesters);
    if total == expected {
        return;
    }
    findings.push(ValidationFinding {
        rule: ValidationRule::TotalCredits,
        message: format!("Общее количество з.е.: {} (должно быть {})", total, expected),
        severity: ValidationSeverity::Blocking,
        details: details([
            ("total_credits", json!(total)),
            ("expected_credits", json!(expected)),
        ]),
    });
}

fn check_discipline_hours(discipline: &PlanDiscipline, findings: &mut Vec<ValidationFinding>) {
    let hours = calculate_hours(discipline);

    let classroom_percentage = hours.classroom_percentage();
    if classroom_percentage > CLASSROOM_SHARE_MAX {
        findings.push(ValidationFinding {
            rule: ValidationRule::ClassroomShare,
            message: format!(
                "Дисциплина '{}' имеет превышение аудиторной нагрузки: {:.1}% (должно быть не более 40%)",
                discipline.name, classroom_percentage
            ),
            severity: ValidationSeverity::Warning,
            details: details([
                ("discipline", json!(discipline.name)),
                ("classroom_hours", json!(hours.classroom)),
                ("total_hours", json!(hours.total)),
                ("percentage", json!(classroom_percentage)),
            ]),
        });
    }

    if hours.total_independent <= 0 {
        findings.push(ValidationFinding {
            rule: ValidationRule::IndependentWork,
            message: format!(
                "Дисциплина '{}' имеет некорректное количество часов самостоятельной работы: {}",
                discipline.name, hours.total_independent
            ),
            severity: ValidationSeverity::Blocking,
            details: details([
                ("discipline", json!(discipline.name)),
                ("total_hours", json!(hours.total)),
                ("contact_hours", json!(hours.contact)),
                ("classroom_hours", json!(hours.classroom)),
                ("exam_prep_hours", json!(hours.exam_prep)),
                ("total_independent", json!(hours.total_independent)),
                ("current_independent", json!(hours.current_independent)),
            ]),
        });
    }
}

fn check_control_forms(rows: &[PlanRow], semester: usize, findings: &mut Vec<ValidationFinding>) {
    let mut total = 0usize;
    let mut exams = 0usize;
    let mut credits = 0usize;
    let mut differentiated = 0usize;

    for discipline in semester_disciplines(rows, semester) {
        total += 1;
        match discipline.exam_type {
            ExamType::Exam => exams += 1,
            ExamType::Credit => credits += 1,
            ExamType::DifferentiatedCredit => differentiated += 1,
            ExamType::Other(_) => {}
        }
    }

    if total == 0 {
        return;
    }

    let share = |count: usize| count as f64 / total as f64 * 100.0;
    let checks = [
        (
            ValidationRule::ExamShare,
            "процент экзаменов",
            "30% ± 5%",
            "exam_count",
            exams,
            EXAM_SHARE_RANGE,
        ),
        (
            ValidationRule::CreditShare,
            "процент зачетов",
            "35% ± 5%",
            "credit_count",
            credits,
            CREDIT_SHARE_RANGE,
        ),
        (
            ValidationRule::DifferentiatedCreditShare,
            "процент дифференцированных зачетов",
            "35% ± 5%",
            "diff_credit_count",
            differentiated,
            DIFFERENTIATED_CREDIT_SHARE_RANGE,
        ),
    ];

    for (rule, label, window, count_key, count, (low, high)) in checks {
        let percentage = share(count);
        if (low..=high).contains(&percentage) {
            continue;
        }
        findings.push(ValidationFinding {
            rule,
            message: format!(
                "Семестр {}: {} ({:.1}%) не соответствует рекомендуемому диапазону ({})",
                semester + 1,
                label,
                percentage,
                window
            ),
            severity: ValidationSeverity::Warning,
            details: details([
                ("semester", json!(semester + 1)),
                (count_key, json!(count)),
                ("total_count", json!(total)),
                ("percentage", json!(percentage)),
            ]),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discipline(name: &str, credits: u32, exam_type: ExamType) -> PlanDiscipline {
        PlanDiscipline {
            id: 0,
            name: name.to_string(),
            credits,
            exam_type,
            has_course_work: false,
            has_practical_work: false,
            department: String::new(),
            competence_codes: vec![],
            lecture_hours: 0,
            lab_hours: 0,
            practical_hours: 0,
            source_position: None,
        }
    }

    fn row(data: Vec<Vec<PlanDiscipline>>) -> PlanRow {
        PlanRow {
            name: "Обязательная часть".to_string(),
            color: "#ffffff".to_string(),
            data,
        }
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        assert_eq!(validate_plan(&[]), Err(PlanShapeError::EmptyPlan));
    }

    #[test]
    fn test_inconsistent_semesters_are_rejected() {
        let rows = vec![row(vec![vec![], vec![]]), row(vec![vec![]])];
        assert_eq!(
            validate_plan(&rows),
            Err(PlanShapeError::InconsistentSemesters { row: 1, expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_findings_follow_evaluation_order() {
        // One semester (120 expected), three course works, one overloaded exam
        // discipline and one discipline without a recognised control form.
        let mut heavy = discipline("Тяжелая", 2, ExamType::Exam);
        heavy.lecture_hours = 40;
        heavy.practical_hours = 40;
        let mut semester: Vec<PlanDiscipline> = (0..3)
            .map(|i| {
                let mut d = discipline(&format!("КР {}", i), 1, ExamType::Credit);
                d.has_course_work = true;
                d
            })
            .collect();
        semester.push(heavy);
        semester.push(discipline("Факультатив", 1, ExamType::Other(String::new())));

        let report = validate_plan(&[row(vec![semester])]).unwrap();
        let rules: Vec<ValidationRule> = report.results.iter().map(|r| r.rule).collect();
        assert_eq!(
            rules,
            vec![
                ValidationRule::SemesterCredits,
                ValidationRule::CourseWorks,
                ValidationRule::TotalCredits,
                ValidationRule::ClassroomShare,
                ValidationRule::IndependentWork,
                ValidationRule::ExamShare,
                ValidationRule::CreditShare,
                ValidationRule::DifferentiatedCreditShare,
            ]
        );
        assert!(!report.is_valid);
        assert_eq!(report.count(ValidationSeverity::Blocking), 3);
        assert_eq!(report.count(ValidationSeverity::Warning), 5);
    }

    #[test]
    fn test_classroom_message_has_one_decimal() {
        let mut d = discipline("Физика", 3, ExamType::Credit);
        d.lecture_hours = 50;
        let mut findings = Vec::new();
        check_discipline_hours(&d, &mut findings);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("46.3%"), "{}", findings[0].message);
        assert_eq!(findings[0].details["classroom_hours"], json!(50));
    }

    #[test]
    fn test_empty_semester_skips_share_rules() {
        let mut findings = Vec::new();
        check_control_forms(&[row(vec![vec![]])], 0, &mut findings);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_report_serializes_is_valid_and_lowercase_severity() {
        let report = ValidationReport::from_findings(vec![ValidationFinding {
            rule: ValidationRule::CourseWorks,
            message: "m".to_string(),
            severity: ValidationSeverity::Warning,
            details: Map::new(),
        }]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["isValid"], json!(true));
        assert_eq!(value["results"][0]["severity"], json!("warning"));
        assert_eq!(value["results"][0]["rule"], json!("course_works"));
    }

    #[test]
    fn test_expected_total_credits() {
        assert_eq!(expected_total_credits(8), 240);
        assert_eq!(expected_total_credits(4), 120);
        assert_eq!(expected_total_credits(6), 120);
    }
}
