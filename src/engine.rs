//! Grade computation for a roster.
//!
//! Everything here is a pure function of a student and the current subject
//! list; nothing is cached.

use serde::Serialize;

use crate::error::{GradeError, Result};
use crate::grade::{Grade, Verdict};
use crate::gradebook::{ScorePart, Student};
use crate::score;

/// Clamped scores, total and grade of one subject.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStat {
    pub subject: String,
    pub theory: f64,
    pub practical: f64,
    /// Sum of the clamped scores; not itself clamped.
    pub total: f64,
    pub grade: Grade,
}

impl SubjectStat {
    pub fn total_display(&self) -> String {
        score::to_fixed(self.total, 2)
    }
}

/// A student together with every derived statistic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStudent {
    pub student: Student,
    /// One entry per subject, in subject-list order.
    pub subjects: Vec<SubjectStat>,
    pub overall_total: f64,
    pub overall_average: f64,
    pub overall_grade: Grade,
    pub overall_grade_description: &'static str,
    pub pass_or_fail: Verdict,
}

impl ComputedStudent {
    pub fn subject(&self, name: &str) -> Option<&SubjectStat> {
        self.subjects.iter().find(|s| s.subject == name)
    }

    /// Overall total rounded to two decimals.
    pub fn overall_total_display(&self) -> String {
        score::to_fixed(self.overall_total, 2)
    }

    /// Overall average rounded to two decimals.
    pub fn overall_average_display(&self) -> String {
        score::to_fixed(self.overall_average, 2)
    }
}

/// Derived statistics for one subject of one student.
pub fn subject_stat(student: &Student, subject: &str) -> SubjectStat {
    let theory = score::effective(student.raw(subject, ScorePart::Theory));
    let practical = score::effective(student.raw(subject, ScorePart::Practical));
    let total = theory + practical;
    SubjectStat {
        subject: subject.to_string(),
        theory,
        practical,
        total,
        grade: Grade::from_total(total),
    }
}

/// Computes every statistic of `student` against `subjects`.
///
/// Each raw input is coerced (non-numbers count as 0) and clamped into
/// `[0, 100]`; the subject total is their sum. The overall average divides
/// by the current number of subjects, so an empty subject list is an error.
///
/// # Examples
/// ```
/// use gradesheet::engine::compute_student;
/// use gradesheet::gradebook::{Gradebook, ScorePart};
/// use gradesheet::grade::Grade;
///
/// let mut book = Gradebook::with_subjects(["Maths"]);
/// let id = book.add_student("Asha").unwrap();
/// book.set_score(id, "Maths", ScorePart::Theory, "95").unwrap();
/// book.set_score(id, "Maths", ScorePart::Practical, "10").unwrap();
///
/// let computed = compute_student(book.student(id).unwrap(), &book.subjects).unwrap();
/// assert_eq!(computed.subjects[0].total, 105.0);
/// assert_eq!(computed.overall_grade, Grade::A1);
/// ```
pub fn compute_student(student: &Student, subjects: &[String]) -> Result<ComputedStudent> {
    if subjects.is_empty() {
        return Err(GradeError::NoSubjects);
    }

    let stats: Vec<SubjectStat> = subjects
        .iter()
        .map(|subject| subject_stat(student, subject))
        .collect();

    let overall_total: f64 = stats.iter().map(|s| s.total).sum();
    let overall_average = overall_total / subjects.len() as f64;
    let overall_grade = Grade::from_total(overall_average);

    Ok(ComputedStudent {
        student: student.clone(),
        subjects: stats,
        overall_total,
        overall_average,
        overall_grade,
        overall_grade_description: overall_grade.description(),
        pass_or_fail: overall_grade.verdict(),
    })
}

/// [`compute_student`] over a whole roster, preserving order.
pub fn compute_roster(students: &[Student], subjects: &[String]) -> Result<Vec<ComputedStudent>> {
    students
        .iter()
        .map(|student| compute_student(student, subjects))
        .collect()
}
