//! Column definitions of the live results table.
//!
//! Each leaf column has a typed [`Accessor`]; [`Accessor::key`] gives the
//! flat key the table renderer addresses it by (`{subject}Theory`,
//! `{subject}.total`, `overallGrade`, ...).

use std::fmt;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::engine::ComputedStudent;
use crate::gradebook::ScorePart;
use crate::labels;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accessor {
    Name,
    Theory(String),
    Practical(String),
    Total(String),
    Grade(String),
    OverallTotal,
    OverallAverage,
    OverallGrade,
    OverallGradeDescription,
    PassOrFail,
}

impl Accessor {
    pub fn key(&self) -> String {
        match self {
            Accessor::Name => "name".to_string(),
            Accessor::Theory(s) => format!("{}Theory", s),
            Accessor::Practical(s) => format!("{}Practical", s),
            Accessor::Total(s) => format!("{}.total", s),
            Accessor::Grade(s) => format!("{}.grade", s),
            Accessor::OverallTotal => "overallTotal".to_string(),
            Accessor::OverallAverage => "overallAverage".to_string(),
            Accessor::OverallGrade => "overallGrade".to_string(),
            Accessor::OverallGradeDescription => "overallGradeDescription".to_string(),
            Accessor::PassOrFail => "passOrFail".to_string(),
        }
    }

    /// Displayed value of this column for one student.
    pub fn value(&self, student: &ComputedStudent) -> String {
        match self {
            Accessor::Name => student.student.name.clone(),
            Accessor::Theory(s) => student.student.raw(s, ScorePart::Theory).to_string(),
            Accessor::Practical(s) => student.student.raw(s, ScorePart::Practical).to_string(),
            Accessor::Total(s) => student
                .subject(s)
                .map(|stat| stat.total_display())
                .unwrap_or_default(),
            Accessor::Grade(s) => student
                .subject(s)
                .map(|stat| stat.grade.label().to_string())
                .unwrap_or_default(),
            Accessor::OverallTotal => student.overall_total_display(),
            Accessor::OverallAverage => student.overall_average_display(),
            Accessor::OverallGrade => student.overall_grade.label().to_string(),
            Accessor::OverallGradeDescription => student.overall_grade_description.to_string(),
            Accessor::PassOrFail => student.pass_or_fail.label().to_string(),
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub header: String,
    pub accessor: Accessor,
}

impl Column {
    fn new(header: &str, accessor: Accessor) -> Self {
        Column {
            header: header.to_string(),
            accessor,
        }
    }
}

/// A top-level column, possibly grouping sub-columns under one header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnDef {
    Leaf(Column),
    Group { header: String, columns: Vec<Column> },
}

/// Columns of the results table for the given subject order.
pub fn columns(subjects: &[String]) -> Vec<ColumnDef> {
    let mut defs = vec![ColumnDef::Leaf(Column::new(labels::STUDENT_NAME, Accessor::Name))];
    for subject in subjects {
        defs.push(ColumnDef::Group {
            header: subject.clone(),
            columns: vec![
                Column::new(labels::THEORY, Accessor::Theory(subject.clone())),
                Column::new(labels::PRACTICAL, Accessor::Practical(subject.clone())),
                Column::new(labels::TOTAL, Accessor::Total(subject.clone())),
                Column::new(labels::GRADE, Accessor::Grade(subject.clone())),
            ],
        });
    }
    defs.extend(
        [
            (labels::OVERALL_TOTAL, Accessor::OverallTotal),
            (labels::OVERALL_AVERAGE, Accessor::OverallAverage),
            (labels::OVERALL_GRADE, Accessor::OverallGrade),
            (labels::OVERALL_GRADE_DESCRIPTION, Accessor::OverallGradeDescription),
            (labels::REMARK, Accessor::PassOrFail),
        ]
        .into_iter()
        .map(|(header, accessor)| ColumnDef::Leaf(Column::new(header, accessor))),
    );
    defs
}

/// Leaf columns in display order.
pub fn leaf_columns(subjects: &[String]) -> Vec<Column> {
    columns(subjects)
        .into_iter()
        .flat_map(|def| match def {
            ColumnDef::Leaf(column) => vec![column],
            ColumnDef::Group { columns, .. } => columns,
        })
        .collect()
}

/// Renders the computed roster as a text table with a row number column,
/// a group header row and a column header row.
pub fn render_table(roster: &[ComputedStudent], subjects: &[String]) -> String {
    let mut builder = Builder::default();

    let mut groups = vec!["#".to_string()];
    let mut headers = vec![String::new()];
    for def in columns(subjects) {
        match def {
            ColumnDef::Leaf(column) => {
                groups.push(column.header);
                headers.push(String::new());
            }
            ColumnDef::Group { header, columns } => {
                groups.push(header);
                groups.extend(std::iter::repeat_n(String::new(), columns.len() - 1));
                headers.extend(columns.into_iter().map(|c| c.header));
            }
        }
    }
    builder.push_record(groups);
    builder.push_record(headers);

    let leaves = leaf_columns(subjects);
    for (index, student) in roster.iter().enumerate() {
        let mut record = vec![(index + 1).to_string()];
        record.extend(leaves.iter().map(|c| c.accessor.value(student)));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}
