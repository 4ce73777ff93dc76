use serde::Serialize;
use std::fmt;

use crate::downloader::column_to_letter;
use crate::engine::ComputedStudent;
use crate::error::{GradeError, Result};
use crate::grade::Grade;
use crate::gradebook::{HeaderField, HeaderFields, ScorePart};
use crate::labels;
use crate::score;

/// Row holding the subject names.
pub const GROUP_HEADER_ROW: u32 = 8;
/// Row holding the per-subject sub-labels.
pub const SUB_HEADER_ROW: u32 = 9;
/// First student row.
pub const FIRST_STUDENT_ROW: u32 = 10;
/// Columns each subject occupies.
pub const SUBJECT_SPAN: u16 = 4;
/// Extra character units added to every column width.
pub const COLUMN_PADDING: f64 = 2.0;
/// Columns an XLSX worksheet can hold.
pub const MAX_COLUMNS: usize = 16_384;
/// Aggregate columns after the last subject.
const AGGREGATE_COLUMNS: usize = 5;

/// One exported cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Cell {
    Blank,
    Text(String),
    Number(f64),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(value)
        }
    }

    /// Length in characters of the cell as displayed.
    pub fn width(&self) -> usize {
        match self {
            Cell::Blank => 0,
            Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => score::number_text(*n).chars().count(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Blank => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => f.write_str(&score::number_text(*n)),
        }
    }
}

/// Inclusive rectangle of cells shown as one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        CellRange {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn single(row: u32, col: u16) -> Self {
        Self::new(row, col, row, col)
    }

    pub fn is_single(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }

    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// Spreadsheet notation, e.g. `B9:E9`.
    pub fn a1(&self) -> String {
        let start = format!("{}{}", column_to_letter(self.first_col + 1), self.first_row + 1);
        if self.is_single() {
            return start;
        }
        format!(
            "{}:{}{}",
            start,
            column_to_letter(self.last_col + 1),
            self.last_row + 1
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

/// The results table laid out for a spreadsheet writer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SheetGrid {
    /// Rows of cells; rows may differ in length.
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<CellRange>,
    /// Width of every column in character units.
    pub column_widths: Vec<f64>,
}

const BLANK: Cell = Cell::Blank;

impl SheetGrid {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: u32, col: u16) -> &Cell {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .unwrap_or(&BLANK)
    }

    pub fn merge_at(&self, row: u32, col: u16) -> Option<&CellRange> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    /// Cells inside any merge range are centered both ways.
    pub fn is_centered(&self, row: u32, col: u16) -> bool {
        self.merge_at(row, col).is_some()
    }
}

fn header_rows(header: &HeaderFields) -> Vec<Vec<Cell>> {
    HeaderField::ORDER
        .iter()
        .map(|field| vec![Cell::text(header.line(*field))])
        .collect()
}

fn group_header_row(subjects: &[String]) -> Vec<Cell> {
    let mut row = vec![Cell::text(labels::STUDENT_NAME)];
    for subject in subjects {
        row.push(Cell::text(subject.as_str()));
        row.extend([Cell::Blank, Cell::Blank, Cell::Blank]);
    }
    row.extend(
        [
            labels::OVERALL_TOTAL,
            labels::OVERALL_AVERAGE,
            labels::OVERALL_GRADE,
            labels::OVERALL_GRADE_DESCRIPTION,
            labels::REMARK,
        ]
        .map(Cell::text),
    );
    row
}

fn sub_header_row(subjects: &[String]) -> Vec<Cell> {
    let mut row = vec![Cell::Blank];
    for _ in subjects {
        row.extend(
            [
                labels::THEORY,
                labels::PRACTICAL,
                labels::TOTAL,
                labels::GRADE,
            ]
            .map(Cell::text),
        );
    }
    // Placeholders under the last three aggregate headers.
    row.extend([Cell::text(" "), Cell::text(" "), Cell::text(" ")]);
    row
}

/// Total and grade cells of one subject, computed straight from the raw
/// inputs: no clamping, and a `NaN` marker in both cells when either input
/// is not a number.
fn raw_total_cells(theory: &str, practical: &str) -> [Cell; 2] {
    let nan = || Cell::text(labels::NAN_MARKER);
    match (score::coerce(theory), score::coerce(practical)) {
        (Some(t), Some(p)) if !(t + p).is_nan() => {
            let total = t + p;
            [Cell::Number(total), Cell::text(Grade::from_total(total).label())]
        }
        _ => [nan(), nan()],
    }
}

fn student_row(student: &ComputedStudent, subjects: &[String]) -> Result<Vec<Cell>> {
    let mut row = vec![Cell::text(student.student.name.as_str())];

    for subject in subjects {
        let theory = student.student.raw(subject, ScorePart::Theory);
        let practical = student.student.raw(subject, ScorePart::Practical);
        row.push(Cell::text(theory));
        row.push(Cell::text(practical));
        row.extend(raw_total_cells(theory, practical));
    }

    if subjects.is_empty() {
        return Err(GradeError::NoSubjects);
    }
    let total_display = student.overall_total_display();
    // The average column is recomputed from the rounded total text rather
    // than taken from the computed average.
    let rounded_total: f64 = total_display.parse().unwrap_or(student.overall_total);
    let average = rounded_total / subjects.len() as f64;

    row.push(Cell::text(total_display));
    row.push(Cell::text(score::to_fixed(average, 2)));
    row.push(Cell::text(student.overall_grade.label()));
    row.push(Cell::text(student.overall_grade_description));
    row.push(Cell::text(student.pass_or_fail.label()));
    Ok(row)
}

/// Number of columns the table needs for `subject_count` subjects.
pub fn sheet_width(subject_count: usize) -> usize {
    1 + usize::from(SUBJECT_SPAN) * subject_count + AGGREGATE_COLUMNS
}

/// Converts a column index, failing past the worksheet's last column.
pub fn column_index(col: usize) -> Result<u16> {
    if col >= MAX_COLUMNS {
        return Err(GradeError::TooManyColumns(col + 1));
    }
    u16::try_from(col).map_err(|_| GradeError::TooManyColumns(col + 1))
}

fn merge_ranges(subjects: &[String]) -> Result<Vec<CellRange>> {
    let span = usize::from(SUBJECT_SPAN);
    let mut merges = vec![CellRange::new(0, 0, 0, 2)];
    merges.extend((1..=6).map(|row| CellRange::single(row, 0)));
    for index in 0..subjects.len() {
        let first = 1 + span * index;
        merges.push(CellRange::new(
            GROUP_HEADER_ROW,
            column_index(first)?,
            GROUP_HEADER_ROW,
            column_index(first + span - 1)?,
        ));
    }
    Ok(merges)
}

/// Widest cell of every column plus [`COLUMN_PADDING`].
fn column_widths(rows: &[Vec<Cell>]) -> Vec<f64> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|col| {
            let widest = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(Cell::width)
                .max()
                .unwrap_or(0);
            widest as f64 + COLUMN_PADDING
        })
        .collect()
}

/// Lays out the computed roster as an export grid.
///
/// Rows 0-6 hold the header lines, row 7 is blank, rows 8-9 hold the two
/// header rows of the table and every student follows from row 10. Column
/// widths are measured once the whole grid exists.
///
/// # Errors
/// [`GradeError::NoSubjects`] when there are students but no subjects, and
/// [`GradeError::TooManyColumns`] when the subjects do not fit on one
/// worksheet.
///
/// # Examples
/// ```
/// use gradesheet::gradebook::Gradebook;
///
/// let mut book = Gradebook::with_subjects(["Maths", "Science"]);
/// book.add_student("Asha");
/// let grid = book.sheet_grid().unwrap();
/// assert_eq!(grid.height(), 11);
/// assert_eq!(grid.merges.last().unwrap().a1(), "F9:I9");
/// ```
pub fn build_sheet_grid(
    roster: &[ComputedStudent],
    subjects: &[String],
    header: &HeaderFields,
) -> Result<SheetGrid> {
    let width = sheet_width(subjects.len());
    if width > MAX_COLUMNS {
        return Err(GradeError::TooManyColumns(width));
    }

    let mut rows = header_rows(header);
    rows.push(Vec::new());
    rows.push(group_header_row(subjects));
    rows.push(sub_header_row(subjects));
    for student in roster {
        rows.push(student_row(student, subjects)?);
    }

    let column_widths = column_widths(&rows);
    Ok(SheetGrid {
        rows,
        merges: merge_ranges(subjects)?,
        column_widths,
    })
}
