/*!
# Gradesheet

Records student grades, computes grade statistics and exports the results
table as a spreadsheet, CSV file or image.

## Overview

A gradebook holds an ordered list of subjects, a roster of students with a
theory and a practical score per subject, and seven free-text header lines
(school, teacher, year, class, section, semester, paper header). Scores are
kept exactly as typed; every derived value is recomputed on read.

## Architecture

### Computation
- **score**: numeric coercion of raw entries and clamping into `[0, 100]`
- **grade**: the nine-step grade ladder, descriptions and pass/fail remark
- **engine**: per-subject and overall statistics of a student

### Model
- **gradebook**: students, subjects, header lines and their edit operations
- **session**: the command dispatcher that owns a gradebook and the header
  edit mode

### Output
- **columns**: column accessors and the text rendering of the live table
- **grid**: the export grid (cells, merge ranges, column widths)
- **downloader**: XLSX and CSV export of a grid
- **raster**: PNG export of a grid (`render` feature)

### Persistence
- **saving**: gzip-compressed bincode session snapshots
- **loader**: roster import from JSON documents, CSV files and snapshots

## Grade ladder

| Total | Grade |
|-------|-------|
| ≥ 91  | अ १   |
| ≥ 81  | अ २   |
| ≥ 71  | ब १   |
| ≥ 61  | ब २   |
| ≥ 51  | क १   |
| ≥ 41  | क २   |
| ≥ 31  | ड     |
| ≥ 21  | इ १   |
| below | इ २ (fail) |
*/

pub mod columns;
pub mod downloader;
pub mod engine;
pub mod error;
pub mod grade;
pub mod gradebook;
pub mod grid;
pub mod labels;
pub mod loader;
#[cfg(feature = "render")]
pub mod raster;
pub mod saving;
pub mod score;
pub mod session;

pub use engine::{ComputedStudent, SubjectStat, compute_roster, compute_student};
pub use error::{GradeError, Result};
pub use grade::{Grade, Verdict, grade_description, grade_from_total, pass_or_fail};
pub use gradebook::{
    Gradebook, HeaderField, HeaderFields, ScoreEntry, ScorePart, Student, StudentId,
};
pub use grid::{Cell, CellRange, SheetGrid, build_sheet_grid};
pub use session::{Command, Outcome, Session};
