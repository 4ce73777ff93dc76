use thiserror::Error;

use crate::gradebook::StudentId;

pub type Result<T> = std::result::Result<T, GradeError>;

#[derive(Debug, Error)]
pub enum GradeError {
    /// An overall average was requested with an empty subject list.
    #[error("no subjects configured")]
    NoSubjects,

    /// The table is wider than a worksheet allows.
    #[error("table needs {0} columns, a worksheet holds at most 16384")]
    TooManyColumns(usize),

    #[error("unsupported roster format: {0}")]
    UnsupportedFormat(String),

    #[error("unknown student: {0}")]
    UnknownStudent(StudentId),

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid roster document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid gradebook snapshot: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("invalid CSV roster: {0}")]
    Csv(String),

    #[error("spreadsheet export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("image export failed: {0}")]
    Raster(String),
}
