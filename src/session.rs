//! Interactive editing session.
//!
//! A [`Session`] owns the gradebook and the header edit-mode flag. Every
//! user action arrives as one text command, is parsed into a [`Command`] and
//! dispatched here; nothing else mutates the gradebook.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::columns::render_table;
use crate::downloader;
use crate::error::Result;
use crate::gradebook::{Gradebook, HeaderField, ScorePart, StudentId};
use crate::labels;
use crate::loader;
use crate::saving;

lazy_static! {
    static ref SET_REGEX: Regex =
        Regex::new(r"^set\s+(\d+)\s+(.+?)\s+(?i:(theory|practical|t|p))(?:\s+(.*))?$").unwrap();
    static ref ROW_TEXT_REGEX: Regex = Regex::new(r"^(\d+)\s+(.+)$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Png,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    AddStudent(String),
    AddSubjects(String),
    RemoveSubjects(String),
    /// `row` is the 1-based display position.
    SetScore {
        row: usize,
        subject: String,
        part: ScorePart,
        value: String,
    },
    Rename { row: usize, name: String },
    Delete(usize),
    EditMode(bool),
    Header { field: HeaderField, text: String },
    Show,
    Export { format: ExportFormat, path: PathBuf },
    Save(PathBuf),
    Load(PathBuf),
    Help,
    Quit,
}

pub const HELP: &str = "Commands:
  add-student <name>                     Add a student
  add-subjects <a,b,...>                 Add subjects (existing names are skipped)
  remove-subjects <a,b,...>              Remove subjects and their scores
  set <row> <subject> theory|practical <value>
                                         Enter a score (clamped to 0-100)
  rename <row> <name>                    Rename a student
  delete <row>                           Delete a student
  edit-mode on|off                       Allow editing the header lines
  header <field> <text>                  Edit a header line (school, teacher, year,
                                         class, section, semester, paper-header)
  show                                   Print the results table
  export xlsx|csv|png [path]             Export the results table (xlsx and png
                                         default to school_results.xlsx/.png)
  save <path>                            Save the session
  load <path>                            Load a session or roster (.gz, .json, .csv)
  help                                   Show this help
  q | quit                               Quit";

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Command, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let need = |what: &str| {
            if rest.is_empty() {
                Err(format!("{} expects {}", verb, what))
            } else {
                Ok(rest.to_string())
            }
        };
        let row_of = |text: &str| {
            text.parse::<usize>()
                .ok()
                .filter(|r| *r > 0)
                .ok_or_else(|| format!("invalid row: {}", text))
        };

        match verb {
            "add-student" => Ok(Command::AddStudent(need("a name")?)),
            "add-subjects" => Ok(Command::AddSubjects(need("a subject list")?)),
            "remove-subjects" => Ok(Command::RemoveSubjects(need("a subject list")?)),
            "set" => {
                let caps = SET_REGEX
                    .captures(line)
                    .ok_or("usage: set <row> <subject> theory|practical <value>")?;
                Ok(Command::SetScore {
                    row: row_of(&caps[1])?,
                    subject: caps[2].to_string(),
                    part: caps[3].parse()?,
                    value: caps.get(4).map_or("", |m| m.as_str()).to_string(),
                })
            }
            "rename" => {
                let caps = ROW_TEXT_REGEX
                    .captures(rest)
                    .ok_or("usage: rename <row> <name>")?;
                Ok(Command::Rename {
                    row: row_of(&caps[1])?,
                    name: caps[2].to_string(),
                })
            }
            "delete" => Ok(Command::Delete(row_of(rest)?)),
            "edit-mode" => match rest {
                "on" => Ok(Command::EditMode(true)),
                "off" => Ok(Command::EditMode(false)),
                _ => Err("usage: edit-mode on|off".to_string()),
            },
            "header" => {
                let (field, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("usage: header <field> <text>")?;
                Ok(Command::Header {
                    field: field.parse()?,
                    text: text.trim().to_string(),
                })
            }
            "show" => Ok(Command::Show),
            "export" => {
                let (format, path) = match rest.split_once(char::is_whitespace) {
                    Some((format, path)) => (format, path.trim()),
                    None => (rest, ""),
                };
                let format = match format.to_ascii_lowercase().as_str() {
                    "xlsx" => ExportFormat::Xlsx,
                    "csv" => ExportFormat::Csv,
                    "png" => ExportFormat::Png,
                    "" => return Err("usage: export xlsx|csv|png [path]".to_string()),
                    other => return Err(format!("unknown export format: {}", other)),
                };
                let path = match (path, format) {
                    ("", ExportFormat::Xlsx) => labels::DEFAULT_XLSX_FILE,
                    ("", ExportFormat::Png) => labels::DEFAULT_PNG_FILE,
                    ("", ExportFormat::Csv) => return Err("export csv expects a path".to_string()),
                    (path, _) => path,
                };
                Ok(Command::Export {
                    format,
                    path: PathBuf::from(path),
                })
            }
            "save" => Ok(Command::Save(PathBuf::from(need("a path")?))),
            "load" => Ok(Command::Load(PathBuf::from(need("a path")?))),
            "help" => Ok(Command::Help),
            "q" | "quit" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

/// Result of dispatching one command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    /// Short status shown in the prompt, `ok` on success.
    pub status: String,
    /// Text to print, if any.
    pub output: Option<String>,
    pub quit: bool,
}

impl Outcome {
    fn ok() -> Self {
        Outcome {
            status: "ok".to_string(),
            ..Default::default()
        }
    }

    fn status(status: impl Into<String>) -> Self {
        Outcome {
            status: status.into(),
            ..Default::default()
        }
    }

    fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);
        self
    }
}

#[derive(Debug, Default)]
pub struct Session {
    book: Gradebook,
    /// Header lines may only be edited while this is on.
    edit_mode: bool,
    #[cfg(feature = "render")]
    raster: crate::raster::RasterOptions,
}

impl Session {
    pub fn new(book: Gradebook) -> Self {
        Session {
            book,
            ..Default::default()
        }
    }

    pub fn gradebook(&self) -> &Gradebook {
        &self.book
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Parses and dispatches one input line. Parse failures become the
    /// status; they never end the session.
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        match Command::parse(line) {
            Ok(command) => self.dispatch(command),
            Err(message) => {
                debug!(line, %message, "rejected input");
                Outcome::status(message)
            }
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Outcome {
        match self.apply(command) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "command failed");
                Outcome::status(e.to_string())
            }
        }
    }

    fn row_id(&self, row: usize) -> Option<StudentId> {
        self.book.id_at(row.checked_sub(1)?)
    }

    fn apply(&mut self, command: Command) -> Result<Outcome> {
        let outcome = match command {
            Command::AddStudent(name) => match self.book.add_student(&name) {
                Some(_) => Outcome::ok(),
                None => Outcome::status("empty name"),
            },
            Command::AddSubjects(list) => {
                let added = self.book.add_subjects(&list);
                if added.is_empty() {
                    Outcome::status("no new subjects")
                } else {
                    Outcome::ok()
                }
            }
            Command::RemoveSubjects(list) => {
                self.book.remove_subjects(&list);
                Outcome::ok()
            }
            Command::SetScore {
                row,
                subject,
                part,
                value,
            } => match self.row_id(row) {
                Some(id) => {
                    self.book.set_score(id, &subject, part, &value)?;
                    Outcome::ok()
                }
                None => Outcome::status("invalid row"),
            },
            Command::Rename { row, name } => match self.row_id(row) {
                Some(id) => {
                    self.book.rename_student(id, &name)?;
                    Outcome::ok()
                }
                None => Outcome::status("invalid row"),
            },
            Command::Delete(row) => {
                // A row that no longer exists is not an error.
                if let Some(id) = self.row_id(row) {
                    self.book.delete_student(id);
                }
                Outcome::ok()
            }
            Command::EditMode(on) => {
                self.edit_mode = on;
                Outcome::ok()
            }
            Command::Header { field, text } => {
                if !self.edit_mode {
                    warn!(?field, "header edit refused outside edit mode");
                    Outcome::status("edit mode is off")
                } else {
                    self.book.set_header(field, &text);
                    self.edit_mode = false;
                    Outcome::ok()
                }
            }
            Command::Show => {
                let header = HeaderField::ORDER
                    .iter()
                    .map(|f| self.book.header.line(*f))
                    .collect::<Vec<_>>()
                    .join("\n");
                let table = render_table(&self.book.computed()?, &self.book.subjects);
                Outcome::ok().with_output(format!("{}\n\n{}", header, table))
            }
            Command::Export { format, path } => {
                let grid = self.book.sheet_grid()?;
                match format {
                    ExportFormat::Xlsx => downloader::save_xlsx(&grid, &path)?,
                    ExportFormat::Csv => downloader::save_csv(&grid, &path)?,
                    #[cfg(feature = "render")]
                    ExportFormat::Png => crate::raster::save_png(&grid, &self.raster, &path)?,
                    #[cfg(not(feature = "render"))]
                    ExportFormat::Png => return Ok(Outcome::status("image export unavailable")),
                }
                Outcome::ok()
            }
            Command::Save(path) => {
                saving::save_gradebook(&self.book, &path)?;
                Outcome::ok()
            }
            Command::Load(path) => {
                self.book = loader::load_roster(&path)?;
                self.edit_mode = false;
                Outcome::ok()
            }
            Command::Help => Outcome::ok().with_output(HELP.to_string()),
            Command::Quit => Outcome {
                quit: true,
                ..Outcome::ok()
            },
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_takes_the_rest_of_the_line_as_value() {
        assert_eq!(
            Command::parse("set 3 Maths Theory  4 5"),
            Ok(Command::SetScore {
                row: 3,
                subject: "Maths".to_string(),
                part: ScorePart::Theory,
                value: "4 5".to_string(),
            })
        );
        // "pizza" is a value, not the practical marker.
        assert!(Command::parse("set 1 Maths pizza").is_err());
    }

    #[test]
    fn header_needs_field_and_text() {
        assert_eq!(
            Command::parse("header paper-header Unit test"),
            Ok(Command::Header {
                field: HeaderField::PaperHeader,
                text: "Unit test".to_string(),
            })
        );
        assert!(Command::parse("header school").is_err());
        assert!(Command::parse("header motto Hello").is_err());
    }
}
