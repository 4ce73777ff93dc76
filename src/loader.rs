use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{GradeError, Result};
use crate::gradebook::{Gradebook, HeaderFields, ScorePart};
use crate::saving::load_gradebook;
use crate::score;

/// A score as written in a roster document: either a JSON number or text.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl Default for ScoreValue {
    fn default() -> Self {
        ScoreValue::Text(String::new())
    }
}

impl ScoreValue {
    fn as_raw(&self) -> String {
        match self {
            ScoreValue::Number(n) => score::number_text(*n),
            ScoreValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RosterScores {
    pub theory: ScoreValue,
    pub practical: ScoreValue,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RosterStudent {
    pub name: String,
    pub scores: BTreeMap<String, RosterScores>,
}

/// JSON roster document; every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RosterDocument {
    pub header: HeaderFields,
    /// `None` keeps the default subject list.
    pub subjects: Option<Vec<String>>,
    pub students: Vec<RosterStudent>,
}

impl RosterDocument {
    /// Builds a gradebook, entering every score as if typed and committed,
    /// so numeric values are clamped on the way in.
    pub fn into_gradebook(self) -> Result<Gradebook> {
        let mut book = match self.subjects {
            Some(subjects) => Gradebook::with_subjects(
                subjects
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            ),
            None => Gradebook::new(),
        };
        book.header = self.header;

        for entry in self.students {
            let Some(id) = book.add_student(&entry.name) else {
                warn!("skipping roster entry without a name");
                continue;
            };
            for (subject, scores) in entry.scores {
                if !book.subjects.contains(&subject) {
                    warn!(student = %entry.name, subject = subject.as_str(), "score for unknown subject ignored");
                    continue;
                }
                book.set_score(id, &subject, ScorePart::Theory, &scores.theory.as_raw())?;
                book.set_score(id, &subject, ScorePart::Practical, &scores.practical.as_raw())?;
            }
        }
        Ok(book)
    }
}

/// Parses a roster document from JSON text.
pub fn parse_roster_json(text: &str) -> Result<Gradebook> {
    let document: RosterDocument = serde_json::from_str(text)?;
    document.into_gradebook()
}

/// Loads a roster document from a JSON file.
pub fn from_json(filepath: impl AsRef<Path>) -> Result<Gradebook> {
    let text = fs::read_to_string(filepath)?;
    parse_roster_json(&text)
}

/// Column of a roster CSV.
enum CsvColumn {
    Name,
    Score(String, ScorePart),
    Ignored,
}

fn csv_column(title: &str) -> CsvColumn {
    let title = title.trim();
    if title.eq_ignore_ascii_case("name") {
        return CsvColumn::Name;
    }
    for (suffix, part) in [(" theory", ScorePart::Theory), (" practical", ScorePart::Practical)] {
        let Some(split) = title.len().checked_sub(suffix.len()) else {
            continue;
        };
        if title.is_char_boundary(split) && title[split..].eq_ignore_ascii_case(suffix) {
            let subject = title[..split].trim();
            if !subject.is_empty() {
                return CsvColumn::Score(subject.to_string(), part);
            }
        }
    }
    CsvColumn::Ignored
}

/// Parses a roster from CSV text.
///
/// The header row names the columns: `name`, then `<subject> theory` and
/// `<subject> practical` pairs. Subjects are taken in order of first
/// appearance; unknown columns are skipped.
pub fn parse_roster_csv(text: &str) -> Result<Gradebook> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| GradeError::Csv("CSV file is empty".to_string()))?;
    let columns: Vec<CsvColumn> = parse_csv_row(header)?.iter().map(|t| csv_column(t)).collect();

    if !columns.iter().any(|c| matches!(c, CsvColumn::Name)) {
        return Err(GradeError::Csv("missing name column".to_string()));
    }

    let mut subjects: Vec<String> = Vec::new();
    for column in &columns {
        if let CsvColumn::Score(subject, _) = column {
            if !subjects.contains(subject) {
                subjects.push(subject.clone());
            }
        }
    }

    let mut book = Gradebook::with_subjects(subjects);
    for (line_no, line) in lines.enumerate() {
        let fields = parse_csv_row(line)?;
        let name = columns
            .iter()
            .zip(&fields)
            .find(|(c, _)| matches!(c, CsvColumn::Name))
            .map(|(_, f)| f.as_str())
            .unwrap_or("");
        let Some(id) = book.add_student(name) else {
            debug!(line = line_no + 2, "skipping CSV row without a name");
            continue;
        };
        for (column, value) in columns.iter().zip(&fields) {
            if let CsvColumn::Score(subject, part) = column {
                book.set_score(id, subject, *part, value)?;
            }
        }
    }
    Ok(book)
}

/// Loads a roster from a CSV file.
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Gradebook> {
    let text = fs::read_to_string(filepath)?;
    parse_roster_csv(&text)
}

// Parse a CSV row into a vector of strings
fn parse_csv_row(line: &str) -> Result<Vec<String>> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if let Some(&next) = chars.peek() {
                    if next == '"' && in_quotes {
                        // Double quote inside quoted field - add a single quote
                        current_field.push('"');
                        chars.next();
                    } else {
                        in_quotes = !in_quotes;
                    }
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(GradeError::Csv(format!("unterminated quote in: {}", line)));
    }

    // Add the last field
    result.push(current_field);

    Ok(result)
}

/// Detect file type and load appropriate format
///
/// `.json` is a roster document, `.csv` a roster table, and `.gz`/`.bin` a
/// gradebook snapshot.
///
/// # Examples
/// ```no_run
/// use gradesheet::loader::load_roster;
///
/// match load_roster("class.json") {
///     Ok(book) => println!("Loaded {} students", book.students.len()),
///     Err(e) => eprintln!("Error loading roster: {}", e),
/// }
/// ```
pub fn load_roster(filepath: impl AsRef<Path>) -> Result<Gradebook> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("json") => from_json(path),
        Some("csv") => from_csv(path),
        Some("gz") | Some("bin") => load_gradebook(path),
        Some(ext) => Err(GradeError::UnsupportedFormat(format!(".{} file", ext))),
        None => Err(GradeError::UnsupportedFormat("file has no extension".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_respect_quotes() {
        assert_eq!(
            parse_csv_row(r#"a,"b,c","say ""hi""""#).unwrap(),
            vec!["a", "b,c", r#"say "hi""#]
        );
        assert!(parse_csv_row(r#"a,"open"#).is_err());
    }

    #[test]
    fn csv_header_maps_subject_columns() {
        assert!(matches!(csv_column(" Name "), CsvColumn::Name));
        match csv_column("Maths Theory") {
            CsvColumn::Score(s, ScorePart::Theory) => assert_eq!(s, "Maths"),
            _ => panic!("expected theory column"),
        }
        assert!(matches!(csv_column("remarks"), CsvColumn::Ignored));
    }
}
