use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::engine::{ComputedStudent, compute_roster};
use crate::error::{GradeError, Result};
use crate::grid::{SheetGrid, build_sheet_grid};
use crate::labels;
use crate::score;

/// Opaque identity of a student row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(Uuid);

impl StudentId {
    pub fn new() -> Self {
        StudentId(Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw text of the two score inputs of one subject, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(default)]
    pub theory: String,
    #[serde(default)]
    pub practical: String,
}

impl ScoreEntry {
    pub fn get(&self, part: ScorePart) -> &str {
        match part {
            ScorePart::Theory => &self.theory,
            ScorePart::Practical => &self.practical,
        }
    }

    fn get_mut(&mut self, part: ScorePart) -> &mut String {
        match part {
            ScorePart::Theory => &mut self.theory,
            ScorePart::Practical => &mut self.practical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorePart {
    Theory,
    Practical,
}

impl FromStr for ScorePart {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "theory" | "t" => Ok(ScorePart::Theory),
            "practical" | "p" => Ok(ScorePart::Practical),
            other => Err(format!("unknown score part: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Score inputs keyed by subject name.
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreEntry>,
}

impl Student {
    /// A student with an empty entry for every subject.
    pub fn new(name: impl Into<String>, subjects: &[String]) -> Self {
        Student {
            id: StudentId::new(),
            name: name.into(),
            scores: subjects
                .iter()
                .map(|s| (s.clone(), ScoreEntry::default()))
                .collect(),
        }
    }

    /// Raw text of one input; a subject the student has no entry for reads
    /// as empty.
    pub fn raw(&self, subject: &str, part: ScorePart) -> &str {
        self.scores.get(subject).map(|e| e.get(part)).unwrap_or("")
    }
}

/// The seven free-text lines printed above the results table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderFields {
    pub school: String,
    pub teacher: String,
    pub year: String,
    pub class: String,
    pub section: String,
    pub semester: String,
    pub paper_header: String,
}

impl Default for HeaderFields {
    fn default() -> Self {
        HeaderFields {
            school: labels::DEFAULT_SCHOOL.to_string(),
            teacher: labels::DEFAULT_TEACHER.to_string(),
            year: labels::DEFAULT_YEAR.to_string(),
            class: labels::DEFAULT_CLASS.to_string(),
            section: labels::DEFAULT_SECTION.to_string(),
            semester: labels::DEFAULT_SEMESTER.to_string(),
            paper_header: labels::DEFAULT_PAPER_HEADER.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    School,
    Teacher,
    Year,
    Class,
    Section,
    Semester,
    PaperHeader,
}

impl HeaderField {
    /// Export order of the header lines.
    pub const ORDER: [HeaderField; 7] = [
        HeaderField::School,
        HeaderField::Teacher,
        HeaderField::Year,
        HeaderField::Class,
        HeaderField::Section,
        HeaderField::Semester,
        HeaderField::PaperHeader,
    ];

    /// Printed prefix; the paper header and semester lines have none.
    pub fn prefix(self) -> &'static str {
        match self {
            HeaderField::School => labels::SCHOOL_PREFIX,
            HeaderField::Teacher => labels::TEACHER_PREFIX,
            HeaderField::Year => labels::YEAR_PREFIX,
            HeaderField::Class => labels::CLASS_PREFIX,
            HeaderField::Section => labels::SECTION_PREFIX,
            HeaderField::Semester | HeaderField::PaperHeader => "",
        }
    }
}

impl FromStr for HeaderField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "school" => Ok(HeaderField::School),
            "teacher" => Ok(HeaderField::Teacher),
            "year" => Ok(HeaderField::Year),
            "class" => Ok(HeaderField::Class),
            "section" => Ok(HeaderField::Section),
            "semester" => Ok(HeaderField::Semester),
            "paper-header" | "paper_header" | "paper" => Ok(HeaderField::PaperHeader),
            other => Err(format!("unknown header field: {}", other)),
        }
    }
}

impl HeaderFields {
    pub fn get(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::School => &self.school,
            HeaderField::Teacher => &self.teacher,
            HeaderField::Year => &self.year,
            HeaderField::Class => &self.class,
            HeaderField::Section => &self.section,
            HeaderField::Semester => &self.semester,
            HeaderField::PaperHeader => &self.paper_header,
        }
    }

    pub fn set(&mut self, field: HeaderField, text: impl Into<String>) {
        let slot = match field {
            HeaderField::School => &mut self.school,
            HeaderField::Teacher => &mut self.teacher,
            HeaderField::Year => &mut self.year,
            HeaderField::Class => &mut self.class,
            HeaderField::Section => &mut self.section,
            HeaderField::Semester => &mut self.semester,
            HeaderField::PaperHeader => &mut self.paper_header,
        };
        *slot = text.into();
    }

    /// The line as it reads on the page, prefix included.
    pub fn line(&self, field: HeaderField) -> String {
        format!("{}{}", field.prefix(), self.get(field))
    }
}

/// Splits a comma-separated subject list, trimming names and dropping
/// empty ones.
pub fn split_subjects(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Roster, ordered subject list and header lines of one results sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gradebook {
    pub header: HeaderFields,
    pub subjects: Vec<String>,
    pub students: Vec<Student>,
}

impl Default for Gradebook {
    fn default() -> Self {
        Gradebook {
            header: HeaderFields::default(),
            subjects: vec![labels::DEFAULT_SUBJECT.to_string()],
            students: Vec::new(),
        }
    }
}

impl Gradebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gradebook with the given subjects and no students.
    pub fn with_subjects<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut book = Gradebook {
            subjects: Vec::new(),
            ..Self::default()
        };
        for subject in subjects {
            let subject = subject.into();
            if !book.subjects.contains(&subject) {
                book.subjects.push(subject);
            }
        }
        book
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    fn student_mut(&mut self, id: StudentId) -> Result<&mut Student> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(GradeError::UnknownStudent(id))
    }

    /// Id of the student shown at a 0-based row position.
    pub fn id_at(&self, index: usize) -> Option<StudentId> {
        self.students.get(index).map(|s| s.id)
    }

    /// Appends a student with empty score entries. Blank names are ignored.
    pub fn add_student(&mut self, name: &str) -> Option<StudentId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let student = Student::new(name, &self.subjects);
        let id = student.id;
        debug!(%id, name, "student added");
        self.students.push(student);
        Some(id)
    }

    /// Adds every subject of a comma-separated list that is not already
    /// present, in order, and gives every student empty entries for them.
    /// Returns the subjects actually added.
    pub fn add_subjects(&mut self, input: &str) -> Vec<String> {
        let mut added: Vec<String> = Vec::new();
        for subject in split_subjects(input) {
            if !self.subjects.contains(&subject) && !added.contains(&subject) {
                added.push(subject);
            }
        }

        for student in &mut self.students {
            for subject in &added {
                student.scores.insert(subject.clone(), ScoreEntry::default());
            }
        }
        self.subjects.extend(added.iter().cloned());
        debug!(?added, "subjects added");
        added
    }

    /// Removes every listed subject and its entries. Names that are not
    /// subjects are ignored. Returns the subjects actually removed.
    pub fn remove_subjects(&mut self, input: &str) -> Vec<String> {
        let listed = split_subjects(input);
        let removed: Vec<String> = self
            .subjects
            .iter()
            .filter(|s| listed.contains(s))
            .cloned()
            .collect();

        self.subjects.retain(|s| !listed.contains(s));
        for student in &mut self.students {
            for subject in &listed {
                student.scores.remove(subject);
            }
        }
        debug!(?removed, "subjects removed");
        removed
    }

    fn check_subject(&self, subject: &str) -> Result<()> {
        if self.subjects.iter().any(|s| s == subject) {
            Ok(())
        } else {
            Err(GradeError::UnknownSubject(subject.to_string()))
        }
    }

    /// Stores a score input exactly as typed.
    pub fn edit_score(
        &mut self,
        id: StudentId,
        subject: &str,
        part: ScorePart,
        value: &str,
    ) -> Result<()> {
        self.check_subject(subject)?;
        let student = self.student_mut(id)?;
        *student
            .scores
            .entry(subject.to_string())
            .or_default()
            .get_mut(part) = value.to_string();
        Ok(())
    }

    /// Finishes editing a score input: a numeric value is clamped into
    /// `[0, 100]` and written back in canonical form. Empty and non-numeric
    /// text is left as typed.
    pub fn commit_score(&mut self, id: StudentId, subject: &str, part: ScorePart) -> Result<()> {
        self.check_subject(subject)?;
        let student = self.student_mut(id)?;
        let slot = student
            .scores
            .entry(subject.to_string())
            .or_default()
            .get_mut(part);

        if slot.trim().is_empty() {
            return Ok(());
        }
        if let Some(value) = score::coerce(slot) {
            let committed = score::number_text(score::clamp(value));
            if *slot != committed {
                debug!(%id, subject, from = slot.as_str(), to = committed.as_str(), "score clamped");
                *slot = committed;
            }
        }
        Ok(())
    }

    /// Edit followed by commit, as when a value is typed and focus leaves
    /// the input.
    pub fn set_score(
        &mut self,
        id: StudentId,
        subject: &str,
        part: ScorePart,
        value: &str,
    ) -> Result<()> {
        self.edit_score(id, subject, part, value)?;
        self.commit_score(id, subject, part)
    }

    pub fn rename_student(&mut self, id: StudentId, name: &str) -> Result<()> {
        let student = self.student_mut(id)?;
        student.name = name.trim().to_string();
        Ok(())
    }

    /// Removes a student by id. Unknown ids are a no-op; returns whether a
    /// student was removed.
    pub fn delete_student(&mut self, id: StudentId) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        let removed = self.students.len() != before;
        if removed {
            debug!(%id, "student deleted");
        }
        removed
    }

    pub fn set_header(&mut self, field: HeaderField, text: &str) {
        self.header.set(field, text.trim());
    }

    /// Derived statistics for every student, recomputed on each call.
    pub fn computed(&self) -> Result<Vec<ComputedStudent>> {
        compute_roster(&self.students, &self.subjects)
    }

    /// The export grid for the current state.
    pub fn sheet_grid(&self) -> Result<SheetGrid> {
        let roster = if self.students.is_empty() {
            Vec::new()
        } else {
            self.computed()?
        };
        build_sheet_grid(&roster, &self.subjects, &self.header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Gradebook {
        Gradebook::with_subjects(["Maths", "Science"])
    }

    #[test]
    fn new_students_get_empty_entries_for_every_subject() {
        let mut book = book();
        let id = book.add_student("  Asha ").unwrap();
        let student = book.student(id).unwrap();
        assert_eq!(student.name, "Asha");
        assert_eq!(student.scores.len(), 2);
        assert_eq!(student.raw("Maths", ScorePart::Theory), "");
    }

    #[test]
    fn blank_student_names_are_ignored() {
        let mut book = book();
        assert!(book.add_student("   ").is_none());
        assert!(book.students.is_empty());
    }

    #[test]
    fn add_subjects_skips_duplicates() {
        let mut book = book();
        book.add_student("Asha");
        let added = book.add_subjects(" Maths, Art ,, Art,History");
        assert_eq!(added, vec!["Art", "History"]);
        assert_eq!(book.subjects, vec!["Maths", "Science", "Art", "History"]);
        assert!(book.students[0].scores.contains_key("Art"));
    }

    #[test]
    fn commit_clamps_numeric_values_only() {
        let mut book = book();
        let id = book.add_student("Asha").unwrap();
        book.set_score(id, "Maths", ScorePart::Theory, "150").unwrap();
        book.set_score(id, "Maths", ScorePart::Practical, "-5").unwrap();
        book.set_score(id, "Science", ScorePart::Theory, "abc").unwrap();
        let s = book.student(id).unwrap();
        assert_eq!(s.raw("Maths", ScorePart::Theory), "100");
        assert_eq!(s.raw("Maths", ScorePart::Practical), "0");
        assert_eq!(s.raw("Science", ScorePart::Theory), "abc");
    }

    #[test]
    fn edits_to_unknown_subject_are_rejected() {
        let mut book = book();
        let id = book.add_student("Asha").unwrap();
        assert!(matches!(
            book.edit_score(id, "Art", ScorePart::Theory, "1"),
            Err(GradeError::UnknownSubject(_))
        ));
    }

    #[test]
    fn header_lines_carry_their_prefix() {
        let mut header = HeaderFields::default();
        header.set(HeaderField::Year, "2024-25");
        assert_eq!(header.line(HeaderField::Year), "सन : 2024-25");
        assert_eq!(
            header.line(HeaderField::PaperHeader),
            labels::DEFAULT_PAPER_HEADER
        );
        assert_eq!(
            "paper-header".parse::<HeaderField>(),
            Ok(HeaderField::PaperHeader)
        );
    }
}
