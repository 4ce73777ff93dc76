//! Fixed label set used by the results table and its exports.
//!
//! These strings are shown to teachers and printed on the exported sheet, so
//! they are kept verbatim rather than derived from the grade ladder.

/// Grade labels, best first.
pub const GRADE_LABELS: [&str; 9] = [
    "अ १", "अ २", "ब १", "ब २", "क १", "क २", "ड", "इ १", "इ २",
];

/// Grade descriptions, in the same order as [`GRADE_LABELS`].
pub const GRADE_DESCRIPTIONS: [&str; 9] = [
    "अप्रतिम",
    "खुप चांगला",
    "चांगला",
    "बरा",
    "सर्वसाधारण",
    "ठीक",
    "असमानधारक",
    "सुधारणा आवश्यक",
    "सुधारणा आवश्यक",
];

pub const PASS: &str = "पास";
pub const FAIL: &str = "नापास";

pub const STUDENT_NAME: &str = "विद्यार्थ्यांचे नाव";

// Per-subject sub-columns.
pub const THEORY: &str = "आकारीक मुल्य";
pub const PRACTICAL: &str = "संकलित मुल्य";
pub const TOTAL: &str = "एकूण";
pub const GRADE: &str = "श्रेणी";

// Aggregate columns.
pub const OVERALL_TOTAL: &str = "एकूण गुण";
pub const OVERALL_AVERAGE: &str = "शेकडा प्रमाण";
pub const OVERALL_GRADE: &str = "श्रेणी";
pub const OVERALL_GRADE_DESCRIPTION: &str = "श्रेणीवर्णन";
pub const REMARK: &str = "शेरा";

// Prefixes of the labelled header lines.
pub const SCHOOL_PREFIX: &str = "शाळेचे नांव : ";
pub const TEACHER_PREFIX: &str = "वर्ग शिक्षकाचे नांव : ";
pub const YEAR_PREFIX: &str = "सन : ";
pub const CLASS_PREFIX: &str = "वर्ग : ";
pub const SECTION_PREFIX: &str = "तुकडी : ";

// Header defaults a fresh gradebook starts with.
pub const DEFAULT_SCHOOL: &str = "कै.आ.ह.आब्बा प्राथमिक विद्यालय सोलापूर";
pub const DEFAULT_TEACHER: &str = "शिक्षकांचे नाव";
pub const DEFAULT_YEAR: &str = "२०२३-२४";
pub const DEFAULT_CLASS: &str = "१ ली";
pub const DEFAULT_SECTION: &str = "अ";
pub const DEFAULT_PAPER_HEADER: &str = "सातत्यपूर्ण सर्वंकष मूल्यमापन";
pub const DEFAULT_SEMESTER: &str = "प्रथम सत्र / द्वितीय सत्र";
pub const DEFAULT_SUBJECT: &str = "विषय १";

/// Marker written into export cells whose raw input is not a number.
pub const NAN_MARKER: &str = "NaN";

pub const DEFAULT_XLSX_FILE: &str = "school_results.xlsx";
pub const DEFAULT_PNG_FILE: &str = "school_results.png";
pub const SHEET_NAME: &str = "Results";
