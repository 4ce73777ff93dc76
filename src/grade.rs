use serde::{Deserialize, Serialize};
use std::fmt;

use crate::labels;

/// One of the nine ordinal grades, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    D,
    E1,
    E2,
}

/// Lower bound of each grade, paired with the grade. Checked top-down.
const LADDER: [(f64, Grade); 8] = [
    (91.0, Grade::A1),
    (81.0, Grade::A2),
    (71.0, Grade::B1),
    (61.0, Grade::B2),
    (51.0, Grade::C1),
    (41.0, Grade::C2),
    (31.0, Grade::D),
    (21.0, Grade::E1),
];

impl Grade {
    pub const ALL: [Grade; 9] = [
        Grade::A1,
        Grade::A2,
        Grade::B1,
        Grade::B2,
        Grade::C1,
        Grade::C2,
        Grade::D,
        Grade::E1,
        Grade::E2,
    ];

    /// Grade for a subject total or an overall average.
    ///
    /// Totals are not clamped here: anything at or above 91 is `A1`, and
    /// anything below 21 (including NaN) is `E2`.
    pub fn from_total(total: f64) -> Self {
        LADDER
            .iter()
            .find(|(floor, _)| total >= *floor)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::E2)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The printed label, e.g. `अ १`.
    pub fn label(self) -> &'static str {
        labels::GRADE_LABELS[self.index()]
    }

    pub fn description(self) -> &'static str {
        labels::GRADE_DESCRIPTIONS[self.index()]
    }

    pub fn verdict(self) -> Verdict {
        if self == Grade::E2 {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pass/fail remark derived from the overall grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => labels::PASS,
            Verdict::Fail => labels::FAIL,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shorthand for [`Grade::from_total`].
pub fn grade_from_total(total: f64) -> Grade {
    Grade::from_total(total)
}

/// Shorthand for [`Grade::description`].
pub fn grade_description(grade: Grade) -> &'static str {
    grade.description()
}

/// Shorthand for [`Grade::verdict`].
pub fn pass_or_fail(grade: Grade) -> Verdict {
    grade.verdict()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_boundaries() {
        let cases = [
            (100.0, Grade::A1),
            (91.0, Grade::A1),
            (90.99, Grade::A2),
            (81.0, Grade::A2),
            (71.0, Grade::B1),
            (61.0, Grade::B2),
            (51.0, Grade::C1),
            (41.0, Grade::C2),
            (31.0, Grade::D),
            (21.0, Grade::E1),
            (20.99, Grade::E2),
            (0.0, Grade::E2),
            (-4.0, Grade::E2),
            (200.0, Grade::A1),
        ];
        for (total, expected) in cases {
            assert_eq!(Grade::from_total(total), expected, "total {total}");
        }
    }

    #[test]
    fn nan_falls_to_lowest_grade() {
        assert_eq!(Grade::from_total(f64::NAN), Grade::E2);
    }

    #[test]
    fn ladder_is_monotonic() {
        let mut previous = Grade::from_total(-10.0);
        let mut t = -10.0;
        while t <= 210.0 {
            let current = Grade::from_total(t);
            // Better grades sort first.
            assert!(current <= previous, "grade got worse at {t}");
            previous = current;
            t += 0.25;
        }
    }

    #[test]
    fn labels_are_verbatim() {
        assert_eq!(Grade::A1.label(), "अ १");
        assert_eq!(Grade::D.label(), "ड");
        assert_eq!(Grade::E2.label(), "इ २");
    }

    #[test]
    fn lowest_two_grades_share_a_description() {
        assert_eq!(Grade::E1.description(), Grade::E2.description());
        assert_eq!(Grade::E1.description(), "सुधारणा आवश्यक");
        assert_eq!(Grade::A1.description(), "अप्रतिम");
    }

    #[test]
    fn only_lowest_grade_fails() {
        for grade in Grade::ALL {
            let expected = if grade == Grade::E2 {
                Verdict::Fail
            } else {
                Verdict::Pass
            };
            assert_eq!(pass_or_fail(grade), expected);
        }
        assert_eq!(Verdict::Fail.label(), "नापास");
    }
}
