//! Pay grade model.
//!
//! Grades are a closed set of 27 codes matching the column order of the
//! yearly BAH rate files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A uniformed-services pay grade.
///
/// Canonical codes follow the BAH reference files (`EO1`, `WO3`, `O01E`,
/// `O04`, `O010`). [`FromStr`] also accepts the usual `E-5`, `E05`, `O4`
/// and `O10` spellings.
///
/// # Example
///
/// ```
/// use livability_engine::models::Grade;
///
/// let grade: Grade = "O-4".parse().unwrap();
/// assert_eq!(grade, Grade::O4);
/// assert_eq!(grade.code(), "O04");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Grade {
    /// Enlisted E-1.
    E1,
    /// Enlisted E-2.
    E2,
    /// Enlisted E-3.
    E3,
    /// Enlisted E-4.
    E4,
    /// Enlisted E-5.
    E5,
    /// Enlisted E-6.
    E6,
    /// Enlisted E-7.
    E7,
    /// Enlisted E-8.
    E8,
    /// Enlisted E-9.
    E9,
    /// Warrant officer W-1.
    W1,
    /// Warrant officer W-2.
    W2,
    /// Warrant officer W-3.
    W3,
    /// Warrant officer W-4.
    W4,
    /// Warrant officer W-5.
    W5,
    /// Officer O-1 with over four years of prior enlisted service.
    O1E,
    /// Officer O-2 with over four years of prior enlisted service.
    O2E,
    /// Officer O-3 with over four years of prior enlisted service.
    O3E,
    /// Officer O-1.
    O1,
    /// Officer O-2.
    O2,
    /// Officer O-3.
    O3,
    /// Officer O-4.
    O4,
    /// Officer O-5.
    O5,
    /// Officer O-6.
    O6,
    /// Officer O-7.
    O7,
    /// Officer O-8.
    O8,
    /// Officer O-9.
    O9,
    /// Officer O-10.
    O10,
}

const ENLISTED: [Grade; 9] = [
    Grade::E1,
    Grade::E2,
    Grade::E3,
    Grade::E4,
    Grade::E5,
    Grade::E6,
    Grade::E7,
    Grade::E8,
    Grade::E9,
];

const WARRANT: [Grade; 5] = [Grade::W1, Grade::W2, Grade::W3, Grade::W4, Grade::W5];

const PRIOR_ENLISTED_OFFICER: [Grade; 3] = [Grade::O1E, Grade::O2E, Grade::O3E];

const OFFICER: [Grade; 10] = [
    Grade::O1,
    Grade::O2,
    Grade::O3,
    Grade::O4,
    Grade::O5,
    Grade::O6,
    Grade::O7,
    Grade::O8,
    Grade::O9,
    Grade::O10,
];

impl Grade {
    /// All grades, in the column order used by the BAH rate files.
    pub const ALL: [Grade; 27] = [
        Grade::E1,
        Grade::E2,
        Grade::E3,
        Grade::E4,
        Grade::E5,
        Grade::E6,
        Grade::E7,
        Grade::E8,
        Grade::E9,
        Grade::W1,
        Grade::W2,
        Grade::W3,
        Grade::W4,
        Grade::W5,
        Grade::O1E,
        Grade::O2E,
        Grade::O3E,
        Grade::O1,
        Grade::O2,
        Grade::O3,
        Grade::O4,
        Grade::O5,
        Grade::O6,
        Grade::O7,
        Grade::O8,
        Grade::O9,
        Grade::O10,
    ];

    /// Returns the canonical reference-file code for this grade.
    pub fn code(self) -> &'static str {
        match self {
            Grade::E1 => "EO1",
            Grade::E2 => "EO2",
            Grade::E3 => "EO3",
            Grade::E4 => "EO4",
            Grade::E5 => "EO5",
            Grade::E6 => "EO6",
            Grade::E7 => "EO7",
            Grade::E8 => "EO8",
            Grade::E9 => "EO9",
            Grade::W1 => "WO1",
            Grade::W2 => "WO2",
            Grade::W3 => "WO3",
            Grade::W4 => "WO4",
            Grade::W5 => "WO5",
            Grade::O1E => "O01E",
            Grade::O2E => "O02E",
            Grade::O3E => "O03E",
            Grade::O1 => "O01",
            Grade::O2 => "O02",
            Grade::O3 => "O03",
            Grade::O4 => "O04",
            Grade::O5 => "O05",
            Grade::O6 => "O06",
            Grade::O7 => "O07",
            Grade::O8 => "O08",
            Grade::O9 => "O09",
            Grade::O10 => "O010",
        }
    }

    /// Returns the position of this grade's column in a BAH rate row.
    pub fn column_index(self) -> usize {
        // Variant order matches `ALL`.
        self as usize
    }

    fn from_alias(code: &str) -> Option<Grade> {
        let mut chars = code.chars();
        let pay_plan = chars.next()?;
        let rest = chars.as_str();
        let (digits, prior_enlisted) = match rest.strip_suffix('E') {
            Some(digits) => (digits, true),
            None => (rest, false),
        };
        let number: usize = digits.trim_start_matches(['O', '0']).parse().ok()?;
        if number == 0 {
            return None;
        }

        match (pay_plan, prior_enlisted) {
            ('E', false) => ENLISTED.get(number - 1).copied(),
            ('W', false) => WARRANT.get(number - 1).copied(),
            ('O', true) => PRIOR_ENLISTED_OFFICER.get(number - 1).copied(),
            ('O', false) => OFFICER.get(number - 1).copied(),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Grade {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        Self::ALL
            .iter()
            .copied()
            .find(|g| g.code() == code)
            .or_else(|| Self::from_alias(&code))
            .ok_or_else(|| EngineError::UnknownGrade {
                code: s.to_string(),
            })
    }
}

impl TryFrom<String> for Grade {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for &'static str {
    fn from(grade: Grade) -> Self {
        grade.code()
    }
}
