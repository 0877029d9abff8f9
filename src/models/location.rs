//! Geographic key types: ZIP codes, county FIPS codes and Military Housing Areas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A 5-digit ZIP code, the join key across all reference tables.
///
/// Inputs with fewer than five digits are left-padded with zeros, since
/// spreadsheet exports routinely strip them (`2134` is `02134`).
///
/// # Example
///
/// ```
/// use livability_engine::models::ZipCode;
///
/// let zip = ZipCode::new("2134").unwrap();
/// assert_eq!(zip.as_str(), "02134");
/// assert!(ZipCode::new("ABCDE").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    /// Parses and normalises a ZIP code.
    pub fn new(raw: &str) -> EngineResult<Self> {
        let digits = raw.trim();
        if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::InvalidZipCode {
                value: raw.to_string(),
            });
        }
        Ok(Self(format!("{:0>5}", digits)))
    }

    /// Returns the normalised 5-digit code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZipCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

/// A 5-digit county FIPS code (2-digit state + 3-digit county).
///
/// HUD publishes county rents under 10-digit area codes whose first five
/// digits are the county FIPS code; those are truncated. Leading zeros lost
/// in spreadsheet exports are restored before truncating.
///
/// # Example
///
/// ```
/// use livability_engine::models::CountyFips;
///
/// assert_eq!(CountyFips::new("5101399999").unwrap().as_str(), "51013");
/// assert_eq!(CountyFips::new("100199999").unwrap().as_str(), "01001");
/// assert_eq!(CountyFips::new("1001").unwrap().as_str(), "01001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountyFips(String);

impl CountyFips {
    /// Parses a county or HUD area code into a 5-digit county FIPS code.
    pub fn new(raw: &str) -> EngineResult<Self> {
        let digits = raw.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::InvalidCountyCode {
                value: raw.to_string(),
            });
        }

        let code = match digits.len() {
            1..=5 => format!("{:0>5}", digits),
            6..=10 => format!("{:0>10}", digits)[..5].to_string(),
            _ => {
                return Err(EngineError::InvalidCountyCode {
                    value: raw.to_string(),
                });
            }
        };
        Ok(Self(code))
    }

    /// Returns the 5-digit code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountyFips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CountyFips {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountyFips> for String {
    fn from(fips: CountyFips) -> Self {
        fips.0
    }
}

/// A Military Housing Area code (e.g. `DC053`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MhaCode(String);

impl MhaCode {
    /// Creates an MHA code, trimming and upper-casing the input.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Returns the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MhaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MhaCode {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<MhaCode> for String {
    fn from(mha: MhaCode) -> Self {
        mha.0
    }
}
