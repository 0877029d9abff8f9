//! Error types for the livability engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can surface to a caller. Gaps in reference
//! data coverage are not errors: the lookup chain absorbs them and records
//! which fallback answered.

use thiserror::Error;

/// The main error type for the livability engine.
///
/// # Example
///
/// ```
/// use livability_engine::error::EngineError;
///
/// let error = EngineError::UnknownGrade {
///     code: "X99".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown pay grade: X99");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A dataset file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The dataset manifest could not be parsed or contained invalid values.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A row in a reference table could not be parsed.
    #[error("Failed to parse '{path}' at line {line}: {message}")]
    TableParseError {
        /// The path to the table file.
        path: String,
        /// The 1-based line number of the offending row.
        line: u64,
        /// A description of the parse error.
        message: String,
    },

    /// The pay grade is not one of the fixed enumerated grades.
    #[error("Unknown pay grade: {code}")]
    UnknownGrade {
        /// The grade code that was not recognised.
        code: String,
    },

    /// The dependent status is neither "W" nor "WO".
    #[error("Unknown dependent status: {code}")]
    UnknownDependentStatus {
        /// The status code that was not recognised.
        code: String,
    },

    /// A ZIP code was not a 5-digit identifier.
    #[error("Invalid ZIP code: {value}")]
    InvalidZipCode {
        /// The rejected value.
        value: String,
    },

    /// A county FIPS code could not be normalised to 5 digits.
    #[error("Invalid county FIPS code: {value}")]
    InvalidCountyCode {
        /// The rejected value.
        value: String,
    },

    /// A bedroom count outside 1-4 was supplied.
    #[error("Invalid bedroom standard: {value} (expected 1-4)")]
    InvalidBedroomStandard {
        /// The rejected bedroom count.
        value: u8,
    },

    /// A livability weight was outside the 0-10 range.
    #[error("Invalid weight '{name}': {value} (expected 0-10)")]
    InvalidWeight {
        /// The weight that was rejected.
        name: String,
        /// The rejected value.
        value: u8,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/dataset.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/dataset.yaml"
        );
    }

    #[test]
    fn test_table_parse_error_displays_path_line_and_message() {
        let error = EngineError::TableParseError {
            path: "data/safmr_zip.csv".to_string(),
            line: 7,
            message: "invalid rent 'abc'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse 'data/safmr_zip.csv' at line 7: invalid rent 'abc'"
        );
    }

    #[test]
    fn test_unknown_dependent_status_displays_code() {
        let error = EngineError::UnknownDependentStatus {
            code: "MAYBE".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown dependent status: MAYBE");
    }

    #[test]
    fn test_invalid_bedroom_standard_displays_value() {
        let error = EngineError::InvalidBedroomStandard { value: 5 };
        assert_eq!(
            error.to_string(),
            "Invalid bedroom standard: 5 (expected 1-4)"
        );
    }

    #[test]
    fn test_invalid_weight_displays_name_and_value() {
        let error = EngineError::InvalidWeight {
            name: "crime".to_string(),
            value: 11,
        };
        assert_eq!(error.to_string(), "Invalid weight 'crime': 11 (expected 0-10)");
    }

    #[test]
    fn test_engine_result_type_alias() {
        fn returns_ok() -> EngineResult<u32> {
            Ok(42)
        }

        fn returns_err() -> EngineResult<u32> {
            Err(EngineError::InvalidZipCode {
                value: "abc".to_string(),
            })
        }

        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }
}
