//! Bedroom standard model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The number of bedrooms a member is entitled to house, 1 through 4.
///
/// Used as a direct index into rent tables; there is no nearest-match.
/// Serialized as its bedroom count.
///
/// # Example
///
/// ```
/// use livability_engine::models::BedroomStandard;
///
/// let standard = BedroomStandard::try_from(3).unwrap();
/// assert_eq!(standard, BedroomStandard::Three);
/// assert_eq!(standard.count(), 3);
/// assert!(BedroomStandard::try_from(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BedroomStandard {
    /// One bedroom.
    One,
    /// Two bedrooms.
    Two,
    /// Three bedrooms.
    Three,
    /// Four bedrooms.
    Four,
}

impl BedroomStandard {
    /// All bedroom standards in ascending order.
    pub const ALL: [BedroomStandard; 4] = [
        BedroomStandard::One,
        BedroomStandard::Two,
        BedroomStandard::Three,
        BedroomStandard::Four,
    ];

    /// Returns the bedroom count.
    pub fn count(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Returns the zero-based index used by rent schedules.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BedroomStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}BR", self.count())
    }
}

impl TryFrom<u8> for BedroomStandard {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BedroomStandard::One),
            2 => Ok(BedroomStandard::Two),
            3 => Ok(BedroomStandard::Three),
            4 => Ok(BedroomStandard::Four),
            _ => Err(EngineError::InvalidBedroomStandard { value }),
        }
    }
}

impl From<BedroomStandard> for u8 {
    fn from(standard: BedroomStandard) -> Self {
        standard.count()
    }
}
