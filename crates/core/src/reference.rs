//! Booking reference codes (`BBQ` + 6 zero-padded digits)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const PREFIX: &str = "BBQ";

/// Number of distinct references
pub const REFERENCE_SPACE: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingReference(u32);

impl BookingReference {
    /// Build a reference from any number; values wrap into the 6-digit space.
    pub fn from_number(n: u64) -> Self {
        Self((n % REFERENCE_SPACE as u64) as u32)
    }

    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:06}", PREFIX, self.0)
    }
}

impl FromStr for BookingReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| Error::InvalidReference(s.to_string()))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidReference(s.to_string()));
        }
        digits
            .parse()
            .map(Self)
            .map_err(|_| Error::InvalidReference(s.to_string()))
    }
}

impl TryFrom<String> for BookingReference {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BookingReference> for String {
    fn from(value: BookingReference) -> Self {
        value.to_string()
    }
}
