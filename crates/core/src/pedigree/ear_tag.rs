use std::fmt;
use std::str::FromStr;

use crate::error::{PedigreeError, Result};

/// Length of each ear tag half.
const HALF_LEN: usize = 4;

/// A breeder-assigned ear tag, written `RRRR-LLLL`.
///
/// The first half is tattooed in the right ear, the second in the left.
/// Both halves are exactly four ASCII alphanumeric characters and are
/// normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EarTag {
    right: String,
    left: String,
}

impl EarTag {
    /// Parse an ear tag such as `"4977-2041"`.
    ///
    /// # Errors
    /// Returns [`PedigreeError::InvalidEarTag`] if the tag does not have two
    /// hyphen-joined halves of four alphanumeric characters each.
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        let invalid = |reason: &str| PedigreeError::InvalidEarTag {
            tag: tag.to_string(),
            reason: reason.to_string(),
        };

        let (right, left) = trimmed
            .split_once('-')
            .ok_or_else(|| invalid("expected two halves separated by '-'"))?;

        for half in [right, left] {
            if half.len() != HALF_LEN {
                return Err(invalid("each half must be exactly 4 characters"));
            }
            if !half.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("halves may only contain letters and digits"));
            }
        }

        Ok(Self {
            right: right.to_ascii_uppercase(),
            left: left.to_ascii_uppercase(),
        })
    }

    /// The right-ear half.
    pub fn right(&self) -> &str {
        &self.right
    }

    /// The left-ear half.
    pub fn left(&self) -> &str {
        &self.left
    }
}

impl fmt::Display for EarTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.right, self.left)
    }
}

impl FromStr for EarTag {
    type Err = PedigreeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for EarTag {
    type Error = PedigreeError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
