//! Exact-decimal test score scalar.
//!
//! # Responsibility
//! - Represent earned scores without binary floating-point approximation.
//! - Provide the parse/render boundary used by presentation callers.
//!
//! # Invariants
//! - Values are fixed-point with exactly two fraction digits (hundredths).
//! - Equal values always render to the same canonical text.
//! - Parsing never rounds; inputs finer than the scale are rejected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Exact test score with a fixed scale of two decimal digits.
///
/// Stored and compared as integer hundredths, so range comparisons with
/// inclusive bounds are exact integer comparisons. This is also the shape
/// the backing `INTEGER` column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    hundredths: i64,
}

impl Score {
    /// Number of fraction digits carried by every score.
    pub const SCALE: u32 = 2;

    /// Builds a score from integer hundredths of a point.
    pub fn from_hundredths(hundredths: i64) -> Self {
        Self { hundredths }
    }

    /// Returns the score as integer hundredths of a point.
    pub fn hundredths(self) -> i64 {
        self.hundredths
    }
}

/// Parse failure for decimal score text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseScoreError {
    /// Input was empty or whitespace only.
    Empty,
    /// Input contains non-digit characters or a dangling decimal point.
    Malformed,
    /// Input carries more fraction digits than the supported scale.
    TooManyFractionDigits { digits: usize },
    /// Input does not fit the representable range.
    OutOfRange,
}

impl Display for ParseScoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "score text is empty"),
            Self::Malformed => write!(f, "score text is not a decimal number"),
            Self::TooManyFractionDigits { digits } => write!(
                f,
                "score has {digits} fraction digits; at most {} are supported",
                Score::SCALE
            ),
            Self::OutOfRange => write!(f, "score is outside the representable range"),
        }
    }
}

impl Error for ParseScoreError {}

impl FromStr for Score {
    type Err = ParseScoreError;

    /// Parses decimal text such as `88`, `88.5`, `88.50`, `.5` or `-3.25`.
    ///
    /// # Contract
    /// - At most [`Score::SCALE`] fraction digits; finer input is rejected,
    ///   never rounded.
    /// - A decimal point without fraction digits (`"88."`) is rejected.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseScoreError::Empty);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseScoreError::Malformed);
        }
        if unsigned.contains('.') && fraction.is_empty() {
            return Err(ParseScoreError::Malformed);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseScoreError::Malformed);
        }
        if fraction.len() > Score::SCALE as usize {
            return Err(ParseScoreError::TooManyFractionDigits {
                digits: fraction.len(),
            });
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseScoreError::OutOfRange)?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            // One digit means tenths; scale up to hundredths.
            1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
            _ => fraction.parse().map_err(|_| ParseScoreError::OutOfRange)?,
        };

        let magnitude = whole_value
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or(ParseScoreError::OutOfRange)?;

        Ok(Self {
            hundredths: if negative { -magnitude } else { magnitude },
        })
    }
}

impl Display for Score {
    /// Renders the canonical minimal form: `90`, `88.5`, `88.25`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.hundredths < 0 { "-" } else { "" };
        let magnitude = self.hundredths.unsigned_abs();
        let units = magnitude / 100;
        let cents = magnitude % 100;
        if cents == 0 {
            write!(f, "{sign}{units}")
        } else if cents % 10 == 0 {
            write!(f, "{sign}{units}.{}", cents / 10)
        } else {
            write!(f, "{sign}{units}.{cents:02}")
        }
    }
}

impl Serialize for Score {
    /// Serialized as the canonical decimal string to keep wire values exact.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
