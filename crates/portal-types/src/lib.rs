//! Validated primitive types shared across the Carelink portal crates.
//!
//! These wrappers enforce their invariants at construction time and on the
//! wire, so downstream code never has to re-check them.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating validated percentage types.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// The rate was above 100 percent
    #[error("Adherence rate must be between 0 and 100, got {0}")]
    OutOfRange(u16),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// An integer percentage guaranteed to lie in `0..=100`.
///
/// Used for patient adherence rates. Construction rejects values above 100,
/// so arithmetic over collections of rates never has to guard the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AdherenceRate(u8);

impl AdherenceRate {
    /// A full 100% rate, the default for newly enrolled patients.
    pub const FULL: AdherenceRate = AdherenceRate(100);

    /// Creates a new `AdherenceRate` from an integer percentage.
    ///
    /// # Returns
    ///
    /// Returns `Ok(AdherenceRate)` for values in `0..=100`,
    /// or `Err(RateError::OutOfRange)` otherwise.
    pub fn new(percent: u16) -> Result<Self, RateError> {
        if percent > 100 {
            return Err(RateError::OutOfRange(percent));
        }
        Ok(Self(percent as u8))
    }

    /// Returns the rate as an integer percentage.
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for AdherenceRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl serde::Serialize for AdherenceRate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for AdherenceRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u16::deserialize(deserializer)?;
        AdherenceRate::new(value).map_err(serde::de::Error::custom)
    }
}
