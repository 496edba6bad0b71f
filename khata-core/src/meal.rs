use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three daily meal slots a schedule can cover.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "BREAKFAST",
            MealSlot::Lunch => "LUNCH",
            MealSlot::Dinner => "DINNER",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BREAKFAST" => Ok(MealSlot::Breakfast),
            "LUNCH" => Ok(MealSlot::Lunch),
            "DINNER" => Ok(MealSlot::Dinner),
            other => Err(format!("unknown meal slot: {other}")),
        }
    }
}

/// Whether a meal record counts toward billing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealStatus {
    Confirmed,
    Cancelled,
}

impl MealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MealStatus::Confirmed => "CONFIRMED",
            MealStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for MealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(MealStatus::Confirmed),
            "CANCELLED" => Ok(MealStatus::Cancelled),
            other => Err(format!("unknown meal status: {other}")),
        }
    }
}

/// Who last wrote a meal record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MarkedBy {
    #[serde(rename = "self")]
    Member,
    #[serde(rename = "admin")]
    Admin,
}

impl MarkedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkedBy::Member => "self",
            MarkedBy::Admin => "admin",
        }
    }
}

impl fmt::Display for MarkedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(MarkedBy::Member),
            "admin" => Ok(MarkedBy::Admin),
            other => Err(format!("unknown marker: {other}")),
        }
    }
}

/// Rejection raised when a raw decimal is not a valid meal count.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CountError {
    #[error("meal count {0} is negative")]
    Negative(Decimal),
    #[error("meal count {0} is not a multiple of 0.5")]
    NotHalfStep(Decimal),
}

/// A meal quantity: a non-negative multiple of 0.5.
///
/// Half units exist because shared kitchens bill guests and light eaters at
/// half portions. Construction validates; arithmetic on the raw value goes
/// through [`MealCount::get`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct MealCount(Decimal);

impl MealCount {
    pub const ZERO: MealCount = MealCount(Decimal::ZERO);
    pub const ONE: MealCount = MealCount(Decimal::ONE);

    pub fn new(value: Decimal) -> Result<Self, CountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CountError::Negative(value));
        }
        if !(value * Decimal::TWO).fract().is_zero() {
            return Err(CountError::NotHalfStep(value));
        }
        Ok(Self(value.normalize()))
    }

    pub fn get(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for MealCount {
    type Error = CountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MealCount> for Decimal {
    fn from(count: MealCount) -> Decimal {
        count.0
    }
}

impl fmt::Display for MealCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MealCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = Decimal::from_str(s).map_err(|err| err.to_string())?;
        Self::new(raw).map_err(|err| err.to_string())
    }
}
