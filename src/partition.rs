//! Date-valued partition keys.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use datafusion::common::ScalarValue;
use serde::{Deserialize, Serialize};

/// Days from 0001-01-01 (CE) to 1970-01-01.
const EPOCH_CE_DAYS: i32 = 719_163;

/// An ordered partition key: the calendar day a source row belongs to.
///
/// Serialized as `YYYY-MM-DD` everywhere it crosses a boundary: the
/// watermark file, CLI arguments, and log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(NaiveDate);

impl PartitionKey {
    pub fn new(date: NaiveDate) -> Self { Self(date) }

    /// The minimum sentinel key. Every real partition sorts after it, so a
    /// job starting from this key processes the entire source history.
    pub fn beginning() -> Self {
        Self(NaiveDate::from_num_days_from_ce_opt(EPOCH_CE_DAYS).expect("epoch is a valid date"))
    }

    pub fn date(&self) -> NaiveDate { self.0 }

    /// The next calendar day.
    pub fn succ(&self) -> Self { Self(self.0.succ_opt().expect("date overflow")) }

    /// Days since the unix epoch, the engine's `Date32` representation.
    pub fn days_since_epoch(&self) -> i32 { self.0.num_days_from_ce() - EPOCH_CE_DAYS }

    /// Bind this key as a query parameter.
    pub fn to_scalar(&self) -> ScalarValue { ScalarValue::Date32(Some(self.days_since_epoch())) }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for PartitionKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}
