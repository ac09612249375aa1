//! Output periods and the selection of input timesteps that fall inside them.
//!
//! A [`Timespan`] is a start instant, a [`Period`] length and a period count.
//! Period `i` covers the half-open interval `[start + i*period, start + (i+1)*period)`.
//! Boundaries are always computed from `start` rather than by repeated addition,
//! so calendar months clamped at a month end (Jan 31 + 1 month) do not drift.

use crate::errors::{GrowthMapError, GrowthMapResult};
use chrono::{Months, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Instant of an input snapshot or a period boundary.
pub type Timestamp = NaiveDateTime;

/// The length of one output period.
///
/// Serialised as a string such as `"1 month"`, `"16 days"` or `"3 hours"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    /// Calendar months
    Months(u32),
    Days(u32),
    Hours(u32),
    Seconds(u32),
}

impl Period {
    pub fn is_zero(&self) -> bool {
        match *self {
            Period::Months(n) | Period::Days(n) | Period::Hours(n) | Period::Seconds(n) => n == 0,
        }
    }

    /// Length in seconds for the fixed-length variants.
    fn fixed_seconds(&self) -> Option<i64> {
        match *self {
            Period::Months(_) => None,
            Period::Days(n) => Some(i64::from(n) * 86_400),
            Period::Hours(n) => Some(i64::from(n) * 3_600),
            Period::Seconds(n) => Some(i64::from(n)),
        }
    }

    /// `start + times * self`, or `None` if the result is not representable.
    pub fn advance(&self, start: Timestamp, times: u32) -> Option<Timestamp> {
        match (self, self.fixed_seconds()) {
            (Period::Months(n), _) => start.checked_add_months(Months::new(n.checked_mul(times)?)),
            (_, Some(seconds)) => {
                let delta = TimeDelta::try_seconds(seconds.checked_mul(i64::from(times))?)?;
                start.checked_add_signed(delta)
            }
            (_, None) => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n, unit) = match *self {
            Period::Months(n) => (n, "month"),
            Period::Days(n) => (n, "day"),
            Period::Hours(n) => (n, "hour"),
            Period::Seconds(n) => (n, "second"),
        };
        if n == 1 {
            write!(f, "{n} {unit}")
        } else {
            write!(f, "{n} {unit}s")
        }
    }
}

impl FromStr for Period {
    type Err = GrowthMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GrowthMapError::InvalidTimespan(format!("cannot parse period '{s}'"));

        let mut parts = s.split_whitespace();
        let (count, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(count), Some(unit), None) => (count, unit),
            _ => return Err(invalid()),
        };
        let n: u32 = count.parse().map_err(|_| invalid())?;

        match unit.to_ascii_lowercase().trim_end_matches('s') {
            "month" | "mon" => Ok(Period::Months(n)),
            "day" | "d" => Ok(Period::Days(n)),
            "hour" | "hr" | "h" => Ok(Period::Hours(n)),
            "second" | "sec" => Ok(Period::Seconds(n)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = GrowthMapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Serialised form of a [`Timespan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimespanDefinition {
    pub start: Timestamp,
    pub period: Period,
    pub count: usize,
}

/// An evenly spaced sequence of output periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimespanDefinition", into = "TimespanDefinition")]
pub struct Timespan {
    period: Period,
    /// `count + 1` boundaries; period `i` is `[boundaries[i], boundaries[i + 1])`
    boundaries: Vec<Timestamp>,
}

impl Timespan {
    /// Create a timespan of `count` periods beginning at `start`.
    ///
    /// Fails if `count` is zero, the period has zero length, or the end of the
    /// span cannot be represented.
    pub fn new(start: Timestamp, period: Period, count: usize) -> GrowthMapResult<Self> {
        if count == 0 {
            return Err(GrowthMapError::InvalidTimespan(
                "a timespan needs at least one period".to_string(),
            ));
        }
        if period.is_zero() {
            return Err(GrowthMapError::InvalidTimespan(format!(
                "period must have a positive length, got '{period}'"
            )));
        }

        let boundaries = (0..=count)
            .map(|i| {
                u32::try_from(i)
                    .ok()
                    .and_then(|i| period.advance(start, i))
                    .ok_or_else(|| {
                        GrowthMapError::InvalidTimespan(format!(
                            "boundary {i} of {count} x '{period}' from {start} is out of range"
                        ))
                    })
            })
            .collect::<GrowthMapResult<Vec<_>>>()?;

        Ok(Self { period, boundaries })
    }

    pub fn start(&self) -> Timestamp {
        self.boundaries[0]
    }

    /// The exclusive end of the last period.
    pub fn end(&self) -> Timestamp {
        self.boundaries[self.boundaries.len() - 1]
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Number of output periods.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Always false; a timespan is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Half-open bounds `[start, end)` of period `index`.
    pub fn bounds(&self, index: usize) -> Option<(Timestamp, Timestamp)> {
        let start = *self.boundaries.get(index)?;
        let end = *self.boundaries.get(index + 1)?;
        Some((start, end))
    }

    /// Period start instants, used as the time index of the output.
    pub fn starts(&self) -> &[Timestamp] {
        &self.boundaries[..self.len()]
    }

    /// Iterates over `(index, start, end)` for every period in order.
    pub fn periods(&self) -> impl Iterator<Item = (usize, Timestamp, Timestamp)> + '_ {
        self.boundaries
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i, w[0], w[1]))
    }
}

impl TryFrom<TimespanDefinition> for Timespan {
    type Error = GrowthMapError;

    fn try_from(value: TimespanDefinition) -> Result<Self, Self::Error> {
        Timespan::new(value.start, value.period, value.count)
    }
}

impl From<Timespan> for TimespanDefinition {
    fn from(value: Timespan) -> Self {
        TimespanDefinition {
            start: value.start(),
            period: value.period,
            count: value.len(),
        }
    }
}

/// Index range of the sorted `timestamps` satisfying `start <= t < end`.
///
/// Input spacing may be irregular. A timestamp equal to `end` is left for the
/// following window.
pub fn window_indices(start: Timestamp, end: Timestamp, timestamps: &[Timestamp]) -> Range<usize> {
    let lo = timestamps.partition_point(|t| *t < start);
    let hi = timestamps.partition_point(|t| *t < end).max(lo);
    lo..hi
}

/// The ordered sub-sequence of the sorted `timestamps` inside `[start, end)`.
pub fn select_window(start: Timestamp, end: Timestamp, timestamps: &[Timestamp]) -> &[Timestamp] {
    &timestamps[window_indices(start, end, timestamps)]
}
