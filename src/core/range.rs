//! Purchase-date range validation
//!
//! Range queries take two raw `YYYY-MM-DD` parameters. Validation runs in two
//! passes:
//!
//! 1. Each parameter on its own: present, a real date, inside
//!    `[1900-01-01, today]`. Every violation is collected.
//! 2. Only when both parameters passed: `to` is not before `from`, and the
//!    span is at most [`MAX_RANGE_DAYS`] days.

use crate::io::fixed_width::buy_date_min;
use crate::types::{BuyDateRange, OrderError, RangeParam, RangeParamError};
use chrono::{NaiveDate, Utc};

/// Widest accepted span between `from` and `to`, in days
pub const MAX_RANGE_DAYS: i64 = 31;

/// Validates range parameters against a fixed date window
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator {
    min: NaiveDate,
    max: NaiveDate,
}

impl RangeValidator {
    /// Create a validator accepting dates up to `max`
    pub fn new(max: NaiveDate) -> Self {
        Self {
            min: buy_date_min(),
            max,
        }
    }

    /// Create a validator whose window ends today (UTC)
    pub fn for_today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// Validate raw `from`/`to` parameters
    ///
    /// # Errors
    ///
    /// `OrderError::RangeParam` listing every violated rule of the failing pass.
    pub fn validate(&self, from: &str, to: &str) -> Result<BuyDateRange, OrderError> {
        let mut errors = Vec::new();
        let from = self.check_param(RangeParam::From, from, &mut errors);
        let to = self.check_param(RangeParam::To, to, &mut errors);

        let (Some(from), Some(to)) = (from, to) else {
            return Err(OrderError::RangeParam { errors });
        };

        let span = (to - from).num_days();
        if span < 0 {
            errors.push(RangeParamError::ToBeforeFrom);
        } else if span > MAX_RANGE_DAYS {
            errors.push(RangeParamError::TooWide {
                max_days: MAX_RANGE_DAYS,
            });
        }

        if errors.is_empty() {
            Ok(BuyDateRange { from, to })
        } else {
            Err(OrderError::RangeParam { errors })
        }
    }

    fn check_param(
        &self,
        param: RangeParam,
        raw: &str,
        errors: &mut Vec<RangeParamError>,
    ) -> Option<NaiveDate> {
        if raw.is_empty() {
            errors.push(RangeParamError::Empty { param });
            return None;
        }

        let Some(date) = parse_iso_date(raw) else {
            errors.push(RangeParamError::Invalid { param });
            return None;
        };

        if date < self.min || date > self.max {
            errors.push(RangeParamError::Between {
                param,
                min: self.min,
                max: self.max,
            });
            return None;
        }

        Some(date)
    }
}

impl Default for RangeValidator {
    fn default() -> Self {
        Self::for_today()
    }
}

/// Parse a strict `YYYY-MM-DD` date (two-digit month and day)
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }

    let year = raw[0..4].parse().ok()?;
    let month = raw[5..7].parse().ok()?;
    let day = raw[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
