//! Date parsing, bounds checks, and range normalization.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::error::{DateError, DateField, InvertedBounds};

/// Canonical textual pattern for every date path parameter (`YYYY-MM-DD`).
///
/// One format for the whole service; routes never vary it.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Inclusive historical window a validated date must fall inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    min: Date,
    max: Date,
}

impl DateBounds {
    pub fn new(min: Date, max: Date) -> Result<Self, InvertedBounds> {
        if min > max {
            return Err(InvertedBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub const fn min(self) -> Date {
        self.min
    }

    pub const fn max(self) -> Date {
        self.max
    }
}

/// Parse a single date parameter and check it against `bounds`.
///
/// Pure: the outcome depends only on `raw` and `bounds`.
pub fn validate(raw: &str, bounds: DateBounds) -> Result<Date, DateError> {
    validate_field(raw, bounds, DateField::Only)
}

/// Validate both endpoints of a date span and reject inverted ranges.
///
/// The first failing endpoint wins and is labelled (`Start date` / `End date`).
/// On success the pair is returned as supplied; nothing is clamped or
/// reordered.
pub fn normalize_range(
    start_raw: &str,
    end_raw: &str,
    bounds: DateBounds,
) -> Result<(Date, Date), DateError> {
    let start = validate_field(start_raw, bounds, DateField::Start)?;
    let end = validate_field(end_raw, bounds, DateField::End)?;
    if end < start {
        return Err(DateError::InvertedRange);
    }
    Ok((start, end))
}

fn validate_field(raw: &str, bounds: DateBounds, field: DateField) -> Result<Date, DateError> {
    let parsed = Date::parse(raw, DATE_FORMAT).map_err(|_| DateError::InvalidFormat)?;
    if parsed > bounds.max() || parsed < bounds.min() {
        return Err(DateError::OutOfRange { field });
    }
    Ok(parsed)
}
