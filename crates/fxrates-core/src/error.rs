use thiserror::Error;
use time::Date;

/// Which date parameter a failure refers to; selects the `cause` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Only,
    Start,
    End,
}

impl DateField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Only => "Date",
            Self::Start => "Start date",
            Self::End => "End date",
        }
    }
}

/// Date-parameter errors exposed by `fxrates-core`.
///
/// Display output is the HTTP `cause` string verbatim; handlers must not
/// rewrap or rephrase it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format.")]
    InvalidFormat,
    #[error("{} out of the date range.", .field.label())]
    OutOfRange { field: DateField },
    #[error("End date before start date.")]
    InvertedRange,
}

/// Rejects bounds whose minimum lies after the maximum.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("date bounds are inverted: min {min} is after max {max}")]
pub struct InvertedBounds {
    pub min: Date,
    pub max: Date,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_strings_are_verbatim() {
        assert_eq!(DateError::InvalidFormat.to_string(), "Invalid date format.");
        assert_eq!(
            DateError::OutOfRange {
                field: DateField::Only
            }
            .to_string(),
            "Date out of the date range."
        );
        assert_eq!(
            DateError::OutOfRange {
                field: DateField::Start
            }
            .to_string(),
            "Start date out of the date range."
        );
        assert_eq!(
            DateError::OutOfRange {
                field: DateField::End
            }
            .to_string(),
            "End date out of the date range."
        );
        assert_eq!(
            DateError::InvertedRange.to_string(),
            "End date before start date."
        );
    }
}
