//! Reading and labelling period dates.
//!
//! Dates are parsed exactly as stored: surrounding whitespace makes a value
//! malformed, the same as any other mismatch with the format.

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::TransformError;

/// Format of `end_date` as written by the ingestion job.
pub const DEFAULT_PARSE_FORMAT: &str = "%m/%d/%y-%H:%M:%S";

/// Format of the x-axis labels.
pub const DEFAULT_DISPLAY_FORMAT: &str = "%m/%d/%y";

/// The pair of strftime formats used to read and label periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    parse: String,
    display: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            parse: DEFAULT_PARSE_FORMAT.to_string(),
            display: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

impl DateFormats {
    /// Returns `None` if either format contains an invalid specifier.
    pub fn new(parse: impl Into<String>, display: impl Into<String>) -> Option<Self> {
        let parse = parse.into();
        let display = display.into();
        if !is_valid_format(&parse) || !is_valid_format(&display) {
            return None;
        }
        Some(Self { parse, display })
    }

    pub fn parse_format(&self) -> &str {
        &self.parse
    }

    pub fn display_format(&self) -> &str {
        &self.display
    }

    /// Parse a full `end_date` (`MM/DD/YY-HH:MM:SS` by default).
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime, TransformError> {
        let malformed = || TransformError::MalformedDate {
            value: text.to_string(),
            format: self.parse.clone(),
        };
        if is_padded(text) {
            return Err(malformed());
        }
        NaiveDateTime::parse_from_str(text, &self.parse).map_err(|_| malformed())
    }

    /// Parse a date-only value in the display format, read as midnight.
    pub fn parse_day(&self, text: &str) -> Result<NaiveDateTime, TransformError> {
        let malformed = || TransformError::MalformedDate {
            value: text.to_string(),
            format: self.display.clone(),
        };
        if is_padded(text) {
            return Err(malformed());
        }
        NaiveDate::parse_from_str(text, &self.display)
            .map(|d| d.and_time(NaiveTime::MIN))
            .map_err(|_| malformed())
    }

    /// Parse either a full `end_date` or a date-only one.
    ///
    /// The service-unit and storage collections store bare dates.
    pub fn parse_end_date(&self, text: &str) -> Result<NaiveDateTime, TransformError> {
        self.parse(text).or_else(|full_err| self.parse_day(text).map_err(|_| full_err))
    }

    /// Parse a cutoff date given in the display format.
    pub fn parse_cutoff(&self, text: &str) -> Result<NaiveDate, TransformError> {
        self.parse_day(text).map(|dt| dt.date())
    }

    /// Render an x-axis label (`MM/DD/YY` by default).
    pub fn format(&self, date: &NaiveDateTime) -> String {
        date.format(&self.display).to_string()
    }

    /// Render a full `end_date` in the parse format.
    pub fn format_full(&self, date: &NaiveDateTime) -> String {
        date.format(&self.parse).to_string()
    }
}

// chrono skips whitespace before numeric fields.
fn is_padded(text: &str) -> bool {
    text.trim() != text
}

fn is_valid_format(format: &str) -> bool {
    !format.is_empty() && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}
