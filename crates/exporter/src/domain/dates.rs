//! Date tokens and the index pattern queried for them.

use std::fmt::Write;

use chrono::format::Item;
use chrono::format::StrftimeItems;
use chrono::DateTime;
use chrono::Utc;
use derive_more::Display;
use error_stack::Report;

pub const DEFAULT_DATE_PATTERN: &str = "%Y.%m.%d";

#[derive(Debug, Display)]
#[display("Invalid date pattern `{pattern}`: {reason}")]
pub struct DatePatternError {
    pattern: String,
    reason: &'static str,
}

impl core::error::Error for DatePatternError {}

/// A validated strftime pattern used to date-qualify index names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern(String);

impl DatePattern {
    /// # Errors
    ///
    /// Rejects patterns chrono cannot parse, patterns that fail to render a
    /// timestamp, and empty patterns.
    pub fn new(pattern: impl Into<String>) -> Result<Self, Report<DatePatternError>> {
        let pattern = pattern.into();
        let invalid = |reason| {
            Report::new(DatePatternError {
                pattern: pattern.clone(),
                reason,
            })
        };

        let mut items = StrftimeItems::new(&pattern).peekable();
        if items.peek().is_none() {
            return Err(invalid("pattern is empty"));
        }
        if items.any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unsupported format specifier"));
        }

        let mut rendered = String::new();
        if write!(rendered, "{}", DateTime::<Utc>::UNIX_EPOCH.format(&pattern)).is_err() {
            return Err(invalid("pattern cannot be rendered"));
        }

        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Current token in UTC.
    pub fn today(&self) -> String {
        self.format_at(Utc::now())
    }

    pub fn format_at(&self, at: DateTime<Utc>) -> String {
        let mut token = String::new();
        // Rendering was checked in `new`.
        let _ = write!(token, "{}", at.format(&self.0));
        token
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self(DEFAULT_DATE_PATTERN.to_string())
    }
}

/// Index pattern matching every index that carries `date_token`.
pub fn index_pattern(date_token: &str) -> String {
    format!("*{date_token}*")
}
