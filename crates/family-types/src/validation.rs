use chrono::{NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

use crate::models::{EventDraft, EventPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    Missing(&'static str),

    #[error("Date must be in YYYY-MM-DD format.")]
    InvalidDate,

    #[error("{0} must be in HH:MM format.")]
    InvalidTime(&'static str),

    #[error("End time must be after start time.")]
    TimeOrder,
}

/// Accepts `YYYY-MM-DD`, optionally followed by a `T...` time part which is
/// dropped. Returns the zero-padded calendar date.
pub fn normalize_date(raw: &str) -> Result<String, ValidationError> {
    let day = raw.trim().split('T').next().unwrap_or_default();
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate)?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, ValidationError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime(field))
}

/// Zero-padded `HH:MM`, keeping seconds only when they are non-zero.
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// Parses a time of day and returns it in canonical form.
pub fn normalize_time(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    parse_time(field, raw).map(format_time)
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

impl EventDraft {
    /// Check an event before it reaches the store. Returns the draft with its
    /// date and times in canonical form.
    pub fn validate(&self) -> Result<EventDraft, ValidationError> {
        require("Event name", &self.title)?;
        require("Date", &self.date)?;
        require("Start time", &self.start_time)?;
        require("End time", &self.end_time)?;
        require("Location", &self.location)?;

        let date = normalize_date(&self.date)?;
        let start = parse_time("Start time", &self.start_time)?;
        let end = parse_time("End time", &self.end_time)?;

        if start >= end {
            return Err(ValidationError::TimeOrder);
        }

        Ok(EventDraft {
            date,
            start_time: format_time(start),
            end_time: format_time(end),
            ..self.clone()
        })
    }
}

impl EventPatch {
    /// The same patch with any date or times in canonical form.
    pub fn normalized(&self) -> Result<EventPatch, ValidationError> {
        Ok(EventPatch {
            date: self.date.as_deref().map(normalize_date).transpose()?,
            start_time: self
                .start_time
                .as_deref()
                .map(|t| normalize_time("Start time", t))
                .transpose()?,
            end_time: self
                .end_time
                .as_deref()
                .map(|t| normalize_time("End time", t))
                .transpose()?,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EventDraft {
        EventDraft {
            title: "Swimming Lesson".into(),
            date: "2025-12-15".into(),
            start_time: "16:00".into(),
            end_time: "17:00".into(),
            location: "Community Pool".into(),
            required_items: "Swimsuit, Towel, Goggles".into(),
        }
    }

    #[test]
    fn valid_draft_passes_unchanged() {
        assert_eq!(draft().validate().unwrap(), draft());
    }

    #[test]
    fn start_equal_to_end_is_rejected() {
        let d = EventDraft {
            end_time: "16:00".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::TimeOrder));
    }

    #[test]
    fn start_after_end_is_rejected() {
        let d = EventDraft {
            start_time: "18:30".into(),
            end_time: "09:00".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::TimeOrder));
    }

    #[test]
    fn blank_required_field_is_named() {
        let d = EventDraft {
            location: "   ".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::Missing("Location")));
        assert_eq!(
            ValidationError::Missing("Location").to_string(),
            "Location is required."
        );
    }

    #[test]
    fn required_items_may_be_empty() {
        let d = EventDraft {
            required_items: String::new(),
            ..draft()
        };
        assert!(d.validate().is_ok());
    }

    #[test]
    fn iso_timestamp_date_is_trimmed_to_day() {
        let d = EventDraft {
            date: "2025-12-15T00:00:00.000Z".into(),
            ..draft()
        };
        assert_eq!(d.validate().unwrap().date, "2025-12-15");
    }

    #[test]
    fn malformed_date_and_time_are_rejected() {
        let d = EventDraft {
            date: "15/12/2025".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::InvalidDate));

        let d = EventDraft {
            start_time: "4pm".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::InvalidTime("Start time")));
    }

    #[test]
    fn times_are_ordered_by_value_not_text() {
        let d = EventDraft {
            start_time: "10:00".into(),
            end_time: "9:30".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::TimeOrder));

        let d = EventDraft {
            start_time: "9:30".into(),
            end_time: "10:00".into(),
            ..draft()
        };
        let valid = d.validate().unwrap();
        assert_eq!((valid.start_time.as_str(), valid.end_time.as_str()), ("09:30", "10:00"));

        let d = EventDraft {
            start_time: "09:00".into(),
            end_time: "09:00:00".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::TimeOrder));
    }

    #[test]
    fn times_and_dates_are_stored_canonically() {
        let d = EventDraft {
            date: "2025-1-5".into(),
            start_time: "08:15:00".into(),
            end_time: "08:15:30".into(),
            ..draft()
        };
        let valid = d.validate().unwrap();
        assert_eq!(valid.date, "2025-01-05");
        assert_eq!(valid.start_time, "08:15");
        assert_eq!(valid.end_time, "08:15:30");
    }

    #[test]
    fn patch_date_is_normalized() {
        let patch = EventPatch {
            date: Some("2026-01-02T10:00".into()),
            ..Default::default()
        };
        assert_eq!(patch.normalized().unwrap().date.as_deref(), Some("2026-01-02"));
        assert!(EventPatch::default().normalized().unwrap().is_empty());

        let patch = EventPatch {
            start_time: Some("7:05".into()),
            end_time: Some("noon".into()),
            ..Default::default()
        };
        assert_eq!(patch.normalized(), Err(ValidationError::InvalidTime("End time")));

        let patch = EventPatch {
            end_time: None,
            ..patch
        };
        assert_eq!(patch.normalized().unwrap().start_time.as_deref(), Some("07:05"));
    }
}
