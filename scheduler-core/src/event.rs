//! Event types as stored and as served to the scheduler UI.
//!
//! A stored row carries its recurring-series role implicitly in two columns,
//! `event_pid` and `rec_type`. [`EventRole`] decodes that pair once so the
//! store can branch on a real variant instead of re-checking columns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::format_display;

/// `rec_type` value for non-recurring rows and excluded occurrences.
pub const REC_TYPE_NONE: &str = "none";

/// Whether a `rec_type` value is a recurrence rule (i.e. the row is a series master).
///
/// Absent, empty and `"none"` are all "not a rule".
pub fn is_recurrence_rule(rec_type: Option<&str>) -> bool {
    matches!(rec_type, Some(rule) if !rule.is_empty() && rule != REC_TYPE_NONE)
}

/// A persisted event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub text: String,
    /// Master id for detached occurrences, `0` otherwise
    pub event_pid: i64,
    /// Series length hint for the client's recurrence expansion
    pub event_length: i64,
    pub rec_type: String,
}

/// Role of a row within recurring series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRole {
    /// Standalone, non-recurring event
    Plain,
    /// Defines a recurring series
    Master { rule: String },
    /// Individually edited instance of the series with id `master_id`, or a
    /// tombstone (`rec_type = "none"`) marking that date as excluded
    Occurrence { master_id: i64 },
}

impl Event {
    pub fn role(&self) -> EventRole {
        if self.event_pid != 0 {
            EventRole::Occurrence {
                master_id: self.event_pid,
            }
        } else if is_recurrence_rule(Some(&self.rec_type)) {
            EventRole::Master {
                rule: self.rec_type.clone(),
            }
        } else {
            EventRole::Plain
        }
    }

    /// Presentation form with display-formatted dates.
    pub fn to_view(&self) -> EventView {
        EventView {
            id: self.id,
            start_date: format_display(&self.start_date),
            end_date: format_display(&self.end_date),
            text: self.text.clone(),
            event_pid: self.event_pid,
            event_length: self.event_length,
            rec_type: self.rec_type.clone(),
        }
    }
}

/// Field values written by insert and update.
///
/// `event_pid` and `event_length` default to `0` when absent. `rec_type` has no
/// default: an absent value is written as NULL and rejected by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventData {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub text: String,
    pub event_pid: Option<i64>,
    pub event_length: Option<i64>,
    pub rec_type: Option<String>,
}

impl EventData {
    pub fn event_pid_or_default(&self) -> i64 {
        self.event_pid.unwrap_or(0)
    }

    pub fn event_length_or_default(&self) -> i64 {
        self.event_length.unwrap_or(0)
    }

    /// True when writing this data makes the target row a series master.
    pub fn has_recurrence_rule(&self) -> bool {
        is_recurrence_rule(self.rec_type.as_deref())
    }
}

impl From<Event> for EventData {
    fn from(event: Event) -> Self {
        EventData {
            start_date: event.start_date,
            end_date: event.end_date,
            text: event.text,
            event_pid: Some(event.event_pid),
            event_length: Some(event.event_length),
            rec_type: Some(event.rec_type),
        }
    }
}

/// Query window for `list`: rows overlapping the half-open range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl EventWindow {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        EventWindow { from, to }
    }

    /// Same predicate the list query applies in SQL.
    pub fn overlaps(&self, event: &Event) -> bool {
        event.end_date >= self.from && event.start_date < self.to
    }
}

/// An event as returned by `list`, dates rendered as `YYYY-MM-DD hh:mm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub text: String,
    pub event_pid: i64,
    pub event_length: i64,
    pub rec_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn make_event(event_pid: i64, rec_type: &str) -> Event {
        Event {
            id: 7,
            start_date: at(20, 15),
            end_date: at(20, 16),
            text: "Standup".to_string(),
            event_pid,
            event_length: 0,
            rec_type: rec_type.to_string(),
        }
    }

    #[test]
    fn test_is_recurrence_rule() {
        assert!(is_recurrence_rule(Some("week_1___1,3,5")));
        assert!(!is_recurrence_rule(Some("none")));
        assert!(!is_recurrence_rule(Some("")));
        assert!(!is_recurrence_rule(None));
    }

    #[test]
    fn test_role_plain() {
        assert_eq!(make_event(0, "none").role(), EventRole::Plain);
        assert_eq!(make_event(0, "").role(), EventRole::Plain);
    }

    #[test]
    fn test_role_master() {
        assert_eq!(
            make_event(0, "day_1___").role(),
            EventRole::Master {
                rule: "day_1___".to_string()
            }
        );
    }

    #[test]
    fn test_role_occurrence_wins_over_rec_type() {
        assert_eq!(
            make_event(3, "none").role(),
            EventRole::Occurrence { master_id: 3 }
        );
        assert_eq!(
            make_event(3, "day_1___").role(),
            EventRole::Occurrence { master_id: 3 }
        );
    }

    #[test]
    fn test_to_view_formats_dates() {
        let view = make_event(0, "none").to_view();
        assert_eq!(view.start_date, "2025-03-20 15:00");
        assert_eq!(view.end_date, "2025-03-20 16:00");
        assert_eq!(view.id, 7);
        assert_eq!(view.rec_type, "none");
    }

    #[test]
    fn test_event_data_defaults() {
        let data = EventData {
            start_date: at(20, 15),
            end_date: at(20, 16),
            text: String::new(),
            event_pid: None,
            event_length: None,
            rec_type: None,
        };
        assert_eq!(data.event_pid_or_default(), 0);
        assert_eq!(data.event_length_or_default(), 0);
        assert!(!data.has_recurrence_rule());
    }

    #[test]
    fn test_window_is_half_open() {
        let window = EventWindow::new(at(20, 16), at(21, 0));

        // Ends exactly at `from`: included
        assert!(window.overlaps(&make_event(0, "none")));

        // Starts exactly at `to`: excluded
        let mut late = make_event(0, "none");
        late.start_date = at(21, 0);
        late.end_date = at(21, 1);
        assert!(!window.overlaps(&late));
    }
}
