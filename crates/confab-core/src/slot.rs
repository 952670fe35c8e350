//! Time intervals for scheduling: absolute meeting slots and recurring
//! daily off-hour slots.
//!
//! All scheduling times are naive wall-clock values; the service does not
//! do timezone conversion. Intervals are half-open `[start, end)`, so two
//! slots that merely touch at an endpoint do not overlap.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Absolute half-open interval `[start, end)` in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSlot {
    /// ## Summary
    /// Creates a time slot, enforcing `start < end`.
    ///
    /// ## Errors
    /// Returns a validation error if `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> CoreResult<Self> {
        let slot = Self { start, end };
        slot.validate()?;
        Ok(slot)
    }

    /// ## Summary
    /// Re-checks the `start < end` invariant on a slot that was built
    /// outside `new` (e.g. deserialized from a request body).
    ///
    /// ## Errors
    /// Returns a validation error if `start >= end`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(CoreError::ValidationError(format!(
                "slot start ({}) must be before slot end ({})",
                self.start, self.end
            )))
        }
    }

    /// Standard interval-overlap test. Touching endpoints do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// ## Summary
    /// Iterates over every calendar date this slot touches.
    ///
    /// The interval is half-open, so a slot ending exactly at midnight does
    /// not touch the following day.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = if self.end.time() == NaiveTime::MIN {
            self.end.date().pred_opt().unwrap_or(self.start.date())
        } else {
            self.end.date()
        };

        self.start
            .date()
            .iter_days()
            .take_while(move |day| *day <= last)
    }
}

/// Recurring daily off-hours interval `[start, end)` in time-of-day.
///
/// A daily slot has no date component; it is re-evaluated against the
/// calendar dates of whatever candidate interval it is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DailySlot {
    /// ## Summary
    /// Creates a daily slot, enforcing `start < end`.
    ///
    /// ## Errors
    /// Returns a validation error if `start >= end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> CoreResult<Self> {
        let slot = Self { start, end };
        slot.validate()?;
        Ok(slot)
    }

    /// ## Summary
    /// Re-checks the `start < end` invariant on a deserialized slot.
    ///
    /// ## Errors
    /// Returns a validation error if `start >= end`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(CoreError::ValidationError(format!(
                "daily slot start ({}) must be before end ({})",
                self.start, self.end
            )))
        }
    }

    /// Projects the daily slot onto a concrete calendar date.
    #[must_use]
    pub fn on(&self, date: NaiveDate) -> TimeSlot {
        TimeSlot {
            start: NaiveDateTime::new(date, self.start),
            end: NaiveDateTime::new(date, self.end),
        }
    }

    /// ## Summary
    /// Whether this daily slot blocks the candidate interval.
    ///
    /// The slot is projected onto every calendar day the candidate touches
    /// and the union of the projections is tested, so a candidate spanning
    /// midnight is checked against both the start day and the end day.
    #[must_use]
    pub fn blocks(&self, candidate: &TimeSlot) -> bool {
        candidate
            .days()
            .any(|day| self.on(day).overlaps(candidate))
    }
}

/// ## Summary
/// Parses a wall-clock datetime from its request representation
/// (`YYYY-MM-DDTHH:MM` with optional seconds).
///
/// ## Errors
/// Returns a parse error if the string matches neither format.
pub fn parse_wall_clock(s: &str) -> CoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| CoreError::ParseError(format!("invalid datetime {s:?}: {e}")))
}

/// ## Summary
/// Parses a time-of-day from its request representation (`HH:MM`, 24-hour,
/// with optional seconds).
///
/// ## Errors
/// Returns a parse error if the string matches neither format.
pub fn parse_time_of_day(s: &str) -> CoreResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| CoreError::ParseError(format!("invalid time {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(
            parse_wall_clock(start).expect("valid start"),
            parse_wall_clock(end).expect("valid end"),
        )
        .expect("valid slot")
    }

    fn daily(start: &str, end: &str) -> DailySlot {
        DailySlot::new(
            parse_time_of_day(start).expect("valid start"),
            parse_time_of_day(end).expect("valid end"),
        )
        .expect("valid daily slot")
    }

    #[test]
    fn rejects_inverted_and_empty_slots() {
        let start = parse_wall_clock("2025-06-01T10:00").expect("valid");
        assert!(TimeSlot::new(start, start).is_err());

        let earlier = parse_wall_clock("2025-06-01T09:00").expect("valid");
        assert!(TimeSlot::new(start, earlier).is_err());

        let nine = parse_time_of_day("09:00").expect("valid");
        assert!(DailySlot::new(nine, nine).is_err());
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (slot("2025-06-01T10:00", "2025-06-01T11:00"), slot("2025-06-01T10:30", "2025-06-01T11:30")),
            (slot("2025-06-01T10:00", "2025-06-01T11:00"), slot("2025-06-01T11:00", "2025-06-01T12:00")),
            (slot("2025-06-01T10:00", "2025-06-01T12:00"), slot("2025-06-01T10:30", "2025-06-01T11:00")),
            (slot("2025-06-01T10:00", "2025-06-01T11:00"), slot("2025-06-02T10:00", "2025-06-02T11:00")),
        ];

        for (a, b) in cases {
            assert_eq!(a.overlaps(&b), b.overlaps(&a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn touching_slots_do_not_overlap() {
        let a = slot("2025-06-01T10:00", "2025-06-01T11:00");
        let b = slot("2025-06-01T11:00", "2025-06-01T12:00");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn contained_slot_overlaps() {
        let outer = slot("2025-06-01T09:00", "2025-06-01T17:00");
        let inner = slot("2025-06-01T12:00", "2025-06-01T13:00");
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn days_respects_half_open_end() {
        let ends_at_midnight = slot("2025-06-01T22:00", "2025-06-02T00:00");
        let days: Vec<_> = ends_at_midnight.days().collect();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].to_string(), "2025-06-01");

        let crosses_midnight = slot("2025-06-01T22:00", "2025-06-02T01:00");
        let days: Vec<_> = crosses_midnight.days().collect();
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn daily_slot_blocks_overlapping_candidate() {
        let blocked = daily("09:00", "10:00");
        assert!(blocked.blocks(&slot("2025-06-01T09:30", "2025-06-01T10:30")));
        assert!(!blocked.blocks(&slot("2025-06-01T10:00", "2025-06-01T11:00")));
    }

    #[test]
    fn daily_slot_is_checked_on_both_sides_of_midnight() {
        // Candidate runs 23:00 -> 01:00; morning off-hours on the end day
        // must still block it.
        let morning = daily("00:30", "02:00");
        assert!(morning.blocks(&slot("2025-06-01T23:00", "2025-06-02T01:00")));

        // And evening off-hours on the start day block it too.
        let evening = daily("22:00", "23:30");
        assert!(evening.blocks(&slot("2025-06-01T23:00", "2025-06-02T01:00")));

        // Off-hours entirely inside the gap the candidate skips do not.
        let afternoon = daily("13:00", "14:00");
        assert!(!afternoon.blocks(&slot("2025-06-01T23:00", "2025-06-02T01:00")));
    }

    #[test]
    fn parses_request_time_formats() {
        assert!(parse_wall_clock("2025-06-01T10:00").is_ok());
        assert!(parse_wall_clock("2025-06-01T10:00:30").is_ok());
        assert!(parse_wall_clock("2025-06-01 10:00").is_err());

        assert!(parse_time_of_day("09:00").is_ok());
        assert!(parse_time_of_day("09:00:30").is_ok());
        assert!(parse_time_of_day("9am").is_err());
    }
}
