//! Small date grammar for schedule changes.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schedule::{PrioritySlot, Schedule, ScheduleError};

use super::DateParser;

static IN_DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^in\s+(\d{1,3})\s+days?$").unwrap());

/// Understands RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `today`, `tomorrow`,
/// `in N days`, `next <weekday>`, `<weekday>` and the priority slot names.
///
/// Relative forms accept a trailing `at HH:MM`; without it they land on the default
/// time of day (09:00 UTC). Whether the result lies in the future is checked by
/// [`Schedule::validate`], not here.
#[derive(Debug, Clone, Copy)]
pub struct BasicDateParser {
    default_time: NaiveTime,
}

impl Default for BasicDateParser {
    fn default() -> Self {
        Self {
            default_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl BasicDateParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_time(mut self, time: NaiveTime) -> Self {
        self.default_time = time;
        self
    }

    fn relative_day(&self, phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
        match phrase {
            "today" => return Some(today),
            "tomorrow" => return today.checked_add_days(Days::new(1)),
            _ => {}
        }
        if let Some(caps) = IN_DAYS.captures(phrase) {
            let n: u64 = caps[1].parse().ok()?;
            return today.checked_add_days(Days::new(n));
        }
        let weekday = phrase.strip_prefix("next ").unwrap_or(phrase).trim();
        let weekday: Weekday = weekday.parse().ok()?;
        Some(next_weekday(today, weekday))
    }
}

/// Next occurrence of `weekday` strictly after `from`.
fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() + 7 - from.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    from + Days::new(u64::from(ahead))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

impl DateParser for BasicDateParser {
    fn parse(&self, input: &str, now: DateTime<Utc>) -> Result<Schedule, ScheduleError> {
        let raw = input.trim();
        let unparseable = || ScheduleError::Unparseable(input.to_string());
        if raw.is_empty() {
            return Err(unparseable());
        }
        if let Ok(slot) = raw.parse::<PrioritySlot>() {
            return Ok(Schedule::Slot(slot));
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Schedule::At(at.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
            return Ok(Schedule::At(Utc.from_utc_datetime(&naive)));
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Schedule::At(
                Utc.from_utc_datetime(&date.and_time(self.default_time)),
            ));
        }

        let lower = raw.to_ascii_lowercase();
        let (phrase, time) = match lower.rsplit_once(" at ") {
            Some((day, time)) => (day.trim(), parse_time(time).ok_or_else(unparseable)?),
            None => (lower.as_str(), self.default_time),
        };
        let day = self
            .relative_day(phrase, now.date_naive())
            .ok_or_else(unparseable)?;
        Ok(Schedule::At(Utc.from_utc_datetime(&day.and_time(time))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        // Sunday
        Utc.with_ymd_and_hms(2026, 10, 18, 15, 30, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Schedule {
        Schedule::At(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    #[test]
    fn absolute_forms() {
        let p = BasicDateParser::new();
        assert_eq!(p.parse("2026-11-02", now()).unwrap(), at(2026, 11, 2, 9, 0));
        assert_eq!(
            p.parse("2026-11-02 14:45", now()).unwrap(),
            at(2026, 11, 2, 14, 45)
        );
        assert_eq!(
            p.parse("2026-11-02T10:00:00+02:00", now()).unwrap(),
            at(2026, 11, 2, 8, 0)
        );
    }

    #[test]
    fn custom_default_time_applies_without_explicit_time() {
        let p = BasicDateParser::new().with_default_time(NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(p.parse("tomorrow", now()).unwrap(), at(2026, 10, 19, 18, 30));
        assert_eq!(p.parse("2026-11-02", now()).unwrap(), at(2026, 11, 2, 18, 30));
        assert_eq!(
            p.parse("tomorrow at 07:00", now()).unwrap(),
            at(2026, 10, 19, 7, 0)
        );
    }

    #[test]
    fn relative_forms() {
        let p = BasicDateParser::new();
        assert_eq!(p.parse("today", now()).unwrap(), at(2026, 10, 18, 9, 0));
        assert_eq!(p.parse("Tomorrow", now()).unwrap(), at(2026, 10, 19, 9, 0));
        assert_eq!(p.parse("in 3 days", now()).unwrap(), at(2026, 10, 21, 9, 0));
        assert_eq!(p.parse("next monday", now()).unwrap(), at(2026, 10, 19, 9, 0));
        assert_eq!(
            p.parse("friday at 17:15", now()).unwrap(),
            at(2026, 10, 23, 17, 15)
        );
        // same weekday means a week ahead
        assert_eq!(p.parse("sunday", now()).unwrap(), at(2026, 10, 25, 9, 0));
    }

    #[test]
    fn slot_names() {
        let p = BasicDateParser::new();
        assert_eq!(
            p.parse("r3", now()).unwrap(),
            Schedule::Slot(PrioritySlot::R3)
        );
    }

    #[test]
    fn garbage_is_unparseable() {
        let p = BasicDateParser::new();
        for input in ["", "someday", "next blursday", "tomorrow at noon"] {
            assert!(
                matches!(p.parse(input, now()), Err(ScheduleError::Unparseable(_))),
                "{input}"
            );
        }
    }
}
