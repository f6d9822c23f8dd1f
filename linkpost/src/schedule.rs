//! When a post goes out: a concrete timestamp or one of six named priority slots.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error from parsing or validating a schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("could not understand date \"{0}\"")]
    Unparseable(String),
    #[error("date {0} is in the past")]
    InPast(DateTime<Utc>),
}

/// Named publishing windows. `P*` are priority slots for fresh content, `R*` for
/// repurposed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrioritySlot {
    P1,
    P2,
    P3,
    R1,
    R2,
    R3,
}

impl PrioritySlot {
    pub const ALL: [PrioritySlot; 6] = [
        PrioritySlot::P1,
        PrioritySlot::P2,
        PrioritySlot::P3,
        PrioritySlot::R1,
        PrioritySlot::R2,
        PrioritySlot::R3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrioritySlot::P1 => "P1",
            PrioritySlot::P2 => "P2",
            PrioritySlot::P3 => "P3",
            PrioritySlot::R1 => "R1",
            PrioritySlot::R2 => "R2",
            PrioritySlot::R3 => "R3",
        }
    }

    /// Human-readable window shown to reviewers.
    pub fn description(&self) -> &'static str {
        match self {
            PrioritySlot::P1 => "Saturday/Sunday between 8:00 AM and 10:00 AM PST",
            PrioritySlot::P2 => {
                "Friday/Monday between 8:00 AM and 10:00 AM PST, or Saturday/Sunday between 11:30 AM and 1:00 PM PST"
            }
            PrioritySlot::P3 => "Saturday/Sunday between 1:00 PM and 5:00 PM PST",
            PrioritySlot::R1 => "Monday through Friday between 8:00 AM and 10:00 AM PST",
            PrioritySlot::R2 => "Monday through Friday between 11:30 AM and 1:00 PM PST",
            PrioritySlot::R3 => "Monday through Friday between 1:00 PM and 5:00 PM PST",
        }
    }
}

impl fmt::Display for PrioritySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrioritySlot {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PrioritySlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ScheduleError::Unparseable(s.to_string()))
    }
}

/// Publishing schedule of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Schedule {
    Slot(PrioritySlot),
    At(DateTime<Utc>),
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Slot(PrioritySlot::P1)
    }
}

impl Schedule {
    /// Formatted description for the review payload.
    pub fn describe(&self) -> String {
        match self {
            Schedule::Slot(slot) => format!("{} ({})", slot, slot.description()),
            Schedule::At(at) => at.format("%A, %B %-d, %Y at %H:%M UTC").to_string(),
        }
    }

    /// Rejects concrete timestamps that are not after `now`. Slots are always valid.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Self, ScheduleError> {
        match self {
            Schedule::At(at) if at <= now => Err(ScheduleError::InPast(at)),
            other => Ok(other),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Slot(slot) => write!(f, "{}", slot),
            Schedule::At(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}
