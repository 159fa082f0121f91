//! Core value types: categories, wall-clock times, drafts and resolved sessions.
//!
//! A [`SessionDraft`] is what the editor holds while the caregiver types. It is
//! a plain `Copy` value; every edit produces a new draft through the `with_*`
//! methods so validation and labels can be recomputed from scratch.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::resolver::{day_after, is_post_midnight_bedtime};

// ── SleepCategory ───────────────────────────────────────────────────────────

/// Which kind of sleep a session records. Drives thresholds and the
/// midnight-crossing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepCategory {
    /// Daytime nap, assumed to start on the selected day.
    Nap,
    /// Overnight sleep, keyed by the evening it starts.
    Night,
}

impl SleepCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepCategory::Nap => "nap",
            SleepCategory::Night => "night",
        }
    }
}

impl fmt::Display for SleepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SleepCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nap" => Ok(SleepCategory::Nap),
            "night" => Ok(SleepCategory::Night),
            _ => Err(EngineError::InvalidCategory(format!("'{}'", s.trim()))),
        }
    }
}

// ── TimeOfDay ───────────────────────────────────────────────────────────────

/// A wall-clock time with minute precision and no date attached.
///
/// Ordering is by hour, then minute, which matches comparing the zero-padded
/// `"HH:MM"` strings lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time from its components. Returns `None` outside 00:00–23:59.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    /// Minutes elapsed since 00:00 (0..1440).
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        // Components are range-checked at construction.
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Combine with a calendar date into an absolute local instant.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }
}

/// Seconds are dropped.
impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(TimeOfDay::from)
            .map_err(|e| EngineError::InvalidTime(format!("'{}': {}", s.trim(), e)))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// The first and last dates chrono can represent are rejected: resolving a
/// session needs the day before and the day after the selected date.
pub fn parse_date(s: &str) -> Result<NaiveDate, EngineError> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDate(format!("'{}': {}", s.trim(), e)))?;
    if date.pred_opt().is_none() || date.succ_opt().is_none() {
        return Err(EngineError::InvalidDate(format!(
            "'{}': out of supported range",
            s.trim()
        )));
    }
    Ok(date)
}

// ── SessionDraft ────────────────────────────────────────────────────────────

/// The in-memory entry being edited. Never persisted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub category: SleepCategory,
    /// The calendar date the editor is displaying.
    pub selected_date: NaiveDate,
    pub start: TimeOfDay,
    /// Absent while the session is ongoing.
    pub end: Option<TimeOfDay>,
}

impl SessionDraft {
    pub fn new(
        category: SleepCategory,
        selected_date: NaiveDate,
        start: TimeOfDay,
        end: Option<TimeOfDay>,
    ) -> Self {
        Self {
            category,
            selected_date,
            start,
            end,
        }
    }

    /// Default draft for a new entry: an ongoing session starting at `now`.
    ///
    /// A night started after midnight is filed under the following selected
    /// date so that it resolves back to `now` rather than a day earlier.
    pub fn starting_at(category: SleepCategory, now: NaiveDateTime) -> Self {
        let start = TimeOfDay::from(now.time());
        let selected_date = if category == SleepCategory::Night && is_post_midnight_bedtime(start)
        {
            day_after(now.date())
        } else {
            now.date()
        };
        Self::new(category, selected_date, start, None)
    }

    /// Seed a draft from a persisted session, inverting the resolver's
    /// anchoring so the same draft resolves to the same instants again.
    pub fn from_resolved(session: &ResolvedSession) -> Self {
        let start = TimeOfDay::from(session.start.time());
        let selected_date =
            if session.category == SleepCategory::Night && is_post_midnight_bedtime(start) {
                day_after(session.start.date())
            } else {
                session.start.date()
            };
        Self::new(
            session.category,
            selected_date,
            start,
            session.end.map(|e| TimeOfDay::from(e.time())),
        )
    }

    pub fn with_category(self, category: SleepCategory) -> Self {
        Self { category, ..self }
    }

    pub fn with_selected_date(self, selected_date: NaiveDate) -> Self {
        Self {
            selected_date,
            ..self
        }
    }

    pub fn with_start(self, start: TimeOfDay) -> Self {
        Self { start, ..self }
    }

    pub fn with_end(self, end: Option<TimeOfDay>) -> Self {
        Self { end, ..self }
    }

    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }
}

// ── ResolvedSession ─────────────────────────────────────────────────────────

/// Absolute instants handed to storage at save time.
///
/// For every draft that validation accepts, `end` (when present) is strictly
/// after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSession {
    pub category: SleepCategory,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl ResolvedSession {
    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }
}
