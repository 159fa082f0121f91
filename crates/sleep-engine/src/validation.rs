//! Plausibility checks for a session's duration.
//!
//! [`classify`] returns exactly one of ok, warn or error, with at most one
//! message. Errors block saving; warnings are advisory.
//!
//! | Category | Error when duration > | Warn when duration > | Other warnings   |
//! |----------|-----------------------|----------------------|------------------|
//! | Nap      | 300 min (5h)          | 240 min (4h)         | crosses midnight |
//! | Night    | 840 min (14h)         | 780 min (13h)        | none             |
//!
//! A night crossing midnight is the normal case and is never flagged.

use serde::{Deserialize, Serialize};

use crate::duration::{duration_minutes, is_degenerate};
use crate::labels::format_minutes;
use crate::session::{SleepCategory, TimeOfDay};

// ── Thresholds ──────────────────────────────────────────────────────────────

/// Duration limits per category, in minutes.
///
/// Missing fields fall back to the defaults when deserialized, so a config
/// file may override only the limits it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub nap_warn_minutes: u32,
    pub nap_max_minutes: u32,
    pub night_warn_minutes: u32,
    pub night_max_minutes: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            nap_warn_minutes: 240,
            nap_max_minutes: 300,
            night_warn_minutes: 780,
            night_max_minutes: 840,
        }
    }
}

impl Thresholds {
    /// `(warn, max)` for a category.
    pub fn limits(&self, category: SleepCategory) -> (u32, u32) {
        match category {
            SleepCategory::Nap => (self.nap_warn_minutes, self.nap_max_minutes),
            SleepCategory::Night => (self.night_warn_minutes, self.night_max_minutes),
        }
    }
}

// ── ValidationResult ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    Error,
}

/// Machine-readable reason behind a warn or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingEnd,
    IdenticalStartEnd,
    ExceedsMaximum,
    UnusuallyLong,
    CrossesMidnight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub severity: Severity,
    pub message: Option<String>,
    pub issue: Option<ValidationIssue>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            severity: Severity::Ok,
            message: None,
            issue: None,
        }
    }

    pub fn warn(issue: ValidationIssue, message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            severity: Severity::Warn,
            message: Some(message.into()),
            issue: Some(issue),
        }
    }

    pub fn error(issue: ValidationIssue, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            severity: Severity::Error,
            message: Some(message.into()),
            issue: Some(issue),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warn
    }
}

// ── classify ────────────────────────────────────────────────────────────────

/// Classify a session with the default [`Thresholds`].
///
/// `require_end` is set when the workflow needs an end time, e.g. logging a
/// wake-up with no night session currently open.
///
/// # Examples
///
/// ```
/// use sleep_engine::{classify, Severity, SleepCategory};
///
/// let result = classify(
///     SleepCategory::Nap,
///     "23:00".parse().unwrap(),
///     Some("00:30".parse().unwrap()),
///     false,
/// );
/// assert_eq!(result.severity, Severity::Warn);
/// assert_eq!(result.message.as_deref(), Some("crosses midnight"));
/// ```
pub fn classify(
    category: SleepCategory,
    start: TimeOfDay,
    end: Option<TimeOfDay>,
    require_end: bool,
) -> ValidationResult {
    classify_with(&Thresholds::default(), category, start, end, require_end)
}

/// Classify a session against explicit thresholds.
pub fn classify_with(
    thresholds: &Thresholds,
    category: SleepCategory,
    start: TimeOfDay,
    end: Option<TimeOfDay>,
    require_end: bool,
) -> ValidationResult {
    let result = classify_inner(thresholds, category, start, end, require_end);
    log::debug!(
        "classified {category} {start}-{}: {:?} {}",
        end.map(|e| e.to_string()).unwrap_or_else(|| "..".to_string()),
        result.severity,
        result.message.as_deref().unwrap_or("")
    );
    result
}

fn classify_inner(
    thresholds: &Thresholds,
    category: SleepCategory,
    start: TimeOfDay,
    end: Option<TimeOfDay>,
    require_end: bool,
) -> ValidationResult {
    let end = match end {
        Some(end) => end,
        None if require_end => {
            return ValidationResult::error(ValidationIssue::MissingEnd, "missing end time");
        }
        None => return ValidationResult::ok(),
    };

    let minutes = duration_minutes(start, end);
    if is_degenerate(minutes) {
        return ValidationResult::error(ValidationIssue::IdenticalStartEnd, "identical start/end");
    }

    let (warn_at, max) = thresholds.limits(category);
    if minutes > max {
        return ValidationResult::error(
            ValidationIssue::ExceedsMaximum,
            format!("exceeds {}", describe_limit(max)),
        );
    }
    if minutes > warn_at {
        let message = match category {
            SleepCategory::Nap => "unusually long nap",
            SleepCategory::Night => "unusually long night sleep",
        };
        return ValidationResult::warn(ValidationIssue::UnusuallyLong, message);
    }
    if category == SleepCategory::Nap && end < start {
        return ValidationResult::warn(ValidationIssue::CrossesMidnight, "crosses midnight");
    }
    ValidationResult::ok()
}

/// "5 hours", "1 hour", or the compact "4h 30 min" for uneven limits.
fn describe_limit(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (1, 0) => "1 hour".to_string(),
        (h, 0) => format!("{h} hours"),
        _ => format_minutes(minutes),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
