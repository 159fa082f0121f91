//! User-facing duration and recency labels.
//!
//! Labels are derived on every render and never stored. Recency labels depend
//! on the clock, so callers re-derive them on a periodic tick; [`LabelTicker`]
//! decides when a tick is due.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::duration::{duration_minutes, is_degenerate};
use crate::resolver::resolve;
use crate::session::{SessionDraft, TimeOfDay};

/// Shown instead of a recency label while a session has no end.
pub const IN_PROGRESS_LABEL: &str = "in progress";

/// Default refresh cadence for recency labels.
pub const DEFAULT_REFRESH_SECONDS: i64 = 30;

/// Render a minute count as `"45 min"`, `"2h"` or `"1h 30 min"`.
pub fn format_minutes(minutes: u32) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    match (hours, rest) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m} min"),
    }
}

/// Duration between two wall-clock times, wrapping past midnight.
///
/// # Examples
///
/// ```
/// use sleep_engine::format_duration;
///
/// assert_eq!(format_duration("13:00".parse().unwrap(), "13:29".parse().unwrap()), "29 min");
/// assert_eq!(format_duration("23:00".parse().unwrap(), "00:30".parse().unwrap()), "1h 30 min");
/// ```
pub fn format_duration(start: TimeOfDay, end: TimeOfDay) -> String {
    format_minutes(duration_minutes(start, end))
}

/// Recency label for an end time-of-day on the selected date.
///
/// See [`relative_end_label`] for the phrasing rules.
pub fn format_relative_end(
    selected_date: NaiveDate,
    end: Option<TimeOfDay>,
    now: NaiveDateTime,
    is_ongoing: bool,
) -> String {
    relative_end_label(end.map(|e| e.on(selected_date)), now, is_ongoing)
}

/// Recency label for an absolute end instant relative to `now`.
///
/// - no end: `"in progress"` when ongoing, otherwise empty
/// - end after `now`: empty
/// - same day as `now`: `"just now"`, `"45 min ago"`, `"2h ago"`, `"1h 5 min ago"`
/// - the day before: `"Yesterday"`
/// - anything older: `"Feb 10"`
pub fn relative_end_label(
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
    is_ongoing: bool,
) -> String {
    let Some(end) = end else {
        return if is_ongoing {
            IN_PROGRESS_LABEL.to_string()
        } else {
            String::new()
        };
    };

    let elapsed = now - end;
    if elapsed < Duration::zero() {
        log::debug!("end {end} is after now {now}; no recency label");
        return String::new();
    }

    if end.date() == now.date() {
        let minutes = elapsed.num_minutes();
        return match (minutes / 60, minutes % 60) {
            (0, 0) => "just now".to_string(),
            (0, m) => format!("{m} min ago"),
            (h, 0) => format!("{h}h ago"),
            (h, m) => format!("{h}h {m} min ago"),
        };
    }

    if now.date().pred_opt() == Some(end.date()) {
        return "Yesterday".to_string();
    }

    end.format("%b %-d").to_string()
}

// ── DisplayLabels ───────────────────────────────────────────────────────────

/// Both labels shown beside a draft in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLabels {
    /// e.g. `"1h 30 min long"`; empty while ongoing or when start equals end.
    pub duration_label: String,
    pub relative_end_label: String,
}

impl DisplayLabels {
    /// Labels for a draft, treating a missing end as an ongoing session.
    pub fn for_draft(draft: &SessionDraft, now: NaiveDateTime) -> Self {
        Self::for_session(draft, now, draft.is_ongoing())
    }

    /// Labels with the ongoing state supplied by the caller. A draft with no
    /// end that is not ongoing gets an empty recency label.
    pub fn for_session(draft: &SessionDraft, now: NaiveDateTime, is_ongoing: bool) -> Self {
        let duration_label = match draft.end {
            Some(end) if !is_degenerate(duration_minutes(draft.start, end)) => {
                format!("{} long", format_duration(draft.start, end))
            }
            _ => String::new(),
        };
        let resolved = resolve(draft);
        Self {
            duration_label,
            relative_end_label: relative_end_label(resolved.end, now, is_ongoing),
        }
    }
}

// ── LabelTicker ─────────────────────────────────────────────────────────────

/// Tracks when recency labels were last derived and whether a new clock
/// reading makes them stale.
#[derive(Debug, Clone)]
pub struct LabelTicker {
    interval: Duration,
    last_refresh: Option<NaiveDateTime>,
}

impl Default for LabelTicker {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_REFRESH_SECONDS))
    }
}

impl LabelTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_refresh: None,
        }
    }

    /// Returns `true` and records `now` when labels should be re-derived.
    ///
    /// A clock that moved backwards also forces a refresh.
    pub fn should_refresh(&mut self, now: NaiveDateTime) -> bool {
        let due = match self.last_refresh {
            None => true,
            Some(last) => now < last || now - last >= self.interval,
        };
        if due {
            self.last_refresh = Some(now);
        }
        due
    }

    /// Labels for `draft` when a refresh is due, otherwise `None`.
    pub fn tick(&mut self, draft: &SessionDraft, now: NaiveDateTime) -> Option<DisplayLabels> {
        self.should_refresh(now)
            .then(|| DisplayLabels::for_draft(draft, now))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SleepCategory;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    // ── format_duration ─────────────────────────────────────────────────

    #[test]
    fn test_format_duration_bands() {
        assert_eq!(format_duration(t("13:00"), t("13:29")), "29 min");
        assert_eq!(format_duration(t("13:00"), t("15:00")), "2h");
        assert_eq!(format_duration(t("13:00"), t("14:30")), "1h 30 min");
        assert_eq!(format_duration(t("19:00"), t("07:05")), "12h 5 min");
    }

    // ── relative_end_label ──────────────────────────────────────────────

    #[test]
    fn test_relative_same_day_bands() {
        let now = dt("2024-03-10T12:00:00");
        assert_eq!(relative_end_label(Some(dt("2024-03-10T12:00:00")), now, false), "just now");
        assert_eq!(relative_end_label(Some(dt("2024-03-10T11:59:30")), now, false), "just now");
        assert_eq!(relative_end_label(Some(dt("2024-03-10T11:15:00")), now, false), "45 min ago");
        assert_eq!(relative_end_label(Some(dt("2024-03-10T10:00:00")), now, false), "2h ago");
        assert_eq!(
            relative_end_label(Some(dt("2024-03-10T09:25:00")), now, false),
            "2h 35 min ago"
        );
    }

    #[test]
    fn test_relative_yesterday_and_older() {
        let now = dt("2024-03-10T00:10:00");
        assert_eq!(relative_end_label(Some(dt("2024-03-09T23:55:00")), now, false), "Yesterday");
        assert_eq!(relative_end_label(Some(dt("2024-03-09T06:00:00")), now, false), "Yesterday");
        assert_eq!(relative_end_label(Some(dt("2024-02-10T06:00:00")), now, false), "Feb 10");
        assert_eq!(relative_end_label(Some(dt("2023-12-31T06:00:00")), now, false), "Dec 31");
    }

    #[test]
    fn test_relative_future_end_is_empty() {
        let now = dt("2024-03-10T12:00:00");
        assert_eq!(relative_end_label(Some(dt("2024-03-10T12:05:00")), now, false), "");
        assert_eq!(relative_end_label(Some(dt("2024-03-11T07:00:00")), now, false), "");
    }

    #[test]
    fn test_relative_without_end() {
        let now = dt("2024-03-10T12:00:00");
        assert_eq!(relative_end_label(None, now, true), IN_PROGRESS_LABEL);
        assert_eq!(relative_end_label(None, now, false), "");
    }

    #[test]
    fn test_format_relative_end_anchors_to_selected_date() {
        let now = dt("2024-03-10T08:00:00");
        assert_eq!(format_relative_end(d(2024, 3, 10), Some(t("07:15")), now, false), "45 min ago");
        assert_eq!(format_relative_end(d(2024, 3, 9), Some(t("07:15")), now, false), "Yesterday");
        assert_eq!(format_relative_end(d(2024, 3, 10), None, now, true), "in progress");
    }

    // ── DisplayLabels ───────────────────────────────────────────────────

    #[test]
    fn test_labels_for_night_crossing_midnight() {
        let draft = SessionDraft::new(SleepCategory::Night, d(2024, 3, 9), t("19:30"), Some(t("06:45")));
        let labels = DisplayLabels::for_draft(&draft, dt("2024-03-10T07:30:00"));
        assert_eq!(labels.duration_label, "11h 15 min long");
        assert_eq!(labels.relative_end_label, "45 min ago");
    }

    #[test]
    fn test_labels_for_ongoing_and_degenerate_drafts() {
        let now = dt("2024-03-10T12:00:00");
        let ongoing = SessionDraft::new(SleepCategory::Night, d(2024, 3, 10), t("20:00"), None);
        let labels = DisplayLabels::for_draft(&ongoing, now);
        assert_eq!(labels.duration_label, "");
        assert_eq!(labels.relative_end_label, "in progress");

        let closed = DisplayLabels::for_session(&ongoing, now, false);
        assert_eq!(closed.relative_end_label, "");

        let same = ongoing.with_start(t("08:00")).with_end(Some(t("08:00")));
        assert_eq!(DisplayLabels::for_draft(&same, now).duration_label, "");
    }

    // ── LabelTicker ─────────────────────────────────────────────────────

    #[test]
    fn test_ticker_refreshes_every_interval() {
        let mut ticker = LabelTicker::default();
        assert!(ticker.should_refresh(dt("2024-03-10T12:00:00")));
        assert!(!ticker.should_refresh(dt("2024-03-10T12:00:29")));
        assert!(ticker.should_refresh(dt("2024-03-10T12:00:30")));
        assert!(!ticker.should_refresh(dt("2024-03-10T12:00:45")));
        assert!(ticker.should_refresh(dt("2024-03-10T11:00:00")));
    }

    #[test]
    fn test_ticker_yields_fresh_labels() {
        let draft = SessionDraft::new(SleepCategory::Nap, d(2024, 3, 10), t("13:00"), Some(t("14:00")));
        let mut ticker = LabelTicker::new(Duration::minutes(1));
        let first = ticker.tick(&draft, dt("2024-03-10T14:30:00")).unwrap();
        assert_eq!(first.relative_end_label, "30 min ago");
        assert!(ticker.tick(&draft, dt("2024-03-10T14:30:40")).is_none());
        let later = ticker.tick(&draft, dt("2024-03-10T14:31:00")).unwrap();
        assert_eq!(later.relative_end_label, "31 min ago");
    }
}
