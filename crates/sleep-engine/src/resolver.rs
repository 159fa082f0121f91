//! Resolve bare time-of-day entries to absolute instants.
//!
//! Entries carry only `HH:MM`; the calendar date comes from the date the
//! editor is showing (the *selected date*). Three midnight scenarios matter:
//!
//! - an end earlier than its start crossed midnight forward and lands on the
//!   day after the start;
//! - a night whose bedtime falls between 00:00 and 03:59 belongs to the
//!   previous evening, so its start moves back one day;
//! - the end of such a night stays on the selected date.
//!
//! None of these functions read the system clock or fail. Dates at the very
//! edge of chrono's range have no neighbour to shift to; [`parse_date`]
//! rejects them, and the resolver leaves them unshifted.
//!
//! [`parse_date`]: crate::session::parse_date

use chrono::{NaiveDate, NaiveDateTime};

use crate::session::{ResolvedSession, SessionDraft, SleepCategory, TimeOfDay};

/// Latest hour at which a night-sleep start still counts as a continuation of
/// the previous evening.
pub const LAST_POST_MIDNIGHT_HOUR: u32 = 3;

/// Whether a night bedtime falls just after midnight (00:00 through 03:59).
pub fn is_post_midnight_bedtime(start: TimeOfDay) -> bool {
    start.hour() <= LAST_POST_MIDNIGHT_HOUR
}

pub(crate) fn day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

pub(crate) fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// Resolve the start of a session to an absolute instant.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sleep_engine::{resolve_start, SleepCategory};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let start = resolve_start(SleepCategory::Night, date, "01:30".parse().unwrap());
/// assert_eq!(start.to_string(), "2024-03-09 01:30:00");
/// ```
pub fn resolve_start(
    category: SleepCategory,
    selected_date: NaiveDate,
    start: TimeOfDay,
) -> NaiveDateTime {
    let date = match category {
        SleepCategory::Nap => selected_date,
        SleepCategory::Night if is_post_midnight_bedtime(start) => day_before(selected_date),
        SleepCategory::Night => selected_date,
    };
    start.on(date)
}

/// Resolve the end of a session, or `None` while it is ongoing.
///
/// `anchor_date` is the selected date. The end normally lands on the start's
/// date, or the day after it when the end is earlier than the start. A night
/// with a post-midnight start was shifted back a day by [`resolve_start`]; its
/// end stays on the selected date either way, which is the day after the
/// shifted start.
pub fn resolve_end(
    category: SleepCategory,
    anchor_date: NaiveDate,
    start: TimeOfDay,
    end: Option<TimeOfDay>,
) -> Option<NaiveDateTime> {
    let end = end?;
    let start_date = resolve_start(category, anchor_date, start).date();
    let date = if end < start {
        day_after(start_date)
    } else if category == SleepCategory::Night && is_post_midnight_bedtime(start) {
        anchor_date
    } else {
        start_date
    };
    log::trace!(
        "resolved {category} end {end} (start {start} on {start_date}) against {anchor_date} -> {date}"
    );
    Some(end.on(date))
}

/// Resolve a whole draft into the instants handed to storage.
pub fn resolve(draft: &SessionDraft) -> ResolvedSession {
    let start = resolve_start(draft.category, draft.selected_date, draft.start);
    let end = resolve_end(draft.category, draft.selected_date, draft.start, draft.end);
    log::debug!(
        "resolved {} draft on {}: start={} end={:?}",
        draft.category,
        draft.selected_date,
        start,
        end
    );
    ResolvedSession {
        category: draft.category,
        start,
        end,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
