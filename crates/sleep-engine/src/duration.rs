//! Elapsed minutes between two wall-clock times.
//!
//! Durations are computed on time-of-day alone, never on resolved instants: an
//! end at or before the start is taken to be on the following day.

use crate::session::TimeOfDay;

pub const MINUTES_PER_DAY: u32 = 1440;

/// Minutes from `start` to `end`, wrapping past midnight when `end <= start`.
///
/// Equal times yield [`MINUTES_PER_DAY`]; see [`is_degenerate`].
///
/// # Examples
///
/// ```
/// use sleep_engine::duration_minutes;
///
/// assert_eq!(duration_minutes("13:00".parse().unwrap(), "14:30".parse().unwrap()), 90);
/// assert_eq!(duration_minutes("23:00".parse().unwrap(), "00:30".parse().unwrap()), 90);
/// ```
pub fn duration_minutes(start: TimeOfDay, end: TimeOfDay) -> u32 {
    let start = start.minutes_since_midnight();
    let mut end = end.minutes_since_midnight();
    if end <= start {
        end += MINUTES_PER_DAY;
    }
    end - start
}

/// Whether a duration means start and end are the same instant.
pub fn is_degenerate(minutes: u32) -> bool {
    minutes == 0 || minutes == MINUTES_PER_DAY
}
