//! # sleep-engine
//!
//! Deterministic time resolution and validation for logged sleep sessions.
//!
//! Caregivers enter a start and an optional end as bare `HH:MM` values against
//! a selected calendar date. This crate turns those entries into absolute
//! instants (handling naps and nights that cross midnight, and bedtimes that
//! fall just after midnight), judges whether the duration is plausible for the
//! category, and derives the relative labels shown next to an entry.
//!
//! Every function is pure. The caller supplies "now" explicitly.
//!
//! ## Modules
//!
//! - [`session`] — `SleepCategory`, `TimeOfDay`, `SessionDraft`, `ResolvedSession`
//! - [`resolver`] — time-of-day + selected date → absolute instants
//! - [`duration`] — midnight-aware elapsed minutes
//! - [`validation`] — category thresholds → ok / warn / error
//! - [`labels`] — "45 min ago", "Yesterday", "1h 30 min"
//! - [`editor`] — draft ownership and the single-outstanding-save gate
//! - [`error`] — Error types

pub mod duration;
pub mod editor;
pub mod error;
pub mod labels;
pub mod resolver;
pub mod session;
pub mod validation;

pub use duration::{duration_minutes, is_degenerate, MINUTES_PER_DAY};
pub use editor::{EntryEditor, EntryId, SaveRequest, SessionStore};
pub use error::{EngineError, Result};
pub use labels::{
    format_duration, format_minutes, format_relative_end, relative_end_label, DisplayLabels,
    LabelTicker, DEFAULT_REFRESH_SECONDS, IN_PROGRESS_LABEL,
};
pub use resolver::{
    is_post_midnight_bedtime, resolve, resolve_end, resolve_start, LAST_POST_MIDNIGHT_HOUR,
};
pub use session::{parse_date, ResolvedSession, SessionDraft, SleepCategory, TimeOfDay};
pub use validation::{
    classify, classify_with, Severity, Thresholds, ValidationIssue, ValidationResult,
};
