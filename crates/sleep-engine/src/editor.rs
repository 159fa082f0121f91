//! Editing lifecycle for a single entry and the hand-off to storage.
//!
//! An [`EntryEditor`] owns the draft for as long as the editor is open. Saves
//! go through a two-step handshake so that at most one request is outstanding:
//! [`EntryEditor::begin_save`] validates and resolves the draft and marks the
//! save in flight, and [`EntryEditor::finish_save`] reports the storage
//! outcome. A failed save keeps the draft so the caregiver can retry. Dropping
//! the editor discards the draft without writing anything.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::labels::DisplayLabels;
use crate::resolver::resolve;
use crate::session::{ResolvedSession, SessionDraft};
use crate::validation::{classify_with, Thresholds, ValidationResult};

/// Identifier assigned to a persisted entry by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the storage collaborator is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum SaveRequest {
    Create { session: ResolvedSession },
    Update { id: EntryId, session: ResolvedSession },
    Delete { id: EntryId },
}

/// Persistence seam for finalized entries.
pub trait SessionStore {
    type Error: fmt::Display;

    fn create(&mut self, session: &ResolvedSession) -> std::result::Result<EntryId, Self::Error>;
    fn update(
        &mut self,
        id: &EntryId,
        session: &ResolvedSession,
    ) -> std::result::Result<(), Self::Error>;
    fn delete(&mut self, id: &EntryId) -> std::result::Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Save,
    Delete,
}

#[derive(Debug, Clone)]
pub struct EntryEditor {
    draft: SessionDraft,
    entry_id: Option<EntryId>,
    require_end: bool,
    thresholds: Thresholds,
    pending: Option<Pending>,
    last_error: Option<String>,
}

impl EntryEditor {
    /// Editor for a new entry.
    pub fn new(draft: SessionDraft) -> Self {
        Self {
            draft,
            entry_id: None,
            require_end: false,
            thresholds: Thresholds::default(),
            pending: None,
            last_error: None,
        }
    }

    /// Editor for an existing entry, seeded from its persisted instants.
    pub fn for_entry(id: EntryId, session: &ResolvedSession) -> Self {
        Self {
            entry_id: Some(id),
            ..Self::new(SessionDraft::from_resolved(session))
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Require an end time, e.g. when logging a wake-up with no open night.
    pub fn with_require_end(mut self, require_end: bool) -> Self {
        self.require_end = require_end;
        self
    }

    pub fn draft(&self) -> &SessionDraft {
        &self.draft
    }

    /// Replace the draft after an edit.
    pub fn set_draft(&mut self, draft: SessionDraft) {
        self.draft = draft;
    }

    pub fn entry_id(&self) -> Option<&EntryId> {
        self.entry_id.as_ref()
    }

    pub fn validation(&self) -> ValidationResult {
        classify_with(
            &self.thresholds,
            self.draft.category,
            self.draft.start,
            self.draft.end,
            self.require_end,
        )
    }

    pub fn labels(&self, now: NaiveDateTime) -> DisplayLabels {
        DisplayLabels::for_draft(&self.draft, now)
    }

    pub fn is_saving(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the save control should be enabled.
    pub fn can_save(&self) -> bool {
        !self.is_saving() && self.validation().is_valid
    }

    /// Message from the most recent failed save, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Validate and resolve the draft, and mark a save in flight.
    ///
    /// # Errors
    ///
    /// [`EngineError::SaveInFlight`] while a previous request is outstanding;
    /// [`EngineError::Validation`] when the draft classifies as an error.
    pub fn begin_save(&mut self) -> Result<SaveRequest> {
        let (id, session) = self.start_save()?;
        let request = match id {
            Some(id) => SaveRequest::Update { id, session },
            None => SaveRequest::Create { session },
        };
        log::info!("save started: {request:?}");
        Ok(request)
    }

    fn start_save(&mut self) -> Result<(Option<EntryId>, ResolvedSession)> {
        if self.is_saving() {
            return Err(EngineError::SaveInFlight);
        }
        let validation = self.validation();
        if !validation.is_valid {
            return Err(EngineError::Validation(
                validation.message.unwrap_or_default(),
            ));
        }
        self.pending = Some(Pending::Save);
        Ok((self.entry_id.clone(), resolve(&self.draft)))
    }

    /// Report the storage outcome of the in-flight save.
    ///
    /// On success the returned id becomes the entry being edited, so a later
    /// save updates instead of creating again.
    pub fn finish_save(&mut self, outcome: std::result::Result<EntryId, String>) -> Result<()> {
        if self.pending != Some(Pending::Save) {
            return Err(EngineError::NoSaveInFlight);
        }
        self.pending = None;
        match outcome {
            Ok(id) => {
                log::info!("save completed for entry {id}");
                self.entry_id = Some(id);
                self.last_error = None;
            }
            Err(message) => {
                log::warn!("save failed, draft kept for retry: {message}");
                self.last_error = Some(message);
            }
        }
        Ok(())
    }

    /// Ask storage to delete the entry being edited.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoEntry`] for a draft that was never saved;
    /// [`EngineError::SaveInFlight`] while another request is outstanding.
    pub fn begin_delete(&mut self) -> Result<SaveRequest> {
        let id = self.start_delete()?;
        log::info!("delete started for entry {id}");
        Ok(SaveRequest::Delete { id })
    }

    fn start_delete(&mut self) -> Result<EntryId> {
        if self.is_saving() {
            return Err(EngineError::SaveInFlight);
        }
        let id = self.entry_id.clone().ok_or(EngineError::NoEntry)?;
        self.pending = Some(Pending::Delete);
        Ok(id)
    }

    pub fn finish_delete(&mut self, outcome: std::result::Result<(), String>) -> Result<()> {
        if self.pending != Some(Pending::Delete) {
            return Err(EngineError::NoSaveInFlight);
        }
        self.pending = None;
        match outcome {
            Ok(()) => {
                log::info!("delete completed");
                self.entry_id = None;
                self.last_error = None;
            }
            Err(message) => {
                log::warn!("delete failed: {message}");
                self.last_error = Some(message);
            }
        }
        Ok(())
    }

    /// Run a full save against a synchronous store.
    pub fn save_with<S: SessionStore>(&mut self, store: &mut S) -> Result<EntryId> {
        let (id, session) = self.start_save()?;
        let outcome = match id {
            Some(id) => store.update(&id, &session).map(|()| id),
            None => store.create(&session),
        }
        .map_err(|e| e.to_string());

        self.finish_save(outcome.clone())?;
        outcome.map_err(EngineError::Storage)
    }

    /// Run a full delete against a synchronous store.
    pub fn delete_with<S: SessionStore>(&mut self, store: &mut S) -> Result<()> {
        let id = self.start_delete()?;
        let outcome = store.delete(&id).map_err(|e| e.to_string());
        self.finish_delete(outcome.clone())?;
        outcome.map_err(EngineError::Storage)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SleepCategory, TimeOfDay};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn nap(start: &str, end: Option<&str>) -> SessionDraft {
        SessionDraft::new(
            SleepCategory::Nap,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            t(start),
            end.map(t),
        )
    }

    #[derive(Default)]
    struct MemoryStore {
        entries: HashMap<EntryId, ResolvedSession>,
        next_id: u32,
        fail_next: bool,
    }

    impl SessionStore for MemoryStore {
        type Error = String;

        fn create(&mut self, session: &ResolvedSession) -> std::result::Result<EntryId, String> {
            if std::mem::take(&mut self.fail_next) {
                return Err("network unreachable".to_string());
            }
            self.next_id += 1;
            let id = EntryId::new(format!("entry-{}", self.next_id));
            self.entries.insert(id.clone(), *session);
            Ok(id)
        }

        fn update(
            &mut self,
            id: &EntryId,
            session: &ResolvedSession,
        ) -> std::result::Result<(), String> {
            match self.entries.get_mut(id) {
                Some(slot) => {
                    *slot = *session;
                    Ok(())
                }
                None => Err(format!("unknown entry {id}")),
            }
        }

        fn delete(&mut self, id: &EntryId) -> std::result::Result<(), String> {
            self.entries
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| format!("unknown entry {id}"))
        }
    }

    #[test]
    fn test_second_save_refused_while_first_in_flight() {
        let mut editor = EntryEditor::new(nap("13:00", Some("14:00")));
        assert!(editor.can_save());
        let request = editor.begin_save().unwrap();
        assert!(matches!(request, SaveRequest::Create { .. }));
        assert!(!editor.can_save());
        assert_eq!(editor.begin_save().unwrap_err(), EngineError::SaveInFlight);

        editor.finish_save(Ok(EntryId::new("a1"))).unwrap();
        assert!(!editor.is_saving());
        assert_eq!(editor.entry_id(), Some(&EntryId::new("a1")));
        assert!(matches!(editor.begin_save().unwrap(), SaveRequest::Update { .. }));
    }

    #[test]
    fn test_invalid_draft_cannot_be_saved() {
        let mut editor = EntryEditor::new(nap("13:00", Some("19:30")));
        assert!(!editor.can_save());
        assert_eq!(
            editor.begin_save().unwrap_err(),
            EngineError::Validation("exceeds 5 hours".to_string())
        );
        assert!(!editor.is_saving());
    }

    #[test]
    fn test_warning_does_not_block_save() {
        let mut editor = EntryEditor::new(nap("23:00", Some("00:30")));
        assert!(editor.validation().is_warning());
        assert!(editor.begin_save().is_ok());
    }

    #[test]
    fn test_require_end_blocks_ongoing_draft() {
        let editor = EntryEditor::new(nap("13:00", None)).with_require_end(true);
        assert!(!editor.can_save());
        assert_eq!(editor.validation().message.as_deref(), Some("missing end time"));
    }

    #[test]
    fn test_failed_save_keeps_draft_for_retry() {
        let draft = nap("13:00", Some("14:00"));
        let mut store = MemoryStore {
            fail_next: true,
            ..Default::default()
        };
        let mut editor = EntryEditor::new(draft);

        let err = editor.save_with(&mut store).unwrap_err();
        assert_eq!(err, EngineError::Storage("network unreachable".to_string()));
        assert_eq!(editor.last_error(), Some("network unreachable"));
        assert_eq!(editor.draft(), &draft);
        assert!(editor.can_save());

        let id = editor.save_with(&mut store).unwrap();
        assert_eq!(editor.last_error(), None);
        assert_eq!(store.entries[&id].start.to_string(), "2024-03-10 13:00:00");
    }

    #[test]
    fn test_edit_existing_entry_updates_in_place() {
        let mut store = MemoryStore::default();
        let mut editor = EntryEditor::new(SessionDraft::new(
            SleepCategory::Night,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            t("01:30"),
            None,
        ));
        let id = editor.save_with(&mut store).unwrap();

        let mut editor = EntryEditor::for_entry(id.clone(), &store.entries[&id]);
        assert_eq!(editor.draft().start, t("01:30"));
        assert_eq!(
            editor.draft().selected_date,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        let edited = editor.draft().with_end(Some(t("07:00")));
        editor.set_draft(edited);
        assert_eq!(editor.save_with(&mut store).unwrap(), id);
        assert_eq!(store.entries.len(), 1);
        assert_eq!(
            store.entries[&id].end.map(|e| e.to_string()),
            Some("2024-03-10 07:00:00".to_string())
        );
    }

    #[test]
    fn test_delete_requires_saved_entry() {
        let mut store = MemoryStore::default();
        let mut editor = EntryEditor::new(nap("13:00", Some("14:00")));
        assert_eq!(editor.delete_with(&mut store).unwrap_err(), EngineError::NoEntry);

        editor.save_with(&mut store).unwrap();
        editor.delete_with(&mut store).unwrap();
        assert!(store.entries.is_empty());
        assert_eq!(editor.entry_id(), None);
    }

    #[test]
    fn test_finish_without_pending_request() {
        let mut editor = EntryEditor::new(nap("13:00", Some("14:00")));
        assert_eq!(
            editor.finish_save(Ok(EntryId::new("x"))).unwrap_err(),
            EngineError::NoSaveInFlight
        );
        assert_eq!(editor.finish_delete(Ok(())).unwrap_err(), EngineError::NoSaveInFlight);
    }

    #[test]
    fn test_save_request_json_shape() {
        let mut editor = EntryEditor::for_entry(
            EntryId::new("e7"),
            &resolve(&nap("13:00", Some("14:00"))),
        );
        let json = serde_json::to_value(editor.begin_save().unwrap()).unwrap();
        assert_eq!(json["op"], "update");
        assert_eq!(json["id"], "e7");
        assert_eq!(json["session"]["category"], "nap");
        assert_eq!(json["session"]["start"], "2024-03-10T13:00:00");
    }
}
