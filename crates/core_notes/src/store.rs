use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use core_types::{Note, NoteId, SortOption};
use tracing::{debug, info, warn};

use crate::persistence::{NotePersistence, PersistError};

type Clock = Box<dyn Fn() -> DateTime<Utc>>;
type PersistErrorHandler = Box<dyn Fn(&PersistError)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedNotes<'a> {
    pub pinned: Vec<&'a Note>,
    pub others: Vec<&'a Note>,
}

pub struct NotesStore {
    notes: Vec<Note>,
    sort_option: SortOption,
    persistence: NotePersistence,
    clock: Clock,
    on_persist_error: Option<PersistErrorHandler>,
}

impl NotesStore {
    pub fn open(persistence: NotePersistence) -> Self {
        let notes = persistence.load();
        info!(count = notes.len(), "notes store opened");
        Self {
            notes,
            sort_option: SortOption::default(),
            persistence,
            clock: Box::new(Utc::now),
            on_persist_error: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn on_persist_error(&mut self, handler: impl Fn(&PersistError) + 'static) {
        self.on_persist_error = Some(Box::new(handler));
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    pub fn set_sort_option(&mut self, option: SortOption) {
        self.sort_option = option;
    }

    pub fn add(&mut self, note: Note) {
        debug!(id = %note.id, "adding note");
        self.notes.push(note);
        self.persist();
    }

    pub fn delete_at(&mut self, offsets: &[usize]) {
        let offsets: BTreeSet<usize> = offsets
            .iter()
            .copied()
            .filter(|&offset| offset < self.notes.len())
            .collect();
        if offsets.is_empty() {
            return;
        }

        for offset in offsets.into_iter().rev() {
            let removed = self.notes.remove(offset);
            debug!(id = %removed.id, "deleted note");
        }
        self.persist();
    }

    pub fn delete_by_id(&mut self, id: NoteId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.notes.remove(index);
        debug!(%id, "deleted note");
        self.persist();
        true
    }

    pub fn update(&mut self, note: Note) -> bool {
        let Some(index) = self.position(note.id) else {
            debug!(id = %note.id, "update ignored, note not found");
            return false;
        };

        let created_at = self.notes[index].created_at;
        let updated_at = self.refreshed_at(created_at);
        self.notes[index] = Note {
            created_at,
            updated_at,
            ..note
        };
        self.persist();
        true
    }

    pub fn toggle_pin(&mut self, id: NoteId) -> Option<bool> {
        let index = self.position(id)?;
        let updated_at = self.refreshed_at(self.notes[index].created_at);

        let note = &mut self.notes[index];
        note.is_pinned = !note.is_pinned;
        note.updated_at = updated_at;
        let is_pinned = note.is_pinned;

        self.persist();
        Some(is_pinned)
    }

    pub fn derived_view(&self) -> Vec<&Note> {
        let mut view: Vec<&Note> = self.notes.iter().collect();
        view.sort_by(|a, b| self.sort_option.compare(a, b));
        view.sort_by_key(|note| !note.is_pinned);
        view
    }

    pub fn grouped_view(&self) -> GroupedNotes<'_> {
        let (pinned, others): (Vec<&Note>, Vec<&Note>) = self
            .derived_view()
            .into_iter()
            .partition(|note| note.is_pinned);
        GroupedNotes { pinned, others }
    }

    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    // never earlier than creation, even if the clock stepped back
    fn refreshed_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        (self.clock)().max(created_at)
    }

    fn persist(&self) {
        if let Err(err) = self.persistence.save(&self.notes) {
            warn!("failed to persist notes: {err}");
            if let Some(handler) = self.on_persist_error.as_ref() {
                handler(&err);
            }
        }
    }
}
