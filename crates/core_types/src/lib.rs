use std::cmp::Ordering;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

pub const DEFAULT_USERNAME: &str = "User";
pub const DEFAULT_PASSWORD: &str = "user";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UiLanguage {
    #[default]
    FrFr,
    EnUs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new_v4(),
            title: title.into(),
            content: content.into(),
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = is_pinned;
        self
    }

    pub fn from_parts(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        is_pinned: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            is_pinned,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    ByTitle,
    ByCreatedAt,
    #[default]
    ByUpdatedAt,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [Self::ByTitle, Self::ByCreatedAt, Self::ByUpdatedAt];

    pub fn label_key(self) -> &'static str {
        match self {
            Self::ByTitle => "sort.title",
            Self::ByCreatedAt => "sort.created_at",
            Self::ByUpdatedAt => "sort.updated_at",
        }
    }

    pub fn compare(self, a: &Note, b: &Note) -> Ordering {
        match self {
            Self::ByTitle => a.title.cmp(&b.title),
            Self::ByCreatedAt => b.created_at.cmp(&a.created_at),
            Self::ByUpdatedAt => b.updated_at.cmp(&a.updated_at),
        }
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn fresh_note_has_equal_timestamps_and_is_unpinned() {
        let note = Note::new("Groceries", "milk");
        assert_eq!(note.created_at, note.updated_at);
        assert!(!note.is_pinned);
        assert!(Note::new("a", "b").with_pinned(true).is_pinned);
    }

    #[test]
    fn fresh_notes_get_distinct_ids() {
        assert_ne!(Note::new("a", "b").id, Note::new("a", "b").id);
    }

    #[test]
    fn default_sort_is_by_updated_at() {
        assert_eq!(SortOption::default(), SortOption::ByUpdatedAt);
    }

    #[test]
    fn date_comparators_put_newest_first() {
        let older = Note::new("a", "x");
        let mut newer = older.clone();
        newer.id = NoteId::new_v4();
        newer.created_at = older.created_at + Duration::seconds(5);
        newer.updated_at = newer.created_at;

        assert_eq!(
            SortOption::ByCreatedAt.compare(&newer, &older),
            Ordering::Less
        );
        assert_eq!(
            SortOption::ByUpdatedAt.compare(&older, &newer),
            Ordering::Greater
        );
    }

    #[test]
    fn title_comparator_is_case_sensitive() {
        let upper = Note::new("Apple", "x");
        let lower = Note::new("banana", "x");
        assert_eq!(SortOption::ByTitle.compare(&upper, &lower), Ordering::Less);
    }
}
