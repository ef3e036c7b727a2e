use core_types::Note;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("content must not be empty")]
    EmptyContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, is_pinned: bool) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            is_pinned,
        }
    }

    pub fn from_note(note: &Note) -> Self {
        Self::new(note.title.clone(), note.content.clone(), note.is_pinned)
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if self.content.is_empty() {
            return Err(DraftError::EmptyContent);
        }
        Ok(())
    }

    pub fn into_new_note(self) -> Note {
        Note::new(self.title, self.content).with_pinned(self.is_pinned)
    }

    pub fn apply_to(self, note: &Note) -> Note {
        Note {
            title: self.title,
            content: self.content,
            is_pinned: self.is_pinned,
            ..note.clone()
        }
    }
}
