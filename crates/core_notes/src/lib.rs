pub mod auth;
pub mod draft;
pub mod persistence;
pub mod store;

pub use auth::{AuthError, AuthGate, FixedCredentials};
pub use draft::{DraftError, NoteDraft};
pub use persistence::{CURRENT_BLOB_VERSION, NOTES_KEY, NotePersistence, PersistError};
pub use store::{GroupedNotes, NotesStore};
