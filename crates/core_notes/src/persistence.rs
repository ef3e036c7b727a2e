use chrono::{DateTime, Utc};
use core_types::{KeyValueStore, Note, NoteId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const NOTES_KEY: &str = "notes";
pub const CURRENT_BLOB_VERSION: u32 = 1;

const LEGACY_EPOCH_UNIX_SECS: i64 = 978_307_200;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize notes: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("stored notes are unreadable: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("stored notes use schema version {found}, newest supported is {supported}")]
    UnsupportedSchema { found: u64, supported: u32 },
    #[error("note storage failed: {0:#}")]
    Storage(anyhow::Error),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotesBlob {
    schema_version: u32,
    notes: Vec<NoteRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord {
    id: NoteId,
    title: String,
    content: String,
    is_pinned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyNoteRecord {
    id: NoteId,
    title: String,
    content: String,
    is_pinned: bool,
    created_at: f64,
    updated_at: f64,
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            is_pinned: note.is_pinned,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Note::from_parts(
            record.id,
            record.title,
            record.content,
            record.is_pinned,
            record.created_at,
            record.updated_at,
        )
    }
}

impl TryFrom<LegacyNoteRecord> for Note {
    type Error = PersistError;

    fn try_from(record: LegacyNoteRecord) -> Result<Self, Self::Error> {
        Ok(Note::from_parts(
            record.id,
            record.title,
            record.content,
            record.is_pinned,
            legacy_timestamp(record.created_at)?,
            legacy_timestamp(record.updated_at)?,
        ))
    }
}

fn legacy_timestamp(secs: f64) -> Result<DateTime<Utc>, PersistError> {
    let millis = (secs * 1000.0).round() as i64;
    LEGACY_EPOCH_UNIX_SECS
        .checked_mul(1000)
        .and_then(|epoch| epoch.checked_add(millis))
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| {
            PersistError::Parse(<serde_json::Error as serde::de::Error>::custom(format!(
                "legacy timestamp {secs} is out of range"
            )))
        })
}

pub struct NotePersistence {
    store: Box<dyn KeyValueStore>,
}

impl NotePersistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn save(&self, notes: &[Note]) -> Result<(), PersistError> {
        let blob = NotesBlob {
            schema_version: CURRENT_BLOB_VERSION,
            notes: notes.iter().map(NoteRecord::from).collect(),
        };
        let text = serde_json::to_string(&blob).map_err(PersistError::Serialize)?;
        self.store
            .set(NOTES_KEY, &text)
            .map_err(PersistError::Storage)?;
        debug!(count = notes.len(), bytes = text.len(), "notes saved");
        Ok(())
    }

    pub fn load(&self) -> Vec<Note> {
        match self.try_load() {
            Ok(Some(notes)) => notes,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("ignoring stored notes: {err}");
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<Vec<Note>>, PersistError> {
        let Some(text) = self.store.get(NOTES_KEY).map_err(PersistError::Storage)? else {
            return Ok(None);
        };

        let raw: Value = serde_json::from_str(&text).map_err(PersistError::Parse)?;
        let notes = if raw.is_array() {
            let records: Vec<LegacyNoteRecord> =
                serde_json::from_value(raw).map_err(PersistError::Parse)?;
            warn!(count = records.len(), "importing unversioned notes blob");
            records
                .into_iter()
                .map(Note::try_from)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let found = raw
                .get("schemaVersion")
                .and_then(Value::as_u64)
                .unwrap_or_default();
            if found > u64::from(CURRENT_BLOB_VERSION) {
                return Err(PersistError::UnsupportedSchema {
                    found,
                    supported: CURRENT_BLOB_VERSION,
                });
            }
            let blob: NotesBlob = serde_json::from_value(raw).map_err(PersistError::Parse)?;
            blob.notes.into_iter().map(Note::from).collect()
        };

        Ok(Some(dedup_ids(notes)))
    }
}

fn dedup_ids(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = std::collections::HashSet::with_capacity(notes.len());
    let total = notes.len();
    let unique: Vec<Note> = notes.into_iter().filter(|note| seen.insert(note.id)).collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "dropped notes with duplicate ids"
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use chrono::TimeZone;
    use storage_json::MemoryStore;

    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            bail!("disk unplugged")
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            bail!("disk unplugged")
        }

        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            bail!("disk unplugged")
        }
    }

    fn sample_notes() -> Vec<Note> {
        let created = Utc
            .with_ymd_and_hms(2024, 10, 15, 9, 30, 0)
            .single()
            .expect("valid date");
        let updated = created + chrono::Duration::nanoseconds(1_234_567_891);
        vec![
            Note::from_parts(
                NoteId::new_v4(),
                "Courses",
                "lait, œufs",
                true,
                created,
                updated,
            ),
            Note::new("Travail", "rapport"),
        ]
    }

    #[test]
    fn save_then_load_roundtrips_every_field() {
        let kv = MemoryStore::new();
        let persistence = NotePersistence::new(kv.clone());
        let notes = sample_notes();

        persistence.save(&notes).expect("save");
        assert_eq!(persistence.load(), notes);

        let reopened = NotePersistence::new(kv);
        assert_eq!(reopened.load(), notes);
    }

    #[test]
    fn blob_carries_schema_version() {
        let kv = MemoryStore::new();
        NotePersistence::new(kv.clone())
            .save(&sample_notes())
            .expect("save");

        let text = kv.get(NOTES_KEY).expect("read").expect("blob present");
        let raw: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(raw["schemaVersion"], CURRENT_BLOB_VERSION);
        assert_eq!(raw["notes"][0]["isPinned"], true);
    }

    #[test]
    fn missing_blob_loads_empty() {
        let persistence = NotePersistence::new(MemoryStore::new());
        assert!(persistence.try_load().expect("try_load").is_none());
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let kv = MemoryStore::new();
        kv.set(NOTES_KEY, "{\"schemaVersion\": 1, \"notes\": [")
            .expect("seed");
        let persistence = NotePersistence::new(kv);

        assert!(matches!(persistence.try_load(), Err(PersistError::Parse(_))));
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn newer_schema_loads_empty() {
        let kv = MemoryStore::new();
        kv.set(NOTES_KEY, r#"{"schemaVersion": 7, "notes": []}"#)
            .expect("seed");
        let persistence = NotePersistence::new(kv);

        assert!(matches!(
            persistence.try_load(),
            Err(PersistError::UnsupportedSchema { found: 7, .. })
        ));
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn imports_legacy_array_blob() {
        let kv = MemoryStore::new();
        kv.set(
            NOTES_KEY,
            r#"[{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","title":"Courses","content":"lait","isPinned":true,"createdAt":750000000,"updatedAt":750000000.5}]"#,
        )
        .expect("seed");
        let persistence = NotePersistence::new(kv);

        let notes = persistence.load();
        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert_eq!(
            note.id,
            NoteId::parse_str("e621e1f8-c36c-495a-93fc-0c247a3e6e5f").expect("uuid")
        );
        assert!(note.is_pinned);
        assert_eq!(note.created_at.timestamp(), 1_728_307_200);
        assert_eq!(
            note.updated_at - note.created_at,
            chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let kv = MemoryStore::new();
        let persistence = NotePersistence::new(kv);
        let first = Note::new("first", "a");
        let mut clash = Note::new("second", "b");
        clash.id = first.id;

        persistence
            .save(&[first.clone(), clash])
            .expect("save");
        assert_eq!(persistence.load(), vec![first]);
    }

    #[test]
    fn storage_failures_surface_on_save() {
        let persistence = NotePersistence::new(BrokenStore);
        let err = persistence.save(&sample_notes()).expect_err("must fail");
        assert!(matches!(err, PersistError::Storage(_)));
        assert!(err.to_string().contains("disk unplugged"));
        assert!(persistence.load().is_empty());
    }
}
