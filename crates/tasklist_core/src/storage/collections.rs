//! Mirrors the pending and finished collections into a [`KeyValueStore`].

use crate::error::AppError;
use crate::model::Task;
use crate::storage::KeyValueStore;
use serde::Deserialize;
use std::collections::HashSet;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const PENDING_KEY: &str = "todo-tasks";
pub const FINISHED_KEY: &str = "finished-tasks";
/// Key an early release wrote finished tasks under.
pub const LEGACY_FINISHED_KEY: &str = "completed_tasks";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    pub pending: Vec<Task>,
    pub finished: Vec<Task>,
    /// Set when finished tasks were read from [`LEGACY_FINISHED_KEY`].
    pub legacy_finished: bool,
}

/// Reads both collections. Missing or unparsable values load as empty, and
/// records are filed by their `finishedAt` regardless of the key they were
/// stored under. Records in the browser widget's shape are converted.
pub fn load_collections(store: &impl KeyValueStore) -> Result<Collections, AppError> {
    let stored_pending = read_tasks(store, PENDING_KEY)?;
    let (stored_finished, legacy_finished) = match store.get(FINISHED_KEY)? {
        Some(_) => (read_tasks(store, FINISHED_KEY)?, false),
        None => {
            let legacy = read_tasks(store, LEGACY_FINISHED_KEY)?;
            let found = !legacy.is_empty();
            (legacy, found)
        }
    };

    let mut collections = Collections {
        legacy_finished,
        ..Collections::default()
    };
    let mut seen = HashSet::new();

    for task in stored_pending.into_iter().chain(stored_finished) {
        if !seen.insert(task.id.clone()) {
            tracing::warn!(id = %task.id, "dropping stored task with repeated id");
            continue;
        }
        if task.is_finished() {
            collections.finished.push(task);
        } else {
            collections.pending.push(task);
        }
    }

    Ok(collections)
}

/// Overwrites both keys in one commit and drops the legacy key if asked.
pub fn persist_collections(
    store: &mut impl KeyValueStore,
    pending: &[Task],
    finished: &[Task],
    drop_legacy: bool,
) -> Result<(), AppError> {
    let writes = [
        (PENDING_KEY, encode(pending)?),
        (FINISHED_KEY, encode(finished)?),
    ];
    let removals: &[&str] = if drop_legacy {
        &[LEGACY_FINISHED_KEY]
    } else {
        &[]
    };
    store.commit(&writes, removals)
}

/// A task as the browser widget saved it: dates are epoch milliseconds and
/// finishing wrapped the text in `<strike>` tags.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WidgetRecord {
    id: String,
    text: String,
    created_date: i64,
    #[serde(default)]
    finished_date: Option<i64>,
}

impl WidgetRecord {
    fn into_task(self) -> Result<Task, AppError> {
        let finished_at = self.finished_date.map(millis_to_rfc3339).transpose()?;
        let text = if finished_at.is_some() {
            strip_strike(&self.text)
        } else {
            self.text
        };

        Ok(Task {
            id: self.id,
            text,
            created_at: millis_to_rfc3339(self.created_date)?,
            finished_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Current(Task),
    Widget(WidgetRecord),
}

fn read_tasks(store: &impl KeyValueStore, key: &str) -> Result<Vec<Task>, AppError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    let records = match serde_json::from_str::<Option<Vec<StoredRecord>>>(&raw) {
        Ok(records) => records.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring malformed stored tasks");
            return Ok(Vec::new());
        }
    };

    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        match record {
            StoredRecord::Current(task) => tasks.push(task),
            StoredRecord::Widget(record) => {
                let id = record.id.clone();
                match record.into_task() {
                    Ok(task) => tasks.push(task),
                    Err(err) => {
                        tracing::warn!(key, id = %id, error = %err, "dropping stored record");
                    }
                }
            }
        }
    }
    Ok(tasks)
}

fn millis_to_rfc3339(millis: i64) -> Result<String, AppError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|err| AppError::invalid_data(err.to_string()))?
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn strip_strike(text: &str) -> String {
    text.strip_prefix("<strike>")
        .and_then(|inner| inner.strip_suffix("</strike>"))
        .unwrap_or(text)
        .to_string()
}

fn encode(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        FINISHED_KEY, LEGACY_FINISHED_KEY, PENDING_KEY, load_collections, persist_collections,
        strip_strike,
    };
    use crate::model::Task;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn task(id: &str, text: &str, finished_at: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            created_at: "2025-12-20T00:00:00Z".to_string(),
            finished_at: finished_at.map(str::to_string),
        }
    }

    #[test]
    fn empty_store_loads_empty_collections() {
        let collections = load_collections(&MemoryStore::new()).unwrap();

        assert!(collections.pending.is_empty());
        assert!(collections.finished.is_empty());
        assert!(!collections.legacy_finished);
    }

    #[test]
    fn malformed_value_loads_empty_but_keeps_other_key() {
        let finished = vec![task("2", "done", Some("2025-12-21T00:00:00Z"))];
        let store = MemoryStore::with_entries([
            (PENDING_KEY, "{ nope".to_string()),
            (FINISHED_KEY, serde_json::to_string(&finished).unwrap()),
        ]);

        let collections = load_collections(&store).unwrap();

        assert!(collections.pending.is_empty());
        assert_eq!(collections.finished, finished);
    }

    #[test]
    fn null_value_loads_empty() {
        let store = MemoryStore::with_entries([(PENDING_KEY, "null")]);

        let collections = load_collections(&store).unwrap();

        assert!(collections.pending.is_empty());
    }

    #[test]
    fn persist_then_load_round_trip() {
        let pending = vec![task("1", "a", None), task("3", "c", None)];
        let finished = vec![task("2", "b", Some("2025-12-21T08:30:00Z"))];
        let mut store = MemoryStore::new();

        persist_collections(&mut store, &pending, &finished, false).unwrap();
        let collections = load_collections(&store).unwrap();

        assert_eq!(collections.pending, pending);
        assert_eq!(collections.finished, finished);
    }

    #[test]
    fn records_are_filed_by_finished_at() {
        let store = MemoryStore::with_entries([
            (
                PENDING_KEY,
                serde_json::to_string(&[task("1", "a", Some("2025-12-21T00:00:00Z"))]).unwrap(),
            ),
            (
                FINISHED_KEY,
                serde_json::to_string(&[task("2", "b", None)]).unwrap(),
            ),
        ]);

        let collections = load_collections(&store).unwrap();

        assert_eq!(collections.pending[0].id, "2");
        assert_eq!(collections.finished[0].id, "1");
    }

    #[test]
    fn repeated_ids_keep_first_record() {
        let store = MemoryStore::with_entries([
            (
                PENDING_KEY,
                serde_json::to_string(&[task("1", "a", None)]).unwrap(),
            ),
            (
                FINISHED_KEY,
                serde_json::to_string(&[task("1", "a", Some("2025-12-21T00:00:00Z"))]).unwrap(),
            ),
        ]);

        let collections = load_collections(&store).unwrap();

        assert_eq!(collections.pending.len(), 1);
        assert!(collections.finished.is_empty());
    }

    #[test]
    fn legacy_key_loads_and_is_dropped_on_persist() {
        let legacy = vec![task("9", "old", Some("2025-12-21T00:00:00Z"))];
        let mut store = MemoryStore::with_entries([(
            LEGACY_FINISHED_KEY,
            serde_json::to_string(&legacy).unwrap(),
        )]);

        let collections = load_collections(&store).unwrap();
        assert!(collections.legacy_finished);
        assert_eq!(collections.finished, legacy);

        persist_collections(
            &mut store,
            &collections.pending,
            &collections.finished,
            collections.legacy_finished,
        )
        .unwrap();

        assert_eq!(store.get(LEGACY_FINISHED_KEY).unwrap(), None);
        assert!(store.get(FINISHED_KEY).unwrap().is_some());
    }

    #[test]
    fn widget_records_are_converted() {
        let store = MemoryStore::with_entries([
            (
                PENDING_KEY,
                r#"[{"id":"6188800000","text":"Buy milk","createdDate":1766188800000}]"#,
            ),
            (
                LEGACY_FINISHED_KEY,
                r#"[{"id":"6188700000","text":"<strike>Pay rent</strike>","createdDate":1766102400000,"finishedDate":1766131200000}]"#,
            ),
        ]);

        let collections = load_collections(&store).unwrap();

        assert!(collections.legacy_finished);
        assert_eq!(collections.pending, vec![task("6188800000", "Buy milk", None)]);
        assert_eq!(collections.finished.len(), 1);
        let finished = &collections.finished[0];
        assert_eq!(finished.id, "6188700000");
        assert_eq!(finished.text, "Pay rent");
        assert_eq!(finished.created_at, "2025-12-19T00:00:00Z");
        assert_eq!(finished.finished_at.as_deref(), Some("2025-12-19T08:00:00Z"));
    }

    #[test]
    fn current_and_widget_records_mix_in_one_value() {
        let store = MemoryStore::with_entries([(
            PENDING_KEY,
            r#"[{"id":"1","text":"a","createdAt":"2025-12-20T00:00:00Z"},{"id":"2","text":"b","createdDate":1766188800000}]"#,
        )]);

        let collections = load_collections(&store).unwrap();

        assert_eq!(collections.pending, vec![task("1", "a", None), task("2", "b", None)]);
    }

    #[test]
    fn strip_strike_only_removes_full_wrapper() {
        assert_eq!(strip_strike("<strike>done</strike>"), "done");
        assert_eq!(strip_strike("<strike>half"), "<strike>half");
        assert_eq!(strip_strike("plain"), "plain");
    }
}
