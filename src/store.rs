//! SQLite-backed record store.
//!
//! The store is the only durable owner of records. Callers describe each
//! mutation as a [`StoreOp`] and match on the returned [`StoreOutcome`];
//! the in-memory working set is only updated after `apply` succeeds.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{MemfogError, Result};
use crate::memory::{Record, RecordChanges, RecordDraft, RecordId};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS record (
    row      INTEGER PRIMARY KEY,
    title    TEXT NOT NULL,
    keywords TEXT NOT NULL DEFAULT '',
    body     TEXT NOT NULL DEFAULT ''
)";

/// A single mutation against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Insert(RecordDraft),
    Update {
        id: RecordId,
        changes: RecordChanges,
    },
    Delete(RecordId),
    /// Inserted atomically: either every draft lands or none does.
    BulkInsert(Vec<RecordDraft>),
}

/// What a successful [`StoreOp`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Ids assigned to inserted drafts, in input order.
    Inserted(Vec<RecordId>),
    Updated(RecordId),
    Deleted(RecordId),
}

/// Persistence boundary consumed by the interactive session.
pub trait RecordStore {
    /// Every record, ordered by id.
    fn load_all(&self) -> Result<Vec<Record>>;

    fn apply(&mut self, op: StoreOp) -> Result<StoreOutcome>;
}

/// Record store in a single SQLite database file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemfogError::Config(format!(
                    "Failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        info!(path = %path.display(), "Opened record store");
        Self::with_connection(conn)
    }

    /// Private in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn insert_one(conn: &Connection, draft: &RecordDraft) -> Result<RecordId> {
        conn.execute(
            "INSERT INTO record (title, keywords, body) VALUES (?1, ?2, ?3)",
            params![draft.title, draft.keywords, draft.body],
        )?;
        Ok(RecordId(conn.last_insert_rowid()))
    }

    fn update(&mut self, id: RecordId, changes: &RecordChanges) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut touched = 0;
        for (column, value) in [
            ("title", &changes.title),
            ("keywords", &changes.keywords),
            ("body", &changes.body),
        ] {
            if let Some(value) = value {
                // Column names come from the fixed list above.
                let sql = format!("UPDATE record SET {} = ?1 WHERE row = ?2", column);
                touched += tx.execute(&sql, params![value, id.0])?;
            }
        }
        if touched == 0 && !changes.is_empty() {
            return Err(MemfogError::NotFound(format!("record {}", id)));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete(&mut self, id: RecordId) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM record WHERE row = ?1", params![id.0])?;
        if removed == 0 {
            return Err(MemfogError::NotFound(format!("record {}", id)));
        }
        Ok(())
    }

    fn bulk_insert(&mut self, drafts: &[RecordDraft]) -> Result<Vec<RecordId>> {
        let tx = self.conn.transaction()?;
        let ids = drafts
            .iter()
            .map(|draft| Self::insert_one(&tx, draft))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(ids)
    }
}

impl RecordStore for SqliteStore {
    fn load_all(&self) -> Result<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare("SELECT row, title, keywords, body FROM record ORDER BY row")?;
        let records = stmt
            .query_map([], |row| {
                Ok(Record {
                    id: RecordId(row.get(0)?),
                    title: row.get(1)?,
                    keywords: row.get(2)?,
                    body: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = records.len(), "Loaded records");
        Ok(records)
    }

    fn apply(&mut self, op: StoreOp) -> Result<StoreOutcome> {
        match op {
            StoreOp::Insert(draft) => {
                let id = Self::insert_one(&self.conn, &draft)?;
                debug!(%id, title = %draft.title, "Inserted record");
                Ok(StoreOutcome::Inserted(vec![id]))
            }
            StoreOp::Update { id, changes } => {
                self.update(id, &changes)?;
                debug!(%id, fields = ?changes.field_names(), "Updated record");
                Ok(StoreOutcome::Updated(id))
            }
            StoreOp::Delete(id) => {
                self.delete(id)?;
                debug!(%id, "Deleted record");
                Ok(StoreOutcome::Deleted(id))
            }
            StoreOp::BulkInsert(drafts) => {
                let ids = self.bulk_insert(&drafts)?;
                info!(count = ids.len(), "Bulk inserted records");
                Ok(StoreOutcome::Inserted(ids))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("in-memory store")
    }

    fn insert(store: &mut SqliteStore, title: &str) -> RecordId {
        match store
            .apply(StoreOp::Insert(RecordDraft::new(title, "kw", "body")))
            .unwrap()
        {
            StoreOutcome::Inserted(ids) => ids[0],
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        assert!(store().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_load() {
        let mut s = store();
        let id = insert(&mut s, "Grocery List");

        let records = s.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].title, "Grocery List");
        assert_eq!(records[0].keywords, "kw");
        assert_eq!(records[0].body, "body");
    }

    #[test]
    fn test_load_all_ordered_by_id() {
        let mut s = store();
        let a = insert(&mut s, "a");
        let b = insert(&mut s, "b");
        let c = insert(&mut s, "c");
        let ids: Vec<RecordId> = s.load_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_update_only_changed_fields() {
        let mut s = store();
        let id = insert(&mut s, "Car Repair");
        let changes = RecordChanges {
            keywords: Some("brakes".to_string()),
            ..Default::default()
        };

        let outcome = s.apply(StoreOp::Update { id, changes }).unwrap();
        assert_eq!(outcome, StoreOutcome::Updated(id));

        let record = &s.load_all().unwrap()[0];
        assert_eq!(record.title, "Car Repair");
        assert_eq!(record.keywords, "brakes");
        assert_eq!(record.body, "body");
    }

    #[test]
    fn test_update_missing_record() {
        let mut s = store();
        let changes = RecordChanges {
            title: Some("x".to_string()),
            ..Default::default()
        };
        let err = s
            .apply(StoreOp::Update {
                id: RecordId(99),
                changes,
            })
            .unwrap_err();
        assert!(matches!(err, MemfogError::NotFound(_)));
    }

    #[test]
    fn test_delete() {
        let mut s = store();
        let keep = insert(&mut s, "keep");
        let gone = insert(&mut s, "gone");

        assert_eq!(
            s.apply(StoreOp::Delete(gone)).unwrap(),
            StoreOutcome::Deleted(gone)
        );
        let ids: Vec<RecordId> = s.load_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[test]
    fn test_delete_missing_record() {
        let err = store().apply(StoreOp::Delete(RecordId(5))).unwrap_err();
        assert!(matches!(err, MemfogError::NotFound(_)));
    }

    #[test]
    fn test_bulk_insert_returns_ids_in_order() {
        let mut s = store();
        let drafts = vec![
            RecordDraft::new("one", "", ""),
            RecordDraft::new("two", "", ""),
        ];
        let ids = match s.apply(StoreOp::BulkInsert(drafts)).unwrap() {
            StoreOutcome::Inserted(ids) => ids,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(ids.len(), 2);

        let titles: Vec<String> = s.load_all().unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["one", "two"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("records.db");
        {
            let mut s = SqliteStore::open(&path).unwrap();
            insert(&mut s, "durable");
        }
        let s = SqliteStore::open(&path).unwrap();
        let records = s.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "durable");
    }
}
