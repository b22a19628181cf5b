//! redb-backed grade store.
//!
//! Layout:
//! - `student_grades`: record id -> postcard-encoded [`GradeRecord`]
//! - `grade_keys`: `(aem, test, year)` -> record id
//! - `meta`: `"next_id"` -> next free record id
//!
//! Every public operation opens exactly one transaction. Write transactions
//! that hit an error are dropped before commit, which aborts them.

use crate::grade::{
    GradeError, GradeFilter, GradeKey, GradeRecord, NewGrade, Page, listing_order, validate_grade,
};
use chrono::Utc;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const GRADES: TableDefinition<u64, &[u8]> = TableDefinition::new("student_grades");
const GRADE_KEYS: TableDefinition<(u32, &str, i32), u64> = TableDefinition::new("grade_keys");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ID: &str = "next_id";
const FIRST_ID: u64 = 1;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from [`GradeStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("record codec error: {0}")]
    Codec(#[from] postcard::Error),

    #[error("grade not found for {0}")]
    NotFound(GradeKey),

    #[error("key index points at missing record {0}")]
    DanglingKey(u64),

    #[error(transparent)]
    Invalid(#[from] GradeError),
}

macro_rules! storage_error {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for StoreError {
                fn from(e: $source) -> Self {
                    Self::Storage(redb::Error::from(e))
                }
            }
        )+
    };
}

storage_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

// =============================================================================
// STORE
// =============================================================================

/// Result of [`GradeStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub id: u64,
    /// `false` when an existing record was overwritten.
    pub created: bool,
}

/// Handle to the grade database. Cloning shares the underlying file.
#[derive(Clone)]
pub struct GradeStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for GradeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradeStore").finish_non_exhaustive()
    }
}

fn encode(record: &GradeRecord) -> Result<Vec<u8>, StoreError> {
    Ok(postcard::to_allocvec(record)?)
}

fn decode(bytes: &[u8]) -> Result<GradeRecord, StoreError> {
    Ok(postcard::from_bytes(bytes)?)
}

/// Tuple form of a key in the `grade_keys` table.
fn index_key(key: &GradeKey) -> (u32, &str, i32) {
    (key.aem, key.test.as_str(), key.year)
}

/// Reserve the next record id inside `txn`.
fn allocate_id(txn: &WriteTransaction) -> Result<u64, StoreError> {
    let mut meta = txn.open_table(META)?;
    let id = meta.get(NEXT_ID)?.map(|g| g.value()).unwrap_or(FIRST_ID);
    meta.insert(NEXT_ID, id + 1)?;
    Ok(id)
}

impl GradeStore {
    /// Open (or create) the database at `path` and make sure every table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref())?;

        let txn = db.begin_write()?;
        {
            txn.open_table(GRADES)?;
            txn.open_table(GRADE_KEYS)?;
            txn.open_table(META)?;
        }
        txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Insert a grade, or overwrite the grade of an existing
    /// `(aem, test, year)` record. Overwrites keep `id` and `created_at`.
    pub fn upsert(&self, grade: &NewGrade) -> Result<UpsertOutcome, StoreError> {
        let grade = grade.clone().validated()?;
        let key = grade.key();
        let now = Utc::now();

        let txn = self.db.begin_write()?;
        let outcome = {
            let existing = txn
                .open_table(GRADE_KEYS)?
                .get(index_key(&key))?
                .map(|g| g.value());

            match existing {
                Some(id) => {
                    let mut grades = txn.open_table(GRADES)?;
                    let stored = grades.get(id)?.map(|g| decode(g.value())).transpose()?;
                    let mut record = stored.ok_or(StoreError::DanglingKey(id))?;
                    record.grade = grade.grade;
                    record.updated_at = now;
                    grades.insert(id, encode(&record)?.as_slice())?;
                    UpsertOutcome { id, created: false }
                }
                None => {
                    let id = allocate_id(&txn)?;
                    let record = GradeRecord {
                        id,
                        aem: grade.aem,
                        test: grade.test.clone(),
                        grade: grade.grade,
                        year: grade.year,
                        created_at: now,
                        updated_at: now,
                    };
                    txn.open_table(GRADES)?
                        .insert(id, encode(&record)?.as_slice())?;
                    txn.open_table(GRADE_KEYS)?
                        .insert(index_key(&key), id)?;
                    UpsertOutcome { id, created: true }
                }
            }
        };
        txn.commit()?;

        Ok(outcome)
    }

    /// Look up one record by its natural key.
    pub fn get(&self, key: &GradeKey) -> Result<Option<GradeRecord>, StoreError> {
        let txn = self.db.begin_read()?;
        let keys = txn.open_table(GRADE_KEYS)?;
        let Some(id) = keys.get(index_key(key))?.map(|g| g.value()) else {
            return Ok(None);
        };

        let grades = txn.open_table(GRADES)?;
        let record = grades.get(id)?.map(|g| decode(g.value())).transpose()?;
        record.map(Some).ok_or(StoreError::DanglingKey(id))
    }

    /// Filtered, ordered and paginated listing.
    pub fn list(&self, filter: &GradeFilter, page: Page) -> Result<Vec<GradeRecord>, StoreError> {
        let mut records: Vec<GradeRecord> = self
            .all()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        records.sort_by(listing_order);

        Ok(records
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }

    /// Every grade of one student, newest year first, then by test.
    pub fn by_student(&self, aem: u32) -> Result<Vec<GradeRecord>, StoreError> {
        let mut records: Vec<GradeRecord> =
            self.all()?.into_iter().filter(|r| r.aem == aem).collect();
        records.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.test.cmp(&b.test)));
        Ok(records)
    }

    /// Replace the grade of an existing record.
    pub fn update_grade(&self, key: &GradeKey, grade: f64) -> Result<GradeRecord, StoreError> {
        let grade = validate_grade(grade)?;

        let txn = self.db.begin_write()?;
        let record = {
            let keys = txn.open_table(GRADE_KEYS)?;
            let id = keys
                .get(index_key(key))?
                .map(|g| g.value())
                .ok_or_else(|| StoreError::NotFound(key.clone()))?;

            let mut grades = txn.open_table(GRADES)?;
            let stored = grades.get(id)?.map(|g| decode(g.value())).transpose()?;
            let mut record = stored.ok_or(StoreError::DanglingKey(id))?;
            record.grade = grade;
            record.updated_at = Utc::now();
            grades.insert(id, encode(&record)?.as_slice())?;
            record
        };
        txn.commit()?;

        Ok(record)
    }

    /// Remove one record.
    pub fn delete(&self, key: &GradeKey) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut keys = txn.open_table(GRADE_KEYS)?;
            let id = keys
                .remove(index_key(key))?
                .map(|g| g.value())
                .ok_or_else(|| StoreError::NotFound(key.clone()))?;
            txn.open_table(GRADES)?.remove(id)?;
        }
        txn.commit()?;

        Ok(())
    }

    /// Every record, in id order.
    pub fn all(&self) -> Result<Vec<GradeRecord>, StoreError> {
        let txn = self.db.begin_read()?;
        let grades = txn.open_table(GRADES)?;

        let mut records = Vec::new();
        for entry in grades.iter()? {
            let (_, value) = entry?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<u64, StoreError> {
        let txn = self.db.begin_read()?;
        let grades = txn.open_table(GRADES)?;
        Ok(grades.len()?)
    }
}
