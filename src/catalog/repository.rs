use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::Pos;

/// Storage port for the catalog.
///
/// Implementations own the uniqueness invariant on the POS name and
/// assign ids and timestamps on write, so callers never see a persisted
/// record without them.
pub trait PosRepository: Send + Sync {
    fn find_by_id(&self, id: i64) -> Result<Pos, RepositoryError>;
    fn find_all(&self) -> Vec<Pos>;
    /// Create or update the record. Fails when another record already
    /// uses the candidate's name.
    fn upsert(&self, pos: Pos) -> Result<Pos, RepositoryError>;
    fn clear(&self);
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("POS {0} not found")]
    NotFound(i64),
    #[error("a POS named '{0}' already exists")]
    DuplicateName(String),
}

/// Mutex-backed map store so the crate runs end-to-end without an
/// external database. The name check plus write happens under one lock,
/// mirroring the transactional read-then-write a SQL unique index gives.
pub struct InMemoryPosRepository {
    records: Mutex<HashMap<i64, Pos>>,
    sequence: AtomicI64,
}

impl Default for InMemoryPosRepository {
    fn default() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            sequence: AtomicI64::new(1),
        }
    }
}

impl PosRepository for InMemoryPosRepository {
    fn find_by_id(&self, id: i64) -> Result<Pos, RepositoryError> {
        let guard = self.records.lock().expect("repository lock poisoned");
        guard.get(&id).cloned().ok_or(RepositoryError::NotFound(id))
    }

    fn find_all(&self) -> Vec<Pos> {
        let guard = self.records.lock().expect("repository lock poisoned");
        let mut all: Vec<Pos> = guard.values().cloned().collect();
        all.sort_by_key(|pos| pos.id);
        all
    }

    fn upsert(&self, mut pos: Pos) -> Result<Pos, RepositoryError> {
        let mut guard = self.records.lock().expect("repository lock poisoned");

        let name_taken = guard
            .values()
            .any(|existing| existing.name == pos.name && existing.id != pos.id);
        if name_taken {
            return Err(RepositoryError::DuplicateName(pos.name));
        }

        let now = Utc::now();
        match pos.id {
            Some(id) => {
                let existing = guard.get(&id).ok_or(RepositoryError::NotFound(id))?;
                pos.created_at = existing.created_at;
                pos.updated_at = Some(now);
                guard.insert(id, pos.clone());
            }
            None => {
                let id = self.sequence.fetch_add(1, Ordering::Relaxed);
                pos.id = Some(id);
                pos.created_at = Some(now);
                pos.updated_at = Some(now);
                guard.insert(id, pos.clone());
            }
        }

        Ok(pos)
    }

    fn clear(&self) {
        self.records
            .lock()
            .expect("repository lock poisoned")
            .clear();
        // The sequence keeps counting; cleared ids are never reused.
    }
}
