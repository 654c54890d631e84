//! Question persistence boundary (`spec.md` §6).
//!
//! The original system keeps one SQLite table (`questions`) behind two
//! operations: replace the whole set on upload, and read it back ordered by
//! id. No relational-database crate appears anywhere in the teacher's or
//! the sibling repos' dependency stacks, so the contract is expressed as a
//! trait with an in-memory reference implementation rather than bringing in
//! an un-grounded `rusqlite`/`sqlx`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::model::{QuestionRecord, StoredQuestion};

pub trait QuestionStore {
    /// Drop every previously stored question.
    fn reset(&self);
    /// Insert a full batch, assigning each record an ascending id.
    fn insert_all(&self, records: Vec<QuestionRecord>);
    /// Read every stored question, ordered by id ascending.
    fn all_ordered(&self) -> Vec<StoredQuestion>;
}

#[derive(Default)]
pub struct InMemoryQuestionStore {
    rows: Mutex<Vec<StoredQuestion>>,
    next_id: AtomicU64,
}

impl QuestionStore for InMemoryQuestionStore {
    fn reset(&self) {
        self.rows.lock().unwrap().clear();
        self.next_id.store(1, Ordering::SeqCst);
    }

    fn insert_all(&self, records: Vec<QuestionRecord>) {
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            rows.push(StoredQuestion { id, record });
        }
    }

    fn all_ordered(&self) -> Vec<StoredQuestion> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|r| r.id);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(question: &str) -> QuestionRecord {
        QuestionRecord {
            question: question.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn insert_all_assigns_ascending_ids() {
        let store = InMemoryQuestionStore::default();
        store.next_id.store(1, Ordering::SeqCst);
        store.insert_all(vec![sample("one"), sample("two")]);
        let rows = store.all_ordered();
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn reset_clears_previous_upload() {
        let store = InMemoryQuestionStore::default();
        store.insert_all(vec![sample("stale")]);
        store.reset();
        store.insert_all(vec![sample("fresh")]);
        let rows = store.all_ordered();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.question, "fresh");
    }
}
