//! Process-wide corpus index.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::TRACING_TARGET;
use crate::record::{ScoredRecord, VectorRecord};
use crate::similarity::cosine_similarity;

type Corpora = HashMap<String, Vec<VectorRecord>>;

/// In-memory index of named corpora.
///
/// Cloning the index yields another handle to the same corpora. Corpora are
/// created on first insert and are never removed. All operations are
/// synchronous; appends hold the write lock for the whole batch so records
/// from concurrent inserts never interleave.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    corpora: Arc<RwLock<Corpora>>,
}

impl VectorIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends records to a corpus and returns the updated collection.
    ///
    /// The corpus is created if it does not exist. Records are appended as
    /// given, duplicates by id included.
    pub fn index_vectors(
        &self,
        corpus_id: &str,
        vectors: impl IntoIterator<Item = VectorRecord>,
    ) -> Vec<VectorRecord> {
        let mut corpora = self.write();
        let corpus = Self::append(&mut corpora, corpus_id, vectors);
        corpus.to_vec()
    }

    /// Appends records to a corpus and returns its new length.
    ///
    /// Same semantics as [`index_vectors`](Self::index_vectors) without
    /// copying the corpus out of the lock.
    pub fn append_vectors(
        &self,
        corpus_id: &str,
        vectors: impl IntoIterator<Item = VectorRecord>,
    ) -> usize {
        let mut corpora = self.write();
        Self::append(&mut corpora, corpus_id, vectors).len()
    }

    /// Returns the records of a corpus, or an empty collection if it was never created.
    pub fn get_corpus(&self, corpus_id: &str) -> Vec<VectorRecord> {
        self.read().get(corpus_id).cloned().unwrap_or_default()
    }

    /// Returns the number of records in a corpus.
    pub fn corpus_len(&self, corpus_id: &str) -> usize {
        self.read().get(corpus_id).map_or(0, Vec::len)
    }

    /// Returns the identifiers of all known corpora, sorted.
    pub fn corpus_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Scores every record of a corpus against `query` and returns the best `top_k`.
    ///
    /// Results are in descending score order. Ties keep insertion order and
    /// NaN scores rank last. A missing corpus yields an empty result.
    pub fn search(&self, corpus_id: &str, query: &[f32], top_k: usize) -> Vec<ScoredRecord> {
        let corpora = self.read();
        let Some(corpus) = corpora.get(corpus_id) else {
            tracing::debug!(
                target: TRACING_TARGET,
                corpus_id = %corpus_id,
                "Search on unknown corpus"
            );
            return Vec::new();
        };

        let mut scored: Vec<ScoredRecord> = corpus
            .iter()
            .map(|record| {
                let score = cosine_similarity(query, &record.embedding);
                ScoredRecord::from_record(record, score)
            })
            .collect();
        drop(corpora);

        scored.sort_by(|a, b| descending(a.score, b.score));
        scored.truncate(top_k);

        tracing::debug!(
            target: TRACING_TARGET,
            corpus_id = %corpus_id,
            top_k = top_k,
            returned = scored.len(),
            "Searched corpus"
        );

        scored
    }

    fn append<'a>(
        corpora: &'a mut Corpora,
        corpus_id: &str,
        vectors: impl IntoIterator<Item = VectorRecord>,
    ) -> &'a [VectorRecord] {
        let corpus = corpora.entry(corpus_id.to_owned()).or_default();

        let before = corpus.len();
        corpus.extend(vectors);

        tracing::debug!(
            target: TRACING_TARGET,
            corpus_id = %corpus_id,
            inserted = corpus.len() - before,
            total = corpus.len(),
            "Indexed vectors"
        );

        corpus
    }

    fn read(&self) -> RwLockReadGuard<'_, Corpora> {
        // Records are only ever appended, so a poisoned lock still guards valid data.
        self.corpora.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Corpora> {
        self.corpora.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord::new(id, format!("text of {id}"), embedding)
    }

    #[test]
    fn index_creates_corpus_and_appends() {
        let index = VectorIndex::new();
        assert!(index.get_corpus("c1").is_empty());

        let first = index.index_vectors("c1", vec![record("a", vec![1.0, 0.0])]);
        assert_eq!(first.len(), 1);

        let batch = vec![record("b", vec![0.0, 1.0]), record("c", vec![1.0, 1.0])];
        let updated = index.index_vectors("c1", batch.clone());
        assert_eq!(updated.len(), 3);

        let corpus = index.get_corpus("c1");
        assert_eq!(corpus.len(), 3);
        for item in &batch {
            assert!(corpus.contains(item));
        }
        assert_eq!(corpus[0].id, "a");
    }

    #[test]
    fn append_vectors_returns_new_length() {
        let index = VectorIndex::new();
        assert_eq!(index.append_vectors("c1", vec![record("a", vec![1.0])]), 1);
        assert_eq!(
            index.append_vectors("c1", vec![record("b", vec![0.5]), record("c", vec![0.2])]),
            3
        );
        assert_eq!(index.append_vectors("c1", Vec::new()), 3);

        let ids: Vec<_> = index.get_corpus("c1").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn duplicate_ids_are_appended() {
        let index = VectorIndex::new();
        index.index_vectors("c1", vec![record("a", vec![1.0])]);
        index.index_vectors("c1", vec![record("a", vec![2.0])]);
        assert_eq!(index.corpus_len("c1"), 2);
    }

    #[test]
    fn corpora_are_isolated() {
        let index = VectorIndex::new();
        index.index_vectors("c1", vec![record("a", vec![1.0])]);
        index.index_vectors("c2", vec![record("b", vec![1.0]), record("c", vec![1.0])]);

        assert_eq!(index.corpus_len("c1"), 1);
        assert_eq!(index.corpus_len("c2"), 2);
        assert_eq!(index.corpus_ids(), vec!["c1".to_owned(), "c2".to_owned()]);
    }

    #[test]
    fn clones_share_state() {
        let index = VectorIndex::new();
        let handle = index.clone();
        handle.index_vectors("c1", vec![record("a", vec![1.0])]);
        assert_eq!(index.corpus_len("c1"), 1);
    }

    #[test]
    fn search_ranks_by_similarity() {
        let index = VectorIndex::new();
        index.index_vectors(
            "c1",
            vec![record("x", vec![1.0, 0.0]), record("y", vec![0.0, 1.0])],
        );

        let results = index.search("c1", &[1.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "x");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].id, "y");
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn search_returns_at_most_top_k_in_descending_order() {
        let index = VectorIndex::new();
        let records = vec![
            record("a", vec![0.2, 0.9, 0.1]),
            record("b", vec![0.9, 0.1, 0.0]),
            record("c", vec![0.5, 0.5, 0.5]),
            record("d", vec![-1.0, 0.0, 0.3]),
            record("e", vec![0.0, 0.0, 1.0]),
        ];
        index.index_vectors("c1", records.clone());

        let query = [1.0, 0.2, 0.1];
        for k in [0, 1, 3, 5, 10] {
            let results = index.search("c1", &query, k);
            assert_eq!(results.len(), k.min(records.len()));

            for pair in results.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }

            for hit in &results {
                let source = records.iter().find(|r| r.id == hit.id).unwrap();
                assert_eq!(hit.score, cosine_similarity(&query, &source.embedding));
            }
        }
    }

    #[test]
    fn search_keeps_insertion_order_on_ties() {
        let index = VectorIndex::new();
        index.index_vectors(
            "c1",
            vec![
                record("first", vec![1.0, 0.0]),
                record("second", vec![2.0, 0.0]),
                record("third", vec![3.0, 0.0]),
            ],
        );

        let ids: Vec<_> = index
            .search("c1", &[1.0, 0.0], 3)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn search_ranks_nan_last() {
        let index = VectorIndex::new();
        index.index_vectors(
            "c1",
            vec![record("nan", vec![f32::NAN, 0.0]), record("ok", vec![1.0, 0.0])],
        );

        let results = index.search("c1", &[1.0, 0.0], 2);
        assert_eq!(results[0].id, "ok");
        assert!(results[1].score.is_nan());
    }

    #[test]
    fn search_on_missing_corpus_is_empty() {
        let index = VectorIndex::new();
        assert!(index.search("nonexistent", &[1.0, 0.0], 3).is_empty());
    }

    #[test]
    fn search_carries_text_and_meta() {
        let index = VectorIndex::new();
        index.index_vectors(
            "c1",
            vec![record("a", vec![1.0]).with_field("lang", json!("en"))],
        );

        let hit = &index.search("c1", &[1.0], 1)[0];
        assert_eq!(hit.text, "text of a");
        assert_eq!(hit.meta.get("lang"), Some(&json!("en")));
    }

    #[test]
    fn concurrent_batches_do_not_interleave() {
        let index = VectorIndex::new();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let index = index.clone();
                std::thread::spawn(move || {
                    let batch = (0..50).map(|i| record(&format!("{t}-{i}"), vec![t as f32]));
                    index.index_vectors("shared", batch);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let corpus = index.get_corpus("shared");
        assert_eq!(corpus.len(), 400);

        for chunk in corpus.chunks(50) {
            let owner = chunk[0].embedding[0];
            assert!(chunk.iter().all(|r| r.embedding[0] == owner));
        }
    }
}
