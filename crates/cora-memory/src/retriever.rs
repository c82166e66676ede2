// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword + importance memory ranking.
//!
//! Relevance dominates stored importance: a memory matching several query
//! keywords outranks a high-importance memory matching none.

use cora_core::CoraError;
use tracing::debug;

use crate::store::MemoryStore;
use crate::types::{Memory, ScoredMemory};

/// How many query tokens participate in scoring.
const MAX_KEYWORDS: usize = 5;

/// Retrieves the memories most relevant to a query.
pub struct MemoryRetriever {
    store: MemoryStore,
}

impl MemoryRetriever {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Top `limit` memories for `query`, most relevant first.
    ///
    /// Every returned memory has its access count bumped and its last-access
    /// time refreshed. A read that writes, deliberately: recency feeds the
    /// candidate pre-ordering of future searches.
    pub async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredMemory>, CoraError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.store.fetch_candidates(user_id, limit * 2).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let keywords = extract_keywords(query);
        let mut scored: Vec<ScoredMemory> = candidates
            .into_iter()
            .map(|memory| {
                let score = score_memory(&memory, &keywords);
                ScoredMemory { memory, score }
            })
            .collect();

        // Stable: ties keep the importance-then-recency pre-fetch order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        let ids: Vec<String> = scored.iter().map(|s| s.memory.id.clone()).collect();
        self.store.touch(&ids).await?;

        debug!(
            user_id,
            keywords = keywords.len(),
            returned = scored.len(),
            "memory search"
        );
        Ok(scored)
    }
}

/// First `MAX_KEYWORDS` whitespace tokens of the lowercased query, deduped so
/// a repeated word scores at most once.
fn extract_keywords(query: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in query.to_lowercase().split_whitespace().take(MAX_KEYWORDS) {
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Distinct keyword hits (substring match against lowercased content) plus
/// `importance / 10`. With zero hits everywhere, scores degrade to a pure
/// importance ranking.
pub fn score_memory(memory: &Memory, keywords: &[String]) -> f64 {
    let content = memory.content.to_lowercase();
    let hits = keywords.iter().filter(|k| content.contains(k.as_str())).count();
    hits as f64 + memory.importance as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemoryCategory;
    use cora_storage::Database;
    use tempfile::tempdir;

    fn mem(content: &str, importance: i64) -> Memory {
        Memory::new("user-1", MemoryCategory::Fact, content, importance)
    }

    #[test]
    fn keywords_are_first_five_lowercased_tokens() {
        let keywords = extract_keywords("Qual o PRAZO do relatório de vendas deste mês");
        assert_eq!(keywords, vec!["qual", "o", "prazo", "do", "relatório"]);
    }

    #[test]
    fn relevance_beats_importance() {
        let keywords = extract_keywords("prazo do relatório");
        // Three hits on a low-importance memory…
        let relevant = mem("o prazo do relatório é sexta", 2);
        // …beat zero hits on a high-importance one.
        let important = mem("aniversário da Ana em setembro", 9);
        let relevant_score = score_memory(&relevant, &keywords);
        let important_score = score_memory(&important, &keywords);
        assert!((relevant_score - 3.2).abs() < 1e-9);
        assert!((important_score - 0.9).abs() < 1e-9);
        assert!(relevant_score > important_score);
    }

    #[test]
    fn repeated_query_word_scores_once() {
        let keywords = extract_keywords("café café café");
        assert_eq!(keywords, vec!["café"]);
        let m = mem("gosta de café coado", 5);
        assert!((score_memory(&m, &keywords) - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn search_falls_back_to_importance_on_zero_hits() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let store = MemoryStore::new(db);

        let high = mem("prefere reuniões de manhã", 9);
        let low = mem("usa transporte público", 2);
        store.save(&high).await.unwrap();
        store.save(&low).await.unwrap();

        let retriever = MemoryRetriever::new(store);
        let results = retriever.search("user-1", "xyzzy", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].memory.id, high.id);
        assert!((results[0].score - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn search_touches_returned_memories() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let store = MemoryStore::new(db.clone());

        let m = mem("trabalha com vendas", 5);
        store.save(&m).await.unwrap();

        let retriever = MemoryRetriever::new(MemoryStore::new(db.clone()));
        retriever.search("user-1", "vendas", 5).await.unwrap();

        let after = store.get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(after.access_count, 1);
        assert!(after.last_accessed_at.is_some());
    }

    #[tokio::test]
    async fn search_respects_limit_with_candidate_headroom() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let store = MemoryStore::new(db.clone());

        for i in 0..6 {
            store
                .save(&mem(&format!("fato número {i} sobre vendas"), 5))
                .await
                .unwrap();
        }

        let retriever = MemoryRetriever::new(MemoryStore::new(db));
        let results = retriever.search("user-1", "vendas", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn zero_limit_returns_nothing() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let retriever = MemoryRetriever::new(MemoryStore::new(db));
        assert!(retriever.search("user-1", "teste", 0).await.unwrap().is_empty());
    }
}
