//! Retrieval capability consumed by the generator.
//!
//! Ingestion, embeddings and vector search live outside this crate; the
//! generator only needs ranked passages for a topic.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use tracing::{debug, instrument};

/// A unit of source text used as grounding context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One ranked retrieval result.
///
/// Some stores return bare passages, others `(passage, score)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievedItem {
    Passage(Passage),
    Scored(Passage, f32),
}

impl RetrievedItem {
    pub fn passage(&self) -> &Passage {
        match self {
            RetrievedItem::Passage(p) | RetrievedItem::Scored(p, _) => p,
        }
    }

    pub fn score(&self) -> Option<f32> {
        match self {
            RetrievedItem::Passage(_) => None,
            RetrievedItem::Scored(_, score) => Some(*score),
        }
    }
}

impl From<Passage> for RetrievedItem {
    fn from(p: Passage) -> Self {
        RetrievedItem::Passage(p)
    }
}

impl From<(Passage, f32)> for RetrievedItem {
    fn from((p, score): (Passage, f32)) -> Self {
        RetrievedItem::Scored(p, score)
    }
}

/// Source of ranked passages for a topic. May return an empty list.
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    async fn query_by_topic(&self, topic: &str) -> Result<Vec<RetrievedItem>, RetrievalError>;
}

/// Term-overlap ranking over passages held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryRetriever {
    passages: Vec<Passage>,
    top_k: usize,
}

impl InMemoryRetriever {
    pub fn new<I, S>(passages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passages: passages.into_iter().map(Passage::new).collect(),
            top_k: 4,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    #[instrument(skip(self), fields(passages = self.passages.len()))]
    async fn query_by_topic(&self, topic: &str) -> Result<Vec<RetrievedItem>, RetrievalError> {
        let query = terms(topic);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(usize, f32)> = self
            .passages
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let hits = terms(&p.text).intersection(&query).count();
                (hits > 0).then(|| (i, hits as f32 / query.len() as f32))
            })
            .collect();
        // Stable sort keeps insertion order among ties
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.top_k);

        debug!(hits = ranked.len(), "Ranked passages");
        Ok(ranked
            .into_iter()
            .map(|(i, score)| RetrievedItem::Scored(self.passages[i].clone(), score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ranks_by_overlap() {
        let retriever = InMemoryRetriever::new([
            "Mitochondria produce ATP for the cell.",
            "Photosynthesis lets plants convert light into chemical energy.",
            "Plants and photosynthesis: chlorophyll absorbs light.",
        ]);

        let hits = retriever.query_by_topic("photosynthesis in plants").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].passage().text.contains("Photosynthesis lets plants"));
        assert!(hits.iter().all(|h| h.score().unwrap() > 0.0));
    }

    #[tokio::test]
    async fn test_unrelated_topic_returns_nothing() {
        let retriever = InMemoryRetriever::new(["Rust ownership rules."]);
        assert!(retriever.query_by_topic("Renaissance painting").await.unwrap().is_empty());
        assert!(retriever.query_by_topic("").await.unwrap().is_empty());
    }

    #[test]
    fn test_tuple_item_unwraps_passage() {
        let item: RetrievedItem = (Passage::new("inner"), 0.5).into();
        assert_eq!(item.passage().text, "inner");
        assert_eq!(item.score(), Some(0.5));
    }
}
