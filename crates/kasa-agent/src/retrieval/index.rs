//! In-memory vector index with brute-force cosine search

use std::sync::Arc;

use async_trait::async_trait;

use super::chunk::TextSplitter;
use super::embed::{Embedder, cosine_similarity};
use super::{Passage, Retriever};
use crate::error::{Error, Result};

/// A unit of extracted text (a PDF page, a whole text file) and its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub source: String,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Counts from a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
}

struct Entry {
    passage: Passage,
    vector: Vec<f32>,
}

/// Searchable store of embedded document chunks, owned by one session
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
    entries: Vec<Entry>,
    sources: Vec<String>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            splitter: TextSplitter::default(),
            entries: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Split documents into non-blank passages
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Passage> {
        documents
            .iter()
            .flat_map(|doc| {
                self.splitter
                    .split_text(&doc.text)
                    .into_iter()
                    .filter(|chunk| !chunk.trim().is_empty())
                    .map(|text| Passage {
                        text,
                        source: doc.source.clone(),
                    })
            })
            .collect()
    }

    /// Replace the index contents with the given documents.
    ///
    /// On error the previous contents are left in place.
    pub async fn build(&mut self, documents: &[Document]) -> Result<IndexStats> {
        let passages = self.chunk_documents(documents);
        if passages.is_empty() {
            return Err(Error::Retrieval(
                "no valid text chunks could be created".into(),
            ));
        }
        self.build_from_passages(passages).await
    }

    /// Embed pre-chunked passages and replace the index contents
    pub async fn build_from_passages(&mut self, passages: Vec<Passage>) -> Result<IndexStats> {
        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != passages.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                passages.len(),
                vectors.len()
            )));
        }

        let mut sources: Vec<String> = Vec::new();
        for p in &passages {
            if !sources.contains(&p.source) {
                sources.push(p.source.clone());
            }
        }

        self.entries = passages
            .into_iter()
            .zip(vectors)
            .map(|(passage, vector)| Entry { passage, vector })
            .collect();
        self.sources = sources;

        tracing::debug!(
            "Indexed {} chunks from {} sources",
            self.entries.len(),
            self.sources.len()
        );
        Ok(IndexStats {
            documents: self.sources.len(),
            chunks: self.entries.len(),
        })
    }

    /// Drop every indexed chunk
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sources.clear();
    }

    /// Source names in indexing order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl Retriever for VectorIndex {
    fn is_loaded(&self) -> bool {
        !self.entries.is_empty()
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        if !self.is_loaded() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("empty embedding response".into()))?;

        let mut scored: Vec<(f32, &Entry)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(&query_vector, &e.vector), e))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, e)| e.passage.clone())
            .collect())
    }

    fn document_count(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::testing::KeywordEmbedder;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Embedding("model offline".into()))
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    fn index() -> VectorIndex {
        VectorIndex::new(Arc::new(KeywordEmbedder::new(&[
            "cocoa", "beans", "football", "shea", "first", "second",
        ])))
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = index();
        assert!(!index.is_loaded());
        assert!(index.search("anything", 5).await.unwrap().is_empty());
        assert_eq!(index.document_count(), 0);
    }

    #[tokio::test]
    async fn test_build_and_search_ranks_relevant_first() {
        let mut index = index();
        let stats = index
            .build(&[
                Document::new("Cocoa beans are fermented before drying.", "cocoa.txt"),
                Document::new("The Black Stars play football in Accra.", "sports.txt"),
                Document::new("Shea butter is made from shea nuts.", "shea.pdf"),
            ])
            .await
            .unwrap();

        assert_eq!(stats, IndexStats { documents: 3, chunks: 3 });
        assert!(index.is_loaded());

        let results = index.search("how are cocoa beans dried", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "cocoa.txt");
    }

    #[tokio::test]
    async fn test_build_rejects_blank_documents() {
        let mut index = index();
        let err = index
            .build(&[Document::new("   \n\n ", "blank.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
        assert!(!index.is_loaded());
    }

    #[tokio::test]
    async fn test_rebuild_replaces_and_clear_unloads() {
        let mut index = index();
        index.build(&[Document::new("first", "a.txt")]).await.unwrap();
        index.build(&[Document::new("second", "b.txt")]).await.unwrap();
        assert_eq!(index.sources(), ["b.txt".to_string()]);

        index.clear();
        assert!(!index.is_loaded());
        assert_eq!(index.chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_embedding_leaves_index_unloaded() {
        let mut failing = VectorIndex::new(Arc::new(FailingEmbedder));
        let err = failing
            .build(&[Document::new("x", "x.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(!failing.is_loaded());
    }
}
