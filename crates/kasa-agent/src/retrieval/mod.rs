//! Document retrieval: chunking, embedding, a brute-force vector index and
//! file ingestion.

pub mod chunk;
pub mod embed;
pub mod index;
pub mod ingest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use chunk::TextSplitter;
pub use embed::{Embedder, FastEmbedder, HttpEmbedder};
pub use index::{Document, IndexStats, VectorIndex};
pub use ingest::{DocumentMetadata, IngestOutcome, ingest};

/// A retrieved chunk of text and the file it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub source: String,
}

/// Source of document passages for the orchestrator
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Whether an index has been built and can be searched
    fn is_loaded(&self) -> bool;

    /// Return up to `k` passages most relevant to `query`
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>>;

    /// Number of documents behind the index
    fn document_count(&self) -> usize;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::embed::Embedder;
    use crate::error::Result;
    use async_trait::async_trait;

    /// One axis per vocabulary word, valued by how often the word occurs
    pub struct KeywordEmbedder {
        vocabulary: Vec<&'static str>,
    }

    impl KeywordEmbedder {
        pub fn new(vocabulary: &[&'static str]) -> Self {
            Self {
                vocabulary: vocabulary.to_vec(),
            }
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lowered = text.to_lowercase();
                    let words: Vec<&str> = lowered
                        .split(|c: char| !c.is_alphanumeric())
                        .filter(|w| !w.is_empty())
                        .collect();
                    self.vocabulary
                        .iter()
                        .map(|v| words.iter().filter(|w| *w == v).count() as f32)
                        .collect()
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            self.vocabulary.len()
        }
    }
}
