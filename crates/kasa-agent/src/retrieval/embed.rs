//! Text embedding backends and vector math

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};

/// Turns text into fixed-size vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Length of the vectors this embedder produces
    fn dimensions(&self) -> usize;
}

/// Compute the L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2-normalize a vector in-place. Zero vectors remain zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity. Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Output size of all-MiniLM-L6-v2
pub const MINILM_DIMENSIONS: usize = 384;

/// Local sentence embedder running all-MiniLM-L6-v2 through `fastembed`.
///
/// The model is downloaded and loaded on first use. Inference runs on the
/// blocking pool.
pub struct FastEmbedder {
    cache_dir: Option<PathBuf>,
    model: Arc<Mutex<Option<TextEmbedding>>>,
}

impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl FastEmbedder {
    pub fn new() -> Self {
        Self {
            cache_dir: None,
            model: Arc::new(Mutex::new(None)),
        }
    }

    /// Directory where model files are downloaded
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }
}

fn load_model(cache_dir: Option<PathBuf>) -> Result<TextEmbedding> {
    let mut options =
        InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
    if let Some(dir) = cache_dir {
        options = options.with_cache_dir(dir);
    }
    tracing::info!("Loading embedding model all-MiniLM-L6-v2");
    TextEmbedding::try_new(options)
        .map_err(|e| Error::Embedding(format!("Failed to load embedding model: {}", e)))
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let cache_dir = self.cache_dir.clone();
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f32>>> {
            let mut guard = model.lock();
            if guard.is_none() {
                *guard = Some(load_model(cache_dir)?);
            }
            let model = guard
                .as_mut()
                .ok_or_else(|| Error::Embedding("embedding model unavailable".into()))?;
            let mut vectors = model
                .embed(texts, None)
                .map_err(|e| Error::Embedding(format!("Failed to generate embeddings: {}", e)))?;
            for vector in &mut vectors {
                l2_normalize(vector);
            }
            Ok(vectors)
        })
        .await
        .map_err(|e| Error::Embedding(format!("embedding task failed: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            dimensions: 1536,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "input": texts }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;
        if parsed.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_fast_embedder_empty_batch_skips_model() {
        let embedder = FastEmbedder::new();
        assert!(embedder.embed(&[]).await.unwrap().is_empty());
        assert!(embedder.model.lock().is_none());
        assert_eq!(embedder.dimensions(), MINILM_DIMENSIONS);
    }

    #[tokio::test]
    #[ignore = "downloads the all-MiniLM-L6-v2 model"]
    async fn test_fast_embedder_matches_meaning_without_shared_words() {
        let embedder = FastEmbedder::new();
        let vectors = embedder
            .embed(&[
                "How do I maintain my vehicle?".to_string(),
                "The farm automobile needs new tyres before harvest.".to_string(),
                "Cocoa grows in the Ashanti region.".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(vectors[0].len(), MINILM_DIMENSIONS);
        let car = cosine_similarity(&vectors[0], &vectors[1]);
        let cocoa = cosine_similarity(&vectors[0], &vectors[2]);
        assert!(car > 0.0);
        assert!(car > cocoa, "car {} vs cocoa {}", car, cocoa);
    }

    #[tokio::test]
    async fn test_http_embedder_orders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "model": "text-embedding-3-small" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ]
            })))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(format!("{}/v1/", server.uri()), "text-embedding-3-small")
            .with_api_key("sk-test")
            .with_dimensions(2);
        let vectors = embedder
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(embedder.dimensions(), 2);
    }

    #[tokio::test]
    async fn test_http_embedder_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(server.uri(), "m");
        let err = embedder.embed(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(ref m) if m.contains("503")));
    }
}
