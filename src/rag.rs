// Retrieval context from a Qdrant vector store.
//
// The retriever is an opaque collaborator: query text in, a list of document
// snippets out. Any failure — Qdrant down, bad payloads, retrieval disabled —
// degrades to an empty context list; a chat turn never fails on retrieval.

use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;

/// Dimensionality of the embedding vectors stored in the collection.
pub const EMBEDDING_SIZE: usize = 768;

// ---------------------------------------------------------------------------
// QdrantRetriever
// ---------------------------------------------------------------------------

/// Low-level retriever against Qdrant's REST API.
pub struct QdrantRetriever {
    http: reqwest::Client,
    url: String,
    collection: String,
    limit: usize,
}

impl QdrantRetriever {
    pub fn new(url: String, collection: String, limit: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            collection,
            limit,
        }
    }

    /// Search the collection for snippets related to `query`.
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<String>> {
        let vector = pseudo_embedding(query);
        let body = json!({
            "vector": vector,
            "limit": self.limit,
            "with_payload": true,
        });

        let response = self
            .http
            .post(format!(
                "{}/collections/{}/points/search",
                self.url, self.collection
            ))
            .json(&body)
            .send()
            .await
            .context("failed to reach qdrant")?
            .error_for_status()
            .context("qdrant search returned an error status")?;

        let payload: Value = response
            .json()
            .await
            .context("failed to read qdrant search response")?;

        Ok(collect_texts(&payload))
    }

    /// Make sure the collection exists, creating it if necessary.
    /// Returns `true` when the collection was created by this call.
    pub async fn ensure_collection(&self) -> anyhow::Result<bool> {
        let collection_url = format!("{}/collections/{}", self.url, self.collection);

        let response = self
            .http
            .get(&collection_url)
            .send()
            .await
            .context("failed to reach qdrant")?;

        if response.status().is_success() {
            debug!("qdrant collection {} already exists", self.collection);
            return Ok(false);
        }
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(anyhow!(
                "unexpected status {} checking collection {}",
                response.status(),
                self.collection
            ));
        }

        let body = json!({
            "vectors": { "size": EMBEDDING_SIZE, "distance": "Cosine" }
        });
        self.http
            .put(&collection_url)
            .json(&body)
            .send()
            .await
            .context("failed to reach qdrant")?
            .error_for_status()
            .context("qdrant collection creation failed")?;

        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Retriever wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that can be either an active Qdrant retriever or
/// disabled (retrieval turned off in config).
pub enum Retriever {
    Qdrant(QdrantRetriever),
    Disabled,
}

impl Retriever {
    pub fn from_config(config: &Config) -> Self {
        if config.retrieval.enabled {
            Retriever::Qdrant(QdrantRetriever::new(
                config.retrieval.url.clone(),
                config.retrieval.collection.clone(),
                config.retrieval.limit,
            ))
        } else {
            Retriever::Disabled
        }
    }

    /// Fetch context snippets for `query`. Never fails: errors are logged
    /// and collapse to an empty list.
    pub async fn search(&self, query: &str) -> Vec<String> {
        match self {
            Retriever::Qdrant(retriever) => match retriever.search(query).await {
                Ok(snippets) => snippets,
                Err(e) => {
                    warn!("retrieval failed: {e:#}");
                    Vec::new()
                }
            },
            Retriever::Disabled => Vec::new(),
        }
    }

    /// Ensure the backing collection exists; a no-op when disabled.
    pub async fn ensure_collection(&self) -> anyhow::Result<bool> {
        match self {
            Retriever::Qdrant(retriever) => retriever.ensure_collection().await,
            Retriever::Disabled => Ok(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Retriever::Qdrant(_))
    }
}

// ---------------------------------------------------------------------------
// Embedding and response parsing helpers
// ---------------------------------------------------------------------------

/// Deterministic stand-in embedding: a seeded pseudo-random vector derived
/// from a stable hash of the text. The same text always maps to the same
/// vector, which is all local development and tests need.
pub fn pseudo_embedding(text: &str) -> Vec<f32> {
    let mut state = fnv1a_hash(text);
    (0..EMBEDDING_SIZE)
        .map(|_| {
            state = splitmix64(state);
            // Top 24 bits give a uniform value in [0, 1).
            (state >> 40) as f32 / (1u64 << 24) as f32
        })
        .collect()
}

fn fnv1a_hash(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Pull the `text` payload field out of each search hit.
///
/// Expected shape: `{ "result": [ { "payload": { "text": "..." } } ] }`
pub(crate) fn collect_texts(payload: &Value) -> Vec<String> {
    payload
        .get("result")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    hit.get("payload")
                        .and_then(|p| p.get("text"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Embedding --

    #[test]
    fn embedding_has_expected_size() {
        assert_eq!(pseudo_embedding("a jazz concert").len(), EMBEDDING_SIZE);
    }

    #[test]
    fn embedding_is_deterministic() {
        assert_eq!(
            pseudo_embedding("same text"),
            pseudo_embedding("same text")
        );
    }

    #[test]
    fn different_texts_give_different_embeddings() {
        assert_ne!(pseudo_embedding("alpha"), pseudo_embedding("beta"));
    }

    #[test]
    fn embedding_values_are_in_unit_interval() {
        for v in pseudo_embedding("boundary check") {
            assert!((0.0..1.0).contains(&v), "value out of range: {v}");
        }
    }

    #[test]
    fn empty_text_still_embeds() {
        assert_eq!(pseudo_embedding("").len(), EMBEDDING_SIZE);
    }

    // -- Response parsing --

    #[test]
    fn collect_texts_from_hits() {
        let payload = serde_json::json!({
            "result": [
                { "id": 1, "score": 0.9, "payload": { "text": "first snippet" } },
                { "id": 2, "score": 0.7, "payload": { "text": "second snippet" } },
            ]
        });
        assert_eq!(
            collect_texts(&payload),
            vec!["first snippet".to_string(), "second snippet".to_string()]
        );
    }

    #[test]
    fn hits_without_text_payload_are_skipped() {
        let payload = serde_json::json!({
            "result": [
                { "id": 1, "score": 0.9, "payload": { "source": "doc.pdf" } },
                { "id": 2, "score": 0.8 },
                { "id": 3, "score": 0.7, "payload": { "text": "kept" } },
            ]
        });
        assert_eq!(collect_texts(&payload), vec!["kept".to_string()]);
    }

    #[test]
    fn missing_result_field_is_empty() {
        let payload = serde_json::json!({ "status": "ok" });
        assert!(collect_texts(&payload).is_empty());
    }

    // -- Disabled retriever --

    #[tokio::test]
    async fn disabled_retriever_returns_empty_context() {
        let retriever = Retriever::Disabled;
        assert!(retriever.search("anything").await.is_empty());
        assert!(!retriever.is_enabled());
    }

    #[tokio::test]
    async fn disabled_retriever_skips_collection_setup() {
        let retriever = Retriever::Disabled;
        assert_eq!(retriever.ensure_collection().await.unwrap(), false);
    }

    #[tokio::test]
    async fn unreachable_qdrant_degrades_to_empty_context() {
        // Nothing listens on this port; the error must collapse to [].
        let retriever = Retriever::Qdrant(QdrantRetriever::new(
            "http://127.0.0.1:1".to_string(),
            "documents".to_string(),
            3,
        ));
        assert!(retriever.search("anything").await.is_empty());
    }
}
