//! Vector models: text entries with embeddings, searched semantically.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::JsonObject;
use super::skill::VectorSkillMetadata;

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Request body for adding a text entry to a vector table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorAddRequest {
    pub table_name: String,
    pub text: String,
    /// Let the server embed `text`. Defaults to `true`.
    pub generate_embedding: bool,
    #[serde(skip_serializing_if = "JsonObject::is_empty")]
    pub metadata: JsonObject,
    /// Pre-computed embedding, required when `generate_embedding` is `false`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<VectorSkillMetadata>,
}

impl VectorAddRequest {
    pub fn new(table_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            text: text.into(),
            generate_embedding: true,
            metadata: JsonObject::new(),
            embedding: Vec::new(),
            skill: None,
        }
    }

    pub fn metadata(mut self, metadata: JsonObject) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a single metadata key.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn generate_embedding(mut self, generate: bool) -> Self {
        self.generate_embedding = generate;
        self
    }

    /// Supply a pre-computed embedding and stop the server from generating one.
    pub fn embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = embedding;
        self.generate_embedding = false;
        self
    }

    pub fn skill(mut self, skill: VectorSkillMetadata) -> Self {
        self.skill = Some(skill);
        self
    }
}

/// Response from adding a vector entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorAddResponse {
    pub success: bool,
    pub message: Option<String>,
    pub table_name: Option<String>,
    pub s3_path: Option<String>,
    pub embedding_dimension: Option<u64>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Request body for a semantic search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorSearchRequest {
    pub table_name: String,
    pub query: String,
    pub limit: u32,
    pub generate_embedding: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f64>,
    /// SQL-like metadata filter, e.g. `"category = 'personal'"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl VectorSearchRequest {
    pub fn new(table_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            generate_embedding: true,
            embedding: Vec::new(),
            filter: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn generate_embedding(mut self, generate: bool) -> Self {
        self.generate_embedding = generate;
        self
    }

    /// Search with a pre-computed query embedding.
    pub fn embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = embedding;
        self.generate_embedding = false;
        self
    }

    /// Set the metadata filter. An empty string clears it.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = (!filter.is_empty()).then_some(filter);
        self
    }
}

/// A single search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorSearchHit {
    pub text: Option<String>,
    pub metadata: Option<Value>,
    pub score: Option<f64>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Complete search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorSearchResponse {
    pub success: bool,
    pub table_name: Option<String>,
    pub query: Option<String>,
    pub result_count: Option<u64>,
    pub results: Vec<VectorSearchHit>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Vector tables owned by the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListVectorTablesResponse {
    pub success: bool,
    pub user_id: Option<String>,
    pub table_count: Option<u64>,
    pub tables: Vec<Value>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_defaults_to_server_side_embedding() {
        let req = VectorAddRequest::new("journal", "Finished the project early")
            .meta("mood", "positive")
            .meta("category", "personal");

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "tableName": "journal",
                "text": "Finished the project early",
                "generateEmbedding": true,
                "metadata": {"mood": "positive", "category": "personal"}
            })
        );
    }

    #[test]
    fn precomputed_embedding_disables_generation() {
        let req = VectorAddRequest::new("journal", "hi").embedding(vec![0.1, -0.25]);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["generateEmbedding"], json!(false));
        assert_eq!(body["embedding"], json!([0.1, -0.25]));
        assert!(body.get("metadata").is_none());
    }

    #[test]
    fn search_sends_default_limit_and_drops_empty_filter() {
        let req = VectorSearchRequest::new("journal", "days when I felt accomplished").filter("");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "tableName": "journal",
                "query": "days when I felt accomplished",
                "limit": 5,
                "generateEmbedding": true
            })
        );
    }

    #[test]
    fn search_hits_keep_backend_specific_keys() {
        let resp: VectorSearchResponse = serde_json::from_value(json!({
            "success": true,
            "tableName": "journal",
            "resultCount": 1,
            "results": [{"text": "beach day", "metadata": {"mood": "positive"}, "score": 0.12, "_distance": 0.88}]
        }))
        .unwrap();

        assert_eq!(resp.results.len(), 1);
        assert_eq!(resp.results[0].score, Some(0.12));
        assert_eq!(resp.results[0].extra["_distance"], json!(0.88));
    }
}
