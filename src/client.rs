//! HTTP client and sub-clients for the Arca API.
//!
//! The main entry point is [`ArcaClient`], built via [`ArcaClientBuilder`].
//! The two services are reached through [`ArcaClient::tables`] and
//! [`ArcaClient::vectors`]; both share the same connection pool.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ArcaConfig;
use crate::error::{ApiError, ArcaError, ArcaResult};
use crate::models::common::{SkillBody, TableNameBody};
use crate::models::*;

/// Public Arca deployment.
pub const DEFAULT_BASE_URL: &str = "https://arca.build";

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_PREFIX: [&str; 2] = ["api", "v1"];
const TABLES: &str = "tables";
const VECTORS: &str = "vectors";

// ---------------------------------------------------------------------------
// Internal shared state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl ClientInner {
    /// Build an API URL from path segments. Each segment is percent-encoded,
    /// so table names cannot escape their position in the path.
    fn url(&self, segments: &[&str]) -> ArcaResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ArcaError::Config(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(API_PREFIX.iter().chain(segments));
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ArcaResult<T> {
        debug!(method = "GET", %url, "sending request");
        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> ArcaResult<T> {
        debug!(method = "POST", %url, "sending request");
        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// DELETE with a JSON body; the API identifies the target in the body.
    async fn delete<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> ArcaResult<T> {
        debug!(method = "DELETE", %url, "sending request");
        let resp = self.http.delete(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// GET a raw file download.
    async fn get_bytes(&self, url: Url) -> ArcaResult<Vec<u8>> {
        debug!(method = "GET", %url, "downloading");
        let resp = self.http.get(url).send().await?;
        if resp.status().is_success() {
            Ok(resp.bytes().await?.to_vec())
        } else {
            Err(Self::extract_error(resp, Some("Export failed")).await)
        }
    }

    /// Process an HTTP response, returning the deserialized body or an error.
    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> ArcaResult<T> {
        if !resp.status().is_success() {
            return Err(Self::extract_error(resp, None).await);
        }

        let body = resp.text().await?;
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    /// Turn a non-2xx response into the matching [`ArcaError`].
    async fn extract_error(resp: reqwest::Response, default_message: Option<&str>) -> ArcaError {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(status = status.as_u16(), "API key rejected");
            return ArcaError::unauthorized();
        }

        let code = status.as_u16();
        let fallback = match default_message {
            Some(message) => message.to_string(),
            None => format!("Request failed with status {code}"),
        };
        let body = resp.text().await.unwrap_or_default();
        let err = ApiError::from_body(code, &body, &fallback);
        warn!(status = code, message = %err.message, "request failed");
        ArcaError::Api(err)
    }

    // -- Endpoints shared by both services ------------------------------------

    async fn drop_table(&self, service: &str, table: &str) -> ArcaResult<StatusResponse> {
        check_table_name(table)?;
        let url = self.url(&[service, "delete"])?;
        self.delete(url, &TableNameBody { table_name: table }).await
    }

    async fn skill(&self, service: &str, table: &str) -> ArcaResult<SkillResponse> {
        check_table_name(table)?;
        self.get(self.url(&[service, table, "skill"])?).await
    }

    async fn put_skill<S: Serialize>(
        &self,
        service: &str,
        table: &str,
        skill: &S,
    ) -> ArcaResult<StatusResponse> {
        check_table_name(table)?;
        let url = self.url(&[service, table, "skill"])?;
        self.post(url, &SkillBody { skill }).await
    }

    async fn skills(&self, service: &str) -> ArcaResult<SkillsResponse> {
        self.get(self.url(&[service, "skills"])?).await
    }

    async fn export(&self, service: &str, table: &str) -> ArcaResult<Vec<u8>> {
        check_table_name(table)?;
        let mut url = self.url(&[service, "export"])?;
        url.query_pairs_mut().append_pair("tableName", table);
        self.get_bytes(url).await
    }
}

fn check_table_name(table: &str) -> ArcaResult<()> {
    if table.trim().is_empty() {
        return Err(ArcaError::Validation("table name must not be empty".into()));
    }
    Ok(())
}

fn check_embedding(generate: bool, embedding: &[f64]) -> ArcaResult<()> {
    if !generate && embedding.is_empty() {
        return Err(ArcaError::Validation(
            "an embedding is required when generate_embedding is false".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ArcaClient
// ---------------------------------------------------------------------------

/// The main Arca API client.
///
/// ```rust,no_run
/// use arca::{ArcaClient, QueryRequest};
///
/// # async fn example() -> Result<(), arca::ArcaError> {
/// let client = ArcaClient::new("your-api-key")?;
/// let meals = client
///     .tables()
///     .query(QueryRequest::new("meals").query("calories > 500").limit(10))
///     .await?;
/// println!("{} rows", meals.data.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArcaClient {
    inner: Arc<ClientInner>,
}

impl ArcaClient {
    /// A client for the public deployment with default settings.
    pub fn new(api_key: impl Into<String>) -> ArcaResult<Self> {
        Self::builder(api_key).build()
    }

    /// Start building a new client.
    pub fn builder(api_key: impl Into<String>) -> ArcaClientBuilder {
        ArcaClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &ArcaConfig) -> ArcaResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ArcaError::Auth("API key is required".into()))?;

        Self::builder(api_key)
            .base_url(config.base_url.clone())
            .timeout(config.timeout_secs)
            .build()
    }

    /// The base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Access the structured-table service.
    pub fn tables(&self) -> TablesClient {
        TablesClient {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Access the vector (semantic search) service.
    pub fn vectors(&self) -> VectorsClient {
        VectorsClient {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Fetch the skills of every table and vector table in one request.
    pub async fn all_skills(&self) -> ArcaResult<SkillsResponse> {
        self.inner.get(self.inner.url(&["skills"])?).await
    }
}

/// One-shot helper: fetch every skill without keeping a client around.
pub async fn get_all_skills(api_key: &str, base_url: &str) -> ArcaResult<SkillsResponse> {
    ArcaClient::builder(api_key)
        .base_url(base_url)
        .build()?
        .all_skills()
        .await
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`ArcaClient`].
pub struct ArcaClientBuilder {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

impl ArcaClientBuilder {
    /// Point the client at another deployment (default: `https://arca.build`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout in seconds (default: 30). Must be non-zero.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build the client.
    pub fn build(self) -> ArcaResult<ArcaClient> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ArcaError::Auth("API key is required".into()));
        }

        let trimmed = self.base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| ArcaError::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ArcaError::Config(format!(
                "base URL must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ArcaError::Config("timeout must be at least 1 second".into()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ArcaError::Config(format!("invalid API key: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("arca-rust/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        Ok(ArcaClient {
            inner: Arc::new(ClientInner { http, base_url }),
        })
    }
}

// ---------------------------------------------------------------------------
// TablesClient
// ---------------------------------------------------------------------------

/// Sub-client for the structured-table service.
#[derive(Debug, Clone)]
pub struct TablesClient {
    inner: Arc<ClientInner>,
}

impl TablesClient {
    /// Create a table or append a row to it.
    pub async fn upsert(&self, req: UpsertRequest) -> ArcaResult<UpsertResponse> {
        check_table_name(&req.table_name)?;
        self.inner.post(self.inner.url(&[TABLES, "upsert"])?, &req).await
    }

    /// Query a table with filters and aggregations.
    pub async fn query(&self, req: QueryRequest) -> ArcaResult<QueryResponse> {
        check_table_name(&req.table_name)?;
        self.inner.post(self.inner.url(&[TABLES, "query"])?, &req).await
    }

    /// Update the rows matching the request's exact-match conditions.
    pub async fn update(&self, req: UpdateRequest) -> ArcaResult<UpdateResponse> {
        check_table_name(&req.table_name)?;
        self.inner.post(self.inner.url(&[TABLES, "update"])?, &req).await
    }

    /// Add columns to a table, preserving existing rows.
    pub async fn alter_schema(&self, req: AlterSchemaRequest) -> ArcaResult<AlterSchemaResponse> {
        check_table_name(&req.table_name)?;
        if req.add_columns.is_empty() {
            return Err(ArcaError::Validation(
                "alter_schema needs at least one column to add".into(),
            ));
        }
        self.inner
            .post(self.inner.url(&[TABLES, "alter-schema"])?, &req)
            .await
    }

    /// Delete an entire table.
    pub async fn delete(&self, table: &str) -> ArcaResult<StatusResponse> {
        self.inner.drop_table(TABLES, table).await
    }

    /// List all tables of the authenticated user.
    pub async fn list_tables(&self) -> ArcaResult<ListTablesResponse> {
        self.inner.get(self.inner.url(&[TABLES, "list"])?).await
    }

    /// Column schemas of every table.
    pub async fn get_schemas(&self) -> ArcaResult<SchemasResponse> {
        self.inner.get(self.inner.url(&[TABLES, "schemas"])?).await
    }

    pub async fn get_skill(&self, table: &str) -> ArcaResult<SkillResponse> {
        self.inner.skill(TABLES, table).await
    }

    pub async fn update_skill(&self, table: &str, skill: SkillMetadata) -> ArcaResult<StatusResponse> {
        self.inner.put_skill(TABLES, table, &skill).await
    }

    pub async fn get_all_skills(&self) -> ArcaResult<SkillsResponse> {
        self.inner.skills(TABLES).await
    }

    /// Download a table as a Parquet file.
    pub async fn export(&self, table: &str) -> ArcaResult<Vec<u8>> {
        self.inner.export(TABLES, table).await
    }
}

// ---------------------------------------------------------------------------
// VectorsClient
// ---------------------------------------------------------------------------

/// Sub-client for the vector (semantic search) service.
#[derive(Debug, Clone)]
pub struct VectorsClient {
    inner: Arc<ClientInner>,
}

impl VectorsClient {
    /// Add a text entry, embedding it server-side unless an embedding is given.
    pub async fn add(&self, req: VectorAddRequest) -> ArcaResult<VectorAddResponse> {
        check_table_name(&req.table_name)?;
        check_embedding(req.generate_embedding, &req.embedding)?;
        self.inner.post(self.inner.url(&[VECTORS, "add"])?, &req).await
    }

    /// Semantic search over a vector table.
    pub async fn search(&self, req: VectorSearchRequest) -> ArcaResult<VectorSearchResponse> {
        check_table_name(&req.table_name)?;
        check_embedding(req.generate_embedding, &req.embedding)?;
        self.inner.post(self.inner.url(&[VECTORS, "search"])?, &req).await
    }

    /// Delete an entire vector table.
    pub async fn delete(&self, table: &str) -> ArcaResult<StatusResponse> {
        self.inner.drop_table(VECTORS, table).await
    }

    pub async fn list_tables(&self) -> ArcaResult<ListVectorTablesResponse> {
        self.inner.get(self.inner.url(&[VECTORS, "list"])?).await
    }

    pub async fn get_skill(&self, table: &str) -> ArcaResult<SkillResponse> {
        self.inner.skill(VECTORS, table).await
    }

    pub async fn update_skill(
        &self,
        table: &str,
        skill: VectorSkillMetadata,
    ) -> ArcaResult<StatusResponse> {
        self.inner.put_skill(VECTORS, table, &skill).await
    }

    pub async fn get_all_skills(&self) -> ArcaResult<SkillsResponse> {
        self.inner.skills(VECTORS).await
    }

    /// Download a vector table as CSV.
    pub async fn export(&self, table: &str) -> ArcaResult<Vec<u8>> {
        self.inner.export(VECTORS, table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(client: &ArcaClient, segments: &[&str]) -> String {
        client.inner.url(segments).unwrap().to_string()
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = ArcaClient::new("  ").unwrap_err();
        assert!(matches!(err, ArcaError::Auth(ref m) if m == "API key is required"));
    }

    #[test]
    fn malformed_base_url_is_a_config_error() {
        let err = ArcaClient::builder("key").base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ArcaError::Config(_)));

        let err = ArcaClient::builder("key").base_url("mailto:ops@arca.build").build().unwrap_err();
        assert!(matches!(err, ArcaError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_a_config_error() {
        let err = ArcaClient::builder("key").timeout(0).build().unwrap_err();
        assert!(matches!(err, ArcaError::Config(ref m) if m.contains("timeout")));
        assert!(ArcaClient::builder("key").timeout(1).build().is_ok());
    }

    #[test]
    fn urls_join_under_api_prefix() {
        let client = ArcaClient::builder("key").base_url("https://arca.build/").build().unwrap();
        assert_eq!(
            paths(&client, &[TABLES, "upsert"]),
            "https://arca.build/api/v1/tables/upsert"
        );
    }

    #[test]
    fn base_path_prefix_is_preserved() {
        let client = ArcaClient::builder("key")
            .base_url("http://localhost:8080/proxy/arca//")
            .build()
            .unwrap();
        assert_eq!(
            paths(&client, &[VECTORS, "list"]),
            "http://localhost:8080/proxy/arca/api/v1/vectors/list"
        );
    }

    #[test]
    fn table_names_are_encoded_as_one_segment() {
        let client = ArcaClient::new("key").unwrap();
        assert_eq!(
            paths(&client, &[TABLES, "my meals/../x", "skill"]),
            "https://arca.build/api/v1/tables/my%20meals%2F..%2Fx/skill"
        );
    }

    #[test]
    fn from_config_requires_a_key() {
        let config = ArcaConfig::default();
        assert!(matches!(ArcaClient::from_config(&config), Err(ArcaError::Auth(_))));

        let config = ArcaConfig {
            api_key: Some("key".into()),
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 5,
        };
        let client = ArcaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9/");
    }
}
