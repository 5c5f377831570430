//! Request/response mapping for the vectors service, checked against a mock server.

use arca::{
    ArcaClient, ArcaError, MetadataField, VectorAddRequest, VectorSearchRequest,
    VectorSkillMetadata,
};
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ArcaClient {
    ArcaClient::builder("user_test_key")
        .base_url(server.uri())
        .build()
        .expect("client builds")
}

fn journal_skill() -> VectorSkillMetadata {
    VectorSkillMetadata::new()
        .description("Personal journal entries with mood and category tracking")
        .metadata_fields(vec![
            MetadataField::new("category", "string", "Type of journal entry")
                .examples(["personal", "work", "health"]),
            MetadataField::new("mood", "string", "Emotional state during entry"),
        ])
        .search_examples(["Find days when I felt accomplished"])
        .filter_examples(["mood = 'positive'"])
}

#[tokio::test]
async fn add_sends_text_metadata_and_snake_case_skill() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vectors/add"))
        .and(header("authorization", "Bearer user_test_key"))
        .and(body_json(json!({
            "tableName": "journal_entries",
            "text": "Today was incredibly productive.",
            "generateEmbedding": true,
            "metadata": {"category": "personal", "mood": "positive"},
            "skill": {
                "description": "Personal journal entries with mood and category tracking",
                "metadata_fields": [
                    {"name": "category", "type": "string", "description": "Type of journal entry",
                     "examples": ["personal", "work", "health"]},
                    {"name": "mood", "type": "string", "description": "Emotional state during entry"}
                ],
                "search_examples": ["Find days when I felt accomplished"],
                "filter_examples": ["mood = 'positive'"]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tableName": "journal_entries",
            "s3Path": "s3://vault/vectors/journal_entries",
            "embeddingDimension": 1536
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .vectors()
        .add(
            VectorAddRequest::new("journal_entries", "Today was incredibly productive.")
                .meta("category", "personal")
                .meta("mood", "positive")
                .skill(journal_skill()),
        )
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.embedding_dimension, Some(1536));
}

#[tokio::test]
async fn add_with_precomputed_embedding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vectors/add"))
        .and(body_json(json!({
            "tableName": "notes",
            "text": "short note",
            "generateEmbedding": false,
            "embedding": [0.1, 0.5, 1.0]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .vectors()
        .add(VectorAddRequest::new("notes", "short note").embedding(vec![0.1, 0.5, 1.0]))
        .await
        .unwrap();
}

#[tokio::test]
async fn search_sends_limit_and_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vectors/search"))
        .and(body_json(json!({
            "tableName": "journal_entries",
            "query": "days when I felt accomplished",
            "limit": 3,
            "generateEmbedding": true,
            "filter": "category = 'personal'"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tableName": "journal_entries",
            "query": "days when I felt accomplished",
            "resultCount": 2,
            "results": [
                {"text": "Finished the big project", "metadata": {"mood": "positive"}, "score": 0.91},
                {"text": "New deadlift record", "metadata": {"mood": "positive"}, "score": 0.84}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .vectors()
        .search(
            VectorSearchRequest::new("journal_entries", "days when I felt accomplished")
                .limit(3)
                .filter("category = 'personal'"),
        )
        .await
        .unwrap();

    assert_eq!(resp.result_count, Some(2));
    assert_eq!(resp.results[0].text.as_deref(), Some("Finished the big project"));
    assert_eq!(resp.results[1].score, Some(0.84));
}

#[tokio::test]
async fn table_management_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/vectors/delete"))
        .and(body_json(json!({"tableName": "journal_entries"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": "user_123",
            "tableCount": 1,
            "tables": [{"name": "journal_entries"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vectors = client_for(&server).vectors();

    let listed = vectors.list_tables().await.unwrap();
    assert_eq!(listed.user_id.as_deref(), Some("user_123"));
    assert_eq!(listed.table_count, Some(1));

    assert!(vectors.delete("journal_entries").await.unwrap().success);
}

#[tokio::test]
async fn skills_use_vector_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vectors/journal_entries/skill"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tableName": "journal_entries",
            "skill": "# journal_entries"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vectors/journal_entries/skill"))
        .and(body_json(json!({"skill": {"notes": "moods are lowercase"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vectors/skills"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "skills": [{"tableName": "journal_entries", "skill": "# journal_entries"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vectors = client_for(&server).vectors();
    assert_eq!(
        vectors.get_skill("journal_entries").await.unwrap().table_name.as_deref(),
        Some("journal_entries")
    );
    vectors
        .update_skill("journal_entries", VectorSkillMetadata::new().notes("moods are lowercase"))
        .await
        .unwrap();
    assert_eq!(vectors.get_all_skills().await.unwrap().skills.len(), 1);
}

#[tokio::test]
async fn export_returns_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vectors/export"))
        .and(query_param("tableName", "journal entries"))
        .respond_with(ResponseTemplate::new(200).set_body_string("text,mood\nhello,positive\n"))
        .expect(1)
        .mount(&server)
        .await;

    let csv = client_for(&server).vectors().export("journal entries").await.unwrap();
    assert_eq!(String::from_utf8(csv).unwrap(), "text,mood\nhello,positive\n");
}

#[tokio::test]
async fn unauthorized_export_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vectors/export"))
        .and(header("user-agent", concat!("arca-rust/", env!("CARGO_PKG_VERSION"))))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).vectors().export("journal_entries").await.unwrap_err();
    assert!(matches!(err, ArcaError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_embedding_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let vectors = client_for(&server).vectors();

    let err = vectors
        .add(VectorAddRequest::new("notes", "hi").generate_embedding(false))
        .await
        .unwrap_err();
    assert!(matches!(err, ArcaError::Validation(_)));

    let err = vectors
        .search(VectorSearchRequest::new("notes", "hi").generate_embedding(false))
        .await
        .unwrap_err();
    assert!(matches!(err, ArcaError::Validation(_)));
}
