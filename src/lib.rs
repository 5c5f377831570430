//! # Arca SDK for Rust
//!
//! Client library for **Arca**, a private data vault for personal AI
//! assistants. Arca exposes two services over HTTP:
//!
//! - **Tables**: structured rows with SQL-like querying over a columnar backend
//! - **Vectors**: text entries with embeddings, searched semantically
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arca::{ArcaClient, ColumnType, QueryRequest, TableColumn, UpsertRequest, VectorSearchRequest};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), arca::ArcaError> {
//!     let client = ArcaClient::new("your-api-key")?;
//!
//!     // Create the table on first insert
//!     let row = arca::to_object(&json!({"food": "Pizza", "calories": 800}))?;
//!     client.tables().upsert(
//!         UpsertRequest::new("meals", row)
//!             .column(TableColumn::new("food", ColumnType::Varchar))
//!             .column(TableColumn::new("calories", ColumnType::Integer)),
//!     ).await?;
//!
//!     // Raw WHERE clause plus a time filter
//!     let heavy = client.tables().query(
//!         QueryRequest::new("meals").query("calories > 500").days_ago(7).order_by("calories DESC"),
//!     ).await?;
//!     println!("{} heavy meals this week", heavy.data.len());
//!
//!     // Semantic search
//!     let hits = client.vectors().search(
//!         VectorSearchRequest::new("journal_entries", "days when I felt accomplished")
//!             .filter("category = 'personal'"),
//!     ).await?;
//!     println!("{} matches", hits.results.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every call returns [`ArcaResult`]. A rejected API key surfaces as
//! [`ArcaError::Auth`], any other non-2xx response as [`ArcaError::Api`] with
//! the server's message, status and guidance, and transport failures as
//! [`ArcaError::Network`].
//!
//! ## Architecture
//!
//! | Sub-client | Access | Purpose |
//! |------------|--------|---------|
//! | [`TablesClient`] | `client.tables()` | Upsert, query, update, alter, export tables |
//! | [`VectorsClient`] | `client.vectors()` | Add entries and search them semantically |
//!
//! Skills, the SKILL.md documents describing each table to an AI assistant,
//! are available per service and combined via [`ArcaClient::all_skills`].

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{
    get_all_skills, ArcaClient, ArcaClientBuilder, TablesClient, VectorsClient, DEFAULT_BASE_URL,
};
pub use config::{load_config, ArcaConfig};
pub use error::{ApiError, ArcaError, ArcaResult};
pub use models::*;
