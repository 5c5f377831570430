//! Table models: structured rows over a columnar backend.

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::common::JsonObject;
use super::skill::SkillMetadata;
use crate::error::{ArcaError, ArcaResult};

/// Filter key the server reads a raw SQL WHERE clause from.
pub const CUSTOM_WHERE: &str = "customWhere";

/// Filter key restricting results to rows created in the last N days.
pub const DAYS_AGO: &str = "daysAgo";

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Column types supported by the table store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Varchar,
    Integer,
    Bigint,
    Double,
    Boolean,
    Timestamp,
    Date,
    Json,
}

impl ColumnType {
    pub const ALL: [ColumnType; 8] = [
        ColumnType::Varchar,
        ColumnType::Integer,
        ColumnType::Bigint,
        ColumnType::Double,
        ColumnType::Boolean,
        ColumnType::Timestamp,
        ColumnType::Date,
        ColumnType::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Integer => "INTEGER",
            ColumnType::Bigint => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Date => "DATE",
            ColumnType::Json => "JSON",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ArcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ArcaError::Validation(format!(
                    "unknown column type '{s}'; expected one of VARCHAR, INTEGER, BIGINT, DOUBLE, BOOLEAN, TIMESTAMP, DATE, JSON"
                ))
            })
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl TableColumn {
    /// A nullable column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: Some(true),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }
}

// ---------------------------------------------------------------------------
// Upsert
// ---------------------------------------------------------------------------

/// Request body for creating a table or appending a row to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    pub table_name: String,
    pub data: JsonObject,
    /// Only needed on the first insert, when the table is created.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<TableColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<SkillMetadata>,
}

impl UpsertRequest {
    pub fn new(table_name: impl Into<String>, data: JsonObject) -> Self {
        Self {
            table_name: table_name.into(),
            data,
            columns: Vec::new(),
            skill: None,
        }
    }

    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: Vec<TableColumn>) -> Self {
        self.columns = columns;
        self
    }

    pub fn skill(mut self, skill: SkillMetadata) -> Self {
        self.skill = Some(skill);
        self
    }
}

/// Response from an upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsertResponse {
    pub success: bool,
    pub message: Option<String>,
    pub table_name: Option<String>,
    pub s3_path: Option<String>,
    pub record_id: Option<Value>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Request for querying a table.
///
/// The raw WHERE clause set with [`QueryRequest::query`] is not a top-level
/// field on the wire: it travels inside `filters` under `customWhere`, next to
/// any structured filters.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub table_name: String,
    /// Raw SQL WHERE clause, e.g. `"protein > 20 AND carbs < 50"`.
    pub query: Option<String>,
    pub filters: JsonObject,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// e.g. `"created_at DESC"`.
    pub order_by: Option<String>,
    pub select: Vec<String>,
    pub group_by: Option<String>,
    pub having: Option<String>,
}

impl QueryRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Set the raw WHERE clause.
    pub fn query(mut self, clause: impl Into<String>) -> Self {
        self.query = Some(clause.into());
        self
    }

    /// Add a single structured filter.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Merge a map of structured filters.
    pub fn filters(mut self, filters: JsonObject) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Only rows created within the last `days` days.
    pub fn days_ago(self, days: u32) -> Self {
        self.filter(DAYS_AGO, days)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    pub fn having(mut self, clause: impl Into<String>) -> Self {
        self.having = Some(clause.into());
        self
    }

    /// The `filters` object as sent on the wire, or `None` when it would be empty.
    pub fn wire_filters(&self) -> Option<JsonObject> {
        let clause = non_empty(&self.query);
        if clause.is_none() && self.filters.is_empty() {
            return None;
        }

        let mut filters = self.filters.clone();
        if let Some(clause) = clause {
            filters.insert(CUSTOM_WHERE.to_string(), Value::String(clause.to_string()));
        }
        Some(filters)
    }
}

impl Serialize for QueryRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("tableName", &self.table_name)?;
        if let Some(filters) = self.wire_filters() {
            map.serialize_entry("filters", &filters)?;
        }
        if let Some(limit) = self.limit {
            map.serialize_entry("limit", &limit)?;
        }
        if let Some(offset) = self.offset {
            map.serialize_entry("offset", &offset)?;
        }
        if let Some(order_by) = non_empty(&self.order_by) {
            map.serialize_entry("orderBy", order_by)?;
        }
        if !self.select.is_empty() {
            map.serialize_entry("select", &self.select)?;
        }
        if let Some(group_by) = non_empty(&self.group_by) {
            map.serialize_entry("groupBy", group_by)?;
        }
        if let Some(having) = non_empty(&self.having) {
            map.serialize_entry("having", having)?;
        }
        map.end()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResponse {
    pub success: bool,
    pub data: Vec<JsonObject>,
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl QueryResponse {
    /// Decode every row into `T`.
    pub fn rows<T: DeserializeOwned>(&self) -> ArcaResult<Vec<T>> {
        self.data
            .iter()
            .map(|row| serde_json::from_value(Value::Object(row.clone())).map_err(ArcaError::from))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Request for updating rows in place.
///
/// Rows are selected by exact column matches, sent as a `where` object. With
/// no conditions the `where` key is omitted and every row is updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub table_name: String,
    pub data: JsonObject,
    #[serde(rename = "where", skip_serializing_if = "serde_json::Map::is_empty")]
    pub conditions: JsonObject,
}

impl UpdateRequest {
    pub fn new(table_name: impl Into<String>, data: JsonObject) -> Self {
        Self {
            table_name: table_name.into(),
            data,
            conditions: JsonObject::new(),
        }
    }

    /// Only update rows whose `column` equals `value`.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column.into(), value.into());
        self
    }

    /// Merge a map of exact-match conditions.
    pub fn conditions(mut self, conditions: JsonObject) -> Self {
        self.conditions.extend(conditions);
        self
    }
}

/// Response from an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: Option<String>,
    pub rows_updated: Option<u64>,
    pub updated_row: Option<Value>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

// ---------------------------------------------------------------------------
// Alter schema
// ---------------------------------------------------------------------------

/// Request for adding columns to an existing table.
#[derive(Debug, Clone, Default)]
pub struct AlterSchemaRequest {
    pub table_name: String,
    pub add_columns: Vec<TableColumn>,
    /// Values written into existing rows for the new columns, keyed by column name.
    pub default_values: JsonObject,
}

impl AlterSchemaRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    pub fn add_column(mut self, column: TableColumn) -> Self {
        self.add_columns.push(column);
        self
    }

    /// Add a column and backfill existing rows with `default`.
    pub fn add_column_with_default(self, column: TableColumn, default: impl Into<Value>) -> Self {
        let name = column.name.clone();
        self.add_column(column).default_value(name, default)
    }

    /// Set the backfill value for a column. `Value::Null` is sent explicitly.
    pub fn default_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values.insert(column.into(), value.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlterSchemaBody<'a> {
    table_name: &'a str,
    add_columns: Vec<AlterColumn<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlterColumn<'a> {
    #[serde(flatten)]
    column: &'a TableColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<&'a Value>,
}

impl Serialize for AlterSchemaRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AlterSchemaBody {
            table_name: &self.table_name,
            add_columns: self
                .add_columns
                .iter()
                .map(|column| AlterColumn {
                    column,
                    default_value: self.default_values.get(&column.name),
                })
                .collect(),
        }
        .serialize(serializer)
    }
}

/// Column changes reported by an alter-schema call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaChanges {
    pub columns_added: Vec<Value>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Response from an alter-schema call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlterSchemaResponse {
    pub success: bool,
    pub message: Option<String>,
    pub table_name: Option<String>,
    pub changes: Option<SchemaChanges>,
    pub new_schema: Option<Value>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

// ---------------------------------------------------------------------------
// Listing & schemas
// ---------------------------------------------------------------------------

/// A table owned by the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSummary {
    pub name: String,
    pub s3_path: Option<String>,
    pub row_count: Option<u64>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListTablesResponse {
    pub success: bool,
    pub table_count: Option<u64>,
    pub tables: Vec<TableSummary>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A column as reported by the server.
///
/// The type is kept as a string: the backend may report types outside
/// [`ColumnType`], such as `DECIMAL(10,2)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSchema {
    pub table_name: String,
    pub s3_path: Option<String>,
    pub columns: Vec<SchemaColumn>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemasResponse {
    pub success: bool,
    pub schemas: Vec<TableSchema>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl SchemasResponse {
    /// Schema of a single table, if present.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.schemas.iter().find(|s| s.table_name == name)
    }
}
