//! Skill models: SKILL.md metadata that tells an AI assistant how to use a table.

use serde::{Deserialize, Serialize};

use super::common::{is_blank, is_empty_list, JsonObject};

// ---------------------------------------------------------------------------
// Table skills
// ---------------------------------------------------------------------------

/// Skill metadata for a structured table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example SQL statements against the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    /// How this table relates to other tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SkillMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }

    pub fn relationships<I, S>(mut self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships = Some(relationships.into_iter().map(Into::into).collect());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Vector skills
// ---------------------------------------------------------------------------

/// Describes one metadata key stored alongside vector entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub description: String,
    /// Representative values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

impl MetadataField {
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description: description.into(),
            examples: None,
        }
    }

    pub fn examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }
}

/// Skill metadata for a vector table.
///
/// Unlike the other request bodies this one is sent with snake_case keys, and
/// empty strings or lists are dropped rather than sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorSkillMetadata {
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_list")]
    pub metadata_fields: Option<Vec<MetadataField>>,
    /// Natural-language queries that work well against the table.
    #[serde(skip_serializing_if = "is_empty_list")]
    pub search_examples: Option<Vec<String>>,
    /// Filter expressions such as `mood = 'positive'`.
    #[serde(skip_serializing_if = "is_empty_list")]
    pub filter_examples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "is_blank")]
    pub notes: Option<String>,
}

impl VectorSkillMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata_fields(mut self, fields: Vec<MetadataField>) -> Self {
        self.metadata_fields = Some(fields);
        self
    }

    pub fn search_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Which service a skill belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Table,
    Vector,
    /// A service this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// The SKILL.md document of a single table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillResponse {
    pub success: bool,
    pub table_name: Option<String>,
    /// Rendered SKILL.md content.
    pub skill: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// One entry of a skills listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub table_name: String,
    pub skill: Option<String>,
    /// Only populated by the combined `/api/v1/skills` listing.
    #[serde(rename = "type")]
    pub kind: Option<SkillKind>,
    pub success: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A listing of skills, either per service or combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillsResponse {
    pub success: bool,
    pub user_id: Option<String>,
    pub skills: Vec<SkillEntry>,
    pub table_skill_count: Option<u64>,
    pub vector_skill_count: Option<u64>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl SkillsResponse {
    /// Skills belonging to one service.
    pub fn of_kind(&self, kind: SkillKind) -> impl Iterator<Item = &SkillEntry> {
        self.skills.iter().filter(move |s| s.kind == Some(kind))
    }
}
