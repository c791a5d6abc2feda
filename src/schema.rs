use crate::domain::models::DocumentType;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Compiled-in default schema. `--schema <path>` overrides it.
pub const DEFAULT_SCHEMA: &str = include_str!("schema.yaml");

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("invalid schema source: {0}")]
    InvalidSource(String),
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FieldRule {
    pub pattern: Option<String>,
    pub max_length: Option<usize>,
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub recommended_includes: Vec<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TierRequirement {
    pub min_level: i64,
    #[serde(default)]
    pub required_sections: Vec<String>,
    #[serde(default)]
    pub required_fields: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TypeSchema {
    /// Frontmatter field carrying the document's identifier, when the type
    /// declares one (rules and memory files derive their name from the path).
    pub name_field: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub metadata_fields: Vec<String>,
    #[serde(default)]
    pub validation_rules: BTreeMap<String, FieldRule>,
    #[serde(default)]
    pub structural_requirements: BTreeMap<String, TierRequirement>,
}

impl TypeSchema {
    pub fn official_fields(&self) -> impl Iterator<Item = &String> {
        self.required.iter().chain(self.optional.iter())
    }

    pub fn is_official(&self, field: &str) -> bool {
        self.official_fields().any(|f| f == field)
    }

    pub fn is_metadata_field(&self, field: &str) -> bool {
        self.metadata_fields.iter().any(|f| f == field)
    }
}

#[derive(Debug, Deserialize, Default)]
struct StyleLabels {
    #[serde(default)]
    allowed: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    style_labels: StyleLabels,
    #[serde(default)]
    frontmatter_schemas: BTreeMap<String, TypeSchema>,
}

/// One registry per run, passed by reference to every component that needs
/// schema access. A type with no entry degrades to "skip type-specific
/// checks"; it is never a crash.
pub struct SchemaRegistry {
    schemas: BTreeMap<DocumentType, TypeSchema>,
    style_labels: HashSet<String>,
}

impl SchemaRegistry {
    pub fn load_default() -> Result<Self, SchemaError> {
        Self::load(DEFAULT_SCHEMA)
    }

    pub fn load(source: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_yaml::from_str(source)
            .map_err(|e| SchemaError::InvalidSource(e.to_string()))?;
        if file.frontmatter_schemas.is_empty() {
            return Err(SchemaError::InvalidSource(
                "no frontmatter_schemas defined".to_string(),
            ));
        }
        let mut schemas = BTreeMap::new();
        for (key, type_schema) in file.frontmatter_schemas {
            let doc_type = DocumentType::from_key(&key).ok_or_else(|| {
                SchemaError::InvalidSource(format!("unknown document type: {key}"))
            })?;
            schemas.insert(doc_type, type_schema);
        }
        Ok(Self {
            schemas,
            style_labels: file.style_labels.allowed.into_iter().collect(),
        })
    }

    pub fn for_type(&self, doc_type: DocumentType) -> Option<&TypeSchema> {
        self.schemas.get(&doc_type)
    }

    pub fn style_labels(&self) -> &HashSet<String> {
        &self.style_labels
    }
}
