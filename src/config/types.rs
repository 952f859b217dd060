//! Raw declaration types: models (tables, fields, many-to-many relations) and the API resources exposing them.

use serde::{Deserialize, Serialize};

/// Storage type of a declared field. Dates are stored as `YYYY-MM-DD` text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[serde(rename = "bigint")]
    BigInt,
    Text,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::BigInt => "bigint",
            FieldType::Text => "text",
            FieldType::Date => "date",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub nullable: bool,
    /// Text fields reject empty or whitespace-only strings unless set.
    #[serde(default)]
    pub allow_blank: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
}

impl FieldConfig {
    pub fn new(name: &str, type_: FieldType) -> Self {
        FieldConfig {
            name: name.to_string(),
            type_,
            nullable: false,
            allow_blank: false,
            max_length: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Many-to-many relation stored in a join table `(source_column, target_column)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManyToManyConfig {
    /// Key used in request and response bodies (e.g. "students").
    pub name: String,
    pub target_model_id: String,
    pub join_table: String,
    pub source_column: String,
    pub target_column: String,
    #[serde(default)]
    pub max_items: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub table: String,
    /// Auto-increment integer key; never listed in `fields`.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub many_to_many: Vec<ManyToManyConfig>,
}

fn default_primary_key() -> String {
    "id".into()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

fn all_operations() -> Vec<Operation> {
    Operation::ALL.to_vec()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiResourceConfig {
    pub model_id: String,
    pub path_segment: String,
    /// Fields (or the primary key) usable as `?field=value` equality filters on list.
    #[serde(default)]
    pub filter_fields: Vec<String>,
    #[serde(default = "all_operations")]
    pub operations: Vec<Operation>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FullConfig {
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub api_resources: Vec<ApiResourceConfig>,
}
