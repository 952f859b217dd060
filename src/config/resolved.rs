//! Resolved model: declarations validated and flattened for runtime use.

use crate::config::{FieldType, Operation};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug)]
pub struct ResolvedField {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub allow_blank: bool,
    pub max_length: Option<u32>,
}

/// Many-to-many relation with the target table already looked up.
#[derive(Clone, Debug)]
pub struct ResolvedRelation {
    pub name: String,
    pub target_model_id: String,
    pub target_table: String,
    pub target_pk: String,
    pub join_table: String,
    pub source_column: String,
    pub target_column: String,
    pub max_items: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub model_id: String,
    pub table_name: String,
    pub pk_column: String,
    pub fields: Vec<ResolvedField>,
    pub relations: Vec<ResolvedRelation>,
}

impl ResolvedEntity {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&ResolvedRelation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Type of a filterable column: the primary key or a declared field.
    pub fn column_type(&self, name: &str) -> Option<FieldType> {
        if name == self.pk_column {
            return Some(FieldType::BigInt);
        }
        self.field(name).map(|f| f.field_type)
    }
}

#[derive(Clone, Debug)]
pub struct FilterField {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub path_segment: String,
    pub entity: ResolvedEntity,
    pub filters: Vec<FilterField>,
    pub operations: HashSet<Operation>,
}

impl ResolvedResource {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterField> {
        self.filters.iter().find(|f| f.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    /// In declaration order; relation targets always precede their join tables in DDL.
    pub entities: Vec<ResolvedEntity>,
    pub resource_by_path: HashMap<String, ResolvedResource>,
}

impl ResolvedModel {
    pub fn resource_by_path(&self, path: &str) -> Option<&ResolvedResource> {
        self.resource_by_path.get(path)
    }

    pub fn entity(&self, model_id: &str) -> Option<&ResolvedEntity> {
        self.entities.iter().find(|e| e.model_id == model_id)
    }
}
