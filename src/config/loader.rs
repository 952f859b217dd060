//! Load declarations from JSON and resolve them into the runtime model.

use crate::config::resolved::{
    FilterField, ResolvedEntity, ResolvedField, ResolvedModel, ResolvedRelation, ResolvedResource,
};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Build resolved model from full config (validates first).
pub fn resolve(config: &FullConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let models_by_id: HashMap<_, _> = config.models.iter().map(|m| (m.id.as_str(), m)).collect();

    let mut entities = Vec::with_capacity(config.models.len());
    for m in &config.models {
        let fields = m
            .fields
            .iter()
            .map(|f| ResolvedField {
                name: f.name.clone(),
                field_type: f.type_,
                nullable: f.nullable,
                allow_blank: f.allow_blank,
                max_length: f.max_length,
            })
            .collect();
        let mut relations = Vec::with_capacity(m.many_to_many.len());
        for r in &m.many_to_many {
            let target = models_by_id
                .get(r.target_model_id.as_str())
                .ok_or_else(|| ConfigError::MissingReference {
                    kind: "model",
                    id: r.target_model_id.clone(),
                })?;
            relations.push(ResolvedRelation {
                name: r.name.clone(),
                target_model_id: target.id.clone(),
                target_table: target.table.clone(),
                target_pk: target.primary_key.clone(),
                join_table: r.join_table.clone(),
                source_column: r.source_column.clone(),
                target_column: r.target_column.clone(),
                max_items: r.max_items,
            });
        }
        entities.push(ResolvedEntity {
            model_id: m.id.clone(),
            table_name: m.table.clone(),
            pk_column: m.primary_key.clone(),
            fields,
            relations,
        });
    }

    let mut resource_by_path = HashMap::new();
    for api in &config.api_resources {
        let entity = entities
            .iter()
            .find(|e| e.model_id == api.model_id)
            .cloned()
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "model",
                id: api.model_id.clone(),
            })?;
        let filters = api
            .filter_fields
            .iter()
            .filter_map(|name| {
                entity.column_type(name).map(|field_type| FilterField {
                    name: name.clone(),
                    field_type,
                })
            })
            .collect();
        resource_by_path.insert(
            api.path_segment.clone(),
            ResolvedResource {
                path_segment: api.path_segment.clone(),
                entity,
                filters,
                operations: api.operations.iter().copied().collect(),
            },
        );
    }

    Ok(ResolvedModel {
        entities,
        resource_by_path,
    })
}

pub fn parse_config(json: &str) -> Result<FullConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read a declarations file (same shape as [`FullConfig`]).
pub async fn load_from_path(path: &Path) -> Result<FullConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded model declarations");
    parse_config(&raw)
}
