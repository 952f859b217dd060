//! Declaration validation: identifiers, referential integrity and API consistency.

use crate::config::FullConfig;
use crate::error::ConfigError;
use std::collections::HashSet;

/// Identifiers end up quoted inside generated SQL; keep them to `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(kind: &str, s: &str) -> Result<(), ConfigError> {
    if is_valid_identifier(s) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("invalid {} identifier '{}'", kind, s)))
    }
}

pub fn validate(config: &FullConfig) -> Result<(), ConfigError> {
    let mut model_ids = HashSet::new();
    let mut tables = HashSet::new();
    for m in &config.models {
        if !model_ids.insert(m.id.as_str()) {
            return Err(ConfigError::Validation(format!("duplicate model id '{}'", m.id)));
        }
        check_identifier("table", &m.table)?;
        check_identifier("column", &m.primary_key)?;
        if !tables.insert(m.table.as_str()) {
            return Err(ConfigError::Validation(format!("duplicate table '{}'", m.table)));
        }

        let mut names = HashSet::new();
        names.insert(m.primary_key.as_str());
        for f in &m.fields {
            check_identifier("column", &f.name)?;
            if !names.insert(f.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "model '{}': duplicate field '{}'",
                    m.id, f.name
                )));
            }
        }
        for r in &m.many_to_many {
            if !names.insert(r.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "model '{}': relation '{}' clashes with a field",
                    m.id, r.name
                )));
            }
            check_identifier("table", &r.join_table)?;
            check_identifier("column", &r.source_column)?;
            check_identifier("column", &r.target_column)?;
            if r.source_column == r.target_column {
                return Err(ConfigError::Validation(format!(
                    "relation '{}': join columns must differ",
                    r.name
                )));
            }
            if !tables.insert(r.join_table.as_str()) {
                return Err(ConfigError::Validation(format!("duplicate table '{}'", r.join_table)));
            }
        }
    }

    for m in &config.models {
        for r in &m.many_to_many {
            if !model_ids.contains(r.target_model_id.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "model",
                    id: r.target_model_id.clone(),
                });
            }
        }
    }

    let mut path_segments = HashSet::new();
    for api in &config.api_resources {
        let model = config
            .models
            .iter()
            .find(|m| m.id == api.model_id)
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "model",
                id: api.model_id.clone(),
            })?;
        if api.path_segment.is_empty() || api.path_segment.contains('/') {
            return Err(ConfigError::Validation(format!(
                "invalid path segment '{}'",
                api.path_segment
            )));
        }
        if !path_segments.insert(api.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(api.path_segment.clone()));
        }
        for f in &api.filter_fields {
            let known = *f == model.primary_key || model.fields.iter().any(|c| c.name == *f);
            if !known {
                return Err(ConfigError::MissingReference {
                    kind: "filter field",
                    id: format!("{}.{}", api.path_segment, f),
                });
            }
        }
    }

    Ok(())
}
