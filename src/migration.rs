//! Apply declarations to the database: one table per model, then one join table per relation.
//! Idempotent (IF NOT EXISTS); existing tables are never altered.

use crate::config::{FieldType, ResolvedEntity, ResolvedModel, ResolvedRelation};
use crate::error::AppError;
use crate::sql::quoted;
use crate::store::Backend;
use sqlx::AnyPool;

fn column_type(backend: Backend, t: FieldType) -> &'static str {
    match (backend, t) {
        (Backend::Postgres, FieldType::BigInt) => "BIGINT",
        (Backend::Sqlite, FieldType::BigInt) => "INTEGER",
        (_, FieldType::Text | FieldType::Date) => "TEXT",
    }
}

fn pk_definition(backend: Backend, pk: &str) -> String {
    match backend {
        Backend::Postgres => format!("{} BIGSERIAL PRIMARY KEY", quoted(pk)),
        Backend::Sqlite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(pk)),
    }
}

pub fn create_table_sql(backend: Backend, entity: &ResolvedEntity) -> String {
    let mut col_defs = vec![pk_definition(backend, &entity.pk_column)];
    for f in &entity.fields {
        let mut def = format!("{} {}", quoted(&f.name), column_type(backend, f.field_type));
        if !f.nullable {
            def.push_str(" NOT NULL");
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(&entity.table_name),
        col_defs.join(",\n  ")
    )
}

pub fn create_join_table_sql(backend: Backend, entity: &ResolvedEntity, rel: &ResolvedRelation) -> String {
    let int = column_type(backend, FieldType::BigInt);
    format!(
        "CREATE TABLE IF NOT EXISTS {join} (\n  {src} {int} NOT NULL REFERENCES {owner} ({owner_pk}) ON DELETE CASCADE,\n  {dst} {int} NOT NULL REFERENCES {target} ({target_pk}) ON DELETE CASCADE,\n  PRIMARY KEY ({src}, {dst})\n)",
        join = quoted(&rel.join_table),
        src = quoted(&rel.source_column),
        dst = quoted(&rel.target_column),
        owner = quoted(&entity.table_name),
        owner_pk = quoted(&entity.pk_column),
        target = quoted(&rel.target_table),
        target_pk = quoted(&rel.target_pk),
    )
}

/// Create every model table, then every join table (so references resolve).
pub async fn apply_migrations(pool: &AnyPool, backend: Backend, model: &ResolvedModel) -> Result<(), AppError> {
    for entity in &model.entities {
        let sql = create_table_sql(backend, entity);
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
    }
    for entity in &model.entities {
        for rel in &entity.relations {
            let sql = create_join_table_sql(backend, entity, rel);
            tracing::debug!(sql = %sql, "migration");
            sqlx::query(&sql).execute(pool).await?;
        }
    }
    tracing::info!(tables = model.entities.len(), "migrations applied");
    Ok(())
}
