//! Generic CRUD execution against the pool, including many-to-many relation sets.

use crate::config::{FieldType, ResolvedEntity};
use crate::error::{AppError, FieldErrors};
use crate::service::CleanedData;
use crate::sql::{
    count, delete, delete_relation_rows, insert, insert_relation_row, select_by_id, select_existing_targets,
    select_list, select_relation_pairs, update, BindValue, QueryBuf,
};
use serde_json::{Map, Value};
use sqlx::any::{Any, AnyArguments, AnyRow};
use sqlx::{AnyConnection, AnyPool};
use sqlx::query::Query;
use sqlx::Row;
use std::collections::{HashMap, HashSet};

type JsonRow = Map<String, Value>;

pub struct CrudService;

impl CrudService {
    /// List rows matching every filter (exact match), ordered by primary key.
    pub async fn list(
        pool: &AnyPool,
        entity: &ResolvedEntity,
        filters: &[(String, BindValue)],
    ) -> Result<Vec<Value>, AppError> {
        let mut conn = pool.acquire().await?;
        let q = select_list(entity, filters);
        let mut rows = Self::fetch_all(&mut conn, entity, &q).await?;
        Self::attach_relations(&mut conn, entity, &mut rows).await?;
        Ok(rows.into_iter().map(Value::Object).collect())
    }

    /// Fetch one row by primary key. Returns JSON object or None.
    pub async fn read(pool: &AnyPool, entity: &ResolvedEntity, id: i64) -> Result<Option<Value>, AppError> {
        let mut conn = pool.acquire().await?;
        let q = select_by_id(entity, id);
        let Some(row) = Self::fetch_optional(&mut conn, entity, &q).await? else {
            return Ok(None);
        };
        let mut rows = vec![row];
        Self::attach_relations(&mut conn, entity, &mut rows).await?;
        Ok(rows.pop().map(Value::Object))
    }

    /// Insert one row and its relation sets in a transaction. Returns created row.
    pub async fn create(pool: &AnyPool, entity: &ResolvedEntity, data: &CleanedData) -> Result<Value, AppError> {
        let mut tx = pool.begin().await?;
        Self::check_relation_targets(&mut tx, entity, data).await?;
        let q = insert(entity, &data.columns);
        let row = Self::fetch_optional(&mut tx, entity, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        let id = row_id(entity, &row)?;
        Self::replace_relations(&mut tx, entity, id, data).await?;
        let mut rows = vec![row];
        Self::attach_relations(&mut tx, entity, &mut rows).await?;
        tx.commit().await?;
        tracing::debug!(table = %entity.table_name, id, "created");
        Ok(rows.pop().map(Value::Object).unwrap_or(Value::Null))
    }

    /// Update supplied columns and replace supplied relation sets. Returns updated row or None.
    pub async fn update(
        pool: &AnyPool,
        entity: &ResolvedEntity,
        id: i64,
        data: &CleanedData,
    ) -> Result<Option<Value>, AppError> {
        let mut tx = pool.begin().await?;
        let q = update(entity, id, &data.columns);
        let Some(row) = Self::fetch_optional(&mut tx, entity, &q).await? else {
            return Ok(None);
        };
        Self::check_relation_targets(&mut tx, entity, data).await?;
        Self::replace_relations(&mut tx, entity, id, data).await?;
        let mut rows = vec![row];
        Self::attach_relations(&mut tx, entity, &mut rows).await?;
        tx.commit().await?;
        tracing::debug!(table = %entity.table_name, id, "updated");
        Ok(rows.pop().map(Value::Object))
    }

    /// Delete one row by id together with its join rows. Returns deleted row or None.
    pub async fn delete(pool: &AnyPool, entity: &ResolvedEntity, id: i64) -> Result<Option<Value>, AppError> {
        let mut tx = pool.begin().await?;
        for rel in &entity.relations {
            Self::execute(&mut tx, &delete_relation_rows(rel, id)).await?;
        }
        let q = delete(entity, id);
        let Some(row) = Self::fetch_optional(&mut tx, entity, &q).await? else {
            return Ok(None);
        };
        tx.commit().await?;
        tracing::debug!(table = %entity.table_name, id, "deleted");
        Ok(Some(Value::Object(row)))
    }

    pub async fn count(pool: &AnyPool, entity: &ResolvedEntity) -> Result<i64, AppError> {
        let q = count(entity);
        tracing::debug!(sql = %q.sql, "query");
        let row = bind_all(&q).fetch_one(pool).await?;
        Ok(row.try_get::<i64, _>("total")?)
    }

    /// Every id in a supplied relation set must exist in the target table.
    async fn check_relation_targets(
        conn: &mut AnyConnection,
        entity: &ResolvedEntity,
        data: &CleanedData,
    ) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        for (name, ids) in &data.relations {
            let Some(rel) = entity.relation(name) else { continue };
            if ids.is_empty() {
                continue;
            }
            let q = select_existing_targets(rel, ids);
            tracing::debug!(sql = %q.sql, params = ?q.params, "query");
            let rows = bind_all(&q).fetch_all(&mut *conn).await?;
            let existing = rows
                .iter()
                .map(|r| r.try_get::<i64, _>(rel.target_pk.as_str()))
                .collect::<Result<HashSet<_>, _>>()?;
            for id in ids.iter().filter(|id| !existing.contains(*id)) {
                errors.add(name, format!("Invalid pk \"{}\" - object does not exist.", id));
            }
        }
        errors.into_result()
    }

    async fn replace_relations(
        conn: &mut AnyConnection,
        entity: &ResolvedEntity,
        id: i64,
        data: &CleanedData,
    ) -> Result<(), AppError> {
        for (name, ids) in &data.relations {
            let Some(rel) = entity.relation(name) else { continue };
            Self::execute(conn, &delete_relation_rows(rel, id)).await?;
            for target in ids {
                Self::execute(conn, &insert_relation_row(rel, id, *target)).await?;
            }
        }
        Ok(())
    }

    /// Set each relation key on every row to the list of related ids (one query per relation).
    async fn attach_relations(
        conn: &mut AnyConnection,
        entity: &ResolvedEntity,
        rows: &mut [JsonRow],
    ) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }
        let ids = rows.iter().map(|r| row_id(entity, r)).collect::<Result<Vec<_>, _>>()?;
        for rel in &entity.relations {
            let q = select_relation_pairs(rel, &ids);
            tracing::debug!(sql = %q.sql, params = ?q.params, "query");
            let pairs = bind_all(&q).fetch_all(&mut *conn).await?;
            let mut by_owner: HashMap<i64, Vec<Value>> = HashMap::new();
            for p in &pairs {
                let owner: i64 = p.try_get(rel.source_column.as_str())?;
                let target: i64 = p.try_get(rel.target_column.as_str())?;
                by_owner.entry(owner).or_default().push(Value::from(target));
            }
            for (row, id) in rows.iter_mut().zip(&ids) {
                let related = by_owner.remove(id).unwrap_or_default();
                row.insert(rel.name.clone(), Value::Array(related));
            }
        }
        Ok(())
    }

    async fn fetch_all(
        conn: &mut AnyConnection,
        entity: &ResolvedEntity,
        q: &QueryBuf,
    ) -> Result<Vec<JsonRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&mut *conn).await?;
        rows.iter().map(|r| row_to_json(entity, r)).collect()
    }

    async fn fetch_optional(
        conn: &mut AnyConnection,
        entity: &ResolvedEntity,
        q: &QueryBuf,
    ) -> Result<Option<JsonRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(&mut *conn).await?;
        row.map(|r| row_to_json(entity, &r)).transpose()
    }

    async fn execute(conn: &mut AnyConnection, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let done = bind_all(q).execute(&mut *conn).await?;
        Ok(done.rows_affected())
    }
}

fn bind_all(q: &QueryBuf) -> Query<'_, Any, AnyArguments<'_>> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn row_id(entity: &ResolvedEntity, row: &JsonRow) -> Result<i64, AppError> {
    row.get(&entity.pk_column)
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::Db(sqlx::Error::ColumnNotFound(entity.pk_column.clone())))
}

/// Decode by declared type: primary key first, then each field.
fn row_to_json(entity: &ResolvedEntity, row: &AnyRow) -> Result<JsonRow, AppError> {
    let mut map = Map::new();
    let id: i64 = row.try_get(entity.pk_column.as_str())?;
    map.insert(entity.pk_column.clone(), Value::from(id));
    for f in &entity.fields {
        let name = f.name.as_str();
        let v = match f.field_type {
            FieldType::BigInt => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            FieldType::Text | FieldType::Date => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        };
        map.insert(f.name.clone(), v.unwrap_or(Value::Null));
    }
    Ok(map)
}
