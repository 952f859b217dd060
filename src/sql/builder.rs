//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved entity.
//! `$n` placeholders are understood by both PostgreSQL and SQLite.

use crate::config::{ResolvedEntity, ResolvedRelation};
use crate::sql::BindValue;

/// Quote identifier (safe: only from validated declarations).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// Primary key first, then declared fields in order.
fn select_column_list(entity: &ResolvedEntity) -> String {
    std::iter::once(quoted(&entity.pk_column))
        .chain(entity.fields.iter().map(|f| quoted(&f.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key; id is the sole param.
pub fn select_by_id(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::BigInt(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        select_column_list(entity),
        quoted(&entity.table_name),
        quoted(&entity.pk_column),
        n
    );
    q
}

/// SELECT with exact-match filters (ANDed), ordered by primary key.
/// Filters on unknown columns are skipped.
pub fn select_list(entity: &ResolvedEntity, filters: &[(String, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if entity.column_type(col).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        where_parts.push(format!("{} = ${}", quoted(col), n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(entity),
        quoted(&entity.table_name),
        where_clause,
        quoted(&entity.pk_column)
    );
    q
}

pub fn count(entity: &ResolvedEntity) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) AS total FROM {}", quoted(&entity.table_name));
    q
}

/// INSERT the given columns; the primary key is always left to the database.
pub fn insert(entity: &ResolvedEntity, columns: &[(String, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, val) in columns {
        if *name == entity.pk_column || entity.field(name).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        cols.push(quoted(name));
        placeholders.push(format!("${}", n));
    }
    let table = quoted(&entity.table_name);
    let returning = select_column_list(entity);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only the given declared columns. With nothing to set this
/// degrades to a SELECT so callers still get the current row (or none).
pub fn update(entity: &ResolvedEntity, id: i64, columns: &[(String, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (name, val) in columns {
        if *name == entity.pk_column || entity.field(name).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        sets.push(format!("{} = ${}", quoted(name), n));
    }
    if sets.is_empty() {
        return select_by_id(entity, id);
    }
    let id_param = q.push_param(BindValue::BigInt(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(&entity.table_name),
        sets.join(", "),
        quoted(&entity.pk_column),
        id_param,
        select_column_list(entity)
    );
    q
}

/// DELETE by id.
pub fn delete(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::BigInt(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        quoted(&entity.table_name),
        quoted(&entity.pk_column),
        n,
        select_column_list(entity)
    );
    q
}

fn in_list(q: &mut QueryBuf, ids: &[i64]) -> String {
    ids.iter()
        .map(|id| format!("${}", q.push_param(BindValue::BigInt(*id))))
        .collect::<Vec<_>>()
        .join(", ")
}

/// (source, target) pairs of a relation for a batch of owners, ordered by owner then target.
pub fn select_relation_pairs(rel: &ResolvedRelation, owner_ids: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let src = quoted(&rel.source_column);
    let dst = quoted(&rel.target_column);
    if owner_ids.is_empty() {
        q.sql = format!("SELECT {}, {} FROM {} WHERE 1 = 0", src, dst, quoted(&rel.join_table));
        return q;
    }
    let placeholders = in_list(&mut q, owner_ids);
    q.sql = format!(
        "SELECT {src}, {dst} FROM {} WHERE {src} IN ({}) ORDER BY {src}, {dst}",
        quoted(&rel.join_table),
        placeholders,
    );
    q
}

/// Target primary keys that exist among `ids`.
pub fn select_existing_targets(rel: &ResolvedRelation, ids: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = quoted(&rel.target_pk);
    if ids.is_empty() {
        q.sql = format!("SELECT {} FROM {} WHERE 1 = 0", pk, quoted(&rel.target_table));
        return q;
    }
    let placeholders = in_list(&mut q, ids);
    q.sql = format!(
        "SELECT {pk} FROM {} WHERE {pk} IN ({})",
        quoted(&rel.target_table),
        placeholders
    );
    q
}

pub fn delete_relation_rows(rel: &ResolvedRelation, owner_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::BigInt(owner_id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}",
        quoted(&rel.join_table),
        quoted(&rel.source_column),
        n
    );
    q
}

pub fn insert_relation_row(rel: &ResolvedRelation, owner_id: i64, target_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let a = q.push_param(BindValue::BigInt(owner_id));
    let b = q.push_param(BindValue::BigInt(target_id));
    q.sql = format!(
        "INSERT INTO {} ({}, {}) VALUES (${}, ${})",
        quoted(&rel.join_table),
        quoted(&rel.source_column),
        quoted(&rel.target_column),
        a,
        b
    );
    q
}
