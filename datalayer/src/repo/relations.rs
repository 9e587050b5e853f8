use std::collections::HashMap;

use crate::db::connection::Database;
use crate::db::error::{DbError, Result};
use crate::db::model::{Model, Relation, RelationKind};
use crate::db::query::Builder;
use crate::db::value::Value;

/// 预加载关联：每个关联一条 `WHERE IN` 查询，结果挂到行的同名字段上
/// Eager-load relations: one `WHERE IN` query per relation, attached under the relation name
///
/// `HasMany` 挂数组，`BelongsTo` 挂对象或 `null`
/// `HasMany` attaches an array, `BelongsTo` an object or `null`
pub async fn load_relations<M: Model>(
    db: &Database,
    rows: &mut [serde_json::Value],
    names: &[String],
) -> Result<()> {
    for name in names {
        let relation =
            M::relation(name).ok_or_else(|| DbError::UnknownRelation(name.to_string()))?;
        load_relation(db, rows, relation).await?;
    }
    Ok(())
}

async fn load_relation(
    db: &Database,
    rows: &mut [serde_json::Value],
    relation: &Relation,
) -> Result<()> {
    // 父行上的匹配列与子表中的匹配列 / matching column on our rows, and on the related rows
    let (local, remote) = match relation.kind {
        RelationKind::HasMany => (relation.other_key, relation.foreign_key),
        RelationKind::BelongsTo => (relation.foreign_key, relation.other_key),
    };

    let mut keys: Vec<Value> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for row in rows.iter() {
        if let Some(k) = row.get(local).and_then(match_key) {
            if !seen.contains(&k) {
                seen.push(k);
                keys.push(Value::from(&row[local]));
            }
        }
    }

    let mut grouped: HashMap<String, Vec<serde_json::Value>> = HashMap::new();
    if !keys.is_empty() {
        let mut query = Builder::table(relation.table).soft_deletes(relation.soft_delete);
        query.where_in(remote, keys);
        let (sql, binds) = query.to_select(db.dialect());
        for related in db.fetch_all_json(&sql, &binds).await? {
            if let Some(k) = related.get(remote).and_then(match_key) {
                grouped.entry(k).or_default().push(related);
            }
        }
    }
    tracing::debug!(
        relation = relation.name,
        parents = rows.len(),
        matched = grouped.len(),
        "eager loaded"
    );

    for row in rows.iter_mut() {
        let found = row
            .get(local)
            .and_then(match_key)
            .and_then(|k| grouped.get(&k));
        let attached = match relation.kind {
            RelationKind::HasMany => {
                serde_json::Value::Array(found.cloned().unwrap_or_default())
            }
            RelationKind::BelongsTo => found
                .and_then(|v| v.first().cloned())
                .unwrap_or(serde_json::Value::Null),
        };
        if let serde_json::Value::Object(map) = row {
            map.insert(relation.name.to_string(), attached);
        }
    }
    Ok(())
}

fn match_key(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
