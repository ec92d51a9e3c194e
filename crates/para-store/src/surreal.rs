//! SurrealDB document store
//!
//! Each collection is a schemaless table and each document a record whose
//! id is the document's `id`. Every statement uses bound parameters; only
//! field names (static, validated) are spliced into query text.

use crate::query::{Condition, Direction, FindQuery};
use crate::{document_id, Collection, DocumentStore};
use async_trait::async_trait;
use para_core::{DatabaseConfig, ParaError, Result};
use serde::Deserialize;
use serde_json::Value;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::debug;

/// Projection that returns the record key as a plain string `id`
const SELECT_DOC: &str = "SELECT *, meta::id(id) AS id";

/// SurrealDB store implementation
pub struct SurrealStore {
    client: Surreal<Client>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

impl SurrealStore {
    /// Create a new SurrealDB connection
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        // The client adds the scheme itself
        let url = config
            .surrealdb_url
            .strip_prefix("ws://")
            .or_else(|| config.surrealdb_url.strip_prefix("wss://"))
            .unwrap_or(&config.surrealdb_url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| ParaError::DatabaseError(format!("SurrealDB connection failed: {e}")))?;

        client
            .signin(Root {
                username: &config.surrealdb_user,
                password: &config.surrealdb_pass,
            })
            .await
            .map_err(|e| ParaError::DatabaseError(format!("SurrealDB auth failed: {e}")))?;

        client
            .use_ns(&config.surrealdb_namespace)
            .use_db(&config.surrealdb_database)
            .await
            .map_err(|e| ParaError::DatabaseError(format!("SurrealDB namespace error: {e}")))?;

        Ok(Self { client })
    }

    /// Define one schemaless table per collection (idempotent)
    pub async fn init_schema(&self) -> Result<()> {
        let statements: String = Collection::ALL
            .iter()
            .map(|c| format!("DEFINE TABLE IF NOT EXISTS {c} SCHEMALESS;\n"))
            .collect();

        self.client
            .query(statements)
            .await
            .map_err(|e| ParaError::DatabaseError(format!("Schema init failed: {e}")))?
            .check()
            .map_err(|e| ParaError::DatabaseError(format!("Schema init failed: {e}")))?;

        Ok(())
    }

    /// Run a data-modifying statement bound to `$tb`/`$id` and report how
    /// many records it touched.
    async fn affected(&self, statement: String, binds: Vec<(String, Value)>) -> Result<u64> {
        let query = format!("LET $changed = ({statement}); RETURN array::len($changed);");
        let mut request = self.client.query(query);
        for bind in binds {
            request = request.bind(bind);
        }

        let mut response = request
            .await
            .map_err(|e| ParaError::DatabaseError(format!("Update failed: {e}")))?;
        let changed: Option<u64> = response
            .take(1)
            .map_err(|e| ParaError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(changed.unwrap_or(0))
    }
}

/// Field names are spliced into SurrealQL, so only plain dotted
/// identifiers are accepted.
fn check_field(field: &str) -> Result<&str> {
    let valid = !field.is_empty()
        && field
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

    if valid {
        Ok(field)
    } else {
        Err(ParaError::DatabaseError(format!("Invalid field name: {field}")))
    }
}

/// Renders conditions into a `WHERE` clause, collecting bound parameters
#[derive(Default)]
struct WhereBuilder {
    binds: Vec<(String, Value)>,
}

impl WhereBuilder {
    fn param(&mut self, value: Value) -> String {
        let name = format!("p{}", self.binds.len());
        self.binds.push((name.clone(), value));
        format!("${name}")
    }

    fn clause(&mut self, conditions: &[Condition]) -> Result<String> {
        if conditions.is_empty() {
            return Ok(String::new());
        }
        let parts = conditions
            .iter()
            .map(|c| self.render(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(" WHERE {}", parts.join(" AND ")))
    }

    fn render(&mut self, condition: &Condition) -> Result<String> {
        Ok(match condition {
            Condition::Eq(f, v) => format!("{} = {}", check_field(f)?, self.param(v.clone())),
            Condition::Gt(f, v) => format!("{} > {}", check_field(f)?, self.param(v.clone())),
            Condition::Gte(f, v) => format!("{} >= {}", check_field(f)?, self.param(v.clone())),
            Condition::Contains(f, v) => {
                format!("{} CONTAINS {}", check_field(f)?, self.param(v.clone()))
            }
            Condition::ContainsText(f, needle) => {
                // Join array elements with a newline so a match cannot span two of them
                let field = check_field(f)?;
                let needle = self.param(Value::String(needle.to_lowercase()));
                format!(
                    "string::lowercase(array::join(array::flatten([{field} ?? []]), '\\n')) CONTAINS {needle}"
                )
            }
            Condition::IsEmpty(f) => format!("array::len({} ?? []) = 0", check_field(f)?),
            Condition::AnyOf(conditions) => {
                if conditions.is_empty() {
                    "false".to_string()
                } else {
                    let parts = conditions
                        .iter()
                        .map(|c| self.render(c))
                        .collect::<Result<Vec<_>>>()?;
                    format!("({})", parts.join(" OR "))
                }
            }
        })
    }
}

fn order_clause(query: &FindQuery) -> Result<String> {
    if query.sort.is_empty() {
        return Ok(String::new());
    }
    let parts = query
        .sort
        .iter()
        .map(|s| {
            let dir = match s.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            Ok(format!("{} {dir}", check_field(s.field)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

fn without_id(mut doc: Value) -> Value {
    if let Some(object) = doc.as_object_mut() {
        object.remove("id");
    }
    doc
}

#[async_trait]
impl DocumentStore for SurrealStore {
    async fn insert(&self, collection: Collection, doc: Value) -> Result<()> {
        let id = document_id(&doc)?;
        self.client
            .query("CREATE type::thing($tb, $id) CONTENT $doc RETURN NONE")
            .bind(("tb", collection.as_str()))
            .bind(("id", id))
            .bind(("doc", without_id(doc)))
            .await
            .map_err(|e| ParaError::DatabaseError(format!("Failed to insert into {collection}: {e}")))?
            .check()
            .map_err(|e| ParaError::DatabaseError(format!("Failed to insert into {collection}: {e}")))?;
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let mut response = self
            .client
            .query(format!("{SELECT_DOC} FROM type::thing($tb, $id)"))
            .bind(("tb", collection.as_str()))
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| ParaError::DatabaseError(format!("Failed to get from {collection}: {e}")))?;

        response
            .take(0)
            .map_err(|e| ParaError::DatabaseError(format!("Result extraction failed: {e}")))
    }

    async fn find_one(
        &self,
        collection: Collection,
        conditions: &[Condition],
    ) -> Result<Option<Value>> {
        let query = FindQuery {
            conditions: conditions.to_vec(),
            limit: Some(1),
            ..FindQuery::default()
        };
        Ok(self.find(collection, &query).await?.into_iter().next())
    }

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Value>> {
        let mut builder = WhereBuilder::default();
        let mut sql = format!(
            "{SELECT_DOC} FROM type::table($tb){}{}",
            builder.clause(&query.conditions)?,
            order_clause(query)?
        );
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if query.skip > 0 {
            sql.push_str(&format!(" START {}", query.skip));
        }
        debug!(%collection, sql = %sql, "SurrealDB find");

        let mut request = self.client.query(sql).bind(("tb", collection.as_str()));
        for bind in builder.binds {
            request = request.bind(bind);
        }

        let mut response = request
            .await
            .map_err(|e| ParaError::DatabaseError(format!("Query failed: {e}")))?;
        response
            .take(0)
            .map_err(|e| ParaError::DatabaseError(format!("Result extraction failed: {e}")))
    }

    async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64> {
        let mut builder = WhereBuilder::default();
        let sql = format!(
            "SELECT count() FROM type::table($tb){} GROUP ALL",
            builder.clause(conditions)?
        );

        let mut request = self.client.query(sql).bind(("tb", collection.as_str()));
        for bind in builder.binds {
            request = request.bind(bind);
        }

        let mut response = request
            .await
            .map_err(|e| ParaError::DatabaseError(format!("Count failed: {e}")))?;
        let row: Option<CountRow> = response
            .take(0)
            .map_err(|e| ParaError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<bool> {
        let changed = self
            .affected(
                "UPDATE type::thing($tb, $id) MERGE $patch RETURN AFTER".to_string(),
                vec![
                    ("tb".to_string(), Value::from(collection.as_str())),
                    ("id".to_string(), Value::from(id)),
                    ("patch".to_string(), without_id(patch)),
                ],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> Result<bool> {
        let field = check_field(field)?;
        let changed = self
            .affected(
                format!("UPDATE type::thing($tb, $id) SET {field} = ({field} ?? 0) + $by RETURN AFTER"),
                vec![
                    ("tb".to_string(), Value::from(collection.as_str())),
                    ("id".to_string(), Value::from(id)),
                    ("by".to_string(), Value::from(by)),
                ],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn push(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        value: Value,
    ) -> Result<bool> {
        let field = check_field(field)?;
        let changed = self
            .affected(
                format!(
                    "UPDATE type::thing($tb, $id) SET {field} = array::append({field} ?? [], $value) RETURN AFTER"
                ),
                vec![
                    ("tb".to_string(), Value::from(collection.as_str())),
                    ("id".to_string(), Value::from(id)),
                    ("value".to_string(), value),
                ],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn update_where(
        &self,
        collection: Collection,
        conditions: &[Condition],
        patch: Value,
    ) -> Result<u64> {
        let mut builder = WhereBuilder::default();
        let clause = builder.clause(conditions)?;
        let mut binds = builder.binds;
        binds.push(("tb".to_string(), Value::from(collection.as_str())));
        binds.push(("patch".to_string(), without_id(patch)));

        self.affected(
            format!("UPDATE type::table($tb) MERGE $patch{clause} RETURN AFTER"),
            binds,
        )
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .health()
            .await
            .map_err(|e| ParaError::DatabaseError(format!("SurrealDB health check failed: {e}")))
    }

    fn backend_name(&self) -> &'static str {
        "surrealdb"
    }
}
