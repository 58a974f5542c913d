//! Mirror table storage.
//!
//! Each model owns one table keyed by `contentful_id`. Tables are created on
//! first use and gain columns as the model grows; columns are never dropped.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use libsql::{Connection, Row, Value as SqlValue};
use serde_json::{Number, Value};

use crate::error::{Error, Result};
use crate::models::{ModelDefinition, Record, CONTENTFUL_ID};
use crate::util::is_sql_identifier;

const SYSTEM_COLUMNS: [&str; 4] = ["id", CONTENTFUL_ID, "created_at", "updated_at"];

/// Trait for mirror row storage operations (async)
#[allow(async_fn_in_trait)]
pub trait EntryStore {
    /// Create the model's table if needed and add any missing columns
    async fn ensure_table(&self, model: &ModelDefinition) -> Result<()>;

    /// Find the row for a Contentful id
    async fn find(&self, model: &ModelDefinition, contentful_id: &str) -> Result<Option<Record>>;

    /// Insert a row; `fields` must include `contentful_id`
    async fn insert(&self, model: &ModelDefinition, fields: &BTreeMap<String, Value>)
        -> Result<Record>;

    /// Update the given columns of an existing row
    async fn update(
        &self,
        model: &ModelDefinition,
        id: i64,
        fields: &BTreeMap<String, Value>,
    ) -> Result<Record>;

    /// Delete every row with the Contentful id, returning how many were removed
    async fn delete(&self, model: &ModelDefinition, contentful_id: &str) -> Result<u64>;

    /// Number of rows in the model's table (0 when the table does not exist)
    async fn count(&self, model: &ModelDefinition) -> Result<u64>;

    /// All rows ordered by id
    async fn list(&self, model: &ModelDefinition) -> Result<Vec<Record>>;
}

/// libSQL implementation of `EntryStore`
pub struct LibSqlEntryStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlEntryStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl EntryStore for LibSqlEntryStore<'_> {
    async fn ensure_table(&self, model: &ModelDefinition) -> Result<()> {
        let table = quoted(&model.table)?;
        self.conn
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        contentful_id TEXT NOT NULL UNIQUE,
                        created_at INTEGER NOT NULL,
                        updated_at INTEGER NOT NULL
                    )"
                ),
                (),
            )
            .await?;

        let existing = self.existing_columns(&model.table).await?;
        for column in &model.columns {
            if existing.contains(&column.name) {
                continue;
            }
            if SYSTEM_COLUMNS.contains(&column.name.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "column \"{}\" of model {} is reserved",
                    column.name, model.name
                )));
            }
            self.conn
                .execute(
                    &format!(
                        "ALTER TABLE {table} ADD COLUMN {} {}",
                        quoted(&column.name)?,
                        column.sql_type.as_sql()
                    ),
                    (),
                )
                .await?;
            tracing::info!(table = %model.table, column = %column.name, "Added mirror column");
        }
        Ok(())
    }

    async fn find(&self, model: &ModelDefinition, contentful_id: &str) -> Result<Option<Record>> {
        self.find_where(model, "contentful_id = ?", SqlValue::Text(contentful_id.to_string()))
            .await
    }

    async fn insert(
        &self,
        model: &ModelDefinition,
        fields: &BTreeMap<String, Value>,
    ) -> Result<Record> {
        let contentful_id = fields
            .get(CONTENTFUL_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MalformedPayload("mapped record has no contentful_id".into()))?
            .to_string();
        check_columns(model, fields)?;

        let now = Utc::now().timestamp_millis();
        let mut columns = vec![quoted(CONTENTFUL_ID)?];
        let mut values = vec![SqlValue::Text(contentful_id.clone())];
        for (column, value) in fields {
            if column == CONTENTFUL_ID {
                continue;
            }
            columns.push(quoted(column)?);
            values.push(to_sql(value));
        }
        columns.push("created_at".to_string());
        columns.push("updated_at".to_string());
        values.push(SqlValue::Integer(now));
        values.push(SqlValue::Integer(now));

        let placeholders = vec!["?"; values.len()].join(", ");
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES ({placeholders})",
                    quoted(&model.table)?,
                    columns.join(", ")
                ),
                libsql::params_from_iter(values),
            )
            .await?;

        self.find(model, &contentful_id).await?.ok_or_else(|| {
            Error::Database(format!(
                "inserted row {contentful_id} missing from {}",
                model.table
            ))
        })
    }

    async fn update(
        &self,
        model: &ModelDefinition,
        id: i64,
        fields: &BTreeMap<String, Value>,
    ) -> Result<Record> {
        check_columns(model, fields)?;

        let mut assignments = Vec::new();
        let mut values = Vec::new();
        for (column, value) in fields {
            if column == CONTENTFUL_ID {
                continue;
            }
            assignments.push(format!("{} = ?", quoted(column)?));
            values.push(to_sql(value));
        }
        assignments.push("updated_at = ?".to_string());
        values.push(SqlValue::Integer(Utc::now().timestamp_millis()));
        values.push(SqlValue::Integer(id));

        self.conn
            .execute(
                &format!(
                    "UPDATE {} SET {} WHERE id = ?",
                    quoted(&model.table)?,
                    assignments.join(", ")
                ),
                libsql::params_from_iter(values),
            )
            .await?;

        self.find_where(model, "id = ?", SqlValue::Integer(id))
            .await?
            .ok_or_else(|| Error::Database(format!("row {id} missing from {}", model.table)))
    }

    async fn delete(&self, model: &ModelDefinition, contentful_id: &str) -> Result<u64> {
        if !self.table_exists(&model.table).await? {
            return Ok(0);
        }
        let removed = self
            .conn
            .execute(
                &format!(
                    "DELETE FROM {} WHERE contentful_id = ?",
                    quoted(&model.table)?
                ),
                [contentful_id],
            )
            .await?;
        Ok(removed)
    }

    async fn count(&self, model: &ModelDefinition) -> Result<u64> {
        if !self.table_exists(&model.table).await? {
            return Ok(0);
        }
        let mut rows = self
            .conn
            .query(
                &format!("SELECT COUNT(*) FROM {}", quoted(&model.table)?),
                (),
            )
            .await?;
        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list(&self, model: &ModelDefinition) -> Result<Vec<Record>> {
        if !self.table_exists(&model.table).await? {
            return Ok(Vec::new());
        }
        let mut rows = self
            .conn
            .query(
                &format!("SELECT * FROM {} ORDER BY id", quoted(&model.table)?),
                (),
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }
}

impl LibSqlEntryStore<'_> {
    async fn find_where(
        &self,
        model: &ModelDefinition,
        condition: &str,
        value: SqlValue,
    ) -> Result<Option<Record>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT * FROM {} WHERE {condition} LIMIT 1",
                    quoted(&model.table)?
                ),
                [value],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
                [table],
            )
            .await?;
        Ok(match rows.next().await? {
            Some(row) => row.get::<i32>(0)? != 0,
            None => false,
        })
    }

    async fn existing_columns(&self, table: &str) -> Result<BTreeSet<String>> {
        let mut rows = self
            .conn
            .query("SELECT name FROM pragma_table_info(?)", [table])
            .await?;
        let mut columns = BTreeSet::new();
        while let Some(row) = rows.next().await? {
            columns.insert(row.get::<String>(0)?);
        }
        Ok(columns)
    }
}

fn check_columns(model: &ModelDefinition, fields: &BTreeMap<String, Value>) -> Result<()> {
    match fields
        .keys()
        .find(|column| column.as_str() != CONTENTFUL_ID && !model.has_column(column))
    {
        Some(column) => Err(Error::InvalidInput(format!(
            "column \"{column}\" is not declared by model {}",
            model.name
        ))),
        None => Ok(()),
    }
}

fn quoted(identifier: &str) -> Result<String> {
    if is_sql_identifier(identifier) {
        Ok(format!("\"{identifier}\""))
    } else {
        Err(Error::InvalidInput(format!(
            "\"{identifier}\" is not a valid table or column name"
        )))
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Real))
            .unwrap_or(SqlValue::Null),
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(number) => Value::from(number),
        SqlValue::Real(number) => Number::from_f64(number).map_or(Value::Null, Value::Number),
        SqlValue::Text(text) => Value::String(text),
        SqlValue::Blob(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

fn row_to_record(row: &Row) -> Result<Record> {
    let mut record = Record {
        id: 0,
        contentful_id: String::new(),
        values: BTreeMap::new(),
        created_at: 0,
        updated_at: 0,
    };

    let column_count = i32::try_from(row.column_count()).unwrap_or(i32::MAX);
    for index in 0..column_count {
        let Some(name) = row.column_name(index) else {
            continue;
        };
        let name = name.to_string();
        let value = row.get_value(index)?;
        match (name.as_str(), value) {
            ("id", SqlValue::Integer(id)) => record.id = id,
            ("created_at", SqlValue::Integer(ms)) => record.created_at = ms,
            ("updated_at", SqlValue::Integer(ms)) => record.updated_at = ms,
            (CONTENTFUL_ID, SqlValue::Text(id)) => record.contentful_id = id,
            (_, value) => {
                record.values.insert(name, from_sql(value));
            }
        }
    }

    if record.contentful_id.is_empty() {
        return Err(Error::Database("mirror row without contentful_id".into()));
    }
    Ok(record)
}
