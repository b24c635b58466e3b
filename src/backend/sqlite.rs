use anyhow::{Context, Result};
use itertools::Itertools;
use rusqlite::{params_from_iter, types::ValueRef, Connection};
use serde_json::Value;
use tracing::{debug, info};

use super::{Backend, Record, Reply};
use crate::catalog::{RelationName, SchemaCatalog};
use crate::error::DispatchError;
use crate::translator::OutboundRequest;

/// A stand-in for the data service backed by an in-memory SQLite database
/// holding the six catalog relations.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn in_memory(catalog: &SchemaCatalog) -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory database")?;
        let ddl = RelationName::ALL
            .iter()
            .map(|&relation| {
                format!(
                    "CREATE TABLE {}({});",
                    relation,
                    catalog.columns(relation).iter().join(", ")
                )
            })
            .join("\n");
        conn.execute_batch(&ddl)
            .context("creating catalog relations")?;
        info!("created in-memory backend");
        Ok(Self { conn })
    }

    /// Runs statements directly against the database, bypassing validation.
    /// Meant for seeding data.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql).context("executing batch")
    }

    fn select(&self, sql: &str) -> rusqlite::Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names = stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        let mut rows = stmt.query([])?;
        let mut records = vec![];
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, name) in names.iter().enumerate() {
                record.insert(name.clone(), json_value(row.get_ref(i)?));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn insert(&self, relation: RelationName, fields: &[(String, String)]) -> rusqlite::Result<()> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            relation,
            fields.iter().map(|(column, _)| column).join(", "),
            fields.iter().map(|_| "?").join(", "),
        );
        debug!(%sql, "inserting");
        self.conn
            .execute(&sql, params_from_iter(fields.iter().map(|(_, value)| value)))?;
        Ok(())
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(x) => Value::from(x),
        ValueRef::Text(s) | ValueRef::Blob(s) => Value::from(String::from_utf8_lossy(s).into_owned()),
    }
}

impl Backend for SqliteBackend {
    fn dispatch(&mut self, request: &OutboundRequest) -> Result<Reply, DispatchError> {
        match request {
            OutboundRequest::Select { sql } => self
                .select(sql)
                .map(Reply::Records)
                .map_err(|err| DispatchError::Rejected(err.to_string())),
            OutboundRequest::Insert { relation, .. } => {
                let fields = request.form_fields();
                if fields.is_empty() {
                    return Err(DispatchError::Rejected("no values to insert".to_owned()));
                }
                self.insert(*relation, &fields)
                    .map(|()| Reply::Status("ok".to_owned()))
                    .map_err(|err| DispatchError::Rejected(err.to_string()))
            }
        }
    }
}
