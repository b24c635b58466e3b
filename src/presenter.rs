use std::fmt;

use itertools::Itertools;
use serde_json::Value;
use tracing::error;

use crate::backend::{Record, Reply};
use crate::error::DispatchError;

pub const PROMPT: &str = "Enter a statement and submit it to fetch results";

/// What the results area shows. Exactly one state is active at a time.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum View {
    #[default]
    Prompt,
    Table(Vec<Record>),
    Message(String),
}

impl From<Result<Reply, DispatchError>> for View {
    fn from(reply: Result<Reply, DispatchError>) -> Self {
        match reply {
            Ok(Reply::Records(records)) if records.is_empty() => View::Prompt,
            Ok(Reply::Records(records)) => View::Table(records),
            Ok(Reply::Status(status)) => View::Message(status),
            Err(err) => {
                if let DispatchError::Transport(detail) = &err {
                    error!(%detail, "request failed");
                }
                View::Message(err.to_string())
            }
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = match self {
            View::Prompt => return f.write_str(PROMPT),
            View::Message(message) => return f.write_str(message),
            View::Table(records) => records,
        };

        // The header comes from the first record; the others share its keys.
        let header = match records.first() {
            Some(first) => first.keys().cloned().collect::<Vec<_>>(),
            None => return f.write_str(PROMPT),
        };
        let rows = records
            .iter()
            .map(|record| {
                header
                    .iter()
                    .map(|column| record.get(column).map(cell).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let widths = header
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain(Some(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect::<Vec<_>>();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
                .join(" | ")
                .trim_end()
                .to_owned()
        };

        writeln!(f, "{}", line(&header))?;
        write!(f, "{}", widths.iter().map(|&width| "-".repeat(width)).join("-+-"))?;
        for row in &rows {
            write!(f, "\n{}", line(row))?;
        }
        Ok(())
    }
}
