use crate::catalog::RelationName;
use crate::validator::{Field, NormalizedRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
        }
    }
}

/// The payload handed to the backend for one accepted statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundRequest {
    /// The backend re-parses and runs the statement text itself.
    Select { sql: String },
    /// Inserts travel as discrete fields, never as SQL text.
    Insert {
        relation: RelationName,
        fields: Vec<Field>,
    },
}

impl OutboundRequest {
    pub fn operation(&self) -> Operation {
        match self {
            OutboundRequest::Select { .. } => Operation::Select,
            OutboundRequest::Insert { .. } => Operation::Insert,
        }
    }

    /// Flat `(name, value)` entries for a form submission. NULL values are
    /// left out.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        match self {
            OutboundRequest::Select { sql } => vec![("sql".to_owned(), sql.clone())],
            OutboundRequest::Insert { fields, .. } => fields
                .iter()
                .filter_map(|field| {
                    field
                        .value
                        .form_value()
                        .map(|value| (field.column.to_owned(), value))
                })
                .collect(),
        }
    }
}

/// Turns an accepted statement into its outbound form. `sql` must be the
/// text the request was validated from; selects forward it unchanged.
pub fn translate(sql: &str, request: NormalizedRequest) -> OutboundRequest {
    match request {
        NormalizedRequest::Select { .. } => OutboundRequest::Select {
            sql: sql.to_owned(),
        },
        NormalizedRequest::Insert { relation, fields } => {
            OutboundRequest::Insert { relation, fields }
        }
    }
}
