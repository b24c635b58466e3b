use thiserror::Error;

use crate::ast::{ColumnName, Identifier};

/// The statement text could not be parsed as SQL.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("SyntaxError: {message}")]
pub struct SyntaxError {
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<sqlparser::parser::ParserError> for SyntaxError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        SyntaxError::new(err.to_string())
    }
}

impl From<sqlparser::tokenizer::TokenizerError> for SyntaxError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        SyntaxError::new(err.to_string())
    }
}

/// Why a well-formed statement was refused before anything was sent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("SELECT with no tables specified is not valid")]
    NoTableSpecified,

    #[error("Only selects from 1 relationship are currently supported")]
    MultiRelationUnsupported,

    #[error("The relation \"{0}\" does not exist")]
    UnknownRelation(Identifier),

    #[error("Column \"{column}\" does not exist in \"{relation}\"")]
    UnknownColumn {
        column: ColumnName,
        relation: Identifier,
    },

    #[error("Column \"{0}\" specified more than once")]
    DuplicateColumn(ColumnName),

    #[error("{}", count_mismatch(.columns, .values))]
    ColumnCountMismatch { columns: usize, values: usize },

    #[error("{0} statements are not supported")]
    UnsupportedStatementKind(String),
}

fn count_mismatch(columns: &usize, values: &usize) -> &'static str {
    if columns > values {
        "INSERT has more target columns than expressions"
    } else {
        "INSERT has more expressions than target columns"
    }
}

/// Everything that stops a statement locally, before any dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Error: {0}")]
    Rejected(#[from] RejectionReason),
}

/// Failures that can only happen once a request has been dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The call did not complete or the reply had an unexpected shape.
    #[error("An error occurred while making the request")]
    Transport(String),

    /// The backend answered with a non-success status; its message is kept
    /// as sent.
    #[error("{0}")]
    Rejected(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
