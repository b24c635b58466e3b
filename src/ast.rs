use std::fmt;

use num_bigint::BigInt;

pub type Identifier = String;
pub type ColumnName = Identifier;

/// A relation exactly as it was written in the statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRef {
    pub name: Identifier,
}

impl RelationRef {
    pub fn new(name: impl Into<Identifier>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    String(String),
    Integer(BigInt),
    /// Decimal literals are kept as written so that no precision is lost
    /// before they reach the backend.
    Decimal(String),
    Boolean(bool),
    Null,
}

impl Literal {
    /// The text sent for this literal in a form submission. `None` for NULL,
    /// which is left out of the form entirely.
    pub fn form_value(&self) -> Option<String> {
        match self {
            Literal::Null => None,
            literal => Some(literal.to_string()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(s),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Decimal(d) => f.write_str(d),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("NULL"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projection {
    Wildcard,
    Columns(Vec<ColumnName>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectStatement {
    pub relations: Vec<RelationRef>,
    pub projection: Projection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertStatement {
    pub relation: RelationRef,
    pub columns: Option<Vec<ColumnName>>,
    pub values: Vec<Literal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedStatement {
    Select(SelectStatement),
    Insert(InsertStatement),
    /// Any other statement the grammar recognizes, named by its leading verb.
    Other { verb: String },
}
