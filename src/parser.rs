use num_bigint::BigInt;
use sqlparser::ast::{
    Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, Insert, ObjectName, SelectItem,
    SetExpr, Statement, TableFactor, TableObject, TableWithJoins, UnaryOperator, Value,
    ValueWithSpan,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser as SqlParser;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::ast::{
    ColumnName, Identifier, InsertStatement, Literal, ParsedStatement, Projection, RelationRef,
    SelectStatement,
};
use crate::error::SyntaxError;

type Result<T> = std::result::Result<T, SyntaxError>;

/// Parses exactly one statement. SELECT and INSERT come back in structured
/// form; any other statement is named by its leading verb.
pub fn parse_statement(sql: &str) -> Result<ParsedStatement> {
    let dialect = MySqlDialect {};
    let mut ast = SqlParser::parse_sql(&dialect, sql)?;

    if ast.is_empty() {
        return Err(SyntaxError::new("Empty SQL statement"));
    }
    if ast.len() > 1 {
        return Err(SyntaxError::new("Multiple statements not supported"));
    }

    match ast.remove(0) {
        Statement::Query(query) => Ok(ParsedStatement::Select(convert_query_body(&query.body))),
        Statement::Insert(insert) => Ok(ParsedStatement::Insert(convert_insert(&insert)?)),
        _ => Ok(ParsedStatement::Other {
            verb: leading_verb(&dialect, sql)?,
        }),
    }
}

/// The first keyword of the statement, upper-cased. Comments are skipped by
/// the tokenizer.
fn leading_verb(dialect: &MySqlDialect, sql: &str) -> Result<String> {
    Tokenizer::new(dialect, sql)
        .tokenize()?
        .into_iter()
        .find_map(|token| match token {
            Token::Word(word) => Some(word.value.to_ascii_uppercase()),
            _ => None,
        })
        .ok_or_else(|| SyntaxError::new("statement has no leading keyword"))
}

fn object_name_leaf(name: &ObjectName) -> Identifier {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

fn convert_table_factor(factor: &TableFactor) -> RelationRef {
    match factor {
        TableFactor::Table { name, .. } => RelationRef::new(object_name_leaf(name)),
        // Derived tables and table functions keep their text, which never
        // names a relation of the catalog.
        factor => RelationRef::new(factor.to_string()),
    }
}

fn convert_from(from: &[TableWithJoins]) -> Vec<RelationRef> {
    from.iter()
        .flat_map(|table| {
            std::iter::once(&table.relation).chain(table.joins.iter().map(|join| &join.relation))
        })
        .map(convert_table_factor)
        .collect()
}

/// Collects every column an expression reads. Qualified references keep
/// only the column part.
fn referenced_columns(expr: &Expr, columns: &mut Vec<ColumnName>) {
    match expr {
        Expr::Identifier(ident) => columns.push(ident.value.clone()),
        Expr::CompoundIdentifier(idents) => columns.extend(idents.last().map(|i| i.value.clone())),
        Expr::Nested(inner) | Expr::UnaryOp { expr: inner, .. } | Expr::Cast { expr: inner, .. } => {
            referenced_columns(inner, columns)
        }
        Expr::BinaryOp { left, right, .. } => {
            referenced_columns(left, columns);
            referenced_columns(right, columns);
        }
        Expr::Function(function) => {
            if let FunctionArguments::List(list) = &function.args {
                for arg in &list.args {
                    if let FunctionArg::Unnamed(FunctionArgExpr::Expr(arg)) = arg {
                        referenced_columns(arg, columns);
                    }
                }
            }
        }
        _ => {}
    }
}

fn convert_projection(items: &[SelectItem]) -> Projection {
    let mut columns = vec![];
    let mut wildcard = false;
    for item in items {
        match item {
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                referenced_columns(expr, &mut columns)
            }
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => wildcard = true,
        }
    }

    if wildcard && columns.is_empty() {
        Projection::Wildcard
    } else {
        Projection::Columns(columns)
    }
}

fn convert_query_body(body: &SetExpr) -> SelectStatement {
    match body {
        SetExpr::Select(select) => SelectStatement {
            relations: convert_from(&select.from),
            projection: convert_projection(&select.projection),
        },
        SetExpr::Query(query) => convert_query_body(&query.body),
        // Both sides of a UNION count towards the relations read.
        SetExpr::SetOperation { left, right, .. } => {
            let mut statement = convert_query_body(left);
            statement
                .relations
                .extend(convert_query_body(right).relations);
            statement
        }
        _ => SelectStatement {
            relations: vec![],
            projection: Projection::Wildcard,
        },
    }
}

fn convert_number(raw: &str, negative: bool) -> Literal {
    match raw.parse::<BigInt>() {
        Ok(n) if negative => Literal::Integer(-n),
        Ok(n) => Literal::Integer(n),
        Err(_) if negative => Literal::Decimal(format!("-{}", raw)),
        Err(_) => Literal::Decimal(raw.to_owned()),
    }
}

fn convert_literal(expr: &Expr) -> Result<Literal> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => match value {
            Value::Number(raw, _) => Ok(convert_number(raw, false)),
            Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => {
                Ok(Literal::String(s.clone()))
            }
            Value::Boolean(b) => Ok(Literal::Boolean(*b)),
            Value::Null => Ok(Literal::Null),
            value => Err(SyntaxError::new(format!(
                "unsupported literal {} in INSERT values",
                value
            ))),
        },
        Expr::UnaryOp {
            op: op @ (UnaryOperator::Minus | UnaryOperator::Plus),
            expr: inner,
        } => match inner.as_ref() {
            Expr::Value(ValueWithSpan {
                value: Value::Number(raw, _),
                ..
            }) => Ok(convert_number(raw, *op == UnaryOperator::Minus)),
            _ => Err(not_a_literal(expr)),
        },
        Expr::Nested(inner) => convert_literal(inner),
        expr => Err(not_a_literal(expr)),
    }
}

fn not_a_literal(expr: &Expr) -> SyntaxError {
    SyntaxError::new(format!("INSERT values must be literals, found {}", expr))
}

fn column_names(idents: &[Ident]) -> Vec<ColumnName> {
    idents.iter().map(|ident| ident.value.clone()).collect()
}

fn convert_insert(insert: &Insert) -> Result<InsertStatement> {
    let relation = match &insert.table {
        TableObject::TableName(name) => RelationRef::new(object_name_leaf(name)),
        TableObject::TableFunction(_) => {
            return Err(SyntaxError::new("INSERT into a table function is not supported"))
        }
    };

    let source = insert
        .source
        .as_ref()
        .ok_or_else(|| SyntaxError::new("INSERT requires a VALUES list"))?;
    let SetExpr::Values(values) = source.body.as_ref() else {
        return Err(SyntaxError::new("INSERT requires a VALUES list"));
    };

    // Only the first row is sent; the data service takes one row per request.
    let values = match values.rows.first() {
        Some(row) => row
            .iter()
            .map(convert_literal)
            .collect::<Result<Vec<_>>>()?,
        None => vec![],
    };

    let columns = if insert.columns.is_empty() {
        None
    } else {
        Some(column_names(&insert.columns))
    };

    Ok(InsertStatement {
        relation,
        columns,
        values,
    })
}
