use std::collections::HashSet;

use tracing::trace;

use crate::ast::{InsertStatement, Literal, ParsedStatement, Projection, SelectStatement};
use crate::catalog::{RelationName, SchemaCatalog};
use crate::error::RejectionReason;

/// A column of the catalog paired with the literal being written to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub column: &'static str,
    pub value: Literal,
}

/// A statement that passed validation, expressed in catalog terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedRequest {
    Select {
        relation: RelationName,
        projection: Projection,
    },
    Insert {
        relation: RelationName,
        fields: Vec<Field>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(NormalizedRequest),
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn into_result(self) -> Result<NormalizedRequest, RejectionReason> {
        match self {
            ValidationOutcome::Accepted(request) => Ok(request),
            ValidationOutcome::Rejected(reason) => Err(reason),
        }
    }
}

impl From<Result<NormalizedRequest, RejectionReason>> for ValidationOutcome {
    fn from(result: Result<NormalizedRequest, RejectionReason>) -> Self {
        match result {
            Ok(request) => ValidationOutcome::Accepted(request),
            Err(reason) => ValidationOutcome::Rejected(reason),
        }
    }
}

/// Checks parsed statements against the schema catalog. Holds no state of
/// its own, so validating the same statement twice gives the same outcome.
#[derive(Clone, Copy, Debug)]
pub struct Validator<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    pub fn validate(&self, statement: &ParsedStatement) -> ValidationOutcome {
        let outcome = match statement {
            ParsedStatement::Select(select) => self.validate_select(select),
            ParsedStatement::Insert(insert) => self.validate_insert(insert),
            ParsedStatement::Other { verb } => {
                Err(RejectionReason::UnsupportedStatementKind(verb.clone()))
            }
        };
        trace!(?outcome, "validated statement");
        outcome.into()
    }

    fn validate_select(
        &self,
        select: &SelectStatement,
    ) -> Result<NormalizedRequest, RejectionReason> {
        let relation_ref = match select.relations.as_slice() {
            [] => return Err(RejectionReason::NoTableSpecified),
            [relation] => relation,
            _ => return Err(RejectionReason::MultiRelationUnsupported),
        };

        let relation = RelationName::lookup(&relation_ref.name)
            .ok_or_else(|| RejectionReason::UnknownRelation(relation_ref.name.clone()))?;

        let projection = match &select.projection {
            Projection::Wildcard => Projection::Wildcard,
            Projection::Columns(columns) => Projection::Columns(
                columns
                    .iter()
                    .map(|column| {
                        self.catalog
                            .find_column(relation, column)
                            .map(str::to_owned)
                            .ok_or_else(|| RejectionReason::UnknownColumn {
                                column: column.clone(),
                                relation: relation_ref.name.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(NormalizedRequest::Select {
            relation,
            projection,
        })
    }

    fn validate_insert(
        &self,
        insert: &InsertStatement,
    ) -> Result<NormalizedRequest, RejectionReason> {
        let relation_ref = &insert.relation;
        let relation = RelationName::lookup(&relation_ref.name)
            .filter(|&relation| relation == self.catalog.writable())
            .ok_or_else(|| RejectionReason::UnknownRelation(relation_ref.name.clone()))?;

        let fields = match &insert.columns {
            // Without a column list the values fill the columns in schema
            // order.
            None => {
                let columns = self.catalog.columns(relation);
                if insert.values.len() > columns.len() {
                    return Err(RejectionReason::ColumnCountMismatch {
                        columns: columns.len(),
                        values: insert.values.len(),
                    });
                }
                columns
                    .iter()
                    .zip(&insert.values)
                    .map(|(&column, value)| Field {
                        column,
                        value: value.clone(),
                    })
                    .collect()
            }

            Some(columns) => {
                if columns.len() != insert.values.len() {
                    return Err(RejectionReason::ColumnCountMismatch {
                        columns: columns.len(),
                        values: insert.values.len(),
                    });
                }

                let mut seen = HashSet::new();
                let mut fields = Vec::with_capacity(columns.len());
                for (column, value) in columns.iter().zip(&insert.values) {
                    let catalog_column = self.catalog.find_column(relation, column).ok_or_else(
                        || RejectionReason::UnknownColumn {
                            column: column.clone(),
                            relation: relation_ref.name.clone(),
                        },
                    )?;
                    if !seen.insert(catalog_column) {
                        return Err(RejectionReason::DuplicateColumn(column.clone()));
                    }
                    fields.push(Field {
                        column: catalog_column,
                        value: value.clone(),
                    });
                }
                fields
            }
        };

        Ok(NormalizedRequest::Insert { relation, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RelationRef;

    fn select(relations: &[&str], projection: Projection) -> ParsedStatement {
        ParsedStatement::Select(SelectStatement {
            relations: relations.iter().map(|&name| RelationRef::new(name)).collect(),
            projection,
        })
    }

    fn insert(relation: &str, columns: Option<&[&str]>, values: Vec<Literal>) -> ParsedStatement {
        ParsedStatement::Insert(InsertStatement {
            relation: RelationRef::new(relation),
            columns: columns.map(|columns| columns.iter().map(|s| s.to_string()).collect()),
            values,
        })
    }

    fn columns(names: &[&str]) -> Projection {
        Projection::Columns(names.iter().map(|s| s.to_string()).collect())
    }

    fn text(s: &str) -> Literal {
        Literal::String(s.to_owned())
    }

    fn validate(statement: &ParsedStatement) -> ValidationOutcome {
        let catalog = SchemaCatalog::default();
        Validator::new(&catalog).validate(statement)
    }

    fn rejected(statement: &ParsedStatement) -> RejectionReason {
        match validate(statement) {
            ValidationOutcome::Rejected(reason) => reason,
            outcome => panic!("expected a rejection, got {:?}", outcome),
        }
    }

    #[test]
    fn test_wildcard_select_on_every_relation() {
        for relation in RelationName::ALL {
            assert_eq!(
                validate(&select(&[relation.as_str()], Projection::Wildcard)),
                ValidationOutcome::Accepted(NormalizedRequest::Select {
                    relation,
                    projection: Projection::Wildcard,
                })
            );
        }
    }

    #[test]
    fn test_unknown_column_on_every_relation() {
        for relation in RelationName::ALL {
            assert_eq!(
                rejected(&select(&[relation.as_str()], columns(&["nonexistent"]))),
                RejectionReason::UnknownColumn {
                    column: "nonexistent".to_owned(),
                    relation: relation.as_str().to_owned(),
                }
            );
        }
    }

    #[test]
    fn test_select_without_relation() {
        assert_eq!(
            rejected(&select(&[], Projection::Wildcard)),
            RejectionReason::NoTableSpecified
        );
        assert_eq!(
            rejected(&select(&[], columns(&["bogus"]))),
            RejectionReason::NoTableSpecified
        );
    }

    #[test]
    fn test_select_from_two_relations() {
        for (a, b) in [("staff", "customer"), ("orders", "order_items"), ("stocks", "nope")] {
            assert_eq!(
                rejected(&select(&[a, b], Projection::Wildcard)),
                RejectionReason::MultiRelationUnsupported
            );
        }
    }

    #[test]
    fn test_unknown_relation_echoes_name() {
        assert_eq!(
            rejected(&select(&["Unknown_Table"], Projection::Wildcard)),
            RejectionReason::UnknownRelation("Unknown_Table".to_owned())
        );
        assert_eq!(
            rejected(&select(&["customers"], Projection::Wildcard)).to_string(),
            "The relation \"customers\" does not exist"
        );
    }

    #[test]
    fn test_select_columns_keep_order_and_catalog_spelling() {
        assert_eq!(
            validate(&select(&["STAFF"], columns(&["Store", "id", "first_name"]))),
            ValidationOutcome::Accepted(NormalizedRequest::Select {
                relation: RelationName::Staff,
                projection: columns(&["store", "id", "first_name"]),
            })
        );
    }

    #[test]
    fn test_first_unknown_column_is_reported() {
        assert_eq!(
            rejected(&select(&["product"], columns(&["id", "colour", "size"]))),
            RejectionReason::UnknownColumn {
                column: "colour".to_owned(),
                relation: "product".to_owned(),
            }
        );
    }

    #[test]
    fn test_insert_column_count_mismatch() {
        let reason = rejected(&insert(
            "staff",
            Some(&["first_name", "last_name"]),
            vec![text("Ada")],
        ));
        assert_eq!(
            reason,
            RejectionReason::ColumnCountMismatch {
                columns: 2,
                values: 1
            }
        );
        assert_eq!(
            reason.to_string(),
            "INSERT has more target columns than expressions"
        );

        let reason = rejected(&insert(
            "staff",
            Some(&["first_name"]),
            vec![text("Ada"), text("Lovelace")],
        ));
        assert_eq!(
            reason.to_string(),
            "INSERT has more expressions than target columns"
        );
    }

    #[test]
    fn test_insert_with_columns() {
        let v1 = Literal::Integer(7.into());
        let v2 = text("Ada");
        assert_eq!(
            validate(&insert(
                "staff",
                Some(&["id", "first_name"]),
                vec![v1.clone(), v2.clone()]
            )),
            ValidationOutcome::Accepted(NormalizedRequest::Insert {
                relation: RelationName::Staff,
                fields: vec![
                    Field {
                        column: "id",
                        value: v1
                    },
                    Field {
                        column: "first_name",
                        value: v2
                    },
                ],
            })
        );
    }

    #[test]
    fn test_insert_into_read_only_relation() {
        assert_eq!(
            rejected(&insert(
                "orders",
                Some(&["customer_id"]),
                vec![Literal::Integer(1.into())]
            )),
            RejectionReason::UnknownRelation("orders".to_owned())
        );
        assert_eq!(
            rejected(&insert("Customer", None, vec![])),
            RejectionReason::UnknownRelation("Customer".to_owned())
        );
    }

    #[test]
    fn test_insert_unknown_and_duplicate_columns() {
        assert_eq!(
            rejected(&insert(
                "Staff",
                Some(&["first_name", "salary"]),
                vec![text("Ada"), Literal::Integer(1.into())]
            )),
            RejectionReason::UnknownColumn {
                column: "salary".to_owned(),
                relation: "Staff".to_owned(),
            }
        );
        assert_eq!(
            rejected(&insert(
                "staff",
                Some(&["email", "EMAIL"]),
                vec![text("a@b.c"), text("d@e.f")]
            )),
            RejectionReason::DuplicateColumn("EMAIL".to_owned())
        );
    }

    #[test]
    fn test_insert_without_columns_uses_schema_order() {
        let values = vec![
            Literal::Integer(1.into()),
            text("Ada"),
            text("Lovelace"),
        ];
        let outcome = validate(&insert("staff", None, values.clone()));
        let fields = match outcome {
            ValidationOutcome::Accepted(NormalizedRequest::Insert { fields, .. }) => fields,
            outcome => panic!("unexpected outcome {:?}", outcome),
        };
        assert_eq!(
            fields.iter().map(|field| field.column).collect::<Vec<_>>(),
            vec!["id", "first_name", "last_name"]
        );
        assert_eq!(
            fields.into_iter().map(|field| field.value).collect::<Vec<_>>(),
            values
        );

        let too_many = vec![Literal::Null; 7];
        assert_eq!(
            rejected(&insert("staff", None, too_many)),
            RejectionReason::ColumnCountMismatch {
                columns: 6,
                values: 7
            }
        );
    }

    #[test]
    fn test_other_statements_are_rejected() {
        assert_eq!(
            rejected(&ParsedStatement::Other {
                verb: "DELETE".to_owned()
            }),
            RejectionReason::UnsupportedStatementKind("DELETE".to_owned())
        );
    }

    #[test]
    fn test_validation_is_repeatable() {
        let catalog = SchemaCatalog::default();
        let validator = Validator::new(&catalog);
        for statement in [
            select(&["staff"], columns(&["id", "email"])),
            select(&["staff", "orders"], Projection::Wildcard),
            insert("staff", Some(&["id"]), vec![Literal::Boolean(true)]),
            insert("stocks", None, vec![]),
        ] {
            assert_eq!(validator.validate(&statement), validator.validate(&statement));
        }
    }
}
