use std::collections::HashMap;
use std::fmt;

/// The six relations known to the data service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationName {
    Staff,
    Customer,
    Product,
    Orders,
    OrderItems,
    Stocks,
}

impl RelationName {
    pub const ALL: [RelationName; 6] = [
        RelationName::Staff,
        RelationName::Customer,
        RelationName::Product,
        RelationName::Orders,
        RelationName::OrderItems,
        RelationName::Stocks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationName::Staff => "staff",
            RelationName::Customer => "customer",
            RelationName::Product => "product",
            RelationName::Orders => "orders",
            RelationName::OrderItems => "order_items",
            RelationName::Stocks => "stocks",
        }
    }

    /// Case-insensitive lookup of a relation as written by the user.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|relation| relation.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STAFF: &[&str] = &["id", "first_name", "last_name", "email", "active", "store"];
const CUSTOMER: &[&str] = &["id", "first_name", "last_name", "email", "city", "store"];
const PRODUCT: &[&str] = &["id", "product_name", "list_price", "store"];
const ORDERS: &[&str] = &[
    "id",
    "customer_id",
    "order_date",
    "staff_id",
    "store",
    "order_status",
];
const ORDER_ITEMS: &[&str] = &["id", "order_id", "product_id", "quantity", "store"];
const STOCKS: &[&str] = &["id", "product_id", "quantity", "store"];

/// Column layout of every relation, built once and shared by reference.
#[derive(Clone, Debug)]
pub struct SchemaCatalog {
    columns: HashMap<RelationName, Vec<&'static str>>,
    writable: RelationName,
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        let columns = RelationName::ALL
            .iter()
            .map(|&relation| {
                let columns = match relation {
                    RelationName::Staff => STAFF,
                    RelationName::Customer => CUSTOMER,
                    RelationName::Product => PRODUCT,
                    RelationName::Orders => ORDERS,
                    RelationName::OrderItems => ORDER_ITEMS,
                    RelationName::Stocks => STOCKS,
                };
                (relation, columns.to_vec())
            })
            .collect();

        Self {
            columns,
            writable: RelationName::Staff,
        }
    }
}

impl SchemaCatalog {
    /// Columns of `relation` in declaration order.
    pub fn columns(&self, relation: RelationName) -> &[&'static str] {
        self.columns
            .get(&relation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Finds `column` in `relation`, ignoring case, and returns the catalog's
    /// spelling of it.
    pub fn find_column(&self, relation: RelationName, column: &str) -> Option<&'static str> {
        self.columns(relation)
            .iter()
            .copied()
            .find(|candidate| candidate.eq_ignore_ascii_case(column))
    }

    /// The only relation that accepts INSERT statements.
    pub fn writable(&self) -> RelationName {
        self.writable
    }
}
