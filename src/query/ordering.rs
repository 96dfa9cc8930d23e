//! Sort clauses for rendered queries.

use std::fmt;

use super::field_ref::FieldRef;

/// Sort direction for an ordering clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending
    Ascending,
    /// Descending
    Descending,
}

impl SortDirection {
    /// Keyword form used in rendered queries
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `ORDER BY` clause: a resolved field, a direction, and null placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    /// Field to sort by
    pub field: FieldRef,
    /// Sort direction
    pub direction: SortDirection,
    /// Render `NULLS LAST` instead of `NULLS FIRST`
    pub nulls_last: bool,
}

impl OrderClause {
    /// Create an ordering clause
    pub fn new(field: FieldRef, direction: SortDirection, nulls_last: bool) -> Self {
        Self {
            field,
            direction,
            nulls_last,
        }
    }

    /// Rendered form: `<field> <ASC|DESC> <NULLS FIRST|NULLS LAST>`
    pub fn render(&self) -> String {
        let nulls = if self.nulls_last {
            "NULLS LAST"
        } else {
            "NULLS FIRST"
        };
        format!("{} {} {}", self.field.rendered(), self.direction, nulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AllowAll;
    use crate::schema::{FieldHandle, InMemoryCatalog, ObjectType};

    fn amount_ref() -> FieldRef {
        let mut catalog = InMemoryCatalog::new();
        catalog.register(ObjectType::new("Order").with_field(FieldHandle::number("Amount")));
        FieldRef::resolve(&catalog, &AllowAll, "Order", "Amount", false).unwrap()
    }

    #[test]
    fn test_render_defaults_to_nulls_first() {
        let clause = OrderClause::new(amount_ref(), SortDirection::Descending, false);
        assert_eq!(clause.render(), "Amount DESC NULLS FIRST");
    }

    #[test]
    fn test_render_nulls_last() {
        let clause = OrderClause::new(amount_ref(), SortDirection::Ascending, true);
        assert_eq!(clause.render(), "Amount ASC NULLS LAST");
    }
}
