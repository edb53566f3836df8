//! Query filter compiler for conference searches.
//!
//! Turns user-supplied `(field, operator, value)` triples into a validated
//! [`QueryPlan`] the entity store executes verbatim. The compiler is a pure
//! transform and performs no I/O.
//!
//! The backing store can only satisfy a range query whose primary sort key
//! is the ranged field, so at most one field may carry a non-equality
//! operator; the plan's ordering starts with that field (when present) and
//! always ends with the conference name for a deterministic secondary
//! order.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conference attributes a filter may target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterField {
    /// Host city (text)
    City,
    /// Topic membership (text)
    Topic,
    /// Start month (integer, 0 = no start date)
    Month,
    /// Seating capacity (integer)
    MaxAttendees,
}

impl FilterField {
    /// Maps the symbolic wire name to a field, `None` when unrecognized
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "CITY" => Some(Self::City),
            "TOPIC" => Some(Self::Topic),
            "MONTH" => Some(Self::Month),
            "MAX_ATTENDEES" => Some(Self::MaxAttendees),
            _ => None,
        }
    }

    /// The concrete entity attribute this field maps to
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Topic => "topics",
            Self::Month => "month",
            Self::MaxAttendees => "max_attendees",
        }
    }

    /// Whether values for this field are coerced to integers
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Month | Self::MaxAttendees)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// Comparison operators a filter may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Equal
    Eq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Not equal
    Ne,
}

impl FilterOp {
    /// Maps the symbolic wire name to an operator, `None` when unrecognized
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "EQ" => Some(Self::Eq),
            "GT" => Some(Self::Gt),
            "GTEQ" => Some(Self::GtEq),
            "LT" => Some(Self::Lt),
            "LTEQ" => Some(Self::LtEq),
            "NE" => Some(Self::Ne),
            _ => None,
        }
    }

    /// Every operator except `Eq` constrains a range of values
    #[must_use]
    pub const fn is_inequality(self) -> bool {
        !matches!(self, Self::Eq)
    }
}

/// A filter value after type coercion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Text comparison value
    Text(String),
    /// Integer comparison value (month, attendee counts)
    Integer(i64),
}

/// One raw, user-supplied filter criterion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    /// Symbolic field name (e.g. `CITY`)
    pub field: String,
    /// Symbolic operator name (e.g. `GTEQ`)
    pub operator: String,
    /// Comparison value, always textual on the wire
    pub value: String,
}

/// A validated, coerced filter ready for the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledFilter {
    /// Target attribute
    pub field: FilterField,
    /// Comparison operator
    pub op: FilterOp,
    /// Coerced comparison value
    pub value: FilterValue,
}

/// One component of a plan's sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Sort by a filterable attribute (the inequality field)
    Field(FilterField),
    /// Sort by conference name
    Name,
}

/// A validated, correctly ordered conference query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Sort order: the inequality field first (if any), then name
    pub order: Vec<SortKey>,
    /// Validated filters in input order
    pub filters: Vec<CompiledFilter>,
}

impl QueryPlan {
    /// The plan matching every conference, ordered by name
    #[must_use]
    pub fn unfiltered() -> Self {
        Self {
            order: vec![SortKey::Name],
            filters: Vec::new(),
        }
    }
}

/// Compiles raw criteria into a [`QueryPlan`].
///
/// # Errors
///
/// Returns [`Error::BadRequest`] when a field or operator is unrecognized,
/// when a second distinct field carries a non-equality operator, or when a
/// value for an integer-typed field does not parse as an integer.
pub fn compile(criteria: &[FilterCriterion]) -> Result<QueryPlan, Error> {
    let mut filters = Vec::with_capacity(criteria.len());
    let mut inequality_field: Option<FilterField> = None;

    for criterion in criteria {
        let (Some(field), Some(op)) = (
            FilterField::from_symbol(&criterion.field),
            FilterOp::from_symbol(&criterion.operator),
        ) else {
            return Err(Error::bad_request(
                "filter contains invalid field or operator",
            ));
        };

        if op.is_inequality() {
            match inequality_field {
                Some(existing) if existing != field => {
                    return Err(Error::bad_request(
                        "inequality filter is allowed on only one field",
                    ));
                }
                _ => inequality_field = Some(field),
            }
        }

        let value = if field.is_integer() {
            let parsed = criterion.value.trim().parse::<i64>().map_err(|_| {
                Error::bad_request(format!("filter value for {field} must be an integer"))
            })?;
            FilterValue::Integer(parsed)
        } else {
            FilterValue::Text(criterion.value.clone())
        };

        filters.push(CompiledFilter { field, op, value });
    }

    let mut order = Vec::with_capacity(2);
    if let Some(field) = inequality_field {
        order.push(SortKey::Field(field));
    }
    order.push(SortKey::Name);

    Ok(QueryPlan { order, filters })
}
