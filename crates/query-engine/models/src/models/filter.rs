//! Filters: predicates over one or more columns.

use std::fmt;
use std::str::FromStr;

use enum_iterator::Sequence;
use nonempty::NonEmpty;

use super::error::Error;

/// The variant tag of the built-in filter kind.
pub const STANDARD_VARIANT: &str = "standard";

/// The comparison operators understood by a standard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Operator {
    Equal,
    NotEqual,
    LowerThan,
    LowerOrEqual,
    GreaterThan,
    GreaterOrEqual,
    InArray,
    StartsWith,
    EndsWith,
    Contains,
}

impl Operator {
    /// The symbol used to name the operator in requests.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LowerThan => "<",
            Self::LowerOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::InArray => "IN",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::Contains => "CONTAINS",
        }
    }

    /// Does the operator compare against a sequence of values rather than a single one.
    pub fn expects_sequence(self) -> bool {
        matches!(self, Self::InArray)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum_iterator::all::<Operator>()
            .find(|operator| operator.symbol() == s)
            .ok_or_else(|| Error::UnsupportedOperator(s.to_string()))
    }
}

/// What kind of filter this is, and the data specific to that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// A comparison using one of the fixed set of operators.
    Standard(Operator),
    /// A filter kind defined by the caller. Only a translator registered for
    /// the same variant tag can turn it into SQL.
    Custom(String),
}

/// A predicate over one or more columns.
///
/// A filter with several columns matches a row when any of its columns satisfies it.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    columns: NonEmpty<String>,
    value: serde_json::Value,
    kind: FilterKind,
}

impl Filter {
    /// Build a standard filter. The value must be a non-empty sequence for `IN`
    /// and a scalar for every other operator.
    pub fn standard<I, S>(
        columns: I,
        operator: Operator,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let value = value.into();
        check_value(operator, &value)?;
        Ok(Filter {
            columns: collect_columns(columns)?,
            value,
            kind: FilterKind::Standard(operator),
        })
    }

    /// Build a filter of a caller-defined variant.
    pub fn custom<I, S>(
        variant: impl Into<String>,
        columns: I,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variant = variant.into();
        if variant.trim().is_empty() {
            return Err(Error::BlankVariant);
        }
        Ok(Filter {
            columns: collect_columns(columns)?,
            value: value.into(),
            kind: FilterKind::Custom(variant),
        })
    }

    pub fn columns(&self) -> &NonEmpty<String> {
        &self.columns
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// The variant tag used to look up a translator.
    pub fn variant(&self) -> &str {
        match &self.kind {
            FilterKind::Standard(_) => STANDARD_VARIANT,
            FilterKind::Custom(variant) => variant,
        }
    }

    /// The operator of a standard filter.
    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            FilterKind::Standard(operator) => Some(operator),
            FilterKind::Custom(_) => None,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let operator = match &self.kind {
            FilterKind::Standard(operator) => operator.symbol(),
            FilterKind::Custom(variant) => variant.as_str(),
        };
        match &self.value {
            serde_json::Value::String(value) => {
                write!(f, "({}) {} \"{}\"", columns.join(", "), operator, value)
            }
            value => write!(f, "({}) {} {}", columns.join(", "), operator, value),
        }
    }
}

fn collect_columns<I, S>(columns: I) -> Result<NonEmpty<String>, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns = columns
        .into_iter()
        .map(|column| {
            let column: String = column.into();
            if column.trim().is_empty() {
                Err(Error::BlankColumn)
            } else {
                Ok(column)
            }
        })
        .collect::<Result<Vec<String>, Error>>()?;
    NonEmpty::from_vec(columns).ok_or(Error::EmptyColumns)
}

fn check_value(operator: Operator, value: &serde_json::Value) -> Result<(), Error> {
    let invalid = |reason: &str| Error::InvalidFilterValue {
        operator: operator.symbol(),
        reason: reason.to_string(),
    };
    match value {
        serde_json::Value::Array(values) if operator.expects_sequence() => {
            if values.is_empty() {
                Err(invalid("the list of values cannot be empty"))
            } else {
                Ok(())
            }
        }
        _ if operator.expects_sequence() => Err(invalid("expected a list of values")),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(invalid("expected a single value"))
        }
        _ => Ok(()),
    }
}
