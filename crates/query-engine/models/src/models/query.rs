//! The abstract request: filters, ordering and paging.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use super::error::Error;
use super::filter::Filter;

/// The direction of an ORDER BY element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directions are matched case-insensitively.
impl FromStr for OrderDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => Err(Error::UnsupportedDirection(s.to_string())),
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByElement {
    pub column: String,
    pub direction: OrderDirection,
}

/// A paginated, sorted and filtered request.
///
/// `echo` is an opaque correlation token returned untouched in the results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    echo: i64,
    filters: Vec<Filter>,
    order_by: Vec<OrderByElement>,
    limit: Option<NonZeroU64>,
    offset: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echo(&self) -> i64 {
        self.echo
    }

    pub fn set_echo(&mut self, echo: i64) -> &mut Self {
        self.echo = echo;
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn add_filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Replace every filter.
    pub fn set_filters(&mut self, filters: impl IntoIterator<Item = Filter>) -> &mut Self {
        self.filters = filters.into_iter().collect();
        self
    }

    pub fn order_by(&self) -> &[OrderByElement] {
        &self.order_by
    }

    /// Append a sort key. Earlier keys take precedence.
    pub fn add_order_by(&mut self, column: &str, direction: &str) -> Result<&mut Self, Error> {
        if column.trim().is_empty() {
            return Err(Error::BlankSortColumn);
        }
        let direction = direction.parse()?;
        self.order_by.push(OrderByElement {
            column: column.to_string(),
            direction,
        });
        Ok(self)
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit.map(NonZeroU64::get)
    }

    /// `None` means unbounded. A limit of zero is rejected.
    pub fn set_limit(&mut self, limit: Option<u64>) -> Result<&mut Self, Error> {
        self.limit = match limit {
            None => None,
            Some(limit) => Some(NonZeroU64::new(limit).ok_or(Error::InvalidLimit)?),
        };
        Ok(self)
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Option<u64>) -> &mut Self {
        self.offset = offset;
        self
    }
}
