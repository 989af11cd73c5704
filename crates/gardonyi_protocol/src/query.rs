//! Paging and sorting parameters of list requests.

use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// Page size used when a request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Wire name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Sort order of a list request, `field,direction` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl Sort {
    /// Creates an ascending sort.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Creates a descending sort.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::asc("id")
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction.as_str())
    }
}

impl FromStr for Sort {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let field = parts.next().unwrap_or_default().trim();
        if field.is_empty() {
            return Err(ProtocolError::invalid_query("sort", "missing field"));
        }
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => Direction::Asc,
            Some(d) if d == "asc" => Direction::Asc,
            Some(d) if d == "desc" => Direction::Desc,
            Some(other) => {
                return Err(ProtocolError::invalid_query(
                    "sort",
                    format!("unknown direction `{}`", other),
                ))
            }
        };
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Zero-based page index.
    pub page: u32,
    /// Records per page.
    pub size: u32,
    /// Sort order.
    pub sort: Sort,
}

impl ListQuery {
    /// Creates a query for the given page and size, sorted by id.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Sort::default(),
        }
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Renders the form-encoded query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string())
            .append_pair("sort", &self.sort.to_string())
            .finish()
    }

    /// Parses a query string, falling back to `defaults` for missing
    /// parameters. Unknown parameters are ignored.
    pub fn parse(query: &str, defaults: &ListQuery) -> ProtocolResult<Self> {
        let mut result = defaults.clone();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "page" => result.page = parse_number("page", &value)?,
                "size" => {
                    let size = parse_number("size", &value)?;
                    if size == 0 {
                        return Err(ProtocolError::invalid_query("size", "must be positive"));
                    }
                    result.size = size;
                }
                "sort" => result.sort = value.parse()?,
                _ => {}
            }
        }

        Ok(result)
    }

    /// Index of the first record on this page.
    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

fn parse_number(name: &str, value: &str) -> ProtocolResult<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| ProtocolError::invalid_query(name, e.to_string()))
}
