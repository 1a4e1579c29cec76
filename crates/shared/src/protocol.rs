use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One page of a larger result set, as returned by the `find*` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet<T> {
    pub count: u64,
    pub records: Vec<T>,
}

impl<T> ResultSet<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            records: Vec::new(),
        }
    }
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortSpecError {
    #[error("sort spec is missing a column")]
    MissingColumn,
    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),
}

/// A single-column sort, written `COLUMN+ASC` or `COLUMN+DESC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }

    /// Query-string value before form encoding; encodes to `COLUMN+DIR` on the wire.
    pub fn query_value(&self) -> String {
        format!("{} {}", self.column, self.direction.as_str())
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.column, self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = SortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (column, direction) = match s.split_once(['+', ' ']) {
            Some((column, direction)) => (column.trim(), direction.trim()),
            None => (s, "ASC"),
        };
        if column.is_empty() {
            return Err(SortSpecError::MissingColumn);
        }
        let direction = if direction.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else if direction.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            return Err(SortSpecError::UnknownDirection(direction.to_string()));
        };
        Ok(Self::new(column, direction))
    }
}

/// Filter, sort and page window forwarded to every `find*` call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub filter: String,
    pub sort: Option<SortSpec>,
    pub offset: u64,
    pub limit: u32,
}

impl PageRequest {
    /// Query pairs in the order the REST service documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filter_pairs();
        pairs.push(("start", self.offset.to_string()));
        pairs.push(("count", self.limit.to_string()));
        pairs
    }

    /// The `filter`/`sort` subset shared with download links.
    pub fn filter_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.filter.is_empty() {
            pairs.push(("filter", self.filter.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.query_value()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}
