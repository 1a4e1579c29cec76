use std::time::Duration;

use shared::{
    domain::Master,
    protocol::{PageRequest, SortSpec},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSettings {
    pub page_size: u32,
    /// Quiescence window applied to filter keystrokes.
    pub debounce: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ListSettings {
    pub fn new(page_size: u32, debounce: Duration) -> Self {
        Self {
            page_size: page_size.max(1),
            debounce,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: String,
    pub sort: Option<SortSpec>,
    pub page_index: u32,
    pub page_size: u32,
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter: String::new(),
            sort: None,
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            offset: self.offset(),
            limit: self.page_size,
        }
    }
}

/// Records related to the selected master record. `related_key` carries the
/// person's last name as a matching hint and is only present for authenticated
/// callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub via: Master,
    pub related_id: Option<i64>,
    pub related_key: Option<String>,
}

/// How a list is populated under the current master context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    Unfiltered,
    ByRelation(Relation),
    ByIdentity(Option<i64>),
    /// A sibling master takes precedence; the list shows nothing.
    Cleared,
}

impl QueryMode {
    pub fn label(&self) -> &'static str {
        match self {
            QueryMode::Unfiltered => "unfiltered",
            QueryMode::ByRelation(_) => "by_relation",
            QueryMode::ByIdentity(_) => "by_identity",
            QueryMode::Cleared => "cleared",
        }
    }
}
