//! # Pagination
//!
//! Translates the `?page=&keyword=` query of list endpoints into the
//! limit/offset window a repository understands.
//!
//! ```text
//! page=1, per_page=4  →  limit 4, offset 0
//! page=3, per_page=4  →  limit 4, offset 8
//! page=0 or missing   →  treated as page 1
//! ```

use serde::Deserialize;

use crate::error::ValidationResult;
use crate::validation::validate_search_keyword;

/// Raw list query as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Case-insensitive substring filter.
    pub keyword: Option<String>,
}

impl PageQuery {
    pub fn new(page: Option<u32>, keyword: Option<&str>) -> Self {
        PageQuery {
            page,
            keyword: keyword.map(str::to_string),
        }
    }

    /// Current page, never below 1.
    pub fn page_number(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Builds the repository filter for a given page size.
    ///
    /// Blank keywords are dropped; keywords over 100 characters are rejected.
    pub fn to_filter(&self, per_page: u32) -> ValidationResult<ListFilter> {
        let keyword = match self.keyword.as_deref() {
            Some(raw) => {
                let trimmed = validate_search_keyword(raw)?;
                (!trimmed.is_empty()).then_some(trimmed)
            }
            None => None,
        };

        let per_page = per_page.max(1);
        Ok(ListFilter {
            keyword,
            limit: per_page,
            offset: (self.page_number() - 1).saturating_mul(per_page),
        })
    }
}

/// Filter handed to repository `find` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub keyword: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl ListFilter {
    /// Unfiltered window starting at the first record.
    pub fn first(limit: u32) -> Self {
        ListFilter {
            keyword: None,
            limit,
            offset: 0,
        }
    }
}
