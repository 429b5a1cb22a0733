use async_graphql::Enum;
use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;
use crate::error::{AppError, AppResult};

/// Direction of the creation-time ordering used while fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Comparison that keeps the cursor row and everything after it.
    pub(crate) fn cursor_comparison(self) -> &'static str {
        match self {
            SortOrder::Asc => ">=",
            SortOrder::Desc => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<String>,
    pub order: SortOrder,
}

impl PageRequest {
    pub fn new(
        limit: Option<u32>,
        cursor: Option<String>,
        order: SortOrder,
        feed: &FeedConfig,
    ) -> AppResult<Self> {
        let limit = limit.unwrap_or(feed.default_page_size);
        if limit == 0 || limit > feed.max_page_size {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                feed.max_page_size
            )));
        }
        Ok(Self {
            limit,
            cursor,
            order,
        })
    }

    /// Rows to ask the store for: one extra to detect a following page.
    pub fn fetch_size(&self) -> u32 {
        self.limit.saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Trim an over-fetched result to `limit` rows. The dropped row's id
    /// becomes the next cursor, and the page is returned in reverse fetch
    /// order.
    pub fn from_overfetch(mut rows: Vec<T>, limit: u32, id_of: impl Fn(&T) -> &str) -> Self {
        let mut next_cursor = None;
        if rows.len() > limit as usize {
            next_cursor = rows.pop().map(|row| id_of(&row).to_string());
        }
        rows.reverse();
        Page {
            items: rows,
            next_cursor,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}
