use serde::Serialize;

use crate::error::ApiError;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Raw query pairs, kept in order so repeated keys (`tags`) survive.
#[derive(Debug, Default)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn flag(&self, key: &str) -> Result<Option<bool>, ApiError> {
        self.get(key)
            .map(|v| {
                v.parse::<bool>()
                    .map_err(|_| ApiError::validation(format!("{key} must be true or false")))
            })
            .transpose()
    }

    pub fn page(&self) -> Result<Page, ApiError> {
        let offset = self.number("offset")?.unwrap_or(0);
        let limit = self
            .number("limit")?
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Ok(Page { offset, limit })
    }

    pub fn descending(&self) -> bool {
        self.get("sort_order") == Some("desc")
    }

    fn number(&self, key: &str) -> Result<Option<usize>, ApiError> {
        self.get(key)
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| ApiError::validation(format!("{key} must be a non-negative integer")))
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

/// One page of a filtered collection plus the metadata every list carries.
#[derive(Debug)]
pub struct Listing<T> {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub items: Vec<T>,
}

impl<T: Clone> Listing<T> {
    pub fn paginate(items: Vec<T>, page: Page) -> Self {
        let total = items.len();
        let items = items.into_iter().skip(page.offset).take(page.limit).collect();
        Self {
            total,
            offset: page.offset,
            limit: page.limit,
            items,
        }
    }
}

impl<T: Serialize> Listing<T> {
    /// JSON body with the items under `key`.
    pub fn into_json(self, key: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "total": self.total,
            "offset": self.offset,
            "limit": self.limit,
        });
        body[key] = serde_json::to_value(&self.items).unwrap_or_default();
        body
    }
}

/// Case-insensitive substring match used by name-like filters.
pub fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Order by an optional string key, honouring `sort_order=desc`.
pub fn sort_by_key<T>(items: &mut [T], descending: bool, key: impl Fn(&T) -> Option<String>) {
    items.sort_by(|a, b| {
        let ord = key(a).cmp(&key(b));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}
