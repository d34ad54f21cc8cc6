//! Query-string assembly and path-segment encoding.
//!
//! List and search endpoints take an options struct; each struct implements
//! [`ToQuery`] by pushing its fields into a [`QueryParams`]. The push helpers
//! drop empty values, so an options struct left at `Default` produces no
//! query string at all.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::borrow::Cow;

use crate::error::Error;

/// Characters escaped when an identifier is interpolated as one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode `value` so it occupies exactly one path segment.
pub fn encode_segment(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, PATH_SEGMENT).into()
}

/// [`encode_segment`] for a caller-supplied identifier.
///
/// URL resolution treats `.` and `..` (escaped or not) as dot segments and
/// an empty segment collapses the path, so those identifiers are refused.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an empty, `.` or `..` identifier.
pub fn path_segment(value: &str) -> Result<Cow<'_, str>, Error> {
    if matches!(value, "" | "." | "..") {
        return Err(Error::InvalidArgument(format!(
            "identifier {value:?} is not a valid path segment"
        )));
    }
    Ok(encode_segment(value))
}

/// Ordered query parameters. Keys may repeat (`tags=a&tags=b`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unconditionally.
    pub fn push(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// Append when `value` is present and non-empty.
    pub fn push_str(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
        self
    }

    /// Append `true`/`false` when the flag is set either way.
    pub fn push_bool(&mut self, key: &str, value: Option<bool>) -> &mut Self {
        if let Some(v) = value {
            self.push(key, v.to_string());
        }
        self
    }

    /// Append one pair per non-empty element.
    pub fn push_all(&mut self, key: &str, values: &[String]) -> &mut Self {
        for v in values {
            self.push_str(key, Some(v));
        }
        self
    }

    /// `offset` and `limit` travel together: both are sent only when both
    /// are positive.
    pub fn push_page(&mut self, page: &Pagination) -> &mut Self {
        if page.offset > 0 && page.limit > 0 {
            self.push("offset", page.offset.to_string());
            self.push("limit", page.limit.to_string());
        }
        self
    }

    pub fn push_sort(&mut self, sort_by: Option<&str>, order: Option<SortOrder>) -> &mut Self {
        self.push_str("sort_by", sort_by);
        if let Some(order) = order {
            self.push("sort_order", order.as_str());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Options structs that contribute query parameters.
pub trait ToQuery {
    fn to_query(&self) -> QueryParams;
}

/// Offset/limit window for list endpoints. Zero means "server default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}
