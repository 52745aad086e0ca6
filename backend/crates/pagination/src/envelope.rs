//! Page request normalisation and response envelope.

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::{CursorError, DEFAULT_LIMIT, MAX_LIMIT};

/// Errors raised while validating a page request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// The requested limit was zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Validated request for one page of results.
///
/// # Examples
/// ```
/// use pagination::{PageRequest, MAX_LIMIT};
///
/// let request = PageRequest::new(Some("  ".to_owned()), Some(500)).expect("valid");
/// assert!(request.cursor().is_none());
/// assert_eq!(request.limit(), MAX_LIMIT);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    cursor: Option<String>,
    limit: usize,
}

impl PageRequest {
    /// Build a request, treating a blank cursor as absent and clamping the
    /// limit to [`MAX_LIMIT`].
    ///
    /// # Errors
    /// Returns [`PageRequestError::ZeroLimit`] when `limit` is `Some(0)`.
    pub fn new(cursor: Option<String>, limit: Option<usize>) -> Result<Self, PageRequestError> {
        let limit = match limit {
            Some(0) => return Err(PageRequestError::ZeroLimit),
            Some(value) => value.min(MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };
        let cursor = cursor
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty());
        Ok(Self { cursor, limit })
    }

    /// First page with the default limit.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Opaque cursor supplied by the client, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of rows to fetch so the presence of a following page can be
    /// detected without a count query.
    #[must_use]
    pub const fn fetch_limit(&self) -> usize {
        self.limit.saturating_add(1)
    }
}

/// One page of results plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Cursor pointing after the last row, when more rows exist.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`PageRequest::fetch_limit`].
    ///
    /// When more than `limit` rows were fetched the surplus row is dropped
    /// and a cursor is derived from the last row kept.
    ///
    /// # Errors
    /// Propagates failures from `cursor_for`.
    pub fn from_lookahead<F>(
        mut rows: Vec<T>,
        limit: usize,
        cursor_for: F,
    ) -> Result<Self, CursorError>
    where
        F: FnOnce(&T) -> Result<String, CursorError>,
    {
        if rows.len() <= limit {
            return Ok(Self {
                items: rows,
                next_cursor: None,
            });
        }
        rows.truncate(limit);
        let next_cursor = rows.last().map(cursor_for).transpose()?;
        Ok(Self {
            items: rows,
            next_cursor,
        })
    }

    /// Map every row while keeping the cursor.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// Navigation links for a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    /// Link to the first page.
    pub first: String,
    /// Link to the following page, when one exists.
    pub next: Option<String>,
}

impl PageLinks {
    /// Build links relative to `base`, preserving the request limit.
    #[must_use]
    pub fn new(base: &Url, request: &PageRequest, next_cursor: Option<&str>) -> Self {
        let limit = request.limit().to_string();
        let mut first = base.clone();
        first.set_query(None);
        if request.limit() != DEFAULT_LIMIT {
            first.query_pairs_mut().append_pair("limit", &limit);
        }
        let next = next_cursor.map(|cursor| {
            let mut next = base.clone();
            next.set_query(None);
            next.query_pairs_mut()
                .append_pair("cursor", cursor)
                .append_pair("limit", &limit);
            relative(&next)
        });
        Self {
            first: relative(&first),
            next,
        }
    }
}

fn relative(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("http://localhost/listings?limit=5").expect("valid url")
    }

    #[rstest]
    fn zero_limit_is_rejected() {
        assert_eq!(
            PageRequest::new(None, Some(0)),
            Err(PageRequestError::ZeroLimit)
        );
    }

    #[rstest]
    #[case(None, DEFAULT_LIMIT)]
    #[case(Some(7), 7)]
    #[case(Some(MAX_LIMIT + 1), MAX_LIMIT)]
    fn limit_is_normalised(#[case] requested: Option<usize>, #[case] expected: usize) {
        let request = PageRequest::new(None, requested).expect("valid request");
        assert_eq!(request.limit(), expected);
        assert_eq!(request.fetch_limit(), expected + 1);
    }

    #[rstest]
    fn lookahead_row_produces_cursor() {
        let page = Page::from_lookahead(vec![1, 2, 3], 2, |last| Ok(format!("after-{last}")))
            .expect("page");
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.next_cursor.as_deref(), Some("after-2"));
    }

    #[rstest]
    fn short_result_has_no_cursor() {
        let page = Page::from_lookahead(vec![1], 2, |_| Ok("unused".to_owned())).expect("page");
        assert_eq!(page.items, vec![1]);
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    fn links_carry_cursor_and_limit() {
        let request = PageRequest::new(None, Some(5)).expect("valid request");
        let links = PageLinks::new(&base(), &request, Some("abc"));
        assert_eq!(links.first, "/listings?limit=5");
        assert_eq!(links.next.as_deref(), Some("/listings?cursor=abc&limit=5"));
    }

    #[rstest]
    fn default_limit_is_omitted_from_first_link() {
        let links = PageLinks::new(&base(), &PageRequest::first(), None);
        assert_eq!(links.first, "/listings");
        assert!(links.next.is_none());
    }
}
