//! Pagination primitives shared across all list endpoints: offset/limit
//! paging with total counts, and cursor paging for the storefront feed.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Page size applied when the request does not supply a positive one.
const DEFAULT_ROWS_PER_PAGE: i64 = 10;

/// Offset pagination query parameters.
///
/// Malformed input never rejects the request: non-numeric or non-positive
/// values fall back to the defaults (page 1, 10 rows).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default, deserialize_with = "de_lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_int")]
    pub rows_per_page: Option<i64>,
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.rows_per_page
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_ROWS_PER_PAGE)
    }

    pub fn current_page(&self) -> i64 {
        self.page.filter(|n| *n > 0).unwrap_or(1)
    }

    pub fn offset(&self) -> i64 {
        (self.current_page() - 1) * self.limit()
    }
}

/// Query parameters arrive as strings; anything that does not parse as an
/// integer counts as absent.
fn parse_lenient_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn de_lenient_int<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(parse_lenient_int(raw.as_deref()))
}

/// Pagination metadata attached to a paged result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_items: i64,
    pub total_pages: i64,
}

/// Paged result envelope returned by offset-paginated list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total_items: i64, page: &PageQuery) -> Self {
        let take = page.limit();
        let total_pages = (total_items + take - 1) / take;
        Self {
            items,
            info: PageInfo {
                total_items,
                total_pages,
            },
        }
    }
}

/// Cursor ("infinite list") query parameters: the id of the last-seen row
/// plus an optional free-text filter. No page or total concept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CursorQuery {
    pub cursor: Option<Uuid>,
    pub query: Option<String>,
}

/// One slice of a cursor-paginated stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T: Serialize> {
    pub items: Vec<T>,
    pub next_cursor: Option<Uuid>,
}

impl<T: Serialize> CursorPage<T> {
    /// Slice an over-fetched result (`limit + 1` rows requested) into a page.
    ///
    /// When the extra row came back, more results exist: the page is cut to
    /// `limit` and the id of the last retained row becomes the cursor the
    /// next fetch starts strictly after. Otherwise the stream is exhausted
    /// and `next_cursor` stays absent.
    pub fn from_rows(mut rows: Vec<T>, limit: usize, id_of: impl Fn(&T) -> Uuid) -> Self {
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }
        let next_cursor = if has_more {
            rows.last().map(|row| id_of(row))
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_query_defaults() {
        let q = PageQuery {
            page: None,
            rows_per_page: None,
        };
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.current_page(), 1);
    }

    #[test]
    fn page_query_offset_calculation() {
        let q = PageQuery {
            page: Some(3),
            rows_per_page: Some(10),
        };
        assert_eq!(q.offset(), 20);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn page_query_large_page_size_is_not_clamped() {
        let q = PageQuery {
            page: Some(1),
            rows_per_page: Some(500),
        };
        assert_eq!(q.limit(), 500);
    }

    #[test]
    fn page_query_non_positive_values_fall_back() {
        let q = PageQuery {
            page: Some(-2),
            rows_per_page: Some(0),
        };
        assert_eq!(q.current_page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn page_query_non_numeric_input_never_raises() {
        let q: PageQuery =
            serde_json::from_value(json!({ "page": "abc", "rowsPerPage": "oops" })).unwrap();
        assert_eq!(q.page, None);
        assert_eq!(q.rows_per_page, None);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn page_query_numeric_strings_parse() {
        let q: PageQuery =
            serde_json::from_value(json!({ "page": "2", "rowsPerPage": "25" })).unwrap();
        assert_eq!(q.current_page(), 2);
        assert_eq!(q.limit(), 25);
        assert_eq!(q.offset(), 25);
    }

    #[test]
    fn paged_result_total_pages_is_ceiling() {
        let q = PageQuery {
            page: Some(1),
            rows_per_page: Some(10),
        };
        assert_eq!(PagedResult::new(vec![1], 25, &q).info.total_pages, 3);
        assert_eq!(PagedResult::new(vec![1], 10, &q).info.total_pages, 1);
        assert_eq!(PagedResult::new(vec![1], 11, &q).info.total_pages, 2);
    }

    #[test]
    fn paged_result_zero_items_means_zero_pages() {
        for per_page in [1, 7, 10, 100] {
            let q = PageQuery {
                page: None,
                rows_per_page: Some(per_page),
            };
            let result: PagedResult<i32> = PagedResult::new(vec![], 0, &q);
            assert_eq!(result.info.total_items, 0);
            assert_eq!(result.info.total_pages, 0);
        }
    }

    #[test]
    fn paged_result_wire_shape() {
        let q = PageQuery::default();
        let result = PagedResult::new(vec![1, 2], 2, &q);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["items"], json!([1, 2]));
        assert_eq!(json["info"]["totalItems"], 2);
        assert_eq!(json["info"]["totalPages"], 1);
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        id: Uuid,
        seq: usize,
    }

    /// Simulate the storage layer: rows already in sort order, returning up
    /// to `limit + 1` rows strictly after the cursor row.
    fn fetch_after(rows: &[Row], cursor: Option<Uuid>, limit: usize) -> Vec<Row> {
        let start = match cursor {
            None => 0,
            Some(c) => rows
                .iter()
                .position(|r| r.id == c)
                .map(|i| i + 1)
                .unwrap_or(rows.len()),
        };
        rows[start..].iter().take(limit + 1).cloned().collect()
    }

    #[test]
    fn cursor_round_trip_covers_stream_exactly_once() {
        let rows: Vec<Row> = (0..25)
            .map(|seq| Row {
                id: Uuid::new_v4(),
                seq,
            })
            .collect();

        let first = CursorPage::from_rows(fetch_after(&rows, None, 10), 10, |r| r.id);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.next_cursor, Some(rows[9].id));

        let second = CursorPage::from_rows(fetch_after(&rows, first.next_cursor, 10), 10, |r| r.id);
        assert_eq!(second.items.len(), 10);
        assert_eq!(second.next_cursor, Some(rows[19].id));

        let third = CursorPage::from_rows(fetch_after(&rows, second.next_cursor, 10), 10, |r| r.id);
        assert_eq!(third.items.len(), 5);
        assert_eq!(third.next_cursor, None);

        let mut seen: Vec<Row> = Vec::new();
        seen.extend(first.items);
        seen.extend(second.items);
        seen.extend(third.items);
        assert_eq!(seen, rows);
    }

    #[test]
    fn cursor_page_exact_multiple_ends_cleanly() {
        let rows: Vec<Row> = (0..20)
            .map(|seq| Row {
                id: Uuid::new_v4(),
                seq,
            })
            .collect();

        let first = CursorPage::from_rows(fetch_after(&rows, None, 10), 10, |r| r.id);
        assert_eq!(first.items.len(), 10);
        assert!(first.next_cursor.is_some());

        let second = CursorPage::from_rows(fetch_after(&rows, first.next_cursor, 10), 10, |r| r.id);
        assert_eq!(second.items.len(), 10);
        assert_eq!(second.next_cursor, None);
    }

    #[test]
    fn cursor_page_empty_stream() {
        let page: CursorPage<Row> = CursorPage::from_rows(vec![], 10, |r| r.id);
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn cursor_page_wire_shape() {
        let id = Uuid::new_v4();
        let page = CursorPage {
            items: vec![1, 2, 3],
            next_cursor: Some(id),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"], json!([1, 2, 3]));
        assert_eq!(json["nextCursor"], json!(id));
    }
}
