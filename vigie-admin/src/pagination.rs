//! Pagination for list endpoints (100 rows/page)

/// Rows per page on every paginated endpoint
pub const PAGE_SIZE: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Clamp the requested page into [1, total_pages] and compute its offset
///
/// # Examples
/// ```
/// use vigie_admin::pagination::calculate_pagination;
///
/// // 420 articles: four full pages and one of 20
/// let p = calculate_pagination(420, 5);
/// assert_eq!(p.total_pages, 5);
/// assert_eq!(p.offset, 400);
///
/// let p = calculate_pagination(420, -3);
/// assert_eq!(p.page, 1);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results.max(0) + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let p = calculate_pagination(250, 2);
        assert_eq!((p.page, p.total_pages, p.offset), (2, 3, 100));
    }

    #[test]
    fn test_page_clamped_to_last() {
        let p = calculate_pagination(150, 99);
        assert_eq!((p.page, p.total_pages, p.offset), (2, 2, 100));
    }

    #[test]
    fn test_page_clamped_to_first() {
        let p = calculate_pagination(150, 0);
        assert_eq!((p.page, p.offset), (1, 0));
    }

    #[test]
    fn test_no_rows() {
        let p = calculate_pagination(0, 3);
        assert_eq!((p.page, p.total_pages, p.offset), (1, 0, 0));
    }

    #[test]
    fn test_exact_boundary() {
        let p = calculate_pagination(200, 3);
        assert_eq!((p.page, p.total_pages, p.offset), (2, 2, 100));
    }
}
