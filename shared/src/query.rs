//! Pagination types for list endpoints

use serde::{Deserialize, Serialize};

/// Paginated list envelope
///
/// Every list endpoint returns this shape. `current_page` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Page contents
    pub items: Vec<T>,
    /// Total matching records across all pages
    pub total: u64,
    /// Total page count (`ceil(total / limit)`)
    pub total_pages: u32,
    /// Page number this response covers
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            ((total as f64) / (limit as f64)).ceil() as u32
        } else {
            1
        };

        Self {
            items,
            total,
            total_pages,
            current_page: page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new(vec!["a", "b", "c"], 100, 2, 10);
        assert_eq!(page.total, 100);
        assert_eq!(page.total_pages, 10);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn test_page_partial_last_page() {
        let page = Page::new(vec![1], 11, 2, 10);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_page_empty() {
        let page: Page<i64> = Page::new(vec![], 0, 1, 10);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_page_serialize_shape() {
        let page = Page::new(vec![1, 2], 2, 1, 10);
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"items\":[1,2]"));
        assert!(json.contains("\"total\":2"));
        assert!(json.contains("\"total_pages\":1"));
        assert!(json.contains("\"current_page\":1"));
    }
}
