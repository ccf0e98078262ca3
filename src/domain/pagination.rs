//! Transaction list pagination
//!
//! The aggregator hands back the full transaction list in one response;
//! pages are cut locally for display. Page numbers are 1-based. A page
//! number below 1 is clamped to 1 rather than producing a negative start
//! index, and a page past the end yields an empty slice rather than an
//! error.

use serde::Serialize;

/// One page of a larger list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice `items` into the requested fixed-size page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    assert!(page_size > 0, "page_size must be positive");

    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total_items);
    let items = if start >= total_items {
        Vec::new()
    } else {
        items[start..end].to_vec()
    };

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_last_partial_page() {
        // 25 items at 10/page: page 3 holds items 20..24
        let page = paginate(&sample(25), 3, 10);
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);
    }

    #[test]
    fn test_full_page() {
        let page = paginate(&sample(25), 1, 10);
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_pages_are_disjoint_and_cover_in_order() {
        let items = sample(47);
        let size = 10;
        let total_pages = paginate(&items, 1, size).total_pages;

        let mut reassembled = Vec::new();
        for p in 1..=total_pages {
            let page = paginate(&items, p, size);
            let expected = size.min(items.len() - (p - 1) * size);
            assert_eq!(page.items.len(), expected);
            reassembled.extend(page.items);
        }
        assert_eq!(reassembled, items);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = paginate(&sample(25), 4, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let page = paginate(&sample(25), 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_list() {
        let page = paginate(&sample(0), 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_items, 0);
    }
}
