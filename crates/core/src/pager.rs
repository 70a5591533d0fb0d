//! Fixed-size paging over the enrollment list.

use std::num::NonZeroUsize;

/// One page of an ordered list.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-indexed.
    pub page_number: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Tracks the active page for a list whose length may change between renders.
///
/// Page numbers are 1-indexed. Requests outside `1..=total_pages` clamp to the nearest valid
/// page; an empty list still has one (empty) page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page_size: NonZeroUsize,
    current: usize,
}

impl Pager {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            current: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Page the pager was last moved to. May exceed the valid range if the list shrank;
    /// [`Pager::page`] clamps on read.
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size.get()).max(1)
    }

    /// Move to `page`, clamped to the valid range for `total_items`. Returns the active page.
    pub fn go_to(&mut self, page: usize, total_items: usize) -> usize {
        self.current = self.clamp(page, total_items);
        self.current
    }

    /// Slice of `items` for the active page.
    pub fn page<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
        let page_number = self.clamp(self.current, items.len());
        let size = self.page_size.get();
        let start = (page_number - 1) * size;
        let end = (start + size).min(items.len());

        Page {
            items: &items[start.min(end)..end],
            page_number,
            page_size: size,
            total_items: items.len(),
            total_pages: self.total_pages(items.len()),
        }
    }

    fn clamp(&self, page: usize, total_items: usize) -> usize {
        page.clamp(1, self.total_pages(total_items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager(size: usize) -> Pager {
        Pager::new(NonZeroUsize::new(size).expect("non-zero page size"))
    }

    fn twelve() -> Vec<u32> {
        (1..=12).collect()
    }

    #[test]
    fn first_page_holds_first_five_items() {
        let items = twelve();
        let p = pager(5);
        let page = p.page(&items);
        assert_eq!(page.items, &[1, 2, 3, 4, 5]);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 12);
    }

    #[test]
    fn last_page_is_partial() {
        let items = twelve();
        let mut p = pager(5);
        assert_eq!(p.go_to(3, items.len()), 3);
        assert_eq!(p.page(&items).items, &[11, 12]);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items = twelve();
        let mut p = pager(5);
        assert_eq!(p.go_to(4, items.len()), 3);
        assert_eq!(p.page(&items).items, &[11, 12]);

        assert_eq!(p.go_to(0, items.len()), 1);
        assert_eq!(p.page(&items).items, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn shrinking_list_clamps_on_read() {
        let mut items = twelve();
        let mut p = pager(5);
        p.go_to(3, items.len());

        items.truncate(4);
        let page = p.page(&items);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.items, &[1, 2, 3, 4]);
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let mut p = pager(5);
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.go_to(2, 0), 1);
        let page = p.page(&items);
        assert!(page.items.is_empty());
        assert_eq!(page.page_number, 1);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let items: Vec<u32> = (1..=10).collect();
        let mut p = pager(5);
        assert_eq!(p.total_pages(items.len()), 2);
        assert_eq!(p.go_to(9, items.len()), 2);
        assert_eq!(p.page(&items).items, &[6, 7, 8, 9, 10]);
    }
}
