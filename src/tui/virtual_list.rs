//! Windowed list layout for the suggestion dropdown
//!
//! Sizes and offsets are in terminal lines. Only the items returned by
//! [`VirtualList::virtual_items`] are ever rendered.

use std::ops::Range;

/// One item positioned in list space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
    pub index: usize,
    pub start: usize,
    pub size: usize,
}

impl VirtualItem {
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

#[derive(Debug, Clone)]
pub struct VirtualList {
    count: usize,
    item_size: usize,
    overscan: usize,
    max_viewport: usize,
    scroll_offset: usize,
}

impl VirtualList {
    pub fn new(item_size: usize, overscan: usize, max_viewport: usize) -> Self {
        Self {
            count: 0,
            item_size: item_size.max(1),
            overscan,
            max_viewport,
            scroll_offset: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Change the number of items, keeping the scroll offset in range
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.clamp_offset();
    }

    pub fn set_max_viewport(&mut self, max_viewport: usize) {
        self.max_viewport = max_viewport;
        self.clamp_offset();
    }

    pub fn total_size(&self) -> usize {
        self.count * self.item_size
    }

    /// Height the list occupies: all items, capped at the max viewport
    pub fn viewport_size(&self) -> usize {
        self.total_size().min(self.max_viewport)
    }

    /// Items at least partly inside the viewport
    pub fn visible_range(&self) -> Range<usize> {
        let viewport = self.viewport_size();
        if self.count == 0 || viewport == 0 {
            return 0..0;
        }
        let first = self.scroll_offset / self.item_size;
        let end = (self.scroll_offset + viewport).div_ceil(self.item_size);
        first..end.min(self.count)
    }

    /// Visible items plus `overscan` on each side
    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        let visible = self.visible_range();
        if visible.is_empty() {
            return Vec::new();
        }
        let start = visible.start.saturating_sub(self.overscan);
        let end = (visible.end + self.overscan).min(self.count);
        (start..end)
            .map(|index| VirtualItem {
                index,
                start: index * self.item_size,
                size: self.item_size,
            })
            .collect()
    }

    /// Scroll the minimum amount that makes `index` fully visible
    pub fn scroll_to_index(&mut self, index: usize) {
        if index >= self.count {
            return;
        }
        let start = index * self.item_size;
        let end = start + self.item_size;
        let viewport = self.viewport_size();
        if start < self.scroll_offset {
            self.scroll_offset = start;
        } else if end > self.scroll_offset + viewport {
            self.scroll_offset = end.saturating_sub(viewport);
        }
        self.clamp_offset();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_offset();
    }

    /// Map a row inside the viewport back to an item index
    pub fn index_at(&self, row: usize) -> Option<usize> {
        if row >= self.viewport_size() {
            return None;
        }
        let index = (self.scroll_offset + row) / self.item_size;
        (index < self.count).then_some(index)
    }

    fn clamp_offset(&mut self) {
        let max = self.total_size().saturating_sub(self.viewport_size());
        self.scroll_offset = self.scroll_offset.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(count: usize) -> VirtualList {
        let mut l = VirtualList::new(2, 5, 10);
        l.set_count(count);
        l
    }

    #[test]
    fn viewport_shrinks_to_content() {
        assert_eq!(list(3).viewport_size(), 6);
        assert_eq!(list(15).viewport_size(), 10);
        assert_eq!(list(15).total_size(), 30);
        assert_eq!(list(0).viewport_size(), 0);
    }

    #[test]
    fn only_window_plus_overscan_is_materialized() {
        let mut l = list(100);
        l.scroll_by(40);
        assert_eq!(l.visible_range(), 20..25);

        let items = l.virtual_items();
        assert_eq!(items.first().map(|i| i.index), Some(15));
        assert_eq!(items.last().map(|i| i.index), Some(29));
        assert_eq!(items[0].start, 30);
        assert_eq!(items[0].end(), 32);
    }

    #[test]
    fn overscan_is_clamped_to_bounds() {
        let l = list(3);
        let indices: Vec<usize> = l.virtual_items().iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(list(0).virtual_items().is_empty());
    }

    #[test]
    fn partially_scrolled_item_counts_as_visible() {
        let mut l = list(15);
        l.scroll_by(1);
        assert_eq!(l.visible_range(), 0..6);
    }

    #[test]
    fn scroll_to_index_moves_minimally() {
        let mut l = list(15);
        l.scroll_to_index(4);
        assert_eq!(l.scroll_offset(), 0);

        l.scroll_to_index(7);
        assert_eq!(l.scroll_offset(), 6);

        l.scroll_to_index(2);
        assert_eq!(l.scroll_offset(), 4);

        l.scroll_to_index(99);
        assert_eq!(l.scroll_offset(), 4);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut l = list(15);
        l.scroll_by(-3);
        assert_eq!(l.scroll_offset(), 0);
        l.scroll_by(1000);
        assert_eq!(l.scroll_offset(), 20);

        l.set_count(4);
        assert_eq!(l.scroll_offset(), 0);
    }

    #[test]
    fn rows_map_back_to_items() {
        let mut l = list(15);
        l.scroll_by(3);
        assert_eq!(l.index_at(0), Some(1));
        assert_eq!(l.index_at(1), Some(2));
        assert_eq!(l.index_at(9), Some(6));
        assert_eq!(l.index_at(10), None);
        assert_eq!(list(2).index_at(4), None);
    }
}
