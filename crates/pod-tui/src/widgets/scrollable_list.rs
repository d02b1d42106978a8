//! Generic scrollable list state: selection, scroll offset, click mapping.

use std::ops::Range;

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Replace the items and jump back to the top.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Replace the items but keep the selection where possible.
    pub fn refresh_items(&mut self, items: Vec<T>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        self.scroll_offset = self.scroll_offset.min(self.selected);
    }

    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.items.len() - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    /// Keep the selection inside a window of `rows` items.
    pub fn ensure_visible(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + rows {
            self.scroll_offset = self.selected + 1 - rows;
        }
    }

    /// Item indices shown in a window of `rows` items.
    pub fn viewport(&self, rows: usize) -> Range<usize> {
        let start = self.scroll_offset.min(self.items.len());
        let end = (start + rows).min(self.items.len());
        start..end
    }

    pub fn visible_items(&self, rows: usize) -> impl Iterator<Item = (usize, &T)> {
        let range = self.viewport(rows);
        let start = range.start;
        self.items[range].iter().enumerate().map(move |(i, item)| (start + i, item))
    }

    /// Select the item under window slot `slot`.  Returns true if one exists.
    pub fn handle_click(&mut self, slot: usize) -> bool {
        let target = self.scroll_offset + slot;
        if target < self.items.len() {
            self.selected = target;
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> ScrollableList<usize> {
        let mut l = ScrollableList::new();
        l.set_items((0..n).collect());
        l
    }

    #[test]
    fn test_scrolls_to_keep_selection_visible() {
        let mut l = list(30);
        l.select_down(12);
        l.ensure_visible(5);
        assert_eq!(l.viewport(5), 8..13);
        l.select_up(20);
        l.ensure_visible(5);
        assert_eq!(l.viewport(5), 0..5);
    }

    #[test]
    fn test_viewport_clamped_to_len() {
        let mut l = list(3);
        l.select_last();
        l.ensure_visible(10);
        assert_eq!(l.viewport(10), 0..3);
        assert!(list(0).viewport(4).is_empty());
    }

    #[test]
    fn test_refresh_keeps_selection_in_range() {
        let mut l = list(5);
        l.select_last();
        l.refresh_items(vec![1, 2]);
        assert_eq!(l.selected_item(), Some(&2));
    }

    #[test]
    fn test_click_past_end_is_ignored() {
        let mut l = list(2);
        assert!(!l.handle_click(4));
        assert!(l.handle_click(1));
        assert_eq!(l.selected, 1);
    }
}
