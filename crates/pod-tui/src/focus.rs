//! FocusRing: keyboard focus cycling between the panes of one view.

use crate::action::ComponentId;

#[derive(Debug, Default)]
pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + self.items.len() - 1) % self.items.len();
        self.current()
    }

    /// Focus `id` if it is part of the ring.  Returns whether it was.
    pub fn set(&mut self, id: ComponentId) -> bool {
        match self.items.iter().position(|&x| x == id) {
            Some(pos) => {
                self.current = pos;
                true
            }
            None => false,
        }
    }

    /// Focus the Nth pane (0-indexed).  No-op when out of range.
    pub fn set_by_position(&mut self, pos: usize) -> Option<ComponentId> {
        if pos < self.items.len() {
            self.current = pos;
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_both_ways() {
        let mut ring = FocusRing::new(vec![
            ComponentId::SearchBar,
            ComponentId::History,
            ComponentId::Results,
        ]);
        assert_eq!(ring.prev(), Some(ComponentId::Results));
        assert_eq!(ring.next(), Some(ComponentId::SearchBar));
        assert_eq!(ring.next(), Some(ComponentId::History));
    }

    #[test]
    fn test_set_only_accepts_members() {
        let mut ring = FocusRing::new(vec![ComponentId::Player, ComponentId::Queue]);
        assert!(ring.set(ComponentId::Queue));
        assert_eq!(ring.current(), Some(ComponentId::Queue));
        assert!(!ring.set(ComponentId::SearchBar));
        assert_eq!(ring.current(), Some(ComponentId::Queue));
    }

    #[test]
    fn test_set_by_position_ignores_out_of_range() {
        let mut ring = FocusRing::new(vec![ComponentId::Player, ComponentId::Queue]);
        assert_eq!(ring.set_by_position(1), Some(ComponentId::Queue));
        assert_eq!(ring.set_by_position(5), Some(ComponentId::Queue));
    }
}
