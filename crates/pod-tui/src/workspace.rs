//! ViewManager: Search/Player switching and the focus ring of the active view.

use crate::action::{ComponentId, View};
use crate::focus::FocusRing;

pub struct ViewManager {
    pub view: View,
    pub focus: FocusRing,
    /// Footer keybindings bar.
    pub show_keys_bar: bool,
}

impl ViewManager {
    pub fn new(view: View) -> Self {
        let mut vm = Self {
            view,
            focus: FocusRing::default(),
            show_keys_bar: true,
        };
        vm.rebuild_focus_ring();
        vm
    }

    fn panes(view: View) -> Vec<ComponentId> {
        match view {
            View::Search => vec![
                ComponentId::SearchBar,
                ComponentId::History,
                ComponentId::Results,
            ],
            View::Player => vec![ComponentId::Player, ComponentId::Queue],
        }
    }

    fn rebuild_focus_ring(&mut self) {
        self.focus = FocusRing::new(Self::panes(self.view));
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.rebuild_focus_ring();
        }
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.focus.current()
    }

    pub fn focus_next(&mut self) -> Option<ComponentId> {
        self.focus.next()
    }

    pub fn focus_prev(&mut self) -> Option<ComponentId> {
        self.focus.prev()
    }

    /// Focus `id`, switching views first if it lives in the other one.
    pub fn focus_set(&mut self, id: ComponentId) {
        if !Self::panes(self.view).contains(&id) {
            self.set_view(self.view.other());
        }
        self.focus.set(id);
    }

    pub fn focus_nth(&mut self, n: usize) -> Option<ComponentId> {
        self.focus.set_by_position(n)
    }
}

impl Default for ViewManager {
    fn default() -> Self {
        Self::new(View::Search)
    }
}
