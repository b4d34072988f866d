//! PageManager — the active page plus keyboard focus within it.
//!
//! Pages mirror the app's navigation model: a Home landing page, one
//! track-list page per genre, and the Player page. Each page carries its
//! own focus ring (the recent panel is reachable from every page); a page
//! switch keeps focus on a component present on both pages.

use crate::action::{ComponentId, Page};

pub struct PageManager {
    pub page: Page,

    // ── Shared UI ─────────────────────────────────────────────────────────────
    pub show_help: bool,
    pub show_keys_bar: bool, // footer keybindings bar

    // ── Focus ring for the current page ───────────────────────────────────────
    ring: Vec<ComponentId>,
    focus_pos: usize,
}

impl PageManager {
    pub fn new() -> Self {
        let mut pm = Self {
            page: Page::Home,
            show_help: false,
            show_keys_bar: true,
            ring: Vec::new(),
            focus_pos: 0,
        };
        pm.rebuild_focus_ring();
        pm
    }

    fn rebuild_focus_ring(&mut self) {
        let old = self.focused();
        self.ring = match self.page {
            Page::Home => vec![ComponentId::RecentPanel],
            Page::Sleeping => vec![ComponentId::SleepingList, ComponentId::RecentPanel],
            Page::Focus => vec![ComponentId::FocusList, ComponentId::RecentPanel],
            Page::Player => vec![ComponentId::PlayerPanel, ComponentId::RecentPanel],
        };
        self.focus_pos = old
            .and_then(|id| self.ring.iter().position(|&x| x == id))
            .unwrap_or(0);
    }

    pub fn set_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.rebuild_focus_ring();
        }
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.ring.get(self.focus_pos).copied()
    }

    pub fn focus_next(&mut self) -> Option<ComponentId> {
        if self.ring.is_empty() {
            return None;
        }
        self.focus_pos = (self.focus_pos + 1) % self.ring.len();
        self.focused()
    }

    pub fn focus_prev(&mut self) -> Option<ComponentId> {
        if self.ring.is_empty() {
            return None;
        }
        self.focus_pos = if self.focus_pos == 0 {
            self.ring.len() - 1
        } else {
            self.focus_pos - 1
        };
        self.focused()
    }

    /// Focus a specific component. No-op if it is not on the current page.
    pub fn focus_set(&mut self, id: ComponentId) {
        if let Some(pos) = self.ring.iter().position(|&x| x == id) {
            self.focus_pos = pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_switch_rebuilds_focus() {
        let mut pm = PageManager::new();
        assert_eq!(pm.focused(), Some(ComponentId::RecentPanel));

        pm.set_page(Page::Sleeping);
        assert_eq!(pm.focused(), Some(ComponentId::RecentPanel));
        pm.focus_next();
        assert_eq!(pm.focused(), Some(ComponentId::SleepingList));

        pm.set_page(Page::Player);
        pm.focus_set(ComponentId::PlayerPanel);
        assert_eq!(pm.focused(), Some(ComponentId::PlayerPanel));
    }

    #[test]
    fn test_focus_survives_page_switch() {
        let mut pm = PageManager::new();
        pm.set_page(Page::Sleeping);
        pm.focus_next();
        assert_eq!(pm.focused(), Some(ComponentId::SleepingList));

        // SleepingList is not on the Focus page; focus falls back to the
        // first component of the new ring.
        pm.set_page(Page::Focus);
        assert_eq!(pm.focused(), Some(ComponentId::FocusList));

        // RecentPanel exists everywhere, so it keeps focus across switches.
        pm.focus_prev();
        assert_eq!(pm.focused(), Some(ComponentId::RecentPanel));
        pm.set_page(Page::Home);
        assert_eq!(pm.focused(), Some(ComponentId::RecentPanel));
    }
}
