//! Menu and toast state for the sandbox host
//!
//! Keeps what is on screen; drawing lives in `render`.

use std::collections::VecDeque;

use super::menu::{MenuItem, MenuOptions, Presentation};
use super::Notification;
use crate::events::LocalEvent;

/// Toasts shown at once
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenMenu {
    pub items: Vec<MenuItem>,
    pub options: MenuOptions,
    /// Index into `items` of the highlighted entry
    pub selected: usize,
}

impl OpenMenu {
    fn selectable(&self) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_selectable())
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub remaining: f32,
}

#[derive(Debug, Default)]
pub struct Overlay {
    menu: Option<OpenMenu>,
    toasts: VecDeque<Toast>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(&self) -> Option<&OpenMenu> {
        self.menu.as_ref()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    /// Age toasts by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        for toast in self.toasts.iter_mut() {
            toast.remaining -= dt;
        }
        self.toasts.retain(|t| t.remaining > 0.0);
    }

    /// Move the highlight by `delta` selectable entries, wrapping around
    pub fn move_selection(&mut self, delta: i32) {
        let Some(menu) = self.menu.as_mut() else {
            return;
        };
        let entries: Vec<usize> = menu.selectable().collect();
        if entries.is_empty() {
            return;
        }
        let current = entries.iter().position(|i| *i == menu.selected).unwrap_or(0) as i32;
        let next = (current + delta).rem_euclid(entries.len() as i32) as usize;
        menu.selected = entries[next];
    }

    /// Event of the highlighted entry
    pub fn confirm(&self) -> Option<LocalEvent> {
        let menu = self.menu.as_ref()?;
        menu.items.get(menu.selected).filter(|i| i.is_selectable())?.event.clone()
    }

    /// Event of the `n`th selectable entry (zero based)
    pub fn pick(&self, n: usize) -> Option<LocalEvent> {
        let menu = self.menu.as_ref()?;
        let index = menu.selectable().nth(n)?;
        menu.items[index].event.clone()
    }
}

impl Presentation for Overlay {
    fn open_menu(&mut self, items: Vec<MenuItem>, options: MenuOptions) {
        let selected = items.iter().position(MenuItem::is_selectable).unwrap_or(0);
        self.menu = Some(OpenMenu { items, options, selected });
    }

    fn close_menu(&mut self) {
        self.menu = None;
    }

    fn notify(&mut self, notification: Notification) {
        log::info!("[{}] {}", notification.kind.as_str(), notification.text);
        let remaining = notification.length_ms as f32 / 1000.0;
        self.toasts.push_back(Toast { notification, remaining });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dialogs::main_menu;
    use crate::ui::NotifyKind;

    #[test]
    fn test_selection_skips_header_and_wraps() {
        let mut overlay = Overlay::new();
        overlay.open_menu(main_menu(None), MenuOptions { hide_footer: true });

        // The header row is never highlighted
        assert_eq!(overlay.menu().unwrap().selected, 1);
        overlay.move_selection(-1);
        assert_eq!(overlay.confirm(), Some(LocalEvent::CloseMenu));
        overlay.move_selection(1);
        assert_eq!(
            overlay.confirm(),
            Some(LocalEvent::Conversation { dialog_id: "about".to_string() })
        );
        assert_eq!(overlay.pick(1), Some(LocalEvent::ShowMissions));
        assert_eq!(overlay.pick(9), None);
    }

    #[test]
    fn test_toasts_expire() {
        let mut overlay = Overlay::new();
        overlay.notify(Notification::new("kurz", NotifyKind::Primary).with_length(1000));
        overlay.notify(Notification::new("lang", NotifyKind::Success).with_length(7000));

        overlay.update(1.5);
        let texts: Vec<_> = overlay.toasts().map(|t| t.notification.text.as_str()).collect();
        assert_eq!(texts, vec!["lang"]);
    }
}
