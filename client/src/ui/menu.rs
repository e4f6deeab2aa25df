//! Menu model
//!
//! Menus are plain lists of items; the host decides how to draw them.

use crate::events::LocalEvent;
use super::Notification;

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub header: String,
    pub txt: Option<String>,
    pub icon: Option<String>,
    /// Title row that cannot be selected
    pub is_menu_header: bool,
    pub event: Option<LocalEvent>,
}

impl MenuItem {
    /// Selectable entry emitting `event`
    pub fn entry(header: impl Into<String>, txt: impl Into<String>, event: LocalEvent) -> Self {
        Self {
            header: header.into(),
            txt: Some(txt.into()),
            icon: None,
            is_menu_header: false,
            event: Some(event),
        }
    }

    /// Non-selectable title row
    pub fn title(header: impl Into<String>, txt: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            txt: Some(txt.into()),
            icon: None,
            is_menu_header: true,
            event: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn is_selectable(&self) -> bool {
        !self.is_menu_header && self.event.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuOptions {
    pub hide_footer: bool,
}

/// Host side of menus and notifications
pub trait Presentation {
    fn open_menu(&mut self, items: Vec<MenuItem>, options: MenuOptions);
    fn close_menu(&mut self);
    fn notify(&mut self, notification: Notification);
}
