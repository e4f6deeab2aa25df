pub mod dialogs;
pub mod menu;
mod notification;
pub mod overlay;

pub use menu::{MenuItem, MenuOptions, Presentation};
pub use notification::{Notification, NotifyKind, DEFAULT_NOTIFY_LENGTH_MS};
pub use overlay::Overlay;
