/// Default notification length
pub const DEFAULT_NOTIFY_LENGTH_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
    Primary,
    Warning,
}

impl NotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyKind::Success => "success",
            NotifyKind::Error => "error",
            NotifyKind::Primary => "primary",
            NotifyKind::Warning => "warning",
        }
    }

    /// Unknown strings are shown as primary
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => NotifyKind::Success,
            "error" => NotifyKind::Error,
            "warning" => NotifyKind::Warning,
            _ => NotifyKind::Primary,
        }
    }
}

/// Transient on-screen message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub kind: NotifyKind,
    pub length_ms: u32,
}

impl Notification {
    pub fn new(text: impl Into<String>, kind: NotifyKind) -> Self {
        Self {
            text: text.into(),
            kind,
            length_ms: DEFAULT_NOTIFY_LENGTH_MS,
        }
    }

    pub fn with_length(mut self, length_ms: u32) -> Self {
        self.length_ms = length_ms;
        self
    }
}
