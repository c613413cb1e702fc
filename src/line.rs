//! Value types shared by the classifier, suppression buffer, and filter engine.

use std::fmt;

/// Category assigned to a line exactly once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Command output or a system/status message.
    Command,
    /// Player/conversational chat or a game broadcast.
    Chat,
}

impl Category {
    pub(crate) fn short_label(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// An immutable unit of stream input.
///
/// Created by the host per incoming message; consumed once by the classifier
/// and optionally retained by the suppression buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Raw display text.
    pub text: String,
    /// Presence of a cryptographic attestation token on this line.
    pub has_signature: bool,
    /// Whether the source-side runtime marked this as a system/status message.
    pub is_system_flagged: bool,
    /// Arrival time in epoch milliseconds.
    pub arrival_ms: i64,
}

impl Line {
    pub fn new(
        text: impl Into<String>,
        has_signature: bool,
        is_system_flagged: bool,
        arrival_ms: i64,
    ) -> Self {
        Self {
            text: text.into(),
            has_signature,
            is_system_flagged,
            arrival_ms,
        }
    }
}

/// Outcome of feeding a line to the filter engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayAction {
    /// Display immediately; the line is handed back to the caller.
    ShowNow(Line),
    /// Suppressed and retained; no further action needed by the caller.
    Buffered,
}
