//! Display-suppression and backfill-release settings with their decision tables.
//!
//! Both settings are closed enums, so an unknown mode is only representable at
//! the parse boundary. Token parsing rejects with the offending token echoed
//! back alongside the accepted set; no state changes on rejection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::line::Category;

/// Which categories are suppressed while the input view is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Show everything.
    #[default]
    Disabled,
    /// Suppress every line.
    All,
    /// Suppress command output only.
    Commands,
    /// Suppress chat only.
    Chat,
}

/// Which buffered categories are released when the input view reopens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackfillMode {
    /// Release nothing; buffered lines stay until capacity eviction.
    Off,
    /// Release every buffered entry.
    #[default]
    All,
    /// Release command output only.
    Commands,
    /// Release chat only.
    Chat,
}

/// Rejection for an unrecognized settings token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeToken {
    pub token: String,
    pub expected: &'static str,
}

impl fmt::Display for UnknownModeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token '{}' (use {})", self.token, self.expected)
    }
}

impl std::error::Error for UnknownModeToken {}

impl DisplayMode {
    /// Whether a line of `category` should be suppressed (input view closed).
    pub fn suppresses(self, category: Category) -> bool {
        match self {
            Self::Disabled => false,
            Self::All => true,
            Self::Commands => category == Category::Command,
            Self::Chat => category == Category::Chat,
        }
    }

    /// Lowercase token used for persistence and status output.
    pub fn token(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::All => "all",
            Self::Commands => "commands",
            Self::Chat => "chat",
        }
    }

    /// Parse a user-supplied token. `game` is accepted as an alias for `chat`.
    pub fn parse_token(raw: &str) -> Result<Self, UnknownModeToken> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "disabled" | "false" | "off" => Ok(Self::Disabled),
            "all" | "true" => Ok(Self::All),
            "commands" => Ok(Self::Commands),
            "chat" | "game" => Ok(Self::Chat),
            _ => Err(UnknownModeToken {
                token: raw.to_string(),
                expected: "disabled, all, chat, commands",
            }),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disabled => "Disabled",
            Self::All => "All",
            Self::Commands => "Commands",
            Self::Chat => "Chat",
        };
        write!(f, "{label}")
    }
}

impl BackfillMode {
    /// Whether a buffered entry of `category` is released on drain.
    pub fn releases(self, category: Category) -> bool {
        match self {
            Self::Off => false,
            Self::All => true,
            Self::Commands => category == Category::Command,
            Self::Chat => category == Category::Chat,
        }
    }

    /// Lowercase token used for persistence and status output.
    pub fn token(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::Commands => "commands",
            Self::Chat => "chat",
        }
    }

    /// Parse a user-supplied token. `game` is accepted as an alias for `chat`.
    pub fn parse_token(raw: &str) -> Result<Self, UnknownModeToken> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "all" => Ok(Self::All),
            "commands" => Ok(Self::Commands),
            "chat" | "game" => Ok(Self::Chat),
            _ => Err(UnknownModeToken {
                token: raw.to_string(),
                expected: "off, all, commands, chat",
            }),
        }
    }
}

impl fmt::Display for BackfillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Off => "Off",
            Self::All => "All",
            Self::Commands => "Commands",
            Self::Chat => "Chat",
        };
        write!(f, "{label}")
    }
}
