//! Chat-stream minimizer core: classify lines as command output or chat,
//! suppress per the display mode, and backfill suppressed lines when the
//! input view reopens.

pub mod buffer;
pub mod classify;
pub mod config;
pub mod filter;
pub mod line;
pub mod mode;

pub use buffer::{BufferedEntry, SuppressionBuffer, BUFFER_CAPACITY, EVICTION_BATCH};
pub use classify::{classify, COMMAND_WINDOW_MS};
pub use config::{default_config_path, FilterSettings};
pub use filter::ChatFilter;
pub use line::{Category, DisplayAction, Line};
pub use mode::{BackfillMode, DisplayMode, UnknownModeToken};
