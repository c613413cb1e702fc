//! Filter engine wiring the classifier, mode settings, and suppression buffer.
//!
//! One producer thread may feed lines while another drives input-view
//! transitions. The buffer sits behind a single coarse mutex so a line is
//! never both in flight and eligible for drain, and the last-command
//! timestamp is an atomic so classification never takes a lock. Settings
//! persistence is the only blocking I/O and it only runs on the mutation
//! path.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::buffer::{BufferedEntry, SuppressionBuffer};
use crate::classify::classify;
use crate::config::{load_settings, save_settings, FilterSettings};
use crate::line::{DisplayAction, Line};
use crate::mode::{BackfillMode, DisplayMode};

/// Sentinel for "no user command observed yet".
const NEVER: i64 = i64::MIN;

/// Stream-line filter with suppression, backfill, and persisted settings.
pub struct ChatFilter {
    settings: Mutex<FilterSettings>,
    buffer: Mutex<SuppressionBuffer>,
    last_command_ms: AtomicI64,
    input_view_open: AtomicBool,
    config_path: Option<PathBuf>,
}

impl ChatFilter {
    /// In-memory filter; the host owns the settings lifecycle.
    pub fn new(settings: FilterSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            buffer: Mutex::new(SuppressionBuffer::new()),
            last_command_ms: AtomicI64::new(NEVER),
            input_view_open: AtomicBool::new(false),
            config_path: None,
        }
    }

    /// Load persisted settings from `path` and write back on every mutation.
    /// Saves once up front so the file exists from first launch.
    pub fn with_config_path(path: PathBuf) -> Self {
        let settings = load_settings(&path);
        save_settings(&path, &settings);
        let mut filter = Self::new(settings);
        filter.config_path = Some(path);
        filter
    }

    /// Classify an incoming line and decide display-vs-buffer.
    pub fn on_incoming_line(&self, line: Line) -> DisplayAction {
        let since_last_command_ms = self.elapsed_since_last_command(line.arrival_ms);
        let category = classify(
            &line.text,
            line.has_signature,
            line.is_system_flagged,
            since_last_command_ms,
        );

        // Active viewing disables suppression entirely.
        if self.input_view_open.load(Ordering::Acquire) {
            return DisplayAction::ShowNow(line);
        }

        let mode = self.lock_settings().mode;
        if mode.suppresses(category) {
            debug!(category = %category, %mode, "suppressing line");
            self.lock_buffer().push(line, category);
            DisplayAction::Buffered
        } else {
            DisplayAction::ShowNow(line)
        }
    }

    /// Input view transitioned closed→open: drain per the backfill policy.
    /// The caller must display every returned entry exactly once, in order.
    pub fn on_input_view_opened(&self) -> Vec<BufferedEntry> {
        self.input_view_open.store(true, Ordering::Release);
        let backfill = self.lock_settings().backfill;
        let released = self.lock_buffer().drain(backfill);
        if !released.is_empty() {
            debug!(count = released.len(), %backfill, "backfilled buffered lines");
        }
        released
    }

    /// Input view closed again; suppression resumes.
    pub fn on_input_view_closed(&self) {
        self.input_view_open.store(false, Ordering::Release);
    }

    /// Record a user-submitted command as the timing anchor. Forward-only:
    /// a stale submission time never rewinds the anchor.
    pub fn on_user_command_submitted(&self, time_ms: i64) {
        self.last_command_ms.fetch_max(time_ms, Ordering::AcqRel);
    }

    pub fn mode(&self) -> DisplayMode {
        self.lock_settings().mode
    }

    /// Set the display mode; persists before returning.
    pub fn set_mode(&self, mode: DisplayMode) {
        let snapshot = {
            let mut settings = self.lock_settings();
            settings.mode = mode;
            *settings
        };
        self.persist(&snapshot);
    }

    pub fn backfill_mode(&self) -> BackfillMode {
        self.lock_settings().backfill
    }

    /// Set the backfill policy; persists before returning.
    pub fn set_backfill_mode(&self, backfill: BackfillMode) {
        let snapshot = {
            let mut settings = self.lock_settings();
            settings.backfill = backfill;
            *settings
        };
        self.persist(&snapshot);
    }

    /// One-line status summary for a command surface.
    pub fn describe_status(&self) -> String {
        match self.mode() {
            DisplayMode::Disabled => "Chat minimizer: disabled".to_string(),
            mode => format!("Chat minimizer: enabled ({mode})"),
        }
    }

    /// Number of currently suppressed lines.
    pub fn buffered_len(&self) -> usize {
        self.lock_buffer().len()
    }

    fn elapsed_since_last_command(&self, arrival_ms: i64) -> i64 {
        let last = self.last_command_ms.load(Ordering::Acquire);
        if last == NEVER {
            // Never matches the command window.
            i64::MAX
        } else {
            arrival_ms.saturating_sub(last)
        }
    }

    fn persist(&self, settings: &FilterSettings) {
        if let Some(path) = &self.config_path {
            save_settings(path, settings);
        }
    }

    fn lock_settings(&self) -> std::sync::MutexGuard<'_, FilterSettings> {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_buffer(&self) -> std::sync::MutexGuard<'_, SuppressionBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Category;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn filter_with(mode: DisplayMode, backfill: BackfillMode) -> ChatFilter {
        ChatFilter::new(FilterSettings { mode, backfill })
    }

    fn plain(text: &str, arrival_ms: i64) -> Line {
        Line::new(text, false, false, arrival_ms)
    }

    #[test]
    fn disabled_mode_shows_everything() {
        let filter = filter_with(DisplayMode::Disabled, BackfillMode::All);
        let action = filter.on_incoming_line(plain("Gave 1 diamond to Steve", 0));
        assert!(matches!(action, DisplayAction::ShowNow(_)));
        assert_eq!(filter.buffered_len(), 0);
    }

    #[test]
    fn commands_mode_buffers_command_shows_chat() {
        let filter = filter_with(DisplayMode::Commands, BackfillMode::All);

        let action = filter.on_incoming_line(plain("Gave 1 diamond to Steve", 0));
        assert_eq!(action, DisplayAction::Buffered);

        let action = filter.on_incoming_line(plain("<Steve> hello", 0));
        assert!(matches!(action, DisplayAction::ShowNow(_)));
        assert_eq!(filter.buffered_len(), 1);
    }

    #[test]
    fn open_input_view_bypasses_suppression() {
        let filter = filter_with(DisplayMode::Commands, BackfillMode::All);
        filter.on_input_view_opened();

        let action = filter.on_incoming_line(plain("Gave 1 diamond to Steve", 0));
        assert!(matches!(action, DisplayAction::ShowNow(_)));
        assert_eq!(filter.buffered_len(), 0);

        filter.on_input_view_closed();
        let action = filter.on_incoming_line(plain("Gave 1 diamond to Steve", 0));
        assert_eq!(action, DisplayAction::Buffered);
    }

    #[test]
    fn open_drains_per_backfill_policy() {
        let filter = filter_with(DisplayMode::All, BackfillMode::Commands);
        filter.on_incoming_line(plain("Gave 1 diamond to Steve", 0));
        filter.on_incoming_line(plain("<Steve> hello", 0));
        assert_eq!(filter.buffered_len(), 2);

        let released = filter.on_input_view_opened();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].category, Category::Command);
        assert_eq!(filter.buffered_len(), 1);

        // Policy change then the complementary drain releases the rest.
        filter.on_input_view_closed();
        filter.set_backfill_mode(BackfillMode::Chat);
        let released = filter.on_input_view_opened();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].category, Category::Chat);
        assert_eq!(filter.buffered_len(), 0);
    }

    #[test]
    fn backfill_off_retains_buffer_across_opens() {
        let filter = filter_with(DisplayMode::All, BackfillMode::Off);
        filter.on_incoming_line(plain("anything", 0));

        assert!(filter.on_input_view_opened().is_empty());
        filter.on_input_view_closed();
        assert!(filter.on_input_view_opened().is_empty());
        assert_eq!(filter.buffered_len(), 1);
    }

    #[test]
    fn command_window_uses_submitted_timestamp() {
        let filter = filter_with(DisplayMode::Commands, BackfillMode::All);

        // Chat-shaped line with no command history: displayed.
        let action = filter.on_incoming_line(plain("steve: hello", 1_000_000));
        assert!(matches!(action, DisplayAction::ShowNow(_)));

        // Same shape within 4s of a submitted command: command output.
        filter.on_user_command_submitted(1_000_000);
        let action = filter.on_incoming_line(plain("steve: hello", 1_002_000));
        assert_eq!(action, DisplayAction::Buffered);

        // And outside the window again: chat.
        let action = filter.on_incoming_line(plain("steve: hello", 1_005_000));
        assert!(matches!(action, DisplayAction::ShowNow(_)));
    }

    #[test]
    fn command_timestamp_never_rewinds() {
        let filter = filter_with(DisplayMode::Commands, BackfillMode::All);
        filter.on_user_command_submitted(2_000_000);
        filter.on_user_command_submitted(1_000_000);

        // Still anchored at 2_000_000: a line at 2_002_000 is in-window.
        let action = filter.on_incoming_line(plain("steve: hello", 2_002_000));
        assert_eq!(action, DisplayAction::Buffered);
    }

    #[test]
    fn signed_line_survives_all_suppression_of_commands() {
        let filter = filter_with(DisplayMode::Commands, BackfillMode::All);
        let line = Line::new("[Server] signed anyway", true, false, 0);
        let action = filter.on_incoming_line(line);
        // Signature forces chat; Commands mode does not suppress chat.
        assert!(matches!(action, DisplayAction::ShowNow(_)));
    }

    #[test]
    fn status_line_matches_mode() {
        let filter = filter_with(DisplayMode::Disabled, BackfillMode::All);
        assert_eq!(filter.describe_status(), "Chat minimizer: disabled");
        filter.set_mode(DisplayMode::Commands);
        assert_eq!(filter.describe_status(), "Chat minimizer: enabled (Commands)");
    }

    #[test]
    fn setters_write_through_to_disk() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("chatmin-filter-{}-{nanos}", std::process::id()));
        let path = dir.join("config.json");

        let filter = ChatFilter::with_config_path(path.clone());
        assert!(path.exists(), "initial save should create the file");

        filter.set_mode(DisplayMode::Chat);
        filter.set_backfill_mode(BackfillMode::Off);

        let reloaded = load_settings(&path);
        assert_eq!(reloaded.mode, DisplayMode::Chat);
        assert_eq!(reloaded.backfill, BackfillMode::Off);

        let _ = std::fs::remove_dir_all(dir);
    }
}
