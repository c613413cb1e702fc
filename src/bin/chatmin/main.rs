//! Interactive stdin host so the chat minimizer can be driven from a terminal
//! or a pipe.
//!
//! Plain lines are classified and either echoed or suppressed. Slash commands
//! drive the settings surface (`/minimizechat ...`), simulate the input-view
//! transition (`/open`, `/close`), and count as user-submitted commands for
//! the timing heuristic. Leading `!signed` / `!system` markers exercise the
//! signature and system-origin rules.

mod commands;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use tracing::debug;

use chatmin::{config, BackfillMode, ChatFilter, DisplayAction, DisplayMode, FilterSettings, Line};

use crate::commands::{handle_command, CommandOutcome};

/// Max pending stdin lines before backpressure on the reader thread.
const INPUT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Parser)]
#[command(name = "chatmin", about = "Chat stream minimizer", version)]
struct HostConfig {
    /// Startup display mode (disabled, all, commands, chat); persisted
    #[arg(long = "mode", value_parser = parse_display_mode)]
    mode: Option<DisplayMode>,

    /// Startup backfill policy (off, all, commands, chat); persisted
    #[arg(long = "backfill", value_parser = parse_backfill_mode)]
    backfill: Option<BackfillMode>,

    /// Config directory override (default: $CHATMIN_CONFIG_DIR or the platform config dir)
    #[arg(long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Run without persisting settings to disk
    #[arg(long = "no-persist", default_value_t = false)]
    no_persist: bool,

    /// Enable debug logging on stderr
    #[arg(long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn parse_display_mode(raw: &str) -> Result<DisplayMode, String> {
    DisplayMode::parse_token(raw).map_err(|err| err.to_string())
}

fn parse_backfill_mode(raw: &str) -> Result<BackfillMode, String> {
    BackfillMode::parse_token(raw).map_err(|err| err.to_string())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn build_filter(config: &HostConfig) -> Result<ChatFilter> {
    let filter = if config.no_persist {
        ChatFilter::new(FilterSettings::default())
    } else {
        let path = match &config.config_dir {
            Some(dir) => dir.join(config::CONFIG_FILE),
            None => config::default_config_path().context(
                "cannot resolve a config directory; pass --config-dir or set CHATMIN_CONFIG_DIR",
            )?,
        };
        ChatFilter::with_config_path(path)
    };
    if let Some(mode) = config.mode {
        filter.set_mode(mode);
    }
    if let Some(backfill) = config.backfill {
        filter.set_backfill_mode(backfill);
    }
    Ok(filter)
}

/// Strip leading `!signed` / `!system` markers (in either order) and build a
/// line stamped with the arrival time.
fn parse_marked_line(raw: &str, arrival_ms: i64) -> Line {
    let mut text = raw;
    let mut has_signature = false;
    let mut is_system_flagged = false;
    loop {
        let trimmed = text.trim_start();
        if let Some(rest) = trimmed.strip_prefix("!signed ") {
            has_signature = true;
            text = rest;
        } else if let Some(rest) = trimmed.strip_prefix("!system ") {
            is_system_flagged = true;
            text = rest;
        } else {
            text = trimmed;
            break;
        }
    }
    Line::new(text, has_signature, is_system_flagged, arrival_ms)
}

fn main() -> Result<()> {
    let config = HostConfig::parse();
    init_logging(config.verbose);
    let filter = build_filter(&config)?;
    debug!(status = %filter.describe_status(), "filter ready");

    let (line_tx, line_rx) = bounded::<String>(INPUT_CHANNEL_CAPACITY);
    // Detached reader: it parks on stdin and exits with the process.
    let _reader = thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    for raw in line_rx {
        let input = raw.trim();
        if input.starts_with('/') {
            filter.on_user_command_submitted(now_ms());
            match handle_command(&filter, input) {
                CommandOutcome::Feedback(text) => println!("{text}"),
                CommandOutcome::OpenView => {
                    for entry in filter.on_input_view_opened() {
                        println!("{}", entry.line.text);
                    }
                }
                CommandOutcome::CloseView => filter.on_input_view_closed(),
                CommandOutcome::Quit => break,
                CommandOutcome::Passthrough => {
                    debug!(command = input, "forwarded user command");
                }
            }
            continue;
        }

        match filter.on_incoming_line(parse_marked_line(&raw, now_ms())) {
            DisplayAction::ShowNow(line) => println!("{}", line.text),
            DisplayAction::Buffered => {}
        }
    }

    Ok(())
}
