//! Slash-command surface for the filter settings, mirroring a
//! `/minimizechat` client command tree.

use chatmin::{BackfillMode, ChatFilter, DisplayMode};

/// What the main loop should do after dispatching a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandOutcome {
    /// Print this feedback to the user.
    Feedback(String),
    /// Input view transitioned closed→open; drain and display backfill.
    OpenView,
    /// Input view closed; suppression resumes.
    CloseView,
    /// Exit the host loop.
    Quit,
    /// Not a host command; treated as a command sent upstream. The timing
    /// anchor was already updated by the caller.
    Passthrough,
}

pub(crate) fn handle_command(filter: &ChatFilter, raw: &str) -> CommandOutcome {
    let mut tokens = raw.trim().split_whitespace();
    let head = tokens.next().unwrap_or("");
    match head {
        "/minimizechat" => handle_minimizechat(filter, tokens.next(), tokens.next()),
        "/open" => CommandOutcome::OpenView,
        "/close" => CommandOutcome::CloseView,
        "/status" => CommandOutcome::Feedback(format!(
            "{}\nBackfill: {}\nBuffered: {}",
            filter.describe_status(),
            filter.backfill_mode(),
            filter.buffered_len()
        )),
        "/quit" | "/exit" => CommandOutcome::Quit,
        _ => CommandOutcome::Passthrough,
    }
}

fn handle_minimizechat(
    filter: &ChatFilter,
    sub: Option<&str>,
    arg: Option<&str>,
) -> CommandOutcome {
    match sub {
        None => CommandOutcome::Feedback(filter.describe_status()),
        Some("false") => {
            filter.set_mode(DisplayMode::Disabled);
            CommandOutcome::Feedback("Chat minimizer: disabled".to_string())
        }
        Some("true") => match arg {
            None => set_and_report(filter, DisplayMode::All),
            Some(token) => match parse_enable_mode(token) {
                Some(mode) => set_and_report(filter, mode),
                None => CommandOutcome::Feedback(format!(
                    "Unknown mode: {token} (use all, chat, commands)"
                )),
            },
        },
        Some("backfill") => match arg {
            None => CommandOutcome::Feedback(format!("Backfill: {}", filter.backfill_mode())),
            Some(token) => match BackfillMode::parse_token(token) {
                Ok(backfill) => {
                    filter.set_backfill_mode(backfill);
                    CommandOutcome::Feedback(format!("Backfill: {backfill}"))
                }
                Err(_) => CommandOutcome::Feedback(format!(
                    "Unknown backfill target: {token} (use off, all, commands, chat)"
                )),
            },
        },
        Some(other) => CommandOutcome::Feedback(format!(
            "Unknown subcommand: {other} (use false, true [all|chat|commands], backfill [off|all|commands|chat])"
        )),
    }
}

fn set_and_report(filter: &ChatFilter, mode: DisplayMode) -> CommandOutcome {
    filter.set_mode(mode);
    CommandOutcome::Feedback(format!("Chat minimizer: enabled ({mode})"))
}

/// The `true <mode>` argument only accepts suppression targets; `disabled`
/// goes through the `false` literal instead.
fn parse_enable_mode(token: &str) -> Option<DisplayMode> {
    match DisplayMode::parse_token(token) {
        Ok(DisplayMode::Disabled) | Err(_) => None,
        Ok(mode) => Some(mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmin::FilterSettings;

    fn filter() -> ChatFilter {
        ChatFilter::new(FilterSettings::default())
    }

    fn feedback(outcome: CommandOutcome) -> String {
        match outcome {
            CommandOutcome::Feedback(text) => text,
            other => panic!("expected feedback, got {other:?}"),
        }
    }

    #[test]
    fn bare_minimizechat_reports_status() {
        let f = filter();
        assert_eq!(
            feedback(handle_command(&f, "/minimizechat")),
            "Chat minimizer: disabled"
        );
    }

    #[test]
    fn true_defaults_to_all() {
        let f = filter();
        assert_eq!(
            feedback(handle_command(&f, "/minimizechat true")),
            "Chat minimizer: enabled (All)"
        );
        assert_eq!(f.mode(), DisplayMode::All);
    }

    #[test]
    fn true_with_mode_and_game_alias() {
        let f = filter();
        feedback(handle_command(&f, "/minimizechat true commands"));
        assert_eq!(f.mode(), DisplayMode::Commands);
        feedback(handle_command(&f, "/minimizechat true game"));
        assert_eq!(f.mode(), DisplayMode::Chat);
    }

    #[test]
    fn false_disables() {
        let f = filter();
        f.set_mode(DisplayMode::All);
        assert_eq!(
            feedback(handle_command(&f, "/minimizechat false")),
            "Chat minimizer: disabled"
        );
        assert_eq!(f.mode(), DisplayMode::Disabled);
    }

    #[test]
    fn unknown_mode_is_rejected_without_mutation() {
        let f = filter();
        f.set_mode(DisplayMode::Commands);
        let text = feedback(handle_command(&f, "/minimizechat true loud"));
        assert_eq!(text, "Unknown mode: loud (use all, chat, commands)");
        assert_eq!(f.mode(), DisplayMode::Commands);
    }

    #[test]
    fn disabled_is_not_a_valid_enable_target() {
        let f = filter();
        let text = feedback(handle_command(&f, "/minimizechat true disabled"));
        assert!(text.starts_with("Unknown mode: disabled"));
    }

    #[test]
    fn backfill_query_and_set() {
        let f = filter();
        assert_eq!(
            feedback(handle_command(&f, "/minimizechat backfill")),
            "Backfill: All"
        );
        assert_eq!(
            feedback(handle_command(&f, "/minimizechat backfill off")),
            "Backfill: Off"
        );
        assert_eq!(f.backfill_mode(), BackfillMode::Off);
    }

    #[test]
    fn unknown_backfill_target_is_rejected_without_mutation() {
        let f = filter();
        let text = feedback(handle_command(&f, "/minimizechat backfill everything"));
        assert_eq!(
            text,
            "Unknown backfill target: everything (use off, all, commands, chat)"
        );
        assert_eq!(f.backfill_mode(), BackfillMode::All);
    }

    #[test]
    fn view_transitions_and_quit() {
        let f = filter();
        assert_eq!(handle_command(&f, "/open"), CommandOutcome::OpenView);
        assert_eq!(handle_command(&f, "/close"), CommandOutcome::CloseView);
        assert_eq!(handle_command(&f, "/quit"), CommandOutcome::Quit);
        assert_eq!(handle_command(&f, "/exit"), CommandOutcome::Quit);
    }

    #[test]
    fn foreign_slash_commands_pass_through() {
        let f = filter();
        assert_eq!(
            handle_command(&f, "/time set day"),
            CommandOutcome::Passthrough
        );
    }

    #[test]
    fn status_includes_backfill_and_buffer_depth() {
        let f = filter();
        let text = feedback(handle_command(&f, "/status"));
        assert!(text.contains("Chat minimizer: disabled"));
        assert!(text.contains("Backfill: All"));
        assert!(text.contains("Buffered: 0"));
    }
}
