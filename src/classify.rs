//! Ordered decision-list classifier that tags stream lines as command output or chat.
//!
//! Rules are evaluated strictly in order and the first match wins, so the
//! precedence between the signature override, content heuristics, and the
//! recent-command timing window stays visible and testable rule by rule.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::line::Category;

/// Upper bound of the "just ran a command" window in milliseconds, inclusive.
pub const COMMAND_WINDOW_MS: i64 = 4_000;

/// Bracketed tags denoting non-chat origin, e.g. `[Server]` or `[CB]`.
const COMMAND_TAGS: &[&str] = &[
    "@",
    "server",
    "console",
    "rcon",
    "command",
    "command block",
    "commandblock",
    "cb",
    "system",
    "ops",
    "admin",
];

/// Game broadcast substrings that are chat even inside the command window.
const BROADCAST_PATTERNS: &[&str] = &[
    "joined the game",
    "left the game",
    "advancement",
    "made the advancement",
    "has completed the challenge",
    "was slain by",
    "was shot by",
    "fell from a high place",
    "tried to swim in lava",
    "drowned",
    "was pricked to death",
    "burned to death",
    "blew up",
    "was blown up",
];

/// Leading verb phrases typical of command feedback on servers without tags.
const COMMAND_RESULT_PREFIXES: &[&str] = &[
    "set ",
    "gave ",
    "summoned ",
    "teleported ",
    "filled ",
    "cleared ",
    "replaced ",
    "toggled ",
    "saved the game",
    "set the time",
    "set time ",
];

/// Names that look like player names but are never treated as one.
const RESERVED_NAMES: &[&str] = &["server", "console", "rcon", "system", "admin", "cb"];

/// Normalized classifier input: `text` is pre-trimmed and lower-cased.
pub(crate) struct RuleInput<'a> {
    pub(crate) text: &'a str,
    pub(crate) has_signature: bool,
    pub(crate) is_system_flagged: bool,
    pub(crate) since_last_command_ms: i64,
}

struct Rule {
    name: &'static str,
    verdict: Category,
    applies: fn(&RuleInput<'_>) -> bool,
}

/// The decision list. Order is load-bearing: broadcast detection must beat
/// the timing window, and the timing window must beat the chat-shape rules.
const RULES: &[Rule] = &[
    Rule {
        name: "signed",
        verdict: Category::Chat,
        applies: |input| input.has_signature,
    },
    Rule {
        name: "system-flagged",
        verdict: Category::Command,
        applies: |input| input.is_system_flagged,
    },
    Rule {
        name: "command-tag",
        verdict: Category::Command,
        applies: |input| looks_like_command_tag(input.text),
    },
    Rule {
        name: "game-broadcast",
        verdict: Category::Chat,
        applies: |input| is_game_broadcast(input.text),
    },
    Rule {
        name: "command-window",
        verdict: Category::Command,
        applies: |input| within_command_window(input.since_last_command_ms),
    },
    Rule {
        name: "angle-name",
        verdict: Category::Chat,
        applies: |input| has_angle_name_prefix(input.text),
    },
    Rule {
        name: "name-colon",
        verdict: Category::Chat,
        applies: |input| has_name_colon_prefix(input.text),
    },
    Rule {
        name: "result-phrase",
        verdict: Category::Command,
        applies: |input| starts_with_result_phrase(input.text),
    },
    Rule {
        name: "default",
        verdict: Category::Command,
        applies: |_| true,
    },
];

/// Classify one stream line. Pure and deterministic; `since_last_command_ms`
/// is the only timing context and is supplied by the caller.
pub fn classify(
    text: &str,
    has_signature: bool,
    is_system_flagged: bool,
    since_last_command_ms: i64,
) -> Category {
    let normalized = text.trim().to_lowercase();
    let input = RuleInput {
        text: &normalized,
        has_signature,
        is_system_flagged,
        since_last_command_ms,
    };
    classify_normalized(&input)
}

pub(crate) fn classify_normalized(input: &RuleInput<'_>) -> Category {
    for rule in RULES {
        if (rule.applies)(input) {
            trace!(rule = rule.name, verdict = %rule.verdict, "classified line");
            return rule.verdict;
        }
    }
    // The trailing catch-all rule always fires.
    Category::Command
}

/// Tags like `[Server]`, `[Command Block]`, `[@]`, or a bare `@` prefix.
fn looks_like_command_tag(text: &str) -> bool {
    if text.contains("[@]") || text.starts_with('@') {
        return true;
    }
    if !text.starts_with('[') {
        return false;
    }
    let Some(end) = text.find(']') else {
        return false;
    };
    if end <= 1 || end > 24 {
        return false;
    }
    let tag = text[1..end].trim();
    COMMAND_TAGS.contains(&tag)
}

/// Join/leave notices, advancement notices, and known death messages.
fn is_game_broadcast(text: &str) -> bool {
    BROADCAST_PATTERNS
        .iter()
        .any(|pattern| text.contains(pattern))
}

/// Inside `[0, COMMAND_WINDOW_MS]` after the local user submitted a command.
/// Negative elapsed values (clock skew) never match.
fn within_command_window(since_last_command_ms: i64) -> bool {
    (0..=COMMAND_WINDOW_MS).contains(&since_last_command_ms)
}

/// `<Name> hello` with a plausible name length before the closing bracket.
fn has_angle_name_prefix(text: &str) -> bool {
    if !text.starts_with('<') {
        return false;
    }
    matches!(text.find('>'), Some(offset) if (3..=20).contains(&offset))
}

/// `name: hello` where the prefix is a plausible, non-reserved player name.
fn has_name_colon_prefix(text: &str) -> bool {
    let Some(colon) = text.find(':') else {
        return false;
    };
    if !(3..=20).contains(&colon) {
        return false;
    }
    let name = text[..colon].trim();
    name_token_regex().is_match(name) && !RESERVED_NAMES.contains(&name)
}

fn starts_with_result_phrase(text: &str) -> bool {
    COMMAND_RESULT_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

fn name_token_regex() -> &'static Regex {
    static NAME_TOKEN: OnceLock<Regex> = OnceLock::new();
    NAME_TOKEN.get_or_init(|| Regex::new("^[a-z0-9_]{3,16}$").expect("name token regex"))
}
