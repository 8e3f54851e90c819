//! Unified text pipeline for placeholder expansion.
//!
//! This is the only place that processes:
//!
//! - `{i18n:key}` catalog lookups
//! - curly placeholders: `{remaining}`, `{days}`, ... (including parameter
//!   forms) and context variables supplied by the host
//! - `{animation:<id>}` frames defined in the configuration
//!
//! # Remaining format
//!
//! `{remaining:...}` supports a tokenized format where ONLY parts wrapped by
//! `%...%` are replaced:
//!
//! ```text
//! {remaining:%hh%:%mm%:%ss%}
//! {remaining:%d%Days %hh%:%mm%:%ss%}
//! ```
//!
//! Tokens: `%d%`/`%dd%`.. days, `%h%`/`%hh%`.. hours (total hours unless a
//! day token is used), `%m%` minutes, `%s%` seconds. A token may carry a
//! suffix that hides the whole token when the value is zero: `%d:Days %`.

use std::sync::Arc;

use crate::context::EvalContext;
use crate::i18n::Catalog;
use crate::settings::Settings;
use crate::time::format_hms;

/// Placeholder expansion engine over one settings snapshot.
///
/// Cheap to clone; the snapshot and catalog are shared.
#[derive(Debug, Clone)]
pub struct Engine {
    settings: Arc<Settings>,
    catalog: Arc<Catalog>,
}

impl Engine {
    /// Creates an engine over a settings snapshot and message catalog.
    pub fn new(settings: Arc<Settings>, catalog: Arc<Catalog>) -> Self {
        Self { settings, catalog }
    }

    /// The settings snapshot this engine reads from.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// The message catalog this engine reads from.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Applies all transformations: animations, i18n, core placeholders.
    ///
    /// Animations expand first so inserted frame text is further processed.
    /// Unknown tokens stay verbatim.
    pub fn apply(&self, input: &str, ctx: &EvalContext) -> String {
        let s = self.expand_animations(input, ctx);
        let s = self.replace_i18n(&s);
        self.replace_core(&s, ctx)
    }

    fn expand_animations(&self, input: &str, ctx: &EvalContext) -> String {
        scan_tokens(input, |key, arg| {
            if key != "animation" {
                return None;
            }
            let id = arg.unwrap_or("");
            if id.is_empty() {
                return Some(String::new());
            }
            let frame = self
                .settings
                .animation(id)
                .map(|anim| anim.frame_at(ctx.now().timestamp_millis()).to_string())
                .unwrap_or_default();
            Some(frame)
        })
    }

    /// Replaces `{i18n:key}` tokens; unknown keys become `{missing:key}`.
    pub fn replace_i18n(&self, input: &str) -> String {
        scan_tokens(input, |key, arg| {
            if key != "i18n" {
                return None;
            }
            let message_key = arg.unwrap_or("");
            Some(
                self.catalog
                    .get(message_key)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{{missing:{message_key}}}")),
            )
        })
    }

    fn replace_core(&self, input: &str, ctx: &EvalContext) -> String {
        scan_tokens(input, |key, arg| resolve(&key.to_ascii_lowercase(), arg, ctx))
    }
}

fn resolve(key: &str, arg: Option<&str>, ctx: &EvalContext) -> Option<String> {
    match key {
        "id" => Some(ctx.id().to_string()),
        "description" => Some(ctx.description().to_string()),
        "target" => Some(ctx.target_text().to_string()),
        "total_seconds" => Some(ctx.remaining_secs().to_string()),

        "days" => Some(format_unit(ctx.days(), arg, 'd')),
        "hours" => Some(format_unit(ctx.hours_part(), arg, 'h')),
        "minutes" => Some(format_unit(ctx.minutes_part(), arg, 'm')),
        "seconds" => Some(format_unit(ctx.seconds_part(), arg, 's')),

        "remaining" => Some(format_remaining(ctx, arg)),

        // handled in their own passes
        "i18n" | "animation" => None,

        _ => ctx.var(key).map(str::to_string),
    }
}

/// Formats unit placeholders like `{hours}`, `{hours:hh}`, `{hours:Hours}`,
/// `{hours:hh:Hours}`. A non-empty suffix hides the token when the value is
/// zero.
fn format_unit(value: i64, arg: Option<&str>, unit_letter: char) -> String {
    let ua = UnitArg::parse(arg, unit_letter);
    if !ua.suffix.is_empty() && value <= 0 {
        return String::new();
    }
    let mut out = pad_number(value, ua.width);
    out.push_str(&ua.suffix);
    out
}

fn format_remaining(ctx: &EvalContext, format: Option<&str>) -> String {
    let secs = ctx.remaining_secs();
    let Some(fmt) = format.filter(|f| !f.trim().is_empty()) else {
        return format_hms(secs);
    };

    let rf = RemainingFormat::parse(fmt);
    let mut out = String::new();
    for piece in &rf.pieces {
        match piece {
            Piece::Literal(s) => out.push_str(s),
            Piece::Unit {
                unit,
                width,
                suffix,
                hide_when_zero,
            } => {
                let value = match *unit {
                    'd' => ctx.days(),
                    'h' => {
                        if rf.uses_days {
                            ctx.hours_part()
                        } else {
                            ctx.total_hours()
                        }
                    }
                    'm' => {
                        if rf.uses_days || rf.uses_hours {
                            ctx.minutes_part()
                        } else {
                            ctx.total_minutes()
                        }
                    }
                    's' => {
                        if rf.uses_days || rf.uses_hours || rf.uses_minutes {
                            ctx.seconds_part()
                        } else {
                            ctx.remaining_secs()
                        }
                    }
                    _ => continue,
                };
                if *hide_when_zero && value <= 0 {
                    continue;
                }
                out.push_str(&pad_number(value, *width));
                out.push_str(suffix);
            }
        }
    }
    out.trim().to_string()
}

fn pad_number(value: i64, width: usize) -> String {
    let s = value.to_string();
    if width <= 1 || s.len() >= width {
        return s;
    }
    let mut out = "0".repeat(width - s.len());
    out.push_str(&s);
    out
}

/// Parsed argument for unit placeholders: an optional zero-pad width token
/// (`hh` etc.) and an optional suffix.
struct UnitArg {
    width: usize,
    suffix: String,
}

impl UnitArg {
    fn parse(arg: Option<&str>, unit_letter: char) -> Self {
        let Some(a) = arg.filter(|a| !a.is_empty()) else {
            return Self {
                width: 0,
                suffix: String::new(),
            };
        };

        if let Some((left, suffix)) = a.split_once(':') {
            return match parse_width_token(left, unit_letter) {
                Some(width) => Self {
                    width,
                    suffix: suffix.to_string(),
                },
                None => Self {
                    width: 0,
                    suffix: a.to_string(),
                },
            };
        }

        // no ":": either a width token ("hh") or a bare suffix ({days: 天})
        match parse_width_token(a, unit_letter) {
            Some(width) => Self {
                width,
                suffix: String::new(),
            },
            None => Self {
                width: 0,
                suffix: a.to_string(),
            },
        }
    }
}

fn parse_width_token(s: &str, unit_letter: char) -> Option<usize> {
    if s.is_empty() {
        return Some(0);
    }
    let unit = unit_letter.to_ascii_lowercase();
    s.chars()
        .all(|c| c.to_ascii_lowercase() == unit)
        .then_some(s.len())
}

enum Piece {
    Literal(String),
    Unit {
        unit: char,
        width: usize,
        suffix: String,
        hide_when_zero: bool,
    },
}

/// Parsed remaining format where tokens are wrapped by `%...%`.
struct RemainingFormat {
    pieces: Vec<Piece>,
    uses_days: bool,
    uses_hours: bool,
    uses_minutes: bool,
}

impl RemainingFormat {
    fn parse(fmt: &str) -> Self {
        let mut pieces = Vec::new();
        let mut uses_days = false;
        let mut uses_hours = false;
        let mut uses_minutes = false;

        let bytes = fmt.as_bytes();
        let mut i = 0;
        let mut literal_start = 0;

        while i < bytes.len() {
            if bytes[i] != b'%' {
                i += 1;
                continue;
            }

            if i > literal_start {
                pieces.push(Piece::Literal(fmt[literal_start..i].to_string()));
            }

            let Some(end) = fmt[i + 1..].find('%').map(|p| i + 1 + p) else {
                // unterminated token: keep the tail literally
                pieces.push(Piece::Literal(fmt[i..].to_string()));
                return Self {
                    pieces,
                    uses_days,
                    uses_hours,
                    uses_minutes,
                };
            };

            let piece = Self::parse_token(&fmt[i + 1..end]);
            if let Piece::Unit { unit, .. } = &piece {
                match *unit {
                    'd' => uses_days = true,
                    'h' => uses_hours = true,
                    'm' => uses_minutes = true,
                    _ => {}
                }
            }
            pieces.push(piece);

            i = end + 1;
            literal_start = i;
        }

        if literal_start < fmt.len() {
            pieces.push(Piece::Literal(fmt[literal_start..].to_string()));
        }

        Self {
            pieces,
            uses_days,
            uses_hours,
            uses_minutes,
        }
    }

    fn parse_token(token: &str) -> Piece {
        if token.is_empty() {
            return Piece::Literal("%%".to_string());
        }

        let (left, suffix) = match token.split_once(':') {
            Some((l, s)) => (l, s),
            None => (token, ""),
        };
        if left.is_empty() {
            return Piece::Literal(format!("%{token}%"));
        }

        let unit = left
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('\0');
        if !matches!(unit, 'd' | 'h' | 'm' | 's')
            || !left.chars().all(|c| c.to_ascii_lowercase() == unit)
        {
            return Piece::Literal(format!("%{token}%"));
        }

        Piece::Unit {
            unit,
            width: left.len(),
            suffix: suffix.to_string(),
            hide_when_zero: !suffix.is_empty(),
        }
    }
}

/// Collects the names of every token in `input`, in order of appearance.
pub(crate) fn token_names(input: &str) -> Vec<String> {
    let mut names = Vec::new();
    scan_tokens(input, |name, _arg| {
        names.push(name.to_string());
        None
    });
    names
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'-')
}

/// Scans `{name}` / `{name:arg}` tokens, replacing each one with the
/// callback's result. A `None` result keeps the token verbatim; text that
/// does not form a token is copied through.
fn scan_tokens(input: &str, mut replace: impl FnMut(&str, Option<&str>) -> Option<String>) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            // copy a run of non-brace bytes at once
            let start = i;
            while i < bytes.len() && bytes[i] != b'{' {
                i += 1;
            }
            out.push_str(&input[start..i]);
            continue;
        }

        // parse a candidate token starting at i
        let mut j = i + 1;
        while j < bytes.len() && is_name_char(bytes[j]) {
            j += 1;
        }
        if j == i + 1 {
            out.push('{');
            i += 1;
            continue;
        }
        let name = &input[i + 1..j];

        let (arg, close) = if j < bytes.len() && bytes[j] == b'}' {
            (None, j)
        } else if j < bytes.len() && bytes[j] == b':' {
            match input[j + 1..].find('}').map(|p| j + 1 + p) {
                Some(close) => (Some(&input[j + 1..close]), close),
                None => {
                    out.push('{');
                    i += 1;
                    continue;
                }
            }
        } else {
            out.push('{');
            i += 1;
            continue;
        };

        match replace(name, arg) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&input[i..=close]),
        }
        i = close + 1;
    }

    out
}
