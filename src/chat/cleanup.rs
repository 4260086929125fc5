//! Cleanup of raw model output before it is shown
//!
//! Models tend to answer in markdown even when the surface renders plain
//! text. [`clean`] strips emphasis markers and code fences, canonicalizes
//! bullets to `•` and normalizes whitespace. The rules run in a fixed order:
//!
//! 1. runs of three or more `*` are removed
//! 2. remaining `**` are removed
//! 3. `*` anchored at a line edge are removed when detached from the text or
//!    left without a partner on the same line
//! 4. a leading `-`, `•` or `*` bullet becomes `• `
//! 5. three or more newlines collapse to two
//! 6. runs of spaces and tabs collapse to one space
//! 7. code fences (with optional language tag) and inline backticks are stripped
//! 8. `**bold**` and `*italic*` wrappers are unwrapped
//! 9. leading and trailing whitespace is trimmed
//!
//! The pass is repeated until the text no longer changes, so the result is a
//! fixed point and `clean(clean(s)) == clean(s)`.

use std::sync::LazyLock;

use regex::Regex;

static TRIPLE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{3,}").expect("valid regex"));

static DOUBLE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*").expect("valid regex"));

/// A line holding nothing but markers
static LONE_MARKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*+[ \t]*$").expect("valid regex"));

/// Markers at the end of a line, separated from the text before them
static TRAILING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+\*+[ \t]*$").expect("valid regex"));

static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-•*][ \t]+").expect("valid regex"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\w*\n?").expect("valid regex"));

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));

static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*\s\n](?:[^*\n]*[^*\s\n])?)\*\*").expect("valid regex")
});

static ITALIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^*\s\n](?:[^*\n]*[^*\s\n])?)\*").expect("valid regex")
});

/// Clean a raw model response for display
#[must_use]
pub fn clean(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = clean_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// One ordered application of every rule
fn clean_pass(text: &str) -> String {
    let text = strip_marker_runs(text);
    let text = strip_anchored_markers(&text);
    let text = LEADING_BULLET.replace_all(&text, "• ");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = strip_code(&text);
    let text = unwrap_emphasis(&text);
    text.trim().to_string()
}

fn strip_marker_runs(text: &str) -> String {
    let text = TRIPLE_MARKERS.replace_all(text, "");
    DOUBLE_MARKERS.replace_all(&text, "").into_owned()
}

fn strip_anchored_markers(text: &str) -> String {
    let text = LONE_MARKER_LINE.replace_all(text, "");
    let text = TRAILING_MARKERS.replace_all(&text, "");
    text.split('\n')
        .map(strip_unpaired_edge_marker)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop a `*` glued to the first or last word of a line when it is the only
/// marker on that line. `* ` bullets and `*x*` pairs are left alone.
fn strip_unpaired_edge_marker(line: &str) -> String {
    if line.matches('*').count() != 1 {
        return line.to_string();
    }

    let body = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - body.len()];
    if let Some(rest) = body.strip_prefix('*')
        && rest.starts_with(|c: char| !c.is_whitespace())
    {
        return format!("{indent}{rest}");
    }

    let body = line.trim_end_matches([' ', '\t']);
    if let Some(rest) = body.strip_suffix('*')
        && rest.ends_with(|c: char| !c.is_whitespace())
    {
        return format!("{rest}{}", &line[body.len()..]);
    }

    line.to_string()
}

fn strip_code(text: &str) -> String {
    let text = CODE_FENCE.replace_all(text, "");
    INLINE_CODE.replace_all(&text, "$1").into_owned()
}

fn unwrap_emphasis(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    ITALIC.replace_all(&text, "$1").into_owned()
}
