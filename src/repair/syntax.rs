//! Block colons, legacy print statements and indentation.
//!
//! These three passes run together until the text stops changing. The
//! indentation rebuild is textual: it does not know real nesting and a
//! block keyword hidden in an odd place can throw it off.

use regex::Regex;
use std::sync::LazyLock;

use super::layout::{LineInfo, LineRole, classify, split_comment};
use super::{FixPass, PassOutput, owned_lines};
use crate::text::{code_chars, find_top_level, indentation};

const INDENT: &str = "    ";

static BLOCK_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:if|elif|else|for|while|def|class|try|except|finally|with|async\s+(?:def|for|with))\b")
        .expect("block keyword pattern")
});

static BARE_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*(?:async\s+)?def\s+\w+)\s*(:?)$").expect("bare def pattern"));

static PRINT_STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)print(?:\s+(.*))?$").expect("print pattern"));

static DEDENT_BEFORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:else|elif|except|finally)\b").expect("dedent pattern"));

static DEDENT_AFTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:return|break|continue|pass|raise)\b").expect("exit pattern"));

// ── Colons ──────────────────────────────────────────────

/// Appends `:` to block headers that lack one, and `()` to `def name`.
pub struct MissingColons;

impl FixPass for MissingColons {
    fn name(&self) -> &'static str {
        "missing_colons"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut lines = owned_lines(text);
        let info = classify(&lines);
        let mut changes = Vec::new();

        for (i, line) in lines.iter_mut().enumerate() {
            // multi-line headers are left to the author
            if info[i].role != LineRole::Statement || !info[i].ends_statement {
                continue;
            }
            let (code, tail) = split_comment(line);
            if !BLOCK_KEYWORD_RE.is_match(code.trim_start()) {
                continue;
            }

            let mut fixed = code.to_string();
            if let Some(caps) = BARE_DEF_RE.captures(code) {
                fixed = format!("{}(){}", &caps[1], &caps[2]);
                changes.push(format!("Added parentheses at line {}", i + 1));
            }
            if !has_header_colon(&fixed) {
                fixed.push(':');
                changes.push(format!("Added missing colon at line {}", i + 1));
            }
            if fixed != code {
                *line = format!("{fixed}{}", tail);
            }
        }

        PassOutput {
            text: lines.join("\n"),
            changes,
        }
    }
}

/// A `:` at bracket depth zero that is not part of `:=`.
fn has_header_colon(code: &str) -> bool {
    let Some(pos) = find_top_level(code, ':') else {
        return false;
    };
    !code[pos + 1..].starts_with('=')
}

// ── Print ───────────────────────────────────────────────

/// `print x, y` becomes `print(x, y)`.
pub struct LegacyPrint;

impl FixPass for LegacyPrint {
    fn name(&self) -> &'static str {
        "legacy_print"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut lines = owned_lines(text);
        let info = classify(&lines);
        let mut changes = Vec::new();

        for (i, line) in lines.iter_mut().enumerate() {
            if info[i].role != LineRole::Statement || !info[i].ends_statement {
                continue;
            }
            let (code, tail) = split_comment(line);
            if let Some(call) = print_call(code) {
                *line = format!("{call}{tail}");
                changes.push(format!("Converted print statement to print() call at line {}", i + 1));
            }
        }

        PassOutput {
            text: lines.join("\n"),
            changes,
        }
    }
}

fn print_call(code: &str) -> Option<String> {
    let caps = PRINT_STATEMENT_RE.captures(code)?;
    let indent = &caps[1];
    let Some(args) = caps.get(2).map(|m| m.as_str().trim()) else {
        // a bare `print` is a no-op expression in Python 3
        return Some(format!("{indent}print()"));
    };
    // already a call, an assignment to `print`, or a `>>` redirect
    if args.is_empty()
        || args.starts_with('(')
        || args.starts_with(">>")
        || (args.starts_with('=') && !args.starts_with("=="))
    {
        return None;
    }
    match args.strip_suffix(',') {
        Some(body) => Some(format!("{indent}print({}, end=\" \")", body.trim_end())),
        None => Some(format!("{indent}print({args})")),
    }
}

// ── Indentation ─────────────────────────────────────────

/// Rebuilds indentation from a single level counter, but only when the
/// existing indentation is visibly broken.
///
/// The level drops by one before `else`/`elif`/`except`/`finally` unless the
/// previous statement already left the block, rises by one after a
/// statement ending in `:`, and drops by one after
/// `return`/`break`/`continue`/`pass`/`raise`. Blank lines, comments and
/// the bodies of triple-quoted strings are left alone; continuation lines
/// move with the statement they belong to.
pub struct Reindent;

impl FixPass for Reindent {
    fn name(&self) -> &'static str {
        "reindent"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut lines = owned_lines(text);
        let info = classify(&lines);
        if !indentation_broken(&lines, &info) {
            return PassOutput::unchanged(text);
        }

        let mut changes = Vec::new();
        let mut level = 0usize;
        let mut shift: isize = 0;
        let mut head_exits = false;
        let mut exited = false;

        for (i, line) in lines.iter_mut().enumerate() {
            let rebuilt = match info[i].role {
                LineRole::Blank | LineRole::Comment | LineRole::StringBody => None,
                LineRole::Continuation => Some(shifted(line, shift)),
                LineRole::Statement => {
                    let stripped = line.trim_start();
                    if DEDENT_BEFORE_RE.is_match(stripped) && !exited {
                        level = level.saturating_sub(1);
                    }
                    head_exits = DEDENT_AFTER_RE.is_match(stripped);
                    let rebuilt = format!("{}{stripped}", INDENT.repeat(level));
                    shift = width(&rebuilt) as isize - width(line) as isize;
                    Some(rebuilt)
                }
            };

            if info[i].ends_statement {
                let (code, _) = split_comment(rebuilt.as_deref().unwrap_or(line.as_str()));
                exited = false;
                if code.ends_with(':') {
                    level += 1;
                } else if head_exits {
                    level = level.saturating_sub(1);
                    exited = true;
                }
                head_exits = false;
            }

            if let Some(rebuilt) = rebuilt {
                if rebuilt != *line {
                    *line = rebuilt;
                    changes.push(format!("Fixed indentation at line {}", i + 1));
                }
            }
        }

        PassOutput {
            text: lines.join("\n"),
            changes,
        }
    }
}

fn width(line: &str) -> usize {
    indentation(line).chars().count()
}

/// Indentation width with a tab counted as one level.
fn columns(line: &str) -> usize {
    indentation(line)
        .chars()
        .map(|c| if c == '\t' { INDENT.len() } else { 1 })
        .sum()
}

/// Move a continuation line by `shift` columns, never past column zero.
fn shifted(line: &str, shift: isize) -> String {
    if shift >= 0 {
        return format!("{}{line}", " ".repeat(shift as usize));
    }
    let drop = (-shift) as usize;
    let indent = indentation(line);
    let kept = indent.chars().count().saturating_sub(drop);
    format!("{}{}", " ".repeat(kept), line.trim_start())
}

/// True when a block header is not followed by a deeper line, a line is
/// deeper than its predecessor without a header, or a dedent lands on a
/// column no enclosing block uses.
pub fn indentation_broken(lines: &[String], info: &[LineInfo]) -> bool {
    let mut stack: Vec<usize> = Vec::new();
    let mut expect_block = false;

    for (i, line) in lines.iter().enumerate() {
        if info[i].role != LineRole::Statement {
            if info[i].ends_statement {
                expect_block = opens_block(line);
            }
            continue;
        }
        let column = columns(line);

        match stack.last().copied() {
            None => stack.push(column),
            Some(top) if expect_block => {
                if column <= top {
                    return true;
                }
                stack.push(column);
            }
            Some(top) if column > top => return true,
            Some(_) => {
                while stack.last().is_some_and(|&top| top > column) {
                    stack.pop();
                }
                if stack.last() != Some(&column) {
                    return true;
                }
            }
        }

        expect_block = info[i].ends_statement && opens_block(line);
    }
    false
}

fn opens_block(line: &str) -> bool {
    let (code, _) = split_comment(line);
    code.ends_with(':') && code_chars(code).last().is_some_and(|c| c.ch == ':' && c.depth == 0)
}
