use regex::Regex;
use std::sync::LazyLock;

use super::layout::{LineRole, classify, split_comment};
use super::{FixPass, PassOutput, owned_lines};
use crate::text::{code_chars, find_top_level, first_group, indentation, is_string_literal, split_top_level};

/// How far back a `class` line may be for a bare `def f()` to count as a
/// method.
const CLASS_LOOKBACK: usize = 10;

/// How far back a loop header may be for `+=` on a string to count as
/// concatenation in a loop.
const LOOP_LOOKBACK: usize = 5;

static CONDITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:if|elif|while)\s+").expect("condition pattern"));

static EMPTY_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*(?:async\s+)?def\s+\w+\s*)\(\s*\)").expect("empty def pattern"));

static CLASS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*class\s+\w").expect("class pattern"));

static DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:async\s+)?def\s+\w+\s*\(").expect("def pattern"));

static EQ_NONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*==\s*None\b").expect("== None pattern"));

static NE_NONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*!=\s*None\b").expect("!= None pattern"));

static MUTABLE_DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[.*\]|\{.*\}|list\(\)|dict\(\)|set\(\))$").expect("mutable default pattern")
});

static STRING_APPEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z_][\w.]*\s*\+=\s*(.+)$").expect("string append pattern"));

static LOOP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:for|while)\s").expect("loop pattern"));

static OPEN_ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z_][\w.]*\s*=\s*open\(").expect("open pattern"));

/// `=` in conditions, missing `self`, `None` comparisons, plus advisories
/// that leave the text alone.
pub struct LogicFixes;

impl FixPass for LogicFixes {
    fn name(&self) -> &'static str {
        "logic"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut lines = owned_lines(text);
        let info = classify(&lines);
        let mut changes = Vec::new();

        for i in 0..lines.len() {
            if info[i].role != LineRole::Statement {
                continue;
            }
            let (code, tail) = split_comment(&lines[i]);
            let (mut code, tail) = (code.to_string(), tail.to_string());
            let line_no = i + 1;
            let mut found = Vec::new();

            if let Some(fixed) = fix_condition_assignment(&code) {
                code = fixed;
                found.push(format!("Fixed assignment in condition at line {line_no}"));
            }

            if let Some(receiver) = missing_receiver(&code, &lines[..i]) {
                code = EMPTY_DEF_RE.replace(&code, format!("${{1}}({receiver})")).into_owned();
                found.push(format!("Added missing {receiver} parameter at line {line_no}"));
            }

            if let Some(fixed) = replace_outside_strings(&code, &EQ_NONE_RE, " is None") {
                code = fixed;
                found.push(format!("Changed == None to is None at line {line_no}"));
            }
            if let Some(fixed) = replace_outside_strings(&code, &NE_NONE_RE, " is not None") {
                code = fixed;
                found.push(format!("Changed != None to is not None at line {line_no}"));
            }

            if has_mutable_default(&code) {
                found.push(format!(
                    "Warning: mutable default argument at line {line_no} - default to None and create the value inside the function"
                ));
            }
            if appends_string_in_loop(&code, &lines[..i]) {
                found.push(format!(
                    "Warning: string concatenation in loop at line {line_no} - consider collecting parts in a list and joining them"
                ));
            }
            if OPEN_ASSIGN_RE.is_match(&code) {
                found.push(format!(
                    "Suggestion: use 'with open(...)' at line {line_no} so the file is always closed"
                ));
            }

            if !found.is_empty() {
                lines[i] = format!("{code}{tail}");
                changes.extend(found);
            }
        }

        PassOutput {
            text: lines.join("\n"),
            changes,
        }
    }
}

/// Turn a lone `=` at the top level of an `if`/`elif`/`while` condition
/// into `==`.
fn fix_condition_assignment(code: &str) -> Option<String> {
    let head = CONDITION_RE.find(code)?.end();
    let rest = &code[head..];
    let end = match find_top_level(rest, ':') {
        Some(pos) if !rest[pos + 1..].starts_with('=') => pos,
        _ => rest.len(),
    };
    let condition = &rest[..end];

    let bytes = condition.as_bytes();
    let assignments: Vec<usize> = code_chars(condition)
        .filter(|c| c.ch == '=' && c.depth == 0)
        .map(|c| c.index)
        .filter(|&at| {
            let before = at.checked_sub(1).map(|p| bytes[p]);
            let after = bytes.get(at + 1).copied();
            !matches!(before, Some(b'=' | b'!' | b'<' | b'>' | b':')) && after != Some(b'=')
        })
        .collect();
    if assignments.is_empty() {
        return None;
    }

    let mut fixed = String::with_capacity(code.len() + assignments.len());
    fixed.push_str(&code[..head]);
    let mut at = 0;
    for pos in assignments {
        fixed.push_str(&condition[at..pos]);
        fixed.push_str("==");
        at = pos + 1;
    }
    fixed.push_str(&condition[at..]);
    fixed.push_str(&rest[end..]);
    Some(fixed)
}

/// `self` (or `cls` under `@classmethod`) for a zero-parameter `def` that
/// sits under a recent `class` line.
fn missing_receiver(code: &str, before: &[String]) -> Option<&'static str> {
    if !EMPTY_DEF_RE.is_match(code) {
        return None;
    }
    let column = indentation(code).len();

    let mut decorators = before
        .iter()
        .rev()
        .map(|l| l.trim())
        .take_while(|l| l.starts_with('@'));
    let receiver = match decorators.find(|d| matches!(*d, "@staticmethod" | "@classmethod")) {
        Some("@staticmethod") => return None,
        Some(_) => "cls",
        None => "self",
    };

    before
        .iter()
        .rev()
        .take(CLASS_LOOKBACK)
        .any(|l| CLASS_LINE_RE.is_match(l) && indentation(l).len() < column)
        .then_some(receiver)
}

fn replace_outside_strings(code: &str, re: &Regex, with: &str) -> Option<String> {
    let code_at: Vec<usize> = code_chars(code).map(|c| c.index).collect();
    let mut out = String::with_capacity(code.len());
    let mut at = 0;
    for m in re.find_iter(code) {
        if code_at.binary_search(&m.start()).is_err() {
            continue;
        }
        out.push_str(&code[at..m.start()]);
        out.push_str(with);
        at = m.end();
    }
    if at == 0 {
        return None;
    }
    out.push_str(&code[at..]);
    Some(out)
}

fn has_mutable_default(code: &str) -> bool {
    if !DEF_RE.is_match(code) {
        return false;
    }
    let Some(params) = first_group(code) else {
        return false;
    };
    split_top_level(params, ',').into_iter().any(|param| {
        find_top_level(param, '=')
            .map(|pos| param[pos + 1..].trim())
            .is_some_and(|default| MUTABLE_DEFAULT_RE.is_match(default))
    })
}

fn appends_string_in_loop(code: &str, before: &[String]) -> bool {
    let Some(caps) = STRING_APPEND_RE.captures(code) else {
        return false;
    };
    let value = caps[1].trim();
    let first = split_top_level(value, '+').into_iter().next().unwrap_or(value);
    if !is_string_literal(first) {
        return false;
    }
    let column = indentation(code).len();
    before
        .iter()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(LOOP_LOOKBACK)
        .any(|l| LOOP_RE.is_match(l) && indentation(l).len() < column)
}
