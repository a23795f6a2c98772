//! Rewrites for mistakes that parse fine but fail or misbehave when run.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use super::layout::{LineInfo, LineRole, classify, split_comment};
use super::{FixPass, PassOutput, owned_lines};
use crate::knowledge::{is_arithmetic_name, is_counter_name, is_mapping_name};
use crate::text::{code_chars, find_top_level, first_group, is_string_literal, matching_close, split_top_level};

/// How many following lines are searched for arithmetic use of an input.
const INPUT_LOOKAHEAD: usize = 5;

static TIME_CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btime\.clock\(\)").expect("time.clock pattern"));

static PRINT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bprint\(").expect("print pattern"));

static BARE_OPERAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z_][\w.]*|\d+(?:\.\d+)?)$").expect("operand pattern"));

static INPUT_ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*=\s*input\(").expect("input pattern"));

static ASSIGN_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_]\w*)\s*(?:\*\*|//|[-+*/%@&|^])?=(?:[^=]|$)").expect("assignment target pattern")
});

static RANGE_OVERFLOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\brange\(\s*len\(([^()]*)\)\s*\+\s*1\s*\)").expect("range pattern")
});

static KEY_READ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b([A-Za-z_]\w*)\[\s*("[^"\\]*"|'[^'\\]*')\s*\]"#).expect("key read pattern")
});

static STRING_INCREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*)([A-Za-z_][\w.]*)\s*\+=\s*(?:"(\d+)"|'(\d+)')$"#).expect("increment pattern")
});

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)class\s+([A-Za-z_]\w*)").expect("class pattern"));

static INIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*def\s+__init__\s*\(").expect("init pattern"));

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Za-z_]\w*)\(").expect("call pattern"));

static DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:class|def|async\s+def)\s").expect("definition pattern"));

/// A text replacement inside one line's code.
struct Edit {
    start: usize,
    end: usize,
    with: String,
}

fn apply_edits(code: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| e.start);
    let mut out = String::with_capacity(code.len() + 16);
    let mut at = 0;
    for edit in edits {
        if edit.start < at {
            continue;
        }
        out.push_str(&code[at..edit.start]);
        out.push_str(&edit.with);
        at = edit.end;
    }
    out.push_str(&code[at..]);
    out
}

/// Deprecated timing, missing conversions, off-by-one ranges, unguarded key
/// reads, string increments and short constructor calls.
pub struct RuntimePitfalls;

impl FixPass for RuntimePitfalls {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut lines = owned_lines(text);
        let info = classify(&lines);
        let arities = constructor_arities(&lines, &info);
        let mut changes = Vec::new();
        // Names currently holding the raw string returned by input().
        let mut text_inputs: HashSet<String> = HashSet::new();

        for i in 0..lines.len() {
            if info[i].role != LineRole::Statement {
                continue;
            }
            let (code, tail) = split_comment(&lines[i]);
            let (mut code, tail) = (code.to_string(), tail.to_string());
            let line_no = i + 1;
            let mut found = Vec::new();

            if TIME_CLOCK_RE.is_match(&code) {
                code = TIME_CLOCK_RE.replace_all(&code, "time.time()").into_owned();
                found.push(format!("Replaced deprecated time.clock() with time.time() at line {line_no}"));
            }

            if let Some(fixed) = convert_print_operands(&code, &text_inputs) {
                code = fixed;
                found.push(format!("Added str() conversion at line {line_no}"));
            }

            if let Some(fixed) = wrap_numeric_input(&code, &lines, &info, i) {
                code = fixed;
                found.push(format!("Wrapped input() in int() at line {line_no}"));
            }

            if RANGE_OVERFLOW_RE.is_match(&code) {
                code = RANGE_OVERFLOW_RE.replace_all(&code, "range(len($1))").into_owned();
                found.push(format!("Fixed off-by-one range at line {line_no}"));
            }

            if let Some(fixed) = guard_key_reads(&code) {
                code = fixed;
                found.push(format!("Used .get() for dictionary lookup at line {line_no}"));
            }

            if let Some(caps) = STRING_INCREMENT_RE.captures(&code) {
                if is_counter_name(last_segment(&caps[2])) {
                    let amount = caps.get(3).or_else(|| caps.get(4)).map_or("1", |m| m.as_str());
                    code = format!("{}{} += {amount}", &caps[1], &caps[2]);
                    found.push(format!("Fixed string increment at line {line_no}"));
                }
            }

            if !DEFINITION_RE.is_match(&code) {
                for (name, missing, fixed) in fill_constructor_args(&code, &arities) {
                    code = fixed;
                    found.push(if missing == 1 {
                        format!("Added missing argument to {name}() at line {line_no}")
                    } else {
                        format!("Added {missing} missing arguments to {name}() at line {line_no}")
                    });
                }
            }

            if let Some(caps) = INPUT_ASSIGN_RE.captures(&code) {
                text_inputs.insert(caps[1].to_string());
            } else if let Some(caps) = ASSIGN_TARGET_RE.captures(&code) {
                text_inputs.remove(&caps[1]);
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

fn last_segment(target: &str) -> &str {
    target.rsplit('.').next().unwrap_or(target)
}

// ── str() in print ──────────────────────────────────────

/// Trimmed pieces of `s` split on a top-level `sep`, with their offsets.
fn pieces(s: &str, sep: char) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut push = |start: usize, end: usize| {
        let raw = &s[start..end];
        let lead = raw.len() - raw.trim_start().len();
        out.push((start + lead, raw.trim()));
    };
    for c in code_chars(s) {
        if c.ch == sep && c.depth == 0 {
            push(start, c.index);
            start = c.index + sep.len_utf8();
        }
    }
    push(start, s.len());
    out
}

/// Wrap bare names and numbers joined by `+` to a string literal inside
/// `print(...)`. Names in `text_inputs` already hold strings and are left alone.
fn convert_print_operands(code: &str, text_inputs: &HashSet<String>) -> Option<String> {
    let m = PRINT_RE.find(code)?;
    let open = m.end() - 1;
    let close = matching_close(code, open)?;
    let args = &code[open + 1..close];

    let mut edits = Vec::new();
    for (arg_at, arg) in pieces(args, ',') {
        let operands = pieces(arg, '+');
        if operands.len() < 2 || !operands.iter().any(|(_, op)| is_string_literal(op)) {
            continue;
        }
        for (op_at, op) in operands {
            if BARE_OPERAND_RE.is_match(op) && !text_inputs.contains(op) {
                let start = open + 1 + arg_at + op_at;
                edits.push(Edit {
                    start,
                    end: start + op.len(),
                    with: format!("str({op})"),
                });
            }
        }
    }
    if edits.is_empty() {
        return None;
    }
    Some(apply_edits(code, edits))
}

// ── int(input()) ────────────────────────────────────────

fn wrap_numeric_input(code: &str, lines: &[String], info: &[LineInfo], at: usize) -> Option<String> {
    let caps = INPUT_ASSIGN_RE.captures(code)?;
    let var = caps.get(1)?.as_str();
    let open = caps.get(0)?.end() - 1;
    let close = matching_close(code, open)?;
    if !code[close + 1..].trim().is_empty() {
        return None;
    }

    let window = lines
        .iter()
        .zip(info)
        .skip(at + 1)
        .filter(|(_, i)| matches!(i.role, LineRole::Statement | LineRole::Continuation))
        .take(INPUT_LOOKAHEAD)
        .map(|(line, _)| split_comment(line).0);
    if !used_as_number(var, window) {
        return None;
    }

    let call_start = code[..open].rfind("input")?;
    Some(format!(
        "{}int({})",
        &code[..call_start],
        &code[call_start..=close]
    ))
}

fn used_as_number<'a>(var: &str, window: impl Iterator<Item = &'a str>) -> bool {
    let v = regex::escape(var);
    let patterns = [
        format!(r"\b{v}\s*(?:\*\*|[-*/%])"),
        format!(r"(?:\*\*|[-*/%])\s*{v}\b"),
        format!(r#"\b{v}\s*\+=?\s*[^\s"'fFrRbBuU]"#),
        format!(r#"[^\s"'+]\s*\+\s*{v}\b"#),
        format!(r"\b{v}\s*[<>]=?\s*\d"),
        format!(r"\d\s*[<>]=?\s*{v}\b"),
        format!(r"\brange\([^)]*\b{v}\b"),
    ];
    let Ok(numeric) = patterns.iter().map(|p| Regex::new(p)).collect::<Result<Vec<_>, _>>() else {
        return false;
    };
    let Ok(converted) = Regex::new(&format!(r"\b(?:int|float)\(\s*{v}\s*\)")) else {
        return false;
    };
    let Ok(word) = Regex::new(&format!(r"\b{v}\b")) else {
        return false;
    };

    let mut hit = false;
    for line in window {
        if converted.is_match(line) {
            return false;
        }
        if numeric.iter().any(|re| re.is_match(line)) {
            hit = true;
        }
        for caps in CALL_RE.captures_iter(line) {
            let name = &caps[1];
            let Some(m) = caps.get(0) else { continue };
            let args = first_group(&line[m.start()..]).unwrap_or("");
            if is_arithmetic_name(name) && word.is_match(args) {
                hit = true;
            }
        }
    }
    hit
}

// ── .get() on mappings ──────────────────────────────────

fn guard_key_reads(code: &str) -> Option<String> {
    if code.trim_start().starts_with("del ") {
        return None;
    }
    let code_at: Vec<usize> = code_chars(code).map(|c| c.index).collect();

    let mut edits = Vec::new();
    for caps in KEY_READ_RE.captures_iter(code) {
        let (Some(whole), Some(name), Some(key)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if !is_mapping_name(name.as_str()) || code_at.binary_search(&whole.start()).is_err() {
            continue;
        }
        if is_store_target(&code[whole.end()..]) {
            continue;
        }
        edits.push(Edit {
            start: whole.start(),
            end: whole.end(),
            with: format!("{}.get({})", name.as_str(), key.as_str()),
        });
    }
    if edits.is_empty() {
        return None;
    }
    Some(apply_edits(code, edits))
}

/// Whether the text following a subscript makes it an assignment target.
fn is_store_target(after: &str) -> bool {
    let after = after.trim_start();
    let op_len = after.find('=').unwrap_or(usize::MAX);
    if op_len == usize::MAX || after[op_len + 1..].starts_with('=') {
        return false;
    }
    let op = &after[..op_len];
    matches!(op, "" | "+" | "-" | "*" | "/" | "//" | "%" | "**" | "&" | "|" | "^" | "<<" | ">>" | "@")
}

// ── Constructor arity ───────────────────────────────────

/// Required positional parameter counts of `__init__` for every class
/// defined in the snippet. Classes taking `*args` are left out.
fn constructor_arities(lines: &[String], info: &[LineInfo]) -> BTreeMap<String, usize> {
    let mut arities = BTreeMap::new();
    let mut current: Option<(String, usize)> = None;

    for (line, i) in lines.iter().zip(info) {
        if i.role != LineRole::Statement {
            continue;
        }
        let (code, _) = split_comment(line);
        let column = code.len() - code.trim_start().len();

        if let Some(caps) = CLASS_RE.captures(code) {
            current = Some((caps[2].to_string(), caps[1].len()));
            continue;
        }
        let Some((class, class_column)) = &current else {
            continue;
        };
        if column <= *class_column {
            current = None;
            continue;
        }
        if INIT_RE.is_match(code) {
            if let Some(required) = first_group(code).and_then(required_positional) {
                arities.insert(class.clone(), required);
            }
        }
    }
    arities
}

fn required_positional(params: &str) -> Option<usize> {
    let mut required = 0;
    for param in split_top_level(params, ',').into_iter().skip(1) {
        if param.is_empty() || param == "/" {
            continue;
        }
        // variadic and keyword-only signatures are not filled positionally
        if param.starts_with('*') {
            return None;
        }
        if find_top_level(param, '=').is_none() {
            required += 1;
        }
    }
    Some(required)
}

/// Calls to known classes with too few positional arguments get `None`
/// for each missing one.
fn fill_constructor_args(code: &str, arities: &BTreeMap<String, usize>) -> Vec<(String, usize, String)> {
    let mut fixes = Vec::new();
    let mut code = code.to_string();

    loop {
        let next = CALL_RE.captures_iter(&code).find_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let required = *arities.get(name)?;
            if code[..whole.start()].ends_with('.') {
                return None;
            }
            let open = whole.end() - 1;
            let close = matching_close(&code, open)?;
            let args: Vec<&str> = split_top_level(&code[open + 1..close], ',')
                .into_iter()
                .filter(|a| !a.is_empty())
                .collect();
            if args.iter().any(|a| a.starts_with('*') || is_keyword_argument(a)) {
                return None;
            }
            let missing = required.checked_sub(args.len()).filter(|&m| m > 0)?;
            let mut filled: Vec<&str> = args;
            filled.extend(std::iter::repeat_n("None", missing));
            let rebuilt = format!("{}{}{}", &code[..open + 1], filled.join(", "), &code[close..]);
            Some((name.to_string(), missing, rebuilt))
        });
        match next {
            Some((name, missing, rebuilt)) => {
                code = rebuilt.clone();
                fixes.push((name, missing, rebuilt));
            }
            None => break,
        }
    }
    fixes
}

fn is_keyword_argument(arg: &str) -> bool {
    find_top_level(arg, '=').is_some_and(|pos| !arg[pos + 1..].starts_with('='))
}
