//! Physical-line roles for Python text that may not parse.
//!
//! The passes only rewrite `Statement` lines; everything else is carried
//! through. Bracket depth and triple-quoted strings are tracked across lines
//! so a continuation or a docstring body is never mistaken for a statement.

use crate::text::{code_chars, code_part};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Blank,
    Comment,
    /// Inside a triple-quoted string opened on an earlier line.
    StringBody,
    /// Inside open brackets or after a trailing backslash.
    Continuation,
    Statement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub role: LineRole,
    /// The logical statement this line belongs to is complete at its end.
    pub ends_statement: bool,
}

/// Code before any trailing comment, and the remainder (whitespace plus the
/// comment) so an edited line can be put back together.
pub fn split_comment(line: &str) -> (&str, &str) {
    let code = code_part(line, "#");
    (code, &line[code.len()..])
}

pub fn classify(lines: &[String]) -> Vec<LineInfo> {
    let mut out = Vec::with_capacity(lines.len());
    let mut depth: isize = 0;
    let mut backslash = false;
    let mut triple: Option<&'static str> = None;

    for line in lines {
        let trimmed = line.trim();

        if let Some(delim) = triple {
            if line.matches(delim).count() % 2 == 1 {
                triple = None;
            }
            out.push(LineInfo {
                role: LineRole::StringBody,
                ends_statement: triple.is_none() && depth == 0 && !backslash,
            });
            continue;
        }

        let role = if trimmed.is_empty() {
            LineRole::Blank
        } else if depth > 0 || backslash {
            LineRole::Continuation
        } else if trimmed.starts_with('#') {
            LineRole::Comment
        } else {
            LineRole::Statement
        };

        if matches!(role, LineRole::Statement | LineRole::Continuation) {
            let (code, _) = split_comment(line);
            triple = opened_triple(code);
            depth = (depth + bracket_delta(code)).max(0);
            backslash = code.ends_with('\\');
        }

        out.push(LineInfo {
            role,
            ends_statement: matches!(role, LineRole::Statement | LineRole::Continuation)
                && depth == 0
                && !backslash
                && triple.is_none(),
        });
    }
    out
}

/// Delimiter of a triple-quoted string left open at the end of `code`.
fn opened_triple(code: &str) -> Option<&'static str> {
    ["\"\"\"", "'''"]
        .into_iter()
        .find(|delim| code.matches(delim).count() % 2 == 1)
}

fn bracket_delta(code: &str) -> isize {
    code_chars(code)
        .map(|c| match c.ch {
            '(' | '[' | '{' => 1,
            ')' | ']' | '}' => -1,
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(text: &str) -> Vec<LineRole> {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        classify(&lines).into_iter().map(|i| i.role).collect()
    }

    #[test]
    fn test_continuation_inside_brackets() {
        use LineRole::*;
        assert_eq!(
            roles("x = foo(a,\n        b)\ny = 1"),
            vec![Statement, Continuation, Statement]
        );
    }

    #[test]
    fn test_docstring_body_is_string() {
        use LineRole::*;
        assert_eq!(
            roles("def f():\n    \"\"\"Doc\n    if x\n    \"\"\"\n    # note\n\n    pass"),
            vec![Statement, Statement, StringBody, StringBody, Comment, Blank, Statement]
        );
    }

    #[test]
    fn test_statement_end_flags() {
        let lines: Vec<String> = ["if (a and", "    b):", "x = 1 \\", "    + 2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ends: Vec<bool> = classify(&lines).iter().map(|i| i.ends_statement).collect();
        assert_eq!(ends, vec![false, true, false, true]);
    }

    #[test]
    fn test_split_comment_keeps_tail() {
        assert_eq!(split_comment("if x  # why"), ("if x", "  # why"));
        assert_eq!(split_comment("s = '#'"), ("s = '#'", ""));
    }
}
