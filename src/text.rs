//! Small lexical helpers shared by the line scanner and the repair passes.
//!
//! None of these understand a real grammar. They skip over single-line
//! string literals and track bracket depth, which is enough to tell a
//! top-level `:` or `,` from one inside a call or a string.

/// Leading whitespace of `line`.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shorten `s` to `max` characters, appending `...` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{cut}...")
}

/// A character outside string literals, with the bracket depth it sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeChar {
    pub index: usize,
    pub ch: char,
    pub depth: usize,
}

/// Iterates the characters of `s` that are not inside a string literal.
///
/// Openers report the depth outside them; closers report the depth after
/// closing, so a matching pair shares one depth value.
pub fn code_chars(s: &str) -> impl Iterator<Item = CodeChar> + '_ {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;

    s.char_indices().filter_map(move |(index, ch)| {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            return None;
        }
        match ch {
            '"' | '\'' | '`' => {
                quote = Some(ch);
                None
            }
            '(' | '[' | '{' => {
                let c = CodeChar { index, ch, depth };
                depth += 1;
                Some(c)
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                Some(CodeChar { index, ch, depth })
            }
            _ => Some(CodeChar { index, ch, depth }),
        }
    })
}

/// The part of `line` before a trailing comment, with trailing whitespace
/// removed. Comment markers inside string literals are ignored.
pub fn code_part<'a>(line: &'a str, marker: &str) -> &'a str {
    let Some(first) = marker.chars().next() else {
        return line.trim_end();
    };
    for c in code_chars(line) {
        if c.ch == first && line[c.index..].starts_with(marker) {
            return line[..c.index].trim_end();
        }
    }
    line.trim_end()
}

/// Byte index of the first `target` at bracket depth zero.
pub fn find_top_level(s: &str, target: char) -> Option<usize> {
    code_chars(s)
        .find(|c| c.ch == target && c.depth == 0)
        .map(|c| c.index)
}

/// Bracket depth left open at the end of `s`.
pub fn open_depth(s: &str) -> usize {
    let mut depth = 0usize;
    for c in code_chars(s) {
        match c.ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Index of the bracket closing the one at `open`.
pub fn matching_close(s: &str, open: usize) -> Option<usize> {
    let opener = s[open..].chars().next()?;
    let closer = match opener {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    let tail = &s[open..];
    let mut depth = 0usize;
    for c in code_chars(tail) {
        if c.ch == opener {
            depth += 1;
        } else if c.ch == closer {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(open + c.index);
            }
        }
    }
    None
}

/// Contents of the first parenthesised group of `s`, without the parens.
pub fn first_group(s: &str) -> Option<&str> {
    let open = s.find('(')?;
    let close = matching_close(s, open)?;
    Some(&s[open + 1..close])
}

/// Split `s` on `sep` occurring at bracket depth zero outside strings.
/// Pieces are trimmed; an all-blank input yields no pieces.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut start = 0;
    for c in code_chars(s) {
        if c.ch == sep && c.depth == 0 {
            parts.push(s[start..c.index].trim());
            start = c.index + sep.len_utf8();
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Whether `s` is a quoted string literal (optionally with a Python prefix).
pub fn is_string_literal(s: &str) -> bool {
    let body = s.trim_start_matches(|c: char| matches!(c, 'f' | 'r' | 'b' | 'u' | 'F' | 'R' | 'B' | 'U'));
    let Some(first) = body.chars().next() else {
        return false;
    };
    matches!(first, '"' | '\'' | '`') && body.len() >= 2 && body.ends_with(first)
}
