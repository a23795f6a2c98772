use super::AnnotationMap;
use crate::languages::Language;
use crate::text::indentation;

/// Interleave comments from `map` with `lines`.
///
/// A comment is written directly above its target line, using the target's
/// exact leading whitespace, and only when at least two lines separate it
/// from the previously written comment. Blank lines and existing comment
/// lines never receive one. The original lines are always kept verbatim.
pub fn place(lines: &[&str], map: &AnnotationMap, language: Language) -> String {
    let marker = language.comment_marker();
    let prefixes = language.comment_prefixes();

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + map.len());
    let mut last_emitted: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some(comment) = map.get(&i) {
            let trimmed = line.trim_start();
            let eligible = !trimmed.trim_end().is_empty()
                && !prefixes.iter().any(|p| trimmed.starts_with(p));
            let spaced = last_emitted.is_none_or(|last| i - last >= 2);
            if eligible && spaced {
                out.push(format!("{}{marker} {comment}", indentation(line)));
                last_emitted = Some(i);
            }
        }
        out.push((*line).to_string());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(usize, &str)]) -> AnnotationMap {
        entries.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_adjacent_targets_only_first_is_written() {
        let lines = ["a = 1", "b = 2", "c = 3"];
        let out = place(&lines, &map(&[(0, "first"), (1, "second"), (2, "third")]), Language::Python);
        assert_eq!(out, "# first\na = 1\nb = 2\n# third\nc = 3");
    }

    #[test]
    fn test_indentation_copied_exactly() {
        let lines = ["def f():", "\t  return 1"];
        let out = place(&lines, &map(&[(1, "ret")]), Language::Python);
        assert_eq!(out, "def f():\n\t  # ret\n\t  return 1");
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let lines = ["", "# already", "x = 1"];
        let out = place(&lines, &map(&[(0, "a"), (1, "b")]), Language::Python);
        assert_eq!(out, "\n# already\nx = 1");
    }

    #[test]
    fn test_c_marker_and_preprocessor_lines() {
        let lines = ["#include <stdio.h>", "/* note */", "int x;"];
        let out = place(&lines, &map(&[(0, "inc"), (1, "skip")]), Language::C);
        assert_eq!(out, "// inc\n#include <stdio.h>\n/* note */\nint x;");
    }

    #[test]
    fn test_empty_map_is_identity() {
        let lines = ["x = 1", "", "  y = 2  "];
        assert_eq!(place(&lines, &AnnotationMap::new(), Language::Python), lines.join("\n"));
    }
}
