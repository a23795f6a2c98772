use regex::Regex;
use std::sync::LazyLock;

use super::layout::{LineRole, classify, split_comment};
use super::{FixPass, PassOutput, owned_lines};

/// Exact call substitutions for names that no longer exist.
pub static CALL_FIXES: &[(&str, &str)] = &[
    ("raw_input(", "input("),
    ("xrange(", "range("),
    ("unichr(", "chr("),
    (".iteritems()", ".items()"),
    (".iterkeys()", ".keys()"),
    (".itervalues()", ".values()"),
    ("os.getcwdu()", "os.getcwd()"),
    ("sys.maxint", "sys.maxsize"),
    ("string.letters", "string.ascii_letters"),
];

static CALL_FIX_RES: LazyLock<Vec<(Regex, &'static str, &'static str)>> = LazyLock::new(|| {
    CALL_FIXES
        .iter()
        .map(|(bad, good)| {
            // a leading word character must start a fresh identifier
            let boundary = if bad.starts_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
            let re = Regex::new(&format!("{boundary}{}", regex::escape(bad))).expect("call fix pattern");
            (re, *bad, *good)
        })
        .collect()
});

static REVERSED_SELF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([A-Za-z_]\w*)\s*=\s*self\.([A-Za-z_]\w*)$").expect("self pattern"));

static DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)").expect("def pattern"));

/// Reversed `self` assignments inside `__init__` and the call table.
pub struct VariableReferences;

impl FixPass for VariableReferences {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut lines = owned_lines(text);
        let info = classify(&lines);
        let mut changes = Vec::new();
        let mut in_init = false;

        for (i, line) in lines.iter_mut().enumerate() {
            if info[i].role != LineRole::Statement {
                continue;
            }
            if let Some(caps) = DEF_RE.captures(line) {
                in_init = &caps[1] == "__init__";
            }

            let (code, tail) = split_comment(line);
            let mut code = code.to_string();
            let tail = tail.to_string();
            let mut found = Vec::new();

            if in_init {
                if let Some(caps) = REVERSED_SELF_RE.captures(&code) {
                    if caps[2] == caps[3] {
                        code = format!("{}self.{} = {}", &caps[1], &caps[3], &caps[2]);
                        found.push(format!("Fixed variable assignment order at line {}", i + 1));
                    }
                }
            }

            for (re, bad, good) in CALL_FIX_RES.iter() {
                if re.is_match(&code) {
                    code = re.replace_all(&code, *good).into_owned();
                    found.push(format!("Replaced {bad} with {good} at line {}", i + 1));
                }
            }

            if !found.is_empty() {
                *line = format!("{code}{tail}");
                changes.extend(found);
            }
        }

        PassOutput {
            text: lines.join("\n"),
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_self_assignment_in_init() {
        let source = "class P:\n    def __init__(self, name):\n        name = self.name\n";
        let out = VariableReferences.apply(source);
        assert_eq!(out.text, "class P:\n    def __init__(self, name):\n        self.name = name\n");
        assert_eq!(out.changes, vec!["Fixed variable assignment order at line 3".to_string()]);
    }

    #[test]
    fn test_local_copy_outside_init_kept() {
        let source = "    def area(self):\n        width = self.width\n";
        assert!(VariableReferences.apply(source).changes.is_empty());
    }

    #[test]
    fn test_call_table() {
        let out = VariableReferences.apply("for k, v in d.iteritems():  # pairs\n    n = raw_input('> ')");
        assert_eq!(out.text, "for k, v in d.items():  # pairs\n    n = input('> ')");
        assert_eq!(
            out.changes,
            vec![
                "Replaced .iteritems() with .items() at line 1".to_string(),
                "Replaced raw_input( with input( at line 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_identifier_suffix_not_rewritten() {
        let out = VariableReferences.apply("my_xrange(3)");
        assert!(out.changes.is_empty());
    }
}
