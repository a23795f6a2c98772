//! Heuristic repair of Python snippets.
//!
//! The engine runs an ordered list of [`FixPass`] stages over raw text.
//! Nothing here can fail: a pattern that does not match leaves the text as
//! it was.

pub mod layout;
pub mod lexical;
pub mod logic;
pub mod runtime;
pub mod syntax;
pub mod variables;

use serde::Serialize;
use tracing::debug;

/// Reported when no pass changed anything.
pub const NO_CHANGES: &str = "No changes needed";

/// Iteration cap for the syntax and indentation stage.
pub const SYNTAX_ITERATIONS: usize = 3;

/// Text produced by one pass and what it changed, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutput {
    pub text: String,
    pub changes: Vec<String>,
}

impl PassOutput {
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changes: Vec::new(),
        }
    }
}

/// A named, pure text transformation.
///
/// Every pass must be idempotent on its own output. Implementations must be
/// `Send + Sync` so one engine can serve concurrent callers.
pub trait FixPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, text: &str) -> PassOutput;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairResult {
    pub fixed_text: String,
    pub changes: Vec<String>,
}

enum Stage {
    Once(Box<dyn FixPass>),
    /// Re-run the passes in order until a round changes nothing.
    Fixpoint {
        passes: Vec<Box<dyn FixPass>>,
        max_iterations: usize,
    },
}

pub struct RepairEngine {
    stages: Vec<Stage>,
}

impl Default for RepairEngine {
    fn default() -> Self {
        Self::python()
    }
}

impl RepairEngine {
    /// Lexical cleanup, variable references, syntax and indentation (to a
    /// fixpoint), runtime pitfalls, then logic fixes.
    pub fn python() -> Self {
        Self {
            stages: vec![
                Stage::Once(Box::new(lexical::LexicalCleanup)),
                Stage::Once(Box::new(variables::VariableReferences)),
                Stage::Fixpoint {
                    passes: vec![
                        Box::new(syntax::MissingColons),
                        Box::new(syntax::LegacyPrint),
                        Box::new(syntax::Reindent),
                    ],
                    max_iterations: SYNTAX_ITERATIONS,
                },
                Stage::Once(Box::new(runtime::RuntimePitfalls)),
                Stage::Once(Box::new(logic::LogicFixes)),
            ],
        }
    }

    pub fn repair(&self, source: &str) -> RepairResult {
        let mut text = source.to_string();
        let mut changes = Vec::new();

        for stage in &self.stages {
            match stage {
                Stage::Once(pass) => {
                    text = run_pass(pass.as_ref(), &text, &mut changes);
                }
                Stage::Fixpoint {
                    passes,
                    max_iterations,
                } => {
                    for round in 0..*max_iterations {
                        let before = text.clone();
                        for pass in passes {
                            text = run_pass(pass.as_ref(), &text, &mut changes);
                        }
                        if text == before {
                            debug!(round, "syntax stage reached a fixpoint");
                            break;
                        }
                    }
                }
            }
        }

        debug!(input_len = source.len(), changes = changes.len(), "repaired source");
        if changes.is_empty() {
            changes.push(NO_CHANGES.to_string());
        }
        RepairResult {
            fixed_text: text,
            changes,
        }
    }
}

fn run_pass(pass: &dyn FixPass, text: &str, changes: &mut Vec<String>) -> String {
    let output = pass.apply(text);
    if !output.changes.is_empty() {
        debug!(pass = pass.name(), changes = output.changes.len(), "fix pass applied");
    }
    changes.extend(output.changes);
    output.text
}

/// Repair `source` with the default Python pass list.
pub fn repair(source: &str) -> RepairResult {
    RepairEngine::python().repair(source)
}

/// Split into owned lines; joining with `'\n'` restores the input exactly.
pub(crate) fn owned_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_code_reports_no_changes() {
        let source = "def add(a, b):\n    return a + b\n";
        let result = repair(source);
        assert_eq!(result.fixed_text, source);
        assert_eq!(result.changes, vec![NO_CHANGES.to_string()]);
    }

    #[test]
    fn test_assignment_in_condition() {
        let result = repair("x = 1\nif x = 5:\n    print(x)\n");
        assert_eq!(result.fixed_text, "x = 1\nif x == 5:\n    print(x)\n");
        assert!(result.changes.iter().any(|c| c.starts_with("Fixed assignment in condition")));
    }

    #[test]
    fn test_missing_colon_and_body_indent() {
        let result = repair("for i in range(10)\nprint(i)\n");
        assert_eq!(result.fixed_text, "for i in range(10):\n    print(i)\n");
        assert_eq!(
            result.changes,
            vec![
                "Added missing colon at line 1".to_string(),
                "Fixed indentation at line 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_repair_is_idempotent() {
        let inputs = [
            "class Game\ndef start()\nprint \"go\"\nif score = 10\nreturn score\n",
            "x = mydict['a']\ncount += \"1\"\nfor i in range(len(items) + 1):\n    pass\n",
            "def f(a=[]):\n    s = ''\n    for w in a:\n        s += 'x'\n",
        ];
        for input in inputs {
            let once = repair(input).fixed_text;
            let twice = repair(&once).fixed_text;
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    struct Upper;

    impl FixPass for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn apply(&self, text: &str) -> PassOutput {
            let upper = text.to_uppercase();
            if upper == text {
                return PassOutput::unchanged(text);
            }
            PassOutput {
                text: upper,
                changes: vec!["uppercased".to_string()],
            }
        }
    }

    #[test]
    fn test_fixpoint_stops_when_stable() {
        let engine = RepairEngine {
            stages: vec![Stage::Fixpoint {
                passes: vec![Box::new(Upper)],
                max_iterations: SYNTAX_ITERATIONS,
            }],
        };
        let result = engine.repair("abc");
        assert_eq!(result.fixed_text, "ABC");
        assert_eq!(result.changes, vec!["uppercased".to_string()]);
    }
}
