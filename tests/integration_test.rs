/// End-to-end integration tests for codenotes.
///
/// Tests the complete flow:
///   Config → Service → Annotator / Repair engine
use codenotes::annotator::{Verbosity, build_annotations};
use codenotes::config::Config;
use codenotes::parser::{self, SourceUnit};
use codenotes::service::{self, AnalyzeRequest, FixRequest};
use codenotes::{Language, annotate, annotate_with, repair};
use std::fs;
use tempfile::tempdir;

fn is_comment(line: &str, language: Language) -> bool {
    let marker = match language {
        Language::Python => "#",
        Language::JavaScript | Language::C => "//",
    };
    line.trim_start().starts_with(marker)
}

/// Removes the inserted comment lines. Only valid for sources without comments of their own.
fn strip_comments(text: &str, language: Language) -> Vec<String> {
    text.lines()
        .filter(|l| !is_comment(l, language))
        .map(str::to_string)
        .collect()
}

const PYTHON_SAMPLE: &str = "import os\nimport sys\n\nclass UserManager:\n    def __init__(self, db):\n        self.db = db\n\n    def get_user_profile(self, uid):\n        if uid is None:\n            return None\n        return self.db.find(uid)\n\nfor row in rows:\n    print(row)\n\nif __name__ == '__main__':\n    main()\n";

const JS_SAMPLE: &str = "import React from 'react';\n\nfunction fetchUsers(url) {\n  for (const user of users) {\n    console.log(user);\n  }\n}\n\nclass Cart extends Base {\n  constructor(items) {\n    this.items = items;\n  }\n}\n";

const C_SAMPLE: &str = "#include <stdio.h>\n#define MAX 10\n\nint counter = 0;\n\nint main(void)\n{\n    for (int i = 0; i < MAX; i++) {\n        counter++;\n    }\n    return 0;\n}\n";

// ── Repair scenarios ─────────────────────────────────────────────────

#[test]
fn test_repair_assignment_in_condition() {
    let result = repair("if x = 5:\n    pass\n");
    assert!(result.fixed_text.contains("if x == 5:"), "got: {}", result.fixed_text);
    assert!(
        result
            .changes
            .iter()
            .any(|c| c.starts_with("Fixed assignment in condition")),
        "changes: {:?}",
        result.changes
    );
}

#[test]
fn test_repair_missing_colon_indents_block() {
    let result = repair("for i in range(10)\nprint(i)\n");
    assert_eq!(result.fixed_text, "for i in range(10):\n    print(i)\n");
    assert_eq!(
        result.changes,
        vec!["Added missing colon at line 1", "Fixed indentation at line 2"]
    );
}

#[test]
fn test_repair_is_idempotent_and_deterministic() {
    let inputs = [
        "def greet(name)\nprint \"hello\", name\n",
        "class Player:\n    def __init__(self, name):\n        name = self.name\n\n    def score():\n        return 0\n",
        "age = input('age? ')\nif age > 18:\n    print('adult')\n",
        "x = None\nif x == None:\n    pass\n",
    ];
    for input in inputs {
        let first = repair(input);
        assert_eq!(first, repair(input), "repair must be deterministic for {input:?}");

        let second = repair(&first.fixed_text);
        assert_eq!(
            second.fixed_text, first.fixed_text,
            "second pass changed output for {input:?}"
        );
    }
}

#[test]
fn test_repair_clean_code_reports_no_changes() {
    let source = "def add(a, b):\n    return a + b\n";
    let result = repair(source);
    assert_eq!(result.fixed_text, source);
    assert_eq!(result.changes, vec!["No changes needed"]);
}

// ── Annotation scenarios ─────────────────────────────────────────────

#[test]
fn test_annotate_function_intent_from_name() {
    let out = annotate("def get_user_profile(uid):\n    pass\n", Language::Python).unwrap();
    assert!(
        out.annotated_text
            .starts_with("# Retrieve user profile\ndef get_user_profile(uid):"),
        "got: {}",
        out.annotated_text
    );
}

#[test]
fn test_annotate_loop_uses_loop_variable() {
    let out = annotate("for row in rows:\n    print(row)\n", Language::Python).unwrap();
    assert!(
        out.annotated_text
            .contains("# Process each row of data\nfor row in rows:"),
        "got: {}",
        out.annotated_text
    );
}

#[test]
fn test_annotate_adjacent_lines_commented_once() {
    let out = annotate("import os\nimport sys\n", Language::Python).unwrap();
    let comments = out
        .annotated_text
        .lines()
        .filter(|l| is_comment(l, Language::Python))
        .count();
    assert_eq!(comments, 1, "got: {}", out.annotated_text);
    assert!(out.annotated_text.lines().next().is_some_and(|l| l.starts_with('#')));
}

// ── Annotation properties ────────────────────────────────────────────

#[test]
fn test_annotation_preserves_source_lines() {
    for (source, language) in [
        (PYTHON_SAMPLE, Language::Python),
        (JS_SAMPLE, Language::JavaScript),
        (C_SAMPLE, Language::C),
    ] {
        let out = annotate(source, language).unwrap();
        let original: Vec<String> = source.lines().map(str::to_string).collect();
        assert_eq!(strip_comments(&out.annotated_text, language), original);
        assert!(
            out.annotated_text.lines().any(|l| is_comment(l, language)),
            "{language:?} sample should receive at least one comment"
        );
    }
}

#[test]
fn test_annotation_is_deterministic() {
    for (source, language) in [
        (PYTHON_SAMPLE, Language::Python),
        (JS_SAMPLE, Language::JavaScript),
        (C_SAMPLE, Language::C),
    ] {
        let a = annotate(source, language).unwrap();
        let b = annotate(source, language).unwrap();
        assert_eq!(a.annotated_text, b.annotated_text);
    }
}

#[test]
fn test_comment_targets_are_spaced_and_aligned() {
    for (source, language) in [
        (PYTHON_SAMPLE, Language::Python),
        (JS_SAMPLE, Language::JavaScript),
        (C_SAMPLE, Language::C),
    ] {
        let out = annotate(source, language).unwrap();
        let lines: Vec<&str> = out.annotated_text.lines().collect();

        let mut original_index = 0usize;
        let mut previous_target: Option<usize> = None;
        for (i, line) in lines.iter().enumerate() {
            if !is_comment(line, language) {
                original_index += 1;
                continue;
            }

            // The inserted comment shares the indentation of the line below it.
            let target = lines[i + 1];
            let indent = &target[..target.len() - target.trim_start().len()];
            assert!(
                line.starts_with(indent) && !line[indent.len()..].starts_with([' ', '\t']),
                "misaligned comment {line:?} above {target:?}"
            );

            if let Some(prev) = previous_target {
                assert!(
                    original_index - prev >= 2,
                    "comments on lines {} and {} are too close",
                    prev + 1,
                    original_index + 1
                );
            }
            previous_target = Some(original_index);
        }
    }
}

#[test]
fn test_comment_count_bounded_by_significant_nodes() {
    for (source, language) in [
        (PYTHON_SAMPLE, Language::Python),
        (JS_SAMPLE, Language::JavaScript),
        (C_SAMPLE, Language::C),
    ] {
        let structure = parser::parse(&SourceUnit::new(source, language)).unwrap();
        for verbosity in [Verbosity::Structural, Verbosity::Detailed] {
            let map = build_annotations(&structure, language, verbosity);
            let out = annotate_with(source, language, verbosity).unwrap();
            let inserted = out
                .annotated_text
                .lines()
                .filter(|l| is_comment(l, language))
                .count();

            assert!(
                inserted <= map.len(),
                "{language:?}/{verbosity:?}: {inserted} comments for {} annotations",
                map.len()
            );
            assert!(
                inserted <= structure.node_count(),
                "{language:?}/{verbosity:?}: {inserted} comments for {} nodes",
                structure.node_count()
            );
        }
    }
}

// ── Service layer ────────────────────────────────────────────────────

#[test]
fn test_service_with_config_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("codenotes.json");
    fs::write(
        &path,
        r#"{ "enabled_languages": ["python", "c"], "annotation": { "verbosity": "detailed" } }"#,
    )
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).unwrap();
    config.validate().unwrap();

    let analyzed = service::analyze(
        &config,
        &AnalyzeRequest {
            code: "def f():\n    pass\n    return compute()\n".to_string(),
            language: "python".to_string(),
            detailed: None,
        },
    );
    assert!(analyzed.success, "error: {:?}", analyzed.error);
    assert!(analyzed.commented_code.contains("    # Return"));

    let rejected = service::analyze(
        &config,
        &AnalyzeRequest {
            code: "let x = 1;\n".to_string(),
            language: "javascript".to_string(),
            detailed: None,
        },
    );
    assert!(!rejected.success);
    assert_eq!(rejected.commented_code, "let x = 1;\n");

    let fixed = service::fix(
        &config,
        &FixRequest {
            code: "while True\n    break\n".to_string(),
            language: "python".to_string(),
        },
    );
    assert!(fixed.success);
    assert_eq!(fixed.fixed_code, "while True:\n    break\n");
    assert_eq!(fixed.fixes, vec!["Added missing colon at line 1"]);
}

#[test]
fn test_service_rejects_empty_code() {
    let config = Config::default();
    let analyzed = service::analyze(
        &config,
        &AnalyzeRequest {
            code: "   \n".to_string(),
            language: "python".to_string(),
            detailed: None,
        },
    );
    assert!(!analyzed.success);
    assert_eq!(analyzed.error.as_deref(), Some(service::NO_CODE));

    let fixed = service::fix(
        &config,
        &FixRequest {
            code: String::new(),
            language: "python".to_string(),
        },
    );
    assert!(!fixed.success);
    assert_eq!(fixed.error.as_deref(), Some(service::NO_CODE));
}
