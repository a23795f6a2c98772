use regex::Regex;
use std::sync::LazyLock;

use super::{FixPass, PassOutput};

/// Entities decoded by [`decode_entities`], longest names first.
const ENTITIES: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
];

/// Known misspellings, replaced as whole words.
pub static TYPOS: &[(&str, &str)] = &[
    ("retrn", "return"),
    ("reutrn", "return"),
    ("retun", "return"),
    ("pirnt", "print"),
    ("prnit", "print"),
    ("pritn", "print"),
    ("__innit__", "__init__"),
    ("__iinit__", "__init__"),
    ("slef", "self"),
    ("improt", "import"),
    ("sqroot", "sqrt"),
    ("Ture", "True"),
    ("Flase", "False"),
    ("Nnoe", "None"),
    ("whlie", "while"),
    ("esle", "else"),
    ("elfi", "elif"),
];

static TYPO_RES: LazyLock<Vec<(Regex, &'static str, &'static str)>> = LazyLock::new(|| {
    TYPOS
        .iter()
        .map(|(typo, fix)| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(typo))).expect("typo pattern");
            (re, *typo, *fix)
        })
        .collect()
});

/// HTML entity decoding and the typo table.
pub struct LexicalCleanup;

impl FixPass for LexicalCleanup {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn apply(&self, text: &str) -> PassOutput {
        let mut changes = Vec::new();

        let mut out = decode_entities(text);
        if out != text {
            changes.push("Decoded HTML entities".to_string());
        }

        for (re, typo, fix) in TYPO_RES.iter() {
            if re.is_match(&out) {
                out = re.replace_all(&out, *fix).into_owned();
                changes.push(format!("Fixed typo: {typo} → {fix}"));
            }
        }

        PassOutput { text: out, changes }
    }
}

/// Decode the common HTML entities in one left-to-right scan. An `&amp;`
/// whose decoded `&` would start another entity is kept, so decoding an
/// already decoded text changes nothing.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some(("&amp;", _)) if starts_entity(&tail[5..]) => {
                out.push_str("&amp;");
                rest = &tail[5..];
            }
            Some((entity, decoded)) => {
                out.push_str(decoded);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Whether a `&` placed before `after` would spell a known entity.
fn starts_entity(after: &str) -> bool {
    ENTITIES.iter().any(|(entity, _)| after.starts_with(&entity[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_entities() {
        let out = LexicalCleanup.apply("if a &lt; b &amp;&amp; c &gt; d:\n    s = &quot;hi&quot;");
        assert_eq!(out.text, "if a < b && c > d:\n    s = \"hi\"");
        assert_eq!(out.changes, vec!["Decoded HTML entities".to_string()]);
    }

    #[test]
    fn test_amp_forming_new_entity_is_kept() {
        assert_eq!(decode_entities("&amp;lt;"), "&amp;lt;");
        assert_eq!(decode_entities(&decode_entities("x &amp;lt; y")), "x &amp;lt; y");
        assert_eq!(decode_entities("a & b"), "a & b");
    }

    #[test]
    fn test_typos_whole_word_only() {
        let out = LexicalCleanup.apply("def f():\n    retrn 1\nretrned = 2");
        assert_eq!(out.text, "def f():\n    return 1\nretrned = 2");
        assert_eq!(out.changes, vec!["Fixed typo: retrn → return".to_string()]);
    }

    #[test]
    fn test_init_typo() {
        let out = LexicalCleanup.apply("    def __innit__(self):");
        assert_eq!(out.text, "    def __init__(self):");
    }

    #[test]
    fn test_clean_text_untouched() {
        let out = LexicalCleanup.apply("print('a & b')");
        assert_eq!(out, PassOutput::unchanged("print('a & b')"));
    }
}
