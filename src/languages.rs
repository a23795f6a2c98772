use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Requested language is not implemented (or not enabled).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    C,
}

impl Language {
    pub fn all() -> [Language; 3] {
        [Language::Python, Language::JavaScript, Language::C]
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Marker used when synthesizing a comment line.
    pub fn comment_marker(&self) -> &'static str {
        self.config().comment_marker
    }

    /// Prefixes identifying a line that already is a comment.
    pub fn comment_prefixes(&self) -> &'static [&'static str] {
        self.config().comment_prefixes
    }

    pub fn config(&self) -> LanguageConfig {
        match self {
            Language::Python => python_config(),
            Language::JavaScript => javascript_config(),
            Language::C => c_config(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageConfig::get_by_name(s)
            .map(|c| c.language)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

pub struct LanguageConfig {
    pub language: Language,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub extensions: &'static [&'static str],
    pub comment_marker: &'static str,
    pub comment_prefixes: &'static [&'static str],
    /// Full grammar, when one is available. Languages without one are
    /// handled by the line scanner.
    pub grammar: Option<tree_sitter::Language>,
}

impl LanguageConfig {
    pub fn get_all() -> Vec<LanguageConfig> {
        vec![python_config(), javascript_config(), c_config()]
    }

    pub fn get_by_extension(ext: &str) -> Option<LanguageConfig> {
        let ext = ext.to_ascii_lowercase();
        Self::get_all()
            .into_iter()
            .find(|c| c.extensions.contains(&ext.as_str()))
    }

    pub fn get_by_name(name: &str) -> Option<LanguageConfig> {
        let name = name.trim().to_ascii_lowercase();
        Self::get_all()
            .into_iter()
            .find(|c| c.name == name || c.aliases.contains(&name.as_str()))
    }
}

fn python_config() -> LanguageConfig {
    LanguageConfig {
        language: Language::Python,
        name: "python",
        aliases: &["py", "python3"],
        extensions: &["py", "pyw"],
        comment_marker: "#",
        comment_prefixes: &["#"],
        grammar: Some(tree_sitter_python::LANGUAGE.into()),
    }
}

fn javascript_config() -> LanguageConfig {
    LanguageConfig {
        language: Language::JavaScript,
        name: "javascript",
        aliases: &["js", "jsx", "typescript", "ts", "tsx", "node"],
        extensions: &["js", "jsx", "mjs", "cjs", "ts", "tsx"],
        comment_marker: "//",
        comment_prefixes: &["//", "/*", "*"],
        grammar: None,
    }
}

fn c_config() -> LanguageConfig {
    LanguageConfig {
        language: Language::C,
        name: "c",
        aliases: &["cpp", "c++", "cc", "cxx", "h", "hpp"],
        extensions: &["c", "h", "cc", "cpp", "cxx", "hpp", "hh"],
        comment_marker: "//",
        comment_prefixes: &["//", "/*", "*"],
        grammar: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("TypeScript".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::C);
    }

    #[test]
    fn test_unknown_language() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported language: cobol");
    }

    #[test]
    fn test_extension_lookup() {
        let config = LanguageConfig::get_by_extension("PY").expect("python by extension");
        assert_eq!(config.language, Language::Python);
        assert!(config.grammar.is_some());
        assert!(LanguageConfig::get_by_extension("md").is_none());
    }

    #[test]
    fn test_comment_prefixes_differ_for_c() {
        assert_eq!(Language::C.comment_marker(), "//");
        assert!(!Language::C.comment_prefixes().contains(&"#"));
        assert!(Language::Python.comment_prefixes().contains(&"#"));
    }
}
