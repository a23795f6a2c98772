//! Request-level wrappers around the two engines, shared by the HTTP and MCP
//! front ends. Every outcome, failures included, is a response value.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::annotator::{self, Verbosity};
use crate::config::Config;
use crate::languages::Language;
use crate::repair;

pub const NO_CODE: &str = "No code provided";
pub const PYTHON_ONLY: &str = "Only Python is supported";

fn default_language() -> String {
    Language::Python.name().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Overrides the configured verbosity for this request.
    #[serde(default)]
    pub detailed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub commented_code: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    pub fn failed(commented_code: &str, error: impl Into<String>) -> Self {
        Self {
            commented_code: commented_code.to_string(),
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResponse {
    pub fixed_code: String,
    pub fixes: Vec<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FixResponse {
    pub fn failed(fixed_code: &str, error: impl Into<String>) -> Self {
        Self {
            fixed_code: fixed_code.to_string(),
            fixes: Vec::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

fn too_large(config: &Config) -> String {
    format!("Input exceeds the {} byte limit", config.max_input_bytes)
}

pub fn analyze(config: &Config, request: &AnalyzeRequest) -> AnalyzeResponse {
    let code = request.code.as_str();
    info!("Analyzing {} code, length: {} characters", request.language, code.chars().count());

    if code.trim().is_empty() {
        return AnalyzeResponse::failed("", NO_CODE);
    }
    if !config.input_within_limit(code) {
        warn!("Rejected {} bytes of {} code", code.len(), request.language);
        return AnalyzeResponse::failed("", too_large(config));
    }

    let language = match config.resolve_language(&request.language) {
        Ok(language) => language,
        Err(e) => {
            warn!("{e}");
            return AnalyzeResponse::failed(code, e.to_string());
        }
    };
    let verbosity = match request.detailed {
        Some(true) => Verbosity::Detailed,
        Some(false) => Verbosity::Structural,
        None => config.annotation.verbosity,
    };

    match annotator::annotate_with(code, language, verbosity) {
        Ok(annotated) => {
            info!("Analysis completed successfully for {language}");
            AnalyzeResponse {
                commented_code: annotated.annotated_text,
                success: true,
                error: None,
            }
        }
        Err(e) => {
            warn!("Error analyzing {language} code: {e}");
            AnalyzeResponse::failed(code, e.to_string())
        }
    }
}

pub fn fix(config: &Config, request: &FixRequest) -> FixResponse {
    let code = request.code.as_str();
    info!("Fixing {} code, length: {} characters", request.language, code.chars().count());

    if code.trim().is_empty() {
        return FixResponse::failed("", NO_CODE);
    }
    if !config.input_within_limit(code) {
        warn!("Rejected {} bytes of {} code", code.len(), request.language);
        return FixResponse::failed("", too_large(config));
    }
    if !matches!(request.language.parse::<Language>(), Ok(Language::Python)) {
        warn!("Unsupported language for repair: {}", request.language);
        return FixResponse::failed(code, PYTHON_ONLY);
    }

    let result = repair::repair(code);
    info!("Fixed {} issues in python code", result.changes.len());
    FixResponse {
        fixed_code: result.fixed_text,
        fixes: result.changes,
        success: true,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_request(code: &str, language: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            code: code.to_string(),
            language: language.to_string(),
            detailed: None,
        }
    }

    #[test]
    fn test_analyze_empty_code() {
        let response = analyze(&Config::default(), &analyze_request("  \n", "python"));
        assert_eq!(response, AnalyzeResponse::failed("", NO_CODE));
    }

    #[test]
    fn test_analyze_unsupported_language_echoes_code() {
        let response = analyze(&Config::default(), &analyze_request("x = 1", "cobol"));
        assert!(!response.success);
        assert_eq!(response.commented_code, "x = 1");
        assert_eq!(response.error.as_deref(), Some("Unsupported language: cobol"));
    }

    #[test]
    fn test_analyze_syntax_error_echoes_code() {
        let response = analyze(&Config::default(), &analyze_request("x = 1\nif x = 5:\n    pass\n", "python"));
        assert!(!response.success);
        assert_eq!(response.commented_code, "x = 1\nif x = 5:\n    pass\n");
        assert!(response.error.unwrap().starts_with("Syntax Error at line 2:"));
    }

    #[test]
    fn test_analyze_respects_size_limit() {
        let mut config = Config::default();
        config.max_input_bytes = 8;
        let response = analyze(&config, &analyze_request("value = 123456", "python"));
        assert!(!response.success);
        assert!(response.commented_code.is_empty());
    }

    #[test]
    fn test_analyze_success() {
        let response = analyze(&Config::default(), &analyze_request("def get_name():\n    pass\n", "py"));
        assert!(response.success);
        assert!(response.commented_code.starts_with("# Retrieve name\n"));
    }

    #[test]
    fn test_fix_python_only() {
        let request = FixRequest {
            code: "let x = 1;".to_string(),
            language: "javascript".to_string(),
        };
        let response = fix(&Config::default(), &request);
        assert_eq!(response, FixResponse::failed("let x = 1;", PYTHON_ONLY));
    }

    #[test]
    fn test_fix_python() {
        let request = FixRequest {
            code: "if x = 5:\n    pass\n".to_string(),
            language: "python".to_string(),
        };
        let response = fix(&Config::default(), &request);
        assert!(response.success);
        assert_eq!(response.fixed_code, "if x == 5:\n    pass\n");
        assert_eq!(response.fixes, vec!["Fixed assignment in condition at line 1".to_string()]);
    }

    #[test]
    fn test_request_defaults_to_python() {
        let request: FixRequest = serde_json::from_str(r#"{"code": "x = 1"}"#).unwrap();
        assert_eq!(request.language, "python");
    }
}
