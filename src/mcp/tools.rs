/// MCP Tool handlers for codenotes.
///
/// 1. annotate_code – insert explanatory comments above significant lines
/// 2. repair_code   – heuristically repair a Python snippet
use crate::mcp::server::McpContext;
use crate::service::{self, AnalyzeRequest, FixRequest};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{ErrorData as McpError, handler::server::tool::ToolRouter, model::*, tool, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Parameter structs ────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema)]
struct AnnotateParams {
    /// Source code to annotate
    code: String,
    /// Language: python | javascript | c (default: python)
    language: Option<String>,
    /// Also comment returns, raises, assertions, assignments and library calls
    detailed: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
struct RepairParams {
    /// Python source code to repair
    code: String,
}

// ── Response helpers ─────────────────────────────────────────────────

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("failed to encode result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn error_result(msg: &str) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.to_string())]))
}

// ── Tool implementations ─────────────────────────────────────────────

#[derive(Clone)]
pub struct AppTools {
    pub ctx: McpContext,
    pub tool_router: ToolRouter<Self>,
}

impl ServerHandler for AppTools {}

#[tool_router]
impl AppTools {
    pub fn new(ctx: McpContext) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }

    // ── Tool 1: annotate_code ───────────────────────────────────────

    #[tool(
        description = "Insert explanatory comments above the functions, classes, loops, top-level conditionals, resource blocks, error handlers and imports of a Python, JavaScript or C snippet. Returns commented_code, success and error."
    )]
    async fn annotate_code(&self, params: Parameters<AnnotateParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        if p.code.trim().is_empty() {
            return error_result(service::NO_CODE);
        }

        let request = AnalyzeRequest {
            code: p.code,
            language: p.language.unwrap_or_else(|| "python".to_string()),
            detailed: p.detailed,
        };
        let config = self.ctx.config.clone();
        let response = tokio::task::spawn_blocking(move || service::analyze(&config, &request))
            .await
            .map_err(|e| McpError::internal_error(format!("annotation task failed: {e}"), None))?;

        json_result(&response)
    }

    // ── Tool 2: repair_code ─────────────────────────────────────────

    #[tool(
        description = "Heuristically repair a Python snippet: missing colons, legacy print statements, broken indentation, common runtime pitfalls and logic slips. Returns fixed_code and the list of fixes applied."
    )]
    async fn repair_code(&self, params: Parameters<RepairParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        if p.code.trim().is_empty() {
            return error_result(service::NO_CODE);
        }

        let request = FixRequest {
            code: p.code,
            language: "python".to_string(),
        };
        let config = self.ctx.config.clone();
        let response = tokio::task::spawn_blocking(move || service::fix(&config, &request))
            .await
            .map_err(|e| McpError::internal_error(format!("repair task failed: {e}"), None))?;

        json_result(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn tools() -> AppTools {
        AppTools::new(McpContext::new(Config::default()))
    }

    fn text_of(result: &CallToolResult) -> serde_json::Value {
        let text = result.content[0].as_text().unwrap().text.clone();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_annotate_code_tool() {
        let result = tools()
            .annotate_code(Parameters(AnnotateParams {
                code: "def get_user_profile(uid):\n    pass\n".to_string(),
                language: None,
                detailed: None,
            }))
            .await
            .unwrap();
        let body = text_of(&result);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["commented_code"],
            "# Retrieve user profile\ndef get_user_profile(uid):\n    pass\n"
        );
    }

    #[tokio::test]
    async fn test_repair_code_tool() {
        let result = tools()
            .repair_code(Parameters(RepairParams {
                code: "for i in range(10)\nprint(i)\n".to_string(),
            }))
            .await
            .unwrap();
        let body = text_of(&result);
        assert_eq!(body["fixed_code"], "for i in range(10):\n    print(i)\n");
        assert_eq!(body["fixes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_tools_registered() {
        let names: Vec<String> = tools()
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert!(names.contains(&"annotate_code".to_string()));
        assert!(names.contains(&"repair_code".to_string()));
    }
}
