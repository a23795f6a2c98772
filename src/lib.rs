//! # codenotes — code annotation and heuristic repair
//!
//! Two independent engines behind a small HTTP API, an MCP server and a CLI:
//! one explains a snippet by inserting comments above its significant lines,
//! the other repairs common mistakes in Python snippets.
//!
//! ## Architecture
//!
//! - **[`languages`]** — Supported languages, aliases and comment syntax
//! - **[`parser`]** — Tree-sitter structure for Python, line scanner for JavaScript and C
//! - **[`knowledge`]** — Identifier intent tables and special-name overrides
//! - **[`annotator`]** — Comment synthesis and placement
//! - **[`repair`]** — Ordered fix passes with a bounded syntax fixpoint
//! - **[`service`]** — Request/response wrappers shared by the front ends
//! - **[`http`]** — axum JSON API (`/analyze`, `/fix`, `/health`)
//! - **[`mcp`]** — MCP server with `annotate_code` and `repair_code` (stdio transport via rmcp)
//! - **[`config`]** — Configuration loading and validation

pub mod annotator;
pub mod config;
pub mod http;
pub mod knowledge;
pub mod languages;
pub mod mcp;
pub mod parser;
pub mod repair;
pub mod service;
pub mod text;

pub use annotator::{Annotated, AnnotateError, annotate, annotate_with};
pub use languages::Language;
pub use repair::{RepairResult, repair};
