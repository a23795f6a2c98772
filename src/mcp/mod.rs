//! MCP front end: stdio transport and tool handlers.

pub mod server;
pub mod tools;
