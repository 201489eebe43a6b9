//! Shared MCP toolbox for AI coding CLIs.
//!
//! This crate provides the `ai-cli` binary: a one-shot workspace initializer
//! (`--init`) and a long-running MCP server exposing workspace tools over
//! stdio.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and its stdio
//!   transport
//! - **convert**: tier classification and format conversion for shared
//!   command/agent documents (Gemini TOML, Copilot agent markdown)
//! - **init**: the workspace initializer
//! - **domains::tools**: the tool catalog — one definition file per tool
//!   category, wired through an explicit registry and router

pub mod convert;
pub mod core;
pub mod domains;
pub mod init;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, McpServer, Result};
