//! MCP server implementation and lifecycle management.
//!
//! ## Tool architecture
//!
//! Tools are defined in `domains/tools/definitions/`, grouped by category.
//! Each tool defines a params struct, an `execute()` function, and a
//! `create_route()` constructor. The ToolRouter is built once at startup in
//! `domains/tools/router.rs`; adding a new tool does not require modifying
//! this file.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use crate::domains::tools::build_tool_router;

/// The main MCP server handler.
///
/// Holds the shared configuration and the tool router; all protocol
/// dispatch is generated by the `#[tool_handler]` macro.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration, shared with every tool route.
    config: Arc<Config>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        Self {
            tool_router: build_tool_router::<Self>(config.clone()),
            config,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Shared workspace tools for AI coding CLIs: project inspection, git, \
                 shared commands/skills/agents/context, npm scripts, todos, handoff \
                 notes, time tracking, notes, and small utilities."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_reports_identity() {
        let server = McpServer::new(Config::default());
        assert_eq!(server.name(), "ai-cli");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_server_advertises_tools() {
        let server = McpServer::new(Config::default());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
    }
}
