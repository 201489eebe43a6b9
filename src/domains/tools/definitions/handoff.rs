//! Handoff document tools over the workspace `whats-next.md` file.
//!
//! The handoff document is overwritten on every write; it summarizes
//! completed work and the next steps for whoever (or whatever) picks the
//! work up.

use chrono::Local;
use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{error_result, route, success_result, tool_model};
use crate::core::config::Config;

/// Parameters for the write handoff tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteHandoffParams {
    /// Summary of the work completed.
    pub summary: String,

    /// Next steps for continuation.
    pub next_steps: String,

    /// Extra context worth carrying over.
    #[serde(default)]
    pub context: Option<String>,
}

/// Write handoff tool.
pub struct WriteHandoffTool;

impl WriteHandoffTool {
    pub const NAME: &'static str = "write_handoff";

    pub const DESCRIPTION: &'static str =
        "Write the workspace handoff document (whats-next.md), overwriting any previous one.";

    #[instrument(skip_all)]
    pub fn execute(params: &WriteHandoffParams, config: &Config) -> CallToolResult {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M");

        let mut content = format!(
            "# What's Next\n\n_Updated: {}_\n\n## Summary\n\n{}\n\n## Next Steps\n\n{}\n",
            timestamp, params.summary, params.next_steps
        );
        if let Some(context) = &params.context {
            content.push_str(&format!("\n## Context\n\n{}\n", context));
        }

        let path = config.workspace.handoff_file();
        if let Err(e) = fs::write(&path, content) {
            return error_result(&format!("Error: failed to write handoff: {}", e));
        }

        info!("Wrote handoff document to {}", path.display());
        success_result(format!("Handoff written to {}", path.display()))
    }

    pub fn to_tool() -> Tool {
        tool_model::<WriteHandoffParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the read handoff tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadHandoffParams {}

/// Read handoff tool.
pub struct ReadHandoffTool;

impl ReadHandoffTool {
    pub const NAME: &'static str = "read_handoff";

    pub const DESCRIPTION: &'static str =
        "Read the workspace handoff document (whats-next.md).";

    #[instrument(skip_all)]
    pub fn execute(_params: &ReadHandoffParams, config: &Config) -> CallToolResult {
        match fs::read_to_string(config.workspace.handoff_file()) {
            Ok(content) => success_result(content),
            Err(_) => success_result("No handoff document found".to_string()),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<ReadHandoffParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

#[cfg(test)]
mod tests {
    use super::super::common::result_text;
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn workspace_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.workspace.root = root.to_path_buf();
        config
    }

    #[test]
    fn test_write_then_read_handoff() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());

        let params = WriteHandoffParams {
            summary: "Implemented the parser".to_string(),
            next_steps: "Wire it into the CLI".to_string(),
            context: Some("Branch: feature/parser".to_string()),
        };
        let written = WriteHandoffTool::execute(&params, &config);
        assert!(written.is_error.is_none() || !written.is_error.unwrap());

        let read = ReadHandoffTool::execute(&ReadHandoffParams {}, &config);
        let text = result_text(&read);
        assert!(text.contains("## Summary"));
        assert!(text.contains("Implemented the parser"));
        assert!(text.contains("## Next Steps"));
        assert!(text.contains("## Context"));
        assert!(text.contains("Branch: feature/parser"));
    }

    #[test]
    fn test_write_overwrites_previous_handoff() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());

        let first = WriteHandoffParams {
            summary: "old".to_string(),
            next_steps: "old steps".to_string(),
            context: None,
        };
        WriteHandoffTool::execute(&first, &config);

        let second = WriteHandoffParams {
            summary: "new".to_string(),
            next_steps: "new steps".to_string(),
            context: None,
        };
        WriteHandoffTool::execute(&second, &config);

        let read = ReadHandoffTool::execute(&ReadHandoffParams {}, &config);
        let text = result_text(&read);
        assert!(text.contains("new"));
        assert!(!text.contains("old steps"));
        // No context section when none was given
        assert!(!text.contains("## Context"));
    }

    #[test]
    fn test_read_missing_handoff() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let result = ReadHandoffTool::execute(&ReadHandoffParams {}, &config);
        assert_eq!(result_text(&result), "No handoff document found");
    }
}
