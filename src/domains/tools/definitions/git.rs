//! Git passthrough tools.
//!
//! Each tool is a direct blocking invocation of the `git` executable in a
//! project directory; stdout (or stderr when stdout is empty) is returned
//! verbatim, and invocation failures become error strings.

use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{blocking_route, error_result, success_result, tool_model};
use crate::core::config::Config;

/// Run git with the given args, returning stdout (stderr when empty).
fn run_git(project_path: &Path, args: &[&str]) -> CallToolResult {
    match Command::new("git").args(args).current_dir(project_path).output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            if stdout.is_empty() {
                success_result(String::from_utf8_lossy(&output.stderr).to_string())
            } else {
                success_result(stdout)
            }
        }
        Err(e) => error_result(&format!("Error: {}", e)),
    }
}

/// Parameters for the git status tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GitStatusParams {
    /// Name of the project directory inside the workspace.
    pub project_name: String,
}

/// Git status tool.
pub struct GitStatusTool;

impl GitStatusTool {
    pub const NAME: &'static str = "git_status";

    pub const DESCRIPTION: &'static str = "Get git status for a project in the workspace.";

    #[instrument(skip_all, fields(project = %params.project_name))]
    pub fn execute(params: &GitStatusParams, config: &Config) -> CallToolResult {
        let project_path = config.workspace.project_dir(&params.project_name);

        if !project_path.exists() {
            return error_result(&format!("Error: Project '{}' not found", params.project_name));
        }
        if !project_path.join(".git").exists() {
            return error_result(&format!(
                "Error: Project '{}' is not a git repository",
                params.project_name
            ));
        }

        info!("git status in {}", project_path.display());
        run_git(&project_path, &["status"])
    }

    pub fn to_tool() -> Tool {
        tool_model::<GitStatusParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the git diff tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GitDiffParams {
    /// Name of the project directory inside the workspace.
    pub project_name: String,

    /// Show staged changes only.
    #[serde(default)]
    pub staged: bool,
}

/// Git diff tool.
pub struct GitDiffTool;

impl GitDiffTool {
    pub const NAME: &'static str = "git_diff";

    pub const DESCRIPTION: &'static str =
        "Get git diff for a project. Set staged=true for staged changes only.";

    #[instrument(skip_all, fields(project = %params.project_name, staged = params.staged))]
    pub fn execute(params: &GitDiffParams, config: &Config) -> CallToolResult {
        let project_path = config.workspace.project_dir(&params.project_name);

        if !project_path.exists() {
            return error_result(&format!("Error: Project '{}' not found", params.project_name));
        }

        let mut args = vec!["diff"];
        if params.staged {
            args.push("--staged");
        }

        match Command::new("git").args(&args).current_dir(&project_path).output() {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                if stdout.is_empty() {
                    success_result("No changes".to_string())
                } else {
                    success_result(stdout)
                }
            }
            Err(e) => error_result(&format!("Error: {}", e)),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<GitDiffParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

fn default_log_count() -> u32 {
    10
}

/// Parameters for the git log tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GitLogParams {
    /// Name of the project directory inside the workspace.
    pub project_name: String,

    /// Number of commits to show.
    #[serde(default = "default_log_count")]
    pub count: u32,
}

/// Git log tool.
pub struct GitLogTool;

impl GitLogTool {
    pub const NAME: &'static str = "git_log";

    pub const DESCRIPTION: &'static str =
        "Get recent git commits for a project, one line per commit.";

    #[instrument(skip_all, fields(project = %params.project_name, count = params.count))]
    pub fn execute(params: &GitLogParams, config: &Config) -> CallToolResult {
        let project_path = config.workspace.project_dir(&params.project_name);

        if !project_path.exists() {
            return error_result(&format!("Error: Project '{}' not found", params.project_name));
        }

        let count_arg = format!("-{}", params.count);
        run_git(&project_path, &["log", &count_arg, "--oneline", "--decorate"])
    }

    pub fn to_tool() -> Tool {
        tool_model::<GitLogParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

#[cfg(test)]
mod tests {
    use super::super::common::result_text;
    use super::*;
    use tempfile::TempDir;

    fn workspace_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.workspace.root = root.to_path_buf();
        config
    }

    #[test]
    fn test_git_status_missing_project() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let params = GitStatusParams {
            project_name: "ghost".to_string(),
        };
        let result = GitStatusTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("not found"));
    }

    #[test]
    fn test_git_status_not_a_repository() {
        let workspace = TempDir::new().unwrap();
        std::fs::create_dir_all(workspace.path().join("plain")).unwrap();
        let config = workspace_config(workspace.path());
        let params = GitStatusParams {
            project_name: "plain".to_string(),
        };
        let result = GitStatusTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("not a git repository"));
    }

    #[test]
    fn test_git_diff_clean_tree_reports_no_changes() {
        let workspace = TempDir::new().unwrap();
        let project = workspace.path().join("repo");
        std::fs::create_dir_all(&project).unwrap();
        let init = Command::new("git").arg("init").current_dir(&project).output();
        if init.map(|o| !o.status.success()).unwrap_or(true) {
            return; // git unavailable in this environment
        }

        let config = workspace_config(workspace.path());
        let params = GitDiffParams {
            project_name: "repo".to_string(),
            staged: false,
        };
        let result = GitDiffTool::execute(&params, &config);
        assert_eq!(result_text(&result), "No changes");
    }

    #[test]
    fn test_git_log_missing_project() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let params = GitLogParams {
            project_name: "ghost".to_string(),
            count: 5,
        };
        let result = GitLogTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
    }
}
