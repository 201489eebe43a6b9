//! Project listing and inspection tools.

use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{blocking_route, error_result, json_result, tool_model};
use crate::core::config::Config;

/// Parameters for the list projects tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListProjectsParams {}

/// List projects tool - enumerates workspace subdirectories with status.
pub struct ListProjectsTool;

impl ListProjectsTool {
    pub const NAME: &'static str = "list_projects";

    pub const DESCRIPTION: &'static str =
        "List all projects in the workspace with their status: package name/version, git presence and dirty state, and Claude/Gemini config markers.";

    #[instrument(skip_all)]
    pub fn execute(_params: &ListProjectsParams, config: &Config) -> CallToolResult {
        info!("Listing projects in {}", config.workspace.root.display());

        let entries = match fs::read_dir(&config.workspace.root) {
            Ok(entries) => entries,
            Err(e) => return error_result(&format!("Error: failed to read workspace: {}", e)),
        };

        let mut dirs: Vec<_> = entries
            .flatten()
            .filter(|e| {
                e.path().is_dir() && !e.file_name().to_string_lossy().starts_with('.')
            })
            .collect();
        dirs.sort_by_key(|e| e.file_name());

        let mut projects = Vec::new();
        for entry in dirs {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            let mut info = serde_json::Map::new();
            info.insert("name".into(), name.into());
            info.insert("path".into(), path.to_string_lossy().to_string().into());

            // Malformed package.json silently omits the fields
            if let Some(pkg) = read_package_json(&path) {
                info.insert(
                    "type".into(),
                    pkg.get("name").and_then(|v| v.as_str()).unwrap_or("unknown").into(),
                );
                info.insert(
                    "version".into(),
                    pkg.get("version").and_then(|v| v.as_str()).unwrap_or("unknown").into(),
                );
            }

            if path.join(".git").exists() {
                info.insert("git".into(), true.into());
                if let Some(dirty) = git_dirty(&path) {
                    info.insert("dirty".into(), dirty.into());
                }
            }

            info.insert(
                "has_claude".into(),
                (path.join(".claude").exists() || path.join("CLAUDE.md").exists()).into(),
            );
            info.insert(
                "has_gemini".into(),
                (path.join(".gemini").exists() || path.join("GEMINI.md").exists()).into(),
            );

            projects.push(serde_json::Value::Object(info));
        }

        json_result(&projects)
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListProjectsParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the get project context tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetProjectContextParams {
    /// Name of the project directory inside the workspace.
    pub project_name: String,
}

/// Get project context tool - CLAUDE.md, package.json, and top-level layout.
pub struct GetProjectContextTool;

impl GetProjectContextTool {
    pub const NAME: &'static str = "get_project_context";

    pub const DESCRIPTION: &'static str =
        "Get the full context for a project including its CLAUDE.md, package.json, and top-level file structure.";

    #[instrument(skip_all, fields(project = %params.project_name))]
    pub fn execute(params: &GetProjectContextParams, config: &Config) -> CallToolResult {
        let project_path = config.workspace.project_dir(&params.project_name);

        if !project_path.exists() {
            return error_result(&format!(
                "Error: Project '{}' not found in {}",
                params.project_name,
                config.workspace.root.display()
            ));
        }

        let mut context = serde_json::Map::new();
        context.insert("project".into(), params.project_name.clone().into());
        context.insert(
            "path".into(),
            project_path.to_string_lossy().to_string().into(),
        );

        if let Ok(claude_md) = fs::read_to_string(project_path.join("CLAUDE.md")) {
            context.insert("claude_md".into(), claude_md.into());
        }

        let pkg_path = project_path.join("package.json");
        if pkg_path.exists() {
            match fs::read_to_string(&pkg_path)
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string())
                }) {
                Ok(pkg) => {
                    context.insert("package".into(), pkg);
                }
                Err(e) => {
                    context.insert("package_error".into(), e.into());
                }
            }
        }

        let mut structure: Vec<String> = fs::read_dir(&project_path)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .filter(|name| !name.starts_with('.') && name != "node_modules")
                    .collect()
            })
            .unwrap_or_default();
        structure.sort();
        structure.truncate(20);
        context.insert(
            "structure".into(),
            serde_json::Value::Array(structure.into_iter().map(Into::into).collect()),
        );

        json_result(&serde_json::Value::Object(context))
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetProjectContextParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parse a project's package.json, returning None when missing or malformed.
fn read_package_json(project: &Path) -> Option<serde_json::Value> {
    let text = fs::read_to_string(project.join("package.json")).ok()?;
    serde_json::from_str(&text).ok()
}

/// Whether a git working tree has uncommitted changes. None when git itself
/// cannot be invoked.
fn git_dirty(project: &Path) -> Option<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(project)
        .output()
        .ok()?;
    Some(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
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
    fn test_list_projects_reads_package_json() {
        let workspace = TempDir::new().unwrap();
        let project = workspace.path().join("my-app");
        fs::create_dir_all(&project).unwrap();
        fs::write(
            project.join("package.json"),
            r#"{"name": "my-app", "version": "1.2.3"}"#,
        )
        .unwrap();
        fs::write(project.join("CLAUDE.md"), "instructions").unwrap();

        let config = workspace_config(workspace.path());
        let result = ListProjectsTool::execute(&ListProjectsParams {}, &config);
        assert!(result.is_error.is_none() || !result.is_error.unwrap());

        let projects: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();
        assert_eq!(projects[0]["name"], "my-app");
        assert_eq!(projects[0]["type"], "my-app");
        assert_eq!(projects[0]["version"], "1.2.3");
        assert_eq!(projects[0]["has_claude"], true);
        assert_eq!(projects[0]["has_gemini"], false);
    }

    #[test]
    fn test_list_projects_skips_hidden_and_tolerates_bad_json() {
        let workspace = TempDir::new().unwrap();
        fs::create_dir_all(workspace.path().join(".hidden")).unwrap();
        let project = workspace.path().join("broken");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("package.json"), "{not json").unwrap();

        let config = workspace_config(workspace.path());
        let result = ListProjectsTool::execute(&ListProjectsParams {}, &config);
        let projects: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();

        let list = projects.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "broken");
        // Malformed package.json omits the fields entirely
        assert!(list[0].get("type").is_none());
        assert!(list[0].get("version").is_none());
    }

    #[test]
    fn test_get_project_context_missing_project() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let params = GetProjectContextParams {
            project_name: "nope".to_string(),
        };
        let result = GetProjectContextTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("not found"));
    }

    #[test]
    fn test_get_project_context_reports_package_error() {
        let workspace = TempDir::new().unwrap();
        let project = workspace.path().join("app");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("package.json"), "nope{").unwrap();
        fs::write(project.join("index.ts"), "").unwrap();
        fs::create_dir_all(project.join("node_modules")).unwrap();

        let config = workspace_config(workspace.path());
        let params = GetProjectContextParams {
            project_name: "app".to_string(),
        };
        let result = GetProjectContextTool::execute(&params, &config);
        let context: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();

        assert!(context.get("package").is_none());
        assert!(context["package_error"].as_str().is_some());
        let structure = context["structure"].as_array().unwrap();
        assert!(structure.contains(&serde_json::json!("index.ts")));
        assert!(!structure.contains(&serde_json::json!("node_modules")));
    }
}
