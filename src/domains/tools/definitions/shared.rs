//! Shared resource tools: commands, skills, agents, and context documents.
//!
//! Resources come from the workspace-local `.ai-cli/shared` directory when it
//! exists and from the bundled package root otherwise. Listing a missing
//! directory yields an empty list; fetching a missing resource yields an
//! `Error: ... not found` string.

use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

use super::common::{error_result, json_result, route, success_result, tool_model};
use crate::core::config::Config;

/// Collect `*.md` files under `dir` recursively, named by their
/// extension-less path relative to `base`.
fn collect_md_recursive(dir: &Path, base: &Path, out: &mut Vec<serde_json::Value>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_md_recursive(&path, base, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            let rel = path.strip_prefix(base).unwrap_or(&path).with_extension("");
            out.push(serde_json::json!({
                "name": rel.to_string_lossy(),
                "file": path.to_string_lossy(),
            }));
        }
    }
}

/// List top-level `*.md` files in a directory as `{name, file}` records.
fn list_flat_md(dir: &Path) -> Vec<serde_json::Value> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|p| {
            let stem = p.file_stem()?.to_str()?;
            Some(serde_json::json!({
                "name": stem,
                "file": p.to_string_lossy(),
            }))
        })
        .collect()
}

/// Read a resource file, or report it missing with the given label.
fn read_resource(path: &Path, kind: &str, name: &str) -> CallToolResult {
    match fs::read_to_string(path) {
        Ok(content) => success_result(content),
        Err(_) => error_result(&format!("Error: {} '{}' not found", kind, name)),
    }
}

/// Empty parameter set shared by the listing tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListResourceParams {}

/// Parameters naming a single resource.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCommandParams {
    /// Command name; subdirectory commands use a `dir/name` path.
    pub command_name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetSkillParams {
    /// Skill directory name.
    pub skill_name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetAgentParams {
    /// Agent name (file stem).
    pub agent_name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetContextParams {
    /// Context document name (file stem).
    pub context_name: String,
}

/// List shared commands tool.
pub struct ListSharedCommandsTool;

impl ListSharedCommandsTool {
    pub const NAME: &'static str = "list_shared_commands";

    pub const DESCRIPTION: &'static str =
        "List all available shared commands, including subdirectory commands.";

    #[instrument(skip_all)]
    pub fn execute(_params: &ListResourceParams, config: &Config) -> CallToolResult {
        let dir = config.workspace.commands_dir();
        let mut commands = Vec::new();
        collect_md_recursive(&dir, &dir, &mut commands);
        json_result(&commands)
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListResourceParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Get shared command tool.
pub struct GetSharedCommandTool;

impl GetSharedCommandTool {
    pub const NAME: &'static str = "get_shared_command";

    pub const DESCRIPTION: &'static str = "Get the content of a shared command.";

    #[instrument(skip_all, fields(command = %params.command_name))]
    pub fn execute(params: &GetCommandParams, config: &Config) -> CallToolResult {
        let path = config
            .workspace
            .commands_dir()
            .join(format!("{}.md", params.command_name));
        read_resource(&path, "Command", &params.command_name)
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetCommandParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// List shared skills tool.
pub struct ListSharedSkillsTool;

impl ListSharedSkillsTool {
    pub const NAME: &'static str = "list_shared_skills";

    pub const DESCRIPTION: &'static str =
        "List all available shared skills. Each skill is a directory containing a SKILL.md.";

    #[instrument(skip_all)]
    pub fn execute(_params: &ListResourceParams, config: &Config) -> CallToolResult {
        let dir = config.workspace.skills_dir();
        let mut skills = Vec::new();

        if let Ok(entries) = fs::read_dir(&dir) {
            let mut dirs: Vec<_> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            dirs.sort();

            for skill_dir in dirs {
                let skill_file = skill_dir.join("SKILL.md");
                if skill_file.exists() {
                    if let Some(name) = skill_dir.file_name().and_then(|n| n.to_str()) {
                        skills.push(serde_json::json!({
                            "name": name,
                            "file": skill_file.to_string_lossy(),
                        }));
                    }
                }
            }
        }

        json_result(&skills)
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListResourceParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Get shared skill tool.
pub struct GetSharedSkillTool;

impl GetSharedSkillTool {
    pub const NAME: &'static str = "get_shared_skill";

    pub const DESCRIPTION: &'static str = "Get the content of a shared skill.";

    #[instrument(skip_all, fields(skill = %params.skill_name))]
    pub fn execute(params: &GetSkillParams, config: &Config) -> CallToolResult {
        let path = config
            .workspace
            .skills_dir()
            .join(&params.skill_name)
            .join("SKILL.md");
        read_resource(&path, "Skill", &params.skill_name)
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetSkillParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// List shared agents tool.
pub struct ListSharedAgentsTool;

impl ListSharedAgentsTool {
    pub const NAME: &'static str = "list_shared_agents";

    pub const DESCRIPTION: &'static str = "List all available shared agents.";

    #[instrument(skip_all)]
    pub fn execute(_params: &ListResourceParams, config: &Config) -> CallToolResult {
        json_result(&list_flat_md(&config.workspace.agents_dir()))
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListResourceParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Get shared agent tool.
pub struct GetSharedAgentTool;

impl GetSharedAgentTool {
    pub const NAME: &'static str = "get_shared_agent";

    pub const DESCRIPTION: &'static str = "Get the content of a shared agent.";

    #[instrument(skip_all, fields(agent = %params.agent_name))]
    pub fn execute(params: &GetAgentParams, config: &Config) -> CallToolResult {
        let path = config
            .workspace
            .agents_dir()
            .join(format!("{}.md", params.agent_name));
        read_resource(&path, "Agent", &params.agent_name)
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetAgentParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// List shared context documents tool.
pub struct ListSharedContextTool;

impl ListSharedContextTool {
    pub const NAME: &'static str = "list_shared_context";

    pub const DESCRIPTION: &'static str = "List all available shared context documents.";

    #[instrument(skip_all)]
    pub fn execute(_params: &ListResourceParams, config: &Config) -> CallToolResult {
        json_result(&list_flat_md(&config.workspace.context_dir()))
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListResourceParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Get shared context document tool.
pub struct GetSharedContextTool;

impl GetSharedContextTool {
    pub const NAME: &'static str = "get_shared_context";

    pub const DESCRIPTION: &'static str = "Get the content of a shared context document.";

    #[instrument(skip_all, fields(context = %params.context_name))]
    pub fn execute(params: &GetContextParams, config: &Config) -> CallToolResult {
        let path = config
            .workspace
            .context_dir()
            .join(format!("{}.md", params.context_name));
        read_resource(&path, "Context", &params.context_name)
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetContextParams>(Self::NAME, Self::DESCRIPTION)
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
    use tempfile::TempDir;

    /// Config whose shared dir is the workspace-local override.
    fn shared_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.workspace.root = root.to_path_buf();
        config
    }

    fn seed(root: &Path) {
        let shared = root.join(".ai-cli").join("shared");
        fs::create_dir_all(shared.join("commands").join("consider")).unwrap();
        fs::create_dir_all(shared.join("skills").join("create-plans")).unwrap();
        fs::create_dir_all(shared.join("skills").join("no-manifest")).unwrap();
        fs::create_dir_all(shared.join("agents")).unwrap();
        fs::create_dir_all(shared.join("context")).unwrap();

        fs::write(shared.join("commands").join("debug.md"), "debug body").unwrap();
        fs::write(shared.join("commands").join("consider").join("pareto.md"), "80/20").unwrap();
        fs::write(
            shared.join("skills").join("create-plans").join("SKILL.md"),
            "plan skill",
        )
        .unwrap();
        fs::write(shared.join("agents").join("mentor.md"), "mentor body").unwrap();
        fs::write(shared.join("context").join("stack.md"), "stack doc").unwrap();
    }

    #[test]
    fn test_list_commands_recurses_subdirectories() {
        let workspace = TempDir::new().unwrap();
        seed(workspace.path());
        let config = shared_config(workspace.path());

        let result = ListSharedCommandsTool::execute(&ListResourceParams {}, &config);
        let commands: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();
        let names: Vec<&str> = commands
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"debug"));
        assert!(names.contains(&"consider/pareto"));
    }

    #[test]
    fn test_get_command_by_relative_path() {
        let workspace = TempDir::new().unwrap();
        seed(workspace.path());
        let config = shared_config(workspace.path());

        let params = GetCommandParams {
            command_name: "consider/pareto".to_string(),
        };
        let result = GetSharedCommandTool::execute(&params, &config);
        assert_eq!(result_text(&result), "80/20");
    }

    #[test]
    fn test_get_command_not_found() {
        let workspace = TempDir::new().unwrap();
        seed(workspace.path());
        let config = shared_config(workspace.path());

        let params = GetCommandParams {
            command_name: "missing".to_string(),
        };
        let result = GetSharedCommandTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert_eq!(result_text(&result), "Error: Command 'missing' not found");
    }

    #[test]
    fn test_list_skills_requires_manifest() {
        let workspace = TempDir::new().unwrap();
        seed(workspace.path());
        let config = shared_config(workspace.path());

        let result = ListSharedSkillsTool::execute(&ListResourceParams {}, &config);
        let skills: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();
        let list = skills.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "create-plans");
    }

    #[test]
    fn test_get_skill_and_agent_and_context() {
        let workspace = TempDir::new().unwrap();
        seed(workspace.path());
        let config = shared_config(workspace.path());

        let skill = GetSharedSkillTool::execute(
            &GetSkillParams {
                skill_name: "create-plans".to_string(),
            },
            &config,
        );
        assert_eq!(result_text(&skill), "plan skill");

        let agent = GetSharedAgentTool::execute(
            &GetAgentParams {
                agent_name: "mentor".to_string(),
            },
            &config,
        );
        assert_eq!(result_text(&agent), "mentor body");

        let context = GetSharedContextTool::execute(
            &GetContextParams {
                context_name: "stack".to_string(),
            },
            &config,
        );
        assert_eq!(result_text(&context), "stack doc");
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let workspace = TempDir::new().unwrap();
        let mut config = Config::default();
        config.workspace.root = workspace.path().to_path_buf();
        config.workspace.package_root = workspace.path().join("nothing-here");

        let result = ListSharedAgentsTool::execute(&ListResourceParams {}, &config);
        let agents: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();
        assert!(agents.as_array().unwrap().is_empty());
    }
}
