//! Todo store tools over the workspace `TO-DOS.md` file.
//!
//! Todos are markdown list entries grouped under timestamped `##` headings.
//! `add_todo` appends a fresh heading plus one entry; `complete_todo` removes
//! an entry by exact `- **title**` match and cleans up emptied headings and
//! runs of blank lines.

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

/// Parameters for the add todo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddTodoParams {
    /// Short title of the todo.
    pub title: String,

    /// What the problem is.
    pub problem: String,

    /// Files involved, if known.
    #[serde(default)]
    pub files: Option<String>,

    /// Proposed solution, if known.
    #[serde(default)]
    pub solution: Option<String>,
}

/// Add todo tool.
pub struct AddTodoTool;

impl AddTodoTool {
    pub const NAME: &'static str = "add_todo";

    pub const DESCRIPTION: &'static str =
        "Add a todo to the workspace TO-DOS.md with a title, problem description, and optional files/solution.";

    #[instrument(skip_all, fields(title = %params.title))]
    pub fn execute(params: &AddTodoParams, config: &Config) -> CallToolResult {
        let path = config.workspace.todos_file();

        let mut content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => "# TO-DOS\n".to_string(),
        };

        let timestamp = Local::now().format("%Y-%m-%d %H:%M");
        content.push_str(&format!("\n## {}\n\n- **{}**\n", timestamp, params.title));
        content.push_str(&format!("  - Problem: {}\n", params.problem));
        if let Some(files) = &params.files {
            content.push_str(&format!("  - Files: {}\n", files));
        }
        if let Some(solution) = &params.solution {
            content.push_str(&format!("  - Solution: {}\n", solution));
        }

        if let Err(e) = fs::write(&path, content) {
            return error_result(&format!("Error: failed to write todos: {}", e));
        }

        info!("Added todo: {}", params.title);
        success_result(format!("Added todo: {}", params.title))
    }

    pub fn to_tool() -> Tool {
        tool_model::<AddTodoParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the list todos tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTodosParams {}

/// List todos tool.
pub struct ListTodosTool;

impl ListTodosTool {
    pub const NAME: &'static str = "list_todos";

    pub const DESCRIPTION: &'static str = "List all todos from the workspace TO-DOS.md.";

    #[instrument(skip_all)]
    pub fn execute(_params: &ListTodosParams, config: &Config) -> CallToolResult {
        match fs::read_to_string(config.workspace.todos_file()) {
            Ok(content) => success_result(content),
            Err(_) => success_result("No todos found".to_string()),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListTodosParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the complete todo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompleteTodoParams {
    /// Exact title of the todo to complete.
    pub title: String,
}

/// Complete todo tool.
pub struct CompleteTodoTool;

impl CompleteTodoTool {
    pub const NAME: &'static str = "complete_todo";

    pub const DESCRIPTION: &'static str =
        "Complete (remove) a todo from TO-DOS.md by its exact title.";

    #[instrument(skip_all, fields(title = %params.title))]
    pub fn execute(params: &CompleteTodoParams, config: &Config) -> CallToolResult {
        let path = config.workspace.todos_file();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return error_result(&format!("Error: Todo '{}' not found", params.title)),
        };

        let needle = format!("- **{}**", params.title);
        if !content.contains(&needle) {
            // File left untouched
            return error_result(&format!("Error: Todo '{}' not found", params.title));
        }

        let updated = remove_entry(&content, &needle);
        if let Err(e) = fs::write(&path, updated) {
            return error_result(&format!("Error: failed to write todos: {}", e));
        }

        info!("Completed todo: {}", params.title);
        success_result(format!("Completed todo: {}", params.title))
    }

    pub fn to_tool() -> Tool {
        tool_model::<CompleteTodoParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Remove the entry matching `needle` (its list line plus indented detail
/// lines), then drop headings left without entries and collapse runs of two
/// or more blank lines.
fn remove_entry(content: &str, needle: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();

    let Some(start) = lines.iter().position(|line| line.contains(needle)) else {
        return content.to_string();
    };

    let mut end = start + 1;
    while end < lines.len()
        && lines[end].starts_with(char::is_whitespace)
        && !lines[end].trim().is_empty()
    {
        end += 1;
    }

    let mut remaining: Vec<&str> = Vec::with_capacity(lines.len());
    remaining.extend(&lines[..start]);
    remaining.extend(&lines[end..]);

    let without_empty_headings = drop_empty_headings(&remaining);
    collapse_blank_runs(&without_empty_headings)
}

/// Drop `##` headings that have no `- ` entries before the next heading.
fn drop_empty_headings<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut result = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("## ") {
            let mut j = i + 1;
            let mut has_entry = false;
            while j < lines.len() && !lines[j].starts_with('#') {
                if lines[j].trim_start().starts_with("- ") {
                    has_entry = true;
                }
                j += 1;
            }
            if !has_entry {
                // Skip the heading; its (blank) section lines collapse later
                i += 1;
                continue;
            }
        }
        result.push(line);
        i += 1;
    }

    result
}

/// Collapse runs of two or more blank lines into a single blank line.
fn collapse_blank_runs(lines: &[&str]) -> String {
    let mut result = String::new();
    let mut previous_blank = false;

    for line in lines {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        result.push_str(line);
        result.push('\n');
        previous_blank = blank;
    }

    result
}
