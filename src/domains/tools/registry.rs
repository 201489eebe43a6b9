//! Tool Registry - central listing of all available tools.
//!
//! The registry is the single source of truth for tool metadata; the router
//! test asserts it stays in sync with the routes.

use rmcp::model::Tool;

use super::definitions::{
    AddNoteTool, AddTodoTool, CheckBuildTool, CompleteTodoTool, DeleteNoteTool, FlipCoinTool,
    GenerateToolTool, GetForecastTool, GetProjectContextTool, GetSharedAgentTool,
    GetSharedCommandTool, GetSharedContextTool, GetSharedSkillTool, GetWeatherTool, GitDiffTool,
    GitLogTool, GitStatusTool, ListNotesTool, ListProjectsTool, ListSharedAgentsTool,
    ListSharedCommandsTool, ListSharedContextTool, ListSharedSkillsTool, ListTimeEntriesTool,
    ListTodosTool, LogTimeTool, RandomChoiceTool, RandomNumberTool, ReadHandoffTool,
    RollDiceTool, RunNpmScriptTool, SearchNotesTool, StartTimerTool, StopTimerTool,
    TimeSummaryTool, WriteHandoffTool,
};

/// Tool registry - lists all available tools.
pub struct ToolRegistry;

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            ListProjectsTool::NAME,
            GetProjectContextTool::NAME,
            GitStatusTool::NAME,
            GitDiffTool::NAME,
            GitLogTool::NAME,
            ListSharedCommandsTool::NAME,
            GetSharedCommandTool::NAME,
            ListSharedSkillsTool::NAME,
            GetSharedSkillTool::NAME,
            ListSharedAgentsTool::NAME,
            GetSharedAgentTool::NAME,
            ListSharedContextTool::NAME,
            GetSharedContextTool::NAME,
            RunNpmScriptTool::NAME,
            CheckBuildTool::NAME,
            AddTodoTool::NAME,
            ListTodosTool::NAME,
            CompleteTodoTool::NAME,
            WriteHandoffTool::NAME,
            ReadHandoffTool::NAME,
            StartTimerTool::NAME,
            StopTimerTool::NAME,
            LogTimeTool::NAME,
            ListTimeEntriesTool::NAME,
            TimeSummaryTool::NAME,
            RollDiceTool::NAME,
            FlipCoinTool::NAME,
            RandomChoiceTool::NAME,
            RandomNumberTool::NAME,
            GetWeatherTool::NAME,
            GetForecastTool::NAME,
            AddNoteTool::NAME,
            ListNotesTool::NAME,
            SearchNotesTool::NAME,
            DeleteNoteTool::NAME,
            GenerateToolTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            ListProjectsTool::to_tool(),
            GetProjectContextTool::to_tool(),
            GitStatusTool::to_tool(),
            GitDiffTool::to_tool(),
            GitLogTool::to_tool(),
            ListSharedCommandsTool::to_tool(),
            GetSharedCommandTool::to_tool(),
            ListSharedSkillsTool::to_tool(),
            GetSharedSkillTool::to_tool(),
            ListSharedAgentsTool::to_tool(),
            GetSharedAgentTool::to_tool(),
            ListSharedContextTool::to_tool(),
            GetSharedContextTool::to_tool(),
            RunNpmScriptTool::to_tool(),
            CheckBuildTool::to_tool(),
            AddTodoTool::to_tool(),
            ListTodosTool::to_tool(),
            CompleteTodoTool::to_tool(),
            WriteHandoffTool::to_tool(),
            ReadHandoffTool::to_tool(),
            StartTimerTool::to_tool(),
            StopTimerTool::to_tool(),
            LogTimeTool::to_tool(),
            ListTimeEntriesTool::to_tool(),
            TimeSummaryTool::to_tool(),
            RollDiceTool::to_tool(),
            FlipCoinTool::to_tool(),
            RandomChoiceTool::to_tool(),
            RandomNumberTool::to_tool(),
            GetWeatherTool::to_tool(),
            GetForecastTool::to_tool(),
            AddNoteTool::to_tool(),
            ListNotesTool::to_tool(),
            SearchNotesTool::to_tool(),
            DeleteNoteTool::to_tool(),
            GenerateToolTool::to_tool(),
        ]
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::new();
        let names = registry.tool_names();
        assert_eq!(names.len(), 36);
        assert!(names.contains(&"list_projects"));
        assert!(names.contains(&"get_project_context"));
        assert!(names.contains(&"git_status"));
        assert!(names.contains(&"get_shared_skill"));
        assert!(names.contains(&"check_build"));
        assert!(names.contains(&"add_todo"));
        assert!(names.contains(&"read_handoff"));
        assert!(names.contains(&"start_timer"));
        assert!(names.contains(&"flip_coin"));
        assert!(names.contains(&"get_weather"));
        assert!(names.contains(&"delete_note"));
        assert!(names.contains(&"generate_tool"));
    }

    #[test]
    fn test_registry_names_are_unique() {
        let registry = ToolRegistry::new();
        let names = registry.tool_names();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn test_all_tools_have_descriptions() {
        for tool in ToolRegistry::get_all_tools() {
            assert!(tool.description.is_some(), "{} lacks a description", tool.name);
            assert!(!tool.description.as_ref().unwrap().is_empty());
        }
    }
}
