//! Tool Router - builds the rmcp ToolRouter from the definitions.
//!
//! Each tool knows how to create its own route; this module just assembles
//! them. The router is built once at server startup.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::config::Config;

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

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(config: Arc<Config>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(ListProjectsTool::create_route(config.clone()))
        .with_route(GetProjectContextTool::create_route(config.clone()))
        .with_route(GitStatusTool::create_route(config.clone()))
        .with_route(GitDiffTool::create_route(config.clone()))
        .with_route(GitLogTool::create_route(config.clone()))
        .with_route(ListSharedCommandsTool::create_route(config.clone()))
        .with_route(GetSharedCommandTool::create_route(config.clone()))
        .with_route(ListSharedSkillsTool::create_route(config.clone()))
        .with_route(GetSharedSkillTool::create_route(config.clone()))
        .with_route(ListSharedAgentsTool::create_route(config.clone()))
        .with_route(GetSharedAgentTool::create_route(config.clone()))
        .with_route(ListSharedContextTool::create_route(config.clone()))
        .with_route(GetSharedContextTool::create_route(config.clone()))
        .with_route(RunNpmScriptTool::create_route(config.clone()))
        .with_route(CheckBuildTool::create_route(config.clone()))
        .with_route(AddTodoTool::create_route(config.clone()))
        .with_route(ListTodosTool::create_route(config.clone()))
        .with_route(CompleteTodoTool::create_route(config.clone()))
        .with_route(WriteHandoffTool::create_route(config.clone()))
        .with_route(ReadHandoffTool::create_route(config.clone()))
        .with_route(StartTimerTool::create_route(config.clone()))
        .with_route(StopTimerTool::create_route(config.clone()))
        .with_route(LogTimeTool::create_route(config.clone()))
        .with_route(ListTimeEntriesTool::create_route(config.clone()))
        .with_route(TimeSummaryTool::create_route(config.clone()))
        .with_route(RollDiceTool::create_route(config.clone()))
        .with_route(FlipCoinTool::create_route(config.clone()))
        .with_route(RandomChoiceTool::create_route(config.clone()))
        .with_route(RandomNumberTool::create_route(config.clone()))
        .with_route(GetWeatherTool::create_route(config.clone()))
        .with_route(GetForecastTool::create_route(config.clone()))
        .with_route(AddNoteTool::create_route(config.clone()))
        .with_route(ListNotesTool::create_route(config.clone()))
        .with_route(SearchNotesTool::create_route(config.clone()))
        .with_route(DeleteNoteTool::create_route(config.clone()))
        .with_route(GenerateToolTool::create_route(config))
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;

    struct TestServer {}

    fn test_config() -> Arc<Config> {
        Arc::new(Config::default())
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_config());
        let tools = router.list_all();
        assert_eq!(tools.len(), 36);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"list_projects"));
        assert!(names.contains(&"git_status"));
        assert!(names.contains(&"list_shared_commands"));
        assert!(names.contains(&"get_shared_context"));
        assert!(names.contains(&"run_npm_script"));
        assert!(names.contains(&"complete_todo"));
        assert!(names.contains(&"write_handoff"));
        assert!(names.contains(&"time_summary"));
        assert!(names.contains(&"roll_dice"));
        assert!(names.contains(&"get_forecast"));
        assert!(names.contains(&"search_notes"));
        assert!(names.contains(&"generate_tool"));
    }

    #[test]
    fn test_registry_matches_router() {
        // Ensure registry and router have the same tools
        let registry = ToolRegistry::new();
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(test_config());
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name), "{} missing from router", name);
        }
    }
}
