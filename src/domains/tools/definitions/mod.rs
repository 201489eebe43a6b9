//! Tool definitions module.
//!
//! This module exports all available tool definitions, grouped by category.

pub mod common;
pub mod git;
pub mod handoff;
pub mod notes;
pub mod projects;
pub mod random;
pub mod scaffold;
pub mod scripts;
pub mod shared;
pub mod timetrack;
pub mod todos;
pub mod weather;

pub use git::{GitDiffTool, GitLogTool, GitStatusTool};
pub use handoff::{ReadHandoffTool, WriteHandoffTool};
pub use notes::{AddNoteTool, DeleteNoteTool, ListNotesTool, SearchNotesTool};
pub use projects::{GetProjectContextTool, ListProjectsTool};
pub use random::{FlipCoinTool, RandomChoiceTool, RandomNumberTool, RollDiceTool};
pub use scaffold::GenerateToolTool;
pub use scripts::{CheckBuildTool, RunNpmScriptTool};
pub use shared::{
    GetSharedAgentTool, GetSharedCommandTool, GetSharedContextTool, GetSharedSkillTool,
    ListSharedAgentsTool, ListSharedCommandsTool, ListSharedContextTool, ListSharedSkillsTool,
};
pub use timetrack::{
    ListTimeEntriesTool, LogTimeTool, StartTimerTool, StopTimerTool, TimeSummaryTool,
};
pub use todos::{AddTodoTool, CompleteTodoTool, ListTodosTool};
pub use weather::{GetForecastTool, GetWeatherTool};
