//! Time tracking tools over the workspace `time-tracking.json` file.
//!
//! The store holds completed entries plus at most one active timer. Every
//! completed entry attempts a best-effort sync to the Toggl API when a token
//! is configured; sync failure is recorded on the entry, never surfaced as
//! an error.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate};
use regex::Regex;
use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::common::{blocking_route, error_result, json_result, short_id, success_result, tool_model};
use crate::core::config::Config;

const SYNC_URL: &str = "https://api.track.toggl.com/api/v9/me/time_entries";
const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?$").unwrap());

// ============================================================================
// Store
// ============================================================================

/// A completed time entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub task: String,
    pub project: String,
    /// Day the entry belongs to (YYYY-MM-DD); used for windows and sorting.
    pub date: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration_minutes: i64,
    pub synced: bool,
}

/// The single in-progress timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTimer {
    pub task: String,
    pub project: String,
    pub start: String,
}

/// On-disk shape of `time-tracking.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeStore {
    #[serde(default)]
    pub entries: Vec<TimeEntry>,

    #[serde(default)]
    pub active_timer: Option<ActiveTimer>,
}

impl TimeStore {
    /// Load the store; a missing or unreadable file is an empty store.
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
    }
}

/// Parse a duration string to minutes: `1h30m`, `2h`, `45m`, or bare digits
/// as minutes. Zero and unparseable inputs are rejected.
pub fn parse_duration_minutes(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(minutes) = text.parse::<i64>() {
        return (minutes > 0).then_some(minutes);
    }

    let captures = DURATION_RE.captures(text)?;
    let hours: i64 = captures.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let minutes: i64 = captures.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;

    let total = hours * 60 + minutes;
    (total > 0).then_some(total)
}

/// Best-effort sync of a completed entry to the time-tracking API.
///
/// Basic auth uses the token as username and the literal `api_token`
/// password, per the Toggl API. Any failure is just `false`.
fn sync_entry(entry: &TimeEntry, token: &str) -> bool {
    let client = match reqwest::blocking::Client::builder()
        .timeout(SYNC_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    let start = entry
        .start
        .clone()
        .unwrap_or_else(|| format!("{}T12:00:00Z", entry.date));

    let body = serde_json::json!({
        "description": entry.task,
        "tags": [entry.project],
        "start": start,
        "duration": entry.duration_minutes * 60,
        "created_with": "ai-cli",
    });

    match client
        .post(SYNC_URL)
        .basic_auth(token, Some("api_token"))
        .json(&body)
        .send()
    {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            warn!("Time entry sync failed: {}", e);
            false
        }
    }
}

/// Finish an entry: sync when a token is configured, record the outcome.
fn finalize_entry(mut entry: TimeEntry, config: &Config) -> TimeEntry {
    if let Some(token) = &config.credentials.time_api_token {
        entry.synced = sync_entry(&entry, token);
    }
    entry
}

// ============================================================================
// Tool Definitions
// ============================================================================

fn default_days() -> i64 {
    7
}

/// Parameters for the start timer tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StartTimerParams {
    /// What is being worked on.
    pub task: String,

    /// Project the work belongs to.
    #[serde(default)]
    pub project: Option<String>,
}

/// Start timer tool.
pub struct StartTimerTool;

impl StartTimerTool {
    pub const NAME: &'static str = "start_timer";

    pub const DESCRIPTION: &'static str =
        "Start a timer for a task. Only one timer can run at a time.";

    #[instrument(skip_all, fields(task = %params.task))]
    pub fn execute(params: &StartTimerParams, config: &Config) -> CallToolResult {
        let path = config.workspace.time_file();
        let mut store = TimeStore::load(&path);

        if let Some(active) = &store.active_timer {
            return error_result(&format!(
                "Error: A timer is already running for '{}' (started {})",
                active.task, active.start
            ));
        }

        let start = Local::now().to_rfc3339();
        store.active_timer = Some(ActiveTimer {
            task: params.task.clone(),
            project: params.project.clone().unwrap_or_else(|| "general".to_string()),
            start: start.clone(),
        });

        if let Err(e) = store.save(&path) {
            return error_result(&format!("Error: failed to save timer: {}", e));
        }

        info!("Timer started for '{}'", params.task);
        success_result(format!("Timer started for '{}' at {}", params.task, start))
    }

    pub fn to_tool() -> Tool {
        tool_model::<StartTimerParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the stop timer tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StopTimerParams {}

/// Stop timer tool.
pub struct StopTimerTool;

impl StopTimerTool {
    pub const NAME: &'static str = "stop_timer";

    pub const DESCRIPTION: &'static str =
        "Stop the active timer and record the completed time entry.";

    #[instrument(skip_all)]
    pub fn execute(_params: &StopTimerParams, config: &Config) -> CallToolResult {
        let path = config.workspace.time_file();
        let mut store = TimeStore::load(&path);

        let Some(active) = store.active_timer.take() else {
            return error_result("Error: No active timer");
        };

        let end = Local::now();
        let duration_minutes = match DateTime::parse_from_rfc3339(&active.start) {
            Ok(start) => (end.with_timezone(&start.timezone()) - start).num_minutes().max(0),
            Err(e) => {
                return error_result(&format!("Error: corrupt timer start timestamp: {}", e));
            }
        };

        let entry = finalize_entry(
            TimeEntry {
                id: short_id(),
                task: active.task.clone(),
                project: active.project,
                date: end.format("%Y-%m-%d").to_string(),
                start: Some(active.start),
                end: Some(end.to_rfc3339()),
                duration_minutes,
                synced: false,
            },
            config,
        );

        let synced = entry.synced;
        store.entries.push(entry);
        if let Err(e) = store.save(&path) {
            return error_result(&format!("Error: failed to save time entry: {}", e));
        }

        info!("Timer stopped for '{}' ({} min)", active.task, duration_minutes);
        success_result(format!(
            "Timer stopped for '{}': {} minutes logged{}",
            active.task,
            duration_minutes,
            if synced { " (synced)" } else { "" }
        ))
    }

    pub fn to_tool() -> Tool {
        tool_model::<StopTimerParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the log time tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LogTimeParams {
    /// What was worked on.
    pub task: String,

    /// Duration: '1h30m', '2h', '45m', or minutes as bare digits.
    pub duration: String,

    /// Project the work belongs to.
    #[serde(default)]
    pub project: Option<String>,

    /// Day of the work (YYYY-MM-DD); today when omitted.
    #[serde(default)]
    pub date: Option<String>,
}

/// Log time tool.
pub struct LogTimeTool;

impl LogTimeTool {
    pub const NAME: &'static str = "log_time";

    pub const DESCRIPTION: &'static str =
        "Log a completed time entry manually. Duration formats: '1h30m', '2h', '45m', or minutes as digits.";

    #[instrument(skip_all, fields(task = %params.task, duration = %params.duration))]
    pub fn execute(params: &LogTimeParams, config: &Config) -> CallToolResult {
        let Some(duration_minutes) = parse_duration_minutes(&params.duration) else {
            return error_result(&format!(
                "Error: Invalid duration '{}'. Use formats like '1h30m', '2h', '45m', or minutes as digits",
                params.duration
            ));
        };

        let date = match &params.date {
            Some(date) => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(parsed) => parsed,
                Err(_) => {
                    return error_result(&format!(
                        "Error: Invalid date '{}'. Use YYYY-MM-DD",
                        date
                    ));
                }
            },
            None => Local::now().date_naive(),
        };

        let path = config.workspace.time_file();
        let mut store = TimeStore::load(&path);

        let entry = finalize_entry(
            TimeEntry {
                id: short_id(),
                task: params.task.clone(),
                project: params.project.clone().unwrap_or_else(|| "general".to_string()),
                date: date.format("%Y-%m-%d").to_string(),
                start: None,
                end: None,
                duration_minutes,
                synced: false,
            },
            config,
        );

        let id = entry.id.clone();
        store.entries.push(entry);
        if let Err(e) = store.save(&path) {
            return error_result(&format!("Error: failed to save time entry: {}", e));
        }

        info!("Logged {} minutes for '{}'", duration_minutes, params.task);
        success_result(format!(
            "Logged {} minutes for '{}' ({})",
            duration_minutes, params.task, id
        ))
    }

    pub fn to_tool() -> Tool {
        tool_model::<LogTimeParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the list time entries tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTimeEntriesParams {
    /// Trailing window size in days.
    #[serde(default = "default_days")]
    pub days: i64,
}

/// List time entries tool.
pub struct ListTimeEntriesTool;

impl ListTimeEntriesTool {
    pub const NAME: &'static str = "list_time_entries";

    pub const DESCRIPTION: &'static str =
        "List time entries from the last N days, most recent first.";

    #[instrument(skip_all, fields(days = params.days))]
    pub fn execute(params: &ListTimeEntriesParams, config: &Config) -> CallToolResult {
        let store = TimeStore::load(&config.workspace.time_file());
        let mut entries = entries_in_window(&store, params.days);
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        json_result(&entries)
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListTimeEntriesParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the time summary tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TimeSummaryParams {
    /// Trailing window size in days.
    #[serde(default = "default_days")]
    pub days: i64,
}

/// Time summary tool.
pub struct TimeSummaryTool;

impl TimeSummaryTool {
    pub const NAME: &'static str = "time_summary";

    pub const DESCRIPTION: &'static str =
        "Summarize logged time per project over the last N days.";

    #[instrument(skip_all, fields(days = params.days))]
    pub fn execute(params: &TimeSummaryParams, config: &Config) -> CallToolResult {
        let store = TimeStore::load(&config.workspace.time_file());
        let entries = entries_in_window(&store, params.days);

        let mut totals: Vec<(String, i64, usize)> = Vec::new();
        for entry in &entries {
            match totals.iter_mut().find(|(name, _, _)| *name == entry.project) {
                Some((_, minutes, count)) => {
                    *minutes += entry.duration_minutes;
                    *count += 1;
                }
                None => totals.push((entry.project.clone(), entry.duration_minutes, 1)),
            }
        }
        totals.sort_by(|a, b| b.1.cmp(&a.1));

        let total_minutes: i64 = totals.iter().map(|(_, m, _)| m).sum();
        let mut by_project = serde_json::Map::new();
        for (project, minutes, count) in totals {
            by_project.insert(
                project,
                serde_json::json!({"total_minutes": minutes, "entries": count}),
            );
        }

        json_result(&serde_json::json!({
            "days": params.days,
            "total_minutes": total_minutes,
            "by_project": by_project,
        }))
    }

    pub fn to_tool() -> Tool {
        tool_model::<TimeSummaryParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Entries whose date falls inside the trailing window. Entries with
/// unparseable dates are excluded.
fn entries_in_window(store: &TimeStore, days: i64) -> Vec<TimeEntry> {
    let cutoff = Local::now().date_naive() - ChronoDuration::days(days.max(0));
    store
        .entries
        .iter()
        .filter(|entry| {
            NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
                .map(|date| date >= cutoff)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
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
    fn test_parse_duration_formats() {
        assert_eq!(parse_duration_minutes("1h30m"), Some(90));
        assert_eq!(parse_duration_minutes("2h"), Some(120));
        assert_eq!(parse_duration_minutes("45m"), Some(45));
        assert_eq!(parse_duration_minutes("90"), Some(90));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("an hour"), None);
        assert_eq!(parse_duration_minutes("0"), None);
        assert_eq!(parse_duration_minutes("h30m"), None);
        assert_eq!(parse_duration_minutes("1h30"), None);
    }

    #[test]
    fn test_second_start_rejected_and_original_kept() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());

        let first = StartTimerParams {
            task: "first task".to_string(),
            project: None,
        };
        StartTimerTool::execute(&first, &config);

        let second = StartTimerParams {
            task: "second task".to_string(),
            project: None,
        };
        let result = StartTimerTool::execute(&second, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("first task"));

        let store = TimeStore::load(&config.workspace.time_file());
        assert_eq!(store.active_timer.unwrap().task, "first task");
    }

    #[test]
    fn test_stop_without_active_timer() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let result = StopTimerTool::execute(&StopTimerParams {}, &config);
        assert!(result.is_error.unwrap_or(false));
        assert_eq!(result_text(&result), "Error: No active timer");
    }

    #[test]
    fn test_start_stop_records_entry() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());

        StartTimerTool::execute(
            &StartTimerParams {
                task: "review".to_string(),
                project: Some("core".to_string()),
            },
            &config,
        );
        let result = StopTimerTool::execute(&StopTimerParams {}, &config);
        assert!(result.is_error.is_none() || !result.is_error.unwrap());

        let store = TimeStore::load(&config.workspace.time_file());
        assert!(store.active_timer.is_none());
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.entries[0].project, "core");
        // No token configured, so no sync attempt was made
        assert!(!store.entries[0].synced);
    }

    #[test]
    fn test_log_time_invalid_duration() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let params = LogTimeParams {
            task: "x".to_string(),
            duration: "ninety".to_string(),
            project: None,
            date: None,
        };
        let result = LogTimeTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("Invalid duration"));
    }

    #[test]
    fn test_log_time_invalid_date() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let params = LogTimeParams {
            task: "x".to_string(),
            duration: "30m".to_string(),
            project: None,
            date: Some("23-08-2026".to_string()),
        };
        let result = LogTimeTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("Invalid date"));
    }

    #[test]
    fn test_log_then_summary_by_project() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());

        LogTimeTool::execute(
            &LogTimeParams {
                task: "design review".to_string(),
                duration: "1h30m".to_string(),
                project: Some("core".to_string()),
                date: None,
            },
            &config,
        );

        let result = TimeSummaryTool::execute(&TimeSummaryParams { days: 7 }, &config);
        let summary: serde_json::Value = serde_json::from_str(result_text(&result)).unwrap();
        assert_eq!(summary["by_project"]["core"]["total_minutes"], 90);
        assert_eq!(summary["total_minutes"], 90);
    }

    #[test]
    fn test_list_entries_windowed_and_descending() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let path = config.workspace.time_file();

        let today = Local::now().date_naive();
        let mut store = TimeStore::default();
        for (days_ago, task) in [(1, "recent"), (0, "today"), (30, "ancient")] {
            store.entries.push(TimeEntry {
                id: short_id(),
                task: task.to_string(),
                project: "general".to_string(),
                date: (today - ChronoDuration::days(days_ago)).format("%Y-%m-%d").to_string(),
                start: None,
                end: None,
                duration_minutes: 10,
                synced: false,
            });
        }
        store.save(&path).unwrap();

        let result = ListTimeEntriesTool::execute(&ListTimeEntriesParams { days: 7 }, &config);
        let entries: Vec<TimeEntry> = serde_json::from_str(result_text(&result)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].task, "today");
        assert_eq!(entries[1].task, "recent");
    }

    #[test]
    fn test_summary_orders_projects_by_minutes() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());

        for (duration, project) in [("30m", "small"), ("2h", "big")] {
            LogTimeTool::execute(
                &LogTimeParams {
                    task: "work".to_string(),
                    duration: duration.to_string(),
                    project: Some(project.to_string()),
                    date: None,
                },
                &config,
            );
        }

        let result = TimeSummaryTool::execute(&TimeSummaryParams { days: 7 }, &config);
        let text = result_text(&result);
        // preserve_order keeps the minutes-descending insertion order
        assert!(text.find("big").unwrap() < text.find("small").unwrap());
    }
}
