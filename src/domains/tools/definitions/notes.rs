//! Note tools over the workspace `notes.json` file.
//!
//! Append-only store with tags and explicit delete-by-id. Listings truncate
//! content to 100 characters; search matches the full content.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{error_result, json_result, route, short_id, success_result, tool_model, truncate_chars};
use crate::core::config::Config;

const LIST_CONTENT_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created: String,
}

/// On-disk shape of `notes.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesStore {
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl NotesStore {
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

/// Lowercase, trim, and deduplicate a comma-separated tag list.
fn normalize_tags(tags: &str) -> Vec<String> {
    let mut result = Vec::new();
    for tag in tags.split(',') {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !result.contains(&tag) {
            result.push(tag);
        }
    }
    result
}

/// Parameters for the add note tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddNoteParams {
    /// Note content.
    pub content: String,

    /// Comma-separated tags.
    #[serde(default)]
    pub tags: Option<String>,
}

/// Add note tool.
pub struct AddNoteTool;

impl AddNoteTool {
    pub const NAME: &'static str = "add_note";

    pub const DESCRIPTION: &'static str =
        "Add a note to the workspace notes store, with optional comma-separated tags.";

    #[instrument(skip_all)]
    pub fn execute(params: &AddNoteParams, config: &Config) -> CallToolResult {
        let path = config.workspace.notes_file();
        let mut store = NotesStore::load(&path);

        let note = Note {
            id: short_id(),
            content: params.content.clone(),
            tags: params.tags.as_deref().map(normalize_tags).unwrap_or_default(),
            created: Local::now().to_rfc3339(),
        };

        let id = note.id.clone();
        store.notes.push(note);
        if let Err(e) = store.save(&path) {
            return error_result(&format!("Error: failed to save note: {}", e));
        }

        info!("Added note {}", id);
        success_result(format!("Added note {}", id))
    }

    pub fn to_tool() -> Tool {
        tool_model::<AddNoteParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

fn default_note_days() -> i64 {
    30
}

/// Parameters for the list notes tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListNotesParams {
    /// Only notes carrying this tag.
    #[serde(default)]
    pub tag: Option<String>,

    /// Trailing window size in days.
    #[serde(default = "default_note_days")]
    pub days: i64,
}

/// List notes tool.
pub struct ListNotesTool;

impl ListNotesTool {
    pub const NAME: &'static str = "list_notes";

    pub const DESCRIPTION: &'static str =
        "List recent notes, optionally filtered by tag. Content is truncated to 100 characters.";

    #[instrument(skip_all)]
    pub fn execute(params: &ListNotesParams, config: &Config) -> CallToolResult {
        let store = NotesStore::load(&config.workspace.notes_file());
        let cutoff = Local::now() - ChronoDuration::days(params.days.max(0));
        let tag = params.tag.as_ref().map(|t| t.trim().to_lowercase());

        let listed: Vec<serde_json::Value> = store
            .notes
            .iter()
            .filter(|note| {
                DateTime::parse_from_rfc3339(&note.created)
                    .map(|created| created >= cutoff)
                    .unwrap_or(false)
            })
            .filter(|note| tag.as_ref().map_or(true, |tag| note.tags.contains(tag)))
            .map(|note| {
                serde_json::json!({
                    "id": note.id,
                    "content": truncate_chars(&note.content, LIST_CONTENT_LIMIT),
                    "tags": note.tags,
                    "created": note.created,
                })
            })
            .collect();

        json_result(&listed)
    }

    pub fn to_tool() -> Tool {
        tool_model::<ListNotesParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the search notes tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchNotesParams {
    /// Case-insensitive substring to search for.
    pub query: String,
}

/// Search notes tool.
pub struct SearchNotesTool;

impl SearchNotesTool {
    pub const NAME: &'static str = "search_notes";

    pub const DESCRIPTION: &'static str =
        "Search notes by case-insensitive substring over the full content.";

    #[instrument(skip_all, fields(query = %params.query))]
    pub fn execute(params: &SearchNotesParams, config: &Config) -> CallToolResult {
        let store = NotesStore::load(&config.workspace.notes_file());
        let query = params.query.to_lowercase();

        let matches: Vec<&Note> = store
            .notes
            .iter()
            .filter(|note| note.content.to_lowercase().contains(&query))
            .collect();

        json_result(&matches)
    }

    pub fn to_tool() -> Tool {
        tool_model::<SearchNotesParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the delete note tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteNoteParams {
    /// Id of the note to delete.
    pub note_id: String,
}

/// Delete note tool.
pub struct DeleteNoteTool;

impl DeleteNoteTool {
    pub const NAME: &'static str = "delete_note";

    pub const DESCRIPTION: &'static str = "Delete a note by its id.";

    #[instrument(skip_all, fields(note_id = %params.note_id))]
    pub fn execute(params: &DeleteNoteParams, config: &Config) -> CallToolResult {
        let path = config.workspace.notes_file();
        let mut store = NotesStore::load(&path);

        let before = store.notes.len();
        store.notes.retain(|note| note.id != params.note_id);
        if store.notes.len() == before {
            return error_result(&format!("Error: Note '{}' not found", params.note_id));
        }

        if let Err(e) = store.save(&path) {
            return error_result(&format!("Error: failed to save notes: {}", e));
        }

        info!("Deleted note {}", params.note_id);
        success_result(format!("Deleted note {}", params.note_id))
    }

    pub fn to_tool() -> Tool {
        tool_model::<DeleteNoteParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}
