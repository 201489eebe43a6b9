//! Common utilities shared across tool definitions.
//!
//! Result helpers, the route constructors every tool uses, and a couple of
//! small formatting functions.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

use crate::core::config::Config;

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Create a success result with pretty-printed JSON content.
pub fn json_result<T: Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => success_result(text),
        Err(e) => error_result(&format!("Error: failed to serialize result: {}", e)),
    }
}

/// Generate a short 8-character hexadecimal identifier.
pub fn short_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

/// Truncate a string to at most `max` characters, ellipsis included.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Build the Tool model (metadata) for a params type.
pub fn tool_model<P>(name: &'static str, description: &'static str) -> Tool
where
    P: JsonSchema + 'static,
{
    Tool {
        name: name.into(),
        description: Some(description.into()),
        input_schema: Arc::new(schema_for_type::<P>()),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Create a ToolRoute that deserializes params and calls a sync handler.
///
/// Deserialization failures surface as MCP invalid-params; everything the
/// handler itself reports comes back as result content.
pub fn route<S, P>(
    tool: Tool,
    config: Arc<Config>,
    handler: fn(&P, &Config) -> CallToolResult,
) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
    P: DeserializeOwned + Send + 'static,
{
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let config = config.clone();
        async move {
            let params: P = serde_json::from_value(serde_json::Value::Object(args))
                .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
            Ok(handler(&params, &config))
        }
        .boxed()
    })
}

/// Like [`route`], but runs the handler on the blocking thread pool.
///
/// Used by tools that spawn subprocesses or make outbound HTTP calls so they
/// do not stall the async protocol loop.
pub fn blocking_route<S, P>(
    tool: Tool,
    config: Arc<Config>,
    handler: fn(&P, &Config) -> CallToolResult,
) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
    P: DeserializeOwned + Send + 'static,
{
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let config = config.clone();
        async move {
            let params: P = serde_json::from_value(serde_json::Value::Object(args))
                .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
            tokio::task::spawn_blocking(move || handler(&params, &config))
                .await
                .map_err(|e| McpError::internal_error(e.to_string(), None))
        }
        .boxed()
    })
}

/// Extract the text content of a tool result (test helper).
#[cfg(test)]
pub fn result_text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        rmcp::model::RawContent::Text(text) => &text.text,
        _ => panic!("Expected text content"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_result_flags_error() {
        let result = error_result("Error: something broke");
        assert!(result.is_error.unwrap_or(false));
        assert_eq!(result_text(&result), "Error: something broke");
    }

    #[test]
    fn test_success_result_is_not_error() {
        let result = success_result("fine".to_string());
        assert!(result.is_error.is_none() || !result.is_error.unwrap());
        assert_eq!(result_text(&result), "fine");
    }

    #[test]
    fn test_json_result_pretty_prints() {
        let result = json_result(&serde_json::json!({"a": 1}));
        let text = result_text(&result);
        assert!(text.contains("\"a\": 1"));
    }

    #[test]
    fn test_short_id_format() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("abcdefgh", 6), "abc...");
        // The result never exceeds the limit, ellipsis included
        assert_eq!(truncate_chars("abcdefgh", 6).chars().count(), 6);
        // Multi-byte characters count as single characters
        assert_eq!(truncate_chars("日本語のテキスト", 6), "日本語...");
    }
}
