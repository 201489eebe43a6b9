//! Scaffolding tool: emits boilerplate source for a new tool definition.
//!
//! Purely textual; nothing is written or executed. The output follows the
//! same params/execute/to_tool/create_route shape as every other definition
//! in this crate.

use regex::Regex;
use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::instrument;

use super::common::{error_result, route, success_result, tool_model};
use crate::core::config::Config;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());
static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9_]*):(str|int|bool|float)(?:=(.+))?$").unwrap());

#[derive(Debug)]
struct ParamSpec {
    name: String,
    rust_type: &'static str,
    default: Option<String>,
}

fn rust_type(type_name: &str) -> &'static str {
    match type_name {
        "str" => "String",
        "int" => "i64",
        "bool" => "bool",
        _ => "f64",
    }
}

fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Parse a comma-separated `name:type[=default]` list.
fn parse_params(text: &str) -> Result<Vec<ParamSpec>, String> {
    let mut specs = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some(captures) = PARAM_RE.captures(part) else {
            return Err(format!(
                "Error: Invalid parameter '{}'. Use name:type[=default] with types str, int, bool, or float",
                part
            ));
        };
        specs.push(ParamSpec {
            name: captures[1].to_string(),
            rust_type: rust_type(&captures[2]),
            default: captures.get(3).map(|m| m.as_str().to_string()),
        });
    }
    Ok(specs)
}

fn render_tool(name: &str, description: &str, specs: &[ParamSpec]) -> String {
    let pascal = pascal_case(name);
    let mut source = String::new();

    // Default-value functions come first
    for spec in specs.iter().filter(|s| s.default.is_some()) {
        let default = spec.default.as_deref().unwrap_or_default();
        let value = if spec.rust_type == "String" {
            format!("\"{}\".to_string()", default)
        } else {
            default.to_string()
        };
        source.push_str(&format!(
            "fn default_{}() -> {} {{\n    {}\n}}\n\n",
            spec.name, spec.rust_type, value
        ));
    }

    source.push_str(&format!(
        "/// Parameters for the {} tool.\n#[derive(Debug, Clone, Deserialize, JsonSchema)]\npub struct {}Params {{\n",
        name.replace('_', " "),
        pascal
    ));
    for spec in specs {
        if spec.default.is_some() {
            source.push_str(&format!("    #[serde(default = \"default_{}\")]\n", spec.name));
        }
        source.push_str(&format!("    pub {}: {},\n", spec.name, spec.rust_type));
    }
    source.push_str("}\n\n");

    source.push_str(&format!(
        "pub struct {pascal}Tool;\n\nimpl {pascal}Tool {{\n    pub const NAME: &'static str = \"{name}\";\n\n    pub const DESCRIPTION: &'static str = \"{description}\";\n\n    #[instrument(skip_all)]\n    pub fn execute(params: &{pascal}Params, config: &Config) -> CallToolResult {{\n        // TODO: implement {name}\n        success_result(format!(\"{{:?}}\", params))\n    }}\n\n    pub fn to_tool() -> Tool {{\n        tool_model::<{pascal}Params>(Self::NAME, Self::DESCRIPTION)\n    }}\n\n    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>\n    where\n        S: Send + Sync + 'static,\n    {{\n        route(Self::to_tool(), config, Self::execute)\n    }}\n}}\n",
        pascal = pascal,
        name = name,
        description = description.replace('"', "\\\"")
    ));

    source.push_str(&format!(
        "\n// Register the tool:\n// 1. Export {pascal}Tool in definitions/mod.rs\n// 2. Add {pascal}Tool::create_route(config.clone()) in router.rs\n// 3. Add {pascal}Tool to registry.rs tool_names() and get_all_tools()\n",
        pascal = pascal
    ));

    source
}

/// Parameters for the generate tool tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateToolParams {
    /// New tool name (lowercase, digits, underscores).
    pub name: String,

    /// One-line tool description.
    pub description: String,

    /// Comma-separated parameters as name:type[=default]; types: str, int, bool, float.
    #[serde(default)]
    pub params: Option<String>,
}

/// Generate tool - emits boilerplate for a new tool definition.
pub struct GenerateToolTool;

impl GenerateToolTool {
    pub const NAME: &'static str = "generate_tool";

    pub const DESCRIPTION: &'static str =
        "Generate boilerplate source for a new tool definition in this server. Params are name:type[=default] with types str, int, bool, float.";

    #[instrument(skip_all, fields(name = %params.name))]
    pub fn execute(params: &GenerateToolParams, _config: &Config) -> CallToolResult {
        if !NAME_RE.is_match(&params.name) {
            return error_result(&format!(
                "Error: Invalid tool name '{}'. Use lowercase letters, digits, and underscores, starting with a letter",
                params.name
            ));
        }

        let specs = match parse_params(params.params.as_deref().unwrap_or_default()) {
            Ok(specs) => specs,
            Err(e) => return error_result(&e),
        };

        success_result(render_tool(&params.name, &params.description, &specs))
    }

    pub fn to_tool() -> Tool {
        tool_model::<GenerateToolParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}
