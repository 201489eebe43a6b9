//! Format converters for shared resources.
//!
//! Converts the Claude document format (Markdown + YAML frontmatter) to:
//! - Gemini CLI TOML commands
//! - Copilot CLI `.agent.md` files
//!
//! Conversion is tier-aware (see [`manifest`]): tier 1 converts as-is,
//! tier 2 converts with path replacements, tier 3 is skipped by callers.

pub mod manifest;

use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use manifest::{apply_path_replacements, get_tier, ResourceKind, TargetCli, Tier};

/// A parsed shared-resource document.
#[derive(Debug, Clone, Default)]
pub struct ParsedResource {
    /// Frontmatter key-value block. Empty when the document has none or the
    /// YAML is malformed.
    pub frontmatter: Mapping,

    /// Markdown body after the frontmatter, trimmed.
    pub body: String,
}

/// Parse a document with optional YAML frontmatter.
///
/// Never fails: a document without a leading `---`, with an unclosed
/// frontmatter block, or with malformed YAML yields empty frontmatter and
/// the whole (trimmed) content as body.
pub fn parse_resource(content: &str) -> ParsedResource {
    let content = content.trim();

    let Some(rest) = content.strip_prefix("---") else {
        return ParsedResource {
            frontmatter: Mapping::new(),
            body: content.to_string(),
        };
    };

    let Some(end_idx) = rest.find("\n---") else {
        // Malformed - no closing delimiter, treat as no frontmatter
        return ParsedResource {
            frontmatter: Mapping::new(),
            body: content.to_string(),
        };
    };

    let yaml_content = rest[..end_idx].trim();
    let body = rest[end_idx + 4..].trim().to_string();

    let frontmatter = match serde_yaml::from_str::<Value>(yaml_content) {
        Ok(Value::Mapping(map)) => map,
        _ => Mapping::new(),
    };

    ParsedResource { frontmatter, body }
}

/// Look up a string-valued frontmatter field.
fn frontmatter_str(frontmatter: &Mapping, key: &str) -> Option<String> {
    frontmatter
        .get(Value::String(key.to_string()))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Convert a Claude command document to Gemini TOML format.
///
/// - `$ARGUMENTS` becomes `{{args}}`
/// - `description` maps to the TOML `description` field
/// - `argument-hint` and `allowed-tools` have no Gemini equivalent and are
///   dropped
/// - tier-2 resources get path replacements in body and description
///
/// An empty `resource_name` is treated as tier 1.
pub fn to_gemini_toml(content: &str, resource_name: &str) -> String {
    let parsed = parse_resource(content);

    let tier = if resource_name.is_empty() {
        Tier::ConvertAsIs
    } else {
        get_tier(resource_name, ResourceKind::Command)
    };

    let mut body = parsed.body;
    if tier == Tier::RewritePaths {
        body = apply_path_replacements(&body, TargetCli::Gemini);
    }

    body = body.replace("$ARGUMENTS", "{{args}}");
    // Escape triple single quotes so the body survives as a TOML literal string
    body = body.replace("'''", "\\'\\'\\'");

    let mut lines = Vec::new();

    if let Some(desc) = frontmatter_str(&parsed.frontmatter, "description") {
        let desc = if tier == Tier::RewritePaths {
            apply_path_replacements(&desc, TargetCli::Gemini)
        } else {
            desc
        };
        lines.push(format!("description = \"{}\"", desc.replace('"', "\\\"")));
    }

    // Literal strings avoid escape processing for backslashes in the body
    lines.push(format!("prompt = '''\n{}\n'''", body));

    lines.join("\n")
}

/// Exact-match capability mapping from Claude tool names to Copilot ones.
const TOOL_MAP: &[(&str, &str)] = &[
    ("Read", "read"),
    ("Write", "edit"),
    ("Edit", "edit"),
    ("Grep", "search"),
    ("Glob", "search"),
    ("Bash", "shell"),
    ("Task", "custom-agent"),
];

fn map_tool_name(name: &str) -> String {
    TOOL_MAP
        .iter()
        .find(|(claude, _)| *claude == name)
        .map(|(_, copilot)| copilot.to_string())
        .unwrap_or_else(|| name.to_lowercase())
}

/// Convert a Claude agent document to Copilot `.agent.md` format.
///
/// `name` and `description` carry over; `tools` is remapped to Copilot
/// capability names (unknown names lowercased), deduplicated, and sorted.
/// A document without usable frontmatter fields becomes body-only output.
pub fn to_copilot_agent(content: &str, resource_name: &str) -> String {
    let parsed = parse_resource(content);

    let tier = if resource_name.is_empty() {
        Tier::ConvertAsIs
    } else {
        get_tier(resource_name, ResourceKind::Agent)
    };

    let mut body = parsed.body;
    if tier == Tier::RewritePaths {
        body = apply_path_replacements(&body, TargetCli::Copilot);
    }

    let mut new_fm = Mapping::new();

    if let Some(name) = frontmatter_str(&parsed.frontmatter, "name") {
        new_fm.insert(Value::from("name"), Value::from(name));
    }

    if let Some(desc) = frontmatter_str(&parsed.frontmatter, "description") {
        let desc = if tier == Tier::RewritePaths {
            apply_path_replacements(&desc, TargetCli::Copilot)
        } else {
            desc
        };
        new_fm.insert(Value::from("description"), Value::from(desc));
    }

    // tools may be a comma-separated string or a YAML sequence
    if let Some(tools_value) = parsed.frontmatter.get(Value::from("tools")) {
        let claude_tools: Vec<String> = match tools_value {
            Value::String(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
            Value::Sequence(seq) => seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        let mapped: BTreeSet<String> = claude_tools
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| map_tool_name(t))
            .collect();

        if !mapped.is_empty() {
            let seq: Vec<Value> = mapped.into_iter().map(Value::from).collect();
            new_fm.insert(Value::from("tools"), Value::Sequence(seq));
        }
    }

    if new_fm.is_empty() {
        return body;
    }

    let yaml = serde_yaml::to_string(&Value::Mapping(new_fm))
        .unwrap_or_default()
        .trim_end()
        .to_string();

    format!("---\n{}\n---\n\n{}", yaml, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_frontmatter() {
        let content = "---\ndescription: Run the plan\nname: run-plan\n---\n\n# Run\n\nBody here.";
        let parsed = parse_resource(content);
        assert_eq!(
            frontmatter_str(&parsed.frontmatter, "description").as_deref(),
            Some("Run the plan")
        );
        assert_eq!(parsed.body, "# Run\n\nBody here.");
    }

    #[test]
    fn test_parse_without_frontmatter() {
        let parsed = parse_resource("Just a body.\n");
        assert!(parsed.frontmatter.is_empty());
        assert_eq!(parsed.body, "Just a body.");
    }

    #[test]
    fn test_parse_unclosed_frontmatter() {
        let content = "---\ndescription: never closed\n\nBody";
        let parsed = parse_resource(content);
        assert!(parsed.frontmatter.is_empty());
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_parse_malformed_yaml_yields_empty_frontmatter() {
        let content = "---\n: : not yaml [\n---\n\nBody";
        let parsed = parse_resource(content);
        assert!(parsed.frontmatter.is_empty());
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn test_gemini_toml_basic() {
        let content = "---\ndescription: Do the thing\n---\n\nUse $ARGUMENTS here.";
        let toml = to_gemini_toml(content, "");
        assert!(toml.contains("description = \"Do the thing\""));
        assert!(toml.contains("prompt = '''"));
        assert!(toml.contains("Use {{args}} here."));
        assert!(!toml.contains("$ARGUMENTS"));
    }

    #[test]
    fn test_gemini_toml_escapes_quotes_and_literals() {
        let content = "---\ndescription: Say \"hi\"\n---\n\nA ''' literal.";
        let toml = to_gemini_toml(content, "");
        assert!(toml.contains("description = \"Say \\\"hi\\\"\""));
        assert!(toml.contains("A \\'\\'\\' literal."));
    }

    #[test]
    fn test_gemini_toml_tier2_rewrites_paths_once() {
        let content =
            "---\ndescription: Check .claude/commands/todo.md\n---\n\nOpen ~/.claude/skills/x/SKILL.md";
        let toml = to_gemini_toml(content, "check-todos");
        assert!(toml.contains("description = \"Check .gemini/commands/todo.md\""));
        assert!(toml.contains("Open ~/.gemini/skills/x/SKILL.md"));
        assert!(!toml.contains(".claude/"));
    }

    #[test]
    fn test_gemini_toml_tier1_leaves_paths() {
        let content = "---\ndescription: d\n---\n\nPath .claude/commands/x.md stays.";
        let toml = to_gemini_toml(content, "debug");
        assert!(toml.contains(".claude/commands/x.md"));
    }

    #[test]
    fn test_gemini_toml_no_frontmatter() {
        let toml = to_gemini_toml("Bare body", "");
        assert!(!toml.contains("description"));
        assert!(toml.starts_with("prompt = '''"));
    }

    #[test]
    fn test_copilot_agent_maps_and_sorts_tools() {
        let content =
            "---\nname: code-reviewer\ndescription: Reviews code\ntools: Read, Write, Edit, Grep\n---\n\nBe thorough.";
        let agent = to_copilot_agent(content, "code-reviewer");
        assert!(agent.starts_with("---\n"));
        assert!(agent.contains("name: code-reviewer"));
        assert!(agent.contains("description: Reviews code"));
        // Write and Edit both map to "edit" and collapse; output is sorted
        let tools_idx = agent.find("tools:").unwrap();
        let tools_block = &agent[tools_idx..agent.find("\n---").unwrap()];
        assert!(tools_block.contains("- edit"));
        assert!(tools_block.contains("- read"));
        assert!(tools_block.contains("- search"));
        assert_eq!(tools_block.matches("- edit").count(), 1);
        assert!(agent.ends_with("Be thorough."));
    }

    #[test]
    fn test_copilot_agent_unknown_tool_lowercased() {
        let content = "---\nname: x\ntools: WebSearch\n---\n\nBody";
        let agent = to_copilot_agent(content, "");
        assert!(agent.contains("- websearch"));
    }

    #[test]
    fn test_copilot_agent_tools_as_sequence() {
        let content = "---\nname: x\ntools:\n  - Bash\n  - Task\n---\n\nBody";
        let agent = to_copilot_agent(content, "");
        assert!(agent.contains("- custom-agent"));
        assert!(agent.contains("- shell"));
    }

    #[test]
    fn test_copilot_agent_without_frontmatter_is_body_only() {
        let agent = to_copilot_agent("Just instructions.", "");
        assert_eq!(agent, "Just instructions.");
    }

    #[test]
    fn test_copilot_agent_tier2_rewrites_paths() {
        let content = "---\nname: angular-perfectionist-reviewer\ndescription: Uses CLAUDE.md\n---\n\nSee ~/.claude/agents/helper.md";
        let agent = to_copilot_agent(content, "angular-perfectionist-reviewer");
        assert!(agent.contains("description: Uses .github/copilot-instructions.md"));
        assert!(agent.contains("~/.copilot/agents/helper.md"));
    }
}
