//! Conversion manifest for shared resources.
//!
//! Classifies commands and agents into tiers for multi-CLI conversion:
//! - Tier 1: no CLI-specific references, convert as-is
//! - Tier 2: path/file references only, convert with path replacement
//! - Tier 3: Claude-specific features, skip for other CLIs

/// Conversion tier for a shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// No CLI-specific content; convert unchanged.
    ConvertAsIs,
    /// Path references only; convert with path replacement.
    RewritePaths,
    /// Claude-specific features; skip for other CLIs.
    Skip,
}

impl Tier {
    /// Numeric tier (1, 2, or 3).
    pub fn number(self) -> u8 {
        match self {
            Tier::ConvertAsIs => 1,
            Tier::RewritePaths => 2,
            Tier::Skip => 3,
        }
    }
}

/// Kind of shared resource being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Command,
    Agent,
}

/// Target CLI for path replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCli {
    Gemini,
    Copilot,
}

// Commands by tier
const TIER1_COMMANDS: &[&str] = &[
    // Mental models (12)
    "consider/10-10-10",
    "consider/5-whys",
    "consider/eisenhower-matrix",
    "consider/first-principles",
    "consider/inversion",
    "consider/occams-razor",
    "consider/one-thing",
    "consider/opportunity-cost",
    "consider/pareto",
    "consider/second-order",
    "consider/swot",
    "consider/via-negativa",
    // Other generic commands (9)
    "audit-skill",
    "audit-slash-command",
    "audit-subagent",
    "create-plan",
    "create-slash-command",
    "debug",
    "heal-skill",
    "run-plan",
    "run-prompt",
];

const TIER2_COMMANDS: &[&str] = &[
    // Path references only - need replacement
    "check-todos",
    "create-prompt",
];

const TIER3_COMMANDS: &[&str] = &[
    // Claude-specific features - skip
    "add-to-todos",
    "create-agent-skill",
    "create-hook",
    "create-meta-prompt",
    "create-subagent",
    "whats-next",
];

// Agents by tier
const TIER1_AGENTS: &[&str] = &[
    "architect",
    "code-auditor",
    "code-reviewer",
    "mentor",
    "refactor",
];

const TIER2_AGENTS: &[&str] = &["angular-perfectionist-reviewer"];

const TIER3_AGENTS: &[&str] = &[
    // Claude Code specific auditors - skip
    "skill-auditor",
    "slash-command-auditor",
    "subagent-auditor",
];

// Path replacements per CLI; longest patterns first so each occurrence is
// rewritten exactly once.
const GEMINI_PATH_REPLACEMENTS: &[(&str, &str)] = &[
    ("~/.claude/skills/", "~/.gemini/skills/"),
    ("~/.claude/commands/", "~/.gemini/commands/"),
    ("~/.claude/agents/", "~/.gemini/agents/"),
    ("~/.claude/", "~/.gemini/"),
    (".claude/skills/", ".gemini/skills/"),
    (".claude/commands/", ".gemini/commands/"),
    (".claude/agents/", ".gemini/agents/"),
    (".claude/", ".gemini/"),
    ("CLAUDE.md", "GEMINI.md"),
];

const COPILOT_PATH_REPLACEMENTS: &[(&str, &str)] = &[
    ("~/.claude/skills/", "~/.copilot/"),
    ("~/.claude/commands/", "~/.copilot/"),
    ("~/.claude/agents/", "~/.copilot/agents/"),
    ("~/.claude/", "~/.copilot/"),
    (".claude/skills/", ".github/"),
    (".claude/commands/", ".github/"),
    (".claude/agents/", ".github/agents/"),
    (".claude/", ".github/"),
    ("CLAUDE.md", ".github/copilot-instructions.md"),
];

/// Get the tier for a resource. Unknown names default to [`Tier::Skip`].
pub fn get_tier(name: &str, kind: ResourceKind) -> Tier {
    let (tier1, tier2, tier3) = match kind {
        ResourceKind::Command => (TIER1_COMMANDS, TIER2_COMMANDS, TIER3_COMMANDS),
        ResourceKind::Agent => (TIER1_AGENTS, TIER2_AGENTS, TIER3_AGENTS),
    };

    if tier1.contains(&name) {
        Tier::ConvertAsIs
    } else if tier2.contains(&name) {
        Tier::RewritePaths
    } else if tier3.contains(&name) {
        Tier::Skip
    } else {
        Tier::Skip
    }
}

/// Check whether a resource should be converted (tier 1 or 2).
pub fn is_convertible(name: &str, kind: ResourceKind) -> bool {
    !matches!(get_tier(name, kind), Tier::Skip)
}

/// Commands convertible for any target CLI (tier 1 + tier 2).
pub fn convertible_commands() -> Vec<&'static str> {
    TIER1_COMMANDS.iter().chain(TIER2_COMMANDS).copied().collect()
}

/// Agents convertible for any target CLI (tier 1 + tier 2).
pub fn convertible_agents() -> Vec<&'static str> {
    TIER1_AGENTS.iter().chain(TIER2_AGENTS).copied().collect()
}

/// Apply ordered path replacements for a target CLI.
pub fn apply_path_replacements(content: &str, cli: TargetCli) -> String {
    let replacements = match cli {
        TargetCli::Gemini => GEMINI_PATH_REPLACEMENTS,
        TargetCli::Copilot => COPILOT_PATH_REPLACEMENTS,
    };

    let mut result = content.to_string();
    for (old, new) in replacements {
        result = result.replace(old, new);
    }
    result
}
