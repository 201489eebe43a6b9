//! Workspace initialization.
//!
//! One-shot setup invoked by `ai-cli --init [PATH]`:
//! - creates the `.ai-cli/shared` directory tree in the workspace
//! - copies bundled default resources (skip-if-exists, never overwrites)
//! - registers the MCP server with the Claude, Gemini, and Copilot CLIs by
//!   merging an `mcpServers` block into each CLI's JSON config
//! - symlinks shared resource directories for Claude (copies on Windows)
//! - converts tier-1/2 commands to Gemini TOML and tier-1/2 agents to
//!   Copilot `.agent.md`
//!
//! Per-file conflicts are printed and skipped; only a missing workspace
//! directory is a hard error (process exit code 1).

use std::fs;
use std::path::{Path, PathBuf};

use crate::convert::manifest::{is_convertible, ResourceKind};
use crate::convert::{to_copilot_agent, to_gemini_toml};
use crate::core::{Error, Result};

const CATEGORIES: &[&str] = &["commands", "skills", "agents", "context"];

/// Initialize a workspace: directory tree, default resources, CLI wiring.
///
/// Returns an error only when `workspace` does not exist; every other
/// failure is reported and skipped.
pub fn initialize_workspace(workspace: &Path, package_root: &Path) -> Result<()> {
    println!("Initializing ai-cli");
    println!("Workspace: {}", workspace.display());
    println!("{}", "=".repeat(50));

    if !workspace.exists() {
        return Err(Error::init(format!(
            "directory does not exist: {}",
            workspace.display()
        )));
    }

    println!("\nCreating workspace structure...");
    create_workspace_structure(workspace)?;

    println!("\nCopying default resources...");
    copy_defaults(workspace, package_root);

    println!("\nConfiguring AI CLIs...");
    let Some(home) = dirs::home_dir() else {
        println!("  Warning: could not determine home directory, skipping CLI setup");
        return Ok(());
    };
    setup_claude(workspace, &home);
    setup_gemini(workspace, &home);
    setup_copilot(workspace, &home);

    println!("\n{}", "=".repeat(50));
    println!("Setup complete!");
    println!("\nWorkspace: {}", workspace.display());
    println!(
        "Resources: {}",
        workspace.join(".ai-cli").join("shared").display()
    );
    println!("\nRestart your CLI to load changes.");

    Ok(())
}

/// Create the `.ai-cli/shared` directory structure in the workspace.
fn create_workspace_structure(workspace: &Path) -> Result<()> {
    let ai_cli = workspace.join(".ai-cli");
    for category in CATEGORIES {
        fs::create_dir_all(ai_cli.join("shared").join(category))?;
    }
    println!("Created {}", ai_cli.display());
    Ok(())
}

/// Copy bundled default resources into the workspace, skipping anything
/// that already exists. A missing bundled category is silently omitted.
fn copy_defaults(workspace: &Path, package_root: &Path) {
    let dest = workspace.join(".ai-cli").join("shared");

    for category in CATEGORIES {
        let src_dir = package_root.join(category);
        let dst_dir = dest.join(category);

        if !src_dir.exists() {
            continue;
        }

        if *category == "skills" {
            // Skills are whole directories, each with a SKILL.md inside
            copy_subdirectories(&src_dir, &dst_dir, category);
        } else {
            copy_markdown_files(&src_dir, &dst_dir, category);

            // Commands support one level of subdirectories (like consider/)
            if *category == "commands" {
                copy_subdirectories(&src_dir, &dst_dir, category);
            }
        }
    }
}

fn copy_markdown_files(src_dir: &Path, dst_dir: &Path, category: &str) {
    let Ok(entries) = fs::read_dir(src_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let src_file = entry.path();
        if src_file.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let name = entry.file_name();
        let dst_file = dst_dir.join(&name);
        if dst_file.exists() {
            println!("  Skipped {}/{} (exists)", category, name.to_string_lossy());
        } else if let Err(e) = fs::copy(&src_file, &dst_file) {
            println!(
                "  Warning: could not copy {}/{}: {}",
                category,
                name.to_string_lossy(),
                e
            );
        } else {
            println!("  Copied {}/{}", category, name.to_string_lossy());
        }
    }
}

fn copy_subdirectories(src_dir: &Path, dst_dir: &Path, category: &str) {
    let Ok(entries) = fs::read_dir(src_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let src_sub = entry.path();
        if !src_sub.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let dst_sub = dst_dir.join(&name);
        if dst_sub.exists() {
            println!(
                "  Skipped {}/{}/ (exists)",
                category,
                name.to_string_lossy()
            );
        } else if let Err(e) = copy_dir_recursive(&src_sub, &dst_sub) {
            println!(
                "  Warning: could not copy {}/{}/: {}",
                category,
                name.to_string_lossy(),
                e
            );
        } else {
            println!("  Copied {}/{}/", category, name.to_string_lossy());
        }
    }
}

/// Recursively copy a directory tree.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The MCP server registration block merged into each CLI's config.
pub fn mcp_server_config(workspace: &Path) -> serde_json::Value {
    serde_json::json!({
        "ai-cli": {
            "command": "ai-cli",
            "args": [],
            "env": {
                "AI_CLI_WORKSPACE": workspace.to_string_lossy()
            }
        }
    })
}

/// Merge `value` under `key` in a JSON config file, preserving every other
/// key. A missing file is treated as empty; an existing file that is
/// unreadable or does not parse as a JSON object is left untouched and the
/// update is skipped with a warning (returns false).
pub fn update_json_file(path: &Path, key: &str, value: &serde_json::Value) -> bool {
    let result = (|| -> Result<()> {
        let mut data: serde_json::Value = if path.exists() {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        } else {
            serde_json::json!({})
        };

        let obj = data
            .as_object_mut()
            .ok_or_else(|| Error::internal("config root is not an object"))?;
        let section = obj
            .entry(key.to_string())
            .or_insert_with(|| serde_json::json!({}));

        if let (Some(section), Some(additions)) = (section.as_object_mut(), value.as_object()) {
            for (k, v) in additions {
                section.insert(k.clone(), v.clone());
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&data)?)?;
        Ok(())
    })();

    match result {
        Ok(()) => true,
        Err(e) => {
            println!("  Warning: could not update {}: {}", path.display(), e);
            false
        }
    }
}

/// Create or replace a symlink (a recursive copy on Windows), removing any
/// pre-existing link, directory, or file at the destination first.
pub fn create_or_update_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    if dst.symlink_metadata().is_ok() {
        if dst.is_dir() && !dst.is_symlink() {
            fs::remove_dir_all(dst)?;
        } else {
            fs::remove_file(dst)?;
        }
    }

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(src, dst)?;
        println!("  Symlinked: {} -> {}", dst.display(), src.display());
    }

    #[cfg(windows)]
    {
        copy_dir_recursive(src, dst)?;
        println!("  Copied {} to {}", src.display(), dst.display());
    }

    Ok(())
}

/// Configure the Claude CLI: MCP registration plus resource symlinks.
fn setup_claude(workspace: &Path, home: &Path) {
    println!("\nClaude CLI:");

    let shared_dir = workspace.join(".ai-cli").join("shared");

    let claude_json = home.join(".claude.json");
    if update_json_file(&claude_json, "mcpServers", &mcp_server_config(workspace)) {
        println!("  Updated {}", claude_json.display());
    }

    for category in ["commands", "agents", "skills"] {
        let src = shared_dir.join(category);
        let dst = home.join(".claude").join(category).join("ai-cli");
        if let Err(e) = create_or_update_symlink(&src, &dst) {
            println!("  Warning: could not link {}: {}", dst.display(), e);
        }
    }
}

/// Configure the Gemini CLI: MCP registration plus TOML command conversion.
fn setup_gemini(workspace: &Path, home: &Path) {
    println!("\nGemini CLI:");

    let shared_dir = workspace.join(".ai-cli").join("shared");

    let gemini_settings = home.join(".gemini").join("settings.json");
    if update_json_file(
        &gemini_settings,
        "mcpServers",
        &mcp_server_config(workspace),
    ) {
        println!("  Updated {}", gemini_settings.display());
    }

    let commands_src = shared_dir.join("commands");
    let commands_dst = home.join(".gemini").join("commands");
    let (converted, skipped) = convert_commands_for_gemini(&commands_src, &commands_dst);
    println!("  Converted {} commands to {}", converted, commands_dst.display());
    if skipped > 0 {
        println!("  Skipped {} Claude-specific commands", skipped);
    }
}

/// Configure the Copilot CLI: MCP registration plus agent conversion.
fn setup_copilot(workspace: &Path, home: &Path) {
    println!("\nCopilot CLI:");

    let shared_dir = workspace.join(".ai-cli").join("shared");

    let copilot_config = home.join(".copilot").join("mcp-config.json");
    if update_json_file(
        &copilot_config,
        "mcpServers",
        &mcp_server_config(workspace),
    ) {
        println!("  Updated {}", copilot_config.display());
    }

    let agents_src = shared_dir.join("agents");
    let agents_dst = home.join(".copilot").join("agents");
    let (converted, skipped) = convert_agents_for_copilot(&agents_src, &agents_dst);
    println!("  Converted {} agents to {}", converted, agents_dst.display());
    if skipped > 0 {
        println!("  Skipped {} Claude-specific agents", skipped);
    }
}

/// Command documents to convert: top-level `*.md` plus one subdirectory
/// level, named `subdir/stem` for tier lookup.
fn collect_commands(src_dir: &Path) -> Vec<(String, PathBuf)> {
    let mut found = Vec::new();
    let Ok(entries) = fs::read_dir(src_dir) else {
        return found;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let subdir = entry.file_name().to_string_lossy().to_string();
            if let Ok(sub_entries) = fs::read_dir(&path) {
                for sub in sub_entries.flatten() {
                    let sub_path = sub.path();
                    if sub_path.extension().and_then(|e| e.to_str()) == Some("md") {
                        if let Some(stem) = sub_path.file_stem().and_then(|s| s.to_str()) {
                            found.push((format!("{}/{}", subdir, stem), sub_path));
                        }
                    }
                }
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                found.push((stem.to_string(), path));
            }
        }
    }

    found.sort();
    found
}

/// Convert tier-1/2 commands to Gemini TOML, recreating the destination.
///
/// Returns `(converted, skipped)`.
pub fn convert_commands_for_gemini(src_dir: &Path, dst_dir: &Path) -> (usize, usize) {
    let mut converted = 0;
    let mut skipped = 0;

    if dst_dir.exists() {
        let _ = fs::remove_dir_all(dst_dir);
    }
    if fs::create_dir_all(dst_dir).is_err() {
        return (0, 0);
    }

    for (resource_name, src_file) in collect_commands(src_dir) {
        if !is_convertible(&resource_name, ResourceKind::Command) {
            skipped += 1;
            continue;
        }

        let Ok(content) = fs::read_to_string(&src_file) else {
            skipped += 1;
            continue;
        };

        let toml_content = to_gemini_toml(&content, &resource_name);
        let dst_file = dst_dir.join(format!("{}.toml", resource_name));
        if let Some(parent) = dst_file.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if fs::write(&dst_file, toml_content).is_ok() {
            converted += 1;
        } else {
            skipped += 1;
        }
    }

    (converted, skipped)
}

/// Convert tier-1/2 agents to Copilot `.agent.md`, recreating the
/// destination. Returns `(converted, skipped)`.
pub fn convert_agents_for_copilot(src_dir: &Path, dst_dir: &Path) -> (usize, usize) {
    let mut converted = 0;
    let mut skipped = 0;

    if dst_dir.exists() {
        let _ = fs::remove_dir_all(dst_dir);
    }
    if fs::create_dir_all(dst_dir).is_err() {
        return (0, 0);
    }

    let Ok(entries) = fs::read_dir(src_dir) else {
        return (converted, skipped);
    };

    for entry in entries.flatten() {
        let src_file = entry.path();
        if src_file.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = src_file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        if !is_convertible(stem, ResourceKind::Agent) {
            skipped += 1;
            continue;
        }

        let Ok(content) = fs::read_to_string(&src_file) else {
            skipped += 1;
            continue;
        };

        let agent_content = to_copilot_agent(&content, stem);
        let dst_file = dst_dir.join(format!("{}.agent.md", stem));
        if fs::write(&dst_file, agent_content).is_ok() {
            converted += 1;
        } else {
            skipped += 1;
        }
    }

    (converted, skipped)
}
