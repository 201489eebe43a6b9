//! npm/pnpm/yarn script runner tools.
//!
//! The package manager is resolved by lockfile presence (pnpm > yarn > npm).
//! Scripts run under a hard 120-second timeout; on expiry the process is
//! killed and an error string is returned.

use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use super::common::{blocking_route, error_result, success_result, tool_model};
use crate::core::config::Config;

const SCRIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build scripts tried in order by `check_build`.
const BUILD_SCRIPTS: &[&str] = &["typecheck", "type-check", "tsc", "build"];

/// Parameters for the run npm script tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunNpmScriptParams {
    /// Name of the project directory inside the workspace.
    pub project_name: String,

    /// Script name from package.json.
    pub script: String,
}

/// Run npm script tool.
pub struct RunNpmScriptTool;

impl RunNpmScriptTool {
    pub const NAME: &'static str = "run_npm_script";

    pub const DESCRIPTION: &'static str =
        "Run an npm/pnpm/yarn script in a project and return its output. Hard 120-second timeout.";

    #[instrument(skip_all, fields(project = %params.project_name, script = %params.script))]
    pub fn execute(params: &RunNpmScriptParams, config: &Config) -> CallToolResult {
        let project_path = config.workspace.project_dir(&params.project_name);

        if !project_path.exists() {
            return error_result(&format!("Error: Project '{}' not found", params.project_name));
        }
        if !project_path.join("package.json").exists() {
            return error_result(&format!(
                "Error: No package.json in '{}'",
                params.project_name
            ));
        }

        let (program, args) = resolve_package_manager(&project_path, &params.script);
        info!("Running {} {}", program, args.join(" "));

        match run_with_timeout(program, &args, &project_path, SCRIPT_TIMEOUT) {
            Ok(ScriptOutput { stdout, stderr }) => {
                let mut output = stdout;
                if !stderr.is_empty() {
                    output.push_str("\n\nSTDERR:\n");
                    output.push_str(&stderr);
                }
                if output.is_empty() {
                    output = "Script completed with no output".to_string();
                }
                success_result(output)
            }
            Err(ScriptError::Timeout) => {
                warn!("Script timed out: {}", params.script);
                error_result("Error: Script timed out after 120 seconds")
            }
            Err(ScriptError::Spawn(e)) => error_result(&format!("Error: {}", e)),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<RunNpmScriptParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the check build tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckBuildParams {
    /// Name of the project directory inside the workspace.
    pub project_name: String,
}

/// Check build tool - runs the first typecheck/build script a project has.
pub struct CheckBuildTool;

impl CheckBuildTool {
    pub const NAME: &'static str = "check_build";

    pub const DESCRIPTION: &'static str =
        "Run the project's typecheck or build script (first of: typecheck, type-check, tsc, build) to check for errors.";

    #[instrument(skip_all, fields(project = %params.project_name))]
    pub fn execute(params: &CheckBuildParams, config: &Config) -> CallToolResult {
        let project_path = config.workspace.project_dir(&params.project_name);

        if !project_path.exists() {
            return error_result(&format!("Error: Project '{}' not found", params.project_name));
        }

        let pkg_path = project_path.join("package.json");
        if !pkg_path.exists() {
            return success_result("No package.json found".to_string());
        }

        let pkg: serde_json::Value = match fs::read_to_string(&pkg_path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(pkg) => pkg,
            Err(e) => return error_result(&format!("Error reading package.json: {}", e)),
        };

        let scripts = pkg.get("scripts").and_then(|s| s.as_object());
        let script = scripts.and_then(|scripts| {
            BUILD_SCRIPTS
                .iter()
                .find(|name| scripts.contains_key(**name))
        });

        match script {
            Some(script) => RunNpmScriptTool::execute(
                &RunNpmScriptParams {
                    project_name: params.project_name.clone(),
                    script: script.to_string(),
                },
                config,
            ),
            None => success_result(
                "No typecheck or build script found in package.json".to_string(),
            ),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<CheckBuildParams>(Self::NAME, Self::DESCRIPTION)
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

/// Pick the package manager invocation from lockfile presence.
fn resolve_package_manager(project_path: &Path, script: &str) -> (&'static str, Vec<String>) {
    if project_path.join("pnpm-lock.yaml").exists() {
        ("pnpm", vec!["run".to_string(), script.to_string()])
    } else if project_path.join("yarn.lock").exists() {
        ("yarn", vec![script.to_string()])
    } else {
        ("npm", vec!["run".to_string(), script.to_string()])
    }
}

struct ScriptOutput {
    stdout: String,
    stderr: String,
}

enum ScriptError {
    Timeout,
    Spawn(std::io::Error),
}

/// Run a command with a hard timeout, killing it on expiry.
///
/// stdout/stderr are drained on separate threads so a chatty child cannot
/// deadlock on a full pipe.
fn run_with_timeout(
    program: &str,
    args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<ScriptOutput, ScriptError> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ScriptError::Spawn)?;

    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => break,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ScriptError::Timeout);
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                let _ = child.kill();
                return Err(ScriptError::Spawn(e));
            }
        }
    }

    let stdout = stdout_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();
    let stderr = stderr_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();

    Ok(ScriptOutput { stdout, stderr })
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = source.read_to_string(&mut buf);
        buf
    })
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
    fn test_run_script_missing_project() {
        let workspace = TempDir::new().unwrap();
        let config = workspace_config(workspace.path());
        let params = RunNpmScriptParams {
            project_name: "ghost".to_string(),
            script: "build".to_string(),
        };
        let result = RunNpmScriptTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
    }

    #[test]
    fn test_run_script_requires_package_json() {
        let workspace = TempDir::new().unwrap();
        fs::create_dir_all(workspace.path().join("app")).unwrap();
        let config = workspace_config(workspace.path());
        let params = RunNpmScriptParams {
            project_name: "app".to_string(),
            script: "build".to_string(),
        };
        let result = RunNpmScriptTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("No package.json"));
    }

    #[test]
    fn test_package_manager_precedence() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_package_manager(dir.path(), "build").0, "npm");

        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        let (program, args) = resolve_package_manager(dir.path(), "build");
        assert_eq!(program, "yarn");
        assert_eq!(args, vec!["build"]);

        // pnpm wins over yarn
        fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        let (program, args) = resolve_package_manager(dir.path(), "build");
        assert_eq!(program, "pnpm");
        assert_eq!(args, vec!["run", "build"]);
    }

    #[test]
    fn test_run_with_timeout_captures_output() {
        let dir = TempDir::new().unwrap();
        let output = run_with_timeout(
            "sh",
            &["-c".to_string(), "echo out; echo err >&2".to_string()],
            dir.path(),
            Duration::from_secs(5),
        );
        let output = match output {
            Ok(o) => o,
            Err(_) => return, // sh unavailable
        };
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_run_with_timeout_kills_slow_process() {
        let dir = TempDir::new().unwrap();
        let result = run_with_timeout(
            "sleep",
            &["30".to_string()],
            dir.path(),
            Duration::from_millis(300),
        );
        assert!(matches!(result, Err(ScriptError::Timeout) | Err(ScriptError::Spawn(_))));
    }

    #[test]
    fn test_check_build_no_matching_script() {
        let workspace = TempDir::new().unwrap();
        let project = workspace.path().join("app");
        fs::create_dir_all(&project).unwrap();
        fs::write(
            project.join("package.json"),
            r#"{"scripts": {"test": "jest"}}"#,
        )
        .unwrap();

        let config = workspace_config(workspace.path());
        let params = CheckBuildParams {
            project_name: "app".to_string(),
        };
        let result = CheckBuildTool::execute(&params, &config);
        assert_eq!(
            result_text(&result),
            "No typecheck or build script found in package.json"
        );
    }

    #[test]
    fn test_check_build_no_package_json() {
        let workspace = TempDir::new().unwrap();
        fs::create_dir_all(workspace.path().join("app")).unwrap();
        let config = workspace_config(workspace.path());
        let params = CheckBuildParams {
            project_name: "app".to_string(),
        };
        let result = CheckBuildTool::execute(&params, &config);
        assert_eq!(result_text(&result), "No package.json found");
    }

    #[test]
    fn test_check_build_bad_package_json() {
        let workspace = TempDir::new().unwrap();
        let project = workspace.path().join("app");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("package.json"), "{broken").unwrap();

        let config = workspace_config(workspace.path());
        let params = CheckBuildParams {
            project_name: "app".to_string(),
        };
        let result = CheckBuildTool::execute(&params, &config);
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).starts_with("Error reading package.json:"));
    }
}
