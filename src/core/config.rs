//! Configuration management for the server.
//!
//! The configuration is built once at startup (from environment variables
//! via [`Config::from_env`], optionally overridden by CLI flags) and passed
//! `Arc`-shared into every tool route. No tool reads hidden global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Workspace and bundled-resource paths.
    pub workspace: WorkspaceConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// External API credentials.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Workspace path configuration.
///
/// `root` is the directory holding the user's projects and flat-file stores;
/// `package_root` is where the bundled default resources (commands, skills,
/// agents, context) live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace root directory.
    pub root: PathBuf,

    /// Bundled resource root (fallback when the workspace has no local
    /// `.ai-cli/shared` directory).
    pub package_root: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for external API credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Time-tracking API token. Sync is disabled when absent.
    pub time_api_token: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "time_api_token",
                &self.time_api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl WorkspaceConfig {
    /// Shared resources directory: workspace-local override when it exists,
    /// bundled defaults otherwise.
    pub fn shared_dir(&self) -> PathBuf {
        let local = self.root.join(".ai-cli").join("shared");
        if local.exists() {
            local
        } else {
            self.package_root.clone()
        }
    }

    pub fn commands_dir(&self) -> PathBuf {
        self.shared_dir().join("commands")
    }

    pub fn skills_dir(&self) -> PathBuf {
        self.shared_dir().join("skills")
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.shared_dir().join("agents")
    }

    pub fn context_dir(&self) -> PathBuf {
        self.shared_dir().join("context")
    }

    /// Path of a project directory inside the workspace.
    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn todos_file(&self) -> PathBuf {
        self.root.join("TO-DOS.md")
    }

    pub fn handoff_file(&self) -> PathBuf {
        self.root.join("whats-next.md")
    }

    pub fn time_file(&self) -> PathBuf {
        self.root.join("time-tracking.json")
    }

    pub fn notes_file(&self) -> PathBuf {
        self.root.join("notes.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "ai-cli".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            workspace: WorkspaceConfig {
                root: PathBuf::from("."),
                package_root: PathBuf::from("."),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            credentials: CredentialsConfig {
                time_api_token: None,
            },
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// `AI_CLI_WORKSPACE` sets the workspace root (default: current
    /// directory), `AI_CLI_PACKAGE_ROOT` the bundled resource root,
    /// `AI_CLI_LOG_LEVEL` the log level, and `TOGGL_API_TOKEN` the
    /// time-tracking token.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        config.workspace.root = resolve_workspace();
        config.workspace.package_root = resolve_package_root();

        if let Ok(level) = std::env::var("AI_CLI_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(token) = std::env::var("TOGGL_API_TOKEN") {
            config.credentials.time_api_token = Some(token);
            info!("Time-tracking API token loaded from environment");
        }

        config
    }

    /// Override the workspace root (used by the `--workspace` CLI flag).
    pub fn with_workspace(mut self, root: &Path) -> Self {
        self.workspace.root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        self
    }
}

/// Resolve the workspace root: `AI_CLI_WORKSPACE` or the current directory.
pub fn resolve_workspace() -> PathBuf {
    match std::env::var("AI_CLI_WORKSPACE") {
        Ok(ws) if !ws.is_empty() => {
            let path = PathBuf::from(ws);
            std::fs::canonicalize(&path).unwrap_or(path)
        }
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Resolve the bundled resource root: `AI_CLI_PACKAGE_ROOT`, the directory
/// of the executable, or the current directory as a last resort.
pub fn resolve_package_root() -> PathBuf {
    if let Ok(root) = std::env::var("AI_CLI_PACKAGE_ROOT") {
        if !root.is_empty() {
            return PathBuf::from(root);
        }
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_workspace_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("AI_CLI_WORKSPACE", dir.path());
        let config = Config::from_env();
        assert_eq!(
            config.workspace.root,
            std::fs::canonicalize(dir.path()).unwrap()
        );
        std::env::remove_var("AI_CLI_WORKSPACE");
    }

    #[test]
    fn test_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        std::env::set_var("TOGGL_API_TOKEN", "test_token_12345");
        let config = Config::from_env();
        assert_eq!(
            config.credentials.time_api_token.as_deref(),
            Some("test_token_12345")
        );
        std::env::remove_var("TOGGL_API_TOKEN");
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            time_api_token: Some("super_secret_token".to_string()),
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_token"));
    }

    #[test]
    fn test_shared_dir_prefers_workspace_local() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.workspace.root = dir.path().to_path_buf();
        config.workspace.package_root = PathBuf::from("/bundled");

        // No local override yet: falls back to the package root
        assert_eq!(config.workspace.shared_dir(), PathBuf::from("/bundled"));

        std::fs::create_dir_all(dir.path().join(".ai-cli").join("shared")).unwrap();
        assert_eq!(
            config.workspace.shared_dir(),
            dir.path().join(".ai-cli").join("shared")
        );
    }

    #[test]
    fn test_store_paths() {
        let config = Config::default();
        assert!(config.workspace.todos_file().ends_with("TO-DOS.md"));
        assert!(config.workspace.handoff_file().ends_with("whats-next.md"));
        assert!(config.workspace.time_file().ends_with("time-tracking.json"));
        assert!(config.workspace.notes_file().ends_with("notes.json"));
    }
}
