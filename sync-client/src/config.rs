//! Configuration for the actsync client.
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! [session]
//! project_name = "demo"
//! task_index = 3
//! task_id = "task-3"
//! user_id = "alice"
//!
//! [sync]
//! endpoint = "ws://localhost:5000"
//! autosave = true
//! compute_enabled = true
//! compute_actions = ["predict"]
//! ```

use actsync_core::{SessionContext, SyncOptions};
use actsync_types::SessionId;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Session identity.
    pub session: SessionConfig,
    /// Synchronization behaviour.
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Session identity.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Project the task belongs to.
    pub project_name: String,
    /// Index of the task within the project (default: 0).
    #[serde(default)]
    pub task_index: u64,
    /// Task identifier used in sync requests.
    pub task_id: String,
    /// User identity.
    pub user_id: String,
    /// Origin address reported at registration (default: "127.0.0.1").
    #[serde(default = "default_address")]
    pub address: String,
    /// Session identifier (default: random UUID, fixed for the config's lifetime).
    #[serde(default = "SessionId::random")]
    pub session_id: SessionId,
}

/// Synchronization behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    /// Backend address (default: ws://127.0.0.1:5000).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Reconcile and flush after reconnect (default: true).
    #[serde(default = "default_autosave")]
    pub autosave: bool,
    /// Track packets that start backend compute (default: false).
    #[serde(default)]
    pub compute_enabled: bool,
    /// Action names whose packets start backend compute.
    #[serde(default)]
    pub compute_actions: Vec<String>,
    /// Buffered status notifications per observer (default: 256).
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

// Default value functions
fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_endpoint() -> String {
    "ws://127.0.0.1:5000".to_string()
}

fn default_autosave() -> bool {
    true
}

fn default_event_capacity() -> usize {
    256
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            autosave: default_autosave(),
            compute_enabled: false,
            compute_actions: Vec::new(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl SyncConfig {
    /// Create a configuration with a random session id and default settings.
    pub fn new(project_name: &str, task_index: u64, task_id: &str, user_id: &str) -> Self {
        Self {
            session: SessionConfig {
                project_name: project_name.to_string(),
                task_index,
                task_id: task_id.to_string(),
                user_id: user_id.to_string(),
                address: default_address(),
                session_id: SessionId::random(),
            },
            sync: SyncSettings::default(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Set the session id.
    pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session.session_id = session_id.into();
        self
    }

    /// Set the origin address.
    pub fn with_address(mut self, address: &str) -> Self {
        self.session.address = address.to_string();
        self
    }

    /// Set the backend endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.sync.endpoint = endpoint.to_string();
        self
    }

    /// Enable or disable autosave.
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.sync.autosave = autosave;
        self
    }

    /// Enable compute tracking for packets containing any of `names`.
    pub fn with_compute_actions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sync.compute_enabled = true;
        self.sync.compute_actions = names.into_iter().map(Into::into).collect();
        self
    }

    /// The session identity handed to the synchronizer.
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            project_name: self.session.project_name.clone(),
            task_index: self.session.task_index,
            task_id: self.session.task_id.clone(),
            session_id: self.session.session_id.clone(),
            user_id: self.session.user_id.clone(),
            address: self.session.address.clone(),
        }
    }

    /// The behaviour switches handed to the synchronizer.
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            autosave: self.sync.autosave,
            compute_enabled: self.sync.compute_enabled,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn new_config_uses_defaults() {
        let config = SyncConfig::new("demo", 3, "task-3", "alice");
        assert_eq!(config.session.address, "127.0.0.1");
        assert_eq!(config.sync.endpoint, "ws://127.0.0.1:5000");
        assert!(config.sync.autosave);
        assert!(!config.sync.compute_enabled);
        assert_eq!(config.sync.event_capacity, 256);
    }

    #[test]
    fn config_builder_pattern() {
        let config = SyncConfig::new("demo", 3, "task-3", "alice")
            .with_session_id("s1")
            .with_address("10.0.0.9")
            .with_endpoint("ws://backend:7000")
            .with_autosave(false)
            .with_compute_actions(["predict"]);

        assert_eq!(config.session.session_id, SessionId::from("s1"));
        assert_eq!(config.session.address, "10.0.0.9");
        assert_eq!(config.sync.endpoint, "ws://backend:7000");
        assert!(!config.options().autosave);
        assert!(config.options().compute_enabled);
        assert_eq!(config.sync.compute_actions, vec!["predict".to_string()]);
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[session]
project_name = "demo"
task_index = 12
task_id = "task-12"
user_id = "bob"
session_id = "s-fixed"

[sync]
endpoint = "ws://10.1.1.1:5000"
autosave = false
compute_enabled = true
compute_actions = ["predict", "segment"]
"#;

        let config: SyncConfig = toml::from_str(toml).unwrap();
        let context = config.session_context();
        assert_eq!(context.project_name, "demo");
        assert_eq!(context.task_index, 12);
        assert_eq!(context.task_id, "task-12");
        assert_eq!(context.user_id, "bob");
        assert_eq!(context.session_id, SessionId::from("s-fixed"));
        assert_eq!(config.sync.endpoint, "ws://10.1.1.1:5000");
        assert!(!config.sync.autosave);
        assert_eq!(config.sync.compute_actions.len(), 2);
    }

    #[test]
    fn sync_section_is_optional() {
        let toml = r#"
[session]
project_name = "demo"
task_id = "task-0"
user_id = "carol"
"#;

        let config: SyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.session.task_index, 0);
        assert!(config.sync.autosave);
        assert!(!config.session.session_id.as_str().is_empty());
    }

    #[test]
    fn missing_identity_is_a_parse_error() {
        let result: Result<SyncConfig, _> = toml::from_str("[session]\nproject_name = \"demo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[session]\nproject_name = \"demo\"\ntask_id = \"t\"\nuser_id = \"u\""
        )
        .unwrap();

        let config = SyncConfig::from_file(file.path()).unwrap();
        assert_eq!(config.session.user_id, "u");
    }

    #[test]
    fn from_file_reports_missing_file() {
        let result = SyncConfig::from_file(Path::new("/nonexistent/actsync.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session\nbroken").unwrap();

        let result = SyncConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
