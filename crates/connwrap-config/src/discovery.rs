//! Connections file discovery and layered merging.
//!
//! Resolution order (later overrides earlier, per connection id):
//! 1. `~/.config/connwrap/connections.toml` (user config)
//! 2. `./connections.toml` (project-local)
//!
//! TOML files hold a `[connections.<id>]` table per connection; YAML files
//! (`.yaml`/`.yml`) hold a `connections:` mapping with the same shape.
//!
//! ```toml
//! [connections.aws_default]
//! conn_type = "aws"
//!
//! [connections.aws_default.extra]
//! region_name = "eu-west-1"
//! role_arn = "arn:aws:iam::123456789012:role/etl"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use connwrap_types::StoredConnection;
use serde::Deserialize;

use crate::store::MemoryConnectionStore;
use crate::{ConfigError, Result};

/// Default connections filename (user and project-local).
const CONNECTIONS_FILE: &str = "connections.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "connwrap";

/// Environment variable to override the user config directory.
const CONFIG_DIR_ENV: &str = "CONNWRAP_CONFIG_DIR";

/// On-disk shape of a connections file.
#[derive(Debug, Default, Deserialize)]
struct ConnectionsFile {
    #[serde(default)]
    connections: BTreeMap<String, StoredConnection>,
}

/// Tracks where each layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConnectionsSource {
    /// Path to the connections file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConnections {
    /// The merged connections.
    pub store: MemoryConnectionStore,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConnectionsSource>,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConnections {
    /// Paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Discover and merge all connections files.
pub fn load_connections(project_dir: Option<&Path>) -> Result<LoadedConnections> {
    load_connections_with_options(project_dir, None)
}

/// Like [`load_connections`], with `config_dir` replacing the user layer's
/// directory.
pub fn load_connections_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConnections> {
    let user_layer = match config_dir {
        Some(dir) => Some(dir.join(CONNECTIONS_FILE)),
        None => user_connections_path(),
    };
    let project_layer = project_dir
        .unwrap_or_else(|| Path::new("."))
        .join(CONNECTIONS_FILE);

    let mut loaded = LoadedConnections {
        store: MemoryConnectionStore::new().with_name("connections files"),
        sources: Vec::new(),
        warnings: Vec::new(),
    };
    for path in user_layer.into_iter().chain([project_layer]) {
        let layer = if path.is_file() {
            load_connections_file(&path)
                .map_err(|e| {
                    loaded
                        .warnings
                        .push(format!("Failed to load {}: {}", path.display(), e))
                })
                .ok()
        } else {
            None
        };

        let found = layer.is_some();
        if let Some(layer) = layer {
            tracing::info!(path = %path.display(), connections = layer.len(), "loaded connections file");
            loaded.store.merge(layer);
        }
        loaded.sources.push(ConnectionsSource { path, loaded: found });
    }

    check_plaintext_secrets(&loaded.store, &mut loaded.warnings);
    Ok(loaded)
}

/// Load a single connections file (no discovery).
///
/// The format is chosen from the extension. Each connection is stored under
/// its table key, which also becomes its `conn_id`.
pub fn load_connections_file(path: &Path) -> Result<MemoryConnectionStore> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: ConnectionsFile = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseYaml(e.to_string()))?,
        _ => return Err(ConfigError::UnsupportedFileFormat(path.display().to_string())),
    };

    let mut store = MemoryConnectionStore::new().with_name(path.display().to_string());
    for (id, mut conn) in file.connections {
        if let Some(declared) = conn.conn_id.as_deref()
            && declared != id
        {
            tracing::debug!(key = %id, declared, "conn_id differs from table key, using key");
        }
        conn.conn_id = Some(id.clone());
        store.insert(id, conn);
    }
    Ok(store)
}

/// Path of the user connections file.
pub fn user_connections_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(CONNECTIONS_FILE))
}

/// Directory holding the user connections file: `CONNWRAP_CONFIG_DIR` when
/// set, else `connwrap` under the platform config dir.
pub fn user_config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var(CONFIG_DIR_ENV).ok())
}

fn config_dir_from(env_dir: Option<String>) -> Option<PathBuf> {
    match env_dir.filter(|d| !d.is_empty()) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => dirs::config_dir().map(|d| d.join(APP_NAME)),
    }
}

/// Warn about secrets written in plaintext connection files.
fn check_plaintext_secrets(store: &MemoryConnectionStore, warnings: &mut Vec<String>) {
    let mut ids = store.iter().collect::<Vec<_>>();
    ids.sort_by(|a, b| a.0.cmp(b.0));

    for (id, conn) in ids {
        let has_password = conn.password.as_deref().is_some_and(|p| !p.is_empty());
        let has_extra_secret = ["aws_secret_access_key", "aws_session_token"]
            .iter()
            .any(|key| conn.extra.get(*key).is_some_and(|v| !v.is_null()));

        if has_password || has_extra_secret {
            warnings.push(format!(
                "[connections.{}] contains a plaintext secret. \
                 Consider an environment variable connection or a profile instead.",
                id
            ));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
