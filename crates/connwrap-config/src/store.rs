//! Connection stores.
//!
//! - [`MemoryConnectionStore`]: connections held in a map (also the result of
//!   loading connection files, see [`crate::discovery`])
//! - [`EnvConnectionStore`]: `CONNWRAP_CONN_<ID>` environment variables, as
//!   JSON or connection URIs
//! - [`ChainedConnectionStore`]: first hit across several stores

use std::collections::HashMap;

use connwrap_types::{
    ConnectionStore, Result, SharedConnectionStore, StoredConnection, parse_connection_uri,
};

/// Prefix of environment variables holding connections.
pub const ENV_PREFIX: &str = "CONNWRAP_CONN_";

// ─────────────────────────────────────────────────────────────────────────────
// MemoryConnectionStore
// ─────────────────────────────────────────────────────────────────────────────

/// Connections held in memory, keyed by connection id.
#[derive(Debug, Clone)]
pub struct MemoryConnectionStore {
    name: String,
    connections: HashMap<String, StoredConnection>,
}

impl Default for MemoryConnectionStore {
    fn default() -> Self {
        Self {
            name: "memory connection store".to_string(),
            connections: HashMap::new(),
        }
    }
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name used in diagnostics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a connection keyed by its own `conn_id`.
    ///
    /// Connections without an id cannot be looked up and are ignored.
    pub fn with_connection(mut self, conn: StoredConnection) -> Self {
        if let Some(id) = conn.conn_id.clone() {
            self.connections.insert(id, conn);
        }
        self
    }

    /// Insert or replace a connection under `conn_id`.
    pub fn insert(&mut self, conn_id: impl Into<String>, conn: StoredConnection) {
        self.connections.insert(conn_id.into(), conn);
    }

    /// Merge another store on top of this one (other takes priority).
    pub fn merge(&mut self, other: MemoryConnectionStore) {
        self.connections.extend(other.connections);
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Connection ids, sorted.
    pub fn conn_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredConnection)> {
        self.connections.iter().map(|(id, conn)| (id.as_str(), conn))
    }
}

impl ConnectionStore for MemoryConnectionStore {
    fn get_connection(&self, conn_id: &str) -> Result<Option<StoredConnection>> {
        Ok(self.connections.get(conn_id).cloned())
    }

    fn store_name(&self) -> &str {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EnvConnectionStore
// ─────────────────────────────────────────────────────────────────────────────

/// Connections defined in environment variables.
///
/// `CONNWRAP_CONN_AWS_DEFAULT` defines connection `aws_default`. The value is
/// either a JSON object or a connection URI. Values are parsed on lookup.
#[derive(Debug, Clone)]
pub struct EnvConnectionStore {
    prefix: String,
    vars: HashMap<String, String>,
}

impl EnvConnectionStore {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_prefix(ENV_PREFIX, vars)
    }

    /// Build from explicit variables with a custom prefix.
    pub fn with_prefix<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prefix = prefix.into();
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect();
        Self { prefix, vars }
    }

    /// Variable name for a connection id.
    pub fn var_name(&self, conn_id: &str) -> String {
        format!("{}{}", self.prefix, conn_id.to_uppercase())
    }
}

impl ConnectionStore for EnvConnectionStore {
    fn get_connection(&self, conn_id: &str) -> Result<Option<StoredConnection>> {
        let Some(raw) = self.vars.get(&self.var_name(conn_id)) else {
            return Ok(None);
        };

        let raw = raw.trim();
        let conn = if raw.starts_with('{') {
            StoredConnection::from_json(conn_id, raw)?
        } else {
            parse_connection_uri(Some(conn_id), raw)?
        };
        tracing::debug!(conn_id, var = %self.var_name(conn_id), "connection loaded from environment");
        Ok(Some(conn))
    }

    fn store_name(&self) -> &str {
        "environment variables"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ChainedConnectionStore
// ─────────────────────────────────────────────────────────────────────────────

/// Searches stores in order and returns the first hit.
#[derive(Debug, Clone, Default)]
pub struct ChainedConnectionStore {
    stores: Vec<SharedConnectionStore>,
}

impl ChainedConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a store; earlier stores take priority.
    pub fn with_store(mut self, store: SharedConnectionStore) -> Self {
        self.stores.push(store);
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl ConnectionStore for ChainedConnectionStore {
    fn get_connection(&self, conn_id: &str) -> Result<Option<StoredConnection>> {
        for store in &self.stores {
            if let Some(conn) = store.get_connection(conn_id)? {
                tracing::debug!(conn_id, store = store.store_name(), "connection found");
                return Ok(Some(conn));
            }
        }
        Ok(None)
    }

    fn store_name(&self) -> &str {
        "chained connection stores"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
