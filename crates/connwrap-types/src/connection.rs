//! Stored connection records.
//!
//! A [`StoredConnection`] is the externally persisted description of how to
//! reach a service. The `extra` field carries free-form provider settings and
//! may arrive as a JSON object, as a JSON-encoded string, or as null:
//!
//! ```json
//! {
//!   "conn_id": "aws_default",
//!   "conn_type": "aws",
//!   "login": "AKIA...",
//!   "password": "...",
//!   "extra": "{\"region_name\": \"eu-west-1\"}"
//! }
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConnectionError, Result};

/// The free-form extra mapping attached to a connection.
pub type Extra = Map<String, Value>;

/// An externally stored connection record.
///
/// Read-only from the point of view of the resolver; every field is optional
/// because stores are free to persist partial records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConnection {
    /// Connection identifier.
    #[serde(default)]
    pub conn_id: Option<String>,

    /// Connection type (e.g. "aws").
    #[serde(default)]
    pub conn_type: Option<String>,

    #[serde(default)]
    pub login: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Provider-specific settings.
    #[serde(
        default,
        deserialize_with = "deserialize_extra",
        skip_serializing_if = "Map::is_empty"
    )]
    pub extra: Extra,
}

impl StoredConnection {
    /// Create a connection with an id and type.
    pub fn new(conn_id: impl Into<String>, conn_type: impl Into<String>) -> Self {
        Self {
            conn_id: Some(conn_id.into()),
            conn_type: Some(conn_type.into()),
            ..Default::default()
        }
    }

    /// Parse a connection from its JSON object form.
    pub fn from_json(conn_id: &str, json: &str) -> Result<Self> {
        let mut conn: StoredConnection =
            serde_json::from_str(json).map_err(|source| ConnectionError::InvalidDefinition {
                conn_id: conn_id.to_string(),
                source,
            })?;
        if conn.conn_id.is_none() {
            conn.conn_id = Some(conn_id.to_string());
        }
        Ok(conn)
    }

    pub fn with_conn_type(mut self, conn_type: Option<&str>) -> Self {
        self.conn_type = conn_type.map(str::to_string);
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the extra mapping from a JSON value (object, JSON string, or null).
    pub fn with_extra(mut self, extra: Value) -> Result<Self> {
        self.extra = extra_from_value(extra)?;
        Ok(self)
    }

    /// Set the extra mapping from an already decoded map.
    pub fn with_extra_map(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }

    /// The extra mapping, decoded.
    pub fn extra_dejson(&self) -> &Extra {
        &self.extra
    }
}

/// Decode a raw extra string.
///
/// Blank strings decode to an empty mapping.
pub fn parse_extra(raw: &str) -> Result<Extra> {
    if raw.trim().is_empty() {
        return Ok(Extra::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(ConnectionError::InvalidExtra)?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConnectionError::ExtraNotObject {
            found: json_kind(&other),
        }),
    }
}

/// Normalise any accepted extra representation into a mapping.
pub fn extra_from_value(value: Value) -> Result<Extra> {
    match value {
        Value::Null => Ok(Extra::new()),
        Value::Object(map) => Ok(map),
        Value::String(raw) => parse_extra(&raw),
        other => Err(ConnectionError::ExtraNotObject {
            found: json_kind(&other),
        }),
    }
}

/// Human readable name of a JSON value's type, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn deserialize_extra<'de, D>(deserializer: D) -> std::result::Result<Extra, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    extra_from_value(value).map_err(D::Error::custom)
}
