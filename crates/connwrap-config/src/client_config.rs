//! SDK client construction settings.
//!
//! A connection's extra may carry `config_kwargs`, the keyword arguments for
//! the SDK's client configuration object. They are parsed and validated into
//! [`ClientConfigKwargs`] when a connection is resolved, and turned into a
//! [`ClientConfig`] only when a caller first asks for it.
//!
//! ```json
//! {
//!   "config_kwargs": {
//!     "signature_version": "unsigned",
//!     "connect_timeout": 5,
//!     "retries": {"mode": "standard", "max_attempts": 10}
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Literal used in `config_kwargs` to request unsigned requests.
pub const UNSIGNED: &str = "unsigned";

// ─────────────────────────────────────────────────────────────────────────────
// Kwargs (as written in the connection extra)
// ─────────────────────────────────────────────────────────────────────────────

/// Client configuration keyword arguments from a connection extra.
///
/// Unknown keys are kept in `other` and forwarded to the built config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigKwargs {
    pub region_name: Option<String>,
    pub signature_version: Option<String>,
    pub user_agent: Option<String>,
    pub user_agent_extra: Option<String>,
    /// Seconds.
    pub connect_timeout: Option<f64>,
    /// Seconds.
    pub read_timeout: Option<f64>,
    pub max_pool_connections: Option<u32>,
    pub proxies: Option<BTreeMap<String, String>>,
    pub retries: Option<RetryConfig>,
    pub parameter_validation: Option<bool>,
    pub tcp_keepalive: Option<bool>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ClientConfigKwargs {
    /// Decode and validate kwargs from their JSON form.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let kwargs: ClientConfigKwargs =
            serde_json::from_value(value).map_err(|e| e.to_string())?;
        kwargs.validate()?;
        Ok(kwargs)
    }

    /// Check values the SDK would reject at client construction time.
    pub fn validate(&self) -> std::result::Result<(), String> {
        check_timeout("connect_timeout", self.connect_timeout)?;
        check_timeout("read_timeout", self.read_timeout)?;
        if self.max_pool_connections == Some(0) {
            return Err("max_pool_connections must be at least 1".to_string());
        }
        Ok(())
    }
}

fn check_timeout(name: &str, value: Option<f64>) -> std::result::Result<(), String> {
    match value {
        Some(secs) if Duration::try_from_secs_f64(secs).is_err() => Err(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, secs
        )),
        _ => Ok(()),
    }
}

/// Retry behaviour for SDK calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub total_max_attempts: Option<u32>,
    pub mode: Option<RetryMode>,
}

/// SDK retry strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    Legacy,
    Standard,
    Adaptive,
}

// ─────────────────────────────────────────────────────────────────────────────
// Built config
// ─────────────────────────────────────────────────────────────────────────────

/// Request signing selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureVersion {
    /// Send requests without signing them.
    Unsigned,
    /// A named signer (e.g. "s3v4").
    Named(String),
}

impl SignatureVersion {
    fn from_kwarg(raw: String) -> Self {
        if raw == UNSIGNED {
            SignatureVersion::Unsigned
        } else {
            SignatureVersion::Named(raw)
        }
    }
}

/// Client configuration handed to an SDK client factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    pub region_name: Option<String>,
    pub signature_version: Option<SignatureVersion>,
    pub user_agent: Option<String>,
    pub user_agent_extra: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub max_pool_connections: Option<u32>,
    pub proxies: BTreeMap<String, String>,
    pub retries: Option<RetryConfig>,
    pub parameter_validation: Option<bool>,
    pub tcp_keepalive: Option<bool>,
    /// Settings this crate does not interpret.
    pub other: Map<String, Value>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from validated kwargs.
    pub fn from_kwargs(kwargs: ClientConfigKwargs) -> Self {
        Self {
            region_name: kwargs.region_name,
            signature_version: kwargs.signature_version.map(SignatureVersion::from_kwarg),
            user_agent: kwargs.user_agent,
            user_agent_extra: kwargs.user_agent_extra,
            connect_timeout: kwargs
                .connect_timeout
                .and_then(|s| Duration::try_from_secs_f64(s).ok()),
            read_timeout: kwargs
                .read_timeout
                .and_then(|s| Duration::try_from_secs_f64(s).ok()),
            max_pool_connections: kwargs.max_pool_connections,
            proxies: kwargs.proxies.unwrap_or_default(),
            retries: kwargs.retries,
            parameter_validation: kwargs.parameter_validation,
            tcp_keepalive: kwargs.tcp_keepalive,
            other: kwargs.other,
        }
    }

    pub fn with_region_name(mut self, region: impl Into<String>) -> Self {
        self.region_name = Some(region.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_signature_version(mut self, version: SignatureVersion) -> Self {
        self.signature_version = Some(version);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_retries(mut self, retries: RetryConfig) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Whether requests should go out unsigned.
    pub fn is_unsigned(&self) -> bool {
        self.signature_version == Some(SignatureVersion::Unsigned)
    }
}
