//! The immutable result of connection resolution.
//!
//! A [`ResolvedConfig`] is what a client factory consumes: credentials,
//! region, profile, role assumption data, endpoint overrides and client
//! construction settings, already merged from every configuration channel.
//! Built by [`crate::resolver`]; nothing here mutates after construction.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use connwrap_types::Extra;
use serde_json::{Map, Value};

use crate::assume_role::AssumeRoleMethod;
use crate::client_config::{ClientConfig, ClientConfigKwargs};
use crate::diagnostics::ConfigWarning;
use crate::extra::{ServiceConfigMap, Verify};
use crate::{ConfigError, Result};

/// Connection type assumed when a stored connection does not name one.
pub const DEFAULT_CONN_TYPE: &str = "aws";

/// Service name of the security token service.
pub const STS_SERVICE: &str = "sts";

/// Display form of a connection, used in warnings and errors.
pub fn connection_repr(conn_id: Option<&str>, conn_type: &str) -> String {
    match conn_id {
        Some(id) => format!("AWS Connection (conn_id='{}', conn_type='{}')", id, conn_type),
        None => format!("AWS Connection (conn_id=None, conn_type='{}')", conn_type),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Where the access key pair was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The connection's login/password fields.
    Login,
    /// Keys in the connection extra.
    Extra,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Login => write!(f, "connection login/password"),
            CredentialSource::Extra => write!(f, "connection extra"),
        }
    }
}

/// Static credentials resolved from a connection.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    /// Where the key pair came from; `None` when neither key is set.
    pub source: Option<CredentialSource>,
}

impl Credentials {
    /// True when no credential value is set.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_none()
            && self.secret_access_key.is_none()
            && self.session_token.is_none()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redact(&self.secret_access_key))
            .field("session_token", &redact(&self.session_token))
            .field("source", &self.source)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Endpoint lookup
// ─────────────────────────────────────────────────────────────────────────────

/// Flags that disambiguate which STS client an endpoint is wanted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointLookup {
    /// Endpoint for the STS client used to assume a role.
    pub sts_connection_assume: bool,
    /// Endpoint for the STS client used to test a connection.
    pub sts_test_connection: bool,
}

impl EndpointLookup {
    /// Lookup for the assume-role STS client.
    pub fn sts_assume() -> Self {
        Self {
            sts_connection_assume: true,
            sts_test_connection: false,
        }
    }

    /// Lookup for the connection-test STS client.
    pub fn sts_test() -> Self {
        Self {
            sts_connection_assume: false,
            sts_test_connection: true,
        }
    }

    fn any_sts(&self) -> bool {
        self.sts_connection_assume || self.sts_test_connection
    }
}

/// Outcome of an endpoint lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEndpoint {
    /// No endpoint configured anywhere.
    NotConfigured,
    /// Explicitly configured as null: use the provider's default endpoint
    /// even if a global endpoint is set.
    ProviderDefault,
    /// Use this URL.
    Url(String),
}

impl ServiceEndpoint {
    /// The URL to pass to a client, if any.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            ServiceEndpoint::Url(url) => Some(url),
            ServiceEndpoint::NotConfigured | ServiceEndpoint::ProviderDefault => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResolvedConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Fully resolved connection configuration.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub(crate) conn_id: Option<String>,
    pub(crate) conn_type: String,
    pub(crate) login: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) schema: Option<String>,
    pub(crate) extra_config: Extra,
    pub(crate) credentials: Credentials,
    pub(crate) region_name: Option<String>,
    pub(crate) profile_name: Option<String>,
    pub(crate) endpoint_url: Option<String>,
    pub(crate) test_endpoint_url: Option<String>,
    pub(crate) verify: Option<Verify>,
    pub(crate) role_arn: Option<String>,
    pub(crate) assume_role_method: Option<AssumeRoleMethod>,
    pub(crate) assume_role_kwargs: Map<String, Value>,
    pub(crate) service_config: ServiceConfigMap,
    pub(crate) client_config_kwargs: Option<ClientConfigKwargs>,
    /// Built on first access from `client_config_kwargs`, or pre-filled
    /// with an override.
    pub(crate) client_config: OnceLock<Option<Arc<ClientConfig>>>,
    pub(crate) present: bool,
    pub(crate) warnings: Vec<ConfigWarning>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            conn_id: None,
            conn_type: DEFAULT_CONN_TYPE.to_string(),
            login: None,
            password: None,
            schema: None,
            extra_config: Extra::new(),
            credentials: Credentials::default(),
            region_name: None,
            profile_name: None,
            endpoint_url: None,
            test_endpoint_url: None,
            verify: None,
            role_arn: None,
            assume_role_method: None,
            assume_role_kwargs: Map::new(),
            service_config: ServiceConfigMap::new(),
            client_config_kwargs: None,
            client_config: OnceLock::new(),
            present: false,
            warnings: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("conn_id", &self.conn_id)
            .field("conn_type", &self.conn_type)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .field("credentials", &self.credentials)
            .field("region_name", &self.region_name)
            .field("profile_name", &self.profile_name)
            .field("endpoint_url", &self.endpoint_url)
            .field("verify", &self.verify)
            .field("role_arn", &self.role_arn)
            .field("assume_role_method", &self.assume_role_method)
            .field("service_config", &self.service_config)
            .field("present", &self.present)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl ResolvedConfig {
    /// An empty resolution: no connection and no overrides.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this config came from a connection or at least one override.
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn conn_id(&self) -> Option<&str> {
        self.conn_id.as_deref()
    }

    pub fn conn_type(&self) -> &str {
        &self.conn_type
    }

    /// Login exactly as stored on the connection.
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Password exactly as stored on the connection.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Copy of the connection extra this config was resolved from.
    pub fn extra_config(&self) -> &Extra {
        &self.extra_config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn access_key_id(&self) -> Option<&str> {
        self.credentials.access_key_id.as_deref()
    }

    pub fn secret_access_key(&self) -> Option<&str> {
        self.credentials.secret_access_key.as_deref()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.credentials.session_token.as_deref()
    }

    pub fn region_name(&self) -> Option<&str> {
        self.region_name.as_deref()
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }

    /// Global endpoint override for every service.
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn verify(&self) -> Option<&Verify> {
        self.verify.as_ref()
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    /// Set only when a role ARN is configured.
    pub fn assume_role_method(&self) -> Option<AssumeRoleMethod> {
        self.assume_role_method
    }

    pub fn assume_role_kwargs(&self) -> &Map<String, Value> {
        &self.assume_role_kwargs
    }

    pub fn service_config(&self) -> &ServiceConfigMap {
        &self.service_config
    }

    /// Raw client config kwargs from the connection extra.
    pub fn client_config_kwargs(&self) -> Option<&ClientConfigKwargs> {
        self.client_config_kwargs.as_ref()
    }

    /// Warnings raised while resolving.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Display form used in diagnostics.
    pub fn connection_repr(&self) -> String {
        connection_repr(self.conn_id.as_deref(), &self.conn_type)
    }

    /// Client configuration: the override if one was given, otherwise built
    /// from the connection's `config_kwargs` on first call and shared after.
    pub fn client_config(&self) -> Option<Arc<ClientConfig>> {
        self.client_config
            .get_or_init(|| {
                self.client_config_kwargs.clone().map(|kwargs| {
                    tracing::debug!(
                        connection = %self.connection_repr(),
                        "building client config from config_kwargs"
                    );
                    Arc::new(ClientConfig::from_kwargs(kwargs))
                })
            })
            .clone()
    }

    /// Keyword arguments for constructing an SDK session.
    ///
    /// Absent values are omitted. Each call returns a new map.
    pub fn session_kwargs(&self) -> Map<String, Value> {
        let entries = [
            ("aws_access_key_id", &self.credentials.access_key_id),
            ("aws_secret_access_key", &self.credentials.secret_access_key),
            ("aws_session_token", &self.credentials.session_token),
            ("region_name", &self.region_name),
            ("profile_name", &self.profile_name),
        ];

        entries
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| (key.to_string(), Value::String(v.clone())))
            })
            .collect()
    }

    /// Per-service settings.
    ///
    /// Returns `None` when the service is configured as explicit null, and an
    /// empty map when the service is not mentioned at all.
    pub fn get_service_config(&self, service_name: &str) -> Option<Cow<'_, Map<String, Value>>> {
        match self.service_config.get(service_name) {
            Some(Some(config)) => Some(Cow::Borrowed(config)),
            Some(None) => None,
            None => Some(Cow::Owned(Map::new())),
        }
    }

    /// Endpoint URL for a service.
    ///
    /// A per-service `endpoint_url` always wins, including an explicit null
    /// which forces the provider default. Otherwise the global
    /// `endpoint_url` applies; for the connection-test STS client a
    /// `test_endpoint_url` in the extra takes precedence over it.
    pub fn get_service_endpoint_url(
        &self,
        service_name: &str,
        lookup: EndpointLookup,
    ) -> Result<ServiceEndpoint> {
        let sts_lookup = service_name == STS_SERVICE && lookup.any_sts();
        if sts_lookup && lookup.sts_connection_assume && lookup.sts_test_connection {
            return Err(ConfigError::ConflictingStsFlags);
        }

        if let Some(Some(config)) = self.service_config.get(service_name)
            && let Some(endpoint) = config.get("endpoint_url")
        {
            return Ok(match endpoint {
                Value::String(url) => ServiceEndpoint::Url(url.clone()),
                _ => ServiceEndpoint::ProviderDefault,
            });
        }

        let global = if sts_lookup && lookup.sts_test_connection {
            self.test_endpoint_url.as_ref().or(self.endpoint_url.as_ref())
        } else {
            self.endpoint_url.as_ref()
        };

        Ok(match global {
            Some(url) => ServiceEndpoint::Url(url.clone()),
            None => ServiceEndpoint::NotConfigured,
        })
    }
}
