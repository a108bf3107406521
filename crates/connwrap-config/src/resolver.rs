//! Connection config resolution. Merges every configuration channel into a
//! [`ResolvedConfig`].
//!
//! Precedence, highest first:
//! 1. Explicit [`Overrides`] (region, client config, verify)
//! 2. The stored connection's login/password (credentials only)
//! 3. The stored connection's extra mapping
//! 4. Built-in defaults (conn type `aws`, assume-role method `assume_role`)
//!
//! A previously resolved config can itself be the source; its derived fields
//! are carried over unchanged and only the override-eligible fields move.

use std::sync::{Arc, OnceLock};

use connwrap_types::{ConnectionStore, SharedConnectionStore, StoredConnection};
use serde_json::Value;

use crate::assume_role::AssumeRoleMethod;
use crate::client_config::ClientConfig;
use crate::diagnostics::ConfigWarning;
use crate::extra::{ExtraFields, Verify};
use crate::resolved::{
    CredentialSource, Credentials, DEFAULT_CONN_TYPE, ResolvedConfig, connection_repr,
};
use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Call-site values that take precedence over stored configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub region_name: Option<String>,
    pub client_config: Option<Arc<ClientConfig>>,
    pub verify: Option<Verify>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region_name(mut self, region: impl Into<String>) -> Self {
        self.region_name = Some(region.into());
        self
    }

    pub fn with_client_config(mut self, config: impl Into<Arc<ClientConfig>>) -> Self {
        self.client_config = Some(config.into());
        self
    }

    pub fn with_verify(mut self, verify: Verify) -> Self {
        self.verify = Some(verify);
        self
    }

    /// True when no override is set.
    pub fn is_empty(&self) -> bool {
        self.region_name.is_none() && self.client_config.is_none() && self.verify.is_none()
    }
}

/// What a resolution starts from.
#[derive(Debug, Clone, Copy, Default)]
pub enum ConfigSource<'a> {
    /// Nothing stored; overrides only.
    #[default]
    None,
    /// A stored connection record.
    Connection(&'a StoredConnection),
    /// A previous resolution being layered on.
    Resolved(&'a ResolvedConfig),
}

impl<'a> From<&'a StoredConnection> for ConfigSource<'a> {
    fn from(conn: &'a StoredConnection) -> Self {
        ConfigSource::Connection(conn)
    }
}

impl<'a> From<&'a ResolvedConfig> for ConfigSource<'a> {
    fn from(config: &'a ResolvedConfig) -> Self {
        ConfigSource::Resolved(config)
    }
}

impl<'a> From<Option<&'a StoredConnection>> for ConfigSource<'a> {
    fn from(conn: Option<&'a StoredConnection>) -> Self {
        conn.map_or(ConfigSource::None, ConfigSource::Connection)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve a config from any source plus overrides.
pub fn resolve<'a>(
    source: impl Into<ConfigSource<'a>>,
    overrides: Overrides,
) -> Result<ResolvedConfig> {
    match source.into() {
        ConfigSource::None => Ok(ResolvedConfig::from_overrides(overrides)),
        ConfigSource::Connection(conn) => ResolvedConfig::from_connection(conn, overrides),
        ConfigSource::Resolved(prior) => Ok(prior.wrap(overrides)),
    }
}

impl ResolvedConfig {
    /// Build purely from overrides; every connection-derived field is empty.
    pub fn from_overrides(overrides: Overrides) -> Self {
        let present = !overrides.is_empty();
        Self {
            region_name: overrides.region_name,
            verify: overrides.verify,
            client_config: OnceLock::from(overrides.client_config),
            present,
            ..Self::default()
        }
    }

    /// Layer overrides on top of this config.
    ///
    /// Region, client config and verify follow override-wins precedence;
    /// every other field is copied unchanged.
    pub fn wrap(&self, overrides: Overrides) -> Self {
        let present = self.present || !overrides.is_empty();
        let client_config = match overrides.client_config {
            Some(config) => OnceLock::from(Some(config)),
            None => self.client_config.clone(),
        };

        Self {
            region_name: overrides.region_name.or_else(|| self.region_name.clone()),
            verify: overrides.verify.or_else(|| self.verify.clone()),
            client_config,
            present,
            ..self.clone()
        }
    }

    /// Resolve a stored connection.
    pub fn from_connection(conn: &StoredConnection, overrides: Overrides) -> Result<Self> {
        let conn_type = conn
            .conn_type
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONN_TYPE.to_string());
        let connection = connection_repr(conn.conn_id.as_deref(), &conn_type);
        let mut warnings = Vec::new();

        if conn_type != DEFAULT_CONN_TYPE {
            warnings.push(
                ConfigWarning::UnexpectedConnType {
                    expected: DEFAULT_CONN_TYPE.to_string(),
                    found: conn_type.clone(),
                    connection: connection.clone(),
                }
                .emit(),
            );
        }

        let extra = conn.extra.clone();
        let fields = ExtraFields::parse(&extra, &connection)?;

        let credentials = resolve_credentials(conn, &fields, &connection);

        if fields.has_legacy_profile && !fields.has_s3_config_file && fields.profile_name.is_none()
        {
            warnings.push(
                ConfigWarning::DeprecatedProfileField {
                    connection: connection.clone(),
                }
                .emit(),
            );
        }

        let (assume_role_method, assume_role_kwargs) = match fields.role_arn {
            Some(_) => {
                let method = match fields.assume_role_method.as_deref() {
                    None => AssumeRoleMethod::default(),
                    Some(raw) => AssumeRoleMethod::parse(raw).ok_or_else(|| {
                        ConfigError::UnsupportedAssumeRoleMethod {
                            method: raw.to_string(),
                            connection: connection.clone(),
                            supported: AssumeRoleMethod::supported_names(),
                        }
                    })?,
                };

                let mut kwargs = fields.assume_role_kwargs.clone().unwrap_or_default();
                if let Some(external_id) = fields.external_id.clone() {
                    kwargs.insert("ExternalId".to_string(), Value::String(external_id));
                }
                (Some(method), kwargs)
            }
            None => (None, Default::default()),
        };

        let client_config = match overrides.client_config {
            Some(config) => OnceLock::from(Some(config)),
            None => OnceLock::new(),
        };

        Ok(Self {
            conn_id: conn.conn_id.clone(),
            conn_type,
            login: conn.login.clone(),
            password: conn.password.clone(),
            schema: conn.schema.clone(),
            extra_config: extra,
            credentials,
            region_name: overrides.region_name.or(fields.region_name),
            profile_name: fields.profile_name,
            endpoint_url: fields.endpoint_url,
            test_endpoint_url: fields.test_endpoint_url,
            verify: overrides.verify.or(fields.verify),
            role_arn: fields.role_arn,
            assume_role_method,
            assume_role_kwargs,
            service_config: fields.service_config,
            client_config_kwargs: fields.config_kwargs,
            client_config,
            present: true,
            warnings,
        })
    }
}

/// Login/password win when both are set; otherwise the extra keys are used
/// as given. The session token only ever comes from the extra.
fn resolve_credentials(
    conn: &StoredConnection,
    fields: &ExtraFields,
    connection: &str,
) -> Credentials {
    let login = conn.login.as_deref().filter(|s| !s.is_empty());
    let password = conn.password.as_deref().filter(|s| !s.is_empty());
    let session_token = fields.aws_session_token.clone();

    if let (Some(login), Some(password)) = (login, password) {
        tracing::debug!(connection, "credentials retrieved from login and password");
        return Credentials {
            access_key_id: Some(login.to_string()),
            secret_access_key: Some(password.to_string()),
            session_token,
            source: Some(CredentialSource::Login),
        };
    }

    let access_key_id = fields.aws_access_key_id.clone();
    let secret_access_key = fields.aws_secret_access_key.clone();
    let source = if access_key_id.is_some() || secret_access_key.is_some() {
        tracing::debug!(connection, "credentials retrieved from extra");
        Some(CredentialSource::Extra)
    } else {
        None
    };

    Credentials {
        access_key_id,
        secret_access_key,
        session_token,
        source,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store-backed resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves connection ids through a [`ConnectionStore`].
#[derive(Debug, Clone)]
pub struct ConnectionConfigResolver<S = SharedConnectionStore> {
    store: S,
}

impl<S: ConnectionStore> ConnectionConfigResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `conn_id` with overrides.
    ///
    /// - `None` resolves from overrides only.
    /// - An unknown id logs a warning and also resolves from overrides only,
    ///   so callers can fall back to ambient credentials.
    /// - Store errors propagate.
    pub fn resolve(&self, conn_id: Option<&str>, overrides: Overrides) -> Result<ResolvedConfig> {
        let Some(conn_id) = conn_id else {
            tracing::debug!("no connection id given, resolving from overrides only");
            return Ok(ResolvedConfig::from_overrides(overrides));
        };

        match self.store.get_connection(conn_id)? {
            Some(conn) => ResolvedConfig::from_connection(&conn, overrides),
            None => {
                let warning = ConfigWarning::ConnectionNotFound {
                    conn_id: conn_id.to_string(),
                    store: self.store.store_name().to_string(),
                }
                .emit();
                let mut config = ResolvedConfig::from_overrides(overrides);
                config.warnings.push(warning);
                Ok(config)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
