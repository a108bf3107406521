//! Typed extraction of a connection's extra mapping.
//!
//! The extra mapping is free-form JSON. Every field the resolver understands
//! is read here exactly once and checked for shape, so later code works with
//! typed values and never re-inspects raw JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use connwrap_types::{Extra, json_kind};
use serde_json::{Map, Value};

use crate::client_config::ClientConfigKwargs;
use crate::{ConfigError, Result};

/// TLS certificate verification setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verify {
    /// Verify (or skip verifying) against the default trust store.
    Enabled(bool),
    /// Verify against a specific CA bundle.
    CaBundle(PathBuf),
}

/// Per-service settings: `Some(map)` when configured, `None` for explicit null.
pub type ServiceConfigMap = BTreeMap<String, Option<Map<String, Value>>>;

/// Fields read from the extra mapping.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExtraFields {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub region_name: Option<String>,
    pub profile_name: Option<String>,
    pub has_legacy_profile: bool,
    pub has_s3_config_file: bool,
    pub role_arn: Option<String>,
    pub assume_role_method: Option<String>,
    pub assume_role_kwargs: Option<Map<String, Value>>,
    pub external_id: Option<String>,
    pub endpoint_url: Option<String>,
    pub test_endpoint_url: Option<String>,
    pub verify: Option<Verify>,
    pub service_config: ServiceConfigMap,
    pub config_kwargs: Option<ClientConfigKwargs>,
}

impl ExtraFields {
    /// Read every known field from `extra`.
    ///
    /// `connection` is the display form of the connection, used in errors.
    pub fn parse(extra: &Extra, connection: &str) -> Result<Self> {
        let reader = FieldReader { extra, connection };

        Ok(Self {
            aws_access_key_id: reader.string("aws_access_key_id")?,
            aws_secret_access_key: reader.string("aws_secret_access_key")?,
            aws_session_token: reader.string("aws_session_token")?,
            region_name: reader.string("region_name")?,
            profile_name: reader.string("profile_name")?,
            has_legacy_profile: extra.contains_key("profile"),
            has_s3_config_file: extra.contains_key("s3_config_file"),
            role_arn: reader.string("role_arn")?,
            assume_role_method: reader.string("assume_role_method")?,
            assume_role_kwargs: reader.object("assume_role_kwargs")?,
            external_id: reader.string("external_id")?,
            endpoint_url: reader.string("endpoint_url")?,
            test_endpoint_url: reader.string("test_endpoint_url")?,
            verify: reader.verify("verify")?,
            service_config: reader.service_config("service_config")?,
            config_kwargs: reader.config_kwargs("config_kwargs")?,
        })
    }
}

struct FieldReader<'a> {
    extra: &'a Extra,
    connection: &'a str,
}

impl FieldReader<'_> {
    fn invalid(&self, field: &str, expected: &'static str, found: &Value) -> ConfigError {
        ConfigError::InvalidExtraField {
            field: field.to_string(),
            expected,
            found: json_kind(found),
            connection: self.connection.to_string(),
        }
    }

    fn string(&self, key: &str) -> Result<Option<String>> {
        match self.extra.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(key, "string", other)),
        }
    }

    fn object(&self, key: &str) -> Result<Option<Map<String, Value>>> {
        match self.extra.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(other) => Err(self.invalid(key, "object", other)),
        }
    }

    fn verify(&self, key: &str) -> Result<Option<Verify>> {
        match self.extra.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(Verify::Enabled(*b))),
            Some(Value::String(path)) => Ok(Some(Verify::CaBundle(PathBuf::from(path)))),
            Some(other) => Err(self.invalid(key, "boolean or CA bundle path", other)),
        }
    }

    fn service_config(&self, key: &str) -> Result<ServiceConfigMap> {
        let Some(services) = self.object(key)? else {
            return Ok(ServiceConfigMap::new());
        };

        let mut resolved = ServiceConfigMap::new();
        for (service, value) in services {
            let field = format!("{}.{}", key, service);
            let config = match value {
                Value::Null => None,
                Value::Object(map) => {
                    if let Some(endpoint) = map.get("endpoint_url")
                        && !matches!(endpoint, Value::Null | Value::String(_))
                    {
                        return Err(self.invalid(
                            &format!("{}.endpoint_url", field),
                            "string or null",
                            endpoint,
                        ));
                    }
                    Some(map)
                }
                other => return Err(self.invalid(&field, "object or null", &other)),
            };
            resolved.insert(service, config);
        }
        Ok(resolved)
    }

    fn config_kwargs(&self, key: &str) -> Result<Option<ClientConfigKwargs>> {
        match self.object(key)? {
            Some(map) if !map.is_empty() => ClientConfigKwargs::from_value(Value::Object(map))
                .map(Some)
                .map_err(|reason| ConfigError::InvalidClientConfig {
                    connection: self.connection.to_string(),
                    reason,
                }),
            _ => Ok(None),
        }
    }
}
