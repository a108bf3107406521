//! Connection configuration for connwrap.
//!
//! Turns a stored connection record plus explicit overrides into a single
//! [`ResolvedConfig`] that downstream session factories consume:
//! - Credentials from login/password or the extra mapping
//! - Region, profile, and assume-role settings with defaults
//! - Per-service settings and endpoint URLs (including STS lookups)
//! - Client configuration built lazily from `config_kwargs`
//!
//! Connections come from any [`ConnectionStore`](connwrap_types::ConnectionStore):
//! in memory, environment variables, or layered connections files
//! (user config + project-local overrides).

pub mod assume_role;
pub mod client_config;
pub mod diagnostics;
pub mod discovery;
pub mod error;
mod extra;
pub mod resolved;
pub mod resolver;
pub mod store;

pub use assume_role::AssumeRoleMethod;
pub use client_config::{
    ClientConfig, ClientConfigKwargs, RetryConfig, RetryMode, SignatureVersion, UNSIGNED,
};
pub use diagnostics::ConfigWarning;
pub use discovery::{
    ConnectionsSource, LoadedConnections, load_connections, load_connections_file,
    load_connections_with_options, user_config_dir, user_connections_path,
};
pub use error::{ConfigError, Result};
pub use extra::{ServiceConfigMap, Verify};
pub use resolved::{
    CredentialSource, Credentials, DEFAULT_CONN_TYPE, EndpointLookup, ResolvedConfig,
    STS_SERVICE, ServiceEndpoint, connection_repr,
};
pub use resolver::{ConfigSource, ConnectionConfigResolver, Overrides, resolve};
pub use store::{ChainedConnectionStore, ENV_PREFIX, EnvConnectionStore, MemoryConnectionStore};
