//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The extra mapping names an assume-role method that is not implemented.
    #[error(
        "found assume_role_method={method:?} in {connection} extra; \
         supported methods: {supported}"
    )]
    UnsupportedAssumeRoleMethod {
        method: String,
        connection: String,
        supported: String,
    },

    /// Both STS disambiguation flags were set on one endpoint lookup.
    #[error(
        "can't resolve STS endpoint when both sts_connection_assume and \
         sts_test_connection are set"
    )]
    ConflictingStsFlags,

    /// A field in the extra mapping has the wrong shape.
    #[error("invalid '{field}' in {connection} extra: expected {expected}, got {found}")]
    InvalidExtraField {
        field: String,
        expected: &'static str,
        found: &'static str,
        connection: String,
    },

    /// `config_kwargs` could not be turned into a client config.
    #[error("invalid 'config_kwargs' in {connection} extra: {reason}")]
    InvalidClientConfig { connection: String, reason: String },

    /// Stored connection could not be decoded or looked up.
    #[error(transparent)]
    Connection(#[from] connwrap_types::ConnectionError),

    /// Failed to read a connections file.
    #[error("failed to read connections file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse connections file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to parse YAML.
    #[error("failed to parse YAML connections file: {0}")]
    ParseYaml(String),

    /// Connections file extension is not recognised.
    #[error("unsupported connections file format: '{0}' (expected .toml, .yaml or .yml)")]
    UnsupportedFileFormat(String),
}
