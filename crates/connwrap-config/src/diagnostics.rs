//! Non-fatal diagnostics produced during resolution.
//!
//! Warnings never abort resolution. They are kept on the resolved config so
//! callers can surface them, and every warning is also logged through
//! `tracing` at the point it is raised.

/// A non-fatal problem found while resolving a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The stored connection type differs from the expected provider type.
    UnexpectedConnType {
        expected: String,
        found: String,
        connection: String,
    },

    /// Legacy `profile` key used without `s3_config_file`.
    DeprecatedProfileField { connection: String },

    /// The requested connection id was not found in the store.
    ConnectionNotFound { conn_id: String, store: String },
}

impl ConfigWarning {
    /// Log this warning and hand it back for collection.
    pub(crate) fn emit(self) -> Self {
        tracing::warn!(warning = %self, "connection config warning");
        self
    }
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::UnexpectedConnType {
                expected,
                found,
                connection,
            } => write!(
                f,
                "{} expected connection type '{}', got '{}'. \
                 This connection might not work correctly.",
                connection, expected, found
            ),
            ConfigWarning::DeprecatedProfileField { connection } => write!(
                f,
                "Found 'profile' without specifying 's3_config_file' in {}; \
                 set 'profile_name' in {} extra instead.",
                connection, connection
            ),
            ConfigWarning::ConnectionNotFound { conn_id, store } => write!(
                f,
                "Unable to find connection '{}' in {}, switching to empty.",
                conn_id, store
            ),
        }
    }
}
