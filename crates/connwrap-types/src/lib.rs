//! Shared types for connwrap.
//!
//! Holds the external data model the resolver consumes: stored connection
//! records, their extra mapping, connection URI parsing, and the
//! [`ConnectionStore`] lookup capability.

pub mod connection;
pub mod error;
pub mod store;
pub mod uri;

pub use connection::{Extra, StoredConnection, extra_from_value, json_kind, parse_extra};
pub use error::{ConnectionError, Result};
pub use store::{ConnectionStore, SharedConnectionStore};
pub use uri::{EXTRA_QUERY_KEY, parse_connection_uri};
