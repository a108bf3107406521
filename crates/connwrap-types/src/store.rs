//! Connection lookup capability.
//!
//! The resolver never owns connection storage. It depends on this trait so
//! any backing store (environment, files, a metadata database) can supply
//! connections by id.

use std::sync::Arc;

use crate::connection::StoredConnection;
use crate::error::Result;

/// Looks up stored connections by identifier.
pub trait ConnectionStore: Send + Sync + std::fmt::Debug {
    /// Return the connection for `conn_id`, or `None` when the store does
    /// not know it.
    fn get_connection(&self, conn_id: &str) -> Result<Option<StoredConnection>>;

    /// Short name used in diagnostics.
    fn store_name(&self) -> &str {
        "connection store"
    }
}

/// Type alias for a shared connection store.
pub type SharedConnectionStore = Arc<dyn ConnectionStore>;

impl<S: ConnectionStore + ?Sized> ConnectionStore for Arc<S> {
    fn get_connection(&self, conn_id: &str) -> Result<Option<StoredConnection>> {
        (**self).get_connection(conn_id)
    }

    fn store_name(&self) -> &str {
        (**self).store_name()
    }
}

impl<S: ConnectionStore + ?Sized> ConnectionStore for Box<S> {
    fn get_connection(&self, conn_id: &str) -> Result<Option<StoredConnection>> {
        (**self).get_connection(conn_id)
    }

    fn store_name(&self) -> &str {
        (**self).store_name()
    }
}
