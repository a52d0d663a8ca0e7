//! Connector: opens a database connection by name

use crate::config::ConnectionConfig;
use crate::error::{TransferError, TransferResult};
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use tracing::{debug, info};

/// Open a connection to `database` as described by `config`.
///
/// The connection closes when dropped.
pub fn connect(config: &ConnectionConfig, database: &str) -> TransferResult<Connection> {
    let uri = config.connection_uri(database);

    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if config.create_if_missing {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }

    debug!(%uri, "opening connection");
    let conn = Connection::open_with_flags(&uri, flags)
        .map_err(|source| TransferError::Connection {
            uri: uri.clone(),
            source,
        })?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

    info!(database, "Connection made to database");
    Ok(conn)
}

/// Close a connection, logging the closure. Close errors are logged and dropped.
pub fn close(conn: Connection, database: &str) {
    if let Err((_, e)) = conn.close() {
        debug!(database, error = %e, "error while closing connection");
    }
    info!(database, "Connection to database closed");
}

/// Quote an identifier for interpolation into SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
