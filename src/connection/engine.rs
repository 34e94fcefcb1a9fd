use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::connection::Connection;
use crate::connection::Driver;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::error::Result;

/// A database engine: the dialect SQL generation follows, the driver
/// that opens connections, and an optional shared connection.
///
/// Without a shared connection every table operation opens its own
/// connection, commits or rolls back, and drops it. Attach one with
/// [`DbEngine::set_shared_connection`] to run everything over a single
/// connection instead, which is what in-memory databases and tests need.
pub struct DbEngine {
    driver:  Box<dyn Driver>,
    dialect: Dialect,
    shared:  Mutex<Option<Arc<dyn Connection>>>,
}

impl DbEngine {
    pub fn new(driver: impl Driver + 'static, dialect: Dialect) -> Self {
        DbEngine {
            driver:  Box::new(driver),
            dialect,
            shared:  Mutex::new(None),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Opens a fresh connection straight from the driver, ignoring the
    /// shared slot.
    pub async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect().await
    }

    /// Attaches a connection that every subsequent operation reuses.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] when one is already attached. Call
    /// [`DbEngine::clear_shared_connection`] first to replace it.
    pub fn set_shared_connection(&self, conn: Box<dyn Connection>) -> Result<()> {
        let mut shared = self.lock_shared();
        if shared.is_some() {
            return Err(Error::Usage(
                "a shared connection is already attached; clear it before attaching another".to_string(),
            ));
        }
        *shared = Some(Arc::from(conn));
        Ok(())
    }

    /// Detaches the shared connection, returning the engine to
    /// connection-per-operation mode. The connection closes once the
    /// last operation still holding it finishes.
    pub fn clear_shared_connection(&self) {
        *self.lock_shared() = None;
    }

    pub fn has_shared_connection(&self) -> bool {
        self.lock_shared().is_some()
    }

    /// Checks out a connection for one logical operation: the shared one
    /// when attached, a freshly opened one otherwise.
    pub(crate) async fn scope(&self) -> Result<ConnectionScope> {
        let shared = self.lock_shared().clone();
        let handle = match shared {
            Some(conn) => Handle::Shared(conn),
            None => Handle::Owned(self.driver.connect().await?),
        };
        Ok(ConnectionScope { handle })
    }

    // A poisoned lock only means another thread panicked mid-swap of the
    // Option; the Option itself is still usable.
    fn lock_shared(&self) -> MutexGuard<'_, Option<Arc<dyn Connection>>> {
        match self.shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for DbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbEngine")
            .field("dialect", &self.dialect.name)
            .field("shared", &self.has_shared_connection())
            .finish()
    }
}

enum Handle {
    Owned(Box<dyn Connection>),
    Shared(Arc<dyn Connection>),
}

/// A connection checked out for one logical operation.
///
/// Run the operation's statements through [`ConnectionScope::conn`], then
/// seal the scope with [`ConnectionScope::finish`]: success commits,
/// failure rolls back, and an owned connection drops on either path.
pub(crate) struct ConnectionScope {
    handle: Handle,
}

impl ConnectionScope {
    pub(crate) fn conn(&self) -> &dyn Connection {
        match &self.handle {
            Handle::Owned(conn) => conn.as_ref(),
            Handle::Shared(conn) => conn.as_ref(),
        }
    }

    /// Seals the scope around the operation's outcome. A rollback
    /// failure is logged and the original error kept.
    pub(crate) async fn finish<T>(self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.conn().commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn().rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }
}
