//! Connection plumbing: the [`Driver`] and [`Connection`] contracts every
//! backend implements, plus the engine that hands scoped connections to
//! tables.
//!
//! The crate ships one driver, [`TursoDriver`], built through
//! [`Builder`]. Everything above this module talks to the traits only,
//! so swapping the backend means implementing two traits.

pub(crate) mod engine;
pub(crate) mod turso;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Record;
use crate::value::Value;

pub use self::engine::DbEngine;
pub use self::turso::Builder;
pub use self::turso::TursoConnection;
pub use self::turso::TursoDriver;

pub mod prelude {
    pub use super::Builder;
    pub use super::Connection;
    pub use super::DbEngine;
    pub use super::Driver;
    pub use super::TursoConnection;
    pub use super::TursoDriver;
}

/// Opens connections against one database.
///
/// A driver owns whatever handle the backend needs (for turso, the
/// database itself) and mints independent connections from it.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opens a fresh connection.
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A single open connection.
///
/// Implementations autocommit each statement unless the backend supports
/// client-side transactions, in which case [`commit`] and [`rollback`]
/// seal the work done since the last seal. Dropping a connection closes
/// it.
///
/// [`commit`]: Connection::commit
/// [`rollback`]: Connection::rollback
#[async_trait]
pub trait Connection: Send + Sync {
    /// Runs a row-returning statement and materializes every row, columns
    /// in statement order.
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Record>>;

    /// Runs a statement and reports the number of rows affected.
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64>;

    /// Runs the same statement once per parameter set, summing affected
    /// rows. Drivers with a native batch form should override this.
    async fn execute_many(&self, sql: &str, param_sets: Vec<Vec<Value>>) -> Result<u64> {
        let mut affected = 0;
        for params in param_sets {
            affected += self.execute(sql, params).await?;
        }
        Ok(affected)
    }

    /// Runs a multi-statement script. The default forwards to a single
    /// [`execute`] call for drivers without script support.
    ///
    /// [`execute`]: Connection::execute
    async fn execute_script(&self, sql: &str) -> Result<()> {
        self.execute(sql, Vec::new()).await?;
        Ok(())
    }

    /// Commits work done on this connection.
    async fn commit(&self) -> Result<()>;

    /// Rolls back work done on this connection.
    async fn rollback(&self) -> Result<()>;
}
