use async_trait::async_trait;

use crate::connection::Connection;
use crate::connection::Driver;
use crate::error::Result;
use crate::record::Record;
use crate::value::Value;

/// Builds a local turso database and wraps it as a [`Driver`].
#[derive(Debug, Clone, Default)]
pub struct Builder {
    path:              String,
    enable_mvcc:       bool,
    enable_encryption: bool,
    vfs:               Option<String>,
    encryption_opts:   Option<turso::EncryptionOpts>,
}

impl Builder {
    pub fn new_local(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_mvcc(mut self, enable_mvcc: bool) -> Self {
        self.enable_mvcc = enable_mvcc;
        self
    }

    pub fn experimental_encryption(mut self, enable_encryption: bool) -> Self {
        self.enable_encryption = enable_encryption;
        self
    }

    pub fn with_encryption(mut self, encryption_opts: turso::EncryptionOpts) -> Self {
        self.encryption_opts = Some(encryption_opts);
        self
    }

    pub fn with_io(mut self, vfs: String) -> Self {
        self.vfs = Some(vfs);
        self
    }

    pub async fn build(self) -> Result<TursoDriver> {
        let mut turso_builder = turso::Builder::new_local(&self.path)
            .with_mvcc(self.enable_mvcc)
            .experimental_encryption(self.enable_encryption);

        if let Some(opts) = self.encryption_opts {
            turso_builder = turso_builder.with_encryption(opts);
        }

        if let Some(vfs) = self.vfs {
            turso_builder = turso_builder.with_io(vfs);
        }

        let db = turso_builder.build().await?;
        Ok(TursoDriver { db })
    }
}

/// [`Driver`] over a local turso database.
///
/// Every connection minted by [`TursoDriver::connect`] shares the one
/// underlying database, which is what lets `:memory:` databases survive
/// across connections.
pub struct TursoDriver {
    db: turso::Database,
}

#[async_trait]
impl Driver for TursoDriver {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        let conn = self.db.connect()?;
        Ok(Box::new(TursoConnection { inner: conn }))
    }
}

/// One open turso connection.
pub struct TursoConnection {
    inner: turso::Connection,
}

#[async_trait]
impl Connection for TursoConnection {
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Record>> {
        let params: Vec<turso::Value> = params.into_iter().map(Into::into).collect();
        let mut stmt = self.inner.prepare(sql).await?;
        let names: Vec<String> =
            stmt.columns().iter().map(|column| column.name().to_string()).collect();
        let mut rows = stmt.query(params).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&names, &row)?);
        }
        Ok(records)
    }

    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let params: Vec<turso::Value> = params.into_iter().map(Into::into).collect();
        Ok(self.inner.execute(sql, params).await?)
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        Ok(self.inner.execute_batch(sql).await?)
    }

    // TODO: Map commit and rollback onto real transactions once turso
    // supports them without panicking.
    //
    // PANIC:
    // turso_core-0.3.2/storage/wal.rs:986:13:
    // must have a read transaction to begin a write transaction
    //
    // Until then statements autocommit and sealing a scope is a no-op.
    async fn commit(&self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        Ok(())
    }
}

/// Materializes one row, naming columns from the prepared statement's
/// metadata with a positional `column_{i}` fallback.
fn record_from_row(names: &[String], row: &turso::Row) -> Result<Record> {
    let mut record = Record::with_capacity(row.column_count());
    for i in 0..row.column_count() {
        let name = match names.get(i) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("column_{}", i),
        };
        record.set(name, Value::from(row.get_value(i)?));
    }
    Ok(record)
}
