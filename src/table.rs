//! The table façade: one type carrying every operation the crate offers
//! against a named table.

use std::sync::Arc;

use crate::connection::DbEngine;
use crate::dialect::InsertStyle;
use crate::dialect::render_template;
use crate::dynamic::DynamicQuery;
use crate::dynamic::DynamicResult;
use crate::dynamic::QueryShape;
use crate::error::Error;
use crate::error::Result;
use crate::record::Record;
use crate::statement::delete::build_delete;
use crate::statement::insert::build_insert;
use crate::statement::paged::build_paged;
use crate::statement::select::Aggregate;
use crate::statement::select::SelectSpec;
use crate::statement::select::build_aggregate;
use crate::statement::select::build_select;
use crate::statement::update::build_update;
use crate::value::FromValue;
use crate::value::IntoValue;
use crate::value::Value;

/// A database table addressed by name.
///
/// A table is a name, a primary key field (`id` unless overridden), and a
/// handle on the engine whose dialect shapes every statement. It carries
/// no schema: rows go in and come out as [`Record`]s, whatever columns
/// the database happens to return.
///
/// Every operation is async and checks a connection out of the engine
/// for exactly its own duration: the shared connection when one is
/// attached, a fresh one otherwise, committed on success and rolled back
/// on failure either way.
///
/// # Example
///
/// ```ignore
/// use tabletalk::prelude::*;
///
/// let driver = Builder::new_local("movies.db").build().await?;
/// let engine = Arc::new(DbEngine::new(driver, Dialect::sqlite3()));
/// let movies = DbTable::new(&engine, "movies");
///
/// let id = movies.insert(&record! { "title" => "Alien" }).await?;
/// let found = movies
///     .dynamic_query(DynamicQuery::new("find_by_title").arg("title", "Alien"))
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct DbTable {
    engine:        Arc<DbEngine>,
    table_name:    String,
    pk_field:      String,
    pk_autonumber: bool,
}

impl DbTable {
    pub fn new(engine: &Arc<DbEngine>, table_name: impl Into<String>) -> Self {
        DbTable {
            engine:        Arc::clone(engine),
            table_name:    table_name.into(),
            pk_field:      "id".to_string(),
            pk_autonumber: true,
        }
    }

    /// Overrides the primary key field name.
    pub fn with_pk_field(mut self, pk_field: impl Into<String>) -> Self {
        self.pk_field = pk_field.into();
        self
    }

    /// Marks the primary key as not database-generated, so inserts keep
    /// the key column instead of dropping it.
    pub fn with_pk_autonumber(mut self, pk_autonumber: bool) -> Self {
        self.pk_autonumber = pk_autonumber;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn pk_field(&self) -> &str {
        &self.pk_field
    }

    pub fn pk_autonumber(&self) -> bool {
        self.pk_autonumber
    }

    pub fn engine(&self) -> &Arc<DbEngine> {
        &self.engine
    }

    /// Runs raw SQL and returns every row.
    pub async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Record>> {
        tracing::trace!("SQL: {}", sql);
        tracing::trace!("Params: {:?}", params);
        self.run_query(sql, params).await
    }

    /// Runs raw SQL and returns the first column of the first row.
    /// `None` means no rows; a NULL in the first column comes back as
    /// `Some(Value::Null)`.
    pub async fn scalar(&self, sql: &str, params: Vec<Value>) -> Result<Option<Value>> {
        tracing::trace!("SQL: {}", sql);
        tracing::trace!("Params: {:?}", params);
        let records = self.run_query(sql, params).await?;
        Ok(first_value(records))
    }

    /// Runs raw SQL and returns the number of rows affected.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        tracing::trace!("SQL: {}", sql);
        tracing::trace!("Params: {:?}", params);
        self.run_execute(sql, params).await
    }

    /// Runs the same statement once per parameter set on one connection,
    /// summing affected rows.
    pub async fn execute_many(&self, sql: &str, param_sets: Vec<Vec<Value>>) -> Result<u64> {
        tracing::trace!("SQL: {}", sql);
        tracing::trace!("Parameter sets: {}", param_sets.len());
        let scope = self.engine.scope().await?;
        let result = scope.conn().execute_many(sql, param_sets).await;
        scope.finish(result).await
    }

    /// Runs a multi-statement script, typically DDL.
    pub async fn execute_script(&self, sql: &str) -> Result<()> {
        tracing::trace!("Script: {}", sql);
        let scope = self.engine.scope().await?;
        let result = scope.conn().execute_script(sql).await;
        scope.finish(result).await
    }

    /// Inserts one record and returns the new primary key when the
    /// dialect can produce one.
    ///
    /// How the key comes back follows the dialect's derived insert
    /// style: a RETURNING/OUTPUT template is queried directly, a
    /// last-insert-id dialect gets a follow-up query on the same
    /// connection, and anything else returns `None`.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when the record has no insertable columns.
    pub async fn insert(&self, record: &Record) -> Result<Option<Value>> {
        let stmt = build_insert(
            self.engine.dialect(),
            &self.table_name,
            &self.pk_field,
            self.pk_autonumber,
            record,
        )?;
        tracing::debug!("Insert SQL: {}", stmt.sql);
        tracing::debug!("Insert Params: {:?}", stmt.params);

        let scope = self.engine.scope().await?;
        let result = async {
            let conn = scope.conn();
            match self.engine.dialect().insert_style() {
                InsertStyle::Returning => {
                    let records = conn.query(&stmt.sql, stmt.params).await?;
                    Ok(first_value(records))
                }
                InsertStyle::LastInsertId => {
                    conn.execute(&stmt.sql, stmt.params).await?;
                    match self.engine.dialect().last_insert_id_sql.as_deref() {
                        Some(sql) => {
                            let records = conn.query(sql, Vec::new()).await?;
                            Ok(first_value(records))
                        }
                        None => Ok(None),
                    }
                }
                InsertStyle::NoId => {
                    conn.execute(&stmt.sql, stmt.params).await?;
                    Ok(None)
                }
            }
        }
        .await;
        scope.finish(result).await
    }

    /// Updates one record by primary key and returns the rows affected.
    ///
    /// The key comes from `pk` when given, otherwise from the record's
    /// own key column.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when no settable columns remain or no key
    /// value can be found.
    pub async fn update(&self, record: &Record, pk: Option<impl IntoValue>) -> Result<u64> {
        let pk_value = pk.map(IntoValue::into_value);
        let stmt = build_update(
            self.engine.dialect(),
            &self.table_name,
            &self.pk_field,
            record,
            pk_value.as_ref(),
        )?;
        tracing::debug!("Update SQL: {}", stmt.sql);
        tracing::debug!("Update Params: {:?}", stmt.params);
        self.run_execute(&stmt.sql, stmt.params).await
    }

    /// Deletes rows matching `where_clause`, or every row when `None`.
    pub async fn delete(&self, where_clause: Option<&str>, params: Vec<Value>) -> Result<u64> {
        let sql = build_delete(self.engine.dialect(), &self.table_name, where_clause);
        tracing::debug!("Delete SQL: {}", sql);
        tracing::debug!("Delete Params: {:?}", params);
        self.run_execute(&sql, params).await
    }

    /// Deletes the row carrying the given primary key.
    pub async fn delete_by_id(&self, pk: impl IntoValue) -> Result<u64> {
        let clause = self.pk_clause()?;
        self.delete(Some(&clause), vec![pk.into_value()]).await
    }

    /// Fetches the row carrying the given primary key.
    pub async fn get_by_id(&self, pk: impl IntoValue) -> Result<Option<Record>> {
        let clause = self.pk_clause()?;
        let spec = SelectSpec::new().where_clause(clause);
        self.one(&spec, vec![pk.into_value()]).await
    }

    /// Fetches every row.
    pub async fn all(&self) -> Result<Vec<Record>> {
        self.select(&SelectSpec::new(), Vec::new()).await
    }

    /// Runs a [`SelectSpec`] against this table.
    pub async fn select(&self, spec: &SelectSpec, params: Vec<Value>) -> Result<Vec<Record>> {
        let sql = build_select(self.engine.dialect(), &self.table_name, spec)?;
        tracing::trace!("SQL: {}", sql);
        tracing::trace!("Params: {:?}", params);
        self.run_query(&sql, params).await
    }

    /// Runs a [`SelectSpec`] limited to one row.
    pub async fn one(&self, spec: &SelectSpec, params: Vec<Value>) -> Result<Option<Record>> {
        let spec = SelectSpec {
            limit: Some(1),
            ..spec.clone()
        };
        let records = self.select(&spec, params).await?;
        Ok(records.into_iter().next())
    }

    /// Counts every row.
    pub async fn count(&self) -> Result<i64> {
        let value = self.aggregate(Aggregate::Count, "*", None, Vec::new()).await?;
        count_from(value)
    }

    /// Counts distinct values of `column`, optionally filtered.
    pub async fn count_distinct(
        &self,
        column: &str,
        where_clause: Option<&str>,
        params: Vec<Value>,
    ) -> Result<i64> {
        let sql = build_aggregate(
            self.engine.dialect(),
            &self.table_name,
            Aggregate::Count,
            column,
            true,
            where_clause,
        )?;
        let value = self.scalar(&sql, params).await?;
        count_from(value)
    }

    /// Runs a single-value aggregate over `column`, optionally filtered.
    /// `None` means the aggregate produced no row at all; an aggregate
    /// over zero rows usually comes back as `Some(Value::Null)` instead.
    pub async fn aggregate(
        &self,
        agg: Aggregate,
        column: &str,
        where_clause: Option<&str>,
        params: Vec<Value>,
    ) -> Result<Option<Value>> {
        let sql = build_aggregate(
            self.engine.dialect(),
            &self.table_name,
            agg,
            column,
            false,
            where_clause,
        )?;
        self.scalar(&sql, params).await
    }

    /// Fetches one page of a [`SelectSpec`] plus the totals needed to
    /// render pagination. `current_page` is 1-based.
    ///
    /// Runs the dialect's count statement and page statement over the
    /// same connection; both bind the same `params`.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] unless `page_size >= 1` and
    /// `current_page >= 1`.
    pub async fn paged(
        &self,
        spec: &SelectSpec,
        page_size: i64,
        current_page: i64,
        params: Vec<Value>,
    ) -> Result<PagedResult> {
        let (count_sql, page_sql) =
            build_paged(self.engine.dialect(), &self.table_name, spec, page_size, current_page)?;
        tracing::trace!("SQL: {}", count_sql);
        tracing::trace!("SQL: {}", page_sql);
        tracing::trace!("Params: {:?}", params);

        let scope = self.engine.scope().await?;
        let result = async {
            let conn = scope.conn();
            let total = first_value(conn.query(&count_sql, params.clone()).await?);
            let total_records = count_from(total)?;
            let records = conn.query(&page_sql, params).await?;
            Ok(PagedResult {
                total_records,
                total_pages: total_pages(total_records, page_size),
                page_size,
                current_page,
                records,
            })
        }
        .await;
        scope.finish(result).await
    }

    /// Saves a batch of records: a record whose key column holds a
    /// non-null value becomes an update, anything else an insert.
    ///
    /// Every statement is built before anything runs, then the whole
    /// batch executes over one connection scope. Returns the summed
    /// affected-row count.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] from any record the builders reject, raised
    /// before the first statement runs.
    pub async fn save(&self, records: &[Record]) -> Result<u64> {
        let dialect = self.engine.dialect();
        let mut statements = Vec::with_capacity(records.len());
        for record in records {
            let stmt = if self.has_pk(record) {
                build_update(dialect, &self.table_name, &self.pk_field, record, None)?
            } else {
                build_insert(dialect, &self.table_name, &self.pk_field, self.pk_autonumber, record)?
            };
            statements.push(stmt);
        }
        tracing::debug!("Saving {} records into {}", statements.len(), self.table_name);

        let scope = self.engine.scope().await?;
        let result = async {
            let conn = scope.conn();
            let mut affected = 0;
            for stmt in statements {
                tracing::trace!("SQL: {}", stmt.sql);
                tracing::trace!("Params: {:?}", stmt.params);
                affected += conn.execute(&stmt.sql, stmt.params).await?;
            }
            Ok(affected)
        }
        .await;
        scope.finish(result).await
    }

    /// True when the record carries a usable primary key. A NULL key
    /// counts as absent.
    pub fn has_pk(&self, record: &Record) -> bool {
        self.get_pk(record).is_some_and(|value| !value.is_null())
    }

    /// The record's primary key value, matched case-insensitively.
    pub fn get_pk<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get_ignore_case(&self.pk_field)
    }

    /// Fetches the dialect's column metadata for this table, one record
    /// per column.
    pub async fn column_schema(&self) -> Result<Vec<Record>> {
        let sql = render_template(&self.engine.dialect().column_schema, &[(
            "table",
            self.table_name.as_str(),
        )]);
        self.query(&sql, Vec::new()).await
    }

    /// Resolves and runs a [`DynamicQuery`] against this table.
    ///
    /// Any failure, whether the method name fails to resolve or the
    /// database rejects the statement, comes back as
    /// [`Error::DynamicDispatch`] naming the method and preserving the
    /// cause.
    pub async fn dynamic_query(&self, query: DynamicQuery) -> Result<DynamicResult> {
        let method = query.method().to_string();
        match self.run_dynamic(&query).await {
            Ok(result) => Ok(result),
            Err(source) => Err(Error::dynamic_dispatch(method, source)),
        }
    }

    async fn run_dynamic(&self, query: &DynamicQuery) -> Result<DynamicResult> {
        let resolved = query.resolve(self.engine.dialect(), &self.pk_field)?;
        let sql = build_select(self.engine.dialect(), &self.table_name, &resolved.spec)?;
        tracing::trace!("SQL: {}", sql);
        tracing::trace!("Params: {:?}", resolved.params);

        let records = self.run_query(&sql, resolved.params).await?;
        Ok(match resolved.shape {
            QueryShape::Rows => DynamicResult::Rows(records),
            QueryShape::One => DynamicResult::One(records.into_iter().next()),
            QueryShape::Aggregate(_) => DynamicResult::Scalar(first_value(records)),
        })
    }

    async fn run_query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Record>> {
        let scope = self.engine.scope().await?;
        let result = scope.conn().query(sql, params).await;
        scope.finish(result).await
    }

    async fn run_execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let scope = self.engine.scope().await?;
        let result = scope.conn().execute(sql, params).await;
        scope.finish(result).await
    }

    fn pk_clause(&self) -> Result<String> {
        let placeholder = self
            .engine
            .dialect()
            .param_style
            .placeholder(Some(&self.pk_field), 0)?;
        Ok(format!("{} = {}", self.pk_field, placeholder))
    }
}

/// One page of results plus the totals pagination needs.
#[derive(Clone, Debug, PartialEq)]
pub struct PagedResult {
    pub total_records: i64,
    pub total_pages:   i64,
    pub page_size:     i64,
    pub current_page:  i64,
    pub records:       Vec<Record>,
}

fn first_value(records: Vec<Record>) -> Option<Value> {
    records
        .into_iter()
        .next()
        .and_then(|record| record.into_iter().next().map(|(_, value)| value))
}

fn count_from(value: Option<Value>) -> Result<i64> {
    match value {
        Some(value) => i64::from_value(value),
        None => Ok(0),
    }
}

// page_size is validated >= 1 before this runs.
fn total_pages(total_records: i64, page_size: i64) -> i64 {
    (total_records + page_size - 1) / page_size
}
