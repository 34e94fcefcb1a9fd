//! INSERT statement generation.

use crate::dialect::Dialect;
use crate::dialect::render_template;
use crate::error::Error;
use crate::error::Result;
use crate::record::Record;
use crate::statement::SqlStatement;

/// Builds an INSERT from a record's columns, in record order.
///
/// When `pk_autonumber` is set the primary-key column is dropped from the
/// column list (matched case-insensitively) so the database can assign it.
/// Column identifiers are quoted per the dialect; `pk_field` feeds the
/// `{pk_field}` slot of RETURNING/OUTPUT style templates and is rendered
/// as-is.
///
/// # Errors
///
/// [`Error::Validation`] when no insertable columns remain.
pub fn build_insert(
    dialect: &Dialect,
    table: &str,
    pk_field: &str,
    pk_autonumber: bool,
    record: &Record,
) -> Result<SqlStatement> {
    let mut columns = Vec::with_capacity(record.len());
    let mut placeholders = Vec::with_capacity(record.len());
    let mut params = Vec::with_capacity(record.len());

    for (column, value) in record.iter() {
        if pk_autonumber && column.eq_ignore_ascii_case(pk_field) {
            continue;
        }
        placeholders.push(dialect.param_style.placeholder(Some(column), params.len())?);
        columns.push(dialect.quote_ident(column));
        params.push(value.clone());
    }

    if columns.is_empty() {
        return Err(Error::Validation(
            "record has no columns to build an insert statement from".to_string(),
        ));
    }

    let sql = render_template(
        &dialect.insert_sql,
        &[
            ("table", table),
            ("columns", columns.join(", ").as_str()),
            ("values", placeholders.join(", ").as_str()),
            ("pk_field", pk_field),
        ],
    );

    Ok(SqlStatement { sql, params })
}
