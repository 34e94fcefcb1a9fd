//! DELETE statement generation.

use crate::dialect::Dialect;
use crate::dialect::render_template;

/// Builds a DELETE, appending a WHERE clause only when one is given.
///
/// The WHERE text is passed through as-is; an empty clause deletes every
/// row, exactly as written.
pub fn build_delete(dialect: &Dialect, table: &str, where_clause: Option<&str>) -> String {
    let body = render_template(&dialect.delete_sql, &[("table", table)]);
    match where_clause {
        Some(w) if !w.is_empty() => format!("{} {} {}", body, dialect.keywords.where_, w),
        _ => body,
    }
}
