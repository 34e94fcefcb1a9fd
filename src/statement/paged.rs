//! Paged query generation.

use crate::dialect::Dialect;
use crate::dialect::render_template;
use crate::error::Error;
use crate::error::Result;
use crate::statement::select::SelectSpec;
use crate::statement::select::build_select;
use crate::statement::select::render_select;

/// Builds the two statements behind a paged query: a COUNT over the same
/// filters, and the page select.
///
/// The count wraps a `1 one` projection of the filtered rows (no ordering)
/// in the dialect's count template. The page select renders the dialect's
/// page template and then fills `{page_size}` and `{page_start}` in a
/// second pass, with `page_start = (current_page - 1) * page_size`;
/// `current_page` is 1-based. Any limit on the spec is ignored; the page
/// template owns row-limiting.
///
/// # Errors
///
/// [`Error::Validation`] unless `page_size >= 1` and `current_page >= 1`,
/// plus anything [`build_select`] rejects.
pub fn build_paged(
    dialect: &Dialect,
    table: &str,
    spec: &SelectSpec,
    page_size: i64,
    current_page: i64,
) -> Result<(String, String)> {
    if page_size < 1 {
        return Err(Error::Validation(format!("page_size must be at least 1, got {}", page_size)));
    }
    if current_page < 1 {
        return Err(Error::Validation(format!(
            "current_page is 1-based, got {}",
            current_page
        )));
    }

    let count_spec = SelectSpec {
        columns:      vec!["1 one".to_string()],
        distinct:     spec.distinct,
        where_clause: spec.where_clause.clone(),
        group_by:     spec.group_by.clone(),
        having:       spec.having.clone(),
        order_by:     Vec::new(),
        limit:        None,
    };
    let subquery = build_select(dialect, table, &count_spec)?;
    let count_sql = render_template(&dialect.paging.count_sql, &[("subquery", subquery.as_str())]);

    let page_spec = SelectSpec { limit: None, ..spec.clone() };
    let first_pass = render_select(&dialect.paging.select_sql, dialect, table, &page_spec)?;
    let page_start = (current_page - 1) * page_size;
    let select_sql = render_template(
        &first_pass,
        &[
            ("page_size", page_size.to_string().as_str()),
            ("page_start", page_start.to_string().as_str()),
        ],
    );

    Ok((count_sql, select_sql))
}
