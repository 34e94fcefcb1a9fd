//! SELECT statement generation.

use crate::dialect::Dialect;
use crate::dialect::Keywords;
use crate::dialect::render_template;
use crate::error::Error;
use crate::error::Result;
use crate::statement::guard_against_injection;

/// Declarative description of a SELECT.
///
/// A spec carries no table and no dialect; those arrive at render time, so
/// one spec can be rendered against any dialect. An empty column list
/// renders as `*`.
///
/// # Example
///
/// ```ignore
/// use tabletalk::{Dialect, SelectSpec, build_select};
///
/// let spec = SelectSpec::new()
///     .where_clause("director = 'George Lucas'")
///     .order_by(["release_year"]);
/// let sql = build_select(&Dialect::sqlite3(), "movies", &spec)?;
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectSpec {
    pub(crate) columns:      Vec<String>,
    pub(crate) distinct:     bool,
    pub(crate) where_clause: Option<String>,
    pub(crate) group_by:     Vec<String>,
    pub(crate) having:       Option<String>,
    pub(crate) order_by:     Vec<String>,
    pub(crate) limit:        Option<i64>,
}

impl SelectSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the column list. Entries are joined with `", "` when the
    /// statement renders.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one column expression.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Sets the WHERE text, which is passed through to the statement
    /// unaltered.
    pub fn where_clause(mut self, where_clause: impl Into<String>) -> Self {
        self.where_clause = Some(where_clause.into());
        self
    }

    pub fn group_by<I, S>(mut self, group_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = group_by.into_iter().map(Into::into).collect();
        self
    }

    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.having = Some(having.into());
        self
    }

    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Renders a SELECT for `table` using the dialect's standard template.
///
/// # Errors
///
/// [`Error::Injection`] when the column, group-by, or order-by text
/// carries `;` or `'`; [`Error::Configuration`] for a limit keyword other
/// than `LIMIT`/`TOP`.
pub fn build_select(dialect: &Dialect, table: &str, spec: &SelectSpec) -> Result<String> {
    render_select(&dialect.select_sql, dialect, table, spec)
}

/// Renders a SELECT through an arbitrary template. The paging builder uses
/// this with the dialect's page-select template; everything else goes
/// through [`build_select`].
pub(crate) fn render_select(
    template: &str,
    dialect: &Dialect,
    table: &str,
    spec: &SelectSpec,
) -> Result<String> {
    let kw = &dialect.keywords;

    let columns = if spec.columns.is_empty() { "*".to_string() } else { spec.columns.join(", ") };
    guard_against_injection("columns", &columns)?;

    let group_by = spec.group_by.join(", ");
    guard_against_injection("group by clause", &group_by)?;

    let order_by = spec.order_by.join(", ");
    guard_against_injection("order by clause", &order_by)?;

    let distinct = if spec.distinct { format!(" {}", kw.distinct) } else { String::new() };

    let where_clause = match spec.where_clause.as_deref() {
        Some(w) if !w.is_empty() => format!(" {} {}", kw.where_, w),
        _ => String::new(),
    };

    let group_by = if group_by.is_empty() {
        String::new()
    } else {
        format!(" {} {}", kw.group_by, group_by)
    };

    let having = match spec.having.as_deref() {
        Some(h) if !h.is_empty() => format!(" {} {}", kw.having, h),
        _ => String::new(),
    };

    let order_by = if order_by.is_empty() {
        String::new()
    } else {
        format!(" {} {}", kw.order_by, order_by)
    };

    let limit = match spec.limit {
        Some(n) => render_limit(kw, n)?,
        None => String::new(),
    };

    Ok(render_template(
        template,
        &[
            ("distinct", distinct.as_str()),
            ("columns", columns.as_str()),
            ("table", table),
            ("where", where_clause.as_str()),
            ("groupby", group_by.as_str()),
            ("having", having.as_str()),
            ("orderby", order_by.as_str()),
            ("limit", limit.as_str()),
        ],
    ))
}

/// Builds the ` LIMIT n` / ` TOP n` fragment. The template decides where
/// the fragment lands; this only validates the keyword.
fn render_limit(kw: &Keywords, limit: i64) -> Result<String> {
    if kw.limit.eq_ignore_ascii_case("limit") || kw.limit.eq_ignore_ascii_case("top") {
        Ok(format!(" {} {}", kw.limit, limit))
    } else {
        Err(Error::Configuration(format!("unrecognized limit keyword: {}", kw.limit)))
    }
}

/// The aggregate functions the dynamic resolver and the façade expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl Aggregate {
    /// Matches a dynamic method name against the fixed aggregate keys.
    /// Exact matches only; `"counting"` is not an aggregate.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Aggregate::Count),
            "sum" => Some(Aggregate::Sum),
            "min" => Some(Aggregate::Min),
            "max" => Some(Aggregate::Max),
            "avg" => Some(Aggregate::Avg),
            _ => None,
        }
    }

    pub fn keyword<'a>(&self, keywords: &'a Keywords) -> &'a str {
        match self {
            Aggregate::Count => &keywords.count,
            Aggregate::Sum => &keywords.sum,
            Aggregate::Min => &keywords.min,
            Aggregate::Max => &keywords.max,
            Aggregate::Avg => &keywords.avg,
        }
    }
}

/// Renders the projection for an aggregate query: `KW(column) aggfield1`,
/// with DISTINCT inside the call when requested.
pub(crate) fn aggregate_column(
    dialect: &Dialect,
    agg: Aggregate,
    column: &str,
    distinct: bool,
) -> String {
    let kw = agg.keyword(&dialect.keywords);
    if distinct {
        format!("{}({} {}) aggfield1", kw, dialect.keywords.distinct, column)
    } else {
        format!("{}({}) aggfield1", kw, column)
    }
}

/// Renders a single-value aggregate SELECT over `table`.
pub fn build_aggregate(
    dialect: &Dialect,
    table: &str,
    agg: Aggregate,
    column: &str,
    distinct: bool,
    where_clause: Option<&str>,
) -> Result<String> {
    let mut spec = SelectSpec::new().column(aggregate_column(dialect, agg, column, distinct));
    if let Some(w) = where_clause {
        spec = spec.where_clause(w);
    }
    build_select(dialect, table, &spec)
}
