//! Convention-driven dynamic queries.
//!
//! A [`DynamicQuery`] is the explicit form of a "method-missing" call:
//! the method name picks the query shape, keyword arguments either fill
//! select-spec fields or synthesize equality constraints, and resolution
//! is a pure function over those inputs with no connection in sight.

use crate::dialect::Dialect;
use crate::error::Error;
use crate::error::Result;
use crate::record::Record;
use crate::statement::aggregate_column;
use crate::statement::select::Aggregate;
use crate::statement::select::SelectSpec;
use crate::value::IntoValue;
use crate::value::Value;

/// Method-name prefixes that fetch a single row, and whether they flip
/// the ordering. Checked in order, after the aggregate keys.
const SINGLE_PREFIXES: [(&str, bool); 5] = [
    ("single", false),
    ("one", false),
    ("fetchone", false),
    ("first", false),
    ("last", true),
];

/// A dynamic query description: a method-name-like identifier plus ordered
/// keyword arguments.
///
/// Recognized keys (case-insensitive) override select-spec fields:
/// `columns`, `distinct`, `where`, `groupby`, `having`, `orderby`,
/// `limit`, with aliases `column`/`select` for `columns` and `top` for
/// `limit`. A `params` key appends its value to the bound parameters.
/// Every other key becomes an equality constraint on the column of that
/// name and contributes its value as a bound parameter.
///
/// # Example
///
/// ```ignore
/// use tabletalk::DynamicQuery;
///
/// let query = DynamicQuery::new("find_by_director")
///     .arg("director", "George Lucas")
///     .arg("orderby", "release_year");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicQuery {
    method: String,
    args:   Vec<(String, Value)>,
    params: Vec<Value>,
}

impl DynamicQuery {
    pub fn new(method: impl Into<String>) -> Self {
        DynamicQuery { method: method.into(), args: Vec::new(), params: Vec::new() }
    }

    /// Adds a keyword argument. Order matters for constraint placeholders.
    pub fn arg(mut self, key: impl Into<String>, value: impl IntoValue) -> Self {
        self.args.push((key.into(), value.into_value()));
        self
    }

    /// Appends bound parameters for an explicit `where` clause. These
    /// follow any constraint-synthesized parameters in the outgoing
    /// vector.
    pub fn params<I, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        self.params.extend(params.into_iter().map(IntoValue::into_value));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Resolves this query against a dialect and primary-key field.
    ///
    /// Classification precedence: exact aggregate keys (`count`, `sum`,
    /// `max`, `min`, `avg`) first, then single-row prefixes (`single`,
    /// `one`, `fetchone`, `first`, `last`), then a full list query.
    /// `count` always renders `COUNT(*)`. Single-row queries force
    /// `limit 1` and order by the primary key unless ordered explicitly,
    /// with `DESC` appended for `last`. List queries also default their
    /// ordering to the primary key; aggregates never do.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] for a blank method name, [`Error::Conflict`] when
    /// an explicit `where` meets synthesized constraints,
    /// [`Error::Validation`] for a field argument of the wrong kind, and
    /// whatever placeholder generation rejects.
    pub fn resolve(&self, dialect: &Dialect, pk_field: &str) -> Result<ResolvedQuery> {
        let method = self.method.trim().to_lowercase();
        if method.is_empty() {
            return Err(Error::Usage("dynamic method name must not be empty".to_string()));
        }

        let mut spec = SelectSpec::new();
        let mut constraints: Vec<String> = Vec::new();
        let mut constraint_params: Vec<Value> = Vec::new();
        let mut extra_params: Vec<Value> = self.params.clone();

        for (key, value) in &self.args {
            let key = key.to_lowercase();
            let field = match key.as_str() {
                "column" | "select" => "columns",
                "top" => "limit",
                other => other,
            };
            match field {
                "columns" => spec.columns = vec![text_arg(&key, value)?],
                "distinct" => spec.distinct = truthy_arg(&key, value)?,
                "where" => spec.where_clause = Some(text_arg(&key, value)?),
                "groupby" => spec.group_by = vec![text_arg(&key, value)?],
                "having" => spec.having = Some(text_arg(&key, value)?),
                "orderby" => spec.order_by = vec![text_arg(&key, value)?],
                "limit" => spec.limit = Some(integer_arg(&key, value)?),
                "params" => extra_params.push(value.clone()),
                _ => {
                    let placeholder =
                        dialect.param_style.placeholder(Some(&key), constraints.len())?;
                    constraints.push(format!("{} = {}", key, placeholder));
                    constraint_params.push(value.clone());
                }
            }
        }

        if spec.where_clause.as_deref().is_some_and(|w| !w.is_empty()) && !constraints.is_empty() {
            return Err(Error::Conflict(
                "cannot mix a where clause and column constraints".to_string(),
            ));
        }
        if !constraints.is_empty() {
            spec.where_clause = Some(constraints.join(" AND "));
        }

        let mut params = constraint_params;
        params.append(&mut extra_params);

        if let Some(agg) = Aggregate::from_name(&method) {
            let target = if matches!(agg, Aggregate::Count) || spec.columns.is_empty() {
                "*".to_string()
            } else {
                spec.columns.join(", ")
            };
            spec.columns = vec![aggregate_column(dialect, agg, &target, false)];
            return Ok(ResolvedQuery { spec, params, shape: QueryShape::Aggregate(agg) });
        }

        if spec.order_by.is_empty() {
            spec.order_by = vec![pk_field.to_string()];
        }

        if let Some((_, descending)) = SINGLE_PREFIXES.iter().find(|(p, _)| method.starts_with(p)) {
            if *descending {
                if let Some(last) = spec.order_by.last_mut() {
                    last.push_str(" DESC");
                }
            }
            spec.limit = Some(1);
            return Ok(ResolvedQuery { spec, params, shape: QueryShape::One });
        }

        Ok(ResolvedQuery { spec, params, shape: QueryShape::Rows })
    }
}

fn text_arg(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        other => Err(Error::Validation(format!("{} expects text, got {:?}", key, other))),
    }
}

fn integer_arg(key: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        other => Err(Error::Validation(format!("{} expects an integer, got {:?}", key, other))),
    }
}

fn truthy_arg(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Integer(i) => Ok(*i != 0),
        other => Err(Error::Validation(format!("{} expects a boolean, got {:?}", key, other))),
    }
}

/// How a resolved dynamic query executes and what it yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryShape {
    /// Full result set.
    Rows,
    /// First row only; zero rows is not an error.
    One,
    /// Single aggregate value.
    Aggregate(Aggregate),
}

/// The output of [`DynamicQuery::resolve`]: a renderable select spec, the
/// bound parameters, and the execution shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedQuery {
    pub spec:   SelectSpec,
    pub params: Vec<Value>,
    pub shape:  QueryShape,
}

/// What a dynamic query produced, mirroring [`QueryShape`].
#[derive(Clone, Debug, PartialEq)]
pub enum DynamicResult {
    Rows(Vec<Record>),
    One(Option<Record>),
    Scalar(Option<Value>),
}
