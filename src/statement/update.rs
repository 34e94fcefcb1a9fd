//! UPDATE statement generation.

use crate::dialect::Dialect;
use crate::dialect::render_template;
use crate::error::Error;
use crate::error::Result;
use crate::record::Record;
use crate::statement::SqlStatement;
use crate::value::Value;

/// Builds an UPDATE over a record's non-key columns with a
/// `WHERE pk = ?` tail.
///
/// The key value comes from `pk_value` when given, otherwise from the
/// record's own primary-key column (matched case-insensitively). The key's
/// bound parameter is always the last one.
///
/// # Errors
///
/// [`Error::Validation`] when no settable columns remain or no key value
/// can be found.
pub fn build_update(
    dialect: &Dialect,
    table: &str,
    pk_field: &str,
    record: &Record,
    pk_value: Option<&Value>,
) -> Result<SqlStatement> {
    let mut assignments = Vec::with_capacity(record.len());
    let mut params = Vec::with_capacity(record.len() + 1);

    for (column, value) in record.iter() {
        if column.eq_ignore_ascii_case(pk_field) {
            continue;
        }
        let placeholder = dialect.param_style.placeholder(Some(column), params.len())?;
        assignments.push(format!("{} = {}", column, placeholder));
        params.push(value.clone());
    }

    if assignments.is_empty() {
        return Err(Error::Validation(
            "record has no columns to build an update statement from".to_string(),
        ));
    }

    let pk_value = match pk_value {
        Some(value) => value.clone(),
        None => record
            .get_ignore_case(pk_field)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("no value for primary key {}", pk_field)))?,
    };

    let pk_placeholder = dialect.param_style.placeholder(Some(pk_field), params.len())?;
    let body = render_template(
        &dialect.update_sql,
        &[("table", table), ("set_columns", assignments.join(", ").as_str())],
    );
    let sql = format!("{} {} {} = {}", body, dialect.keywords.where_, pk_field, pk_placeholder);
    params.push(pk_value);

    Ok(SqlStatement { sql, params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamStyle;
    use crate::record;

    #[test]
    fn test_update_pk_param_is_last() {
        let rec = record! { "a" => "A", "b" => 3 };
        let pk = Value::Integer(1);
        let stmt = build_update(&Dialect::sqlite3(), "tbl", "id", &rec, Some(&pk)).unwrap();
        assert_eq!(stmt.sql, "UPDATE tbl SET a = ?, b = ? WHERE id = ?");
        assert_eq!(
            stmt.params,
            vec![Value::Text("A".to_string()), Value::Integer(3), Value::Integer(1)]
        );
    }

    #[test]
    fn test_update_pk_value_from_record() {
        let rec = record! { "id" => 42, "name" => "Lando" };
        let stmt = build_update(&Dialect::sqlite3(), "characters", "id", &rec, None).unwrap();
        assert_eq!(stmt.sql, "UPDATE characters SET name = ? WHERE id = ?");
        assert_eq!(
            stmt.params,
            vec![Value::Text("Lando".to_string()), Value::Integer(42)]
        );
    }

    #[test]
    fn test_update_pk_lookup_is_case_insensitive() {
        let rec = record! { "ID" => 42, "name" => "Lando" };
        let stmt = build_update(&Dialect::sqlite3(), "characters", "id", &rec, None).unwrap();
        assert_eq!(stmt.params.last(), Some(&Value::Integer(42)));
    }

    #[test]
    fn test_update_missing_pk_fails() {
        let rec = record! { "name" => "Lando" };
        let result = build_update(&Dialect::sqlite3(), "characters", "id", &rec, None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_update_no_settable_columns_fails() {
        let rec = record! { "id" => 42 };
        let pk = Value::Integer(42);
        let result = build_update(&Dialect::sqlite3(), "tbl", "id", &rec, Some(&pk));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_update_numeric_ordinals_continue_into_pk() {
        let dialect = Dialect::sqlite3().with_param_style(ParamStyle::Numeric);
        let rec = record! { "a" => 1, "b" => 2 };
        let pk = Value::Integer(9);
        let stmt = build_update(&dialect, "tbl", "id", &rec, Some(&pk)).unwrap();
        assert_eq!(stmt.sql, "UPDATE tbl SET a = :0, b = :1 WHERE id = :2");
    }

    #[test]
    fn test_update_named_placeholders() {
        let dialect = Dialect::sqlite3().with_param_style(ParamStyle::Named);
        let rec = record! { "a" => 1 };
        let pk = Value::Integer(9);
        let stmt = build_update(&dialect, "tbl", "id", &rec, Some(&pk)).unwrap();
        assert_eq!(stmt.sql, "UPDATE tbl SET a = :a WHERE id = :id");
    }

    #[test]
    fn test_update_uses_dialect_keywords() {
        let rec = record! { "a" => 1 };
        let pk = Value::Integer(9);
        let stmt = build_update(&Dialect::sqlite3().lowercase(), "tbl", "id", &rec, Some(&pk)).unwrap();
        assert_eq!(stmt.sql, "update tbl set a = ? where id = ?");
    }
}
