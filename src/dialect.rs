//! SQL dialect configuration tables.
//!
//! A [`Dialect`] is a plain bundle of statement templates, clause keywords,
//! and placeholder/quoting rules. The statement builders read from it; they
//! never special-case a database family. Every family constructor starts
//! from the SQL-92 baseline and overrides only what actually differs.

use crate::param::ParamStyle;

/// How an INSERT reports the generated primary key.
///
/// Derived from the dialect's templates, never stored: a template that
/// references `{pk_field}` returns the key inline, a dialect with a
/// follow-up query fetches it afterwards, and anything else reports
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertStyle {
    /// The insert statement itself returns the new key (RETURNING, OUTPUT).
    Returning,
    /// A follow-up query on the same connection fetches the new key.
    LastInsertId,
    /// The dialect has no way to report the new key.
    NoId,
}

/// Identifier quoting flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentQuote {
    /// `"name"` (SQL-92, PostgreSQL, SQLite)
    DoubleQuote,
    /// `` `name` `` (MySQL, MariaDB)
    Backtick,
    /// `[name]` (SQL Server)
    Bracket,
}

/// Clause and function keywords, stored as data so a dialect can restyle
/// them (see [`Dialect::lowercase`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Keywords {
    pub select:   String,
    pub distinct: String,
    pub from_:    String,
    pub where_:   String,
    pub group_by: String,
    pub having:   String,
    pub order_by: String,
    pub limit:    String,
    pub count:    String,
    pub sum:      String,
    pub min:      String,
    pub max:      String,
    pub avg:      String,
}

impl Default for Keywords {
    fn default() -> Self {
        Keywords {
            select:   "SELECT".to_string(),
            distinct: "DISTINCT".to_string(),
            from_:    "FROM".to_string(),
            where_:   "WHERE".to_string(),
            group_by: "GROUP BY".to_string(),
            having:   "HAVING".to_string(),
            order_by: "ORDER BY".to_string(),
            limit:    "LIMIT".to_string(),
            count:    "COUNT".to_string(),
            sum:      "SUM".to_string(),
            min:      "MIN".to_string(),
            max:      "MAX".to_string(),
            avg:      "AVG".to_string(),
        }
    }
}

/// The two templates behind paged queries: a COUNT wrapped around a
/// filtered subquery, and the page-select with `{page_size}`/`{page_start}`
/// slots filled in a second rendering pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PagingTemplates {
    pub count_sql:  String,
    pub select_sql: String,
}

/// A SQL dialect: statement templates plus placeholder and quoting rules.
///
/// Immutable once built. Compose a variant with the `with_*` overrides,
/// for example an ODBC-connected SQL Server:
///
/// ```ignore
/// use tabletalk::{Dialect, ParamStyle};
///
/// let dialect = Dialect::sqlserver().with_param_style(ParamStyle::Qmark);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Dialect {
    pub name:               String,
    pub param_style:        ParamStyle,
    pub insert_sql:         String,
    pub select_sql:         String,
    pub update_sql:         String,
    pub delete_sql:         String,
    pub column_schema:      String,
    pub last_insert_id_sql: Option<String>,
    pub paging:             PagingTemplates,
    pub keywords:           Keywords,
    pub ident_quote:        IdentQuote,
}

impl Dialect {
    /// The portable SQL-92 baseline every family starts from.
    pub fn sql92() -> Self {
        Dialect {
            name:               "sql92".to_string(),
            param_style:        ParamStyle::Qmark,
            insert_sql:         "INSERT INTO {table} ({columns}) VALUES ({values})".to_string(),
            select_sql:         "SELECT{distinct} {columns} FROM {table}{where}{groupby}{having}{orderby}{limit}"
                .to_string(),
            update_sql:         "UPDATE {table} SET {set_columns}".to_string(),
            delete_sql:         "DELETE FROM {table}".to_string(),
            column_schema:      "SELECT * FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = '{table}'"
                .to_string(),
            last_insert_id_sql: None,
            paging:             PagingTemplates {
                count_sql:  "SELECT COUNT(*) FROM ({subquery}) x".to_string(),
                select_sql:
                    "SELECT {columns} FROM {table}{where}{groupby}{having}{orderby} LIMIT {page_size} OFFSET {page_start}"
                        .to_string(),
            },
            keywords:           Keywords::default(),
            ident_quote:        IdentQuote::DoubleQuote,
        }
    }

    /// SQL Server: TOP instead of LIMIT, OUTPUT INSERTED for new keys,
    /// OFFSET/FETCH paging, bracket quoting.
    ///
    /// The default placeholder style matches the native driver; combine
    /// with [`ParamStyle::Qmark`] for ODBC connections.
    pub fn sqlserver() -> Self {
        Dialect {
            name: "sqlserver".to_string(),
            param_style: ParamStyle::Pyformat,
            insert_sql: "INSERT INTO {table} ({columns}) OUTPUT INSERTED.[{pk_field}] VALUES ({values})"
                .to_string(),
            select_sql: "SELECT{distinct}{limit} {columns} FROM {table}{where}{groupby}{having}{orderby}"
                .to_string(),
            paging: PagingTemplates {
                count_sql:  "SELECT COUNT(*) c FROM ({subquery}) x".to_string(),
                select_sql:
                    "SELECT {columns} FROM {table}{where}{groupby}{having}{orderby} OFFSET {page_start} ROWS FETCH NEXT {page_size} ROWS ONLY"
                        .to_string(),
            },
            keywords: Keywords { limit: "TOP".to_string(), ..Keywords::default() },
            ident_quote: IdentQuote::Bracket,
            ..Self::sql92()
        }
    }

    /// MariaDB: `LIMIT start, size` paging, LAST_INSERT_ID(), backticks.
    pub fn mariadb() -> Self {
        Dialect {
            name: "mariadb".to_string(),
            param_style: ParamStyle::Pyformat,
            last_insert_id_sql: Some("SELECT LAST_INSERT_ID()".to_string()),
            paging: PagingTemplates {
                select_sql:
                    "SELECT {columns} FROM {table}{where}{groupby}{having}{orderby} LIMIT {page_start}, {page_size}"
                        .to_string(),
                ..Self::sql92().paging
            },
            ident_quote: IdentQuote::Backtick,
            ..Self::sql92()
        }
    }

    /// MySQL, which shares everything with [`Dialect::mariadb`].
    pub fn mysql() -> Self {
        Dialect { name: "mysql".to_string(), ..Self::mariadb() }
    }

    /// PostgreSQL: RETURNING for new keys.
    pub fn postgres() -> Self {
        Dialect {
            name: "postgres".to_string(),
            param_style: ParamStyle::Pyformat,
            insert_sql: "INSERT INTO {table} ({columns}) VALUES ({values}) RETURNING {pk_field} AS newid"
                .to_string(),
            ..Self::sql92()
        }
    }

    /// SQLite: PRAGMA column schema, `LIMIT start, size` paging,
    /// last_insert_rowid(). The dialect the bundled turso driver uses.
    pub fn sqlite3() -> Self {
        Dialect {
            name: "sqlite3".to_string(),
            param_style: ParamStyle::Qmark,
            column_schema: "PRAGMA table_info({table})".to_string(),
            last_insert_id_sql: Some("SELECT last_insert_rowid()".to_string()),
            paging: PagingTemplates {
                select_sql:
                    "SELECT {columns} FROM {table}{where}{groupby}{having}{orderby} LIMIT {page_start}, {page_size}"
                        .to_string(),
                ..Self::sql92().paging
            },
            ..Self::sql92()
        }
    }

    /// The key-reporting strategy implied by this dialect's templates.
    pub fn insert_style(&self) -> InsertStyle {
        if self.insert_sql.contains("{pk_field}") {
            InsertStyle::Returning
        } else if self.last_insert_id_sql.is_some() {
            InsertStyle::LastInsertId
        } else {
            InsertStyle::NoId
        }
    }

    /// Lower-cases every string in the dialect: name, templates, and
    /// keywords. Template tokens are already lowercase, so rendering is
    /// unaffected. Structure and non-string settings stay untouched.
    pub fn lowercase(mut self) -> Self {
        self.name = self.name.to_lowercase();
        self.insert_sql = self.insert_sql.to_lowercase();
        self.select_sql = self.select_sql.to_lowercase();
        self.update_sql = self.update_sql.to_lowercase();
        self.delete_sql = self.delete_sql.to_lowercase();
        self.column_schema = self.column_schema.to_lowercase();
        self.last_insert_id_sql = self.last_insert_id_sql.map(|s| s.to_lowercase());
        self.paging.count_sql = self.paging.count_sql.to_lowercase();
        self.paging.select_sql = self.paging.select_sql.to_lowercase();
        let kw = &mut self.keywords;
        for field in [
            &mut kw.select,
            &mut kw.distinct,
            &mut kw.from_,
            &mut kw.where_,
            &mut kw.group_by,
            &mut kw.having,
            &mut kw.order_by,
            &mut kw.limit,
            &mut kw.count,
            &mut kw.sum,
            &mut kw.min,
            &mut kw.max,
            &mut kw.avg,
        ] {
            *field = field.to_lowercase();
        }
        self
    }

    pub fn with_param_style(mut self, param_style: ParamStyle) -> Self {
        self.param_style = param_style;
        self
    }

    pub fn with_insert_sql(mut self, template: impl Into<String>) -> Self {
        self.insert_sql = template.into();
        self
    }

    pub fn with_select_sql(mut self, template: impl Into<String>) -> Self {
        self.select_sql = template.into();
        self
    }

    pub fn with_update_sql(mut self, template: impl Into<String>) -> Self {
        self.update_sql = template.into();
        self
    }

    pub fn with_delete_sql(mut self, template: impl Into<String>) -> Self {
        self.delete_sql = template.into();
        self
    }

    pub fn with_column_schema(mut self, template: impl Into<String>) -> Self {
        self.column_schema = template.into();
        self
    }

    pub fn with_last_insert_id_sql(mut self, template: Option<String>) -> Self {
        self.last_insert_id_sql = template;
        self
    }

    pub fn with_paging(mut self, paging: PagingTemplates) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_ident_quote(mut self, ident_quote: IdentQuote) -> Self {
        self.ident_quote = ident_quote;
        self
    }

    /// Quotes an identifier per the dialect, doubling any embedded closing
    /// quote character. `*` is passed through unquoted.
    pub fn quote_ident(&self, ident: &str) -> String {
        if ident == "*" {
            return ident.to_string();
        }
        let (open, close) = match self.ident_quote {
            IdentQuote::DoubleQuote => ('"', '"'),
            IdentQuote::Backtick => ('`', '`'),
            IdentQuote::Bracket => ('[', ']'),
        };
        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(open);
        for ch in ident.chars() {
            quoted.push(ch);
            if ch == close {
                quoted.push(close);
            }
        }
        quoted.push(close);
        quoted
    }
}

/// Replaces `{key}` tokens in `template` for the supplied keys only.
///
/// Tokens with no matching key are left verbatim, which is what lets the
/// paging templates render in two passes. Never fails.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let token = &after[..close];
                match vars.iter().find(|(key, _)| *key == token) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                // unterminated token, emit as-is
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
