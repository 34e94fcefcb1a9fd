//! Pure SQL statement generation.
//!
//! Every builder here turns a dialect plus declarative arguments into SQL
//! text and an ordered parameter vector. Nothing in this module touches a
//! connection; identical inputs always render identical statements.

pub(crate) mod delete;
pub(crate) mod insert;
pub(crate) mod paged;
pub(crate) mod select;
pub(crate) mod update;

pub(crate) use select::aggregate_column;

use crate::error::Error;
use crate::error::Result;
use crate::value::Value;

pub mod prelude {
    pub use super::SqlStatement;
    pub use super::delete::build_delete;
    pub use super::insert::build_insert;
    pub use super::paged::build_paged;
    pub use super::select::Aggregate;
    pub use super::select::SelectSpec;
    pub use super::select::build_aggregate;
    pub use super::select::build_select;
    pub use super::update::build_update;
}

/// A rendered SQL string together with the bound parameters it expects.
///
/// The placeholder count and order in `sql` always match `params`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SqlStatement {
    pub sql:    String,
    pub params: Vec<Value>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        SqlStatement { sql: sql.into(), params }
    }
}

/// Rejects column-list text carrying statement separators or string
/// quotes. WHERE and HAVING text is exempt; literals belong there.
pub(crate) fn guard_against_injection(clause: &str, text: &str) -> Result<()> {
    if text.contains(';') || text.contains('\'') {
        return Err(Error::Injection(format!("{} ({})", clause, text)));
    }
    Ok(())
}
