//! Prelude module for tabletalk
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use tabletalk::prelude::*;
//! ```

pub use turso::EncryptionOpts;

// Re-export the record! and params! macros
pub use crate::params;
pub use crate::record;

pub use crate::connection::Builder;
pub use crate::connection::Connection;
pub use crate::connection::DbEngine;
pub use crate::connection::Driver;
pub use crate::connection::TursoDriver;
pub use crate::dialect::Dialect;
pub use crate::dynamic::DynamicQuery;
pub use crate::dynamic::DynamicResult;
pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::param::ParamStyle;
pub use crate::record::Record;
pub use crate::statement::SqlStatement;
pub use crate::statement::select::Aggregate;
pub use crate::statement::select::SelectSpec;
pub use crate::table::DbTable;
pub use crate::table::PagedResult;
pub use crate::value::FromValue;
pub use crate::value::IntoValue;
pub use crate::value::Value;
