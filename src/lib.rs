#![deny(warnings)]

//! # tabletalk
//!
//! A dynamic, convention-driven micro ORM for [Turso](https://turso.tech)
//! inspired by Massive.js.
//!
//! ## Features
//!
//! - Schema-free tables: a table is a name plus a primary key field, no
//!   entities or derive macros
//! - Rows as [`Record`]s, ordered column maps that keep statement order
//! - Dynamic finders resolved from method names (`find_by_title`,
//!   `count_by_director`, `last_by_year`)
//! - Pure SQL generation over data-driven dialect presets (SQLite,
//!   Postgres, MariaDB/MySQL, SQL Server, SQL-92)
//! - DB-API style parameter placeholders (qmark, numeric, named, format,
//!   pyformat)
//! - Paged queries with totals, batch save, single-value aggregates
//! - Optional support for chrono, uuid, and serde types
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use tabletalk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Connect to a database
//!     let driver = Builder::new_local(":memory:").build().await?;
//!     let engine = Arc::new(DbEngine::new(driver, Dialect::sqlite3()));
//!
//!     // Keep one connection alive so the in-memory database survives
//!     engine.set_shared_connection(engine.connect().await?)?;
//!
//!     let movies = DbTable::new(&engine, "movies");
//!     movies
//!         .execute_script(
//!             "CREATE TABLE movies (
//!                 id INTEGER PRIMARY KEY AUTOINCREMENT,
//!                 title TEXT NOT NULL,
//!                 director TEXT,
//!                 release_year INTEGER
//!             )",
//!         )
//!         .await?;
//!
//!     // Insert a record and get the new id back
//!     let id = movies
//!         .insert(&record! {
//!             "title" => "Star Wars",
//!             "director" => "George Lucas",
//!             "release_year" => 1977,
//!         })
//!         .await?;
//!
//!     // Dynamic finders resolve from the method name
//!     let lucas = movies
//!         .dynamic_query(DynamicQuery::new("find_by_director").arg("director", "George Lucas"))
//!         .await?;
//!
//!     // Declarative selects for everything else
//!     let early = movies
//!         .select(
//!             &SelectSpec::new()
//!                 .where_clause("release_year < ?")
//!                 .order_by(["release_year"]),
//!             params![1980],
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Dynamic Queries
//!
//! A [`DynamicQuery`] turns a method name into SQL at runtime, the way
//! Massive.js resolves `db.movies.findByTitle(...)`:
//!
//! - `find_by_title`, `movies_by_director`, or any other unrecognized
//!   name selects rows
//! - a `single`/`one`/`fetchone`/`first`/`last` prefix fetches one row,
//!   `last` flipping the final sort
//! - a `count`/`sum`/`min`/`max`/`avg` name produces a scalar
//!
//! Plain arguments become `AND`-joined equality constraints bound as
//! parameters. Reserved keys (`columns`, `where`, `distinct`, `groupby`,
//! `having`, `orderby`, `limit`, `params`) shape the statement instead.
//!
//! ## Dialects
//!
//! SQL generation is data: a [`Dialect`] is a set of template strings
//! plus a parameter style, and the named presets only differ in what
//! they carry. Statement builders are pure functions over a dialect, so
//! every statement the crate would run can be asserted on without a
//! database:
//!
//! ```ignore
//! use tabletalk::{Dialect, SelectSpec, build_select};
//!
//! let sql = build_select(&Dialect::sqlserver(), "movies", &SelectSpec::new().limit(5))?;
//! assert_eq!(sql, "SELECT TOP 5 * FROM movies");
//! ```

pub mod connection;
pub mod dialect;
pub mod dynamic;
pub mod error;
pub mod param;
pub mod prelude;
pub mod record;
pub mod statement;
pub mod table;
pub mod value;
// Re-export main types at crate root
pub use connection::Builder;
pub use connection::Connection;
pub use connection::DbEngine;
pub use connection::Driver;
pub use connection::TursoConnection;
pub use connection::TursoDriver;
pub use dialect::Dialect;
pub use dialect::IdentQuote;
pub use dialect::InsertStyle;
pub use dialect::Keywords;
pub use dialect::PagingTemplates;
pub use dialect::render_template;
pub use dynamic::DynamicQuery;
pub use dynamic::DynamicResult;
pub use dynamic::QueryShape;
pub use dynamic::ResolvedQuery;
pub use error::Error;
pub use error::Result;
pub use param::ParamStyle;
pub use record::Record;
pub use statement::SqlStatement;
pub use statement::delete::build_delete;
pub use statement::insert::build_insert;
pub use statement::paged::build_paged;
pub use statement::select::Aggregate;
pub use statement::select::SelectSpec;
pub use statement::select::build_aggregate;
pub use statement::select::build_select;
pub use statement::update::build_update;
pub use table::DbTable;
pub use table::PagedResult;
pub use value::FromValue;
pub use value::IntoValue;
pub use value::Value;
