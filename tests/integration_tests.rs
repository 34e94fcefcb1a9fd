//! Integration tests for tabletalk against an in-memory turso database
//!
//! These tests verify the full workflow including:
//! - Raw SQL execution (query, scalar, execute, batches, scripts)
//! - CRUD through the table façade
//! - Aggregates and paged queries
//! - Batch save with upsert classification
//! - Dynamic method-name queries
//! - Shared-connection mode

use std::sync::Arc;

use tabletalk::prelude::*;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Create an engine over an in-memory database, with a shared connection
/// attached so every operation sees the same data
async fn create_test_engine() -> Arc<DbEngine> {
    let driver = Builder::new_local(":memory:").build().await.unwrap();
    let engine = Arc::new(DbEngine::new(driver, Dialect::sqlite3()));
    let conn = engine.connect().await.unwrap();
    engine.set_shared_connection(conn).unwrap();
    engine
}

/// Create the movies table
async fn movies_table(engine: &Arc<DbEngine>) -> DbTable {
    let movies = DbTable::new(engine, "movies");
    movies
        .execute_script(
            "CREATE TABLE movies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                director TEXT,
                release_year INTEGER
            )",
        )
        .await
        .unwrap();
    movies
}

/// Create the characters table
async fn characters_table(engine: &Arc<DbEngine>) -> DbTable {
    let characters = DbTable::new(engine, "characters");
    characters
        .execute_script(
            "CREATE TABLE characters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                movie_id INTEGER
            )",
        )
        .await
        .unwrap();
    characters
}

/// Insert seven movies: ids 1 through 7, four directed by George Lucas,
/// the last one with a NULL director
async fn seed_movies(movies: &DbTable) {
    let rows = vec![
        ("Star Wars", Some("George Lucas"), 1977),
        ("The Empire Strikes Back", Some("Irvin Kershner"), 1980),
        ("Return of the Jedi", Some("Richard Marquand"), 1983),
        ("The Phantom Menace", Some("George Lucas"), 1999),
        ("Attack of the Clones", Some("George Lucas"), 2002),
        ("Revenge of the Sith", Some("George Lucas"), 2005),
        ("The Force Awakens", None, 2015),
    ];

    for (title, director, release_year) in rows {
        movies
            .insert(&record! {
                "title" => title,
                "director" => director,
                "release_year" => release_year,
            })
            .await
            .unwrap();
    }
}

// =============================================================================
// Raw SQL Tests
// =============================================================================

mod raw_sql_tests {
    use super::*;

    #[tokio::test]
    async fn test_query_returns_records_in_column_order() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let rows = movies
            .query("SELECT title, release_year FROM movies WHERE id = ?", params![1])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["title", "release_year"]);
        assert_eq!(rows[0].get_as::<String>("title").unwrap(), "Star Wars");
        assert_eq!(rows[0].get_as::<i64>("release_year").unwrap(), 1977);
    }

    #[tokio::test]
    async fn test_query_names_columns_from_the_statement() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        // Aliases and expression columns take their names from the
        // prepared statement, not the table schema
        let rows = movies
            .query(
                "SELECT title AS name, release_year + 0 AS year FROM movies WHERE id = ?",
                params![1],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["name", "year"]);
        assert_eq!(rows[0].get_as::<String>("name").unwrap(), "Star Wars");
        assert_eq!(rows[0].get_as::<i64>("year").unwrap(), 1977);
    }

    #[tokio::test]
    async fn test_scalar_returns_the_first_column_of_the_first_row() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let value = movies.scalar("SELECT COUNT(*) FROM movies", params![]).await.unwrap();
        assert_eq!(value, Some(Value::Integer(7)));
    }

    #[tokio::test]
    async fn test_scalar_is_none_without_rows() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let value = movies
            .scalar("SELECT title FROM movies WHERE id = ?", params![999])
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_scalar_preserves_null() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        // The Force Awakens has a NULL director
        let value = movies
            .scalar("SELECT director FROM movies WHERE id = ?", params![7])
            .await
            .unwrap();
        assert_eq!(value, Some(Value::Null));
    }

    #[tokio::test]
    async fn test_execute_reports_affected_rows() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let affected = movies
            .execute(
                "UPDATE movies SET release_year = release_year + 1 WHERE director = ?",
                params!["George Lucas"],
            )
            .await
            .unwrap();
        assert_eq!(affected, 4);
    }

    #[tokio::test]
    async fn test_execute_many_runs_every_parameter_set() {
        let engine = create_test_engine().await;
        let characters = characters_table(&engine).await;

        let affected = characters
            .execute_many(
                "INSERT INTO characters (name, movie_id) VALUES (?, ?)",
                vec![
                    params!["Luke Skywalker", 1],
                    params!["Leia Organa", 1],
                    params!["Han Solo", 1],
                ],
            )
            .await
            .unwrap();
        assert_eq!(affected, 3);
        assert_eq!(characters.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_execute_script_runs_multiple_statements() {
        let engine = create_test_engine().await;
        let aliens = DbTable::new(&engine, "aliens");

        aliens
            .execute_script(
                "CREATE TABLE aliens (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    species TEXT NOT NULL
                );
                INSERT INTO aliens (species) VALUES ('Wookiee');
                INSERT INTO aliens (species) VALUES ('Ewok');",
            )
            .await
            .unwrap();

        assert_eq!(aliens.count().await.unwrap(), 2);
    }
}

// =============================================================================
// Insert Tests
// =============================================================================

mod insert_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_returns_the_generated_id() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;

        let first = movies.insert(&record! { "title" => "THX 1138" }).await.unwrap();
        assert_eq!(first, Some(Value::Integer(1)));

        let second = movies.insert(&record! { "title" => "American Graffiti" }).await.unwrap();
        assert_eq!(second, Some(Value::Integer(2)));
    }

    #[tokio::test]
    async fn test_insert_drops_the_autonumber_key() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;

        let id = movies
            .insert(&record! { "id" => 99, "title" => "THX 1138" })
            .await
            .unwrap();

        assert_eq!(id, Some(Value::Integer(1)));
        assert!(movies.get_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_keeps_explicit_keys_without_autonumber() {
        let engine = create_test_engine().await;
        let volumes = DbTable::new(&engine, "volumes").with_pk_autonumber(false);
        volumes
            .execute_script("CREATE TABLE volumes (id INTEGER PRIMARY KEY, label TEXT)")
            .await
            .unwrap();

        let id = volumes
            .insert(&record! { "id" => 42, "label" => "archive" })
            .await
            .unwrap();

        assert_eq!(id, Some(Value::Integer(42)));
        let found = volumes.get_by_id(42).await.unwrap().unwrap();
        assert_eq!(found.get_as::<String>("label").unwrap(), "archive");
    }

    #[tokio::test]
    async fn test_insert_rejects_an_empty_record() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;

        let result = movies.insert(&record! {}).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}

// =============================================================================
// Read Tests
// =============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_all_returns_every_row() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let rows = movies.all().await.unwrap();
        assert_eq!(rows.len(), 7);
    }

    #[tokio::test]
    async fn test_select_binds_where_parameters() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().where_clause("director = ?");
        let rows = movies.select(&spec, params!["George Lucas"]).await.unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].get_as::<String>("title").unwrap(), "Star Wars");
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().order_by(["release_year"]).limit(3);
        let rows = movies.select(&spec, params![]).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get_as::<String>("title").unwrap(), "Star Wars");
        assert_eq!(rows[2].get_as::<i64>("release_year").unwrap(), 1983);
    }

    #[tokio::test]
    async fn test_select_specific_columns() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().columns(["title"]).limit(1);
        let rows = movies.select(&spec, params![]).await.unwrap();

        assert_eq!(rows[0].len(), 1);
        assert!(rows[0].get("title").is_some());
        assert!(rows[0].get("director").is_none());
    }

    #[tokio::test]
    async fn test_one_returns_the_first_match() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new()
            .where_clause("release_year > ?")
            .order_by(["release_year"]);
        let row = movies.one(&spec, params![2000]).await.unwrap().unwrap();

        assert_eq!(row.get_as::<String>("title").unwrap(), "Attack of the Clones");
    }

    #[tokio::test]
    async fn test_one_is_none_without_a_match() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().where_clause("release_year > ?");
        let row = movies.one(&spec, params![3000]).await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_round_trips() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let row = movies.get_by_id(3).await.unwrap().unwrap();
        assert_eq!(row.get_as::<String>("title").unwrap(), "Return of the Jedi");

        assert!(movies.get_by_id(999).await.unwrap().is_none());
    }
}

// =============================================================================
// Update and Delete Tests
// =============================================================================

mod update_delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_uses_the_record_key() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let mut record = movies.get_by_id(1).await.unwrap().unwrap();
        record.set("title", "Star Wars: A New Hope");

        let affected = movies.update(&record, None::<i64>).await.unwrap();
        assert_eq!(affected, 1);

        let updated = movies.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(updated.get_as::<String>("title").unwrap(), "Star Wars: A New Hope");
    }

    #[tokio::test]
    async fn test_update_with_an_explicit_key() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let affected = movies
            .update(&record! { "title" => "Episode V" }, Some(2))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let updated = movies.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(updated.get_as::<String>("title").unwrap(), "Episode V");
    }

    #[tokio::test]
    async fn test_update_without_any_key_fails() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies.update(&record! { "title" => "Orphaned" }, None::<i64>).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_with_a_where_clause() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let affected = movies
            .delete(Some("director = ?"), params!["George Lucas"])
            .await
            .unwrap();
        assert_eq!(affected, 4);
        assert_eq!(movies.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let affected = movies.delete_by_id(5).await.unwrap();
        assert_eq!(affected, 1);
        assert!(movies.get_by_id(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_everything_without_a_clause() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let affected = movies.delete(None, params![]).await.unwrap();
        assert_eq!(affected, 7);
        assert_eq!(movies.count().await.unwrap(), 0);
    }
}

// =============================================================================
// Aggregate Tests
// =============================================================================

mod aggregate_tests {
    use super::*;

    #[tokio::test]
    async fn test_count_counts_every_row() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        assert_eq!(movies.count().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_count_distinct_ignores_nulls() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        // George Lucas, Irvin Kershner, Richard Marquand
        let directors = movies.count_distinct("director", None, params![]).await.unwrap();
        assert_eq!(directors, 3);
    }

    #[tokio::test]
    async fn test_count_distinct_with_a_filter() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let directors = movies
            .count_distinct("director", Some("release_year < ?"), params![1983])
            .await
            .unwrap();
        assert_eq!(directors, 2);
    }

    #[tokio::test]
    async fn test_min_and_max() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let earliest = movies
            .aggregate(Aggregate::Min, "release_year", None, params![])
            .await
            .unwrap();
        assert_eq!(earliest, Some(Value::Integer(1977)));

        let latest = movies
            .aggregate(Aggregate::Max, "release_year", None, params![])
            .await
            .unwrap();
        assert_eq!(latest, Some(Value::Integer(2015)));
    }

    #[tokio::test]
    async fn test_sum_and_avg() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let sum = movies
            .aggregate(Aggregate::Sum, "release_year", None, params![])
            .await
            .unwrap();
        assert_eq!(sum, Some(Value::Integer(13961)));

        let avg = movies
            .aggregate(Aggregate::Avg, "release_year", None, params![])
            .await
            .unwrap();
        match avg {
            Some(Value::Real(avg)) => assert!((avg - 13961.0 / 7.0).abs() < 0.001),
            other => panic!("expected a real average, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_aggregates_over_zero_rows_are_null() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let none = movies
            .aggregate(Aggregate::Min, "release_year", Some("id > ?"), params![100])
            .await
            .unwrap();
        assert_eq!(none, Some(Value::Null));
    }

    #[tokio::test]
    async fn test_filtered_aggregate() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let latest_lucas = movies
            .aggregate(Aggregate::Max, "release_year", Some("director = ?"), params!["George Lucas"])
            .await
            .unwrap();
        assert_eq!(latest_lucas, Some(Value::Integer(2005)));
    }
}

// =============================================================================
// Paged Query Tests
// =============================================================================

mod paged_tests {
    use super::*;

    #[tokio::test]
    async fn test_paged_returns_totals_and_pages() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().order_by(["id"]);

        let page1 = movies.paged(&spec, 3, 1, params![]).await.unwrap();
        assert_eq!(page1.total_records, 7);
        assert_eq!(page1.total_pages, 3);
        assert_eq!(page1.page_size, 3);
        assert_eq!(page1.current_page, 1);
        assert_eq!(page1.records.len(), 3);
        assert_eq!(page1.records[0].get_as::<String>("title").unwrap(), "Star Wars");

        let page3 = movies.paged(&spec, 3, 3, params![]).await.unwrap();
        assert_eq!(page3.records.len(), 1);
        assert_eq!(
            page3.records[0].get_as::<String>("title").unwrap(),
            "The Force Awakens"
        );

        // Past the end: still counted, no rows
        let page4 = movies.paged(&spec, 3, 4, params![]).await.unwrap();
        assert_eq!(page4.total_records, 7);
        assert!(page4.records.is_empty());
    }

    #[tokio::test]
    async fn test_paged_respects_filters() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().where_clause("director = ?").order_by(["id"]);

        let page2 = movies.paged(&spec, 3, 2, params!["George Lucas"]).await.unwrap();
        assert_eq!(page2.total_records, 4);
        assert_eq!(page2.total_pages, 2);
        assert_eq!(page2.records.len(), 1);
        assert_eq!(
            page2.records[0].get_as::<String>("title").unwrap(),
            "Revenge of the Sith"
        );
    }

    #[tokio::test]
    async fn test_paged_rejects_bad_bounds() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new();
        let result = movies.paged(&spec, 0, 1, params![]).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = movies.paged(&spec, 3, 0, params![]).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}

// =============================================================================
// Save Tests
// =============================================================================

mod save_tests {
    use fake::Fake;
    use fake::faker::name::en::Name;

    use super::*;

    #[tokio::test]
    async fn test_save_classifies_updates_and_inserts() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let mut existing = movies.get_by_id(1).await.unwrap().unwrap();
        existing.set("title", "Star Wars: A New Hope");

        let batch = vec![
            existing,
            record! { "title" => "Rogue One", "release_year" => 2016 },
            record! { "title" => "Solo", "release_year" => 2018 },
        ];

        let affected = movies.save(&batch).await.unwrap();
        assert_eq!(affected, 3);
        assert_eq!(movies.count().await.unwrap(), 9);

        let renamed = movies.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(renamed.get_as::<String>("title").unwrap(), "Star Wars: A New Hope");
    }

    #[tokio::test]
    async fn test_save_bulk_inserts() {
        let engine = create_test_engine().await;
        let characters = characters_table(&engine).await;

        let mut batch = Vec::new();
        for i in 0..20 {
            let name: String = Name().fake();
            batch.push(record! { "name" => name, "movie_id" => (i % 7) + 1 });
        }

        let affected = characters.save(&batch).await.unwrap();
        assert_eq!(affected, 20);
        assert_eq!(characters.count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_save_treats_a_null_key_as_an_insert() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let batch = vec![record! { "id" => Value::Null, "title" => "Untitled" }];
        let affected = movies.save(&batch).await.unwrap();

        assert_eq!(affected, 1);
        assert_eq!(movies.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_save_empty_batch_is_a_no_op() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let affected = movies.save(&[]).await.unwrap();
        assert_eq!(affected, 0);
    }
}

// =============================================================================
// Dynamic Query Tests
// =============================================================================

mod dynamic_query_tests {
    use super::*;

    fn expect_rows(result: DynamicResult) -> Vec<Record> {
        match result {
            DynamicResult::Rows(rows) => rows,
            other => panic!("expected rows, got {:?}", other),
        }
    }

    fn expect_one(result: DynamicResult) -> Option<Record> {
        match result {
            DynamicResult::One(row) => row,
            other => panic!("expected at most one row, got {:?}", other),
        }
    }

    fn expect_scalar(result: DynamicResult) -> Option<Value> {
        match result {
            DynamicResult::Scalar(value) => value,
            other => panic!("expected a scalar, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_by_binds_constraints() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(DynamicQuery::new("find_by_director").arg("director", "George Lucas"))
            .await
            .unwrap();

        let rows = expect_rows(result);
        assert_eq!(rows.len(), 4);
        // Default ordering is the primary key
        assert_eq!(rows[0].get_as::<String>("title").unwrap(), "Star Wars");
    }

    #[tokio::test]
    async fn test_multiple_constraints_are_anded() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(
                DynamicQuery::new("find")
                    .arg("director", "George Lucas")
                    .arg("release_year", 1999),
            )
            .await
            .unwrap();

        let rows = expect_rows(result);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_as::<String>("title").unwrap(), "The Phantom Menace");
    }

    #[tokio::test]
    async fn test_single_fetches_one_row() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(DynamicQuery::new("single_by_id").arg("id", 3))
            .await
            .unwrap();
        let row = expect_one(result).unwrap();
        assert_eq!(row.get_as::<String>("title").unwrap(), "Return of the Jedi");

        let result = movies
            .dynamic_query(DynamicQuery::new("single_by_id").arg("id", 999))
            .await
            .unwrap();
        assert!(expect_one(result).is_none());
    }

    #[tokio::test]
    async fn test_last_flips_the_final_ordering() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(DynamicQuery::new("last_released").arg("orderby", "release_year"))
            .await
            .unwrap();

        let row = expect_one(result).unwrap();
        assert_eq!(row.get_as::<String>("title").unwrap(), "The Force Awakens");
    }

    #[tokio::test]
    async fn test_count_produces_a_scalar() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(DynamicQuery::new("count").arg("director", "George Lucas"))
            .await
            .unwrap();
        assert_eq!(expect_scalar(result), Some(Value::Integer(4)));
    }

    #[tokio::test]
    async fn test_aggregates_take_their_column_from_columns() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(DynamicQuery::new("min").arg("columns", "release_year"))
            .await
            .unwrap();
        assert_eq!(expect_scalar(result), Some(Value::Integer(1977)));
    }

    #[tokio::test]
    async fn test_top_is_a_limit_alias() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(DynamicQuery::new("find").arg("top", 2))
            .await
            .unwrap();
        assert_eq!(expect_rows(result).len(), 2);
    }

    #[tokio::test]
    async fn test_params_bind_into_the_where_clause() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let result = movies
            .dynamic_query(
                DynamicQuery::new("find")
                    .arg("where", "release_year > ?")
                    .params(params![2000]),
            )
            .await
            .unwrap();
        assert_eq!(expect_rows(result).len(), 3);
    }

    #[tokio::test]
    async fn test_conflicting_arguments_are_wrapped() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let err = movies
            .dynamic_query(
                DynamicQuery::new("find_by_director")
                    .arg("director", "George Lucas")
                    .arg("where", "id = 1"),
            )
            .await
            .unwrap_err();

        match err {
            Error::DynamicDispatch { method, source } => {
                assert_eq!(method, "find_by_director");
                assert!(matches!(*source, Error::Conflict(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blacklisted_argument_names_are_rejected() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let err = movies
            .dynamic_query(
                DynamicQuery::new("find_by").arg("title; DROP TABLE movies", "x"),
            )
            .await
            .unwrap_err();

        match err {
            Error::DynamicDispatch { source, .. } => {
                assert!(matches!(*source, Error::Injection(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

// =============================================================================
// Shared Connection Tests
// =============================================================================

mod shared_connection_tests {
    use super::*;

    #[tokio::test]
    async fn test_double_attach_fails_fast() {
        let engine = create_test_engine().await;

        let second = engine.connect().await.unwrap();
        let err = engine.set_shared_connection(second).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[tokio::test]
    async fn test_clear_then_reattach() {
        let engine = create_test_engine().await;
        assert!(engine.has_shared_connection());

        engine.clear_shared_connection();
        assert!(!engine.has_shared_connection());

        let conn = engine.connect().await.unwrap();
        engine.set_shared_connection(conn).unwrap();
        assert!(engine.has_shared_connection());
    }

    #[tokio::test]
    async fn test_connection_per_operation_shares_the_database() {
        let driver = Builder::new_local(":memory:").build().await.unwrap();
        let engine = Arc::new(DbEngine::new(driver, Dialect::sqlite3()));
        let movies = DbTable::new(&engine, "movies");

        // No shared connection: every operation opens its own connection
        // against the one underlying database
        movies
            .execute_script(
                "CREATE TABLE movies (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL
                )",
            )
            .await
            .unwrap();
        movies.insert(&record! { "title" => "Star Wars" }).await.unwrap();

        assert_eq!(movies.count().await.unwrap(), 1);
    }
}

// =============================================================================
// Error Handling Tests
// =============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_table_surfaces_the_database_error() {
        let engine = create_test_engine().await;
        let ghosts = DbTable::new(&engine, "ghosts");

        let result = ghosts.all().await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_injection_guard_rejects_hostile_columns() {
        let engine = create_test_engine().await;
        let movies = movies_table(&engine).await;
        seed_movies(&movies).await;

        let spec = SelectSpec::new().columns(["title; DROP TABLE movies"]);
        let result = movies.select(&spec, params![]).await;
        assert!(matches!(result, Err(Error::Injection(_))));

        // Nothing ran
        assert_eq!(movies.count().await.unwrap(), 7);
    }
}
