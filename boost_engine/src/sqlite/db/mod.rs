//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    QueryBuilder,
    Sqlite,
    SqlitePool,
};

pub mod boosters;
pub mod games;
pub mod orders;
pub mod profiles;
pub mod progress;

const SQLITE_DB_URL: &str = "sqlite://data/boost_market.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("BM_DATABASE_URL").unwrap_or_else(|_| {
        info!("BM_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Appends `column IN (?, ?, ...)` for the given values. The caller guarantees `values` is not empty.
pub(crate) fn push_in_list<T>(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[T])
where T: ToString {
    builder.push(column);
    builder.push(" IN (");
    let mut list = builder.separated(", ");
    for v in values {
        list.push_bind(v.to_string());
    }
    builder.push(")");
}

/// Appends a test for whether the JSON array stored in `column` shares at least one element with `values`.
pub(crate) fn push_json_overlap(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[String]) {
    builder.push(format!("EXISTS (SELECT 1 FROM json_each({column}) WHERE json_each.value IN ("));
    let mut list = builder.separated(", ");
    for v in values {
        list.push_bind(v.clone());
    }
    builder.push("))");
}

/// The first row of a `... RETURNING *` write.
///
/// Writes are read with `fetch_all` so the statement runs to completion. A half-stepped `RETURNING` statement keeps
/// SQLite's write lock, and every other connection in the pool then sees `database is locked`.
pub(crate) fn first_row<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}

/// As [`first_row`], for writes that must return a row.
pub(crate) fn single_row<T>(rows: Vec<T>) -> Result<T, SqlxError> {
    first_row(rows).ok_or(SqlxError::RowNotFound)
}

/// Starts a `WHERE` or continues it with `AND`.
#[derive(Default)]
pub(crate) struct WhereClause {
    started: bool,
}

impl WhereClause {
    pub fn next(&mut self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if self.started {
            builder.push(" AND ");
        } else {
            builder.push(" WHERE ");
            self.started = true;
        }
    }
}
