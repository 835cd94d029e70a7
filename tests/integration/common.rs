//! Shared fixtures for integration tests.

use sql_reward::config::Config;
use sql_reward::reward::RewardScorer;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Schema and rows for the `school` test database.
pub const SCHOOL_SQL: &str = "
    CREATE TABLE students (id INTEGER PRIMARY KEY, name TEXT NOT NULL, year INTEGER);
    CREATE TABLE courses (code TEXT PRIMARY KEY, title TEXT NOT NULL);
    INSERT INTO students VALUES (1, 'Ada', 2), (2, 'Brook', 3), (3, 'Cyd', 2);
    INSERT INTO courses VALUES ('CS101', 'Intro'), ('CS201', 'Data Structures');
";

/// Creates `<base>/<name>/<name>.sqlite` and runs `sql` against it.
pub async fn create_database(base: &Path, name: &str, sql: &str) -> PathBuf {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.sqlite"));

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::raw_sql(sql).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
    path
}

/// A base directory holding the `school` database.
pub async fn school_dir() -> TempDir {
    let dir = tempdir().unwrap();
    create_database(dir.path(), "school", SCHOOL_SQL).await;
    dir
}

/// A scorer rooted at `base`, with any other settings from `config`.
pub fn scorer_for(base: &Path, mut config: Config) -> RewardScorer {
    config.database.base_dir = base.to_path_buf();
    RewardScorer::new(config)
}
