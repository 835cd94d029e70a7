//! Reward computation integration tests.
//!
//! Exercise both scoring branches against real SQLite files.

use super::common::{create_database, school_dir, scorer_for, SCHOOL_SQL};
use pretty_assertions::assert_eq;
use sql_reward::config::{Config, DatabaseConfig, ScoringConfig};
use sql_reward::reward::{text_similarity, EmptyRowsPolicy, RewardDetail};
use sql_reward::RewardError;
use tempfile::tempdir;

#[tokio::test]
async fn test_identical_query_scores_two() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let sql = "SELECT name FROM students WHERE year = 2";
    let reward = scorer.score("school", sql, sql).await.unwrap();
    assert_eq!(reward, 2.0);
}

#[tokio::test]
async fn test_equivalent_query_scores_two() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let reward = scorer
        .score(
            "school",
            "SELECT name FROM students WHERE year < 3 ORDER BY name DESC",
            "SELECT name FROM students WHERE year = 2",
        )
        .await
        .unwrap();
    assert_eq!(reward, 2.0);
}

#[tokio::test]
async fn test_disjoint_rows_score_one() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let reward = scorer
        .score(
            "school",
            "SELECT name FROM students WHERE id = 1",
            "SELECT name FROM students WHERE id = 2",
        )
        .await
        .unwrap();
    assert_eq!(reward, 1.0);
}

#[tokio::test]
async fn test_half_overlap_scores_one_and_a_half() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let reward = scorer
        .score(
            "school",
            "SELECT 1, 'a' UNION SELECT 2, 'b'",
            "SELECT 1, 'a' UNION SELECT 3, 'c'",
        )
        .await
        .unwrap();
    assert_eq!(reward, 1.5);
}

#[tokio::test]
async fn test_real_and_integer_results_match() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let reward = scorer
        .score(
            "school",
            "SELECT SUM(year) * 1.0 FROM students",
            "SELECT SUM(year) FROM students",
        )
        .await
        .unwrap();
    assert_eq!(reward, 2.0);
}

#[tokio::test]
async fn test_failed_candidate_scores_text_similarity() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let candidate = "SELECT * FROM nosuchtable";
    let solution = "SELECT id FROM students";
    let reward = scorer
        .score_detailed("school", candidate, solution)
        .await
        .unwrap();

    assert!(!reward.candidate_executed());
    assert!((reward.value - text_similarity(candidate, solution, 1000)).abs() < 1e-12);
    assert!((reward.value - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
    match reward.detail {
        RewardDetail::TextSimilarity {
            candidate_error, ..
        } => assert!(candidate_error.message.contains("nosuchtable")),
        other => panic!("Expected text similarity, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_candidate_falls_back_to_text() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    // A NULL solution row must not be matched by text that failed to decode.
    let reward = scorer
        .score_detailed("school", "SELECT CAST(x'ff' AS TEXT)", "SELECT NULL")
        .await
        .unwrap();

    assert!(!reward.candidate_executed());
    assert!(reward.value <= 1.0);
}

#[tokio::test]
async fn test_distinct_blobs_do_not_match() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let reward = scorer
        .score("school", "SELECT x'ff'", "SELECT x'fe'")
        .await
        .unwrap();
    assert_eq!(reward, 1.0);
}

#[tokio::test]
async fn test_multiple_statement_candidate_is_fatal() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let err = scorer
        .score(
            "school",
            "SELECT name FROM students; DELETE FROM students",
            "SELECT name FROM students",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RewardError::MultipleStatements(_)));

    let reward = scorer
        .score("school", "SELECT name FROM students", "SELECT name FROM students")
        .await
        .unwrap();
    assert_eq!(reward, 2.0);
}

#[tokio::test]
async fn test_branch_ranges() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());
    let solution = "SELECT name FROM students WHERE year = 2";

    let candidates = [
        "SELECT name FROM students",
        "SELECT name FROM students WHERE year = 3",
        "SELECT title FROM courses",
        "SELECT name FROM student",
        "SELEC name",
    ];
    for candidate in candidates {
        let reward = scorer
            .score_detailed("school", candidate, solution)
            .await
            .unwrap();
        if reward.candidate_executed() {
            assert!((1.0..=2.0).contains(&reward.value), "{candidate}: {}", reward.value);
        } else {
            assert!((0.0..=1.0).contains(&reward.value), "{candidate}: {}", reward.value);
        }
    }
}

#[tokio::test]
async fn test_empty_candidate_under_each_policy() {
    let dir = school_dir().await;
    let candidate = "SELECT name FROM students WHERE year = 99";
    let solution = "SELECT name FROM students";

    let lenient = scorer_for(dir.path(), Config::default());
    assert_eq!(lenient.score("school", candidate, solution).await.unwrap(), 1.5);

    let strict = scorer_for(
        dir.path(),
        Config {
            scoring: ScoringConfig {
                empty_rows: EmptyRowsPolicy::Reject,
                ..Default::default()
            },
            ..Default::default()
        },
    );
    let err = strict.score("school", candidate, solution).await.unwrap_err();
    assert!(matches!(err, RewardError::DegenerateRowSet(_)));
}

#[tokio::test]
async fn test_failing_solution_is_fatal() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let err = scorer
        .score("school", "SELECT name FROM students", "SELECT nope FROM students")
        .await
        .unwrap_err();
    assert!(matches!(err, RewardError::SolutionQuery(_)));
    assert_eq!(err.category(), "Solution Query Error");
}

#[tokio::test]
async fn test_failing_solution_not_reached_when_candidate_fails() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    // Both queries are broken; only the candidate runs, so no error surfaces.
    let reward = scorer
        .score("school", "SELECT nope FROM students", "SELECT nada FROM students")
        .await
        .unwrap();
    assert!((0.0..=1.0).contains(&reward));
}

#[tokio::test]
async fn test_unknown_database() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let err = scorer
        .score("library", "SELECT 1", "SELECT 1")
        .await
        .unwrap_err();
    assert!(matches!(err, RewardError::Resolution(_)));
}

#[tokio::test]
async fn test_scoring_is_idempotent() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let candidate = "SELECT name FROM students WHERE year >= 2 AND id < 3";
    let solution = "SELECT name FROM students WHERE year = 2";
    let first = scorer.score_detailed("school", candidate, solution).await.unwrap();
    let second = scorer.score_detailed("school", candidate, solution).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_read_only_turns_writes_into_failures() {
    let dir = school_dir().await;
    let scorer = scorer_for(
        dir.path(),
        Config {
            database: DatabaseConfig {
                read_only: true,
                ..Default::default()
            },
            ..Default::default()
        },
    );

    let reward = scorer
        .score_detailed("school", "DELETE FROM students", "SELECT name FROM students")
        .await
        .unwrap();
    assert!(!reward.candidate_executed());

    let count = scorer
        .score("school", "SELECT COUNT(*) FROM students", "SELECT 3")
        .await
        .unwrap();
    assert_eq!(count, 2.0);
}

#[tokio::test]
async fn test_databases_are_independent() {
    let dir = tempdir().unwrap();
    create_database(dir.path(), "school", SCHOOL_SQL).await;
    create_database(
        dir.path(),
        "shop",
        "CREATE TABLE students (name TEXT); INSERT INTO students VALUES ('Zed');",
    )
    .await;
    let scorer = scorer_for(dir.path(), Config::default());

    let sql = "SELECT name FROM students";
    let (school, shop) = tokio::join!(
        scorer.score("school", sql, "SELECT 'Ada' UNION SELECT 'Brook' UNION SELECT 'Cyd'"),
        scorer.score("shop", sql, "SELECT 'Zed'"),
    );
    assert_eq!(school.unwrap(), 2.0);
    assert_eq!(shop.unwrap(), 2.0);
}

#[test]
fn test_score_blocking() {
    let dir = tempdir().unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(create_database(dir.path(), "school", SCHOOL_SQL));
    drop(runtime);

    let scorer = scorer_for(dir.path(), Config::default());
    let reward = scorer
        .score_blocking("school", "SELECT id FROM students", "SELECT id FROM students")
        .unwrap();
    assert_eq!(reward, 2.0);
}
