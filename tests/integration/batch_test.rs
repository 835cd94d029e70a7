//! Batch scoring integration tests.

use super::common::{school_dir, scorer_for};
use sql_reward::batch::score_batch;
use sql_reward::config::Config;

#[tokio::test]
async fn test_batch_scores_in_input_order() {
    let dir = school_dir().await;
    let scorer = scorer_for(dir.path(), Config::default());

    let input = [
        r#"{"id": "q1", "db_id": "school", "candidate": "SELECT name FROM students", "solution": "SELECT name FROM students"}"#,
        r#"{"id": 2, "db_id": "school", "candidate": "SELECT * FROM nosuchtable", "solution": "SELECT id FROM students"}"#,
        r#"{"db_id": "library", "candidate": "SELECT 1", "query": "SELECT 1"}"#,
        r#"{"db_id": "school", "candidate": "SELECT 1, 'a' UNION SELECT 2, 'b'", "solution": "SELECT 1, 'a' UNION SELECT 3, 'c'"}"#,
    ]
    .join("\n");

    let mut output = Vec::new();
    let summary = score_batch(&scorer, input.as_bytes(), &mut output, 3)
        .await
        .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.scored, 3);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.text_fallbacks, 1);

    let results: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(results.len(), 4);

    assert_eq!(results[0]["id"], "q1");
    assert_eq!(results[0]["path"], "row_comparison");
    assert_eq!(results[0]["value"], 2.0);

    assert_eq!(results[1]["id"], 2);
    assert_eq!(results[1]["path"], "text_similarity");
    assert!(results[1]["candidate_error"]["message"]
        .as_str()
        .unwrap()
        .contains("no such table"));

    assert_eq!(results[2]["line"], 3);
    assert!(results[2].get("value").is_none());
    assert!(results[2]["error"]
        .as_str()
        .unwrap()
        .contains("Resolution error"));

    assert_eq!(results[3]["value"], 1.5);
    assert_eq!(results[3]["excess_rows"], 1);
    assert_eq!(results[3]["missing_rows"], 1);

    let expected_mean = (2.0 + results[1]["value"].as_f64().unwrap() + 1.5) / 3.0;
    assert!((summary.mean_reward - expected_mean).abs() < 1e-12);
}
