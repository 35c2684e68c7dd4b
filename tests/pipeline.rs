//! End-to-end pipeline tests against an in-memory database and a scripted
//! oracle. No network, no real completion service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use courtdesk::config::Config;
use courtdesk::migrate;
use courtdesk::models::{ConversationTurn, Outcome};
use courtdesk::oracle::Oracle;
use courtdesk::pipeline::{Pipeline, FAILURE_ANSWER};
use courtdesk::triage::CHATTER_ANSWER;

/// Oracle that replays a fixed list of completions and records every prompt
/// it is asked to complete.
struct ScriptedOracle {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompt(&self, idx: usize) -> String {
        self.prompts.lock().unwrap()[idx].clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, prompt: &str, _max_output_tokens: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("scripted oracle exhausted"))
    }
}

async fn test_pool() -> SqlitePool {
    // one connection: each in-memory SQLite connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate::apply(&pool).await.unwrap();
    pool
}

fn test_config(max_requests: usize) -> Config {
    let mut config = Config::minimal();
    config.rate_limit.max_requests = max_requests;
    config
}

async fn pipeline_with(oracle: Arc<ScriptedOracle>, max_requests: usize) -> Pipeline {
    Pipeline::new(test_pool().await, oracle, test_config(max_requests))
}

#[tokio::test]
async fn test_chatter_short_circuits_before_any_oracle_work() {
    let oracle = ScriptedOracle::new(&[]);
    let pipeline = pipeline_with(oracle.clone(), 100).await;

    let outcome = pipeline.ask("1.2.3.4", "hello", &[]).await.unwrap();
    assert!(matches!(outcome, Outcome::Chatter));
    assert_eq!(oracle.call_count(), 0);

    let response = pipeline.respond("hello", outcome);
    assert_eq!(response.answer, CHATTER_ANSWER);
    assert!(response.sql.is_none());
    assert!(response.results.is_none());
}

#[tokio::test]
async fn test_empty_question_is_a_caller_error_not_a_canned_answer() {
    let oracle = ScriptedOracle::new(&[]);
    let pipeline = pipeline_with(oracle.clone(), 100).await;

    assert!(pipeline.ask("1.2.3.4", "", &[]).await.is_err());
    assert!(pipeline.ask("1.2.3.4", "   \t ", &[]).await.is_err());
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_monthly_revenue_scenario() {
    let oracle = ScriptedOracle::new(&[
        "SELECT SUM(price) AS revenue FROM bookings \
         WHERE status = 'completed' AND strftime('%Y-%m', booking_date) = '2026-01'",
        "We made 85 dollars this month, all from one completed booking.",
    ]);
    let pipeline = pipeline_with(oracle.clone(), 100).await;

    sqlx::query(
        "INSERT INTO members (member_id, name, email, join_date, status) \
         VALUES (1, 'Emma Smith', 'emma@email.com', '2025-06-01', 'active')",
    )
    .execute(pipeline.pool())
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO bookings (booking_id, member_id, court_id, booking_date, price, status) \
         VALUES (1, 1, 1, '2026-01-02', 85.00, 'completed')",
    )
    .execute(pipeline.pool())
    .await
    .unwrap();

    let outcome = pipeline
        .ask("1.2.3.4", "how much revenue this month", &[])
        .await
        .unwrap();

    let Outcome::Answer {
        sql,
        results,
        answer,
    } = outcome
    else {
        panic!("expected Answer outcome");
    };
    assert!(sql.contains("SUM(price)"));
    assert_eq!(results.rows, vec![vec![Some("85".to_string())]]);
    assert!(answer.contains("85"));
    assert_eq!(oracle.call_count(), 2);

    // the narration prompt saw the rendered result set, not raw rows
    let narration_prompt = oracle.prompt(1);
    assert!(narration_prompt.contains("revenue"));
    assert!(narration_prompt.contains("85"));
}

#[tokio::test]
async fn test_fenced_completion_is_stripped_before_execution() {
    let oracle = ScriptedOracle::new(&[
        "```sql\nSELECT COUNT(*) AS n FROM members\n```",
        "You have no members yet.",
    ]);
    let pipeline = pipeline_with(oracle, 100).await;

    let outcome = pipeline
        .ask("1.2.3.4", "how many members", &[])
        .await
        .unwrap();
    let Outcome::Answer { sql, results, .. } = outcome else {
        panic!("expected Answer outcome");
    };
    assert_eq!(sql, "SELECT COUNT(*) AS n FROM members");
    assert_eq!(results.rows, vec![vec![Some("0".to_string())]]);
}

#[tokio::test]
async fn test_execution_failures_collapse_to_one_canned_answer() {
    for bad_sql in ["SELECT nope FROM members", "SELEKT garbage", "SELECT * FROM no_such_table"] {
        let oracle = ScriptedOracle::new(&[bad_sql]);
        let pipeline = pipeline_with(oracle.clone(), 100).await;

        let outcome = pipeline
            .ask("1.2.3.4", "some confusing question", &[])
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Failure));

        let response = pipeline.respond("some confusing question", outcome);
        assert_eq!(response.answer, FAILURE_ANSWER);
        assert!(response.sql.is_none());
        assert!(response.results.is_none());
        // narration never runs on the failure path
        assert_eq!(oracle.call_count(), 1);
    }
}

#[tokio::test]
async fn test_read_only_guard_rejects_write_statements() {
    for statement in [
        "DELETE FROM members",
        "DROP TABLE bookings",
        "UPDATE members SET status = 'churned'",
        "INSERT INTO courts (court_name) VALUES ('rogue')",
    ] {
        let oracle = ScriptedOracle::new(&[statement]);
        let pipeline = pipeline_with(oracle.clone(), 100).await;

        let outcome = pipeline
            .ask("1.2.3.4", "please break things", &[])
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Failure));
        assert_eq!(oracle.call_count(), 1);
    }

    // and the guard never fired against the store
    let oracle = ScriptedOracle::new(&["DELETE FROM members"]);
    let pipeline = pipeline_with(oracle, 100).await;
    sqlx::query(
        "INSERT INTO members (member_id, name, email, join_date) \
         VALUES (1, 'Emma Smith', 'emma@email.com', '2025-06-01')",
    )
    .execute(pipeline.pool())
    .await
    .unwrap();
    pipeline
        .ask("1.2.3.4", "remove everyone", &[])
        .await
        .unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(pipeline.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_rate_limit_rejects_after_ceiling() {
    let oracle = ScriptedOracle::new(&[]);
    let pipeline = pipeline_with(oracle.clone(), 2).await;

    // chatter still consumes admission slots; two get through
    for _ in 0..2 {
        let outcome = pipeline.ask("9.9.9.9", "hello", &[]).await.unwrap();
        assert!(matches!(outcome, Outcome::Chatter));
    }

    // hammering past the ceiling behaves the same on every extra attempt
    for _ in 0..5 {
        let outcome = pipeline.ask("9.9.9.9", "hello", &[]).await.unwrap();
        assert!(matches!(outcome, Outcome::RateLimited));
    }

    let response = pipeline.respond("hello", Outcome::RateLimited);
    assert!(response.answer.contains('2'));
    assert!(response.sql.is_none());
    assert!(response.results.is_none());

    // a different identity is unaffected
    let outcome = pipeline.ask("8.8.8.8", "hello", &[]).await.unwrap();
    assert!(matches!(outcome, Outcome::Chatter));
}

#[tokio::test]
async fn test_null_cells_render_as_explicit_marker_in_narration_prompt() {
    let oracle = ScriptedOracle::new(&[
        "SELECT coach_id, cancellation_reason FROM bookings",
        "One court rental with no coach, cancelled for weather.",
    ]);
    let pipeline = pipeline_with(oracle.clone(), 100).await;

    sqlx::query(
        "INSERT INTO members (member_id, name, email, join_date) \
         VALUES (1, 'Emma Smith', 'emma@email.com', '2025-06-01')",
    )
    .execute(pipeline.pool())
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO bookings (booking_id, member_id, coach_id, court_id, booking_date, status, \
         cancellation_reason) VALUES (1, 1, NULL, 1, '2026-01-01', 'cancelled', 'weather')",
    )
    .execute(pipeline.pool())
    .await
    .unwrap();

    let outcome = pipeline
        .ask("1.2.3.4", "which bookings had no coach", &[])
        .await
        .unwrap();
    let Outcome::Answer { results, .. } = outcome else {
        panic!("expected Answer outcome");
    };
    assert_eq!(results.rows, vec![vec![None, Some("weather".to_string())]]);

    let narration_prompt = oracle.prompt(1);
    assert!(narration_prompt.contains("NULL | weather"));
}

#[tokio::test]
async fn test_history_window_reaches_the_sql_prompt() {
    let oracle = ScriptedOracle::new(&["SELECT COUNT(*) AS n FROM members", "Zero members."]);
    let pipeline = pipeline_with(oracle.clone(), 100).await;

    let history = vec![
        ConversationTurn {
            question: "oldest question".to_string(),
            answer: "oldest answer".to_string(),
        },
        ConversationTurn {
            question: "who booked the most lessons".to_string(),
            answer: "Emma Smith, with 12 bookings".to_string(),
        },
        ConversationTurn {
            question: "and second place".to_string(),
            answer: "Liam Johnson, with 9 bookings".to_string(),
        },
        ConversationTurn {
            question: "third".to_string(),
            answer: "Olivia Brown, with 7 bookings".to_string(),
        },
    ];

    pipeline
        .ask("1.2.3.4", "how many of them are members", &history)
        .await
        .unwrap();

    let sql_prompt = oracle.prompt(0);
    // window keeps the last three turns only
    assert!(!sql_prompt.contains("oldest question"));
    assert!(sql_prompt.contains("User asked: who booked the most lessons"));
    assert!(sql_prompt.contains("Assistant answered: Emma Smith, with 12 bookings..."));
    assert!(sql_prompt.contains("Current question: how many of them are members"));
}

#[tokio::test]
async fn test_oracle_failure_propagates_as_service_error() {
    // empty script: the first completion call fails
    let oracle = ScriptedOracle::new(&[]);
    let pipeline = pipeline_with(oracle, 100).await;

    let result = pipeline.ask("1.2.3.4", "how many members", &[]).await;
    assert!(result.is_err());
}
