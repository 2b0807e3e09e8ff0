//! End-to-end tests for the terminal operations against an in-memory executor.

use sorm::{
    AuditLog, BuilderConfig, ExecResult, Executor, Payload, Row, SormError, SormResult,
    StatementBuilder, Value, args, raw,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every statement it receives and replays canned responses.
#[derive(Default)]
struct RecordingExecutor {
    log: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Mutex<VecDeque<SormResult<Vec<SormResult<Row>>>>>,
    result: Mutex<Option<ExecResult>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingExecutor {
    fn new() -> Self {
        Self::default()
    }

    fn with_rows(self, rows: Vec<SormResult<Row>>) -> Self {
        self.rows.lock().unwrap().push_back(Ok(rows));
        self
    }

    fn with_result(self, rows_affected: u64, last_insert_id: u64) -> Self {
        *self.result.lock().unwrap() = Some(ExecResult::new(rows_affected, last_insert_id));
        self
    }

    fn failing(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }

    fn last_sql(&self) -> String {
        self.statements()
            .last()
            .map(|(sql, _)| sql.clone())
            .unwrap_or_default()
    }

    fn record(&self, sql: &str, args: &[Value]) -> SormResult<()> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
        match self.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(SormError::driver(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }
}

impl Executor for RecordingExecutor {
    async fn query(&self, sql: &str, args: &[Value]) -> SormResult<Vec<SormResult<Row>>> {
        self.record(sql, args)?;
        self.rows
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> SormResult<ExecResult> {
        self.record(sql, args)?;
        Ok(self.result.lock().unwrap().unwrap_or_default())
    }
}

fn row(cells: &[(&str, &str)]) -> Row {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn builder() -> StatementBuilder {
    StatementBuilder::new().with_audit_sink(Arc::new(AuditLog::new()))
}

// ==================== Reads ====================

#[tokio::test]
async fn fetch_all_returns_rows_and_resets() {
    let conn = RecordingExecutor::new()
        .with_rows(vec![Ok(row(&[("id", "1")])), Ok(row(&[("id", "2")]))]);
    let mut db = builder();

    let rows = db
        .table("users")
        .fields("id")
        .eq("status", "active")
        .fetch_all(&conn)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["id"], "2");
    assert_eq!(
        conn.statements(),
        vec![(
            "SELECT `id` FROM `users` WHERE `status` = ? LIMIT 0,100".to_string(),
            args!["active"],
        )]
    );
    assert!(db.is_pristine());
}

#[tokio::test]
async fn fetch_all_skips_rows_that_fail_to_scan() {
    let conn = RecordingExecutor::new().with_rows(vec![
        Ok(row(&[("id", "1")])),
        Err(SormError::scan("bad utf-8 in column name")),
        Ok(row(&[("id", "3")])),
    ]);

    let rows = builder()
        .table("users")
        .fields("*")
        .fetch_all(&conn)
        .await
        .unwrap();

    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
}

#[tokio::test]
async fn fetch_one_defaults_to_limit_one() {
    let conn = RecordingExecutor::new().with_rows(vec![Ok(row(&[("name", "alice")]))]);
    let mut db = builder();

    let user = db
        .table("users")
        .fields("name")
        .eq("id", 5)
        .fetch_one(&conn)
        .await
        .unwrap();

    assert_eq!(user["name"], "alice");
    assert_eq!(
        conn.last_sql(),
        "SELECT `name` FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0"
    );
}

#[tokio::test]
async fn fetch_one_keeps_explicit_limit() {
    let conn = RecordingExecutor::new();
    let user = builder()
        .table("users")
        .fields("*")
        .limit(3)
        .offset(6)
        .fetch_one(&conn)
        .await
        .unwrap();

    assert!(user.is_empty());
    assert!(conn.last_sql().ends_with(" LIMIT 3 OFFSET 6"));
}

#[tokio::test]
async fn count_reads_count_cell() {
    let conn = RecordingExecutor::new().with_rows(vec![Ok(row(&[("COUNT(*)", "42")]))]);
    let n = builder()
        .table("users")
        .gt("age", 18)
        .count(&conn)
        .await
        .unwrap();

    assert_eq!(n, 42);
    assert_eq!(
        conn.last_sql(),
        "SELECT COUNT(*) FROM `users` WHERE `age` > ? LIMIT 1 OFFSET 0"
    );
}

#[tokio::test]
async fn count_without_rows_is_zero() {
    let conn = RecordingExecutor::new();
    assert_eq!(builder().table("users").count(&conn).await.unwrap(), 0);
}

#[tokio::test]
async fn sum_maps_empty_cells_to_zero() {
    let conn = RecordingExecutor::new()
        .with_rows(vec![Ok(row(&[("SUM(`a`)", "3"), ("SUM(`b`)", "")]))]);

    let sums = builder()
        .table("t")
        .sum(&conn, "a,b")
        .await
        .unwrap();

    assert_eq!(sums.len(), 2);
    assert_eq!(sums["a"], 3);
    assert_eq!(sums["b"], 0);
    assert_eq!(
        conn.last_sql(),
        "SELECT SUM(`a`),SUM(`b`) FROM `t` WHERE 1=1 LIMIT 1 OFFSET 0"
    );
}

#[tokio::test]
async fn min_max_quote_dotted_columns() {
    let conn = RecordingExecutor::new()
        .with_rows(vec![Ok(row(&[("MAX(`o`.`total`)", "900")]))])
        .with_rows(vec![Ok(row(&[("MIN(`o`.`total`)", "-4")]))]);
    let mut db = builder();

    let max = db.table("orders").alias("o").max(&conn, "o.total").await.unwrap();
    let min = db.table("orders").alias("o").min(&conn, "o.total").await.unwrap();

    assert_eq!(max["o.total"], 900);
    assert_eq!(min["o.total"], -4);
}

#[tokio::test]
async fn fractional_avg_is_a_type_conversion_error() {
    let conn = RecordingExecutor::new().with_rows(vec![Ok(row(&[("AVG(`age`)", "31.5000")]))]);
    let mut db = builder();

    let err = db.table("users").avg(&conn, "age").await.unwrap_err();

    assert!(err.is_type_conversion());
    match err {
        SormError::TypeConversion { column, value, .. } => {
            assert_eq!(column, "age");
            assert_eq!(value, "31.5000");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(db.is_pristine());
}

// ==================== Writes ====================

#[tokio::test]
async fn insert_returns_last_insert_id() {
    let conn = RecordingExecutor::new().with_result(1, 77);

    let id = builder()
        .table("users")
        .insert(
            &conn,
            Payload::new()
                .set("name", "alice")
                .set("created_at", raw("NOW()")),
        )
        .await
        .unwrap();

    assert_eq!(id, 77);
    assert_eq!(
        conn.statements(),
        vec![(
            "INSERT INTO `users` (`name`,`created_at`) VALUE (?,NOW())".to_string(),
            args!["alice"],
        )]
    );
}

#[tokio::test]
async fn update_returns_rows_affected() {
    let conn = RecordingExecutor::new().with_result(3, 0);

    let n = builder()
        .table("users")
        .eq("team", 9)
        .update(&conn, Payload::new().set("status", "moved"))
        .await
        .unwrap();

    assert_eq!(n, 3);
    assert_eq!(
        conn.statements(),
        vec![(
            "UPDATE `users` SET `status` = ? WHERE `team` = ?".to_string(),
            args!["moved", 9],
        )]
    );
}

#[tokio::test]
async fn update_field_sets_one_column() {
    let conn = RecordingExecutor::new().with_result(1, 0);
    builder()
        .table("users")
        .eq("id", 1)
        .update_field(&conn, "nickname", "al")
        .await
        .unwrap();

    assert_eq!(
        conn.last_sql(),
        "UPDATE `users` SET `nickname` = ? WHERE `id` = ?"
    );
}

#[tokio::test]
async fn increase_and_decrease_use_raw_arithmetic() {
    let conn = RecordingExecutor::new().with_result(1, 0);
    let mut db = builder();

    db.table("posts")
        .eq("id", 4)
        .increase(&conn, [("views", 1), ("likes", 2)])
        .await
        .unwrap();
    db.table("items")
        .eq("sku", "A-1")
        .decrease(&conn, vec![("stock".to_string(), 5)])
        .await
        .unwrap();

    assert_eq!(
        conn.statements(),
        vec![
            (
                "UPDATE `posts` SET `views` = `views`+1,`likes` = `likes`+2 WHERE `id` = ?"
                    .to_string(),
                args![4],
            ),
            (
                "UPDATE `items` SET `stock` = `stock`-5 WHERE `sku` = ?".to_string(),
                args!["A-1"],
            ),
        ]
    );
}

#[tokio::test]
async fn delete_returns_rows_affected() {
    let conn = RecordingExecutor::new().with_result(12, 0);
    let mut db = builder();

    let n = db.table("sessions").delete(&conn).await.unwrap();
    assert_eq!(n, 12);
    assert_eq!(conn.last_sql(), "DELETE FROM `sessions` WHERE 1=1");

    db.table("sessions").lt("expires_at", 1000).delete(&conn).await.unwrap();
    assert_eq!(
        conn.last_sql(),
        "DELETE FROM `sessions` WHERE `expires_at` < ?"
    );
}

// ==================== Reset on every path ====================

#[tokio::test]
async fn validation_error_resets_without_io() {
    let conn = RecordingExecutor::new();
    let mut db = builder();

    let err = db
        .table("users")
        .eq("id", 1)
        .limit(5)
        .fetch_all(&conn)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(conn.statements().is_empty());
    assert!(db.is_pristine());
    assert_eq!(db.predicate_count(), 0);
    assert_eq!(db.current_limit(), 0);
}

#[tokio::test]
async fn empty_payload_is_rejected_before_execution() {
    let conn = RecordingExecutor::new();
    let mut db = builder();

    let err = db.table("users").insert(&conn, Payload::new()).await.unwrap_err();
    assert!(err.is_validation());
    let err = db.table("users").update(&conn, Payload::new()).await.unwrap_err();
    assert!(err.is_validation());
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn driver_error_passes_through_and_resets() {
    let conn = RecordingExecutor::new().failing("connection reset by peer");
    let mut db = builder();

    let err = db
        .table("users")
        .fields("*")
        .eq("id", 1)
        .fetch_all(&conn)
        .await
        .unwrap_err();

    assert!(err.is_driver());
    assert_eq!(err.to_string(), "connection reset by peer");
    assert!(std::error::Error::source(&err).is_some());
    assert!(db.is_pristine());

    // The next statement starts from scratch.
    let err = db.table("users").delete(&conn).await.unwrap_err();
    assert!(err.is_driver());
    assert_eq!(conn.last_sql(), "DELETE FROM `users` WHERE 1=1");
}

#[tokio::test]
async fn reset_happens_before_the_future_is_polled() {
    let conn = RecordingExecutor::new();
    let mut db = builder();

    let pending = db.table("users").fields("*").eq("id", 1).fetch_all(&conn);
    assert!(db.is_pristine());

    db.table("other");
    pending.await.unwrap();
    assert_eq!(
        conn.last_sql(),
        "SELECT * FROM `users` WHERE `id` = ? LIMIT 0,100"
    );
}

// ==================== Audit ====================

#[tokio::test]
async fn audited_statements_are_rendered_into_the_sink() {
    let conn = RecordingExecutor::new().with_result(1, 0);
    let log = AuditLog::new();
    let mut db = StatementBuilder::new().with_audit_sink(Arc::new(log.clone()));

    db.table("users")
        .eq("id", 7)
        .enable_audit()
        .update(&conn, Payload::new().set("name", "bob"))
        .await
        .unwrap();
    // Not audited: the flag was reset with the previous statement.
    db.table("users").delete(&conn).await.unwrap();

    assert_eq!(
        log.entries(),
        vec!["UPDATE `users` SET `name` = bob WHERE `id` = 7".to_string()]
    );
}

#[tokio::test]
async fn audit_by_default_applies_to_every_statement() {
    let conn = RecordingExecutor::new();
    let log = AuditLog::new();
    let mut db = StatementBuilder::with_config(BuilderConfig::new().with_audit_by_default(true))
        .with_audit_sink(Arc::new(log.clone()));

    db.table("a").fields("*").fetch_all(&conn).await.unwrap();
    db.table("b").delete(&conn).await.unwrap();

    assert_eq!(log.len(), 2);
    assert_eq!(log.last().as_deref(), Some("DELETE FROM `b` WHERE 1=1"));
}

#[tokio::test]
async fn rejected_statements_are_not_audited() {
    let conn = RecordingExecutor::new();
    let log = AuditLog::new();
    let mut db = StatementBuilder::new().with_audit_sink(Arc::new(log.clone()));

    let _ = db.table("users").enable_audit().fetch_all(&conn).await;
    assert!(log.is_empty());
}
