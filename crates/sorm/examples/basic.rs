//! Basic usage example for sorm
//!
//! Run with: cargo run --example basic -p sorm
//!
//! Optional settings in .env or the environment:
//! SORM_TABLE_PREFIX=app_
//! SORM_PAGE_SIZE=20
//! SORM_AUDIT=true

use sorm::{
    AuditLog, BuilderConfig, ExecResult, Executor, Payload, Row, SormResult, StatementBuilder,
    Value, WhereMap, args, raw,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stand-in for a database connection: prints each statement and returns
/// canned results.
#[derive(Default)]
struct PrintingExecutor {
    next_id: AtomicU64,
}

impl Executor for PrintingExecutor {
    async fn query(&self, sql: &str, args: &[Value]) -> SormResult<Vec<SormResult<Row>>> {
        println!("  query:   {sql}  {args:?}");
        let row: Row = if sql.starts_with("SELECT COUNT(*)") {
            HashMap::from([("COUNT(*)".to_string(), "2".to_string())])
        } else if sql.starts_with("SELECT SUM(") {
            HashMap::from([
                ("SUM(`score`)".to_string(), "170".to_string()),
                ("SUM(`visits`)".to_string(), String::new()),
            ])
        } else {
            HashMap::from([
                ("id".to_string(), "1".to_string()),
                ("username".to_string(), "alice".to_string()),
            ])
        };
        Ok(vec![Ok(row)])
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> SormResult<ExecResult> {
        println!("  execute: {sql}  {args:?}");
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ExecResult::new(1, id))
    }
}

#[tokio::main]
async fn main() -> SormResult<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = BuilderConfig::from_env()?;
    println!("config: {config:?}");

    let log = AuditLog::new();
    let conn = PrintingExecutor::default();
    let mut db = StatementBuilder::with_config(config).with_audit_sink(Arc::new(log.clone()));

    println!("\n=== INSERT ===");
    for name in ["alice", "bob"] {
        let id = db
            .table("users")
            .enable_audit()
            .insert(
                &conn,
                Payload::new()
                    .set("username", name)
                    .set("score", 85)
                    .set("created_at", raw("NOW()")),
            )
            .await?;
        println!("  inserted {name} as id {id}");
    }

    println!("\n=== SELECT ===");
    let rows = db
        .table("users")
        .alias("u")
        .fields("u.id,u.username")
        .where_map(
            WhereMap::new()
                .eq("u.status", "active")
                .pair("u.score", "egt", 60)
                .pair("u.id", "in", "1,2,3"),
        )
        .desc("u.id")
        .limit(10)
        .enable_audit()
        .fetch_all(&conn)
        .await?;
    println!("  {} row(s): {:?}", rows.len(), rows);

    println!("\n=== COUNT / SUM ===");
    let total = db.table("users").gt("score", 0).count(&conn).await?;
    println!("  count = {total}");
    let sums = db.table("users").sum(&conn, "score,visits").await?;
    println!("  sums  = {sums:?}");

    println!("\n=== UPDATE ===");
    let changed = db
        .table("users")
        .eq("username", "bob")
        .enable_audit()
        .increase(&conn, [("visits", 1)])
        .await?;
    println!("  {changed} row(s) updated");

    println!("\n=== DELETE ===");
    let removed = db
        .table("users")
        .where_raw("`created_at` < ?", args!["2020-01-01"])
        .enable_audit()
        .delete(&conn)
        .await?;
    println!("  {removed} row(s) deleted");

    println!("\n=== AUDIT LOG ===");
    for (i, entry) in log.entries().iter().enumerate() {
        println!("  {:>2}. {entry}", i + 1);
    }

    Ok(())
}
