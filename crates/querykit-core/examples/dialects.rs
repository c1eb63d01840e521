//! Dialects - One Builder, Three Databases
//!
//! This example renders the same statements for MySQL, PostgreSQL and
//! SQLite:
//! - Lookup filters combined with `Q` trees
//! - Joins, grouping and aggregation
//! - Bound parameters via `build()`
//! - Schema changes with abstract column types
//!
//! Run with: cargo run --example dialects
//! Set `RUST_LOG=querykit_core=trace` to see every compiled statement.

use std::sync::Arc;

use querykit_core::{
    q, Adapter, Aggregation, JoinType, MysqlAdapter, PostgresAdapter, Q, QueryBuilder, Result,
    SqliteAdapter,
};
use tracing_subscriber::EnvFilter;

fn adapters() -> Vec<Arc<dyn Adapter>> {
    vec![
        Arc::new(MysqlAdapter::new()),
        Arc::new(PostgresAdapter::new()),
        Arc::new(SqliteAdapter::new()),
    ]
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// Active users whose name starts with a prefix, or who belong to staff groups.
fn active_users(adapter: Arc<dyn Adapter>) -> QueryBuilder {
    QueryBuilder::new(adapter)
        .select("id, name, email")
        .from("user")
        .where_clause(q! { "is_active" => true, "deleted_at__isnull" => true })
        .and_where(Q::any([
            Q::lookup("name__istartswith", "adm"),
            Q::lookup("group_id__in", [1, 2]),
        ]))
        .order_by(&["-created_at"])
        .limit(20)
}

/// Order totals per customer above a threshold.
fn order_totals(adapter: Arc<dyn Adapter>) -> QueryBuilder {
    QueryBuilder::new(adapter)
        .select("c.name")
        .select_expr(Aggregation::sum("o.total").alias("total"))
        .select_expr(Aggregation::count("o.id").alias("orders"))
        .from_as("customer", "c")
        .join_as(JoinType::Left, "order", "[[o.customer_id]] = [[c.id]]", "o")
        .group_by(&["c.name"])
        .and_having(q! { "total__gt" => 1000 })
}

fn print_section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "-".repeat(title.len()));
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    print_section("Filtered select");
    for adapter in adapters() {
        println!("{:>6}: {}", adapter.name(), active_users(adapter.clone()).to_sql()?);
    }

    print_section("Aggregation with HAVING");
    for adapter in adapters() {
        println!("{:>6}: {}", adapter.name(), order_totals(adapter.clone()).to_sql()?);
    }

    print_section("Bound parameters");
    for adapter in adapters() {
        let (sql, params) = active_users(adapter.clone()).build()?;
        println!("{:>6}: {sql}", adapter.name());
        println!("        {params:?}");
    }

    print_section("Schema changes");
    for adapter in adapters() {
        let create = QueryBuilder::new(adapter.clone())
            .create_table(
                "{{%user}}",
                [
                    ("id", "pk"),
                    ("email", "string(128) NOT NULL"),
                    ("is_active", "boolean"),
                    ("created_at", "datetime"),
                ],
                "",
            )
            .to_sql()?;
        println!("{:>6}: {create}", adapter.name());

        // Not every dialect can alter a column in place.
        match QueryBuilder::new(adapter.clone())
            .alter_column("user", "email", "string(255)")
            .to_sql()
        {
            Ok(sql) => println!("        {sql}"),
            Err(err) => println!("        {err}"),
        }
    }

    Ok(())
}
