//! Builder output executed against an in-memory SQLite database.

use std::sync::Arc;

use querykit_core::adapter::TableElement;
use querykit_core::{
    AdapterOptions, Dialect, Driver, QueryBuilderFactory, QueryError, SchemaReflector, SqlValue,
};
use querykit_sqlite::SqliteDriver;

fn setup() -> (Arc<SqliteDriver>, QueryBuilderFactory) {
    let driver = Arc::new(SqliteDriver::memory().unwrap());
    let factory = QueryBuilderFactory::for_driver(driver.clone(), AdapterOptions::default()).unwrap();
    let create = factory
        .query_builder()
        .create_table(
            "user",
            [("id", "pk"), ("email", "string(128) NOT NULL")],
            "",
        )
        .to_sql()
        .unwrap();
    driver.execute(&create).unwrap();
    (driver, factory)
}

fn reflector(factory: &QueryBuilderFactory) -> SchemaReflector {
    factory.reflector().unwrap()
}

#[test]
fn factory_detects_sqlite() {
    let (_driver, factory) = setup();
    assert_eq!(factory.adapter().dialect(), Dialect::Sqlite);
}

#[test]
fn reflects_created_table() {
    let (_driver, factory) = setup();
    let mut reflector = reflector(&factory);
    let table = reflector.table_schema("user", false).unwrap().unwrap();

    assert_eq!(table.column_names(), vec!["id", "email"]);
    assert_eq!(table.primary_key, vec!["id"]);
    let email = table.get_column("email").unwrap();
    assert_eq!(email.size, Some(128));
    assert!(!email.nullable);

    assert!(reflector.table_schema("ghost", false).unwrap().is_none());
    assert_eq!(reflector.table_names().unwrap(), vec!["user"]);
}

#[test]
fn added_column_needs_refresh() {
    let (driver, factory) = setup();
    let mut reflector = reflector(&factory);
    assert!(reflector
        .table_schema("user", false)
        .unwrap()
        .unwrap()
        .get_column("name")
        .is_none());

    let alter = factory
        .query_builder()
        .add_column("user", "name", "string(64)")
        .to_sql()
        .unwrap();
    driver.execute(&alter).unwrap();

    let cached = reflector.table_schema("user", false).unwrap().unwrap();
    assert!(cached.get_column("name").is_none());

    let fresh = reflector.table_schema("user", true).unwrap().unwrap();
    let name = fresh.get_column("name").unwrap();
    assert_eq!(name.size, Some(64));
    assert!(name.nullable);
}

#[test]
fn unique_index_and_foreign_key() {
    let (driver, factory) = setup();
    let index = factory
        .query_builder()
        .create_index("user", "idx_email", &["email"], true)
        .to_sql()
        .unwrap();
    driver.execute(&index).unwrap();

    let post = factory
        .query_builder()
        .create_table(
            "post",
            vec![
                TableElement::Column {
                    name: "id".into(),
                    definition: "pk".into(),
                },
                TableElement::Column {
                    name: "user_id".into(),
                    definition: "integer".into(),
                },
                TableElement::Constraint(
                    "FOREIGN KEY ([[user_id]]) REFERENCES {{user}} ([[id]])".into(),
                ),
            ],
            "",
        )
        .to_sql()
        .unwrap();
    driver.execute(&post).unwrap();

    let mut reflector = reflector(&factory);
    let user = reflector.table_schema("user", false).unwrap().unwrap().clone();
    let unique = reflector.find_unique_indexes(&user).unwrap();
    assert_eq!(unique["idx_email"], vec!["email"]);

    let post = reflector.table_schema("post", false).unwrap().unwrap();
    let fk = &post.foreign_keys["fk_0"];
    assert_eq!(fk.columns, vec!["user_id"]);
    assert_eq!(fk.ref_table, "user");
    assert_eq!(fk.ref_columns, vec!["id"]);
}

#[test]
fn insert_then_select_rows() {
    let (driver, factory) = setup();
    let insert = factory
        .query_builder()
        .insert("user", &["email"], [["a@example.com"], ["b@example.com"]])
        .to_sql()
        .unwrap();
    assert_eq!(driver.execute(&insert).unwrap(), 2);

    let select = factory
        .query_builder()
        .select("id, email")
        .from("user")
        .order_by(&["id"])
        .to_sql()
        .unwrap();
    let rows = driver.query_all(&select).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_i64("id"), Some(1));
    assert_eq!(rows[1].get_str("email"), Some("b@example.com"));

    let count = driver.query_scalar("SELECT COUNT(*) FROM `user`").unwrap();
    assert_eq!(count, Some(SqlValue::Int(2)));
}

#[test]
fn union_of_ordered_and_limited_selects_runs() {
    let (driver, factory) = setup();
    let insert = factory
        .query_builder()
        .insert(
            "user",
            &["email"],
            [["a@example.com"], ["b@example.com"], ["c@example.com"]],
        )
        .to_sql()
        .unwrap();
    driver.execute(&insert).unwrap();

    let newest = factory
        .query_builder()
        .select("id")
        .from("user")
        .order_by(&["-id"])
        .limit(1);
    let oldest = factory
        .query_builder()
        .select("id")
        .from("user")
        .order_by(&["id"])
        .limit(1);
    let sql = newest.union(oldest, true).to_sql().unwrap();

    let rows = driver.query_all(&sql).unwrap();
    let mut ids: Vec<i64> = rows.iter().filter_map(|row| row.get_i64("id")).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn null_and_real_values() {
    let (driver, _factory) = setup();
    let row = driver
        .query_one("SELECT NULL AS nada, 1.5 AS ratio, X'0102' AS raw")
        .unwrap()
        .unwrap();
    assert_eq!(row.get("nada"), Some(&SqlValue::Null));
    assert_eq!(row.get("ratio"), Some(&SqlValue::Float(1.5)));
    assert_eq!(row.get("raw"), Some(&SqlValue::Blob(vec![1, 2])));
}

#[test]
fn server_clock() {
    let (driver, _factory) = setup();
    let now = driver.now().unwrap().unwrap();
    assert!(now.and_utc().timestamp() > 0);
}

#[test]
fn database_errors_surface_as_driver_errors() {
    let (driver, _factory) = setup();
    let err = driver.execute("SELECT * FROM `ghost`").unwrap_err();
    assert!(matches!(err, QueryError::Driver(_)));
}
