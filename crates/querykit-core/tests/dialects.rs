//! Dialect-specific rendering: paging, lookups, literals and DDL.

mod common;
use common::*;

use std::sync::Arc;

use querykit_core::adapter::ddl::{AddForeignKeyOp, DropTableOp, ForeignKeyAction};
use querykit_core::builder::JoinType;
use querykit_core::lookup::LookupContext;
use querykit_core::{
    q, Adapter, DateInput, FilterValue, MysqlAdapter, QueryError, QueryKind, Result, Row,
    SqliteAdapter, SqlValue, Q,
};

fn where_sql(qb: querykit_core::QueryBuilder, filter: Q) -> String {
    qb.from("t").where_clause(filter).to_sql().unwrap()
}

// Paging

#[test]
fn offset_without_limit() {
    assert_eq!(
        sqlite().from("t").offset(5).to_sql().unwrap(),
        "SELECT * FROM `t` LIMIT 9223372036854775807 OFFSET 5"
    );
    assert_eq!(
        mysql().from("t").offset(5).to_sql().unwrap(),
        "SELECT * FROM `t` LIMIT 5, 18446744073709551615"
    );
    assert_eq!(
        pgsql().from("t").offset(5).to_sql().unwrap(),
        "SELECT * FROM \"t\" LIMIT ALL OFFSET 5"
    );
}

#[test]
fn zero_limit_and_offset_are_unset() {
    for adapter in adapters() {
        let qb = querykit_core::QueryBuilder::new(adapter)
            .from("t")
            .limit(0)
            .offset(0);
        assert_sql(&qb, "SELECT * FROM [[t]]");
    }
    assert_eq!(
        sqlite().from("t").limit(3).to_sql().unwrap(),
        "SELECT * FROM `t` LIMIT 3"
    );
}

// Condition trees

#[test]
fn double_negation_keeps_both_wrappers() {
    let sql = where_sql(sqlite(), !!q! { "a" => 1 });
    assert_eq!(sql, "SELECT * FROM `t` WHERE NOT (NOT (`a`=1))");
}

#[test]
fn nested_or_is_parenthesized() {
    let filter = q! { "a" => 1 }.and(Q::any([q! { "b" => "x" }, q! { "b" => "y" }]));
    assert_eq!(
        where_sql(sqlite(), filter),
        "SELECT * FROM `t` WHERE `a`=1 AND (`b`='x' OR `b`='y')"
    );
}

#[test]
fn single_child_groups_render_bare() {
    let filter = Q::all([Q::any([q! { "a" => 1 }])]);
    assert_eq!(where_sql(sqlite(), filter), "SELECT * FROM `t` WHERE `a`=1");
}

#[test]
fn empty_groups_are_skipped() {
    let filter = Q::all([Q::any([]), q! { "a" => 1 }, Q::any([]).negate()]);
    assert_eq!(where_sql(sqlite(), filter), "SELECT * FROM `t` WHERE `a`=1");
    assert_eq!(
        sqlite().from("t").where_clause(Q::all([])).to_sql().unwrap(),
        "SELECT * FROM `t`"
    );
}

#[test]
fn operator_overloads() {
    let filter = (q! { "a" => 1 } | q! { "b" => 2 }) & !q! { "c" => 3 };
    assert_eq!(
        where_sql(sqlite(), filter),
        "SELECT * FROM `t` WHERE (`a`=1 OR `b`=2) AND NOT (`c`=3)"
    );
}

#[test]
fn json_filter_document() {
    let filter = Q::from_json(&serde_json::json!({"deleted_at": null, "id__in": [1, 2]})).unwrap();
    assert_eq!(
        where_sql(pgsql(), filter),
        "SELECT * FROM \"t\" WHERE \"deleted_at\" IS NULL AND \"id\" IN (1, 2)"
    );
}

#[test]
fn json_filter_keeps_key_order() {
    let document: serde_json::Value = serde_json::from_str(r#"{"name": "x", "age__gt": 1}"#).unwrap();
    let from_json = Q::from_json(&document).unwrap();
    assert_eq!(
        where_sql(sqlite(), from_json),
        "SELECT * FROM `t` WHERE `name`='x' AND `age`>1"
    );
    assert_eq!(
        where_sql(sqlite(), q! { "name" => "x", "age__gt" => 1 }),
        "SELECT * FROM `t` WHERE `name`='x' AND `age`>1"
    );
}

// Lookups

#[test]
fn comparison_lookups() {
    let filter = q! { "a__gt" => 1, "b__gte" => 2, "c__lt" => 3, "d__lte" => 4, "e__isnull" => true };
    assert_eq!(
        where_sql(sqlite(), filter),
        "SELECT * FROM `t` WHERE `a`>1 AND `b`>=2 AND `c`<3 AND `d`<=4 AND `e` IS NULL"
    );
}

#[test]
fn exact_null_is_is_null() {
    assert_eq!(
        where_sql(sqlite(), q! { "a" => None::<i64> }),
        "SELECT * FROM `t` WHERE `a` IS NULL"
    );
}

#[test]
fn comparison_rejects_lists() {
    let err = sqlite()
        .from("t")
        .where_clause(q! { "a__gt" => [1, 2] })
        .to_sql()
        .unwrap_err();
    assert!(err.is_lookup_error());
}

#[test]
fn range_needs_two_values() {
    let err = sqlite()
        .from("t")
        .where_clause(q! { "a__range" => [1] })
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidLookupValue { ref lookup, .. } if lookup == "range"));

    assert_eq!(
        where_sql(pgsql(), q! { "a__range" => [1, 9] }),
        "SELECT * FROM \"t\" WHERE \"a\" BETWEEN 1 AND 9"
    );
}

#[test]
fn like_lookups_per_dialect() {
    assert_eq!(
        where_sql(sqlite(), q! { "name__contains" => "50%" }),
        "SELECT * FROM `t` WHERE `name` LIKE '%50\\%%' ESCAPE '\\'"
    );
    assert_eq!(
        where_sql(sqlite(), q! { "name__icontains" => "FoO" }),
        "SELECT * FROM `t` WHERE LOWER(`name`) LIKE '%foo%' ESCAPE '\\'"
    );
    assert_eq!(
        where_sql(mysql(), q! { "name__startswith" => "ab" }),
        "SELECT * FROM `t` WHERE `name` LIKE BINARY 'ab%'"
    );
    assert_eq!(
        where_sql(mysql(), q! { "name__iendswith" => "AB" }),
        "SELECT * FROM `t` WHERE LOWER(`name`) LIKE '%ab'"
    );
    assert_eq!(
        where_sql(pgsql(), q! { "name__icontains" => "Ab" }),
        "SELECT * FROM \"t\" WHERE \"name\" ILIKE '%Ab%'"
    );
    assert_eq!(
        where_sql(pgsql(), q! { "name__endswith" => "x" }),
        "SELECT * FROM \"t\" WHERE \"name\" LIKE '%x'"
    );
}

#[test]
fn regex_lookups_per_dialect() {
    assert_eq!(
        where_sql(mysql(), q! { "name__regex" => "^a" }),
        "SELECT * FROM `t` WHERE `name` REGEXP BINARY '^a'"
    );
    assert_eq!(
        where_sql(mysql(), q! { "name__iregex" => "^a" }),
        "SELECT * FROM `t` WHERE `name` REGEXP '^a'"
    );
    assert_eq!(
        where_sql(pgsql(), q! { "name__iregex" => "^a" }),
        "SELECT * FROM \"t\" WHERE \"name\" ~* '^a'"
    );
    assert_eq!(
        where_sql(sqlite(), q! { "name__regex" => "^a" }),
        "SELECT * FROM `t` WHERE `name` REGEXP '^a'"
    );
    assert_eq!(
        where_sql(sqlite(), q! { "name__iregex" => "^a" }),
        "SELECT * FROM `t` WHERE `name` REGEXP '(?i)^a'"
    );
}

#[test]
fn date_part_lookups_per_dialect() {
    assert_eq!(
        where_sql(mysql(), q! { "created__year" => 2024, "created__week_day" => 2 }),
        "SELECT * FROM `t` WHERE YEAR(`created`)=2024 AND DAYOFWEEK(`created`)=2"
    );
    assert_eq!(
        where_sql(pgsql(), q! { "created__month" => 5 }),
        "SELECT * FROM \"t\" WHERE EXTRACT(MONTH FROM \"created\")=5"
    );
    assert_eq!(
        where_sql(sqlite(), q! { "created__day" => 7 }),
        "SELECT * FROM `t` WHERE CAST(strftime('%d', `created`) AS INTEGER)=7"
    );
    assert_eq!(
        where_sql(sqlite(), q! { "created__week_day" => 1 }),
        "SELECT * FROM `t` WHERE CAST(strftime('%w', `created`) AS INTEGER)+1=1"
    );
}

#[test]
fn custom_lookup_registration() {
    fn soundex(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
        let operand = ctx.operand(value)?;
        Ok(format!("SOUNDEX({field})=SOUNDEX({operand})"))
    }

    let adapter = Arc::new(MysqlAdapter::new().with_lookup("sounds", soundex));
    let sql = querykit_core::QueryBuilder::new(adapter)
        .from("t")
        .where_clause(q! { "name__sounds" => "rob" })
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM `t` WHERE SOUNDEX(`name`)=SOUNDEX('rob')");

    let err = mysql()
        .from("t")
        .where_clause(q! { "name__sounds" => "rob" })
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownLookup { .. }));
}

// Literals and dates

#[test]
fn string_escaping() {
    let mysql = MysqlAdapter::new();
    assert_eq!(mysql.quote_string("a\\'b"), "'a\\\\''b'");
    let sqlite = SqliteAdapter::new();
    assert_eq!(sqlite.quote_string("a\\'b"), "'a\\''b'");
}

#[test]
fn blob_literals() {
    let bytes = SqlValue::Blob(vec![0xde, 0xad]);
    assert_eq!(SqliteAdapter::new().quote_value(&bytes), "X'DEAD'");
    assert_eq!(
        querykit_core::PostgresAdapter::new().quote_value(&bytes),
        "'\\xdead'::bytea"
    );
}

#[test]
fn date_conversion() {
    let adapter = SqliteAdapter::new();
    assert_eq!(
        adapter.convert_to_date(DateInput::from("2024-03-05 10:11:12")).unwrap(),
        "2024-03-05"
    );
    assert_eq!(
        adapter
            .convert_to_date_time(DateInput::from(0_i64))
            .unwrap(),
        "1970-01-01 00:00:00"
    );
    let err = adapter
        .convert_to_date(DateInput::from("not a date"))
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidDate(_)));
}

// Joins

#[test]
fn full_join_support() {
    let err = mysql()
        .from("a")
        .join(JoinType::Full, "b", [("a.id", "b.id")])
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, QueryError::NotSupported { .. }));

    assert_eq!(
        pgsql()
            .from("a")
            .join(JoinType::Full, "b", [("a.id", "b.id")])
            .to_sql()
            .unwrap(),
        "SELECT * FROM \"a\" FULL JOIN \"b\" ON \"a\".\"id\"=\"b\".\"id\""
    );
}

#[test]
fn cross_join_takes_no_condition() {
    assert_eq!(
        sqlite()
            .from("a")
            .join(JoinType::Cross, "b", "")
            .to_sql()
            .unwrap(),
        "SELECT * FROM `a` CROSS JOIN `b`"
    );
    let err = sqlite()
        .from("a")
        .join(JoinType::Cross, "b", [("a.id", "b.id")])
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter(_)));
}

// DDL

#[test]
fn rename_table_per_dialect() {
    assert_eq!(
        mysql().rename_table("a", "b").to_sql().unwrap(),
        "RENAME TABLE `a` TO `b`"
    );
    assert_eq!(
        pgsql().rename_table("a", "b").to_sql().unwrap(),
        "ALTER TABLE \"a\" RENAME TO \"b\""
    );
    assert_eq!(
        sqlite().rename_table("a", "b").to_sql().unwrap(),
        "ALTER TABLE `a` RENAME TO `b`"
    );
}

#[test]
fn truncate_per_dialect() {
    assert_eq!(
        mysql().truncate_table("a").to_sql().unwrap(),
        "TRUNCATE TABLE `a`"
    );
    assert_eq!(sqlite().truncate_table("a").to_sql().unwrap(), "DELETE FROM `a`");
    assert_eq!(
        sqlite().truncate_table("a").kind(),
        QueryKind::TruncateTable
    );
}

#[test]
fn columns_with_abstract_types() {
    assert_eq!(
        mysql().add_column("user", "name", "string(64) NOT NULL").to_sql().unwrap(),
        "ALTER TABLE `user` ADD COLUMN `name` varchar(64) NOT NULL"
    );
    assert_eq!(
        pgsql().add_column("user", "score", "float").to_sql().unwrap(),
        "ALTER TABLE \"user\" ADD COLUMN \"score\" double precision"
    );
    assert_eq!(
        sqlite().drop_column("user", "name").to_sql().unwrap(),
        "ALTER TABLE `user` DROP COLUMN `name`"
    );
    assert_eq!(
        pgsql().alter_column("user", "score", "integer").to_sql().unwrap(),
        "ALTER TABLE \"user\" ALTER COLUMN \"score\" TYPE integer"
    );
    assert_eq!(
        mysql().alter_column("user", "score", "integer").to_sql().unwrap(),
        "ALTER TABLE `user` CHANGE `score` `score` int(11)"
    );
}

#[test]
fn create_table_with_pk_type() {
    let sql = pgsql()
        .create_table("user", [("id", "pk"), ("name", "string")], "")
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "CREATE TABLE \"user\" (\n\t\"id\" serial NOT NULL PRIMARY KEY,\n\t\"name\" varchar(255)\n)"
    );
}

#[test]
fn rename_column_without_driver() {
    assert_eq!(
        mysql().rename_column("user", "a", "b").to_sql().unwrap(),
        "ALTER TABLE `user` RENAME COLUMN `a` TO `b`"
    );
}

#[test]
fn rename_column_reads_definition_through_driver() {
    let driver = Arc::new(MockDriver::new("mysql"));
    driver.respond(
        "SHOW CREATE TABLE `user`",
        vec![Row::new().with("Table", "user").with(
            "Create Table",
            "CREATE TABLE `user` (\n  `id` int(11) NOT NULL,\n  `name` varchar(255) NOT NULL DEFAULT '',\n  PRIMARY KEY (`id`)\n)",
        )],
    );
    let adapter = Arc::new(MysqlAdapter::new().with_driver(driver));
    let sql = querykit_core::QueryBuilder::new(adapter)
        .rename_column("user", "name", "title")
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE `user` CHANGE `name` `title` varchar(255) NOT NULL DEFAULT ''"
    );
}

#[test]
fn keys_and_indexes() {
    assert_eq!(
        pgsql().add_primary_key("user", "pk_user", &["id"]).to_sql().unwrap(),
        "ALTER TABLE \"user\" ADD CONSTRAINT \"pk_user\" PRIMARY KEY (\"id\")"
    );
    assert_eq!(
        mysql().drop_primary_key("user", "pk_user").to_sql().unwrap(),
        "ALTER TABLE `user` DROP PRIMARY KEY"
    );
    let fk = AddForeignKeyOp::new("fk_post_user", "post", &["user_id"], "user", &["id"])
        .on_delete(ForeignKeyAction::Cascade);
    assert_eq!(
        pgsql().add_foreign_key(fk.clone()).to_sql().unwrap(),
        "ALTER TABLE \"post\" ADD CONSTRAINT \"fk_post_user\" FOREIGN KEY (\"user_id\") \
         REFERENCES \"user\" (\"id\") ON DELETE CASCADE"
    );
    assert_eq!(
        mysql().drop_foreign_key("post", "fk_post_user").to_sql().unwrap(),
        "ALTER TABLE `post` DROP FOREIGN KEY `fk_post_user`"
    );
    assert_eq!(
        sqlite()
            .create_index("user", "idx_email", &["email"], true)
            .to_sql()
            .unwrap(),
        "CREATE UNIQUE INDEX `idx_email` ON `user` (`email`)"
    );
    assert_eq!(
        mysql().drop_index("user", "idx_email").to_sql().unwrap(),
        "DROP INDEX `idx_email` ON `user`"
    );
    assert_eq!(
        pgsql().drop_index("user", "idx_email").to_sql().unwrap(),
        "DROP INDEX \"idx_email\""
    );
}

#[test]
fn sqlite_rejects_unsupported_alterations() {
    let fk = AddForeignKeyOp::new("fk", "post", &["user_id"], "user", &["id"]);
    for qb in [
        sqlite().alter_column("user", "a", "integer"),
        sqlite().add_primary_key("user", "pk", &["id"]),
        sqlite().drop_primary_key("user", "pk"),
        sqlite().add_foreign_key(fk),
        sqlite().drop_foreign_key("post", "fk"),
        sqlite().schema(DropTableOp {
            name: "user".into(),
            if_exists: false,
            cascade: true,
        }),
    ] {
        let err = qb.to_sql().unwrap_err();
        assert!(
            matches!(err, QueryError::NotSupported { ref dialect, .. } if dialect == "sqlite"),
            "unexpected {err:?}"
        );
    }
}

#[test]
fn drop_table_cascade() {
    let op = DropTableOp {
        name: "user".into(),
        if_exists: true,
        cascade: true,
    };
    assert_eq!(
        pgsql().schema(op).to_sql().unwrap(),
        "DROP TABLE IF EXISTS \"user\" CASCADE"
    );
}

#[test]
fn reset_sequence_per_dialect() {
    assert_eq!(
        pgsql().reset_sequence("user", "id", 10).to_sql().unwrap(),
        "SELECT SETVAL(pg_get_serial_sequence('user', 'id'), 10, false)"
    );
    assert_eq!(
        mysql().reset_sequence("user", "id", 10).to_sql().unwrap(),
        "ALTER TABLE `user` AUTO_INCREMENT=10"
    );
    assert_eq!(
        sqlite().reset_sequence("{{%user}}", "id", 10).to_sql().unwrap(),
        "UPDATE sqlite_sequence SET seq=9 WHERE name='user'"
    );
}

#[test]
fn check_integrity_per_dialect() {
    assert_eq!(
        mysql().check_integrity(false, None, None).to_sql().unwrap(),
        "SET FOREIGN_KEY_CHECKS = 0"
    );
    assert_eq!(
        sqlite().check_integrity(true, None, None).to_sql().unwrap(),
        "PRAGMA foreign_keys = ON"
    );
    assert_eq!(
        pgsql()
            .check_integrity(false, Some("public"), Some("user"))
            .to_sql()
            .unwrap(),
        "ALTER TABLE \"public\".\"user\" DISABLE TRIGGER ALL"
    );
    assert_eq!(
        pgsql().check_integrity(true, None, None).to_sql().unwrap(),
        "SET session_replication_role = 'origin'"
    );
}

#[test]
fn driver_quoting_takes_precedence() {
    #[derive(Debug)]
    struct Quoting;

    impl querykit_core::Driver for Quoting {
        fn name(&self) -> &str {
            "sqlite"
        }

        fn execute(&self, _sql: &str) -> Result<u64> {
            Ok(0)
        }

        fn query_all(&self, _sql: &str) -> Result<Vec<Row>> {
            Ok(Vec::new())
        }

        fn quote_string(&self, value: &str) -> Option<String> {
            Some(format!("<{value}>"))
        }
    }

    let adapter = SqliteAdapter::new().with_driver(Arc::new(Quoting));
    assert_eq!(adapter.quote_value(&SqlValue::from("x")), "<x>");
    assert_eq!(adapter.quote_value(&SqlValue::Int(1)), "1");
}
