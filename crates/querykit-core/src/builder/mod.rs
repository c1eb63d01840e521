//! The fluent statement builder.
//!
//! A [`QueryBuilder`] collects the parts of one statement and renders them
//! through its [`Adapter`]. Builders are plain values: cloning one forks the
//! whole statement, sub-queries included.
//!
//! ```
//! use std::sync::Arc;
//!
//! use querykit_core::adapter::SqliteAdapter;
//! use querykit_core::builder::{JoinType, QueryBuilder};
//! use querykit_core::q;
//!
//! let sql = QueryBuilder::new(Arc::new(SqliteAdapter::new()))
//!     .select("t.*")
//!     .from_as("comment", "t")
//!     .join_as(JoinType::Left, "user", [("t.user_id", "u.id")], "u")
//!     .where_clause(q! { "u.is_active" => true })
//!     .order_by(&["-t.id"])
//!     .limit(10)
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT `t`.* FROM `comment` AS `t` LEFT JOIN `user` AS `u` \
//!      ON `t`.`user_id`=`u`.`id` WHERE `u`.`is_active`=1 ORDER BY `t`.`id` DESC LIMIT 10"
//! );
//! ```

mod clause;
mod compile;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::trace;

pub use clause::{
    Direction, Join, JoinOn, JoinType, OrderBy, OrderExpr, QueryKind, SelectColumn, SelectExpr,
    Source, TableSource,
};

use crate::adapter::ddl::{
    AddColumnOp, AddForeignKeyOp, AddPrimaryKeyOp, AlterColumnOp, CheckIntegrityOp,
    CreateIndexOp, CreateTableOp, DdlOperation, DropColumnOp, DropForeignKeyOp, DropIndexOp,
    DropPrimaryKeyOp, DropTableOp, RenameColumnOp, RenameTableOp, ResetSequenceOp, TableBody,
    TruncateTableOp,
};
use crate::adapter::Adapter;
use crate::error::Result;
use crate::q::Q;
use crate::value::{FilterValue, Params, SqlValue, ToSqlValue};

static ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.+?)\s+as\s+([\w.\[\]`]+)$").expect("valid alias regex")
});

/// Statement-specific state.
#[derive(Debug, Clone)]
pub(crate) enum Statement {
    Query,
    Insert {
        table: String,
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    },
    Update {
        table: String,
        values: Vec<(String, FilterValue)>,
    },
    Delete,
    Schema(DdlOperation),
}

/// Builds one SQL statement for an adapter.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    adapter: Arc<dyn Adapter>,
    kind: QueryKind,
    statement: Statement,
    select: Vec<SelectColumn>,
    distinct: bool,
    from: Vec<TableSource>,
    joins: Vec<Join>,
    wheres: Vec<Q>,
    group_by: Vec<String>,
    havings: Vec<Q>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    unions: Vec<(Self, bool)>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter,
            kind: QueryKind::Uninitialized,
            statement: Statement::Query,
            select: Vec::new(),
            distinct: false,
            from: Vec::new(),
            joins: Vec::new(),
            wheres: Vec::new(),
            group_by: Vec::new(),
            havings: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            unions: Vec::new(),
        }
    }

    /// Returns the adapter.
    #[must_use]
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    /// Switches the adapter, keeping the statement.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Renders as `SELECT`.
    #[must_use]
    pub fn set_type_select(mut self) -> Self {
        self.kind = QueryKind::Select;
        self.statement = Statement::Query;
        self
    }

    /// Renders as `DELETE FROM <first source>`.
    #[must_use]
    pub fn set_type_delete(mut self) -> Self {
        self.kind = QueryKind::Delete;
        self.statement = Statement::Delete;
        self
    }

    // Select list

    /// Replaces the select list with a comma-separated list of expressions.
    ///
    /// Entries may carry an alias (`t.id AS foo`). Commas inside parentheses
    /// do not split.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select.clear();
        self.add_select(columns)
    }

    /// Appends comma-separated expressions to the select list.
    #[must_use]
    pub fn add_select(mut self, columns: &str) -> Self {
        for part in clause::split_select_list(columns) {
            let column = match ALIAS_RE.captures(&part) {
                Some(caps) => SelectColumn {
                    expr: SelectExpr::from(caps[1].trim()),
                    alias: Some(caps[2].to_string()),
                },
                None => SelectColumn {
                    expr: SelectExpr::from(part.as_str()),
                    alias: None,
                },
            };
            self.select.push(column);
        }
        self
    }

    /// Appends an expression to the select list.
    #[must_use]
    pub fn select_expr(mut self, expr: impl Into<SelectExpr>) -> Self {
        self.select.push(SelectColumn {
            expr: expr.into(),
            alias: None,
        });
        self
    }

    /// Appends an aliased expression: a column, an aggregate or a sub-query.
    #[must_use]
    pub fn select_as(mut self, expr: impl Into<SelectExpr>, alias: impl Into<String>) -> Self {
        self.select.push(SelectColumn {
            expr: expr.into(),
            alias: Some(alias.into()),
        });
        self
    }

    /// Adds `DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // Sources

    /// Replaces the FROM list with one table or sub-query.
    #[must_use]
    pub fn from(mut self, source: impl Into<Source>) -> Self {
        self.from.clear();
        self.add_from(source, None::<String>)
    }

    /// Replaces the FROM list with one aliased table or sub-query.
    #[must_use]
    pub fn from_as(mut self, source: impl Into<Source>, alias: impl Into<String>) -> Self {
        self.from.clear();
        self.add_from(source, Some(alias))
    }

    /// Appends a FROM entry.
    #[must_use]
    pub fn add_from(mut self, source: impl Into<Source>, alias: Option<impl Into<String>>) -> Self {
        self.from.push(TableSource {
            source: source.into(),
            alias: alias.map(Into::into),
        });
        self
    }

    /// Appends a join.
    #[must_use]
    pub fn join(self, kind: JoinType, target: impl Into<Source>, on: impl Into<JoinOn>) -> Self {
        self.push_join(kind, target.into(), on.into(), None)
    }

    /// Appends an aliased join.
    #[must_use]
    pub fn join_as(
        self,
        kind: JoinType,
        target: impl Into<Source>,
        on: impl Into<JoinOn>,
        alias: impl Into<String>,
    ) -> Self {
        self.push_join(kind, target.into(), on.into(), Some(alias.into()))
    }

    fn push_join(
        mut self,
        kind: JoinType,
        target: Source,
        on: JoinOn,
        alias: Option<String>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            target,
            on,
            alias,
        });
        self
    }

    // Conditions

    /// Replaces the WHERE condition.
    #[must_use]
    pub fn where_clause(mut self, condition: impl Into<Q>) -> Self {
        self.wheres = vec![condition.into()];
        self
    }

    /// ANDs a condition onto WHERE. It renders in parentheses unless it is
    /// the first one.
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<Q>) -> Self {
        self.wheres.push(condition.into());
        self
    }

    /// ANDs a negated condition onto WHERE.
    #[must_use]
    pub fn exclude(mut self, condition: impl Into<Q>) -> Self {
        self.wheres.push(condition.into().negate());
        self
    }

    /// Replaces the HAVING condition.
    #[must_use]
    pub fn having(mut self, condition: impl Into<Q>) -> Self {
        self.havings = vec![condition.into()];
        self
    }

    /// ANDs a condition onto HAVING.
    #[must_use]
    pub fn and_having(mut self, condition: impl Into<Q>) -> Self {
        self.havings.push(condition.into());
        self
    }

    // Grouping, ordering, paging

    /// Replaces the GROUP BY list.
    #[must_use]
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group_by = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Replaces the ORDER BY list. A leading `-` sorts descending.
    #[must_use]
    pub fn order_by(mut self, columns: &[&str]) -> Self {
        self.order_by = columns.iter().map(|c| OrderBy::parse(c)).collect();
        self
    }

    /// Replaces the ORDER BY list, appending `modifier` (e.g. `NULLS LAST`)
    /// to every entry.
    #[must_use]
    pub fn order_by_with(mut self, columns: &[&str], modifier: &str) -> Self {
        let modifier = Some(modifier.trim().to_string()).filter(|m| !m.is_empty());
        self.order_by = columns
            .iter()
            .map(|c| OrderBy {
                modifier: modifier.clone(),
                ..OrderBy::parse(c)
            })
            .collect();
        self
    }

    /// Orders by the dialect's random function.
    #[must_use]
    pub fn order_random(mut self) -> Self {
        self.order_by = vec![OrderBy {
            expr: OrderExpr::Random,
            direction: Direction::Asc,
            modifier: None,
        }];
        self
    }

    /// Sets LIMIT. Zero clears it.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self
    }

    /// Sets OFFSET. Zero clears it.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = if offset == 0 { None } else { Some(offset) };
        self
    }

    /// Appends `UNION [ALL] <other>`. Unions chain left to right.
    #[must_use]
    pub fn union(mut self, other: Self, all: bool) -> Self {
        self.unions.push((other, all));
        self
    }

    // Data changes

    /// Renders as `INSERT INTO table (columns) VALUES (...), (...)`.
    #[must_use]
    pub fn insert<R, V>(
        mut self,
        table: impl Into<String>,
        columns: &[&str],
        rows: impl IntoIterator<Item = R>,
    ) -> Self
    where
        R: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.kind = QueryKind::Insert;
        self.statement = Statement::Insert {
            table: table.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(ToSqlValue::to_sql_value).collect())
                .collect(),
        };
        self
    }

    /// Renders as `UPDATE table SET col=value, ...`, filtered by WHERE.
    ///
    /// Values may be literals, raw expressions ([`FilterValue::raw`]) or
    /// sub-queries.
    #[must_use]
    pub fn update<K, V>(
        mut self,
        table: impl Into<String>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<FilterValue>,
    {
        self.kind = QueryKind::Update;
        self.statement = Statement::Update {
            table: table.into(),
            values: values
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        };
        self
    }

    // Schema changes

    /// Renders a schema operation.
    #[must_use]
    pub fn schema(mut self, op: impl Into<DdlOperation>) -> Self {
        let op = op.into();
        self.kind = match &op {
            DdlOperation::CreateTable(_) => QueryKind::CreateTable,
            DdlOperation::DropTable(_) => QueryKind::DropTable,
            DdlOperation::TruncateTable(_) => QueryKind::TruncateTable,
            DdlOperation::CreateIndex(_) => QueryKind::CreateIndex,
            DdlOperation::DropIndex(_) => QueryKind::DropIndex,
            DdlOperation::ResetSequence(_) | DdlOperation::CheckIntegrity(_) => {
                QueryKind::Maintenance
            }
            DdlOperation::RenameTable(_)
            | DdlOperation::AddColumn(_)
            | DdlOperation::DropColumn(_)
            | DdlOperation::RenameColumn(_)
            | DdlOperation::AlterColumn(_)
            | DdlOperation::AddPrimaryKey(_)
            | DdlOperation::DropPrimaryKey(_)
            | DdlOperation::AddForeignKey(_)
            | DdlOperation::DropForeignKey(_) => QueryKind::AlterTable,
        };
        self.statement = Statement::Schema(op);
        self
    }

    /// `CREATE TABLE name (...) options`. `options` may be empty.
    #[must_use]
    pub fn create_table(
        self,
        name: impl Into<String>,
        body: impl Into<TableBody>,
        options: &str,
    ) -> Self {
        self.schema(CreateTableOp::new(name, body).options(options))
    }

    /// `CREATE TABLE IF NOT EXISTS name (...) options`.
    #[must_use]
    pub fn create_table_if_not_exists(
        self,
        name: impl Into<String>,
        body: impl Into<TableBody>,
        options: &str,
    ) -> Self {
        self.schema(CreateTableOp::new(name, body).if_not_exists().options(options))
    }

    /// `DROP TABLE name`.
    #[must_use]
    pub fn drop_table(self, name: impl Into<String>) -> Self {
        self.schema(DropTableOp {
            name: name.into(),
            if_exists: false,
            cascade: false,
        })
    }

    /// `DROP TABLE IF EXISTS name`.
    #[must_use]
    pub fn drop_table_if_exists(self, name: impl Into<String>) -> Self {
        self.schema(DropTableOp {
            name: name.into(),
            if_exists: true,
            cascade: false,
        })
    }

    /// Renames a table.
    #[must_use]
    pub fn rename_table(self, old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.schema(RenameTableOp {
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Empties a table.
    #[must_use]
    pub fn truncate_table(self, name: impl Into<String>) -> Self {
        self.schema(TruncateTableOp { name: name.into() })
    }

    /// Adds a column; `definition` may use abstract types such as `string`.
    #[must_use]
    pub fn add_column(
        self,
        table: impl Into<String>,
        column: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        self.schema(AddColumnOp {
            table: table.into(),
            column: column.into(),
            definition: definition.into(),
        })
    }

    /// Drops a column.
    #[must_use]
    pub fn drop_column(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.schema(DropColumnOp {
            table: table.into(),
            column: column.into(),
        })
    }

    /// Renames a column.
    #[must_use]
    pub fn rename_column(
        self,
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        self.schema(RenameColumnOp {
            table: table.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Changes a column's type.
    #[must_use]
    pub fn alter_column(
        self,
        table: impl Into<String>,
        column: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        self.schema(AlterColumnOp {
            table: table.into(),
            column: column.into(),
            definition: definition.into(),
        })
    }

    /// Adds a named primary key.
    #[must_use]
    pub fn add_primary_key(
        self,
        table: impl Into<String>,
        name: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        self.schema(AddPrimaryKeyOp {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        })
    }

    /// Drops a named primary key.
    #[must_use]
    pub fn drop_primary_key(self, table: impl Into<String>, name: impl Into<String>) -> Self {
        self.schema(DropPrimaryKeyOp {
            name: name.into(),
            table: table.into(),
        })
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn add_foreign_key(self, op: AddForeignKeyOp) -> Self {
        self.schema(op)
    }

    /// Drops a foreign key.
    #[must_use]
    pub fn drop_foreign_key(self, table: impl Into<String>, name: impl Into<String>) -> Self {
        self.schema(DropForeignKeyOp {
            name: name.into(),
            table: table.into(),
        })
    }

    /// Creates an index.
    #[must_use]
    pub fn create_index(
        self,
        table: impl Into<String>,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
    ) -> Self {
        self.schema(CreateIndexOp {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            unique,
        })
    }

    /// Drops an index.
    #[must_use]
    pub fn drop_index(self, table: impl Into<String>, name: impl Into<String>) -> Self {
        self.schema(DropIndexOp {
            name: name.into(),
            table: table.into(),
        })
    }

    /// Sets the next auto-increment value of `table.column`.
    #[must_use]
    pub fn reset_sequence(
        self,
        table: impl Into<String>,
        column: impl Into<String>,
        value: i64,
    ) -> Self {
        self.schema(ResetSequenceOp {
            table: table.into(),
            column: column.into(),
            value,
        })
    }

    /// Enables or disables foreign key enforcement.
    #[must_use]
    pub fn check_integrity(
        self,
        enable: bool,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Self {
        self.schema(CheckIntegrityOp {
            enable,
            schema: schema.map(str::to_string),
            table: table.map(str::to_string),
        })
    }

    // Rendering

    /// Renders the statement with inline literals.
    ///
    /// Rendering does not change the builder; repeated calls return the
    /// same text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::UnknownLookup`] for unregistered
    /// operators, [`crate::QueryError::NotSupported`] for features the
    /// dialect lacks and [`crate::QueryError::IncompleteStatement`] when
    /// required parts are missing.
    pub fn to_sql(&self) -> Result<String> {
        let mut params = Params::inline();
        let sql = self.compile(self.adapter.as_ref(), &mut params)?;
        trace!(dialect = %self.adapter.dialect(), sql = %sql, "Compiled statement");
        Ok(sql)
    }

    /// Renders the statement with placeholders and returns the bound values
    /// in placeholder order.
    ///
    /// # Errors
    ///
    /// Same as [`QueryBuilder::to_sql`].
    pub fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        let mut params = Params::bound();
        let sql = self.compile(self.adapter.as_ref(), &mut params)?;
        trace!(
            dialect = %self.adapter.dialect(),
            sql = %sql,
            params = params.values().len(),
            "Compiled statement"
        );
        Ok((sql, params.into_values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MysqlAdapter, PostgresAdapter, SqliteAdapter};
    use crate::q;

    fn sqlite() -> QueryBuilder {
        QueryBuilder::new(Arc::new(SqliteAdapter::new()))
    }

    #[test]
    fn test_uninitialized_is_bare_select() {
        let qb = sqlite();
        assert_eq!(qb.kind(), QueryKind::Uninitialized);
        assert_eq!(qb.to_sql().unwrap(), "SELECT *");
    }

    #[test]
    fn test_select_aliases() {
        let sql = sqlite()
            .select("t.id AS foo, t.user_id as bar")
            .from_as("comment", "t")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT `t`.`id` AS `foo`, `t`.`user_id` AS `bar` FROM `comment` AS `t`"
        );
    }

    #[test]
    fn test_to_sql_is_repeatable() {
        let qb = sqlite()
            .from("test")
            .where_clause(q! { "id__in" => [1, 2] })
            .order_by(&["-id"]);
        assert_eq!(qb.to_sql().unwrap(), qb.to_sql().unwrap());
    }

    #[test]
    fn test_build_binds_in_order() {
        let qb = QueryBuilder::new(Arc::new(PostgresAdapter::new()))
            .from("test")
            .where_clause(q! { "name" => "foo", "age__gte" => 18 })
            .limit(5);
        let (sql, params) = qb.build().unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"test\" WHERE \"name\"=$1 AND \"age\">=$2 LIMIT 5"
        );
        assert_eq!(params, vec![SqlValue::from("foo"), SqlValue::Int(18)]);
    }

    #[test]
    fn test_schema_kinds() {
        let qb = sqlite().drop_table("test");
        assert_eq!(qb.kind(), QueryKind::DropTable);
        let qb = qb.add_column("test", "name", "string");
        assert_eq!(qb.kind(), QueryKind::AlterTable);
        let qb = qb.check_integrity(true, None, None);
        assert_eq!(qb.kind(), QueryKind::Maintenance);
    }

    #[test]
    fn test_with_adapter_rerenders() {
        let qb = sqlite().select("a").from("test");
        let mysql = qb.clone().with_adapter(Arc::new(MysqlAdapter::new()));
        assert_eq!(qb.to_sql().unwrap(), "SELECT `a` FROM `test`");
        assert_eq!(mysql.to_sql().unwrap(), "SELECT `a` FROM `test`");
        let pg = qb.with_adapter(Arc::new(PostgresAdapter::new()));
        assert_eq!(pg.to_sql().unwrap(), "SELECT \"a\" FROM \"test\"");
    }
}
