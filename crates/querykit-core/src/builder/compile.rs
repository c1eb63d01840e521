//! Statement rendering.
//!
//! Clauses render in textual order so bound parameters are collected in
//! placeholder order. Nested builders render through the outer adapter.

use crate::adapter::{Adapter, Dialect};
use crate::error::{QueryError, Result};
use crate::lookup::{LookupBuilder, LookupContext};
use crate::value::{FilterValue, Params, SqlValue};

use super::{
    Join, JoinOn, JoinType, OrderBy, OrderExpr, QueryBuilder, SelectColumn, SelectExpr, Source,
    Statement, TableSource,
};

impl QueryBuilder {
    /// Renders the statement for `adapter`, collecting values into `params`.
    pub(crate) fn compile(&self, adapter: &dyn Adapter, params: &mut Params) -> Result<String> {
        match &self.statement {
            Statement::Query => {
                let sql = self.compile_select(adapter, params)?;
                self.compile_unions(sql, adapter, params)
            }
            _ if !self.unions.is_empty() => Err(QueryError::IncompleteStatement(
                "UNION is only valid between SELECT statements".to_string(),
            )),
            Statement::Insert {
                table,
                columns,
                rows,
            } => compile_insert(adapter, params, table, columns, rows),
            Statement::Update { table, values } => {
                let mut sql = compile_update(adapter, params, table, values)?;
                self.push_where(&mut sql, adapter, params)?;
                Ok(sql)
            }
            Statement::Delete => {
                let table = match self.from.first() {
                    Some(TableSource {
                        source: Source::Table(name),
                        ..
                    }) => name,
                    _ => {
                        return Err(QueryError::IncompleteStatement(
                            "DELETE needs a table in FROM".to_string(),
                        ))
                    }
                };
                let mut sql = format!("DELETE FROM {}", adapter.quote_table_name(table));
                self.push_where(&mut sql, adapter, params)?;
                Ok(sql)
            }
            Statement::Schema(op) => adapter.generate_sql(op),
        }
    }

    fn compile_select(&self, adapter: &dyn Adapter, params: &mut Params) -> Result<String> {
        let mut sql = String::from(if self.distinct {
            "SELECT DISTINCT "
        } else {
            "SELECT "
        });

        if self.select.is_empty() {
            sql.push('*');
        } else {
            let mut columns = Vec::with_capacity(self.select.len());
            for column in &self.select {
                columns.push(compile_select_column(column, adapter, params)?);
            }
            sql.push_str(&columns.join(", "));
        }

        if !self.from.is_empty() {
            let mut sources = Vec::with_capacity(self.from.len());
            for entry in &self.from {
                sources.push(compile_source(
                    &entry.source,
                    entry.alias.as_deref(),
                    adapter,
                    params,
                )?);
            }
            sql.push_str(" FROM ");
            sql.push_str(&sources.join(", "));
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&compile_join(join, adapter, params)?);
        }

        self.push_where(&mut sql, adapter, params)?;

        if !self.group_by.is_empty() {
            let columns: Vec<String> = self
                .group_by
                .iter()
                .map(|column| adapter.quote_column_name(column))
                .collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&columns.join(", "));
        }

        let having = LookupBuilder::new(adapter).compile_clause(&self.havings, params)?;
        if !having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&having);
        }

        if !self.order_by.is_empty() {
            let entries: Vec<String> = self
                .order_by
                .iter()
                .map(|order| compile_order(order, adapter))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&entries.join(", "));
        }

        let paging = adapter.limit_offset(self.limit, self.offset);
        if !paging.is_empty() {
            sql.push(' ');
            sql.push_str(&paging);
        }
        Ok(sql)
    }

    fn compile_unions(
        &self,
        sql: String,
        adapter: &dyn Adapter,
        params: &mut Params,
    ) -> Result<String> {
        if self.unions.is_empty() {
            return Ok(sql);
        }
        let mut compound = adapter.union_operand(&sql, self.has_ordering_or_paging());
        for (other, all) in &self.unions {
            let other_sql = other.compile(adapter, params)?;
            let nested = other.has_ordering_or_paging() || !other.unions.is_empty();
            compound.push_str(if *all { " UNION ALL " } else { " UNION " });
            compound.push_str(&adapter.union_operand(&other_sql, nested));
        }
        Ok(compound)
    }

    fn has_ordering_or_paging(&self) -> bool {
        !self.order_by.is_empty() || self.limit.is_some() || self.offset.is_some()
    }

    fn push_where(&self, sql: &mut String, adapter: &dyn Adapter, params: &mut Params) -> Result<()> {
        let condition = LookupBuilder::new(adapter).compile_clause(&self.wheres, params)?;
        if !condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }
        Ok(())
    }
}

fn compile_select_column(
    column: &SelectColumn,
    adapter: &dyn Adapter,
    params: &mut Params,
) -> Result<String> {
    let (expr, alias) = match &column.expr {
        SelectExpr::Column(name) => (adapter.quote_column_name(name), column.alias.as_deref()),
        SelectExpr::Aggregation(aggregation) => (
            aggregation.expression_sql(adapter),
            column.alias.as_deref().or(aggregation.alias.as_deref()),
        ),
        SelectExpr::Query(query) => (
            format!("({})", query.compile(adapter, params)?),
            column.alias.as_deref(),
        ),
        SelectExpr::RawQuery(sql) => (
            format!("({})", adapter.quote_sql(sql)),
            column.alias.as_deref(),
        ),
    };
    Ok(match alias {
        Some(alias) => format!("{expr} AS {}", adapter.quote_column_name(alias)),
        None => expr,
    })
}

fn compile_source(
    source: &Source,
    alias: Option<&str>,
    adapter: &dyn Adapter,
    params: &mut Params,
) -> Result<String> {
    let sql = match source {
        Source::Table(name) => adapter.quote_table_name(name),
        Source::Query(query) => format!("({})", query.compile(adapter, params)?),
        Source::Raw(sql) => format!("({})", adapter.quote_sql(sql)),
    };
    Ok(match alias {
        Some(alias) => format!("{sql} AS {}", adapter.quote_table_name(alias)),
        None => sql,
    })
}

fn compile_join(join: &Join, adapter: &dyn Adapter, params: &mut Params) -> Result<String> {
    if join.kind == JoinType::Full && adapter.dialect() == Dialect::MySql {
        return Err(QueryError::not_supported(adapter.name(), "FULL JOIN"));
    }
    if join.kind == JoinType::Cross && !join.on.is_empty() {
        return Err(QueryError::InvalidFilter(
            "CROSS JOIN takes no ON condition".to_string(),
        ));
    }
    let target = compile_source(&join.target, join.alias.as_deref(), adapter, params)?;
    let condition = match &join.on {
        JoinOn::None => String::new(),
        JoinOn::Columns(pairs) => pairs
            .iter()
            .map(|(left, right)| {
                format!(
                    "{}={}",
                    adapter.quote_column_name(left),
                    adapter.quote_column_name(right)
                )
            })
            .collect::<Vec<_>>()
            .join(" AND "),
        JoinOn::Raw(sql) => adapter.quote_sql(sql.trim()),
    };
    if condition.is_empty() {
        Ok(format!("{} {target}", join.kind))
    } else {
        Ok(format!("{} {target} ON {condition}", join.kind))
    }
}

fn compile_order(order: &OrderBy, adapter: &dyn Adapter) -> String {
    let mut sql = match &order.expr {
        OrderExpr::Column(column) => format!(
            "{} {}",
            adapter.quote_column_name(column),
            order.direction.as_sql()
        ),
        OrderExpr::Random => adapter.random_order().to_string(),
    };
    if let Some(modifier) = &order.modifier {
        sql.push(' ');
        sql.push_str(modifier);
    }
    sql
}

fn compile_insert(
    adapter: &dyn Adapter,
    params: &mut Params,
    table: &str,
    columns: &[String],
    rows: &[Vec<SqlValue>],
) -> Result<String> {
    if columns.is_empty() || rows.is_empty() {
        return Err(QueryError::IncompleteStatement(format!(
            "INSERT INTO {table} needs columns and at least one row"
        )));
    }
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() != columns.len() {
            return Err(QueryError::IncompleteStatement(format!(
                "INSERT INTO {table} has {} columns but a row of {} values",
                columns.len(),
                row.len()
            )));
        }
        let values: Vec<String> = row.iter().map(|v| params.render(adapter, v)).collect();
        tuples.push(format!("({})", values.join(", ")));
    }
    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        adapter.quote_table_name(table),
        adapter.column_list(columns),
        tuples.join(", ")
    ))
}

fn compile_update(
    adapter: &dyn Adapter,
    params: &mut Params,
    table: &str,
    values: &[(String, FilterValue)],
) -> Result<String> {
    if values.is_empty() {
        return Err(QueryError::IncompleteStatement(format!(
            "UPDATE {table} has nothing to set"
        )));
    }
    let mut assignments = Vec::with_capacity(values.len());
    for (column, value) in values {
        let rhs = match value {
            FilterValue::Value(v) => params.render(adapter, v),
            FilterValue::Raw(sql) => adapter.quote_sql(sql),
            FilterValue::Query(_) => LookupContext::new(adapter, params).operand(value)?,
            FilterValue::List(_) => {
                return Err(QueryError::InvalidFilter(format!(
                    "cannot assign a list to column '{column}'"
                )))
            }
        };
        assignments.push(format!("{}={rhs}", adapter.quote_column_name(column)));
    }
    Ok(format!(
        "UPDATE {} SET {}",
        adapter.quote_table_name(table),
        assignments.join(", ")
    ))
}
