//! Compiles condition trees into predicate SQL.

use tracing::trace;

use crate::adapter::Adapter;
use crate::error::{QueryError, Result};
use crate::q::{Lookup, Q};
use crate::value::Params;

use super::{LookupContext, DEFAULT_LOOKUP};

/// Walks a [`Q`] tree and renders it through an adapter's lookup registry.
///
/// Combinators are parenthesized only when nested under another combinator
/// and holding more than one rendered child; a combinator with a single
/// child renders that child as if it stood in its place. Children keep their
/// insertion order.
pub struct LookupBuilder<'a> {
    adapter: &'a dyn Adapter,
}

impl<'a> LookupBuilder<'a> {
    /// Creates a builder for the given adapter.
    #[must_use]
    pub const fn new(adapter: &'a dyn Adapter) -> Self {
        Self { adapter }
    }

    /// Compiles a tree with inline literals.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownLookup`] for unregistered operators and
    /// whatever the lookups themselves reject.
    pub fn build(&self, tree: &Q) -> Result<String> {
        let mut params = Params::inline();
        self.compile(tree, &mut params)
    }

    /// Compiles a tree, routing literals through `params`.
    ///
    /// # Errors
    ///
    /// Same as [`LookupBuilder::build`].
    pub fn compile(&self, tree: &Q, params: &mut Params) -> Result<String> {
        self.render(tree, false, params)
    }

    /// Compiles a clause made of successive condition trees.
    ///
    /// The first non-empty tree renders bare, every later one in parentheses,
    /// all joined with `AND`.
    ///
    /// # Errors
    ///
    /// Same as [`LookupBuilder::build`].
    pub fn compile_clause(&self, trees: &[Q], params: &mut Params) -> Result<String> {
        let mut parts: Vec<String> = Vec::with_capacity(trees.len());
        for tree in trees {
            let sql = self.render(tree, false, params)?;
            if sql.is_empty() {
                continue;
            }
            if parts.is_empty() {
                parts.push(sql);
            } else {
                parts.push(format!("({sql})"));
            }
        }
        Ok(parts.join(" AND "))
    }

    fn render(&self, tree: &Q, nested: bool, params: &mut Params) -> Result<String> {
        match tree {
            Q::Lookup(lookup) => self.render_lookup(lookup, params),
            Q::Raw(sql) => {
                let sql = sql.trim();
                if sql.is_empty() {
                    return Ok(String::new());
                }
                let sql = self.adapter.quote_sql(sql);
                Ok(if nested { format!("({sql})") } else { sql })
            }
            Q::And(children) => self.render_group(children, " AND ", nested, params),
            Q::Or(children) => self.render_group(children, " OR ", nested, params),
            Q::Not(child) => {
                let inner = self.render(child, false, params)?;
                if inner.is_empty() {
                    Ok(inner)
                } else {
                    Ok(format!("NOT ({inner})"))
                }
            }
        }
    }

    fn render_group(
        &self,
        children: &[Q],
        glue: &str,
        nested: bool,
        params: &mut Params,
    ) -> Result<String> {
        let live: Vec<&Q> = children.iter().filter(|child| !child.is_empty()).collect();
        let child_nested = nested || live.len() > 1;
        let mut parts = Vec::with_capacity(live.len());
        for child in live {
            parts.push(self.render(child, child_nested, params)?);
        }
        let sql = parts.join(glue);
        if nested && parts.len() > 1 {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    fn render_lookup(&self, lookup: &Lookup, params: &mut Params) -> Result<String> {
        let operator = lookup.operator.as_deref().unwrap_or(DEFAULT_LOOKUP);
        let render = self
            .adapter
            .lookups()
            .get(operator)
            .ok_or_else(|| QueryError::UnknownLookup {
                field: lookup.field.clone(),
                lookup: operator.to_string(),
            })?;
        let field = self.adapter.quote_column_name(&lookup.field);
        trace!(field = %lookup.field, lookup = operator, "Resolving lookup");
        let mut ctx = LookupContext::new(self.adapter, params);
        render(&mut ctx, &field, &lookup.value)
    }
}
