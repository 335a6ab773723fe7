//! SELECT query assembly.
//!
//! A [`Query`] accumulates columns, joins, filters, grouping and ordering, and
//! renders them on demand:
//!
//! ```text
//! SELECT [DISTINCT] <columns> FROM <table> <joins> WHERE <filters>
//!     GROUP BY <...> ORDER BY <...> LIMIT <n> OFFSET <m>
//! ```
//!
//! Empty sections are omitted. Rendering never mutates the query; every call
//! produces a fresh parameter list in placeholder order.
//!
//! # Example
//! ```
//! use sqlshape::{Filter, JoinOptions, Query};
//!
//! let mut q = Query::new("posts");
//! q.join("comments", "post_id", JoinOptions::new())?
//!     .filter(Filter::new().with("title", "Hello"))?;
//!
//! let built = q.build();
//! assert_eq!(
//!     built.sql(),
//!     "SELECT `posts`.* FROM `posts` \
//!      INNER JOIN `comments` AS `comments_0` ON (`posts`.`id` = `comments_0`.`post_id`) \
//!      WHERE (`posts`.`title` = ?)"
//! );
//! assert_eq!(built.params().len(), 1);
//! # Ok::<(), sqlshape::SqlError>(())
//! ```

mod column;
mod join;

pub use column::ColumnOptions;
pub use join::{ForeignKey, JoinOptions, JoinType};

use crate::condition::{Condition, write_group};
use crate::error::{SqlError, SqlResult};
use crate::filter::Filter;
use crate::ident::{Key, Target, write_identifier, write_qualified};
use crate::value::{Bindings, RenderMode, Value, ValueFormatter};
use join::Join;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Construction-time configuration for a [`Query`].
///
/// By default queries are prepared (`?` placeholders plus a parameter list).
#[derive(Clone)]
pub struct QueryOptions {
    /// Bind values as placeholders. When `false`, a value formatter is required.
    pub prepared: bool,
    /// Literal formatter used when `prepared` is `false`.
    pub value_formatter: Option<ValueFormatter>,
    /// Database that qualifies join target tables.
    pub database_name: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            prepared: true,
            value_formatter: None,
            database_name: None,
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("prepared", &self.prepared)
            .field("value_formatter", &self.value_formatter.as_ref().map(|_| "<formatter>"))
            .field("database_name", &self.database_name)
            .finish()
    }
}

impl QueryOptions {
    /// Create options with defaults (prepared, no database name).
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to inline rendering.
    ///
    /// A formatter must also be set or [`Query::with_options`] fails.
    pub fn inline(mut self) -> Self {
        self.prepared = false;
        self
    }

    /// Set the literal formatter used for inline rendering.
    ///
    /// The formatter escapes a value's text; the compiler adds the quotes.
    pub fn with_value_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.value_formatter = Some(Arc::new(formatter));
        self
    }

    /// Qualify join target tables with a database name.
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl FromStr for OrderDirection {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(OrderDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(OrderDirection::Desc)
        } else {
            Err(SqlError::InvalidOrderDirection(s.to_string()))
        }
    }
}

impl AsRef<str> for OrderDirection {
    fn as_ref(&self) -> &str {
        self.sql()
    }
}

/// Rendered SQL and its parameters.
///
/// In inline mode `params` is always empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// SELECT query builder.
#[derive(Debug, Clone)]
pub struct Query {
    /// Base table
    table: String,
    mode: RenderMode,
    database_name: Option<String>,
    /// Rendered SELECT-list fragments
    columns: Vec<String>,
    joins: Vec<Join>,
    /// Root WHERE group (AND)
    where_group: Vec<Condition>,
    /// Open OR scopes, innermost last
    or_scopes: Vec<Vec<Condition>>,
    group_by: Vec<Target>,
    order_by: Vec<(Target, OrderDirection)>,
    limit: Option<u64>,
    offset: Option<u64>,
    distinct: bool,
    /// Next auto-alias number per join target table
    alias_counters: HashMap<String, usize>,
}

impl Query {
    /// Create a prepared-mode query on `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_mode(table.into(), RenderMode::Prepared, None)
    }

    /// Create an inline-mode query on `table` that renders values with `formatter`.
    pub fn inline<F>(table: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        Self::with_mode(table.into(), RenderMode::Inline(Arc::new(formatter)), None)
    }

    /// Create a query from explicit options.
    ///
    /// Fails with [`SqlError::EscapeBlockMissing`] when inline rendering is
    /// requested without a formatter.
    pub fn with_options(table: impl Into<String>, options: QueryOptions) -> SqlResult<Self> {
        let mode = if options.prepared {
            RenderMode::Prepared
        } else {
            match options.value_formatter {
                Some(formatter) => RenderMode::Inline(formatter),
                None => return Err(SqlError::EscapeBlockMissing),
            }
        };
        Ok(Self::with_mode(table.into(), mode, options.database_name))
    }

    fn with_mode(table: String, mode: RenderMode, database_name: Option<String>) -> Self {
        Self {
            table,
            mode,
            database_name,
            columns: Vec::new(),
            joins: Vec::new(),
            where_group: Vec::new(),
            or_scopes: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            alias_counters: HashMap::new(),
        }
    }

    /// Base table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn mode(&self) -> &RenderMode {
        &self.mode
    }

    // ==================== Filters ====================

    /// Add a filter; its comparisons are ANDed together as one parenthesized unit.
    ///
    /// Inside [`Query::or`] the unit joins the OR group instead of the WHERE clause.
    /// An invalid operator rejects the whole filter and leaves the query unchanged.
    pub fn filter(&mut self, filter: Filter) -> SqlResult<&mut Self> {
        let group = match filter.compile_group(&self.table) {
            Ok(group) => group,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "sqlshape.sql", table = %self.table, error = %err, "rejected filter");
                return Err(err);
            }
        };
        if let Some(group) = group {
            self.push_condition(group);
        }
        Ok(self)
    }

    /// Run `body` with filters redirected into a new OR group.
    ///
    /// The group is appended to the enclosing WHERE clause (or enclosing OR group)
    /// when `body` returns `Ok`. On error the query is restored to its state
    /// before the call (joins, columns and alias counters included) and the
    /// error is returned.
    ///
    /// ```
    /// use sqlshape::{Filter, Query};
    ///
    /// let mut q = Query::new("posts");
    /// q.or(|q| {
    ///     q.filter(Filter::new().with("title", "Hello"))?;
    ///     q.filter(Filter::new().with("title", "World"))?;
    ///     Ok(())
    /// })?;
    /// assert_eq!(
    ///     q.to_sql(),
    ///     "SELECT `posts`.* FROM `posts` WHERE ((`posts`.`title` = ?) OR (`posts`.`title` = ?))"
    /// );
    /// # Ok::<(), sqlshape::SqlError>(())
    /// ```
    pub fn or<F>(&mut self, body: F) -> SqlResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> SqlResult<()>,
    {
        let checkpoint = self.clone();
        self.or_scopes.push(Vec::new());
        if let Err(err) = body(self) {
            *self = checkpoint;
            return Err(err);
        }
        let children = self.or_scopes.pop().unwrap_or_default();
        if !children.is_empty() {
            self.push_condition(Condition::Or(children));
        }
        Ok(self)
    }

    fn push_condition(&mut self, condition: Condition) {
        match self.or_scopes.last_mut() {
            Some(scope) => scope.push(condition),
            None => self.where_group.push(condition),
        }
    }

    // ==================== Grouping, ordering & pagination ====================

    /// Add a GROUP BY term; bare columns resolve against the base table.
    pub fn group_by(&mut self, key: impl Into<Key>) -> &mut Self {
        let target = key.into().resolve(&self.table);
        self.group_by.push(target);
        self
    }

    /// Add an ORDER BY term. `direction` is `ASC` or `DESC` (any case).
    pub fn order_by(&mut self, key: impl Into<Key>, direction: impl AsRef<str>) -> SqlResult<&mut Self> {
        let direction = direction.as_ref().parse::<OrderDirection>()?;
        let target = key.into().resolve(&self.table);
        self.order_by.push((target, direction));
        Ok(self)
    }

    /// Remove all ORDER BY terms.
    pub fn reset_order(&mut self) -> &mut Self {
        self.order_by.clear();
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self
    }

    // ==================== SQL build ====================

    /// Render the query.
    pub fn build(&self) -> BuiltQuery {
        let mut bindings = Bindings::new(&self.mode);
        let mut sql = String::from("SELECT ");

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.columns.is_empty() {
            write_qualified(&mut sql, Some(self.table.as_str()), "*");
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        sql.push_str(" FROM ");
        write_identifier(&mut sql, &self.table);

        for join in &self.joins {
            sql.push(' ');
            join.write_sql(&mut sql, &mut bindings, self.database_name.as_deref());
        }

        if !self.where_group.iter().all(Condition::is_empty) {
            sql.push_str(" WHERE ");
            write_group(&mut sql, &mut bindings, &self.where_group, " AND ", false);
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            for (i, target) in self.group_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                target.write_sql(&mut sql);
            }
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, (target, direction)) in self.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                target.write_sql(&mut sql);
                sql.push(' ');
                sql.push_str(direction.sql());
            }
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let params = bindings.into_params();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlshape.sql",
            mode = ?self.mode,
            param_count = params.len(),
            sql = %sql,
            "built query"
        );
        BuiltQuery { sql, params }
    }

    /// Rendered SQL text.
    pub fn to_sql(&self) -> String {
        self.build().sql
    }

    /// Bound parameters in placeholder order (empty in inline mode).
    pub fn params(&self) -> Vec<Value> {
        self.build().params
    }
}
