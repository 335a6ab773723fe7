//! JOIN clauses.
//!
//! A join binds a target table to an alias (explicit, or `<table>_<n>` from a
//! per-query counter), builds its ON group from the foreign key plus any extra
//! conditions, and can feed filters, columns and GROUP BY terms back into the
//! owning query.

use super::Query;
use super::column::{ColumnOptions, render_column};
use crate::condition::{Comparison, Condition, Operator};
use crate::error::{SqlError, SqlResult};
use crate::filter::Filter;
use crate::ident::{ColumnRef, Key, Target, qualified_identifier, raw, write_identifier};
use crate::value::{Bindings, Term};
use std::fmt;
use std::str::FromStr;

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT OUTER JOIN",
            JoinType::Right => "RIGHT OUTER JOIN",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
        }
    }
}

impl FromStr for JoinType {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        [JoinType::Inner, JoinType::Left, JoinType::Right]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SqlError::InvalidJoinType(s.to_string()))
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<JoinType> for String {
    fn from(kind: JoinType) -> Self {
        kind.name().to_string()
    }
}

/// Which columns link the source table to the join target.
///
/// A bare name is the foreign key on the target, matched against the source's
/// `id`; a `(foreign, local)` tuple sets both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub foreign: String,
    pub local: String,
}

impl ForeignKey {
    pub fn new(foreign: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            foreign: foreign.into(),
            local: local.into(),
        }
    }
}

impl From<&str> for ForeignKey {
    fn from(foreign: &str) -> Self {
        ForeignKey::new(foreign, "id")
    }
}

impl From<String> for ForeignKey {
    fn from(foreign: String) -> Self {
        ForeignKey::new(foreign, "id")
    }
}

impl<F: Into<String>, L: Into<String>> From<(F, L)> for ForeignKey {
    fn from((foreign, local): (F, L)) -> Self {
        ForeignKey::new(foreign, local)
    }
}

/// Options for [`Query::join`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOptions {
    /// `inner`, `left` or `right`; inner when unset.
    pub kind: Option<String>,
    /// Explicit alias.
    pub name: Option<String>,
    /// Table (or alias) holding the local key; the base table when unset.
    pub source_table: Option<String>,
    /// Extra ON conditions, bare keys resolved against the alias.
    pub conditions: Filter,
    /// WHERE conditions, bare keys resolved against the alias.
    pub filter: Filter,
    /// Fields of the joined table to select as `<alias>_<field>`.
    pub columns: Vec<String>,
    /// Column of the joined table to add to GROUP BY.
    pub group_by: Option<String>,
}

impl JoinOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn source_table(mut self, table: impl Into<String>) -> Self {
        self.source_table = Some(table.into());
        self
    }

    pub fn conditions(mut self, conditions: Filter) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    /// Group by the joined table's `id`.
    pub fn group_by_id(self) -> Self {
        self.group_by("id")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    kind: JoinType,
    table: String,
    alias: String,
    on: Condition,
}

impl Join {
    pub(crate) fn alias(&self) -> &str {
        &self.alias
    }

    pub(crate) fn write_sql(
        &self,
        out: &mut String,
        bindings: &mut Bindings<'_>,
        database_name: Option<&str>,
    ) {
        out.push_str(self.kind.sql());
        out.push(' ');
        if let Some(database) = database_name {
            write_identifier(out, database);
            out.push('.');
        }
        write_identifier(out, &self.table);
        out.push_str(" AS ");
        write_identifier(out, &self.alias);
        out.push_str(" ON ");
        self.on.write_sql(out, bindings, true);
    }
}

impl Query {
    /// Join `table` to this query.
    ///
    /// The join type, alias and every condition are validated before anything
    /// is recorded, so a failed call leaves the query (including its alias
    /// counters) untouched.
    ///
    /// ```
    /// use sqlshape::{JoinOptions, Query};
    ///
    /// let mut q = Query::new("posts");
    /// q.join("users", ("id", "author_id"), JoinOptions::new().name("users").kind("left"))?;
    /// assert_eq!(
    ///     q.to_sql(),
    ///     "SELECT `posts`.* FROM `posts` \
    ///      LEFT OUTER JOIN `users` AS `users` ON (`posts`.`author_id` = `users`.`id`)"
    /// );
    /// # Ok::<(), sqlshape::SqlError>(())
    /// ```
    pub fn join(
        &mut self,
        table: impl Into<String>,
        foreign_key: impl Into<ForeignKey>,
        options: JoinOptions,
    ) -> SqlResult<&mut Self> {
        let table = table.into();
        let foreign_key = foreign_key.into();

        let kind = match options.kind.as_deref().map(str::parse::<JoinType>) {
            None => JoinType::default(),
            Some(Ok(kind)) => kind,
            Some(Err(err)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "sqlshape.sql", table = %table, error = %err, "rejected join");
                return Err(err);
            }
        };

        // Auto-aliases skip numbers already taken by explicitly named joins.
        let (alias, next_counter) = match &options.name {
            Some(name) => (name.clone(), None),
            None => {
                let mut n = self.alias_counters.get(&table).copied().unwrap_or(0);
                while self.alias_taken(&format!("{table}_{n}")) {
                    n += 1;
                }
                (format!("{table}_{n}"), Some(n + 1))
            }
        };
        if self.alias_taken(&alias) {
            return Err(SqlError::DuplicateAlias(alias));
        }

        let source = options.source_table.as_deref().unwrap_or(self.table.as_str());
        let mut on = vec![Condition::Compare(Comparison::new(
            Target::Column(ColumnRef::new(Some(source.to_string()), foreign_key.local.as_str())),
            Operator::Equal,
            Term::Raw(raw(qualified_identifier(Some(alias.as_str()), &foreign_key.foreign))),
        ))];
        on.extend(options.conditions.compile(&alias)?);
        let filter = options.filter.compile_group(&alias)?;

        if let Some(next) = next_counter {
            self.alias_counters.insert(table.clone(), next);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "sqlshape.sql",
            table = %table,
            alias = %alias,
            kind = %kind,
            "join alias assigned"
        );

        self.joins.push(Join {
            kind,
            table,
            alias: alias.clone(),
            on: Condition::And(on),
        });

        if let Some(filter) = filter {
            self.push_condition(filter);
        }

        for field in &options.columns {
            let key = Key::from((alias.as_str(), field.as_str()));
            let column_alias = format!("{alias}_{field}");
            let fragment = render_column(&key, &self.table, &ColumnOptions::new().alias(column_alias));
            self.columns.push(fragment);
        }

        if let Some(column) = &options.group_by {
            self.group_by((alias.as_str(), column.as_str()));
        }

        Ok(self)
    }

    fn alias_taken(&self, alias: &str) -> bool {
        alias == self.table || self.joins.iter().any(|join| join.alias() == alias)
    }

    /// Aliases of the joins added so far, in call order.
    pub fn join_aliases(&self) -> Vec<&str> {
        self.joins.iter().map(Join::alias).collect()
    }
}
