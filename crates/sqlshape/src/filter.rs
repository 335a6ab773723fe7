//! Declarative filter descriptions.
//!
//! A [`Filter`] is an ordered list of `key => operand` entries. Each operand is
//! classified once into `(operator, term)` pairs:
//!
//! | operand | comparisons |
//! |---|---|
//! | `NULL` | `equal NULL` (renders `IS NULL`) |
//! | list | `in list` |
//! | [`OpMap`] | one per entry, in insertion order |
//! | scalar or raw | `equal value` |
//!
//! # Example
//! ```
//! use sqlshape::{Filter, OpMap, Query};
//!
//! let mut q = Query::new("posts");
//! q.filter(Filter::new().with("views", OpMap::new().op("greater_than", 10).op("less_than", 100)))?;
//! assert_eq!(
//!     q.to_sql(),
//!     "SELECT `posts`.* FROM `posts` WHERE (`posts`.`views` > 10 AND `posts`.`views` < 100)"
//! );
//! # Ok::<(), sqlshape::SqlError>(())
//! ```

use crate::condition::{Comparison, Condition, Operator};
use crate::error::{SqlError, SqlResult};
use crate::ident::Key;
use crate::value::{Term, Value};

/// Ordered `operator name => term` map.
///
/// Names are validated when the owning filter is compiled, so an unknown name
/// rejects the whole filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpMap {
    entries: Vec<(String, Term)>,
}

impl OpMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operator entry.
    pub fn op(mut self, name: impl Into<String>, term: impl Into<Term>) -> Self {
        self.push(name, term);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, term: impl Into<Term>) -> &mut Self {
        self.entries.push((name.into(), term.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The value side of a filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Term(Term),
    Ops(OpMap),
}

impl<T: Into<Term>> From<T> for Operand {
    fn from(term: T) -> Self {
        Operand::Term(term.into())
    }
}

impl From<OpMap> for Operand {
    fn from(ops: OpMap) -> Self {
        Operand::Ops(ops)
    }
}

impl Operand {
    /// Classify into `(operator, term)` pairs.
    pub fn comparisons(&self) -> SqlResult<Vec<(Operator, Term)>> {
        match self {
            Operand::Term(term @ Term::List(_)) => Ok(vec![(Operator::In, term.clone())]),
            Operand::Term(term) => Ok(vec![(Operator::Equal, term.clone())]),
            Operand::Ops(ops) => ops
                .entries
                .iter()
                .map(|(name, term)| Ok((name.parse::<Operator>()?, term.clone())))
                .collect(),
        }
    }

    /// Read an operand from JSON.
    ///
    /// Objects become operator maps; arrays become lists; everything else is a
    /// single term.
    pub fn from_json(value: serde_json::Value) -> SqlResult<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut ops = OpMap::new();
                for (name, term) in map {
                    ops.push(name, term_from_json(term)?);
                }
                Ok(Operand::Ops(ops))
            }
            other => Ok(Operand::Term(term_from_json(other)?)),
        }
    }
}

fn scalar_from_json(value: serde_json::Value) -> SqlResult<Value> {
    match value {
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            // Integers past i64 would only survive as lossy floats.
            None if n.is_u64() => Err(SqlError::invalid_value(format!(
                "integer {n} out of range"
            ))),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| SqlError::invalid_value(format!("unrepresentable number {n}"))),
        },
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        other => Err(SqlError::invalid_value(format!(
            "expected a scalar, got {other}"
        ))),
    }
}

fn term_from_json(value: serde_json::Value) -> SqlResult<Term> {
    match value {
        serde_json::Value::Null => Ok(Term::Null),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(scalar_from_json)
            .collect::<SqlResult<Vec<_>>>()
            .map(Term::List),
        other => scalar_from_json(other).map(Term::Value),
    }
}

/// Ordered `key => operand` filter description.
///
/// ```
/// use sqlshape::{Filter, raw};
///
/// let filter = Filter::new()
///     .with("title", "Hello")
///     .with(("comments", "author"), None::<&str>)
///     .with(raw("LENGTH(body)"), 0);
/// assert_eq!(filter.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(Key, Operand)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder form).
    pub fn with(mut self, key: impl Into<Key>, operand: impl Into<Operand>) -> Self {
        self.push(key, operand);
        self
    }

    /// Add an entry.
    pub fn push(&mut self, key: impl Into<Key>, operand: impl Into<Operand>) -> &mut Self {
        self.entries.push((key.into(), operand.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a filter from a JSON object whose keys are column names.
    ///
    /// ```
    /// use sqlshape::Filter;
    /// use serde_json::json;
    ///
    /// let filter = Filter::from_json(json!({
    ///     "title": "Hello",
    ///     "views": { "greater_than": 10 },
    ///     "author_id": [1, 2, 3],
    /// }))?;
    /// assert_eq!(filter.len(), 3);
    /// # Ok::<(), sqlshape::SqlError>(())
    /// ```
    pub fn from_json(value: serde_json::Value) -> SqlResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(SqlError::invalid_value("filter must be a JSON object"));
        };
        let mut filter = Filter::new();
        for (column, operand) in map {
            filter.push(column, Operand::from_json(operand)?);
        }
        Ok(filter)
    }

    /// Compile into comparisons, qualifying bare columns with `default_table`.
    ///
    /// Fails without side effects if any operator name is unknown.
    pub fn compile(&self, default_table: &str) -> SqlResult<Vec<Condition>> {
        let mut out = Vec::with_capacity(self.entries.len());
        for (key, operand) in &self.entries {
            let target = key.resolve(default_table);
            for (op, term) in operand.comparisons()? {
                out.push(Condition::Compare(Comparison::new(target.clone(), op, term)));
            }
        }
        Ok(out)
    }

    /// Compile into a single AND group, or `None` when nothing was produced.
    pub fn compile_group(&self, default_table: &str) -> SqlResult<Option<Condition>> {
        let children = self.compile(default_table)?;
        Ok((!children.is_empty()).then(|| Condition::And(children)))
    }
}

impl<K: Into<Key>, O: Into<Operand>> FromIterator<(K, O)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, O)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (key, operand) in iter {
            filter.push(key, operand);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::raw;
    use crate::value::RenderMode;
    use serde_json::json;

    fn render(filter: &Filter) -> (String, Vec<Value>) {
        let group = filter.compile_group("posts").unwrap().unwrap();
        group.build(&RenderMode::Prepared)
    }

    #[test]
    fn scalar_null_and_list() {
        let filter = Filter::new()
            .with("title", "Hello")
            .with("deleted_at", Term::Null)
            .with("author_id", vec![1i64, 2, 3]);
        let (sql, params) = render(&filter);
        assert_eq!(
            sql,
            "`posts`.`title` = ? AND `posts`.`deleted_at` IS NULL AND `posts`.`author_id` IN (1, 2, 3)"
        );
        assert_eq!(params, vec![Value::Text("Hello".into())]);
    }

    #[test]
    fn op_map_keeps_insertion_order() {
        let filter = Filter::new().with(
            "views",
            OpMap::new().op("less_than", 100i64).op("greater_than", 10i64),
        );
        let (sql, _) = render(&filter);
        assert_eq!(sql, "`posts`.`views` < 100 AND `posts`.`views` > 10");
    }

    #[test]
    fn typed_operator_names() {
        let filter = Filter::new().with("title", OpMap::new().op(Operator::NotLike, "%x"));
        let (sql, _) = render(&filter);
        assert_eq!(sql, "`posts`.`title` NOT LIKE ?");
    }

    #[test]
    fn unknown_operator_rejects_whole_filter() {
        let filter = Filter::new()
            .with("title", "ok")
            .with("views", OpMap::new().op("greater_than", 1i64).op("between", 2i64));
        assert_eq!(
            filter.compile("posts").unwrap_err(),
            SqlError::InvalidOperator("between".into())
        );
    }

    #[test]
    fn raw_key_and_value() {
        let filter = Filter::new().with(raw("a.x"), raw("b.y"));
        let (sql, params) = render(&filter);
        assert_eq!(sql, "a.x = b.y");
        assert!(params.is_empty());
    }

    #[test]
    fn empty_filter_compiles_to_nothing() {
        assert!(Filter::new().compile_group("posts").unwrap().is_none());
    }

    #[test]
    fn from_iterator() {
        let filter: Filter = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        let (sql, _) = render(&filter);
        assert_eq!(sql, "`posts`.`a` = 1 AND `posts`.`b` = 2");
    }

    #[test]
    fn json_filter() {
        let filter = Filter::from_json(json!({
            "title": "Hello",
            "views": { "greater_than": 10, "less_than": 100.5 },
            "tags": ["a", "b"],
            "deleted_at": null,
        }))
        .unwrap();
        let (sql, params) = render(&filter);
        assert_eq!(
            sql,
            "`posts`.`title` = ? AND `posts`.`views` > 10 AND `posts`.`views` < 100.5 \
             AND `posts`.`tags` IN (?, ?) AND `posts`.`deleted_at` IS NULL"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn json_rejects_integers_past_i64() {
        let err = Filter::from_json(json!({ "id": 18446744073709551615u64 })).unwrap_err();
        assert_eq!(
            err,
            SqlError::InvalidValue("integer 18446744073709551615 out of range".into())
        );

        let filter = Filter::from_json(json!({ "id": i64::MAX, "ratio": 0.5 })).unwrap();
        let (sql, _) = render(&filter);
        assert_eq!(
            sql,
            "`posts`.`id` = 9223372036854775807 AND `posts`.`ratio` = 0.5"
        );
    }

    #[test]
    fn json_rejects_nested_values() {
        assert!(Filter::from_json(json!(["title"])).is_err());
        assert!(Filter::from_json(json!({ "a": [[1]] })).is_err());
        assert!(Filter::from_json(json!({ "a": { "equal": { "x": 1 } } })).is_err());
        assert!(Filter::from_json(json!({ "a": [null] })).is_err());
    }
}
