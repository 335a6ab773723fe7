//! Identifier quoting and column references.
//!
//! All identifiers (tables, aliases, columns) are wrapped in backticks, with any
//! embedded backtick doubled. [`RawSql`] is the escape hatch: its text is written
//! verbatim and is never quoted or parameterized.
//!
//! # Example
//! ```
//! use sqlshape::ident::{escape_identifier, qualified_identifier};
//!
//! assert_eq!(escape_identifier("column`name"), "`column``name`");
//! assert_eq!(qualified_identifier(Some("posts"), "title"), "`posts`.`title`");
//! ```

use std::fmt;

const QUOTE: char = '`';

/// Quote an identifier, doubling any embedded quote character.
pub fn escape_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_identifier(&mut out, name);
    out
}

/// Quote `column`, qualified with `table` when present.
pub fn qualified_identifier(table: Option<&str>, column: &str) -> String {
    let mut out = String::new();
    write_qualified(&mut out, table, column);
    out
}

/// Reduce a SQL function name to `[A-Za-z0-9_]`.
///
/// Function names are emitted unquoted (`COUNT( ... )`), so anything else is dropped.
pub fn escape_function(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

pub(crate) fn write_identifier(out: &mut String, name: &str) {
    out.push(QUOTE);
    for ch in name.chars() {
        if ch == QUOTE {
            out.push(QUOTE);
            out.push(QUOTE);
        } else {
            out.push(ch);
        }
    }
    out.push(QUOTE);
}

pub(crate) fn write_qualified(out: &mut String, table: Option<&str>, column: &str) {
    if let Some(table) = table {
        write_identifier(out, table);
        out.push('.');
    }
    // A bare `*` is the table wildcard, not a column literally named `*`.
    if column == "*" {
        out.push('*');
    } else {
        write_identifier(out, column);
    }
}

/// A caller-trusted SQL fragment inserted verbatim.
///
/// Raw fragments bypass escaping and parameter binding, so never build one
/// from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawSql(String);

impl RawSql {
    pub fn new(sql: impl Into<String>) -> Self {
        RawSql(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mark a string as a raw SQL fragment.
pub fn raw(sql: impl Into<String>) -> RawSql {
    RawSql::new(sql)
}

/// A possibly table-qualified column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(table: Option<String>, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
        }
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        write_qualified(out, self.table.as_deref(), &self.name);
    }

    /// Render the quoted, qualified column.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

/// The left-hand side of a comparison, or a selectable/orderable term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Column(ColumnRef),
    Raw(RawSql),
}

impl Target {
    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Target::Column(col) => col.write_sql(out),
            Target::Raw(sql) => out.push_str(sql.as_str()),
        }
    }

    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

/// A column key as supplied by the caller, before table resolution.
///
/// - `"title"` resolves against the current default table.
/// - `("comments", "author")` names the table (or join alias) explicitly.
/// - `raw("LENGTH(title)")` is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Column(String),
    Qualified { table: String, column: String },
    Raw(RawSql),
}

impl Key {
    /// Resolve this key, qualifying bare columns with `default_table`.
    pub fn resolve(&self, default_table: &str) -> Target {
        match self {
            Key::Column(name) => {
                Target::Column(ColumnRef::new(Some(default_table.to_string()), name.clone()))
            }
            Key::Qualified { table, column } => {
                Target::Column(ColumnRef::new(Some(table.clone()), column.clone()))
            }
            Key::Raw(sql) => Target::Raw(sql.clone()),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Column(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Column(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Column(name.clone())
    }
}

impl<T: Into<String>, C: Into<String>> From<(T, C)> for Key {
    fn from((table, column): (T, C)) -> Self {
        Key::Qualified {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl From<RawSql> for Key {
    fn from(sql: RawSql) -> Self {
        Key::Raw(sql)
    }
}
