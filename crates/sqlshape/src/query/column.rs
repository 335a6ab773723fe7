//! SELECT-list columns.

use super::Query;
use crate::ident::{Key, escape_function, write_identifier};

/// Optional function wrapping and alias for a selected column.
///
/// ```
/// use sqlshape::{ColumnOptions, Query};
///
/// let mut q = Query::new("posts");
/// q.column("id", ColumnOptions::new().function("COUNT").alias("n"));
/// assert_eq!(q.to_sql(), "SELECT COUNT( `posts`.`id` ) AS `n` FROM `posts`");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    pub function: Option<String>,
    pub alias: Option<String>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the column in `name( ... )`. Characters outside `[A-Za-z0-9_]` are dropped.
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

pub(crate) fn render_column(key: &Key, default_table: &str, options: &ColumnOptions) -> String {
    let mut out = String::new();
    let target = key.resolve(default_table);
    match &options.function {
        Some(function) => {
            out.push_str(&escape_function(function));
            out.push_str("( ");
            target.write_sql(&mut out);
            out.push_str(" )");
        }
        None => target.write_sql(&mut out),
    }
    if let Some(alias) = &options.alias {
        out.push_str(" AS ");
        write_identifier(&mut out, alias);
    }
    out
}

impl Query {
    /// Add a column to the SELECT list.
    ///
    /// Bare names resolve against the base table; `(table, column)` tuples name
    /// a table or join alias; raw fragments are used verbatim.
    pub fn column(&mut self, key: impl Into<Key>, options: ColumnOptions) -> &mut Self {
        let fragment = render_column(&key.into(), &self.table, &options);
        self.columns.push(fragment);
        self
    }

    /// Clear the SELECT list, then add one column.
    pub fn reset_columns(&mut self, key: impl Into<Key>, options: ColumnOptions) -> &mut Self {
        self.columns.clear();
        self.column(key, options)
    }

    /// Rendered SELECT-list fragments in call order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::raw;

    fn render(key: impl Into<Key>, options: ColumnOptions) -> String {
        render_column(&key.into(), "posts", &options)
    }

    #[test]
    fn plain_column() {
        assert_eq!(render("title", ColumnOptions::new()), "`posts`.`title`");
    }

    #[test]
    fn qualified_column_with_alias() {
        assert_eq!(
            render(("comments", "content"), ColumnOptions::new().alias("c")),
            "`comments`.`content` AS `c`"
        );
    }

    #[test]
    fn function_name_is_sanitized() {
        assert_eq!(
            render("id", ColumnOptions::new().function("COUNT(*); --")),
            "COUNT( `posts`.`id` )"
        );
    }

    #[test]
    fn alias_is_escaped() {
        assert_eq!(
            render("title", ColumnOptions::new().alias("ti`tle")),
            "`posts`.`title` AS `ti``tle`"
        );
    }

    #[test]
    fn wildcard_and_raw() {
        assert_eq!(render("*", ColumnOptions::new()), "`posts`.*");
        assert_eq!(render(raw("1 + 1"), ColumnOptions::new().alias("two")), "1 + 1 AS `two`");
    }
}
