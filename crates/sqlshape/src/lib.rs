//! # sqlshape
//!
//! Compile declarative query descriptions into SQL.
//!
//! ## Features
//!
//! - **Declarative filters**: scalars, lists, `NULL`, operator maps and raw fragments
//! - **Parameter safety**: values become `?` placeholders with an ordered parameter list
//! - **Inline rendering**: or literals produced by a caller-supplied formatter
//! - **Joins**: auto-aliased joins that can feed filters, columns and grouping back into the query
//! - **Backtick quoting**: every identifier is quoted, embedded backticks doubled
//!
//! ## Example
//!
//! ```
//! use sqlshape::{ColumnOptions, Filter, JoinOptions, OpMap, Query};
//!
//! let mut q = Query::new("posts");
//! q.column("title", ColumnOptions::new())
//!     .join("comments", "post_id", JoinOptions::new().columns(["content"]))?
//!     .filter(Filter::new().with("views", OpMap::new().op("greater_than", 10)))?
//!     .order_by("title", "asc")?
//!     .limit(5);
//!
//! let built = q.build();
//! assert_eq!(
//!     built.sql(),
//!     "SELECT `posts`.`title`, `comments_0`.`content` AS `comments_0_content` FROM `posts` \
//!      INNER JOIN `comments` AS `comments_0` ON (`posts`.`id` = `comments_0`.`post_id`) \
//!      WHERE (`posts`.`views` > 10) ORDER BY `posts`.`title` ASC LIMIT 5"
//! );
//! assert!(built.params().is_empty());
//! # Ok::<(), sqlshape::SqlError>(())
//! ```
//!
//! With the `tracing` feature enabled, rendering emits events under the
//! `sqlshape.sql` target.

pub mod condition;
pub mod error;
pub mod filter;
pub mod ident;
pub mod query;
pub mod value;

pub use condition::{Comparison, Condition, Operator};
pub use error::{SqlError, SqlResult};
pub use filter::{Filter, OpMap, Operand};
pub use ident::{ColumnRef, Key, RawSql, Target, raw};
pub use query::{
    BuiltQuery, ColumnOptions, ForeignKey, JoinOptions, JoinType, OrderDirection, Query,
    QueryOptions,
};
pub use value::{RenderMode, Term, Value, ValueFormatter};
