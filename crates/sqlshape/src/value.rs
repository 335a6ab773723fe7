//! Scalar values and their rendering.
//!
//! A value is rendered one of three ways:
//! - numeric values (finite integers/floats, or lists made only of them) are
//!   written as bare literals in every mode;
//! - `NULL` and [`RawSql`] are written verbatim;
//! - everything else is bound: a `?` placeholder plus an entry in the parameter
//!   list ([`RenderMode::Prepared`]), or `'<formatter(value)>'`
//!   ([`RenderMode::Inline`]).

use crate::ident::RawSql;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A scalar that can be compared against a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Numeric values are never bound; they render as bare literals.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

/// The right-hand side of a single comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Null,
    Value(Value),
    List(Vec<Value>),
    Raw(RawSql),
}

impl Term {
    pub fn is_null(&self) -> bool {
        matches!(self, Term::Null)
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Value(value)
    }
}

impl From<Vec<Value>> for Term {
    fn from(values: Vec<Value>) -> Self {
        Term::List(values)
    }
}

impl From<RawSql> for Term {
    fn from(sql: RawSql) -> Self {
        Term::Raw(sql)
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for Term {
                fn from(v: $ty) -> Self {
                    Term::Value(Value::from(v))
                }
            }

            impl From<Option<$ty>> for Term {
                fn from(v: Option<$ty>) -> Self {
                    v.map_or(Term::Null, Term::from)
                }
            }

            impl From<Vec<$ty>> for Term {
                fn from(vs: Vec<$ty>) -> Self {
                    Term::List(vs.into_iter().map(Value::from).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Term {
                fn from(vs: [$ty; N]) -> Self {
                    Term::List(vs.into_iter().map(Value::from).collect())
                }
            }
        )*
    };
}

impl_scalar! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int(v.into()),
    i16 => |v| Value::Int(v.into()),
    i32 => |v| Value::Int(v.into()),
    i64 => |v| Value::Int(v),
    u8 => |v| Value::Int(v.into()),
    u16 => |v| Value::Int(v.into()),
    u32 => |v| Value::Int(v.into()),
    // Widen through the shortest decimal text so 0.1f32 stays 0.1.
    f32 => |v| Value::Float(v.to_string().parse().unwrap_or_else(|_| v.into())),
    f64 => |v| Value::Float(v),
    &str => |v| Value::Text(v.to_string()),
    String => |v| Value::Text(v),
    Uuid => |v| Value::Uuid(v),
    DateTime<Utc> => |v| Value::Timestamp(v),
}

/// Caller-supplied literal formatter for inline rendering.
///
/// It receives each bound value and returns its escaped text; the compiler adds
/// the surrounding single quotes.
pub type ValueFormatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// How bound values appear in the rendered SQL.
#[derive(Clone)]
pub enum RenderMode {
    /// `?` placeholders plus an ordered parameter list.
    Prepared,
    /// Literals produced by the formatter, no parameters.
    Inline(ValueFormatter),
}

impl RenderMode {
    pub fn is_prepared(&self) -> bool {
        matches!(self, RenderMode::Prepared)
    }
}

impl fmt::Debug for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Prepared => f.write_str("Prepared"),
            RenderMode::Inline(_) => f.debug_tuple("Inline").field(&"<formatter>").finish(),
        }
    }
}

/// Collects parameters while a query renders, in placeholder order.
pub(crate) struct Bindings<'a> {
    mode: &'a RenderMode,
    params: Vec<Value>,
}

impl<'a> Bindings<'a> {
    pub(crate) fn new(mode: &'a RenderMode) -> Self {
        Self {
            mode,
            params: Vec::new(),
        }
    }

    pub(crate) fn into_params(self) -> Vec<Value> {
        self.params
    }

    fn bind(&mut self, out: &mut String, value: &Value) {
        match self.mode {
            RenderMode::Prepared => {
                out.push('?');
                self.params.push(value.clone());
            }
            RenderMode::Inline(format) => {
                out.push('\'');
                out.push_str(&format(value));
                out.push('\'');
            }
        }
    }

    fn write_value(&mut self, out: &mut String, value: &Value) {
        if value.is_numeric() {
            out.push_str(&value.to_string());
        } else {
            self.bind(out, value);
        }
    }

    /// Write list elements joined by `, ` (no surrounding parentheses).
    pub(crate) fn write_list(&mut self, out: &mut String, values: &[Value]) {
        let numeric = values.iter().all(Value::is_numeric);
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if numeric {
                out.push_str(&value.to_string());
            } else {
                self.bind(out, value);
            }
        }
    }

    /// Write a term; lists are written without parentheses.
    pub(crate) fn write_term(&mut self, out: &mut String, term: &Term) {
        match term {
            Term::Null => out.push_str("NULL"),
            Term::Raw(sql) => out.push_str(sql.as_str()),
            Term::Value(value) => self.write_value(out, value),
            Term::List(values) => self.write_list(out, values),
        }
    }
}
