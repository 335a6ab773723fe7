//! Condition tree and its SQL rendering.
//!
//! A [`Condition`] is either a single [`Comparison`] or an AND/OR group of
//! conditions. Rendering follows two rules:
//! - empty groups render as nothing and are dropped from their parent;
//! - every group except the root is wrapped in parentheses.

use crate::error::{SqlError, SqlResult};
use crate::ident::Target;
use crate::value::{Bindings, RenderMode, Term, Value};
use std::fmt;
use std::str::FromStr;

/// Comparison operator.
///
/// Parsed from the snake_case names used in operator maps:
///
/// ```
/// use sqlshape::Operator;
///
/// assert_eq!("greater_than".parse::<Operator>().unwrap(), Operator::GreaterThan);
/// assert!("between".parse::<Operator>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    In,
    NotIn,
    Like,
    NotLike,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::LessThanOrEqualTo,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqualTo,
        Operator::In,
        Operator::NotIn,
        Operator::Like,
        Operator::NotLike,
    ];

    /// Name used in operator maps.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::LessThan => "less_than",
            Operator::LessThanOrEqualTo => "less_than_or_equal_to",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Like => "like",
            Operator::NotLike => "not_like",
        }
    }

    /// SQL operator text.
    pub fn sql(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
        }
    }

    fn is_membership(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl FromStr for Operator {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        Operator::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| SqlError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.name().to_string()
    }
}

/// `target <op> term`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub target: Target,
    pub op: Operator,
    pub term: Term,
}

impl Comparison {
    pub fn new(target: Target, op: Operator, term: Term) -> Self {
        Self { target, op, term }
    }

    fn write_sql(&self, out: &mut String, bindings: &mut Bindings<'_>) {
        // Empty membership lists collapse to constant predicates.
        if let (true, Term::List(values)) = (self.op.is_membership(), &self.term) {
            if values.is_empty() {
                out.push_str(if self.op == Operator::In { "1=0" } else { "1=1" });
                return;
            }
        }

        self.target.write_sql(out);
        match (self.op, &self.term) {
            (Operator::Equal, Term::Null) => out.push_str(" IS NULL"),
            (Operator::NotEqual, Term::Null) => out.push_str(" IS NOT NULL"),
            (op, term) if op.is_membership() => {
                out.push(' ');
                out.push_str(op.sql());
                out.push_str(" (");
                bindings.write_term(out, term);
                out.push(')');
            }
            (op, Term::List(values)) => {
                out.push(' ');
                out.push_str(op.sql());
                out.push_str(" (");
                bindings.write_list(out, values);
                out.push(')');
            }
            (op, term) => {
                out.push(' ');
                out.push_str(op.sql());
                out.push(' ');
                bindings.write_term(out, term);
            }
        }
    }
}

/// Node of the condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All children must hold.
    And(Vec<Condition>),
    /// At least one child must hold.
    Or(Vec<Condition>),
    Compare(Comparison),
}

impl Condition {
    pub fn and(children: Vec<Condition>) -> Self {
        Condition::And(children)
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Or(children)
    }

    /// A group with no (non-empty) children.
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::And(children) | Condition::Or(children) => {
                children.iter().all(Condition::is_empty)
            }
            Condition::Compare(_) => false,
        }
    }

    /// Render this condition as the root of a clause (no outer parentheses).
    ///
    /// Returns the SQL and the bound parameters in placeholder order.
    pub fn build(&self, mode: &RenderMode) -> (String, Vec<Value>) {
        let mut bindings = Bindings::new(mode);
        let mut out = String::new();
        self.write_sql(&mut out, &mut bindings, false);
        (out, bindings.into_params())
    }

    pub(crate) fn write_sql(&self, out: &mut String, bindings: &mut Bindings<'_>, nested: bool) {
        match self {
            Condition::Compare(cmp) => cmp.write_sql(out, bindings),
            Condition::And(children) => write_group(out, bindings, children, " AND ", nested),
            Condition::Or(children) => write_group(out, bindings, children, " OR ", nested),
        }
    }
}

/// Write non-empty `children` joined by `junction`; nothing at all if every child is empty.
pub(crate) fn write_group(
    out: &mut String,
    bindings: &mut Bindings<'_>,
    children: &[Condition],
    junction: &str,
    nested: bool,
) {
    if children.iter().all(Condition::is_empty) {
        return;
    }
    if nested {
        out.push('(');
    }
    let mut first = true;
    for child in children.iter().filter(|c| !c.is_empty()) {
        if !first {
            out.push_str(junction);
        }
        first = false;
        child.write_sql(out, bindings, true);
    }
    if nested {
        out.push(')');
    }
}
