//! Condition trees.
//!
//! A [`Condition`] is either a [`Leaf`] (one expression fragment plus the
//! placeholders it introduced) or a [`Combinator`] (`AND`/`OR` over child
//! conditions). Either may carry a negation flag that the compiler renders as
//! `NOT (...)`. Trees are immutable once built: combinators and negation
//! always produce new nodes.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use keyforge_model::AttributeValue;
use regex::Regex;

/// Matches a name placeholder token such as `#username`.
static NAME_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[^\s.\[\](),]+").expect("valid name placeholder regex"));

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "<>"),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl LogicalOp {
    /// The separator placed between parenthesized children.
    #[must_use]
    pub fn joiner(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// The operator that produced a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// `#a <op> :v`
    Compare(CompareOp),
    /// `#a BETWEEN :low AND :high`
    Between,
    /// `begins_with(#a, :v)`
    BeginsWith,
    /// `contains(#a, :v)`
    Contains,
    /// `attribute_exists(#a)`
    Exists,
    /// `attribute_not_exists(#a)`
    NotExists,
    /// `attribute_type(#a, :t)`
    AttributeType,
    /// `#a IN (:v0, ...)`
    In,
    /// `size(#a) <op> :v`
    Size(CompareOp),
    /// A hand-written fragment. Always filter-only.
    Raw,
}

impl LeafKind {
    /// Returns `true` if the store accepts this operator in a key condition.
    #[must_use]
    pub fn is_key_sargable(self) -> bool {
        match self {
            Self::Compare(op) => op != CompareOp::Ne,
            Self::Between | Self::BeginsWith => true,
            Self::Contains
            | Self::Exists
            | Self::NotExists
            | Self::AttributeType
            | Self::In
            | Self::Size(_)
            | Self::Raw => false,
        }
    }
}

/// One expression fragment with its placeholder maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub(crate) expression: String,
    pub(crate) names: HashMap<String, String>,
    pub(crate) values: HashMap<String, AttributeValue>,
    pub(crate) negated: bool,
    pub(crate) kind: LeafKind,
}

impl Leaf {
    /// The fragment text, without any negation wrapper.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Name placeholders (`#a` to `a`) introduced by this leaf.
    #[must_use]
    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// Value placeholders (`:a_0` to value) introduced by this leaf.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, AttributeValue> {
        &self.values
    }

    /// Whether the compiler wraps this leaf in `NOT (...)`.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The operator that produced this leaf.
    #[must_use]
    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// The business attribute this leaf constrains.
    ///
    /// Recovered from the `#name` placeholder tokens in the expression text.
    /// Returns `None` when the fragment references no placeholder, several
    /// distinct placeholders (e.g. a nested path), or a placeholder missing
    /// from the name map.
    #[must_use]
    pub fn attribute_name(&self) -> Option<&str> {
        let tokens: HashSet<&str> = NAME_PLACEHOLDER
            .find_iter(&self.expression)
            .map(|m| m.as_str())
            .collect();
        let mut tokens = tokens.into_iter();
        match (tokens.next(), tokens.next()) {
            (Some(token), None) => self.names.get(token).map(String::as_str),
            _ => None,
        }
    }
}

/// Replace every occurrence of the name placeholder `from` with `to`.
///
/// Matches whole tokens only, so renaming `#user` leaves `#username` alone.
pub(crate) fn rename_placeholder(expression: &str, from: &str, to: &str) -> String {
    NAME_PLACEHOLDER
        .replace_all(expression, |caps: &regex::Captures<'_>| {
            if &caps[0] == from {
                to.to_owned()
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned()
}

/// `AND`/`OR` over child conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Combinator {
    pub(crate) op: LogicalOp,
    pub(crate) children: Vec<Condition>,
    pub(crate) negated: bool,
}

impl Combinator {
    /// The logical operator.
    #[must_use]
    pub fn op(&self) -> LogicalOp {
        self.op
    }

    /// Child conditions in declaration order.
    #[must_use]
    pub fn children(&self) -> &[Condition] {
        &self.children
    }

    /// Whether the compiler wraps this node in `NOT (...)`.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

/// A condition tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A single fragment.
    Leaf(Leaf),
    /// A boolean combination of children.
    Combinator(Combinator),
}

impl Condition {
    /// Conjunction of `children`.
    pub fn and(children: impl IntoIterator<Item = Condition>) -> Self {
        Self::combine(LogicalOp::And, children)
    }

    /// Disjunction of `children`.
    pub fn or(children: impl IntoIterator<Item = Condition>) -> Self {
        Self::combine(LogicalOp::Or, children)
    }

    fn combine(op: LogicalOp, children: impl IntoIterator<Item = Condition>) -> Self {
        Self::Combinator(Combinator {
            op,
            children: children.into_iter().collect(),
            negated: false,
        })
    }

    /// A hand-written fragment with explicit placeholder maps.
    ///
    /// The fragment is passed through verbatim; the caller owns placeholder
    /// uniqueness. Raw leaves are never pushed into a key condition.
    pub fn raw(
        expression: impl Into<String>,
        names: impl IntoIterator<Item = (String, String)>,
        values: impl IntoIterator<Item = (String, AttributeValue)>,
    ) -> Self {
        Self::Leaf(Leaf {
            expression: expression.into(),
            names: names.into_iter().collect(),
            values: values.into_iter().collect(),
            negated: false,
            kind: LeafKind::Raw,
        })
    }

    /// The negation of this condition.
    ///
    /// Sets the negation flag on a copy of the node. Negating a node that is
    /// already negated wraps it in a single-child `AND`, so the result
    /// compiles to `NOT (NOT (...))` instead of silently collapsing.
    #[must_use]
    pub fn negate(self) -> Self {
        if self.is_negated() {
            return Self::Combinator(Combinator {
                op: LogicalOp::And,
                children: vec![self],
                negated: true,
            });
        }
        match self {
            Self::Leaf(leaf) => Self::Leaf(Leaf {
                negated: true,
                ..leaf
            }),
            Self::Combinator(node) => Self::Combinator(Combinator {
                negated: true,
                ..node
            }),
        }
    }

    /// Whether this node carries the negation flag.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.negated,
            Self::Combinator(node) => node.negated,
        }
    }

    /// Returns `true` if an `OR` appears anywhere in this tree.
    #[must_use]
    pub fn contains_or(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Combinator(node) => {
                node.op == LogicalOp::Or || node.children.iter().any(Self::contains_or)
            }
        }
    }

    /// Iterate over every leaf in the tree, depth first.
    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Leaf> + '_> {
        match self {
            Self::Leaf(leaf) => Box::new(std::iter::once(leaf)),
            Self::Combinator(node) => Box::new(node.children.iter().flat_map(Self::leaves)),
        }
    }
}

impl From<Leaf> for Condition {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl std::ops::Not for Condition {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

/// Conjunction of `children`.
pub fn and(children: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::and(children)
}

/// Disjunction of `children`.
pub fn or(children: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::or(children)
}

/// Negation of `condition`.
#[must_use]
pub fn not(condition: Condition) -> Condition {
    condition.negate()
}
