//! Leaf constructors.
//!
//! An [`OperatorBuilder`] mints value placeholders from a counter it owns
//! exclusively. The counter is neither `Clone` nor shared: two builders given
//! the same call sequence produce the same placeholders, and calls on one
//! never shift the other. Request builders hold exactly one operator builder
//! for their whole chain, so conditions merged into the same request never
//! collide.

use std::collections::HashMap;

use keyforge_model::{AttributeType, AttributeValue};

use super::attr::AttrRef;
use super::condition::{CompareOp, Condition, Leaf, LeafKind};

/// Monotonic source of placeholder indexes.
#[derive(Debug, Default)]
pub struct PlaceholderCounter {
    next: usize,
}

impl PlaceholderCounter {
    /// A counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current index and advance.
    pub fn next_index(&mut self) -> usize {
        let n = self.next;
        self.next += 1;
        n
    }

    /// The index the next call to [`next_index`](Self::next_index) returns.
    #[must_use]
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Mint `:<name><infix>_<n>`.
    pub(crate) fn mint(&mut self, name: &str, infix: &str) -> String {
        format!(":{name}{infix}_{}", self.next_index())
    }
}

/// Factory for leaf conditions.
#[derive(Debug, Default)]
pub struct OperatorBuilder {
    counter: PlaceholderCounter,
}

impl OperatorBuilder {
    /// A fresh builder whose counter starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The counter backing this builder.
    pub fn counter_mut(&mut self) -> &mut PlaceholderCounter {
        &mut self.counter
    }

    /// `#a = :a_n`
    pub fn eq(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> Condition {
        self.compare(attr, CompareOp::Eq, value.into())
    }

    /// `#a <> :a_n`
    pub fn ne(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> Condition {
        self.compare(attr, CompareOp::Ne, value.into())
    }

    /// `#a < :a_n`
    pub fn lt(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> Condition {
        self.compare(attr, CompareOp::Lt, value.into())
    }

    /// `#a <= :a_n`
    pub fn lte(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> Condition {
        self.compare(attr, CompareOp::Le, value.into())
    }

    /// `#a > :a_n`
    pub fn gt(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> Condition {
        self.compare(attr, CompareOp::Gt, value.into())
    }

    /// `#a >= :a_n`
    pub fn gte(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> Condition {
        self.compare(attr, CompareOp::Ge, value.into())
    }

    /// `#a BETWEEN :a_low_n AND :a_high_n+1`
    pub fn between(
        &mut self,
        attr: &AttrRef,
        low: impl Into<AttributeValue>,
        high: impl Into<AttributeValue>,
    ) -> Condition {
        let (operand, names) = attr.operand();
        let low_ph = self.counter.mint(attr.name(), "_low");
        let high_ph = self.counter.mint(attr.name(), "_high");
        leaf(
            format!("{operand} BETWEEN {low_ph} AND {high_ph}"),
            names,
            vec![(low_ph, low.into()), (high_ph, high.into())],
            LeafKind::Between,
        )
    }

    /// `begins_with(#a, :a_n)`
    pub fn begins_with(&mut self, attr: &AttrRef, prefix: impl Into<AttributeValue>) -> Condition {
        self.function(attr, "begins_with", prefix.into(), LeafKind::BeginsWith)
    }

    /// `contains(#a, :a_n)`
    pub fn contains(&mut self, attr: &AttrRef, operand: impl Into<AttributeValue>) -> Condition {
        self.function(attr, "contains", operand.into(), LeafKind::Contains)
    }

    /// `attribute_exists(#a)`
    pub fn exists(&mut self, attr: &AttrRef) -> Condition {
        let (operand, names) = attr.operand();
        leaf(
            format!("attribute_exists({operand})"),
            names,
            Vec::new(),
            LeafKind::Exists,
        )
    }

    /// `attribute_not_exists(#a)`
    pub fn not_exists(&mut self, attr: &AttrRef) -> Condition {
        let (operand, names) = attr.operand();
        leaf(
            format!("attribute_not_exists({operand})"),
            names,
            Vec::new(),
            LeafKind::NotExists,
        )
    }

    /// `attribute_type(#a, :a_type_n)`
    pub fn attribute_type(&mut self, attr: &AttrRef, attribute_type: AttributeType) -> Condition {
        let (operand, names) = attr.operand();
        let ph = self.counter.mint(attr.name(), "_type");
        leaf(
            format!("attribute_type({operand}, {ph})"),
            names,
            vec![(ph, AttributeValue::S(attribute_type.as_str().to_owned()))],
            LeafKind::AttributeType,
        )
    }

    /// `#a IN (:a_in0_n, :a_in1_n+1, ...)`
    ///
    /// One placeholder per value in order, repeats included. A single value
    /// still renders the `IN (...)` form. No values yields an empty leaf,
    /// which the compiler drops.
    pub fn is_in<V>(&mut self, attr: &AttrRef, values: impl IntoIterator<Item = V>) -> Condition
    where
        V: Into<AttributeValue>,
    {
        let bound: Vec<(String, AttributeValue)> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (self.counter.mint(attr.name(), &format!("_in{i}")), v.into()))
            .collect();
        if bound.is_empty() {
            return leaf(String::new(), Vec::new(), Vec::new(), LeafKind::In);
        }
        let (operand, names) = attr.operand();
        let list = bound
            .iter()
            .map(|(ph, _)| ph.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        leaf(format!("{operand} IN ({list})"), names, bound, LeafKind::In)
    }

    /// Comparisons against `size(#a)`.
    pub fn size<'a>(&'a mut self, attr: &AttrRef) -> SizeBuilder<'a> {
        SizeBuilder {
            ops: self,
            attr: attr.clone(),
        }
    }

    fn compare(&mut self, attr: &AttrRef, op: CompareOp, value: AttributeValue) -> Condition {
        let (operand, names) = attr.operand();
        let ph = self.counter.mint(attr.name(), "");
        leaf(
            format!("{operand} {op} {ph}"),
            names,
            vec![(ph, value)],
            LeafKind::Compare(op),
        )
    }

    fn function(
        &mut self,
        attr: &AttrRef,
        function: &str,
        value: AttributeValue,
        kind: LeafKind,
    ) -> Condition {
        let (operand, names) = attr.operand();
        let ph = self.counter.mint(attr.name(), "");
        leaf(
            format!("{function}({operand}, {ph})"),
            names,
            vec![(ph, value)],
            kind,
        )
    }
}

/// Comparisons on the size of an attribute.
#[derive(Debug)]
pub struct SizeBuilder<'a> {
    ops: &'a mut OperatorBuilder,
    attr: AttrRef,
}

impl SizeBuilder<'_> {
    /// `size(#a) = :a_size_n`
    pub fn eq(self, size: u64) -> Condition {
        self.compare(CompareOp::Eq, size)
    }

    /// `size(#a) <> :a_size_n`
    pub fn ne(self, size: u64) -> Condition {
        self.compare(CompareOp::Ne, size)
    }

    /// `size(#a) < :a_size_n`
    pub fn lt(self, size: u64) -> Condition {
        self.compare(CompareOp::Lt, size)
    }

    /// `size(#a) <= :a_size_n`
    pub fn lte(self, size: u64) -> Condition {
        self.compare(CompareOp::Le, size)
    }

    /// `size(#a) > :a_size_n`
    pub fn gt(self, size: u64) -> Condition {
        self.compare(CompareOp::Gt, size)
    }

    /// `size(#a) >= :a_size_n`
    pub fn gte(self, size: u64) -> Condition {
        self.compare(CompareOp::Ge, size)
    }

    fn compare(self, op: CompareOp, size: u64) -> Condition {
        let (operand, names) = self.attr.operand();
        let ph = self.ops.counter.mint(self.attr.name(), "_size");
        leaf(
            format!("size({operand}) {op} {ph}"),
            names,
            vec![(ph, AttributeValue::from(size))],
            LeafKind::Size(op),
        )
    }
}

fn leaf(
    expression: String,
    names: Vec<(String, String)>,
    values: Vec<(String, AttributeValue)>,
    kind: LeafKind,
) -> Condition {
    Condition::Leaf(Leaf {
        expression,
        names: names.into_iter().collect::<HashMap<_, _>>(),
        values: values.into_iter().collect::<HashMap<_, _>>(),
        negated: false,
        kind,
    })
}
