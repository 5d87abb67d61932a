// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Argument shapes and the specificity order used to pick a check variant.
//!
//! A [`Shape`] is an ordered list of [`Slot`]s, one per argument. A call
//! matches a shape when the arity agrees and every argument matches its slot.
//!
//! # Specificity
//!
//! Slots denote sets of values. `a.is_subset_of(b)` holds when every value
//! matching `a` also matches `b`. Because [`Kind`] is finite, the non-parametric
//! slots reduce to exact kind sets and the comparison is a bitmask test. Only
//! [`Slot::SeqOf`] needs recursion on the element slot.
//!
//! ```text
//!            Any
//!          /  |  \
//!    Number  Supports([Length])  ...
//!     /  \        |
//!  Int  Float    Seq
//!                 |
//!          SeqOf(Number)
//!                 |
//!          SeqOf(Float)
//! ```
//!
//! Shapes compare slot-wise. `S1` is *more specific* than `S2` when
//! `S1 ⊆ S2` and not `S2 ⊆ S1`. Equal or incomparable shapes are ties, which
//! the registry breaks by registration order.

use std::fmt;

use serde::Serialize;

use crate::value::{Capability, Kind, Value};

/// A set of [`Kind`]s packed into one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    pub fn all() -> Self {
        Kind::ALL.iter().fold(Self::EMPTY, |set, k| set.with(*k))
    }

    pub fn with(self, kind: Kind) -> Self {
        KindSet(self.0 | kind.bit())
    }

    pub fn contains(self, kind: Kind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_subset_of(self, other: KindSet) -> bool {
        self.0 & !other.0 == 0
    }

    fn from_filter(pred: impl Fn(Kind) -> bool) -> Self {
        Kind::ALL
            .iter()
            .filter(|k| pred(**k))
            .fold(Self::EMPTY, |set, k| set.with(*k))
    }
}

/// Constraint on a single argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "slot", content = "of", rename_all = "snake_case")]
pub enum Slot {
    /// Matches every value.
    Any,
    /// `Int` or `Float`.
    Number,
    /// Exactly one kind.
    Exact(Kind),
    /// Every kind supporting all listed capabilities.
    Supports(Vec<Capability>),
    /// A sequence whose elements all match the inner slot.
    SeqOf(Box<Slot>),
}

impl Slot {
    /// Capability-constrained slot with a normalised capability list.
    pub fn supports(caps: impl IntoIterator<Item = Capability>) -> Self {
        let mut caps: Vec<Capability> = caps.into_iter().collect();
        caps.sort_unstable();
        caps.dedup();
        Slot::Supports(caps)
    }

    pub fn seq_of(element: Slot) -> Self {
        Slot::SeqOf(Box::new(element))
    }

    /// Same slot with every capability list sorted and deduplicated, so
    /// structurally different spellings of one constraint compare equal.
    fn normalised(self) -> Self {
        match self {
            Slot::Supports(caps) => Slot::supports(caps),
            Slot::SeqOf(element) => Slot::seq_of(element.normalised()),
            other => other,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Slot::SeqOf(element) => value
                .as_seq()
                .is_some_and(|items| items.iter().all(|item| element.matches(item))),
            other => other.top_kinds().contains(value.kind()),
        }
    }

    /// Kinds a matching value may have at the top level.
    fn top_kinds(&self) -> KindSet {
        match self {
            Slot::Any => KindSet::all(),
            Slot::Number => KindSet::from_filter(Kind::is_numeric),
            Slot::Exact(kind) => KindSet::EMPTY.with(*kind),
            Slot::Supports(caps) => {
                KindSet::from_filter(|k| caps.iter().all(|cap| k.supports(*cap)))
            }
            Slot::SeqOf(_) => KindSet::EMPTY.with(Kind::Seq),
        }
    }

    /// Whether this slot places no constraint on its value.
    fn is_unconstrained(&self) -> bool {
        match self {
            Slot::SeqOf(_) => false,
            other => other.top_kinds() == KindSet::all(),
        }
    }

    /// Every value matching `self` also matches `other`.
    pub fn is_subset_of(&self, other: &Slot) -> bool {
        if other.is_unconstrained() {
            return true;
        }
        match (self, other) {
            (Slot::SeqOf(a), Slot::SeqOf(b)) => a.is_subset_of(b),
            (Slot::SeqOf(_), b) => b.top_kinds().contains(Kind::Seq),
            // A plain sequence slot admits any elements.
            (a, Slot::SeqOf(b)) => {
                a.top_kinds().is_subset_of(KindSet::EMPTY.with(Kind::Seq))
                    && (a.top_kinds() == KindSet::EMPTY || b.is_unconstrained())
            }
            (a, b) => a.top_kinds().is_subset_of(b.top_kinds()),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Any => f.write_str("_"),
            Slot::Number => f.write_str("number"),
            Slot::Exact(kind) => write!(f, "{}", kind),
            Slot::Supports(caps) => {
                let caps: Vec<String> = caps.iter().map(ToString::to_string).collect();
                write!(f, "impl {}", caps.join(" + "))
            }
            Slot::SeqOf(element) => write!(f, "seq<{}>", element),
        }
    }
}

/// Ordered argument pattern for one check variant.
///
/// Postcondition shapes may also constrain the produced result; it is matched
/// as if it were one more argument after the real ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Shape {
    slots: Vec<Slot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Slot>,
}

impl Shape {
    pub fn new(slots: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            slots: slots.into_iter().map(Slot::normalised).collect(),
            result: None,
        }
    }

    /// `arity` unconstrained slots.
    pub fn any(arity: usize) -> Self {
        Self::new(vec![Slot::Any; arity])
    }

    /// Constrain the result a postcondition is matched against.
    ///
    /// An unconstrained slot is the same as no constraint, so it normalises
    /// to nothing and re-registering with or without it hits the same entry.
    pub fn returning(mut self, result: Slot) -> Self {
        self.result = (!result.is_unconstrained()).then(|| result.normalised());
        self
    }

    /// The argument pattern alone. Preconditions never see a result, so
    /// their shapes are stored this way.
    pub fn without_result(mut self) -> Self {
        self.result = None;
        self
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn result(&self) -> Option<&Slot> {
        self.result.as_ref()
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn matches(&self, args: &[Value]) -> bool {
        self.slots.len() == args.len()
            && self
                .slots
                .iter()
                .zip(args)
                .all(|(slot, arg)| slot.matches(arg))
    }

    /// Match `args ⧺ [result]`. The result constraint only applies once a
    /// result exists.
    pub fn matches_call(&self, args: &[Value], result: Option<&Value>) -> bool {
        self.matches(args)
            && match (&self.result, result) {
                (Some(slot), Some(value)) => slot.matches(value),
                _ => true,
            }
    }

    /// Every call matching `self` also matches `other`.
    pub fn is_subset_of(&self, other: &Shape) -> bool {
        let result_subset = match (&self.result, &other.result) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a.is_subset_of(b),
        };
        result_subset
            && self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|(a, b)| a.is_subset_of(b))
    }

    /// Strictly narrower than `other`.
    pub fn is_more_specific_than(&self, other: &Shape) -> bool {
        self.is_subset_of(other) && !other.is_subset_of(self)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", slot)?;
        }
        f.write_str(")")?;
        if let Some(result) = &self.result {
            write!(f, " -> {}", result)?;
        }
        Ok(())
    }
}
