// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dynamic values flowing through intercepted calls.
//!
//! Checks are selected by the *shape* of a call's arguments, so arguments and
//! results have to be inspectable at run time. Instrumented functions keep
//! their typed Rust signatures; the interceptor converts arguments into
//! [`Value`]s only when validation is active.
//!
//! Every value has a [`Kind`], and every kind supports a fixed set of
//! [`Capability`]s. A sequence can produce an empty copy of itself, enumerate
//! its indices and be indexed by position. A string can only report its
//! length. Body code that reaches for an operation the kind does not support
//! gets a [`TargetError::Unsupported`], which is what an unvalidated call
//! surfaces when it is handed the wrong kind of value.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::TargetError;

/// Runtime kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Seq,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 6] = [
        Kind::Nil,
        Kind::Bool,
        Kind::Int,
        Kind::Float,
        Kind::Str,
        Kind::Seq,
    ];

    /// Operations values of this kind support.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Kind::Nil | Kind::Bool => &[],
            Kind::Int | Kind::Float => &[Capability::Arithmetic],
            Kind::Str => &[Capability::Length],
            Kind::Seq => &[
                Capability::EmptyLike,
                Capability::Indices,
                Capability::Index,
                Capability::Length,
            ],
        }
    }

    pub fn supports(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Float)
    }

    /// Bit used for this kind in a [`KindSet`](crate::shape::KindSet).
    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Seq => "seq",
        };
        f.write_str(name)
    }
}

/// An operation a value may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Produce an empty container of the same kind.
    EmptyLike,
    /// Enumerate valid positions.
    Indices,
    /// Read the element at a position.
    Index,
    /// Report a length.
    Length,
    /// Take part in numeric arithmetic.
    Arithmetic,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::EmptyLike => "empty_like",
            Capability::Indices => "indices",
            Capability::Index => "index",
            Capability::Length => "length",
            Capability::Arithmetic => "arithmetic",
        };
        f.write_str(name)
    }
}

/// A dynamically typed argument or result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Seq(_) => Kind::Seq,
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.kind().supports(capability)
    }

    /// The first capability in `required` this value lacks, if any.
    pub fn missing_capability(&self, required: &[Capability]) -> Option<Capability> {
        required.iter().copied().find(|cap| !self.supports(*cap))
    }

    fn require(&self, capability: Capability, operation: &'static str) -> Result<(), TargetError> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(TargetError::Unsupported {
                operation,
                kind: self.kind(),
            })
        }
    }

    /// Numeric view of an `Int` or `Float`.
    pub fn as_f64(&self) -> Result<f64, TargetError> {
        match self {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            other => Err(TargetError::Type {
                expected: "number",
                found: other.kind(),
            }),
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// An empty value of the same kind.
    pub fn empty_like(&self) -> Result<Value, TargetError> {
        self.require(Capability::EmptyLike, "empty_like")?;
        Ok(Value::Seq(Vec::new()))
    }

    /// Valid positions, in order.
    pub fn indices(&self) -> Result<Range<usize>, TargetError> {
        self.require(Capability::Indices, "indices")?;
        Ok(0..self.as_seq().map_or(0, <[Value]>::len))
    }

    /// Element at position `i`.
    pub fn index(&self, i: usize) -> Result<&Value, TargetError> {
        self.require(Capability::Index, "index")?;
        let items = self.as_seq().unwrap_or_default();
        items.get(i).ok_or(TargetError::OutOfBounds {
            index: i,
            len: items.len(),
        })
    }

    pub fn len(&self) -> Result<usize, TargetError> {
        self.require(Capability::Length, "length")?;
        Ok(match self {
            Value::Str(s) => s.chars().count(),
            Value::Seq(items) => items.len(),
            _ => 0,
        })
    }

    pub fn is_empty(&self) -> Result<bool, TargetError> {
        self.len().map(|n| n == 0)
    }

    /// Append an element to a sequence.
    pub fn push(&mut self, item: Value) -> Result<(), TargetError> {
        match self {
            Value::Seq(items) => {
                items.push(item);
                Ok(())
            }
            other => Err(TargetError::Unsupported {
                operation: "push",
                kind: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}
