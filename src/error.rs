// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Failure kinds surfaced by validated calls.
//!
//! | Kind                | Raised when                                        |
//! |---------------------|----------------------------------------------------|
//! | `Violation`         | a check expression evaluated to `false`            |
//! | `Fault`             | a check expression itself failed while evaluating  |
//! | `Target`            | the instrumented body failed on its own            |
//!
//! A registry miss is not a failure: the hook is skipped.
//!
//! Violations and faults abort the intercepted call and travel outward through
//! `?` unchanged. Nothing in the interceptor catches, wraps or retries them, so
//! the failure a caller of [`run_validated`](crate::run_validated) sees is the
//! first one raised anywhere in the call tree.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::registry::CallableId;
use crate::value::{Kind, Value};

/// Which side of the call a check runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Pre,
    Post,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Pre => f.write_str("precondition"),
            Role::Post => f.write_str("postcondition"),
        }
    }
}

/// Any failure raised while running an instrumented call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Failure {
    #[error(transparent)]
    Violation(#[from] ContractViolation),
    #[error(transparent)]
    Fault(#[from] CheckFault),
    #[error(transparent)]
    Target(#[from] TargetError),
}

impl Failure {
    /// Shorthand for a body failure with a free-form message.
    pub fn target(message: impl Into<String>) -> Self {
        Failure::Target(TargetError::Domain(message.into()))
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Failure::Violation(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Failure::Fault(_))
    }

    pub fn is_target(&self) -> bool {
        matches!(self, Failure::Target(_))
    }

    /// The violation, if this is one.
    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            Failure::Violation(v) => Some(v),
            _ => None,
        }
    }
}

/// A check expression evaluated to `false`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{role} `{check}` of `{callable}` violated for args ({})", display_args(.args))]
pub struct ContractViolation {
    pub callable: CallableId,
    pub role: Role,
    /// Label of the failing expression.
    pub check: String,
    pub args: Vec<Value>,
    /// Present for postconditions.
    pub result: Option<Value>,
}

/// A check procedure raised a failure of its own instead of a verdict.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{role} `{check}` of `{callable}` failed to evaluate: {cause}")]
pub struct CheckFault {
    pub callable: CallableId,
    pub role: Role,
    pub check: String,
    pub cause: TargetError,
}

/// The instrumented body's own failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TargetError {
    #[error("operation `{operation}` is not supported by {kind} values")]
    Unsupported { operation: &'static str, kind: Kind },
    #[error("expected {expected}, found {found}")]
    Type { expected: &'static str, found: Kind },
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("expected {expected} arguments, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("{0}")]
    Domain(String),
}

fn display_args(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
