// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Reference scenarios: instrumented functions with declared checks, and a
//! catalog of calls with their expected outcomes.
//!
//! | Function       | Precondition                          | Postcondition                              |
//! |----------------|---------------------------------------|--------------------------------------------|
//! | `shifted_sqrt` | `x >= 0`                              | `result` is finite                         |
//! | `reverse`      | argument supports empty_like, indices, index | same kind, mirrored, `reverse_of` undoes it |
//! | `reverse_of`   | argument supports indices             | none                                       |
//!
//! `sum_shifted_roots` has no checks and is not instrumented. It exists to
//! show that violations inside the functions it calls still surface.
//!
//! The CLI's `scenarios` command runs [`catalog`] and compares each
//! [`Observation`] against its expectation.

use serde::Serialize;

use crate::error::{Failure, Role, TargetError};
use crate::intercept::Invocation;
use crate::registry::SpecDecl;
use crate::shape::{Shape, Slot};
use crate::value::{Capability, Value};
use crate::{instrumented, run_validated};

/// Capabilities `reverse` needs from its argument.
pub const REVERSIBLE: [Capability; 3] = [
    Capability::EmptyLike,
    Capability::Indices,
    Capability::Index,
];

// ============================================================================
// SCENARIO A: shifted square root
// ============================================================================

/// `sqrt(x) + 1`.
#[instrumented]
pub fn shifted_sqrt(x: f64) -> Result<f64, Failure> {
    Ok(x.sqrt() + 1.0)
}

fn shifted_sqrt_pre(inv: &Invocation<'_>) -> Result<(), Failure> {
    inv.check("x >= 0", || Ok(inv.arg(0)?.as_f64()? >= 0.0))
}

fn shifted_sqrt_post(inv: &Invocation<'_>) -> Result<(), Failure> {
    inv.check("isfinite(result)", || Ok(inv.result()?.as_f64()?.is_finite()))
}

inventory::submit! {
    SpecDecl {
        callable: SHIFTED_SQRT_CALLABLE,
        role: Role::Pre,
        shape: || Shape::new([Slot::Number]),
        check: shifted_sqrt_pre,
    }
}

inventory::submit! {
    SpecDecl {
        callable: SHIFTED_SQRT_CALLABLE,
        role: Role::Post,
        shape: || Shape::new([Slot::Number]),
        check: shifted_sqrt_post,
    }
}

/// Sum of `shifted_sqrt` over `xs`. Carries no checks of its own.
pub fn sum_shifted_roots(xs: &[f64]) -> Result<f64, Failure> {
    xs.iter().map(|x| shifted_sqrt(*x)).sum()
}

// ============================================================================
// SCENARIO B: generic reverse
// ============================================================================

/// Reverse any indexable container, using only the container operations.
#[instrumented]
pub fn reverse(items: Value) -> Result<Value, Failure> {
    let mut out = items.empty_like()?;
    for i in items.indices()?.rev() {
        out.push(items.index(i)?.clone())?;
    }
    Ok(out)
}

/// Independent reversal used by `reverse`'s postcondition.
#[instrumented]
pub fn reverse_of(items: Value) -> Result<Value, Failure> {
    match items {
        Value::Seq(mut seq) => {
            seq.reverse();
            Ok(Value::Seq(seq))
        }
        other => Err(TargetError::Type {
            expected: "seq",
            found: other.kind(),
        }
        .into()),
    }
}

fn reverse_pre(inv: &Invocation<'_>) -> Result<(), Failure> {
    let arg = inv.arg(0)?;
    for cap in REVERSIBLE {
        inv.check(&format!("argument supports {}", cap), || Ok(arg.supports(cap)))?;
    }
    Ok(())
}

fn reverse_post(inv: &Invocation<'_>) -> Result<(), Failure> {
    let arg = inv.arg(0)?;
    let result = inv.result()?;
    inv.check("kind(result) == kind(argument)", || {
        Ok(result.kind() == arg.kind())
    })?;
    inv.check("result[i] == argument[n-1-i]", || {
        let n = arg.len()?;
        if result.len()? != n {
            return Ok(false);
        }
        for i in result.indices()? {
            if result.index(i)? != arg.index(n - 1 - i)? {
                return Ok(false);
            }
        }
        Ok(true)
    })?;
    inv.check("reverse_of(result) == argument", || {
        Ok(reverse_of(result.clone())? == *arg)
    })
}

fn reverse_of_pre(inv: &Invocation<'_>) -> Result<(), Failure> {
    inv.check("argument supports indices", || {
        Ok(inv.arg(0)?.supports(Capability::Indices))
    })
}

inventory::submit! {
    SpecDecl {
        callable: REVERSE_CALLABLE,
        role: Role::Pre,
        shape: || Shape::any(1),
        check: reverse_pre,
    }
}

inventory::submit! {
    SpecDecl {
        callable: REVERSE_CALLABLE,
        role: Role::Post,
        shape: || Shape::any(1),
        check: reverse_post,
    }
}

inventory::submit! {
    SpecDecl {
        callable: REVERSE_OF_CALLABLE,
        role: Role::Pre,
        shape: || Shape::any(1),
        check: reverse_of_pre,
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// What a scenario call should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    Returns(Value),
    Violates { role: Role, check: &'static str },
    TargetFailure,
}

impl Expect {
    fn accepts(&self, observed: &Result<Value, Failure>) -> bool {
        match (self, observed) {
            (Expect::Returns(expected), Ok(value)) => expected == value,
            (Expect::Violates { role, check }, Err(Failure::Violation(v))) => {
                v.role == *role && v.check == *check
            }
            (Expect::TargetFailure, Err(Failure::Target(_))) => true,
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Expect::Returns(value) => format!("returns {}", value),
            Expect::Violates { role, check } => format!("{} `{}` violated", role, check),
            Expect::TargetFailure => "target failure".to_string(),
        }
    }
}

/// One call from the reference scenarios.
pub struct Scenario {
    pub name: &'static str,
    pub validated: bool,
    pub expect: Expect,
    call: fn() -> Result<Value, Failure>,
}

/// Result of running a [`Scenario`].
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub name: &'static str,
    pub validated: bool,
    pub expected: String,
    pub observed: String,
    pub passed: bool,
}

impl Scenario {
    pub fn run(&self) -> Observation {
        let outcome = if self.validated {
            run_validated(self.call)
        } else {
            (self.call)()
        };
        let observed = match &outcome {
            Ok(value) => format!("returns {}", value),
            Err(failure) => failure.to_string(),
        };
        Observation {
            name: self.name,
            validated: self.validated,
            expected: self.expect.describe(),
            observed,
            passed: self.expect.accepts(&outcome),
        }
    }
}

fn one_to_ten() -> Value {
    Value::from((1..=10).map(f64::from).collect::<Vec<_>>())
}

/// Every reference scenario, in presentation order.
pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "shifted_sqrt(1)",
            validated: true,
            expect: Expect::Returns(Value::Float(2.0)),
            call: || shifted_sqrt(1.0).map(Value::from),
        },
        Scenario {
            name: "shifted_sqrt(-1)",
            validated: true,
            expect: Expect::Violates {
                role: Role::Pre,
                check: "x >= 0",
            },
            call: || shifted_sqrt(-1.0).map(Value::from),
        },
        Scenario {
            name: "shifted_sqrt(inf)",
            validated: true,
            expect: Expect::Violates {
                role: Role::Post,
                check: "isfinite(result)",
            },
            call: || shifted_sqrt(f64::INFINITY).map(Value::from),
        },
        Scenario {
            name: "shifted_sqrt(inf)",
            validated: false,
            expect: Expect::Returns(Value::Float(f64::INFINITY)),
            call: || shifted_sqrt(f64::INFINITY).map(Value::from),
        },
        Scenario {
            name: "sum_shifted_roots([4, -4])",
            validated: true,
            expect: Expect::Violates {
                role: Role::Pre,
                check: "x >= 0",
            },
            call: || sum_shifted_roots(&[4.0, -4.0]).map(Value::from),
        },
        Scenario {
            name: "reverse(1..=10)",
            validated: true,
            expect: Expect::Returns(Value::from(
                (1..=10).rev().map(f64::from).collect::<Vec<_>>(),
            )),
            call: || reverse(one_to_ten()),
        },
        Scenario {
            name: "reverse(\"hi\")",
            validated: true,
            expect: Expect::Violates {
                role: Role::Pre,
                check: "argument supports empty_like",
            },
            call: || reverse(Value::from("hi")),
        },
        Scenario {
            name: "reverse(\"hi\")",
            validated: false,
            expect: Expect::TargetFailure,
            call: || reverse(Value::from("hi")),
        },
    ]
}
