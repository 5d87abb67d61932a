// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The call interceptor.
//!
//! Every instrumented function funnels through [`around`]. With the scope
//! inactive it calls the body and nothing else. With the scope active it
//! brackets the body with the most specific matching pre- and post-check:
//!
//! ```text
//! around(id, args, body)
//!   ├─ scope inactive ──────────────▶ body()
//!   └─ scope active
//!        ├─ lookup(id, Pre, args)           ─▶ check(args)          ─╮ Err aborts
//!        ├─ body()                                                   ─┤ Err aborts
//!        ├─ lookup(id, Post, args ⧺ result) ─▶ check(args, result)  ─┤ Err aborts
//!        └─ Ok(result)                                               ─╯
//! ```
//!
//! Anything the body or a check calls is intercepted the same way, because the
//! scope stays active for the whole extent. That includes a postcondition
//! calling the function it checks: the nested call gets its own pre- and
//! post-checks. Nothing bounds that recursion; a check that calls its own
//! function with an input that re-triggers the same check will not terminate.

use crate::error::{CheckFault, ContractViolation, Failure, Role, TargetError};
use crate::registry::{CallableId, SpecEntry, SpecRegistry};
use crate::report::{self, Outcome};
use crate::scope;
use crate::value::Value;

/// Name the produced value is bound under inside a postcondition.
pub const RESULT_BINDING: &str = "result";

/// The arguments (and result) of one intercepted call, as seen by a check.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    callable: &'a CallableId,
    role: Role,
    args: &'a [Value],
    result: Option<&'a Value>,
}

impl<'a> Invocation<'a> {
    pub fn new(
        callable: &'a CallableId,
        role: Role,
        args: &'a [Value],
        result: Option<&'a Value>,
    ) -> Self {
        Self {
            callable,
            role,
            args,
            result,
        }
    }

    pub fn callable(&self) -> &'a CallableId {
        self.callable
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Argument at position `i`.
    pub fn arg(&self, i: usize) -> Result<&'a Value, Failure> {
        self.args.get(i).ok_or_else(|| {
            TargetError::Arity {
                expected: i + 1,
                found: self.args.len(),
            }
            .into()
        })
    }

    /// The produced value. Only bound for postconditions.
    pub fn result(&self) -> Result<&'a Value, Failure> {
        self.binding(RESULT_BINDING).ok_or_else(|| {
            Failure::target(format!("`{}` is not bound in a {}", RESULT_BINDING, self.role))
        })
    }

    /// Look up a named binding. The result is the only named one.
    pub fn binding(&self, name: &str) -> Option<&'a Value> {
        if name == RESULT_BINDING {
            self.result
        } else {
            None
        }
    }

    /// Evaluate one labelled assertion.
    ///
    /// `false` becomes a [`ContractViolation`], a target failure inside `expr`
    /// becomes a [`CheckFault`], and contract failures from nested
    /// intercepted calls propagate as they are.
    pub fn check<F>(&self, label: &str, expr: F) -> Result<(), Failure>
    where
        F: FnOnce() -> Result<bool, Failure>,
    {
        match report::evaluate(label, expr)? {
            Outcome::Pass => Ok(()),
            Outcome::Fail(check) => Err(ContractViolation {
                callable: self.callable.clone(),
                role: self.role,
                check,
                args: self.args.to_vec(),
                result: self.result.cloned(),
            }
            .into()),
            Outcome::Error(cause) => Err(self.fault(label.to_string(), cause)),
        }
    }

    fn fault(&self, check: String, cause: TargetError) -> Failure {
        CheckFault {
            callable: self.callable.clone(),
            role: self.role,
            check,
            cause,
        }
        .into()
    }
}

/// Run `body` as a call to `callable` with `args`, applying registered checks
/// when validation is active on this thread.
pub fn around<R, F>(callable: &CallableId, args: &[Value], body: F) -> Result<R, Failure>
where
    F: FnOnce() -> Result<R, Failure>,
    R: Clone + Into<Value>,
{
    // INVARIANT: with the scope off the registry is never touched; the body
    // runs as if it had not been instrumented.
    if !scope::is_active() {
        return body();
    }
    validated(callable, args, body)
}

fn validated<R, F>(callable: &CallableId, args: &[Value], body: F) -> Result<R, Failure>
where
    F: FnOnce() -> Result<R, Failure>,
    R: Clone + Into<Value>,
{
    let registry = SpecRegistry::global();
    let _span = tracing::trace_span!("intercept", callable = %callable).entered();

    if let Some(entry) = registry.lookup(callable, Role::Pre, args, None) {
        run_check(&entry, &Invocation::new(callable, Role::Pre, args, None))?;
    }

    // INVARIANT: target failures leave the interceptor exactly as the body
    // produced them.
    let result = body()?;

    let produced: Value = result.clone().into();
    if let Some(entry) = registry.lookup(callable, Role::Post, args, Some(&produced)) {
        run_check(
            &entry,
            &Invocation::new(callable, Role::Post, args, Some(&produced)),
        )?;
    }

    Ok(result)
}

/// Run one check procedure. A target failure escaping the procedure outside
/// any labelled assertion is a fault of the check as a whole.
fn run_check(entry: &SpecEntry, invocation: &Invocation<'_>) -> Result<(), Failure> {
    tracing::trace!(role = %entry.role, shape = %entry.shape, seq = entry.seq, "running check");
    match entry.run(invocation) {
        Ok(()) => Ok(()),
        Err(Failure::Target(cause)) => {
            report::record(&Outcome::Error(cause.clone()));
            Err(invocation.fault(format!("check {}", entry.shape), cause))
        }
        Err(failure) => {
            tracing::debug!(%failure, "check aborted call");
            Err(failure)
        }
    }
}
