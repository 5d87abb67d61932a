// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scope-bounded runtime pre- and post-condition checks.
//!
//! Register checks against a function's name and an argument shape, then run
//! a call under [`run_validated`]. Inside that call every instrumented function
//! reached, at any depth, has its most specific matching checks applied.
//! Outside it the same functions run as if no checks existed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  value.rs   │────▶│  shape.rs    │────▶│ registry.rs  │
//! │ (Value,Kind,│     │ (Slot, Shape,│     │ (SpecRegistry│
//! │ Capability) │     │ specificity) │     │  SpecEntry)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!                                                 │
//! ┌─────────────┐     ┌──────────────┐            ▼
//! │  scope.rs   │────▶│ intercept.rs │◀──── report.rs
//! │ (thread-    │     │ (around,     │     (evaluate, Tally)
//! │  local flag)│     │  Invocation) │
//! └─────────────┘     └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use specguard::{instrumented, register_pre, run_validated, Failure, Shape, Slot};
//!
//! #[instrumented]
//! fn shifted_sqrt(x: f64) -> Result<f64, Failure> {
//!     Ok(x.sqrt() + 1.0)
//! }
//!
//! register_pre(SHIFTED_SQRT_CALLABLE, Shape::new([Slot::Number]), |inv| {
//!     inv.check("x >= 0", || Ok(inv.arg(0)?.as_f64()? >= 0.0))
//! });
//!
//! assert!(shifted_sqrt(-1.0).is_ok());                        // NaN, unchecked
//! assert!(run_validated(|| shifted_sqrt(-1.0)).is_err());     // precondition
//! ```

// Lets `#[instrumented]` expand to `::specguard::...` paths inside this crate.
extern crate self as specguard;

// Module declarations
pub mod error;
pub mod intercept;
pub mod registry;
pub mod report;
pub mod scenarios;
pub mod scope;
pub mod shape;
pub mod testing;
pub mod value;

// Re-exports for public API
pub use error::{CheckFault, ContractViolation, Failure, Role, TargetError};
pub use intercept::{around, Invocation, RESULT_BINDING};
pub use registry::{CallableId, CheckFn, SpecDecl, SpecEntry, SpecRegistry};
pub use report::{Outcome, Tally};
pub use shape::{KindSet, Shape, Slot};
pub use specguard_macros::instrumented;
pub use value::{Capability, Kind, Value};

#[doc(hidden)]
pub use inventory;

/// Register a precondition in the global registry.
pub fn register_pre<F>(callable: CallableId, shape: Shape, check: F)
where
    F: Fn(&Invocation<'_>) -> Result<(), Failure> + Send + Sync + 'static,
{
    SpecRegistry::global().register_pre(callable, shape, check);
}

/// Register a postcondition in the global registry. `shape` describes the
/// arguments; see [`Shape::returning`] to constrain the result as well.
pub fn register_post<F>(callable: CallableId, shape: Shape, check: F)
where
    F: Fn(&Invocation<'_>) -> Result<(), Failure> + Send + Sync + 'static,
{
    SpecRegistry::global().register_post(callable, shape, check);
}

/// Run `thunk` with interception active for its whole dynamic extent.
///
/// Returns the thunk's value, or the first contract, check or target failure
/// raised anywhere beneath it. The scope is cleared on every exit path.
pub fn run_validated<T>(thunk: impl FnOnce() -> Result<T, Failure>) -> Result<T, Failure> {
    let outcome = scope::enter_root(thunk);
    if let Err(failure) = &outcome {
        tracing::debug!(%failure, "validated call failed");
    }
    outcome
}
