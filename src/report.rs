// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Single-assertion evaluation and pass/fail/error bookkeeping.
//!
//! [`evaluate`] runs one check expression and classifies it the way a unit
//! test harness would: it passed, it failed, or it blew up before producing a
//! verdict. The interceptor aborts on both of the latter, but they stay
//! distinct here and in the resulting [`Failure`].
//!
//! Outcomes are tallied per thread. A harness that drives validated calls on
//! one thread reads the aggregate with [`tally`] or drains it with
//! [`take_tally`]; other threads keep their own counts.

use std::cell::Cell;
use std::fmt;

use serde::Serialize;

use crate::error::{Failure, TargetError};

/// Verdict for one check expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    /// The expression evaluated to `false`. Carries its label.
    Fail(String),
    /// The expression raised a failure of its own.
    Error(TargetError),
}

/// Aggregate counts of recorded outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    /// No failures and no errors.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} errored",
            self.passed, self.failed, self.errored
        )
    }
}

thread_local! {
    static TALLY: Cell<Tally> = const {
        Cell::new(Tally {
            passed: 0,
            failed: 0,
            errored: 0,
        })
    };
}

/// Evaluate one labelled check expression.
///
/// A contract failure coming out of `expr` was raised by a nested intercepted
/// call and already recorded there. It is returned as `Err` untouched so it
/// keeps propagating outward. Only target failures count as this
/// expression's own error.
pub fn evaluate<F>(label: &str, expr: F) -> Result<Outcome, Failure>
where
    F: FnOnce() -> Result<bool, Failure>,
{
    let outcome = match expr() {
        Ok(true) => Outcome::Pass,
        Ok(false) => Outcome::Fail(label.to_string()),
        Err(Failure::Target(cause)) => Outcome::Error(cause),
        Err(nested) => return Err(nested),
    };
    record(&outcome);
    match &outcome {
        Outcome::Pass => tracing::trace!(check = label, "pass"),
        Outcome::Fail(_) => tracing::debug!(check = label, "fail"),
        Outcome::Error(cause) => tracing::debug!(check = label, %cause, "error"),
    }
    Ok(outcome)
}

pub(crate) fn record(outcome: &Outcome) {
    TALLY.with(|cell| {
        let mut tally = cell.get();
        match outcome {
            Outcome::Pass => tally.passed += 1,
            Outcome::Fail(_) => tally.failed += 1,
            Outcome::Error(_) => tally.errored += 1,
        }
        cell.set(tally);
    });
}

/// Counts recorded on this thread so far.
pub fn tally() -> Tally {
    TALLY.with(Cell::get)
}

/// Return this thread's counts and reset them.
pub fn take_tally() -> Tally {
    TALLY.with(|cell| cell.replace(Tally::default()))
}
