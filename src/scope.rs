// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The ambient "validation is active" flag.
//!
//! One `Cell<bool>` per thread. [`enter_root`] sets it for the dynamic extent
//! of a thunk and a drop guard puts back whatever was there before, so the
//! flag is cleared on normal return, on an `Err` return and while a panic
//! unwinds through the root. Nested entries see the flag already set and
//! restore `true` on exit, which means only the outermost exit clears it.
//!
//! Threads spawned from inside a validated call start with the flag off.

use std::cell::Cell;

thread_local! {
    static ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside a validated extent.
#[inline]
pub fn is_active() -> bool {
    ACTIVE.with(Cell::get)
}

/// Run `thunk` with validation active on this thread.
pub fn enter_root<T>(thunk: impl FnOnce() -> T) -> T {
    let _guard = ScopeGuard::enter();
    thunk()
}

struct ScopeGuard {
    was_active: bool,
}

impl ScopeGuard {
    fn enter() -> Self {
        let was_active = ACTIVE.with(|cell| cell.replace(true));
        if !was_active {
            tracing::debug!("validation scope entered");
        }
        Self { was_active }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        // INVARIANT: every exit path restores the state seen on entry, so the
        // root exit leaves the thread inactive exactly once.
        ACTIVE.with(|cell| cell.set(self.was_active));
        if !self.was_active {
            tracing::debug!("validation scope exited");
        }
    }
}
