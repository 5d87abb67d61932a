// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! The registry is process-wide and tests run in parallel, so every test that
//! registers checks should do it under its own callable name.

#![doc(hidden)]

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::CallableId;

static NEXT: AtomicU64 = AtomicU64::new(0);

/// A callable name no other caller of this function will get.
pub fn fresh_callable(label: &str) -> CallableId {
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    CallableId::new(format!("test::{}#{}", label, n))
}
