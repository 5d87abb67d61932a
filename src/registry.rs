// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The process-wide table of registered checks.
//!
//! Entries are keyed by callable, then role, then shape. The table only ever
//! grows or replaces entries in place, and every registration happens under a
//! single write lock, so a reader never sees a half-applied registration.
//!
//! # Selection
//!
//! [`SpecRegistry::lookup`] keeps the entries whose shape matches the call,
//! drops every entry that some other match is strictly more specific than,
//! and returns the most recently registered survivor. Equal and incomparable
//! shapes are therefore both resolved by recency.
//!
//! # Definition-time registration
//!
//! Checks known at compile time are submitted as [`SpecDecl`]s:
//!
//! ```ignore
//! inventory::submit! {
//!     SpecDecl {
//!         callable: AREA_CALLABLE,
//!         role: Role::Pre,
//!         shape: || Shape::new([Slot::Number, Slot::Number]),
//!         check: |inv| inv.check("w >= 0", || Ok(inv.arg(0)?.as_f64()? >= 0.0)),
//!     }
//! }
//! ```
//!
//! They are loaded the first time [`SpecRegistry::global`] is touched.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::{Serialize, Serializer};

use crate::error::{Failure, Role};
use crate::intercept::Invocation;
use crate::shape::Shape;
use crate::value::Value;

/// Stable name of an instrumented callable, shared by all its check variants.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(Cow<'static, str>);

impl CallableId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallableId({})", self.0)
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CallableId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A check procedure. Receives the call's arguments (and, for postconditions,
/// its result) and reports through [`Invocation::check`].
pub type CheckFn = Arc<dyn Fn(&Invocation<'_>) -> Result<(), Failure> + Send + Sync>;

/// One registered check variant.
#[derive(Clone, Serialize)]
pub struct SpecEntry {
    pub callable: CallableId,
    pub role: Role,
    pub shape: Shape,
    /// Registration order; larger is more recent.
    pub seq: u64,
    #[serde(skip)]
    check: CheckFn,
}

impl SpecEntry {
    pub fn run(&self, invocation: &Invocation<'_>) -> Result<(), Failure> {
        (self.check)(invocation)
    }
}

impl fmt::Debug for SpecEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecEntry")
            .field("callable", &self.callable)
            .field("role", &self.role)
            .field("shape", &self.shape)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// A check declared next to its function and collected at link time.
pub struct SpecDecl {
    pub callable: CallableId,
    pub role: Role,
    pub shape: fn() -> Shape,
    pub check: fn(&Invocation<'_>) -> Result<(), Failure>,
}

inventory::collect!(SpecDecl);

#[derive(Default)]
struct Table {
    pre: Vec<SpecEntry>,
    post: Vec<SpecEntry>,
}

impl Table {
    fn role(&self, role: Role) -> &[SpecEntry] {
        match role {
            Role::Pre => &self.pre,
            Role::Post => &self.post,
        }
    }

    fn role_mut(&mut self, role: Role) -> &mut Vec<SpecEntry> {
        match role {
            Role::Pre => &mut self.pre,
            Role::Post => &mut self.post,
        }
    }
}

#[derive(Default)]
struct State {
    tables: HashMap<CallableId, Table>,
    next_seq: u64,
}

/// Registered pre- and post-checks, keyed by callable and argument shape.
#[derive(Default)]
pub struct SpecRegistry {
    state: RwLock<State>,
}

static GLOBAL: OnceLock<SpecRegistry> = OnceLock::new();

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry consulted by the interceptor, seeded from every
    /// [`SpecDecl`] linked into the binary.
    pub fn global() -> &'static SpecRegistry {
        GLOBAL.get_or_init(|| {
            let registry = SpecRegistry::new();
            let mut seeded = 0usize;
            for decl in inventory::iter::<SpecDecl> {
                let check = decl.check;
                registry.insert(
                    decl.callable.clone(),
                    decl.role,
                    (decl.shape)(),
                    Arc::new(check),
                );
                seeded += 1;
            }
            tracing::debug!(seeded, "spec registry initialized");
            registry
        })
    }

    pub fn register_pre<F>(&self, callable: CallableId, shape: Shape, check: F)
    where
        F: Fn(&Invocation<'_>) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.insert(callable, Role::Pre, shape, Arc::new(check));
    }

    /// Register a postcondition. `shape` describes the arguments; use
    /// [`Shape::returning`] to also constrain the result.
    pub fn register_post<F>(&self, callable: CallableId, shape: Shape, check: F)
    where
        F: Fn(&Invocation<'_>) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.insert(callable, Role::Post, shape, Arc::new(check));
    }

    /// Add an entry, replacing one with the same callable, role and shape.
    fn insert(&self, callable: CallableId, role: Role, shape: Shape, check: CheckFn) {
        let shape = match role {
            Role::Pre => shape.without_result(),
            Role::Post => shape,
        };
        let mut state = self.state.write();
        let seq = state.next_seq;
        state.next_seq += 1;

        let entries = state
            .tables
            .entry(callable.clone())
            .or_default()
            .role_mut(role);
        let entry = SpecEntry {
            callable,
            role,
            shape,
            seq,
            check,
        };

        // INVARIANT: at most one entry per (callable, role, shape); a
        // replacement takes the new seq so it wins recency ties.
        let replaced = match entries.iter_mut().find(|e| e.shape == entry.shape) {
            Some(slot) => {
                *slot = entry.clone();
                true
            }
            None => {
                entries.push(entry.clone());
                false
            }
        };

        tracing::debug!(
            callable = %entry.callable,
            role = %entry.role,
            shape = %entry.shape,
            seq,
            replaced,
            "registered spec"
        );
    }

    /// The most specific entry for `callable`/`role` whose shape matches the
    /// call. `result` is `Some` for postconditions.
    pub fn lookup(
        &self,
        callable: &CallableId,
        role: Role,
        args: &[Value],
        result: Option<&Value>,
    ) -> Option<SpecEntry> {
        let state = self.state.read();
        let entries = state.tables.get(callable)?.role(role);

        let matching: Vec<&SpecEntry> = entries
            .iter()
            .filter(|e| e.shape.matches_call(args, result))
            .collect();

        matching
            .iter()
            .filter(|candidate| {
                !matching
                    .iter()
                    .any(|other| other.shape.is_more_specific_than(&candidate.shape))
            })
            .max_by_key(|candidate| candidate.seq)
            .map(|entry| (*entry).clone())
    }

    /// All entries for `callable`, in registration order.
    pub fn entries(&self, callable: &CallableId) -> Vec<SpecEntry> {
        let state = self.state.read();
        let mut entries: Vec<SpecEntry> = state
            .tables
            .get(callable)
            .map(|t| t.pre.iter().chain(&t.post).cloned().collect())
            .unwrap_or_default();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    /// Every callable with at least one entry, sorted by name.
    pub fn callables(&self) -> Vec<CallableId> {
        let state = self.state.read();
        let mut ids: Vec<CallableId> = state.tables.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        let state = self.state.read();
        state
            .tables
            .values()
            .map(|t| t.pre.len() + t.post.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
