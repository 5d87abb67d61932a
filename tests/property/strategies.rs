//! Generators for values, slots and shapes.

use proptest::prelude::*;
use specguard::{Capability, Kind, Shape, Slot, Value};

const CAPABILITIES: [Capability; 5] = [
    Capability::EmptyLike,
    Capability::Indices,
    Capability::Index,
    Capability::Length,
    Capability::Arithmetic,
];

pub fn kind() -> impl Strategy<Value = Kind> {
    prop::sample::select(Kind::ALL.to_vec())
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        "[a-z]{0,6}".prop_map(Value::Str),
    ]
}

pub fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::Seq)
    })
}

fn flat_slot() -> impl Strategy<Value = Slot> {
    prop_oneof![
        Just(Slot::Any),
        Just(Slot::Number),
        kind().prop_map(Slot::Exact),
        prop::sample::subsequence(CAPABILITIES.to_vec(), 0..3).prop_map(|caps| Slot::supports(caps)),
    ]
}

pub fn slot() -> impl Strategy<Value = Slot> {
    flat_slot().prop_recursive(2, 8, 1, |inner| inner.prop_map(Slot::seq_of))
}

/// Shapes of a fixed arity, optionally constraining the result.
pub fn shape(arity: usize) -> impl Strategy<Value = Shape> {
    (
        prop::collection::vec(slot(), arity),
        prop::option::of(slot()),
    )
        .prop_map(|(slots, result)| match result {
            Some(result) => Shape::new(slots).returning(result),
            None => Shape::new(slots),
        })
}
