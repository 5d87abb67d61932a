//! Checks run inside `run_validated` and nowhere else.

use std::cell::Cell;

use specguard::{instrumented, register_post, register_pre, run_validated, scope, Failure, Role, Shape, Slot};

use super::common::assert_violation;

thread_local! {
    static HALVE_CALLS: Cell<usize> = const { Cell::new(0) };
}

#[instrumented]
fn halve(n: i64) -> Result<i64, Failure> {
    HALVE_CALLS.with(|c| c.set(c.get() + 1));
    Ok(n / 2)
}

#[instrumented]
fn negate(x: f64) -> Result<f64, Failure> {
    Ok(-x)
}

#[instrumented]
fn plain(n: i64) -> Result<i64, Failure> {
    Ok(n + 1)
}

fn install_halve_checks() {
    register_pre(HALVE_CALLABLE, Shape::new([Slot::Number]), |inv| {
        inv.check("n is even", || Ok(inv.arg(0)?.as_f64()? % 2.0 == 0.0))
    });
}

#[test]
fn test_direct_call_ignores_checks() {
    install_halve_checks();
    assert_eq!(halve(3), Ok(1));
}

#[test]
fn test_validated_call_applies_checks() {
    install_halve_checks();
    assert_eq!(run_validated(|| halve(4)), Ok(2));
    assert_violation(&run_validated(|| halve(3)), Role::Pre, "n is even");
}

#[test]
fn test_precondition_failure_skips_body() {
    install_halve_checks();
    HALVE_CALLS.with(|c| c.set(0));
    let _ = run_validated(|| halve(5));
    assert_eq!(HALVE_CALLS.with(Cell::get), 0);
    let _ = run_validated(|| halve(6));
    assert_eq!(HALVE_CALLS.with(Cell::get), 1);
}

#[test]
fn test_postcondition_sees_result() {
    register_post(NEGATE_CALLABLE, Shape::new([Slot::Number]), |inv| {
        inv.check("result == -x", || {
            Ok(inv.result()?.as_f64()? == -inv.arg(0)?.as_f64()?)
        })
    });
    assert_eq!(run_validated(|| negate(2.5)), Ok(-2.5));
}

#[test]
fn test_no_checks_is_transparent() {
    for n in [-3, 0, 41] {
        assert_eq!(run_validated(|| plain(n)), plain(n));
    }
}

#[test]
fn test_nested_run_validated_keeps_scope() {
    install_halve_checks();
    let out = run_validated(|| {
        let inner = run_validated(|| halve(8))?;
        assert!(scope::is_active());
        halve(inner + 1)
    });
    assert_violation(&out, Role::Pre, "n is even");
    assert!(!scope::is_active());
}

#[test]
fn test_scope_cleared_after_every_exit() {
    install_halve_checks();
    let _ = run_validated(|| halve(2));
    assert!(!scope::is_active());
    let _ = run_validated(|| halve(1));
    assert!(!scope::is_active());
    // Same input outside the scope now runs unchecked.
    assert_eq!(halve(1), Ok(0));
}
