//! Instrumented functions are checked at any call depth below the root,
//! including calls made from inside check procedures.

use std::cell::Cell;

use specguard::{instrumented, register_post, register_pre, run_validated, Failure, Role, Shape, Slot, Value};

use super::common::assert_violation;

#[instrumented]
fn root_of(x: f64) -> Result<f64, Failure> {
    Ok(x.sqrt())
}

/// Not instrumented; only calls something that is.
fn norm(xs: &[f64]) -> Result<f64, Failure> {
    let squares: f64 = xs.iter().map(|x| x * x).sum();
    root_of(squares - 1.0)
}

fn deep(depth: usize, x: f64) -> Result<f64, Failure> {
    if depth == 0 {
        root_of(x)
    } else {
        deep(depth - 1, x)
    }
}

fn install_root_checks() {
    register_pre(ROOT_OF_CALLABLE, Shape::new([Slot::Number]), |inv| {
        inv.check("x >= 0", || Ok(inv.arg(0)?.as_f64()? >= 0.0))
    });
}

#[test]
fn test_plain_caller_reaches_instrumented_callee() {
    install_root_checks();
    assert_eq!(run_validated(|| norm(&[3.0, 0.0])), Ok(8f64.sqrt()));
    assert_violation(&run_validated(|| norm(&[0.5])), Role::Pre, "x >= 0");
    assert!(norm(&[0.5]).is_ok_and(f64::is_nan));
}

#[test]
fn test_depth_does_not_matter() {
    install_root_checks();
    assert_violation(&run_validated(|| deep(32, -1.0)), Role::Pre, "x >= 0");
    assert_eq!(run_validated(|| deep(32, 4.0)), Ok(2.0));
}

#[instrumented]
fn checked_len(items: Value) -> Result<i64, Failure> {
    Ok(items.len()? as i64)
}

#[instrumented]
fn first(items: Value) -> Result<Value, Failure> {
    Ok(items.index(0)?.clone())
}

#[test]
fn test_calls_inside_checks_are_intercepted() {
    register_pre(CHECKED_LEN_CALLABLE, Shape::any(1), |inv| {
        inv.check("argument is a seq", || Ok(inv.arg(0)?.as_seq().is_some()))
    });
    // The postcondition of `first` calls `checked_len` on its result.
    register_post(FIRST_CALLABLE, Shape::any(1), |inv| {
        inv.check("len(result) >= 0", || Ok(checked_len(inv.result()?.clone())? >= 0))
    });

    let nested = Value::from(vec![Value::from(vec![1, 2])]);
    assert_eq!(run_validated(|| first(nested)), Ok(Value::from(vec![1, 2])));

    // The nested violation surfaces as `checked_len`'s own precondition.
    let flat = Value::from(vec![Value::from("ab")]);
    let out = run_validated(|| first(flat));
    assert_violation(&out, Role::Pre, "argument is a seq");
    let callable = out.err().and_then(|f| f.violation().map(|v| v.callable.clone()));
    assert_eq!(callable, Some(CHECKED_LEN_CALLABLE));
}

thread_local! {
    static COUNTDOWN_PRE_RUNS: Cell<usize> = const { Cell::new(0) };
}

#[instrumented]
fn countdown(n: i64) -> Result<i64, Failure> {
    Ok(n)
}

#[instrumented]
fn countdown_to_two(n: i64) -> Result<i64, Failure> {
    Ok(n)
}

/// Post-check that calls the function it checks, one step closer to zero.
fn recheck_below(
    call: fn(i64) -> Result<i64, Failure>,
) -> impl Fn(&specguard::Invocation<'_>) -> Result<(), Failure> {
    move |inv| {
        inv.check("f(n - 1) == n - 1", || {
            let n = inv.arg(0)?.as_f64()? as i64;
            Ok(n == 0 || call(n - 1)? == n - 1)
        })
    }
}

#[test]
fn test_post_check_reenters_its_own_function() {
    register_pre(COUNTDOWN_CALLABLE, Shape::new([Slot::Number]), |inv| {
        COUNTDOWN_PRE_RUNS.with(|c| c.set(c.get() + 1));
        inv.check("n >= 0", || Ok(inv.arg(0)?.as_f64()? >= 0.0))
    });
    register_post(COUNTDOWN_CALLABLE, Shape::new([Slot::Number]), recheck_below(countdown));

    COUNTDOWN_PRE_RUNS.with(|c| c.set(0));
    assert_eq!(run_validated(|| countdown(3)), Ok(3));
    // One precondition per level: 3, 2, 1, 0.
    assert_eq!(COUNTDOWN_PRE_RUNS.with(Cell::get), 4);

    COUNTDOWN_PRE_RUNS.with(|c| c.set(0));
    assert_eq!(countdown(3), Ok(3));
    assert_eq!(COUNTDOWN_PRE_RUNS.with(Cell::get), 0);
}

#[test]
fn test_reentrant_violation_names_the_nested_call() {
    register_pre(COUNTDOWN_TO_TWO_CALLABLE, Shape::new([Slot::Number]), |inv| {
        inv.check("n >= 2", || Ok(inv.arg(0)?.as_f64()? >= 2.0))
    });
    register_post(
        COUNTDOWN_TO_TWO_CALLABLE,
        Shape::new([Slot::Number]),
        recheck_below(countdown_to_two),
    );

    let out = run_validated(|| countdown_to_two(4));
    assert_violation(&out, Role::Pre, "n >= 2");
    let violation = out.err().and_then(|f| f.violation().cloned());
    assert_eq!(
        violation.map(|v| (v.callable, v.args)),
        Some((COUNTDOWN_TO_TWO_CALLABLE, vec![Value::Int(1)]))
    );
}
