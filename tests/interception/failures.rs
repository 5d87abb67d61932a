//! Violations, faults and target failures stay distinct on their way out.

use specguard::{
    instrumented, register_post, register_pre, report, run_validated, Failure, Role, Shape, Slot,
    TargetError, Value,
};

use super::common::{assert_fault, assert_violation};

#[instrumented]
fn head(items: Value) -> Result<Value, Failure> {
    Ok(items.index(0)?.clone())
}

#[instrumented]
fn ratio(a: f64, b: f64) -> Result<f64, Failure> {
    if b == 0.0 {
        return Err(TargetError::Domain("division by zero".into()).into());
    }
    Ok(a / b)
}

#[test]
fn test_target_failure_passes_through_unchanged() {
    register_post(RATIO_CALLABLE, Shape::new([Slot::Number, Slot::Number]), |inv| {
        inv.check("isfinite(result)", || Ok(inv.result()?.as_f64()?.is_finite()))
    });
    let expected: Result<f64, Failure> = Err(TargetError::Domain("division by zero".into()).into());
    assert_eq!(run_validated(|| ratio(1.0, 0.0)), expected);
    assert_eq!(ratio(1.0, 0.0), expected);
}

#[test]
fn test_error_inside_assertion_is_a_fault() {
    // The check reads a numeric view of an argument that may not be numeric.
    register_pre(HEAD_CALLABLE, Shape::any(1), |inv| {
        inv.check("first element >= 0", || {
            Ok(inv.arg(0)?.index(0)?.as_f64()? >= 0.0)
        })
    });

    assert_eq!(run_validated(|| head(Value::from(vec![2, 3]))), Ok(Value::Int(2)));
    assert_violation(
        &run_validated(|| head(Value::from(vec![-2, 3]))),
        Role::Pre,
        "first element >= 0",
    );

    let out = run_validated(|| head(Value::from(vec!["x"])));
    assert_fault(&out, Role::Pre);
    match out {
        Err(Failure::Fault(fault)) => {
            assert_eq!(fault.check, "first element >= 0");
            assert!(matches!(fault.cause, TargetError::Type { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_violation_message_names_everything() {
    let id = super::common::fresh_callable("message");
    register_pre(id.clone(), Shape::any(2), |inv| inv.check("a < b", || Ok(false)));
    let args = [Value::Int(3), Value::from("z")];
    let out = run_validated(|| specguard::around(&id, &args, || Ok(0i64)));
    let message = out.err().map(|f| f.to_string()).unwrap_or_default();
    assert!(message.contains("precondition"), "{}", message);
    assert!(message.contains("a < b"), "{}", message);
    assert!(message.contains(id.name()), "{}", message);
    assert!(message.contains("3"), "{}", message);
}

#[test]
fn test_tally_counts_assertions_on_this_thread() {
    let id = super::common::fresh_callable("tally");
    register_pre(id.clone(), Shape::new([Slot::Number]), |inv| {
        inv.check("x != 0", || Ok(inv.arg(0)?.as_f64()? != 0.0))?;
        inv.check("x < 100", || Ok(inv.arg(0)?.as_f64()? < 100.0))
    });
    let call = |x: i64| run_validated(|| specguard::around(&id, &[Value::Int(x)], || Ok(x)));

    report::take_tally();
    assert_eq!(call(5), Ok(5));
    assert!(call(0).is_err());
    assert!(call(500).is_err());

    let tally = report::take_tally();
    assert_eq!(tally.passed, 3);
    assert_eq!(tally.failed, 2);
    assert_eq!(tally.errored, 0);
    assert!(!tally.is_clean());
}
