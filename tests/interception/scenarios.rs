//! The reference scenarios, driven through the public API.

use specguard::scenarios::{catalog, reverse, reverse_of, shifted_sqrt, sum_shifted_roots, REVERSE_CALLABLE};
use specguard::{run_validated, Failure, Role, SpecRegistry, Value};

use super::common::{assert_violation, float_seq};

#[test]
fn test_shifted_sqrt_validated() {
    assert_eq!(run_validated(|| shifted_sqrt(1.0)), Ok(2.0));
    assert_eq!(run_validated(|| shifted_sqrt(0.0)), Ok(1.0));
    assert_violation(&run_validated(|| shifted_sqrt(-1.0)), Role::Pre, "x >= 0");
    assert_violation(
        &run_validated(|| shifted_sqrt(f64::INFINITY)),
        Role::Post,
        "isfinite(result)",
    );
}

#[test]
fn test_shifted_sqrt_direct() {
    assert_eq!(shifted_sqrt(f64::INFINITY), Ok(f64::INFINITY));
    assert!(shifted_sqrt(-1.0).is_ok_and(f64::is_nan));
}

#[test]
fn test_violation_reached_through_plain_function() {
    assert_eq!(run_validated(|| sum_shifted_roots(&[0.0, 4.0])), Ok(4.0));
    assert_violation(
        &run_validated(|| sum_shifted_roots(&[1.0, -4.0])),
        Role::Pre,
        "x >= 0",
    );
}

#[test]
fn test_reverse_validated() {
    let reversed = Value::from((1..=10).rev().map(f64::from).collect::<Vec<_>>());
    assert_eq!(run_validated(|| reverse(float_seq(10))), Ok(reversed));
    assert_eq!(run_validated(|| reverse(Value::Seq(vec![]))), Ok(Value::Seq(vec![])));
}

#[test]
fn test_reverse_rejects_strings() {
    assert_violation(
        &run_validated(|| reverse(Value::from("hi"))),
        Role::Pre,
        "argument supports empty_like",
    );
    assert!(matches!(reverse(Value::from("hi")), Err(Failure::Target(_))));
}

#[test]
fn test_reverse_of_is_checked_separately() {
    assert_violation(
        &run_validated(|| reverse_of(Value::Int(3))),
        Role::Pre,
        "argument supports indices",
    );
    assert_eq!(
        run_validated(|| reverse_of(Value::from(vec![1, 2]))),
        Ok(Value::from(vec![2, 1]))
    );
}

#[test]
fn test_reverse_has_pre_and_post() {
    let roles: Vec<Role> = SpecRegistry::global()
        .entries(&REVERSE_CALLABLE)
        .iter()
        .map(|e| e.role)
        .collect();
    assert!(roles.contains(&Role::Pre));
    assert!(roles.contains(&Role::Post));
}

#[test]
fn test_catalog_all_pass() {
    let failures: Vec<String> = catalog()
        .iter()
        .map(|s| s.run())
        .filter(|o| !o.passed)
        .map(|o| format!("{}: expected {}, observed {}", o.name, o.expected, o.observed))
        .collect();
    assert!(failures.is_empty(), "{:#?}", failures);
}
