//! The scope belongs to one thread and is restored on every exit path.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Barrier};
use std::thread;

use specguard::{instrumented, register_pre, run_validated, scope, Failure, Role, Shape, Slot};

use super::common::assert_violation;

#[instrumented]
fn positive(x: i64) -> Result<i64, Failure> {
    Ok(x)
}

fn install_positive_checks() {
    register_pre(POSITIVE_CALLABLE, Shape::new([Slot::Number]), |inv| {
        inv.check("x > 0", || Ok(inv.arg(0)?.as_f64()? > 0.0))
    });
}

#[test]
fn test_spawned_thread_is_not_validated() {
    install_positive_checks();
    let out = run_validated(|| {
        let child = thread::spawn(|| (scope::is_active(), positive(-1)))
            .join()
            .map_err(|_| Failure::target("child panicked"))?;
        assert_eq!(child, (false, Ok(-1)));
        positive(-1)
    });
    assert_violation(&out, Role::Pre, "x > 0");
}

#[test]
fn test_concurrent_threads_keep_separate_scopes() {
    install_positive_checks();
    let barrier = Arc::new(Barrier::new(2));

    let validated = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            run_validated(|| {
                barrier.wait();
                positive(-5)
            })
        })
    };
    let direct = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            positive(-5)
        })
    };

    let validated = validated.join().expect("validated thread");
    let direct = direct.join().expect("direct thread");
    assert_violation(&validated, Role::Pre, "x > 0");
    assert_eq!(direct, Ok(-5));
}

#[test]
fn test_panic_clears_scope() {
    install_positive_checks();
    let caught = catch_unwind(AssertUnwindSafe(|| {
        run_validated(|| -> Result<(), Failure> { panic!("boom") })
    }));
    assert!(caught.is_err());
    assert!(!scope::is_active());
    assert_eq!(positive(-2), Ok(-2));
}

#[test]
fn test_error_return_clears_scope() {
    install_positive_checks();
    let out = run_validated(|| positive(0));
    assert!(out.is_err());
    assert!(!scope::is_active());
    assert_eq!(positive(0), Ok(0));
}
