// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Procedural macros for the specguard crate.
//!
//! One attribute: `#[instrumented]`. It opts a free function into call
//! interception. Nothing about the function's behaviour changes unless the
//! call happens inside `specguard::run_validated`, in which case its
//! registered pre- and post-checks run around it.
//!
//! # Example
//!
//! ```ignore
//! use specguard::{instrumented, Failure, Value};
//!
//! #[instrumented]
//! pub fn reverse(items: Value) -> Result<Value, Failure> { ... }
//!
//! // Registers against the generated identity constant.
//! specguard::register_pre(REVERSE_CALLABLE, Shape::any(1), |inv| { ... });
//! ```

use proc_macro::TokenStream;

mod instrumented;

/// Route a function through the specguard call interceptor.
///
/// # Attributes
///
/// - `name = "path::to::fn"` - Override the callable name (default:
///   `module_path!()` joined with the function name)
///
/// # Requirements
///
/// - A free, non-async function with plain identifier parameters
/// - Every parameter type is `Clone` and converts into `specguard::Value`
/// - Returns `Result<R, specguard::Failure>` where `R: Clone + Into<Value>`
///
/// # Generated Output
///
/// - The function, whose body is moved into an inline inner function
/// - `<NAME>_CALLABLE: specguard::CallableId` with the function's identity
#[proc_macro_attribute]
pub fn instrumented(attr: TokenStream, item: TokenStream) -> TokenStream {
    instrumented::process(attr, item)
}
