// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The `#[instrumented]` attribute macro.
//!
//! Moves the function body into an inner function and puts a two-way branch
//! in front of it. With validation off the inner function is called straight
//! away and nothing else happens. With validation on the arguments are
//! converted to values and the call goes through `specguard::around`.
//!
//! Also emits `<NAME>_CALLABLE`, the function's identity, for registering
//! checks against it.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    parse::Parser, parse_macro_input, punctuated::Punctuated, spanned::Spanned, Error, FnArg,
    Ident, ItemFn, Lit, LitStr, Meta, Pat, PatIdent, Token,
};

/// Parsed attributes from `#[instrumented(...)]`.
#[derive(Default, Debug)]
struct InstrumentedAttrs {
    /// Explicit callable name; defaults to `module_path!()::fn_name`.
    name: Option<LitStr>,
}

impl InstrumentedAttrs {
    fn parse(attr: TokenStream) -> syn::Result<Self> {
        let mut result = InstrumentedAttrs::default();

        if attr.is_empty() {
            return Ok(result);
        }

        let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
        let nested = parser.parse(attr)?;

        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("name") => match &nv.value {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(lit_str),
                        ..
                    }) => result.name = Some(lit_str.clone()),
                    other => return Err(Error::new(other.span(), "`name` must be a string literal")),
                },
                other => {
                    return Err(Error::new(
                        other.span(),
                        "unknown argument; expected `name = \"...\"`",
                    ))
                }
            }
        }

        Ok(result)
    }
}

/// Collect the parameter identifiers, rejecting shapes the wrapper can't forward.
fn parameter_idents(func: &ItemFn) -> syn::Result<Vec<Ident>> {
    if let Some(asyncness) = &func.sig.asyncness {
        return Err(Error::new(
            asyncness.span(),
            "#[instrumented] does not support async functions",
        ));
    }

    func.sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Receiver(receiver) => Err(Error::new(
                receiver.span(),
                "#[instrumented] only supports free functions",
            )),
            FnArg::Typed(pat_type) => match pat_type.pat.as_ref() {
                Pat::Ident(PatIdent {
                    ident,
                    by_ref: None,
                    subpat: None,
                    ..
                }) => Ok(ident.clone()),
                other => Err(Error::new(
                    other.span(),
                    "#[instrumented] parameters must be plain identifiers",
                )),
            },
        })
        .collect()
}

fn expand(attrs: InstrumentedAttrs, func: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let params = parameter_idents(&func)?;

    let ItemFn {
        attrs: fn_attrs,
        vis,
        sig,
        block,
    } = func;

    let fn_name = &sig.ident;
    let body_name = Ident::new(&format!("__specguard_{}_body", fn_name), Span::call_site());
    let id_const = Ident::new(
        &format!("{}_CALLABLE", fn_name.to_string().to_uppercase()),
        fn_name.span(),
    );
    let name_expr = match &attrs.name {
        Some(lit) => quote! { #lit },
        None => {
            let fn_str = fn_name.to_string();
            quote! { concat!(module_path!(), "::", #fn_str) }
        }
    };

    let mut inner_sig = sig.clone();
    inner_sig.ident = body_name.clone();

    // The outer signature drops `mut` from its bindings; the inner function
    // keeps the original patterns.
    let mut outer_sig = sig;
    for arg in outer_sig.inputs.iter_mut() {
        if let FnArg::Typed(pat_type) = arg {
            if let Pat::Ident(pat_ident) = pat_type.pat.as_mut() {
                pat_ident.mutability = None;
            }
        }
    }

    Ok(quote! {
        /// Identity of the instrumented function, for registering checks.
        #[allow(dead_code)]
        #vis const #id_const: ::specguard::CallableId =
            ::specguard::CallableId::from_static(#name_expr);

        #(#fn_attrs)*
        #vis #outer_sig {
            #[inline(always)]
            #inner_sig #block

            if !::specguard::scope::is_active() {
                return #body_name(#(#params),*);
            }

            let __specguard_args = ::std::vec![
                #(::specguard::Value::from(::std::clone::Clone::clone(&#params))),*
            ];
            ::specguard::around(
                &#id_const,
                &__specguard_args,
                move || #body_name(#(#params),*),
            )
        }
    })
}

/// Main entry point for the `#[instrumented]` attribute macro.
pub fn process(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);

    let attrs = match InstrumentedAttrs::parse(attr) {
        Ok(a) => a,
        Err(e) => return e.to_compile_error().into(),
    };

    match expand(attrs, func) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
