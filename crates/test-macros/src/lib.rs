use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, LitInt, parse_macro_input};

/// Replacement for `#[test]` that reports wall-clock time and fails any test
/// running longer than its budget (default: 1 second).
///
/// # Usage
/// ```ignore
/// use test_macros::timed_test;
///
/// #[timed_test]
/// fn fast_test() {
///     assert_eq!(1 + 1, 2);
/// }
///
/// #[timed_test(60)]
/// fn exhaustive_test() {
///     // gets a 60-second budget
/// }
/// ```
#[proc_macro_attribute]
pub fn timed_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let budget_secs: u64 = if attr.is_empty() {
        1
    } else {
        parse_macro_input!(attr as LitInt)
            .base10_parse()
            .expect("timed_test takes an integer timeout in seconds")
    };

    let func = parse_macro_input!(item as ItemFn);
    let name = &func.sig.ident;
    let body = &func.block;
    let attrs = &func.attrs;
    let vis = &func.vis;

    let wrapped = quote! {
        #(#attrs)*
        #[test]
        #vis fn #name() {
            let __start = ::std::time::Instant::now();
            let __outcome = ::std::panic::catch_unwind(
                ::std::panic::AssertUnwindSafe(|| #body)
            );
            let __secs = __start.elapsed().as_secs_f64();
            eprintln!("[timer] {} took {__secs:.3}s", stringify!(#name));
            if let ::std::result::Result::Err(__panic) = __outcome {
                ::std::panic::resume_unwind(__panic);
            }
            assert!(
                __secs < #budget_secs as f64,
                "[timer] {} blew its {}s budget ({__secs:.3}s)",
                stringify!(#name),
                #budget_secs,
            );
        }
    };

    wrapped.into()
}
