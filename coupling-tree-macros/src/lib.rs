extern crate proc_macro;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Marks a `#[test]` that runs with a `tracing` subscriber writing to the test
/// output, filtered by `RUST_LOG`. The subscriber is global, so the first
/// traced test in a process installs it and later ones reuse it.
#[proc_macro_attribute]
pub fn traced_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);
    let fn_block = &input_fn.block;
    let fn_attrs = &input_fn.attrs;
    let fn_sig = &input_fn.sig;

    let expanded = quote! {
        #(#fn_attrs)*
        #[test]
        #fn_sig
        {
            let _ = ::tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(::tracing_subscriber::EnvFilter::from_default_env())
                .try_init();
            {
                #fn_block
            }
        }
    };

    TokenStream::from(expanded)
}
