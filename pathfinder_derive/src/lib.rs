//! Procedural macro that builds service handlers from their YAML configuration entry
extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod config;

/// Derive `FromServiceConfig` for a struct with named fields that implements `Default`.
///
/// Each field is looked up by name in the service configuration map, fields annotated with
/// `#[service_config(skip)]` keep their default value.
#[proc_macro_derive(FromServiceConfig, attributes(service_config))]
pub fn derive_from_service_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    config::expand_derive_from_service_config(&input)
        .unwrap_or_else(to_compile_errors)
        .into()
}

fn to_compile_errors(errors: Vec<syn::Error>) -> proc_macro2::TokenStream {
    let compile_errors = errors.iter().map(syn::Error::to_compile_error);
    quote::quote!(#(#compile_errors)*)
}
