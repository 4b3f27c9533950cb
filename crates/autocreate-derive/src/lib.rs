//! # autocreate-derive
//!
//! Procedural macros for the autocreate-core registry:
//! - `#[auto_create]`: mark a struct for automatic instantiation, or a trait
//!   as an abstract marked type
//! - `#[derive(AutoResolve)]`: fill `#[auto_resolve]` fields from the registry

use proc_macro::TokenStream;

mod auto_create;
mod auto_resolve;

/// Mark a type for automatic instantiation at startup.
///
/// Arguments:
/// - `restore`: restore the instance from persisted storage instead of
///   default-constructing it
/// - `resolvable_as(dyn A, dyn B)`: also register the instance under each
///   listed type
/// - `hooks(awake, start, destroy)`: lifecycle capabilities the type implements
#[proc_macro_attribute]
pub fn auto_create(args: TokenStream, input: TokenStream) -> TokenStream {
    auto_create::auto_create_impl(args, input)
}

/// Implement `AutoResolve` for a struct with named fields
#[proc_macro_derive(AutoResolve, attributes(auto_resolve))]
pub fn derive_auto_resolve(input: TokenStream) -> TokenStream {
    auto_resolve::auto_resolve_impl(input)
}
