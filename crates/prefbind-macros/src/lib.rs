//! Attribute macro behind `prefbind`: scans a module for preference-tagged
//! struct fields, validates them, and generates one binder per owning struct.

mod args;
mod error;
mod expand;
mod index;
mod model;
mod paths;
mod scan;
mod subscribe;
mod synth;
mod transform;
mod types;
mod validate;

use proc_macro::TokenStream;

/// Generate `<Owner>Preferences` binders for every struct in the annotated
/// module that carries storage tags (`#[int_pref]`, `#[long_pref]`,
/// `#[float_pref]`, `#[bool_pref]`, `#[string_pref]`).
///
/// Field modifiers: `#[observe]` / `#[observe(tag = "..")]` and
/// `#[transform(using = Converter, type_param1 = .., type_param2 = ..)]`.
/// Callbacks are inherent methods marked `#[subscribe(tag = "..")]`.
///
/// `#[preferences(crate = "path")]` overrides the runtime crate path.
#[proc_macro_attribute]
pub fn preferences(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::preferences(attr.into(), item.into()).into()
}
