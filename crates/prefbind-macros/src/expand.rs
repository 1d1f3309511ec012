use crate::{
    args::PreferencesArgs, error::Diagnostic, index::ModuleIndex, paths::CratePaths, scan,
    synth, validate,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Item, ItemMod};

/// Expand `#[preferences]` on an inline module.
pub fn preferences(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Phase 1: parse inputs.
    let args = match PreferencesArgs::parse(attr) {
        Ok(args) => args,
        Err(err) => return err.write_errors(),
    };
    let mut module: ItemMod = match syn::parse2(item) {
        Ok(module) => module,
        Err(err) => return err.to_compile_error(),
    };
    let Some((_, items)) = &mut module.content else {
        return syn::Error::new_spanned(
            &module,
            "#[preferences] must be applied to an inline module (`mod name { ... }`)",
        )
        .to_compile_error();
    };
    let paths = CratePaths::new(args.krate.as_ref());

    // Phase 2: scan tagged declarations and index the rest of the module.
    let scanned = scan::scan(items);
    let index = ModuleIndex::build(items);

    // Phase 3: validate and resolve converters and callbacks.
    let mut outcome = validate::validate(scanned, &index);
    outcome.diagnostics.extend(index.diagnostics);

    // Phase 4: strip markers and append one binder per valid owner.
    scan::strip_markers(items);
    for owner in &outcome.owners {
        items.push(Item::Verbatim(synth::binder(owner, &paths)));
    }

    // Phase 5: emit the module alongside every diagnostic.
    let errors = outcome.diagnostics.iter().map(Diagnostic::to_compile_error);

    quote! {
        #module
        #(#errors)*
    }
}

///
/// TESTS
///
