use crate::{
    model::{Access, KindExt, OwnerType, PrefField},
    paths::CratePaths,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{Ident, ext::IdentExt, spanned::Spanned};

///
/// FieldNames
///
/// Generated identifiers for one field.
///

struct FieldNames<'a> {
    field: &'a PrefField,
    key: Ident,
    load: Ident,
    stored: Ident,
    read: Ident,
    write: Ident,
    local: Ident,
}

impl<'a> FieldNames<'a> {
    fn new(field: &'a PrefField) -> Self {
        let name = field.ident.unraw().to_string();

        Self {
            field,
            key: format_ident!("{}", field.key_const()),
            load: format_ident!("__load_{name}"),
            stored: format_ident!("__stored_{name}"),
            read: format_ident!("{}", field.op_name("read")),
            write: format_ident!("{}", field.op_name("write")),
            local: format_ident!("__field_{name}"),
        }
    }

    /// Assign `value` to the field on `target`.
    fn assign(&self, target: &Ident, value: &Ident) -> TokenStream {
        match &self.field.access {
            Access::Direct => {
                let ident = &self.field.ident;
                quote!(#target.#ident = #value;)
            }
            Access::Accessors { setter, .. } => quote!(#target.#setter(#value);),
        }
    }

    /// Borrow the field's current value on `target`.
    fn value_ref(&self, target: &Ident) -> TokenStream {
        match &self.field.access {
            Access::Direct => {
                let ident = &self.field.ident;
                quote!(&#target.#ident)
            }
            Access::Accessors { getter, .. } => quote!(&#target.#getter()),
        }
    }
}

/// Emit the binder, its change listener and converter assertions for `owner`.
pub fn binder(owner: &OwnerType, paths: &CratePaths) -> TokenStream {
    let rt = &paths.runtime;
    let vis = &owner.vis;
    let owner_ident = &owner.ident;
    let binder_ident = format_ident!("{}Preferences", owner.ident);
    let listener_ident = format_ident!("{}PreferencesListener", owner.ident);

    let names: Vec<FieldNames> = owner.fields.iter().map(FieldNames::new).collect();
    let target = format_ident!("__target");
    let store = format_ident!("__store");

    let key_consts = names.iter().map(|n| {
        let key = &n.key;
        let value = &n.field.key;
        let doc = format!("Store key of `{}`.", n.field.ident);

        quote! {
            #[doc = #doc]
            pub const #key: &str = #value;
        }
    });

    let helpers = names.iter().map(|n| field_helpers(n, owner_ident, rt));

    let single_ops = names.iter().map(|n| {
        let (read, write, load, stored, key, local) =
            (&n.read, &n.write, &n.load, &n.stored, &n.key, &n.local);
        let assign = n.assign(&target, local);
        let read_doc = format!("Load `{}` from the store into the target.", n.field.ident);
        let write_doc = format!("Save `{}` from the target into the store.", n.field.ident);

        quote! {
            #[doc = #read_doc]
            pub fn #read(&self) -> ::core::result::Result<(), #rt::error::BindError> {
                let (#target, #store) = self.binding.parts()?;
                let #local = Self::#load(#store)?;
                let mut #target = #target.lock();
                #assign

                Ok(())
            }

            #[doc = #write_doc]
            pub fn #write(&self) -> ::core::result::Result<(), #rt::error::BindError> {
                let (#target, #store) = self.binding.parts()?;
                let #local = Self::#stored(&#target.lock())?;
                #store.put_or_remove(Self::#key, #local)?;

                Ok(())
            }
        }
    });

    let loads = names.iter().map(|n| {
        let (load, local) = (&n.load, &n.local);
        quote!(let #local = Self::#load(#store)?;)
    });
    let assigns = names.iter().map(|n| n.assign(&target, &n.local));
    let snapshots = names.iter().map(|n| {
        let (stored, local) = (&n.stored, &n.local);
        quote!(let #local = Self::#stored(&#target)?;)
    });
    let puts = names.iter().map(|n| {
        let (key, local) = (&n.key, &n.local);
        quote!(#store.put_or_remove(Self::#key, #local)?;)
    });
    let zeroes = names.iter().map(|n| {
        let zero = format_ident!("__zero");
        let assign = n.assign(&target, &zero);
        quote! {
            let #zero = ::core::default::Default::default();
            #assign
        }
    });

    let observed: Vec<&FieldNames> = names.iter().filter(|n| n.field.observe.is_some()).collect();
    let (observe_body, listener_impl) = if observed.is_empty() {
        (quote!(self.binding.store().map(|_| ())), quote!())
    } else {
        (
            quote!(self.binding.observe(|target| #listener_ident { target })),
            listener(
                &binder_ident,
                &listener_ident,
                owner_ident,
                &observed,
                rt,
            ),
        )
    };

    let assertions = names.iter().filter_map(|n| converter_assertion(n, rt));

    let binder_doc = format!(
        "Binds [`{owner_ident}`] fields to a preference store."
    );

    quote! {
        #[doc = #binder_doc]
        #vis struct #binder_ident {
            binding: #rt::binder::Binding<#owner_ident>,
        }

        impl #binder_ident {
            #(#key_consts)*

            /// Bind `target` to `store` without reading or writing.
            #[must_use]
            pub fn bind(
                target: &#rt::binder::Shared<#owner_ident>,
                store: &#rt::store::PreferenceStore,
            ) -> Self {
                Self {
                    binding: #rt::binder::Binding::new(target, store),
                }
            }

            /// Load every field into `target`, then release the binding.
            pub fn read(
                target: &#rt::binder::Shared<#owner_ident>,
                store: &#rt::store::PreferenceStore,
            ) -> ::core::result::Result<(), #rt::error::BindError> {
                let mut binder = Self::bind(target, store);
                let result = #rt::binder::PreferenceBinder::read_all(&binder);
                #rt::binder::PreferenceBinder::unbind(&mut binder);

                result
            }

            /// Save every field of `target`, then release the binding.
            pub fn write(
                target: &#rt::binder::Shared<#owner_ident>,
                store: &#rt::store::PreferenceStore,
            ) -> ::core::result::Result<(), #rt::error::BindError> {
                let mut binder = Self::bind(target, store);
                let result = #rt::binder::PreferenceBinder::write_all(&binder);
                #rt::binder::PreferenceBinder::unbind(&mut binder);

                result
            }

            pub fn read_and_bind(
                target: &#rt::binder::Shared<#owner_ident>,
                store: &#rt::store::PreferenceStore,
            ) -> ::core::result::Result<Self, #rt::error::BindError> {
                let binder = Self::bind(target, store);
                #rt::binder::PreferenceBinder::read_all(&binder)?;

                Ok(binder)
            }

            pub fn write_and_bind(
                target: &#rt::binder::Shared<#owner_ident>,
                store: &#rt::store::PreferenceStore,
            ) -> ::core::result::Result<Self, #rt::error::BindError> {
                let binder = Self::bind(target, store);
                #rt::binder::PreferenceBinder::write_all(&binder)?;

                Ok(binder)
            }

            #(#single_ops)*

            #(#helpers)*
        }

        impl #rt::binder::PreferenceBinder for #binder_ident {
            type Target = #owner_ident;

            fn read_all(&self) -> ::core::result::Result<(), #rt::error::BindError> {
                let (#target, #store) = self.binding.parts()?;
                #(#loads)*

                let mut #target = #target.lock();
                #(#assigns)*

                Ok(())
            }

            fn write_all(&self) -> ::core::result::Result<(), #rt::error::BindError> {
                let (#target, #store) = self.binding.parts()?;
                let __guard = #target.lock();
                let #target = &*__guard;
                #(#snapshots)*
                drop(__guard);

                #(#puts)*

                Ok(())
            }

            fn observe_changes(&mut self) -> ::core::result::Result<(), #rt::error::BindError> {
                #observe_body
            }

            fn stop_observe_changes(&mut self) -> ::core::result::Result<(), #rt::error::BindError> {
                self.binding.stop_observing()
            }

            fn set_type_defaults(&self) -> ::core::result::Result<(), #rt::error::BindError> {
                let #target = self.binding.target()?;
                let mut #target = #target.lock();
                #(#zeroes)*

                Ok(())
            }

            fn store(&self) -> ::core::result::Result<&#rt::store::PreferenceStore, #rt::error::BindError> {
                self.binding.store()
            }

            fn unbind(&mut self) {
                self.binding.unbind();
            }
        }

        #listener_impl

        #(#assertions)*
    }
}

// Load and snapshot helpers; the listener reuses them.
fn field_helpers(n: &FieldNames, owner: &Ident, rt: &TokenStream) -> TokenStream {
    let field = n.field;
    let (load, stored, key) = (&n.load, &n.stored, &n.key);
    let ty = &field.ty;
    let native = field.kind.native_tokens();
    let default = &field.default;
    let target = format_ident!("__target");
    let value = n.value_ref(&target);

    let (load_body, stored_body) = match &field.converter {
        Some(converter) => {
            let construct = converter.construct();
            (
                quote! {
                    let converter = #construct;
                    let stored: #native = store.get(Self::#key, #default)?;
                    #rt::transform::read(&converter, Self::#key, stored)
                },
                quote! {
                    let converter = #construct;
                    #rt::transform::write(&converter, Self::#key, #value).map(Some)
                },
            )
        }
        None => (
            quote! {
                let stored: #native = store.get(Self::#key, #default)?;
                Ok(<#ty as #rt::value::FieldValue>::from_native(stored))
            },
            quote!(Ok(<#ty as #rt::value::FieldValue>::to_native(#value))),
        ),
    };

    quote! {
        #[doc(hidden)]
        fn #load(
            store: &#rt::store::PreferenceStore,
        ) -> ::core::result::Result<#ty, #rt::error::StoreError> {
            #load_body
        }

        #[doc(hidden)]
        fn #stored(
            #target: &#owner,
        ) -> ::core::result::Result<::core::option::Option<#native>, #rt::error::StoreError> {
            #stored_body
        }
    }
}

fn listener(
    binder: &Ident,
    listener: &Ident,
    owner: &Ident,
    observed: &[&FieldNames],
    rt: &TokenStream,
) -> TokenStream {
    let target = format_ident!("__target");
    let store = format_ident!("__store");

    // fields sharing a key are refreshed together, in declaration order
    let mut groups: Vec<(&str, Vec<&FieldNames>)> = Vec::new();
    for n in observed {
        match groups.iter_mut().find(|(key, _)| *key == n.field.key) {
            Some((_, fields)) => fields.push(n),
            None => groups.push((&n.field.key, vec![n])),
        }
    }

    let arms = groups.iter().map(|(key, fields)| {
        let loads = fields.iter().map(|n| {
            let (load, local) = (&n.load, &n.local);
            quote!(let #local = #binder::#load(#store)?;)
        });
        let updates = fields.iter().map(|n| update(n, &target));

        quote! {
            #key => {
                #(#loads)*
                let mut #target = #target.lock();
                #(#updates)*
            }
        }
    });

    quote! {
        #[doc(hidden)]
        struct #listener {
            target: #rt::binder::WeakShared<#owner>,
        }

        impl #rt::listener::ChangeListener for #listener {
            fn on_change(
                &self,
                #store: &#rt::store::PreferenceStore,
                key: &str,
            ) -> ::core::result::Result<(), #rt::error::StoreError> {
                let Some(#target) = self.target.upgrade() else {
                    return Ok(());
                };

                match key {
                    #(#arms)*
                    _ => {}
                }

                Ok(())
            }
        }
    }
}

// Assign the fresh value; with a callback, hand it the value it replaced.
fn update(n: &FieldNames, target: &Ident) -> TokenStream {
    let local = &n.local;
    let callback = n
        .field
        .observe
        .as_ref()
        .and_then(|observe| observe.callback.as_ref());

    let Some(callback) = callback else {
        return n.assign(target, local);
    };

    match &n.field.access {
        Access::Direct => {
            let ident = &n.field.ident;
            quote! {
                let old = ::core::mem::replace(&mut #target.#ident, #local);
                #target.#callback(old);
            }
        }
        Access::Accessors { getter, setter } => quote! {
            let old = #target.#getter();
            #target.#setter(#local);
            #target.#callback(old);
        },
    }
}

// Pin a converter to the field's native kind and declared type so contract
// violations point at the `using` argument.
fn converter_assertion(n: &FieldNames, rt: &TokenStream) -> Option<TokenStream> {
    let converter = n.field.converter.as_ref()?;
    let conv_ty = &converter.ty;
    let ty = &n.field.ty;
    let native = n.field.kind.native_tokens();
    let ctor_bound = match converter.ctor {
        crate::transform::Ctor::Default => quote!(+ ::core::default::Default),
        crate::transform::Ctor::New => quote!(),
    };

    Some(quote_spanned! {conv_ty.span()=>
        const _: () = {
            fn assert_converter<C>()
            where
                C: #rt::transform::Transformer<Stored = #native, Value = #ty> #ctor_bound,
            {
            }
            let _ = assert_converter::<#conv_ty>;
        };
    })
}

///
/// TESTS
///
