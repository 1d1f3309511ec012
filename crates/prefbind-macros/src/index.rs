use crate::{
    args::{SubscribeArgs, parse_attr},
    error::Diagnostic,
    model::SUBSCRIBE,
    types::is_private,
};
use proc_macro2::Span;
use syn::{
    Attribute, FnArg, Generics, Ident, ImplItem, Item, ItemImpl, Path, Signature, Token, Type,
    Visibility, punctuated::Punctuated, spanned::Spanned,
};

///
/// Method
///
/// A method declared in an inherent impl block of the module.
///

#[derive(Debug)]
pub struct Method {
    pub self_ty: Ident,
    pub vis: Visibility,
    pub sig: Signature,
    pub subscribe: Option<Subscription>,
}

impl Method {
    pub fn is_private(&self) -> bool {
        is_private(&self.vis)
    }

    /// Parameters after the receiver.
    pub fn params(&self) -> impl Iterator<Item = &Type> {
        self.sig.inputs.iter().filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(&*pat.ty),
            FnArg::Receiver(_) => None,
        })
    }

    pub fn receiver(&self) -> Option<&syn::Receiver> {
        self.sig.receiver()
    }
}

///
/// Subscription
///

#[derive(Debug)]
pub struct Subscription {
    pub tag: String,
    pub span: Span,
}

///
/// LocalKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LocalKind {
    Alias,
    Enum,
    Struct,
    Trait,
    Union,
}

///
/// LocalType
///
/// A type or trait declared directly in the module.
///

#[derive(Debug)]
pub struct LocalType {
    pub ident: Ident,
    pub kind: LocalKind,
    pub type_params: usize,
    pub derives_default: bool,
}

///
/// ModuleIndex
///
/// Everything the resolvers need to know about the module's declarations
/// besides the tagged fields themselves.
///

#[derive(Debug, Default)]
pub struct ModuleIndex {
    methods: Vec<Method>,
    types: Vec<LocalType>,
    default_impls: Vec<Ident>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleIndex {
    pub fn build(items: &[Item]) -> Self {
        let mut index = Self::default();

        for item in items {
            match item {
                Item::Struct(item) => {
                    index.push_type(&item.ident, LocalKind::Struct, &item.generics, &item.attrs);
                }
                Item::Enum(item) => {
                    index.push_type(&item.ident, LocalKind::Enum, &item.generics, &item.attrs);
                }
                Item::Union(item) => {
                    index.push_type(&item.ident, LocalKind::Union, &item.generics, &item.attrs);
                }
                Item::Type(item) => {
                    index.push_type(&item.ident, LocalKind::Alias, &item.generics, &item.attrs);
                }
                Item::Trait(item) => {
                    index.push_type(&item.ident, LocalKind::Trait, &item.generics, &item.attrs);
                }
                Item::Impl(item) => index.push_impl(item),
                _ => {}
            }
        }

        index
    }

    fn push_type(&mut self, ident: &Ident, kind: LocalKind, generics: &Generics, attrs: &[Attribute]) {
        self.types.push(LocalType {
            ident: ident.clone(),
            kind,
            type_params: generics.type_params().count(),
            derives_default: derives_default(attrs),
        });
    }

    fn push_impl(&mut self, item: &ItemImpl) {
        let Some(self_ty) = impl_self_ident(&item.self_ty) else {
            return;
        };

        if let Some((_, trait_path, _)) = &item.trait_ {
            if last_ident_is(trait_path, "Default") {
                self.default_impls.push(self_ty.clone());
            }
            return;
        }

        for impl_item in &item.items {
            let ImplItem::Fn(func) = impl_item else {
                continue;
            };

            // a repeated marker keeps the last parsable one
            let mut subscribe = None;
            for attr in func.attrs.iter().filter(|attr| attr.path().is_ident(SUBSCRIBE)) {
                match parse_attr::<SubscribeArgs>(attr) {
                    Ok(args) => {
                        subscribe = Some(Subscription {
                            tag: args.tag,
                            span: attr.span(),
                        });
                    }
                    Err(err) => self.diagnostics.push(Diagnostic::from_darling(err)),
                }
            }

            self.methods.push(Method {
                self_ty: self_ty.clone(),
                vis: func.vis.clone(),
                sig: func.sig.clone(),
                subscribe,
            });
        }
    }

    pub fn methods_of<'a, 'b>(
        &'a self,
        ty: &'b Ident,
    ) -> impl Iterator<Item = &'a Method> {
        self.methods.iter().filter(move |method| method.self_ty == *ty)
    }

    pub fn method<'a>(&'a self, ty: &Ident, name: &str) -> Option<&'a Method> {
        self.methods_of(ty).find(|method| method.sig.ident == name)
    }

    pub fn local_type(&self, ident: &Ident) -> Option<&LocalType> {
        self.types.iter().find(|ty| ty.ident == *ident)
    }

    pub fn has_default(&self, ident: &Ident) -> bool {
        self.local_type(ident).is_some_and(|ty| ty.derives_default)
            || self.default_impls.iter().any(|ty| ty == ident)
    }
}

/// The type an impl block is written for, when it is a plain local name.
pub fn impl_self_ident(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(path) if path.qself.is_none() && path.path.segments.len() == 1 => {
            path.path.segments.first().map(|segment| &segment.ident)
        }
        _ => None,
    }
}

fn last_ident_is(path: &Path, name: &str) -> bool {
    path.segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

fn derives_default(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| last_ident_is(&path, "Default"))
}

///
/// TESTS
///
