use crate::{
    args::TransformArgs,
    error::{Diagnostic, ErrorKind},
    index::{LocalKind, ModuleIndex},
    types::{display, is_private},
};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{AngleBracketedGenericArguments, GenericArgument, PathArguments, Type, TypePath};

///
/// Ctor
///
/// How generated code obtains a converter instance.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ctor {
    Default,
    New,
}

///
/// Converter
///
/// A resolved `#[transform]`: the fully applied converter type and its
/// constructor.
///

#[derive(Clone, Debug)]
pub struct Converter {
    pub ty: Type,
    pub ctor: Ctor,
}

impl Converter {
    /// Expression constructing the converter.
    pub fn construct(&self) -> TokenStream {
        let ty = &self.ty;

        match self.ctor {
            Ctor::Default => quote!(<#ty as ::core::default::Default>::default()),
            Ctor::New => quote!(<#ty>::new()),
        }
    }
}

fn contract(span: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(ErrorKind::TransformContract, span, message)
}

/// Resolve a field's `#[transform(...)]` arguments against the module.
pub fn resolve(
    args: &TransformArgs,
    span: Span,
    index: &ModuleIndex,
) -> Result<Converter, Diagnostic> {
    let Some(using) = args.using.get() else {
        return Err(contract(span, "#[transform] requires `using = <converter type>`"));
    };

    let Type::Path(TypePath { qself: None, path }) = using else {
        return Err(Diagnostic::spanned(
            ErrorKind::TransformContract,
            using,
            format!(
                "converter `{}` must be a concrete named type",
                display(using)
            ),
        ));
    };

    if args.type_param2.is_set() && !args.type_param1.is_set() {
        return Err(contract(span, "`type_param2` requires `type_param1`"));
    }

    let Some(last) = path.segments.last() else {
        return Err(contract(span, "converter path is empty"));
    };
    let inline_args = match &last.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter(|arg| matches!(arg, GenericArgument::Type(_)))
            .count(),
        PathArguments::None => 0,
        PathArguments::Parenthesized(_) => {
            return Err(Diagnostic::spanned(
                ErrorKind::TransformContract,
                using,
                "converter must be a named type",
            ));
        }
    };

    let slot_args: Vec<Type> = [&args.type_param1, &args.type_param2]
        .into_iter()
        .filter_map(|slot| slot.get().cloned())
        .collect();
    if inline_args > 0 && !slot_args.is_empty() {
        return Err(contract(
            span,
            "converter type arguments given both inline and via `type_param1`/`type_param2`",
        ));
    }

    let mut ty = using.clone();
    if !slot_args.is_empty()
        && let Type::Path(TypePath { path, .. }) = &mut ty
        && let Some(last) = path.segments.last_mut()
    {
        let generic: AngleBracketedGenericArguments = syn::parse_quote!(<#(#slot_args),*>);
        last.arguments = PathArguments::AngleBracketed(generic);
    }
    let supplied = inline_args + slot_args.len();

    // converters declared elsewhere are checked by the generated assertion
    let local = if path.segments.len() == 1 {
        index.local_type(&last.ident)
    } else {
        None
    };
    let Some(local) = local else {
        return Ok(Converter {
            ty,
            ctor: Ctor::Default,
        });
    };

    let name = last.ident.to_string();
    if local.kind == LocalKind::Trait {
        return Err(Diagnostic::spanned(
            ErrorKind::TransformContract,
            using,
            format!("converter `{name}` must be a concrete type, not a trait"),
        ));
    }

    if supplied != local.type_params {
        return Err(Diagnostic::spanned(
            ErrorKind::TransformContract,
            using,
            format!(
                "converter `{name}` expects {} type argument(s), found {supplied}",
                local.type_params
            ),
        ));
    }

    let ctor = if index.has_default(&last.ident) {
        Ctor::Default
    } else if has_new(index, &last.ident) {
        Ctor::New
    } else if local.kind == LocalKind::Alias {
        Ctor::Default
    } else {
        return Err(Diagnostic::spanned(
            ErrorKind::TransformContract,
            using,
            format!(
                "converter `{name}` must expose a no-argument constructor: derive or implement `Default`, or add `pub fn new() -> Self`"
            ),
        ));
    };

    Ok(Converter { ty, ctor })
}

fn has_new(index: &ModuleIndex, ident: &syn::Ident) -> bool {
    index.method(ident, "new").is_some_and(|method| {
        !is_private(&method.vis)
            && method.sig.inputs.is_empty()
            && method.sig.generics.params.is_empty()
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::parse_attr;
    use quote::ToTokens;
    use syn::{Attribute, ItemMod, parse_quote};

    fn module() -> ItemMod {
        parse_quote! {
            mod prefs {
                #[derive(Default)]
                pub struct Plain;

                #[derive(Default)]
                pub struct Pair<A, B>(A, B);

                pub struct WithNew;
                impl WithNew {
                    pub fn new() -> Self { Self }
                }

                pub struct HiddenNew;
                impl HiddenNew {
                    fn new() -> Self { Self }
                }

                pub trait Codec {}
            }
        }
    }

    fn run(attr: Attribute) -> Result<Converter, Diagnostic> {
        let module = module();
        let index = ModuleIndex::build(&module.content.as_ref().unwrap().1);
        let args: TransformArgs = parse_attr(&attr).unwrap();

        resolve(&args, Span::call_site(), &index)
    }

    fn contract_message(attr: Attribute) -> String {
        let err = run(attr).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransformContract);

        err.message()
    }

    #[test]
    fn local_default_converter() {
        let conv = run(parse_quote!(#[transform(using = Plain)])).unwrap();

        assert_eq!(conv.ctor, Ctor::Default);
        assert_eq!(conv.ty.to_token_stream().to_string(), "Plain");
    }

    #[test]
    fn slots_become_type_arguments() {
        let conv =
            run(parse_quote!(#[transform(using = Pair, type_param1 = i32, type_param2 = "Vec<u8>")]))
                .unwrap();

        assert_eq!(display(&conv.ty), "Pair<i32, Vec<u8>>");
    }

    #[test]
    fn inline_arguments_are_accepted() {
        let conv = run(parse_quote!(#[transform(using = "Pair<i32, bool>")])).unwrap();

        assert_eq!(conv.ctor, Ctor::Default);
    }

    #[test]
    fn new_constructor_is_used_when_no_default() {
        let conv = run(parse_quote!(#[transform(using = WithNew)])).unwrap();

        assert_eq!(conv.ctor, Ctor::New);
        assert_eq!(
            conv.construct().to_string(),
            quote!(<WithNew>::new()).to_string()
        );
    }

    #[test]
    fn external_converters_default() {
        let conv = run(parse_quote!(#[transform(using = other::Codec)])).unwrap();

        assert_eq!(conv.ctor, Ctor::Default);
    }

    #[test]
    fn contract_violations() {
        assert!(contract_message(parse_quote!(#[transform])).contains("requires `using"));
        assert!(contract_message(parse_quote!(#[transform(using = Codec)])).contains("not a trait"));
        assert!(
            contract_message(parse_quote!(#[transform(using = HiddenNew)]))
                .contains("no-argument constructor")
        );
        assert!(
            contract_message(parse_quote!(#[transform(using = Pair, type_param1 = i32)]))
                .contains("expects 2 type argument(s), found 1")
        );
        assert!(
            contract_message(parse_quote!(#[transform(using = Pair, type_param2 = i32)]))
                .contains("requires `type_param1`")
        );
        assert!(
            contract_message(
                parse_quote!(#[transform(using = "Pair<i32, i32>", type_param1 = i32)])
            )
            .contains("both inline")
        );
    }
}
