use derive_more::Display;
use proc_macro2::{Span, TokenStream};
use quote::ToTokens;

///
/// ErrorKind
///
/// Diagnostic families raised while expanding `#[preferences]`.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorKind {
    AccessorMissing,
    Structural,
    SubscriptionCardinality,
    SubscriptionSignature,
    TransformContract,
    TypeMismatch,
}

///
/// Diagnostic
///
/// A spanned compile error tagged with its family. Every diagnostic aborts
/// the binder of the owner it belongs to.
///

#[derive(Clone, Debug)]
pub struct Diagnostic {
    #[cfg_attr(not(test), allow(dead_code))]
    kind: ErrorKind,
    error: syn::Error,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            error: syn::Error::new(span, message.into()),
        }
    }

    pub fn spanned<T: ToTokens>(kind: ErrorKind, tokens: T, message: impl Into<String>) -> Self {
        Self {
            kind,
            error: syn::Error::new_spanned(tokens, message.into()),
        }
    }

    /// Attribute arguments that darling could not parse.
    pub fn from_darling(err: darling::Error) -> Self {
        let mut combined: Option<syn::Error> = None;
        for single in err {
            let next = syn::Error::new(single.span(), single.to_string());
            match &mut combined {
                Some(error) => error.combine(next),
                None => combined = Some(next),
            }
        }

        Self {
            kind: ErrorKind::Structural,
            error: combined
                .unwrap_or_else(|| syn::Error::new(Span::call_site(), "invalid attribute")),
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn to_compile_error(&self) -> TokenStream {
        self.error.to_compile_error()
    }
}
