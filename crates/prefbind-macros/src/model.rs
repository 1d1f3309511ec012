use crate::{
    args::{ObserveArgs, PrefArgs, TransformArgs},
    error::Diagnostic,
    transform::Converter,
};
use convert_case::{Case, Casing};
use prefbind_core::kind::StorageKind;
use proc_macro2::{Literal, Span, TokenStream};
use quote::{ToTokens, quote};
use syn::{Generics, Ident, Type, Visibility, ext::IdentExt};

pub const OBSERVE: &str = "observe";
pub const SUBSCRIBE: &str = "subscribe";
pub const TRANSFORM: &str = "transform";

/// Marker attributes consumed by `#[preferences]`.
pub const MARKERS: [&str; 8] = [
    "int_pref",
    "long_pref",
    "float_pref",
    "bool_pref",
    "string_pref",
    OBSERVE,
    SUBSCRIBE,
    TRANSFORM,
];

///
/// KindExt
///
/// Macro-side vocabulary for storage kinds.
///

pub trait KindExt: Sized {
    fn from_tag(tag: &str) -> Option<Self>;

    /// Marker attribute name, e.g. `int_pref`.
    fn tag(self) -> &'static str;

    /// Short name used in diagnostics, e.g. "int".
    fn label(self) -> &'static str;

    fn native_tokens(self) -> TokenStream;
}

impl KindExt for StorageKind {
    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Integer => "int_pref",
            Self::Long => "long_pref",
            Self::Float => "float_pref",
            Self::Boolean => "bool_pref",
            Self::String => "string_pref",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }

    fn native_tokens(self) -> TokenStream {
        match self {
            Self::Integer => quote!(i32),
            Self::Long => quote!(i64),
            Self::Float => quote!(f32),
            Self::Boolean => quote!(bool),
            Self::String => quote!(::std::string::String),
        }
    }
}

///
/// Scan
///
/// Raw scanner output: owners in first-seen order plus diagnostics for
/// markers that sit outside any owner.
///

#[derive(Debug, Default)]
pub struct Scan {
    pub owners: Vec<RawOwner>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Scan {
    pub fn owner_mut(&mut self, ident: &Ident) -> Option<&mut RawOwner> {
        self.owners.iter_mut().find(|owner| owner.ident == *ident)
    }
}

///
/// RawOwner
///

#[derive(Debug)]
pub struct RawOwner {
    pub ident: Ident,
    pub vis: Visibility,
    pub generics: Generics,
    pub fields: Vec<RawField>,
    pub errors: Vec<Diagnostic>,
}

impl RawOwner {
    pub fn field_mut(&mut self, ident: &Ident) -> Option<&mut RawField> {
        self.fields.iter_mut().find(|field| field.ident == *ident)
    }
}

///
/// RawField
///
/// A tagged struct field as declared, before any rule has been checked.
///

#[derive(Debug)]
pub struct RawField {
    pub ident: Ident,
    pub vis: Visibility,
    pub ty: Type,
    pub kind: StorageKind,
    pub pref: PrefArgs,
    pub observe: Option<ObserveArgs>,
    pub transform: Option<(TransformArgs, Span)>,
}

impl RawField {
    /// Configured key, or the field name when unset or empty.
    pub fn key(&self) -> String {
        match self.pref.key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => self.ident.unraw().to_string(),
        }
    }
}

///
/// OwnerType
///
/// A struct whose fields all passed validation; produces one binder.
///

#[derive(Debug)]
pub struct OwnerType {
    pub ident: Ident,
    pub vis: Visibility,
    pub fields: Vec<PrefField>,
}

///
/// PrefField
///

#[derive(Debug)]
pub struct PrefField {
    pub ident: Ident,
    pub ty: Type,
    pub kind: StorageKind,
    pub key: String,
    pub default: DefaultValue,
    pub access: Access,
    pub converter: Option<Converter>,
    pub observe: Option<Observe>,
}

impl PrefField {
    /// Name of the generated key constant, e.g. `USER_NAME_KEY`.
    pub fn key_const(&self) -> String {
        format!("{}_KEY", self.ident.unraw().to_string().to_case(Case::UpperSnake))
    }

    /// Name of a generated per-field operation, e.g. `read_user_name`.
    pub fn op_name(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.ident.unraw())
    }
}

///
/// Access
///

#[derive(Debug)]
pub enum Access {
    Direct,
    Accessors { getter: Ident, setter: Ident },
}

///
/// Observe
///

#[derive(Debug)]
pub struct Observe {
    pub callback: Option<Ident>,
}

///
/// DefaultValue
///
/// A checked default literal, typed by storage kind.
///

#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Boolean(bool),
    String(String),
}

impl DefaultValue {
    pub fn zero(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Integer => Self::Integer(0),
            StorageKind::Long => Self::Long(0),
            StorageKind::Float => Self::Float(0.0),
            StorageKind::Boolean => Self::Boolean(false),
            StorageKind::String => Self::String(String::new()),
        }
    }
}

impl ToTokens for DefaultValue {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Self::Integer(v) => Literal::i32_suffixed(*v).into_token_stream(),
            Self::Long(v) => Literal::i64_suffixed(*v).into_token_stream(),
            Self::Float(v) => Literal::f32_suffixed(*v).into_token_stream(),
            Self::Boolean(v) => quote!(#v),
            Self::String(v) => quote!(::std::string::String::from(#v)),
        });
    }
}

///
/// TESTS
///
