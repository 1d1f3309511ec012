use darling::{Error as DarlingError, FromMeta, ast::NestedMeta};
use proc_macro2::TokenStream;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Path, Type, TypePath};

/// Parse marker arguments. A bare marker (`#[observe]`) parses as an empty
/// argument list so required arguments still report as missing.
pub fn parse_attr<T: FromMeta>(attr: &Attribute) -> Result<T, DarlingError> {
    match &attr.meta {
        Meta::Path(_) => T::from_list(&[]),
        Meta::List(list) => {
            let items = NestedMeta::parse_meta_list(list.tokens.clone())?;
            T::from_list(&items)
        }
        Meta::NameValue(_) => {
            Err(DarlingError::custom("expected a parenthesized argument list").with_span(attr))
        }
    }
    .map_err(|err| err.with_span(attr))
}

///
/// PreferencesArgs
///
/// Arguments of the `#[preferences]` attribute itself.
///

#[derive(Debug, Default, FromMeta)]
pub struct PreferencesArgs {
    #[darling(default, rename = "crate")]
    pub krate: Option<Path>,
}

impl PreferencesArgs {
    pub fn parse(attr: TokenStream) -> Result<Self, DarlingError> {
        let items = NestedMeta::parse_meta_list(attr)?;

        Self::from_list(&items)
    }
}

///
/// PrefArgs
///
/// `#[int_pref(key = "..", default = ..)]` and its siblings. Both arguments
/// are optional; the key falls back to the field name and the default to the
/// kind's zero.
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct PrefArgs {
    #[darling(default)]
    pub key: Option<String>,

    #[darling(default)]
    pub default: Option<DefaultArg>,
}

///
/// DefaultArg
///
/// The raw default expression. Literal checks happen during validation, once
/// the storage kind is settled.
///

#[derive(Clone, Debug)]
pub struct DefaultArg(pub Expr);

impl FromMeta for DefaultArg {
    fn from_expr(expr: &Expr) -> Result<Self, DarlingError> {
        Ok(Self(expr.clone()))
    }
}

///
/// ObserveArgs
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct ObserveArgs {
    #[darling(default)]
    pub tag: Option<String>,
}

///
/// SubscribeArgs
///

#[derive(Clone, Debug, FromMeta)]
pub struct SubscribeArgs {
    pub tag: String,
}

///
/// TransformArgs
///
/// Every slot is optional at parse time; the transform resolver decides
/// which combinations are legal.
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct TransformArgs {
    #[darling(default)]
    pub using: TypeSlot,

    #[darling(default)]
    pub type_param1: TypeSlot,

    #[darling(default)]
    pub type_param2: TypeSlot,
}

///
/// TypeSlot
///
/// A type-valued attribute argument: either a resolved type reference or the
/// not-set sentinel. Accepts `slot = path::Type` and `slot = "Type<..>"`.
///

#[derive(Clone, Debug, Default)]
pub enum TypeSlot {
    Set(Type),
    #[default]
    NotSet,
}

impl TypeSlot {
    pub const fn get(&self) -> Option<&Type> {
        match self {
            Self::Set(ty) => Some(ty),
            Self::NotSet => None,
        }
    }

    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

impl FromMeta for TypeSlot {
    fn from_expr(expr: &Expr) -> Result<Self, DarlingError> {
        match expr {
            Expr::Path(path) if path.qself.is_none() => Ok(Self::Set(Type::Path(TypePath {
                qself: None,
                path: path.path.clone(),
            }))),
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => lit
                .parse::<Type>()
                .map(Self::Set)
                .map_err(|err| DarlingError::custom(err.to_string()).with_span(lit)),
            Expr::Group(group) => Self::from_expr(&group.expr),
            _ => Err(DarlingError::unexpected_expr_type(expr)),
        }
    }
}

///
/// TESTS
///
