use prefbind_core::kind::StorageKind;
use quote::ToTokens;
use syn::{
    GenericArgument, Path, PathArguments, PathSegment, Type, Visibility,
    visit_mut::{self, VisitMut},
};

// Standard paths that name the same type as their final segment.
const STD_ALIASES: &[&[&str]] = &[
    &["std", "string", "String"],
    &["alloc", "string", "String"],
    &["std", "option", "Option"],
    &["core", "option", "Option"],
    &["std", "primitive", "*"],
    &["core", "primitive", "*"],
];

///
/// Canonicalizer
///
/// Rewrites a type so spelling differences that name the same type compare
/// equal: redundant parentheses and groups, and fully qualified std paths.
///

struct Canonicalizer;

impl VisitMut for Canonicalizer {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        loop {
            let inner = match ty {
                Type::Paren(paren) => (*paren.elem).clone(),
                Type::Group(group) => (*group.elem).clone(),
                _ => break,
            };
            *ty = inner;
        }

        visit_mut::visit_type_mut(self, ty);
    }

    fn visit_path_mut(&mut self, path: &mut Path) {
        if is_std_alias(path)
            && let Some(last) = path.segments.last().cloned()
        {
            path.leading_colon = None;
            path.segments = std::iter::once(last).collect();
        }

        visit_mut::visit_path_mut(self, path);
    }
}

fn is_std_alias(path: &Path) -> bool {
    let idents: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    let prefix_plain = path
        .segments
        .iter()
        .take(path.segments.len().saturating_sub(1))
        .all(|s| s.arguments.is_none());

    prefix_plain
        && STD_ALIASES.iter().any(|alias| {
            alias.len() == idents.len()
                && alias
                    .iter()
                    .zip(&idents)
                    .all(|(want, got)| *want == "*" || want == got)
        })
}

/// Canonical token form of `ty`, used for type identity.
#[must_use]
pub fn canonical(ty: &Type) -> String {
    let mut ty = ty.clone();
    Canonicalizer.visit_type_mut(&mut ty);

    ty.to_token_stream().to_string()
}

/// Whether two type references name the same type.
#[must_use]
pub fn same_type(a: &Type, b: &Type) -> bool {
    canonical(a) == canonical(b)
}

/// Human-readable rendering for diagnostics.
#[must_use]
pub fn display(ty: &Type) -> String {
    canonical(ty)
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
        .replace(" :: ", "::")
}

///
/// NativeForm
///
/// How a declared type holds a storage kind without a converter.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NativeForm {
    pub kind: StorageKind,
    #[cfg_attr(not(test), allow(dead_code))]
    pub optional: bool,
}

/// Classify `ty` as a native kind or its `Option` form.
#[must_use]
pub fn native_form(ty: &Type) -> Option<NativeForm> {
    let mut ty = ty.clone();
    Canonicalizer.visit_type_mut(&mut ty);

    let segment = single_segment(&ty)?;
    if segment.ident == "Option" {
        let inner = single_type_arg(segment)?;
        let inner_segment = single_segment(inner)?;

        return plain_kind(inner_segment).map(|kind| NativeForm {
            kind,
            optional: true,
        });
    }

    plain_kind(segment).map(|kind| NativeForm {
        kind,
        optional: false,
    })
}

fn single_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() && path.path.segments.len() == 1 => {
            path.path.segments.first()
        }
        _ => None,
    }
}

fn single_type_arg(segment: &PathSegment) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }

    match args.args.first() {
        Some(GenericArgument::Type(ty)) => Some(ty),
        _ => None,
    }
}

fn plain_kind(segment: &PathSegment) -> Option<StorageKind> {
    if !segment.arguments.is_none() {
        return None;
    }

    StorageKind::ALL
        .into_iter()
        .find(|kind| segment.ident == kind.native_type())
}

/// Inherited visibility and `pub(self)` are private; everything else is not.
#[must_use]
pub fn is_private(vis: &Visibility) -> bool {
    match vis {
        Visibility::Inherited => true,
        Visibility::Restricted(restricted) => restricted.path.is_ident("self"),
        Visibility::Public(_) => false,
    }
}

///
/// TESTS
///
