use crate::{
    error::{Diagnostic, ErrorKind},
    index::ModuleIndex,
    types::{display, same_type},
};
use syn::{Ident, Type};

/// Find the callback subscribed to `tag` on `owner`.
///
/// An empty tag never matches. Exactly one candidate must take a reference
/// receiver plus one parameter of the field's declared type.
pub fn resolve(
    owner: &Ident,
    tag: &str,
    field_ty: &Type,
    index: &ModuleIndex,
) -> Result<Option<Ident>, Diagnostic> {
    if tag.is_empty() {
        return Ok(None);
    }

    let candidates: Vec<_> = index
        .methods_of(owner)
        .filter_map(|method| {
            method
                .subscribe
                .as_ref()
                .filter(|sub| sub.tag == tag)
                .map(|sub| (method, sub))
        })
        .collect();

    let method = match candidates.as_slice() {
        [] => return Ok(None),
        [(method, _)] => *method,
        [(first, sub), rest @ ..] => {
            let others = rest
                .iter()
                .map(|(method, _)| format!("`{}`", method.sig.ident))
                .collect::<Vec<_>>()
                .join(", ");

            return Err(Diagnostic::new(
                ErrorKind::SubscriptionCardinality,
                sub.span,
                format!(
                    "ambiguous callback binding for tag '{tag}': `{}` conflicts with {others}",
                    first.sig.ident
                ),
            ));
        }
    };

    let signature = |message: String| {
        Err(Diagnostic::spanned(
            ErrorKind::SubscriptionSignature,
            &method.sig,
            message,
        ))
    };
    let name = &method.sig.ident;

    if method.is_private() {
        return signature(format!("callback `{name}` for tag '{tag}' must not be private"));
    }

    let by_reference = method
        .receiver()
        .is_some_and(|receiver| matches!(*receiver.ty, Type::Reference(_)));
    if !by_reference {
        return signature(format!(
            "callback `{name}` for tag '{tag}' must take `&self` or `&mut self`"
        ));
    }

    let params: Vec<&Type> = method.params().collect();
    match params.as_slice() {
        [param] if same_type(param, field_ty) => {}
        _ => {
            return signature(format!(
                "callback `{name}` for tag '{tag}' must take exactly one parameter of type `{}`",
                display(field_ty)
            ));
        }
    }

    Ok(Some(name.clone()))
}

///
/// TESTS
///
