use crate::{
    error::{Diagnostic, ErrorKind},
    index::{Method, ModuleIndex},
    model::{Access, DefaultValue, KindExt, Observe, OwnerType, PrefField, RawField, RawOwner, Scan},
    subscribe, transform,
    types::{display, is_private, native_form, same_type},
};
use prefbind_core::kind::StorageKind;
use quote::ToTokens;
use syn::{Expr, ExprLit, ExprUnary, Ident, Lit, ReturnType, Type, UnOp, ext::IdentExt};

///
/// Outcome
///
/// Owners that passed every rule, plus all diagnostics of the pass.
///

#[derive(Debug, Default)]
pub struct Outcome {
    pub owners: Vec<OwnerType>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate and resolve every scanned owner. A diagnostic drops the binder of
/// its own owner only.
pub fn validate(scan: Scan, index: &ModuleIndex) -> Outcome {
    let mut outcome = Outcome {
        owners: Vec::new(),
        diagnostics: scan.diagnostics,
    };

    for owner in scan.owners {
        let RawOwner {
            ident,
            vis,
            generics,
            fields: raw_fields,
            mut errors,
        } = owner;

        let mut fields = Vec::with_capacity(raw_fields.len());
        if generics.params.is_empty() {
            for raw in &raw_fields {
                match validate_field(&ident, raw, index) {
                    Ok(field) => fields.push(field),
                    Err(err) => errors.push(err),
                }
            }
        } else {
            errors.push(Diagnostic::spanned(
                ErrorKind::Structural,
                &generics,
                format!("preference owner `{ident}` must be concrete; remove its generic parameters"),
            ));
        }

        if errors.is_empty() {
            errors = check_generated_names(&fields);
        }

        if errors.is_empty() {
            outcome.owners.push(OwnerType { ident, vis, fields });
        } else {
            outcome.diagnostics.extend(errors);
        }
    }

    outcome
}

/// Methods every binder declares itself.
const BINDER_METHODS: [&str; 12] = [
    "bind",
    "read",
    "write",
    "read_and_bind",
    "write_and_bind",
    "read_all",
    "write_all",
    "observe_changes",
    "stop_observe_changes",
    "set_type_defaults",
    "store",
    "unbind",
];

// Per-field operations and key constants share the binder's namespace.
fn check_generated_names(fields: &[PrefField]) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    let mut consts: Vec<(String, &Ident)> = Vec::new();

    for field in fields {
        let name = field.ident.unraw();
        for op in [field.op_name("read"), field.op_name("write")] {
            if BINDER_METHODS.contains(&op.as_str()) {
                errors.push(Diagnostic::spanned(
                    ErrorKind::Structural,
                    &field.ident,
                    format!("field `{name}` generates `{op}`, which clashes with a binder method; rename the field"),
                ));
            }
        }

        let key_const = field.key_const();
        match consts.iter().find(|(taken, _)| *taken == key_const) {
            Some((_, other)) => errors.push(Diagnostic::spanned(
                ErrorKind::Structural,
                &field.ident,
                format!(
                    "fields `{}` and `{name}` both generate `{key_const}`; rename one of them",
                    other.unraw()
                ),
            )),
            None => consts.push((key_const, &field.ident)),
        }
    }

    errors
}

/// Check one field; the first failing rule is the only one reported.
pub fn validate_field(
    owner: &Ident,
    raw: &RawField,
    index: &ModuleIndex,
) -> Result<PrefField, Diagnostic> {
    if let Type::Reference(reference) = &raw.ty
        && reference.mutability.is_none()
    {
        return Err(Diagnostic::spanned(
            ErrorKind::Structural,
            &raw.ty,
            "preference field must not be immutable; shared references cannot be assigned",
        ));
    }

    let converter = match &raw.transform {
        Some((args, span)) => Some(transform::resolve(args, *span, index)?),
        None => {
            check_native_type(raw)?;
            None
        }
    };

    let access = if is_private(&raw.vis) {
        check_accessors(owner, raw, index)?
    } else {
        Access::Direct
    };

    let default = match &raw.pref.default {
        Some(arg) => default_value(raw.kind, &arg.0)?,
        None => DefaultValue::zero(raw.kind),
    };

    let observe = match &raw.observe {
        Some(args) => {
            let tag = args.tag.clone().unwrap_or_else(|| raw.ident.unraw().to_string());
            let callback = subscribe::resolve(owner, &tag, &raw.ty, index)?;

            Some(Observe { callback })
        }
        None => None,
    };

    Ok(PrefField {
        ident: raw.ident.clone(),
        ty: raw.ty.clone(),
        kind: raw.kind,
        key: raw.key(),
        default,
        access,
        converter,
        observe,
    })
}

fn check_native_type(raw: &RawField) -> Result<(), Diagnostic> {
    match native_form(&raw.ty) {
        Some(form) if form.kind == raw.kind => Ok(()),
        _ => {
            let native = raw.kind.native_type();

            Err(Diagnostic::spanned(
                ErrorKind::TypeMismatch,
                &raw.ty,
                format!(
                    "field type `{}` is incompatible with {} preference; expected `{native}` or `Option<{native}>`, or add #[transform(...)]",
                    display(&raw.ty),
                    raw.kind.label(),
                ),
            ))
        }
    }
}

fn check_accessors(owner: &Ident, raw: &RawField, index: &ModuleIndex) -> Result<Access, Diagnostic> {
    let name = raw.ident.unraw();
    let getter = format!("get_{name}");
    let setter = format!("set_{name}");

    let getter_ok = index
        .method(owner, &getter)
        .is_some_and(|method| is_getter(method, &raw.ty));
    let setter_ok = index
        .method(owner, &setter)
        .is_some_and(|method| is_setter(method, &raw.ty));

    if getter_ok && setter_ok {
        return Ok(Access::Accessors {
            getter: Ident::new(&getter, raw.ident.span()),
            setter: Ident::new(&setter, raw.ident.span()),
        });
    }

    let ty = display(&raw.ty);
    Err(Diagnostic::spanned(
        ErrorKind::AccessorMissing,
        &raw.ident,
        format!(
            "private field `{name}` requires a non-private accessor `{getter}(&self) -> {ty}` and mutator `{setter}(&mut self, value: {ty})`"
        ),
    ))
}

fn receiver_is(method: &Method, mutable: bool) -> bool {
    method.receiver().is_some_and(|receiver| match &*receiver.ty {
        Type::Reference(reference) => reference.mutability.is_some() == mutable,
        _ => false,
    })
}

fn is_getter(method: &Method, ty: &Type) -> bool {
    !method.is_private()
        && method.sig.generics.params.is_empty()
        && receiver_is(method, false)
        && method.params().next().is_none()
        && matches!(&method.sig.output, ReturnType::Type(_, out) if same_type(out, ty))
}

fn is_setter(method: &Method, ty: &Type) -> bool {
    let params: Vec<&Type> = method.params().collect();
    let returns_unit = match &method.sig.output {
        ReturnType::Default => true,
        ReturnType::Type(_, out) => matches!(&**out, Type::Tuple(tuple) if tuple.elems.is_empty()),
    };

    !method.is_private()
        && method.sig.generics.params.is_empty()
        && receiver_is(method, true)
        && matches!(params.as_slice(), [param] if same_type(param, ty))
        && returns_unit
}

/// Check a configured default against the field's storage kind.
pub fn default_value(kind: StorageKind, expr: &Expr) -> Result<DefaultValue, Diagnostic> {
    let mismatch = |expected: &str| {
        Diagnostic::spanned(
            ErrorKind::TypeMismatch,
            expr,
            format!(
                "default `{}` for {} preference must be {expected}",
                expr.to_token_stream(),
                kind.label()
            ),
        )
    };
    let (negative, lit) = literal(expr).ok_or_else(|| mismatch("a literal"))?;

    match (kind, lit) {
        (StorageKind::Integer | StorageKind::Long, Lit::Int(lit)) => {
            let suffix = lit.suffix();
            if !suffix.is_empty() && suffix != kind.native_type() {
                return Err(mismatch(&format!("an unsuffixed or `{}` integer literal", kind.native_type())));
            }
            let magnitude = lit.base10_parse::<i128>().map_err(|err| mismatch(&err.to_string()))?;
            let value = if negative { -magnitude } else { magnitude };
            let range = || mismatch(&format!("in range of `{}`", kind.native_type()));

            if kind == StorageKind::Integer {
                i32::try_from(value).map(DefaultValue::Integer).map_err(|_| range())
            } else {
                i64::try_from(value).map(DefaultValue::Long).map_err(|_| range())
            }
        }
        (StorageKind::Float, Lit::Float(lit)) if matches!(lit.suffix(), "" | "f32") => {
            float_default(negative, lit.base10_parse::<f64>(), &mismatch)
        }
        (StorageKind::Float, Lit::Int(lit)) if lit.suffix().is_empty() => {
            float_default(negative, lit.base10_parse::<f64>(), &mismatch)
        }
        (StorageKind::Boolean, Lit::Bool(lit)) if !negative => Ok(DefaultValue::Boolean(lit.value)),
        (StorageKind::String, Lit::Str(lit)) if !negative => Ok(DefaultValue::String(lit.value())),
        (StorageKind::Integer | StorageKind::Long, _) => Err(mismatch("an integer literal")),
        (StorageKind::Float, _) => Err(mismatch("a float literal")),
        (StorageKind::Boolean, _) => Err(mismatch("`true` or `false`")),
        (StorageKind::String, _) => Err(mismatch("a string literal")),
    }
}

#[expect(clippy::cast_possible_truncation)]
fn float_default(
    negative: bool,
    parsed: syn::Result<f64>,
    mismatch: &dyn Fn(&str) -> Diagnostic,
) -> Result<DefaultValue, Diagnostic> {
    let magnitude = parsed.map_err(|err| mismatch(&err.to_string()))?;
    let value = (if negative { -magnitude } else { magnitude }) as f32;

    if value.is_finite() {
        Ok(DefaultValue::Float(value))
    } else {
        Err(mismatch("in range of `f32`"))
    }
}

// Unwrap `-lit`, `(lit)` and invisible groups down to the literal.
fn literal(expr: &Expr) -> Option<(bool, &Lit)> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => Some((false, lit)),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match literal(expr)? {
            (false, lit) => Some((true, lit)),
            (true, _) => None,
        },
        Expr::Paren(paren) => literal(&paren.expr),
        Expr::Group(group) => literal(&group.expr),
        _ => None,
    }
}

///
/// TESTS
///
