use crate::{
    args::{ObserveArgs, PrefArgs, TransformArgs, parse_attr},
    error::{Diagnostic, ErrorKind},
    model::{KindExt, MARKERS, OBSERVE, RawField, RawOwner, SUBSCRIBE, Scan, TRANSFORM},
};
use prefbind_core::kind::StorageKind;
use syn::{
    Attribute, Fields, ImplItem, Item, ItemStruct, TraitItem, spanned::Spanned,
    visit_mut::{self, VisitMut},
};

/// Pass order over the storage tags. Owners and fields keep the position of
/// their first encounter across all passes.
pub const SCAN_ORDER: [StorageKind; 5] = [
    StorageKind::Integer,
    StorageKind::String,
    StorageKind::Float,
    StorageKind::Long,
    StorageKind::Boolean,
];

/// Collect every tagged declaration of the module.
pub fn scan(items: &[Item]) -> Scan {
    let mut scan = Scan::default();

    for kind in SCAN_ORDER {
        for item in items {
            scan_item(&mut scan, item, kind);
        }
    }

    for item in items {
        scan_stray_markers(&mut scan, item);
    }

    scan
}

fn scan_item(scan: &mut Scan, item: &Item, kind: StorageKind) {
    match item {
        Item::Struct(item) => {
            misplaced(scan, &item.attrs, kind, "a struct");
            scan_struct(scan, item, kind);
        }
        Item::Enum(item) => {
            misplaced(scan, &item.attrs, kind, "an enum");
            for variant in &item.variants {
                misplaced(scan, &variant.attrs, kind, "an enum variant");
                for field in &variant.fields {
                    misplaced(scan, &field.attrs, kind, "an enum variant field");
                }
            }
        }
        Item::Union(item) => {
            misplaced(scan, &item.attrs, kind, "a union");
            for field in &item.fields.named {
                misplaced(scan, &field.attrs, kind, "a union field");
            }
        }
        Item::Fn(item) => misplaced(scan, &item.attrs, kind, "a function"),
        Item::Type(item) => misplaced(scan, &item.attrs, kind, "a type alias"),
        Item::Const(item) => immutable(scan, &item.attrs, kind, "a const item"),
        Item::Static(item) => match item.mutability {
            syn::StaticMutability::None => immutable(scan, &item.attrs, kind, "an immutable static"),
            _ => misplaced(scan, &item.attrs, kind, "a static"),
        },
        Item::Trait(item) => {
            misplaced(scan, &item.attrs, kind, "a trait");
            for trait_item in &item.items {
                misplaced(scan, trait_item_attrs(trait_item), kind, "a trait item");
            }
        }
        Item::Impl(item) => {
            misplaced(scan, &item.attrs, kind, "an impl block");
            for impl_item in &item.items {
                misplaced(scan, impl_item_attrs(impl_item), kind, "an impl item");
            }
        }
        _ => {}
    }
}

fn scan_struct(scan: &mut Scan, item: &ItemStruct, kind: StorageKind) {
    let Fields::Named(named) = &item.fields else {
        for field in &item.fields {
            misplaced(scan, &field.attrs, kind, "a tuple struct field");
        }
        return;
    };

    for field in &named.named {
        let Some(tag) = find_tag(&field.attrs, kind) else {
            continue;
        };
        let Some(ident) = &field.ident else {
            continue;
        };

        if scan.owner_mut(&item.ident).is_none() {
            scan.owners.push(RawOwner {
                ident: item.ident.clone(),
                vis: item.vis.clone(),
                generics: item.generics.clone(),
                fields: Vec::new(),
                errors: Vec::new(),
            });
        }
        let Some(owner) = scan.owner_mut(&item.ident) else {
            continue;
        };

        let pref = match parse_attr::<PrefArgs>(tag) {
            Ok(pref) => pref,
            Err(err) => {
                owner.errors.push(Diagnostic::from_darling(err));
                PrefArgs::default()
            }
        };

        // a later tag on the same field replaces the earlier one in place
        if let Some(existing) = owner.field_mut(ident) {
            existing.kind = kind;
            existing.pref = pref;
            continue;
        }

        let observe = last_marker(&field.attrs, OBSERVE).and_then(|attr| {
            parse_attr::<ObserveArgs>(attr)
                .map_err(|err| owner.errors.push(Diagnostic::from_darling(err)))
                .ok()
        });
        let transform = last_marker(&field.attrs, TRANSFORM).and_then(|attr| {
            parse_attr::<TransformArgs>(attr)
                .map(|args| (args, attr.span()))
                .map_err(|err| owner.errors.push(Diagnostic::from_darling(err)))
                .ok()
        });

        owner.fields.push(RawField {
            ident: ident.clone(),
            vis: field.vis.clone(),
            ty: field.ty.clone(),
            kind,
            pref,
            observe,
            transform,
        });
    }
}

// Modifiers without a storage tag on the same declaration, and
// subscriptions outside inherent impl methods.
fn scan_stray_markers(scan: &mut Scan, item: &Item) {
    match item {
        Item::Struct(item) => {
            stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            for field in &item.fields {
                if !has_storage_tag(&field.attrs) {
                    stray(scan, &field.attrs, &[OBSERVE, TRANSFORM]);
                }
                stray(scan, &field.attrs, &[SUBSCRIBE]);
            }
        }
        Item::Impl(item) => {
            stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            for impl_item in &item.items {
                let attrs = impl_item_attrs(impl_item);
                stray(scan, attrs, &[OBSERVE, TRANSFORM]);
                let inherent_fn = item.trait_.is_none() && matches!(impl_item, ImplItem::Fn(_));
                if !inherent_fn {
                    stray(scan, attrs, &[SUBSCRIBE]);
                }
            }
        }
        Item::Enum(item) => {
            stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            for variant in &item.variants {
                stray(scan, &variant.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
                for field in &variant.fields {
                    stray(scan, &field.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
                }
            }
        }
        Item::Trait(item) => {
            stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            for trait_item in &item.items {
                stray(scan, trait_item_attrs(trait_item), &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            }
        }
        Item::Union(item) => {
            stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            for field in &item.fields.named {
                stray(scan, &field.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]);
            }
        }
        Item::Fn(item) => stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]),
        Item::Const(item) => stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]),
        Item::Static(item) => stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]),
        Item::Type(item) => stray(scan, &item.attrs, &[OBSERVE, TRANSFORM, SUBSCRIBE]),
        _ => {}
    }
}

fn stray(scan: &mut Scan, attrs: &[Attribute], markers: &[&str]) {
    for attr in attrs {
        let Some(name) = markers.iter().find(|name| attr.path().is_ident(name)) else {
            continue;
        };
        let message = if *name == SUBSCRIBE {
            "#[subscribe] must be placed on a method of an inherent impl block".to_string()
        } else {
            format!("#[{name}] requires a storage tag such as #[int_pref] on the same field")
        };

        scan.diagnostics
            .push(Diagnostic::spanned(ErrorKind::Structural, attr, message));
    }
}

fn misplaced(scan: &mut Scan, attrs: &[Attribute], kind: StorageKind, what: &str) {
    if let Some(tag) = find_tag(attrs, kind) {
        scan.diagnostics.push(Diagnostic::spanned(
            ErrorKind::Structural,
            tag,
            format!(
                "#[{}] is only allowed on named fields of a struct, not on {what}",
                kind.tag()
            ),
        ));
    }
}

fn immutable(scan: &mut Scan, attrs: &[Attribute], kind: StorageKind, what: &str) {
    if let Some(tag) = find_tag(attrs, kind) {
        scan.diagnostics.push(Diagnostic::spanned(
            ErrorKind::Structural,
            tag,
            format!("preference field must not be immutable; found {what}"),
        ));
    }
}

fn find_tag(attrs: &[Attribute], kind: StorageKind) -> Option<&Attribute> {
    last_marker(attrs, kind.tag())
}

fn last_marker<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().rev().find(|attr| attr.path().is_ident(name))
}

fn has_storage_tag(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .get_ident()
            .is_some_and(|ident| StorageKind::from_tag(&ident.to_string()).is_some())
    })
}

fn trait_item_attrs(item: &TraitItem) -> &[Attribute] {
    match item {
        TraitItem::Const(item) => &item.attrs,
        TraitItem::Fn(item) => &item.attrs,
        TraitItem::Type(item) => &item.attrs,
        TraitItem::Macro(item) => &item.attrs,
        _ => &[],
    }
}

fn impl_item_attrs(item: &ImplItem) -> &[Attribute] {
    match item {
        ImplItem::Const(item) => &item.attrs,
        ImplItem::Fn(item) => &item.attrs,
        ImplItem::Type(item) => &item.attrs,
        ImplItem::Macro(item) => &item.attrs,
        _ => &[],
    }
}

///
/// MarkerStripper
///
/// Removes marker attributes once the module has been analyzed. Nested
/// modules and function bodies are left alone; they are never scanned.
///

struct MarkerStripper;

impl MarkerStripper {
    fn strip(attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !MARKERS.iter().any(|marker| attr.path().is_ident(marker)));
    }
}

impl VisitMut for MarkerStripper {
    fn visit_item_mod_mut(&mut self, _: &mut syn::ItemMod) {}

    fn visit_block_mut(&mut self, _: &mut syn::Block) {}

    fn visit_item_mut(&mut self, item: &mut Item) {
        match item {
            Item::Struct(item) => Self::strip(&mut item.attrs),
            Item::Enum(item) => Self::strip(&mut item.attrs),
            Item::Union(item) => Self::strip(&mut item.attrs),
            Item::Fn(item) => Self::strip(&mut item.attrs),
            Item::Type(item) => Self::strip(&mut item.attrs),
            Item::Const(item) => Self::strip(&mut item.attrs),
            Item::Static(item) => Self::strip(&mut item.attrs),
            Item::Trait(item) => Self::strip(&mut item.attrs),
            Item::Impl(item) => Self::strip(&mut item.attrs),
            _ => {}
        }

        visit_mut::visit_item_mut(self, item);
    }

    fn visit_field_mut(&mut self, field: &mut syn::Field) {
        Self::strip(&mut field.attrs);
        visit_mut::visit_field_mut(self, field);
    }

    fn visit_variant_mut(&mut self, variant: &mut syn::Variant) {
        Self::strip(&mut variant.attrs);
        visit_mut::visit_variant_mut(self, variant);
    }

    fn visit_impl_item_mut(&mut self, item: &mut ImplItem) {
        match item {
            ImplItem::Const(item) => Self::strip(&mut item.attrs),
            ImplItem::Fn(item) => Self::strip(&mut item.attrs),
            ImplItem::Type(item) => Self::strip(&mut item.attrs),
            ImplItem::Macro(item) => Self::strip(&mut item.attrs),
            _ => {}
        }

        visit_mut::visit_impl_item_mut(self, item);
    }

    fn visit_trait_item_mut(&mut self, item: &mut TraitItem) {
        match item {
            TraitItem::Const(item) => Self::strip(&mut item.attrs),
            TraitItem::Fn(item) => Self::strip(&mut item.attrs),
            TraitItem::Type(item) => Self::strip(&mut item.attrs),
            TraitItem::Macro(item) => Self::strip(&mut item.attrs),
            _ => {}
        }

        visit_mut::visit_trait_item_mut(self, item);
    }
}

/// Remove every marker attribute from the module's own items.
pub fn strip_markers(items: &mut [Item]) {
    for item in items {
        MarkerStripper.visit_item_mut(item);
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::{ItemMod, parse_quote};

    fn items(module: &ItemMod) -> &[Item] {
        &module.content.as_ref().unwrap().1
    }

    #[test]
    fn fields_keep_first_seen_order_across_passes() {
        let module: ItemMod = parse_quote! {
            mod prefs {
                pub struct Settings {
                    #[bool_pref(key = "dark")]
                    pub dark: bool,
                    #[int_pref(key = "score", default = 10)]
                    pub score: i32,
                    #[string_pref]
                    pub name: String,
                    pub untouched: u8,
                }
            }
        };
        let scan = scan(items(&module));

        assert_eq!(scan.owners.len(), 1);
        let names: Vec<String> = scan.owners[0]
            .fields
            .iter()
            .map(|field| field.ident.to_string())
            .collect();
        assert_eq!(names, ["score", "name", "dark"]);
        assert!(scan.diagnostics.is_empty());
    }

    #[test]
    fn later_pass_wins_for_doubly_tagged_fields() {
        let module: ItemMod = parse_quote! {
            mod prefs {
                pub struct Settings {
                    #[int_pref(key = "a")]
                    #[long_pref(key = "b")]
                    pub value: i64,
                }
            }
        };
        let scan = scan(items(&module));
        let field = &scan.owners[0].fields[0];

        assert_eq!(field.kind, StorageKind::Long);
        assert_eq!(field.key(), "b");
    }

    #[test]
    fn key_falls_back_to_field_name() {
        let module: ItemMod = parse_quote! {
            mod prefs {
                pub struct Settings {
                    #[int_pref(key = "")]
                    pub volume: i32,
                    #[observe(tag = "theme")]
                    #[transform(using = ThemeCodec)]
                    #[string_pref]
                    pub theme: Theme,
                }
            }
        };
        let scan = scan(items(&module));
        let fields = &scan.owners[0].fields;

        assert_eq!(fields[0].key(), "volume");
        assert_eq!(
            fields[1].observe.as_ref().unwrap().tag.as_deref(),
            Some("theme")
        );
        assert!(fields[1].transform.is_some());
    }

    #[test]
    fn misplaced_tags_are_reported() {
        let module: ItemMod = parse_quote! {
            mod prefs {
                #[int_pref]
                pub fn helper() {}

                pub enum Mode {
                    Fixed(#[int_pref] i32),
                }

                pub struct Pair(#[bool_pref] bool);

                #[string_pref]
                const NAME: &str = "x";

                pub trait Source {
                    #[long_pref]
                    fn value(&self) -> i64;
                }
            }
        };
        let scan = scan(items(&module));

        assert!(scan.owners.is_empty());
        assert_eq!(scan.diagnostics.len(), 5);
        assert!(
            scan.diagnostics
                .iter()
                .all(|d| d.kind() == ErrorKind::Structural)
        );
        assert!(
            scan.diagnostics
                .iter()
                .any(|d| d.message().contains("must not be immutable"))
        );
    }

    #[test]
    fn stray_modifiers_are_reported() {
        let module: ItemMod = parse_quote! {
            mod prefs {
                pub struct Settings {
                    #[observe]
                    pub loose: i32,
                }

                impl Clone for Settings {
                    #[subscribe(tag = "loose")]
                    fn clone(&self) -> Self { todo!() }
                }

                #[subscribe(tag = "x")]
                pub fn free(old: i32) {}
            }
        };
        let scan = scan(items(&module));

        assert_eq!(scan.diagnostics.len(), 3);
    }

    #[test]
    fn attribute_errors_stay_with_their_owner() {
        let module: ItemMod = parse_quote! {
            mod prefs {
                pub struct Settings {
                    #[int_pref(unknown = 1)]
                    pub score: i32,
                }
            }
        };
        let scan = scan(items(&module));

        assert_eq!(scan.owners[0].errors.len(), 1);
        assert!(scan.diagnostics.is_empty());
    }

    #[test]
    fn stripping_removes_every_marker() {
        let mut module: ItemMod = parse_quote! {
            mod prefs {
                pub struct Settings {
                    #[observe]
                    #[int_pref(key = "score")]
                    #[doc = "kept"]
                    pub score: i32,
                }

                impl Settings {
                    #[subscribe(tag = "score")]
                    pub fn on_score(&mut self, old: i32) {}
                }

                mod nested {
                    #[int_pref]
                    pub fn untouched() {}
                }
            }
        };
        strip_markers(&mut module.content.as_mut().unwrap().1);
        let out = module.to_token_stream().to_string();

        assert!(!out.contains("observe"));
        assert!(!out.contains("subscribe"));
        assert!(out.contains("doc"));
        assert_eq!(out.matches("int_pref").count(), 1);
    }
}
