//! courier-macros - Derive macro for structured map codecs
//!
//! `#[derive(Deliverable)]` implements `courier_codec::Packable` for a
//! struct with named fields. Each field is classified the same way the
//! courier compiler classifies declared fields:
//!
//! - primitive wire types (`i32`, `String`, `Vec<f32>`, `DataMap`, ...) are
//!   stored directly
//! - `#[courier(nested)]` fields hold another `Packable` (or a `Vec` of one)
//! - `Blob` fields (or `#[courier(asset)]`) are compressed into the asset store
//! - `#[courier(parent)]` marks the embedded supertype, packed first into
//!   the same map
//! - `#[courier(skip)]` fields are left at their default on unpack
//!
//! Any other field type is a compile error on that field.

use courier_compiler::{FieldClass, classify};
use darling::{FromDeriveInput, FromField, ast::Data, util::Ignored};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{DeriveInput, parse_macro_input};

#[derive(Debug, FromField)]
#[darling(attributes(courier))]
struct FieldOpts {
    ident: Option<syn::Ident>,
    ty: syn::Type,

    #[darling(default)]
    parent: bool,
    #[darling(default)]
    nested: bool,
    #[darling(default)]
    asset: bool,
    #[darling(default)]
    skip: bool,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(courier), supports(struct_named))]
struct DeliverableOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, FieldOpts>,

    /// Declared type name used for payload decoder registration
    #[darling(default)]
    name: Option<String>,

    /// Path to the codec crate, for users of a re-exporting facade
    #[darling(default, rename = "crate")]
    krate: Option<syn::Path>,
}

/// How one field is packed
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldPlan {
    Skip,
    Parent,
    Class(FieldClass),
}

fn type_string(ty: &syn::Type) -> String {
    ty.to_token_stream().to_string()
}

fn plan_field(field: &FieldOpts) -> darling::Result<FieldPlan> {
    let flags = [field.parent, field.nested, field.asset, field.skip];
    if flags.iter().filter(|f| **f).count() > 1 {
        return Err(darling::Error::custom("use only one of parent, nested, asset, skip")
            .with_span(&field.ty));
    }
    if field.skip {
        return Ok(FieldPlan::Skip);
    }
    if field.parent {
        return Ok(FieldPlan::Parent);
    }

    let ty = type_string(&field.ty);
    let class = if field.asset {
        FieldClass::Asset
    } else {
        classify(&ty, |_| field.nested)
    };
    match class {
        FieldClass::Unsupported => Err(darling::Error::custom(format!(
            "Field type not supported ({}).",
            compact(&ty)
        ))
        .with_span(&field.ty)),
        class => Ok(FieldPlan::Class(class)),
    }
}

fn compact(ty: &str) -> String {
    ty.split_whitespace().collect()
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let opts = DeliverableOpts::from_derive_input(input)?;
    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();
    let codec = opts
        .krate
        .map(|path| path.to_token_stream())
        .unwrap_or_else(|| quote!(::courier_codec));
    let type_name = opts.name.unwrap_or_else(|| name.to_string());

    let Data::Struct(fields) = opts.data else {
        return Err(darling::Error::unsupported_shape("enum"));
    };

    let mut errors = darling::Error::accumulator();
    let mut parent_pack = Vec::new();
    let mut parent_unpack = Vec::new();
    let mut pack = Vec::new();
    let mut unpack = Vec::new();

    for field in fields.iter() {
        let Some(plan) = errors.handle(plan_field(field)) else {
            continue;
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let key = ident.to_string();

        match plan {
            FieldPlan::Skip => {}
            FieldPlan::Parent => {
                if !parent_pack.is_empty() {
                    errors.push(
                        darling::Error::custom("only one field may be marked parent")
                            .with_span(ident),
                    );
                    continue;
                }
                parent_pack.push(quote! {
                    #codec::Packable::pack_into(&self.#ident, map, ctx)?;
                });
                parent_unpack.push(quote! {
                    #codec::Packable::unpack_from(&mut self.#ident, map, ctx)?;
                });
            }
            FieldPlan::Class(FieldClass::Primitive(_)) => {
                pack.push(quote! { #codec::field::put(map, #key, &self.#ident); });
                unpack.push(quote! { #codec::field::take(map, #key, &mut self.#ident); });
            }
            FieldPlan::Class(FieldClass::Nested(_)) => {
                pack.push(quote! {
                    #codec::field::put_nested(map, #key, &self.#ident, ctx)?;
                });
                unpack.push(quote! {
                    #codec::field::take_nested(map, #key, &mut self.#ident, ctx)?;
                });
            }
            FieldPlan::Class(FieldClass::NestedList(_)) => {
                pack.push(quote! {
                    #codec::field::put_nested_list(map, #key, &self.#ident, ctx)?;
                });
                unpack.push(quote! {
                    #codec::field::take_nested_list(map, #key, &mut self.#ident, ctx)?;
                });
            }
            FieldPlan::Class(FieldClass::Asset) => {
                pack.push(quote! {
                    #codec::field::put_asset(map, #key, &self.#ident, ctx)?;
                });
                unpack.push(quote! {
                    #codec::field::take_asset(map, #key, &mut self.#ident, ctx)?;
                });
            }
            FieldPlan::Class(FieldClass::Unsupported) => {}
        }
    }
    errors.finish()?;

    Ok(quote! {
        impl #impl_generics #codec::Packable for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            fn pack_into(
                &self,
                map: &mut #codec::DataMap,
                ctx: &#codec::CodecContext<'_>,
            ) -> ::core::result::Result<(), #codec::CodecError> {
                let _ = ctx;
                #(#parent_pack)*
                #(#pack)*
                Ok(())
            }

            fn unpack_from(
                &mut self,
                map: &#codec::DataMap,
                ctx: &#codec::CodecContext<'_>,
            ) -> ::core::result::Result<(), #codec::CodecError> {
                let _ = ctx;
                #(#parent_unpack)*
                #(#unpack)*
                Ok(())
            }
        }
    })
}

/// Derive a structured map codec
///
/// # Example
///
/// ```ignore
/// use courier_codec::Blob;
/// use courier_macros::Deliverable;
///
/// #[derive(Default, Deliverable)]
/// struct Album {
///     #[courier(parent)]
///     media: Media,
///     title: String,
///     #[courier(nested)]
///     tracks: Vec<Track>,
///     cover: Blob,
/// }
/// ```
#[proc_macro_derive(Deliverable, attributes(courier))]
pub fn derive_deliverable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.write_errors()),
    }
}
