//! `#[derive(AutoResolve)]` implementation

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse::Result, parse_macro_input, Data, DeriveInput, Error, Fields, LitStr, Meta};

pub fn auto_resolve_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(result) => result.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

enum FieldKind {
    Slot,
    Nested,
}

fn field_kind(field: &syn::Field) -> Result<Option<FieldKind>> {
    let mut kind = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("auto_resolve") {
            continue;
        }

        if kind.is_some() {
            return Err(Error::new_spanned(attr, "duplicate #[auto_resolve] attribute"));
        }

        if let Meta::Path(_) = attr.meta {
            kind = Some(FieldKind::Slot);
            continue;
        }

        let mut nested = false;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("nested") {
                nested = true;
                Ok(())
            } else {
                Err(meta.error("expected `nested`"))
            }
        })?;
        kind = Some(if nested {
            FieldKind::Nested
        } else {
            FieldKind::Slot
        });
    }

    Ok(kind)
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    input,
                    "#[derive(AutoResolve)] requires structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                input,
                "#[derive(AutoResolve)] can only be applied to structs",
            ))
        }
    };

    let owner = LitStr::new(&name.to_string(), name.span());
    let mut statements = Vec::new();

    for field in fields {
        let Some(kind) = field_kind(field)? else {
            continue;
        };
        let Some(ident) = &field.ident else {
            continue;
        };

        statements.push(match kind {
            FieldKind::Slot => {
                let field_name = LitStr::new(&ident.to_string(), ident.span());
                quote! {
                    resolver.field(#owner, #field_name, &mut self.#ident);
                }
            }
            FieldKind::Nested => quote! {
                resolver.nested(&mut self.#ident);
            },
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::autocreate_core::AutoResolve for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn auto_resolve(&mut self, resolver: &mut ::autocreate_core::FieldResolver<'_>) {
                #( #statements )*
            }
        }
    })
}
