//! `#[auto_create]` attribute implementation
//!
//! On a struct it implements `AutoCreate`, one `ResolvableAs` impl per alias
//! and submits the descriptor for link-time discovery. On a trait it submits
//! an abstract descriptor so the trait is known but never instantiated.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, Result},
    parse_macro_input, Error, Item, ItemStruct, ItemTrait, Token, Type,
};

/// Arguments accepted by `#[auto_create(...)]`
#[derive(Default)]
struct AutoCreateArgs {
    restore: bool,
    aliases: Vec<Type>,
    awake: bool,
    start: bool,
    destroy: bool,
}

impl AutoCreateArgs {
    fn is_empty(&self) -> bool {
        !self.restore && self.aliases.is_empty() && !self.awake && !self.start && !self.destroy
    }
}

/// Main implementation function for the auto_create macro
pub fn auto_create_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut parsed = AutoCreateArgs::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("restore") {
            parsed.restore = true;
            Ok(())
        } else if meta.path.is_ident("resolvable_as") {
            let content;
            syn::parenthesized!(content in meta.input);
            let types = content.parse_terminated(Type::parse, Token![,])?;
            parsed.aliases.extend(types);
            Ok(())
        } else if meta.path.is_ident("hooks") {
            meta.parse_nested_meta(|hook| {
                if hook.path.is_ident("awake") {
                    parsed.awake = true;
                } else if hook.path.is_ident("start") {
                    parsed.start = true;
                } else if hook.path.is_ident("destroy") {
                    parsed.destroy = true;
                } else {
                    return Err(hook.error("expected one of `awake`, `start`, `destroy`"));
                }
                Ok(())
            })
        } else {
            Err(meta.error("expected `restore`, `resolvable_as(...)` or `hooks(...)`"))
        }
    });
    parse_macro_input!(args with parser);

    let item = parse_macro_input!(input as Item);
    match process_item(item, parsed) {
        Ok(result) => result.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn process_item(item: Item, args: AutoCreateArgs) -> Result<TokenStream2> {
    match item {
        Item::Struct(item_struct) => process_struct(item_struct, args),
        Item::Trait(item_trait) => process_trait(item_trait, args),
        _ => Err(Error::new_spanned(
            item,
            "#[auto_create] can only be applied to structs and traits",
        )),
    }
}

fn process_struct(item_struct: ItemStruct, args: AutoCreateArgs) -> Result<TokenStream2> {
    if !item_struct.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &item_struct.generics,
            "#[auto_create] types must not be generic; there is exactly one instance per type",
        ));
    }

    let name = &item_struct.ident;
    let constructor = if args.restore {
        quote!(restored)
    } else {
        quote!(constructed)
    };

    let aliases = &args.aliases;
    let mut hooks = Vec::new();
    if args.awake {
        hooks.push(quote!(.on_awake()));
    }
    if args.start {
        hooks.push(quote!(.on_start()));
    }
    if args.destroy {
        hooks.push(quote!(.on_destroy()));
    }

    let upcasts = aliases.iter().map(|alias| {
        quote! {
            impl ::autocreate_core::ResolvableAs<#alias> for #name {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#alias> {
                    self
                }
            }
        }
    });

    Ok(quote! {
        #item_struct

        impl ::autocreate_core::AutoCreate for #name {
            fn descriptor() -> ::autocreate_core::MarkedType {
                ::autocreate_core::MarkedType::#constructor::<Self>()
                    #( .resolvable_as::<#aliases>() )*
                    #( #hooks )*
                    .build()
            }
        }

        #( #upcasts )*

        ::autocreate_core::inventory::submit! {
            ::autocreate_core::Registration::new(
                <#name as ::autocreate_core::AutoCreate>::descriptor
            )
        }
    })
}

fn process_trait(item_trait: ItemTrait, args: AutoCreateArgs) -> Result<TokenStream2> {
    if !args.is_empty() {
        return Err(Error::new_spanned(
            &item_trait.ident,
            "#[auto_create] on a trait takes no arguments; traits are never instantiated",
        ));
    }

    if !item_trait.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &item_trait.generics,
            "#[auto_create] traits must not be generic",
        ));
    }

    let name = &item_trait.ident;
    let descriptor = format_ident!("__auto_create_abstract_{}", name);

    Ok(quote! {
        #item_trait

        const _: () = {
            #[allow(non_snake_case)]
            fn #descriptor() -> ::autocreate_core::MarkedType {
                ::autocreate_core::MarkedType::abstract_type::<dyn #name>()
            }

            ::autocreate_core::inventory::submit! {
                ::autocreate_core::Registration::new(#descriptor)
            }
        };
    })
}
