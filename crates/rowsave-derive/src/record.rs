//! Record derive macro implementation.

use crate::attrs::{parse_field_attrs, parse_struct_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub(crate) fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(&input.attrs)?;
    let table = struct_attrs.table.unwrap_or_else(|| name.to_string());

    let mut descriptors = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let column = match (attrs.column, struct_attrs.rename_all) {
            (Some(column), _) => column,
            (None, Some(rule)) => rule.apply(field_name),
            (None, None) => field_name.to_string(),
        };

        descriptors.push(quote! {
            ::rowsave::FieldDescriptor::typed::<#ty>(
                #column,
                |r: &Self| ::rowsave::ToValue::to_value(&r.#ident),
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::rowsave::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;

            fn describe() -> ::std::vec::Vec<::rowsave::FieldDescriptor<Self>> {
                ::std::vec![#(#descriptors),*]
            }
        }
    })
}
