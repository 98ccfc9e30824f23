use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Result, parse2};

use crate::shared::inflect_attr::{parse_member_options, parse_type_options};
use crate::utils::types::type_label;

const MARKS_TYPE: &str = "InflectionMarks";

pub fn expand(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return Err(Error::new_spanned(
            &input,
            "Inflectable can only be derived for structs",
        ));
    };

    let options = parse_type_options(&input.attrs)?;
    let label = options.label.unwrap_or_else(|| name.to_string());

    // The struct's own name always comes first
    let own_kind = name.to_string();
    let mut kinds = vec![own_kind.clone()];
    for kind in options.kinds {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    let mut marks_field = None;
    let property_arms = match &data_struct.fields {
        Fields::Named(fields) => {
            let mut arms = Vec::new();
            let mut seen: Vec<String> = Vec::new();
            for field in &fields.named {
                let member = parse_member_options(&field.attrs)?;
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                if type_label(&field.ty).as_deref() == Some(MARKS_TYPE) {
                    if marks_field.is_some() {
                        return Err(Error::new_spanned(
                            field,
                            "only one InflectionMarks field is allowed",
                        ));
                    }
                    marks_field = Some(ident.clone());
                    continue;
                }
                if member.skip {
                    continue;
                }
                let property = member.rename.unwrap_or_else(|| ident.to_string());
                if seen.contains(&property) {
                    return Err(Error::new_spanned(
                        field,
                        format!("duplicate property name `{property}`"),
                    ));
                }
                seen.push(property.clone());

                let ty = &field.ty;
                arms.push(quote! {
                    #property => {
                        self.#ident = ::graft::target::convert_property::<#ty>(#label, name, &value)?;
                        Ok(())
                    }
                });
            }
            arms
        }
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(Error::new_spanned(
                &input,
                "Inflectable requires named fields",
            ));
        }
    };

    let marks_impl = marks_field.map(|ident| {
        quote! {
            fn inflection_marks(&mut self) -> ::core::option::Option<&mut ::graft::InflectionMarks> {
                ::core::option::Option::Some(&mut self.#ident)
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::graft::Settable for #name #ty_generics #where_clause {
            fn set_property(
                &mut self,
                name: &str,
                value: ::graft::Value,
            ) -> ::core::result::Result<(), ::graft::TargetError> {
                let _ = &value;
                match name {
                    #(#property_arms)*
                    _ => Err(::graft::target::no_such_property(#label, name)),
                }
            }
        }

        impl #impl_generics ::graft::Inflectable for #name #ty_generics #where_clause {
            fn kinds(&self) -> &'static [&'static str] {
                &[#(#kinds),*]
            }

            fn type_label(&self) -> &'static str {
                #label
            }

            #marks_impl

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    })
}
