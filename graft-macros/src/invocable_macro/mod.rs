use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::{
    Error, FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Result, Visibility, meta, parse2,
};

use crate::shared::inflect_attr::{parse_member_options, strip_inflect_attrs};
use crate::utils::types::{is_borrowed_or_opaque, returns_result, returns_unit};

pub fn expand(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    let mut item_impl: ItemImpl = parse2(item)?;

    if item_impl.trait_.is_some() {
        return Err(Error::new_spanned(
            &item_impl.self_ty,
            "#[invocable] goes on an inherent impl block, not a trait impl",
        ));
    }

    // Without an explicit label, errors name the target the way the derived
    // `Inflectable::type_label` does, so `#[inflect(label)]` carries over.
    let explicit = parse_label(attr)?;
    let label = match &explicit {
        Some(label) => quote! { #label },
        None => quote! { __label },
    };
    let label_binding = match explicit {
        Some(_) => TokenStream::new(),
        None => quote! {
            let __label: &'static str = <Self as ::graft::Inflectable>::type_label(&*self);
        },
    };

    let mut arms = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for impl_item in &mut item_impl.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let member = parse_member_options(&method.attrs)?;
        strip_inflect_attrs(&mut method.attrs);

        if member.skip || !is_exposed(method) {
            continue;
        }

        let exposed = member
            .rename
            .unwrap_or_else(|| method.sig.ident.to_string());
        if seen.contains(&exposed) {
            return Err(Error::new_spanned(
                &method.sig.ident,
                format!("duplicate method name `{exposed}`"),
            ));
        }
        seen.push(exposed.clone());
        arms.push(generate_arm(method, &exposed, &label)?);
    }

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    Ok(quote! {
        #item_impl

        impl #impl_generics ::graft::Invocable for #self_ty #where_clause {
            fn invoke_method(
                &mut self,
                name: &str,
                args: ::std::vec::Vec<::graft::Value>,
            ) -> ::core::result::Result<(), ::graft::TargetError> {
                let _ = &args;
                #label_binding
                match name {
                    #(#arms)*
                    _ => Err(::graft::target::no_such_method(#label, name)),
                }
            }
        }
    })
}

fn parse_label(attr: TokenStream) -> Result<Option<String>> {
    let mut label = None;
    let parser = meta::parser(|meta| {
        if meta.path.is_ident("label") {
            let value: LitStr = meta.value()?.parse()?;
            label = Some(value.value());
            Ok(())
        } else {
            Err(meta.error("expected `label = \"...\"`"))
        }
    });
    parser.parse2(attr)?;
    Ok(label)
}

// Public methods with a `self` receiver; associated functions stay hidden
fn is_exposed(method: &ImplItemFn) -> bool {
    matches!(method.vis, Visibility::Public(_)) && method.sig.receiver().is_some()
}

fn generate_arm(method: &ImplItemFn, exposed: &str, label: &TokenStream) -> Result<TokenStream> {
    let sig = &method.sig;
    let ident = &sig.ident;

    if sig.asyncness.is_some() {
        return Err(Error::new_spanned(
            sig,
            "async methods cannot be invoked by an inflector; mark it #[inflect(skip)]",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "generic methods cannot be invoked by an inflector; mark it #[inflect(skip)]",
        ));
    }
    if let Some(receiver) = sig.receiver() {
        if receiver.reference.is_none() {
            return Err(Error::new_spanned(
                receiver,
                "methods taking `self` by value cannot be invoked; mark it #[inflect(skip)]",
            ));
        }
    }

    let mut conversions = Vec::new();
    let mut call_args = Vec::new();
    for (index, input) in sig.inputs.iter().skip(1).enumerate() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let ty = &pat_type.ty;
        if is_borrowed_or_opaque(ty) {
            return Err(Error::new_spanned(
                ty,
                "inflector arguments must be owned types; mark the method #[inflect(skip)]",
            ));
        }
        let arg = format_ident!("__arg{}", index);
        conversions.push(quote! {
            let #arg = ::graft::target::convert_argument::<#ty>(#label, name, #index, &args[#index])?;
        });
        call_args.push(arg);
    }
    let arity = call_args.len();

    let call = if returns_result(&sig.output) {
        quote! {
            self.#ident(#(#call_args),*).map_err(|e| ::graft::TargetError::MethodFailed {
                target: #label.to_string(),
                method: name.to_string(),
                message: e.to_string(),
            })?;
        }
    } else if returns_unit(&sig.output) {
        quote! {
            self.#ident(#(#call_args),*);
        }
    } else {
        quote! {
            let _ = self.#ident(#(#call_args),*);
        }
    };

    Ok(quote! {
        #exposed => {
            ::graft::target::expect_arity(#label, name, #arity, &args)?;
            #(#conversions)*
            #call
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposes_public_receiver_methods() {
        let item = quote! {
            impl Foo {
                pub fn new() -> Self { Foo::default() }
                pub fn set_bar(&mut self, bar: Arc<Bar>) { self.bar = Some(bar); }
                pub fn connect(&mut self, dsn: String) -> Result<(), String> { Ok(()) }
                fn private_helper(&mut self) {}
                #[inflect(skip)]
                pub fn describe(&self, prefix: &str) -> String { String::new() }
            }
        };
        let output = expand(TokenStream::new(), item).unwrap().to_string();

        assert!(output.contains("Invocable for Foo"));
        assert!(output.contains("\"set_bar\""));
        assert!(output.contains("\"connect\""));
        assert!(output.contains("MethodFailed"));
        assert!(!output.contains("\"new\""));
        assert!(!output.contains("\"private_helper\""));
        assert!(!output.contains("\"describe\""));
        // helper attributes are removed from the emitted impl
        assert!(!output.contains("inflect"));
    }

    #[test]
    fn test_label_override() {
        let item = quote! {
            impl Foo {
                pub fn tick(&mut self) {}
            }
        };
        let output = expand(quote! { label = "Ticker" }, item).unwrap().to_string();
        assert!(output.contains("\"Ticker\""));
        assert!(!output.contains("__label"));
    }

    #[test]
    fn test_default_label_comes_from_inflectable() {
        let item = quote! {
            impl Foo {
                pub fn tick(&mut self) {}
            }
        };
        let output = expand(TokenStream::new(), item).unwrap().to_string();
        assert!(output.contains("type_label"));
        assert!(output.contains("no_such_method (__label"));
        assert!(!output.contains("\"Foo\""));
    }

    #[test]
    fn test_rename_method() {
        let item = quote! {
            impl Foo {
                #[inflect(rename = "withBar")]
                pub fn with_bar(&mut self, bar: u32) {}
            }
        };
        let output = expand(TokenStream::new(), item).unwrap().to_string();
        assert!(output.contains("\"withBar\""));
        assert!(!output.contains("\"with_bar\""));
    }

    #[test]
    fn test_rejects_borrowed_arguments() {
        let item = quote! {
            impl Foo {
                pub fn greet(&mut self, name: &str) {}
            }
        };
        let err = expand(TokenStream::new(), item).unwrap_err();
        assert!(err.to_string().contains("owned types"));
    }

    #[test]
    fn test_rejects_generic_and_async_methods() {
        let generic = quote! {
            impl Foo {
                pub fn put<T: Into<u32>>(&mut self, value: T) {}
            }
        };
        let asynchronous = quote! {
            impl Foo {
                pub async fn load(&mut self) {}
            }
        };
        assert!(expand(TokenStream::new(), generic).is_err());
        assert!(expand(TokenStream::new(), asynchronous).is_err());
    }

    #[test]
    fn test_rejects_trait_impls() {
        let item = quote! {
            impl Display for Foo {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { Ok(()) }
            }
        };
        assert!(expand(TokenStream::new(), item).is_err());
    }
}
