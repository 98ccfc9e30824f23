use proc_macro::TokenStream;

mod inflectable_macro;
mod invocable_macro;
mod shared;
mod utils;

/// Generates `graft::Settable` and `graft::Inflectable` for a struct with
/// named fields.
///
/// ```rust,ignore
/// #[derive(Inflectable)]
/// #[inflect(kind = "LoggerAware")]
/// pub struct Mailer {
///     pub logger: Option<Arc<Logger>>,
///     #[inflect(rename = "from")]
///     pub sender: String,
///     #[inflect(skip)]
///     pub outbox: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Inflectable, attributes(inflect))]
pub fn derive_inflectable(input: TokenStream) -> TokenStream {
    let input = proc_macro2::TokenStream::from(input);
    let output = inflectable_macro::expand(input);
    TokenStream::from(output.unwrap_or_else(|e| e.to_compile_error()))
}

/// Generates `graft::Invocable` from the public `&mut self` / `&self`
/// methods of an inherent impl block.
#[proc_macro_attribute]
pub fn invocable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    let item = proc_macro2::TokenStream::from(item);
    let output = invocable_macro::expand(attr, item);
    TokenStream::from(output.unwrap_or_else(|e| e.to_compile_error()))
}
