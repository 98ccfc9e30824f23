use syn::{Attribute, LitStr, Result};

/// Options from `#[inflect(...)]` on a struct:
/// `#[inflect(kind = "Logger", kind = "Named", label = "Mailer")]`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeOptions {
    pub kinds: Vec<String>,
    pub label: Option<String>,
}

/// Options from `#[inflect(...)]` on a field or method:
/// `#[inflect(skip)]`, `#[inflect(rename = "other_name")]`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemberOptions {
    pub skip: bool,
    pub rename: Option<String>,
}

pub fn parse_type_options(attrs: &[Attribute]) -> Result<TypeOptions> {
    let mut options = TypeOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("inflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let kind: LitStr = meta.value()?.parse()?;
                options.kinds.push(kind.value());
                Ok(())
            } else if meta.path.is_ident("label") {
                let label: LitStr = meta.value()?.parse()?;
                options.label = Some(label.value());
                Ok(())
            } else {
                Err(meta.error("expected `kind = \"...\"` or `label = \"...\"`"))
            }
        })?;
    }

    Ok(options)
}

pub fn parse_member_options(attrs: &[Attribute]) -> Result<MemberOptions> {
    let mut options = MemberOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("inflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        })?;
    }

    Ok(options)
}

/// Drops `#[inflect(...)]` attributes, which only the macros understand.
pub fn strip_inflect_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !attr.path().is_ident("inflect"));
}
