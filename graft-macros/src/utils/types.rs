use syn::{ReturnType, Type};

/// Whether a method signature returns `Result<..>`, judged by the last path
/// segment so aliases like `anyhow::Result` count too.
pub fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => last_segment_is(ty, "Result"),
    }
}

pub fn returns_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
    }
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == name;
        }
    }
    false
}

/// Types an argument cannot be materialized into from a stored value.
pub fn is_borrowed_or_opaque(ty: &Type) -> bool {
    matches!(ty, Type::Reference(_) | Type::ImplTrait(_))
}

/// The bare name of a type path, used as the default kind and error label.
pub fn type_label(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}
