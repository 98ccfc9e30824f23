//! Identifiers that remember what they resolve to
//!
//! The container keys definitions by plain string ids, so `get` hands back an
//! untyped [`Value`]. Declaring a `Token<Mailer>` next to the `"mailer"` id lets
//! [`DefinitionContainer::get_typed`](crate::DefinitionContainer::get_typed)
//! downcast for you, and lets inflector arguments name the same definition
//! without repeating the string.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::value::Value;

/// Container id paired with the type its definition builds
///
/// ```rust
/// use graft::{Inflector, Token};
///
/// struct Mailer;
///
/// const MAILER: Token<Mailer> = Token::new("mailer");
///
/// // Usable wherever an identifier argument is expected
/// let inflector = Inflector::new("MailerAware").set_property("mailer", MAILER);
/// assert_eq!(MAILER.id(), "mailer");
/// assert_eq!(MAILER.to_string(), "mailer");
/// # let _ = inflector;
/// ```
pub struct Token<T: ?Sized> {
    id: &'static str,
    built: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Token<T> {
    pub const fn new(id: &'static str) -> Self {
        Self {
            id,
            built: PhantomData,
        }
    }

    /// The definition id inside the container
    pub const fn id(&self) -> &'static str {
        self.id
    }
}

// Tokens are compared and hashed by id alone; T never needs any bounds
impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Token<T> {}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token<{}>({:?})", std::any::type_name::<T>(), self.id)
    }
}

impl<T: ?Sized> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id)
    }
}

impl<T: ?Sized> AsRef<str> for Token<T> {
    fn as_ref(&self) -> &str {
        self.id
    }
}

/// A token becomes an identifier value, so inflectors resolve it through the
/// container like any other id string.
impl<T: ?Sized> From<Token<T>> for Value {
    fn from(token: Token<T>) -> Self {
        Value::from(token.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mailer;

    const MAILER: Token<Mailer> = Token::new("mailer");

    #[test]
    fn test_id_is_available_in_const_context() {
        const ID: &str = MAILER.id();
        assert_eq!(ID, "mailer");
        assert_eq!(MAILER.as_ref(), "mailer");
    }

    #[test]
    fn test_tokens_with_the_same_id_are_equal() {
        assert_eq!(MAILER, Token::<Mailer>::new("mailer"));
        assert_ne!(MAILER, Token::<Mailer>::new("backup_mailer"));
    }

    #[test]
    fn test_debug_names_the_built_type() {
        let rendered = format!("{MAILER:?}");
        assert!(rendered.contains("Mailer"));
        assert!(rendered.ends_with("(\"mailer\")"));
    }

    #[test]
    fn test_token_becomes_identifier_value() {
        let value = Value::from(MAILER);
        assert_eq!(value.as_identifier(), Some("mailer"));
    }
}
