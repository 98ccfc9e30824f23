//! Type-erased values flowing through the container
//!
//! A [`Value`] is what inflectors store for deferred property assignments and
//! method arguments, and what the container hands out from `get`. String
//! values double as identifiers: the inflector asks the container whether it
//! knows them before applying them.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A reference-counted, type-erased value.
///
/// Cloning is cheap and keeps identity: two clones are [`Value::ptr_eq`].
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps an owned value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Wraps an existing `Arc` without reallocating, so the value keeps the
    /// identity of the given pointer.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        let inner: Arc<dyn Any + Send + Sync> = value;
        Self {
            inner,
            type_name: type_name::<T>(),
        }
    }

    /// The identifier this value names, if it is a string.
    pub fn as_identifier(&self) -> Option<&str> {
        self.downcast_ref::<String>().map(String::as_str)
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Downcasts to a shared pointer of the stored type. The returned `Arc`
    /// points at the same allocation as this value.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Name of the stored type, for error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        self.addr() == other.addr()
    }

    /// Whether this value is the very allocation behind `other`.
    pub fn ptr_eq_arc<T: ?Sized>(&self, other: &Arc<T>) -> bool {
        self.addr() == Arc::as_ptr(other) as *const () as usize
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_identifier() {
            Some(identifier) => write!(f, "Value({:?})", identifier),
            None => write!(f, "Value(<{}>)", self.type_name),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(value)
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Value {
    fn from(value: Arc<T>) -> Self {
        Value::from_arc(value)
    }
}

/// Conversion from a [`Value`] into a concrete field or argument type.
///
/// Implemented for `Arc<T>` (identity preserving), `Option<T>`, [`Value`]
/// itself and the scalar types. Returns `None` when the stored type does not
/// match.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl<T: Any + Send + Sync> FromValue for Arc<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.downcast::<T>()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

macro_rules! scalar_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    value.downcast_ref::<$ty>().cloned()
                }
            }
        )*

        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::new(value)
                }
            }
        )*
    };
}

scalar_values!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<String>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Bar(u32);

    #[test]
    fn test_strings_are_identifiers() {
        assert_eq!(Value::from("Bar").as_identifier(), Some("Bar"));
        assert_eq!(Value::from("Bar".to_string()).as_identifier(), Some("Bar"));
        assert_eq!(Value::from(42_u32).as_identifier(), None);
        assert_eq!(Value::new(Bar(1)).as_identifier(), None);
    }

    #[test]
    fn test_downcast_keeps_identity() {
        let bar = Arc::new(Bar(7));
        let value = Value::from_arc(Arc::clone(&bar));

        let back = value.downcast::<Bar>().unwrap();
        assert!(Arc::ptr_eq(&bar, &back));
        assert!(value.ptr_eq_arc(&bar));
        assert!(value.downcast::<String>().is_none());
    }

    #[test]
    fn test_clones_are_identical_but_equal_values_are_not() {
        let a = Value::new(Bar(1));
        let b = a.clone();
        let c = Value::new(Bar(1));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_from_value_conversions() {
        let bar = Arc::new(Bar(3));
        let value = Value::from(Arc::clone(&bar));

        let opt: Option<Arc<Bar>> = FromValue::from_value(&value);
        assert!(Arc::ptr_eq(opt.as_ref().unwrap(), &bar));

        assert_eq!(u32::from_value(&Value::from(5_u32)), Some(5));
        assert_eq!(u32::from_value(&Value::from(5_i64)), None);
        assert_eq!(
            String::from_value(&Value::from("hello")),
            Some("hello".to_string())
        );
        assert!(Value::from_value(&value).unwrap().ptr_eq(&value));
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(format!("{:?}", Value::from("Bar")), "Value(\"Bar\")");
        assert!(format!("{:?}", Value::new(Bar(1))).contains("Bar"));
    }
}
