//! Capability traits for objects an inflector can act on
//!
//! Rust has no runtime reflection, so a target opts in to being inflected by
//! implementing [`Settable`] (named property assignment) and [`Invocable`]
//! (named method invocation). Both are normally generated:
//!
//! ```rust
//! use std::sync::Arc;
//! use graft::{Inflectable, invocable};
//!
//! pub struct Mailer;
//!
//! #[derive(Inflectable, Default)]
//! #[inflect(kind = "MailerAware")]
//! pub struct Newsletter {
//!     pub mailer: Option<Arc<Mailer>>,
//!     pub sent: u32,
//! }
//!
//! #[invocable]
//! impl Newsletter {
//!     pub fn set_mailer(&mut self, mailer: Arc<Mailer>) {
//!         self.mailer = Some(mailer);
//!     }
//! }
//! ```

use std::any::{Any, type_name};
use std::fmt;

use rustc_hash::FxHashSet;

use crate::error::TargetError;
use crate::value::{FromValue, Value};

/// Assigns named properties from type-erased values.
pub trait Settable {
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), TargetError>;
}

/// Invokes named methods with type-erased arguments.
///
/// The default implementation exposes no methods.
pub trait Invocable {
    fn invoke_method(&mut self, name: &str, args: Vec<Value>) -> Result<(), TargetError> {
        let _ = args;
        Err(TargetError::NoSuchMethod {
            target: type_name::<Self>().to_string(),
            name: name.to_string(),
        })
    }
}

/// An object inflectors can be applied to.
pub trait Inflectable: Settable + Invocable + Any + Send + Sync + 'static {
    /// Discriminators this object answers to: its own type name and any
    /// declared interface names.
    fn kinds(&self) -> &'static [&'static str];

    /// Name used in error messages.
    fn type_label(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Per-object record of the once-per-match inflectors already applied.
    /// Objects without one cannot be targeted by such inflectors outside the
    /// container.
    fn inflection_marks(&mut self) -> Option<&mut InflectionMarks> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Inflectable {
    pub fn matches(&self, kind: &str) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn is<T: Inflectable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Inflectable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Inflectable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Ids of the once-per-match inflectors applied to the object that owns it.
///
/// The marks live and die with their object. A clone starts empty, since it
/// is a different object.
///
/// ```rust
/// use graft::{Inflectable, InflectionMarks};
///
/// #[derive(Inflectable, Default)]
/// pub struct Session {
///     pub user: String,
///     marks: InflectionMarks,
/// }
/// impl graft::Invocable for Session {}
/// ```
#[derive(Default)]
pub struct InflectionMarks {
    applied: FxHashSet<u64>,
}

impl InflectionMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, inflector: u64) -> bool {
        self.applied.contains(&inflector)
    }

    /// Returns false if the inflector was already marked.
    pub fn insert(&mut self, inflector: u64) -> bool {
        self.applied.insert(inflector)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

impl Clone for InflectionMarks {
    fn clone(&self) -> Self {
        Self::default()
    }
}

// Bookkeeping only; never makes two objects unequal
impl PartialEq for InflectionMarks {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for InflectionMarks {}

impl fmt::Debug for InflectionMarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InflectionMarks")
            .field("applied", &self.applied.len())
            .finish()
    }
}

/// Converts a property value for assignment, reporting the expected type on
/// mismatch.
pub fn convert_property<T: FromValue>(
    target: &str,
    name: &str,
    value: &Value,
) -> Result<T, TargetError> {
    T::from_value(value).ok_or_else(|| TargetError::PropertyType {
        target: target.to_string(),
        name: name.to_string(),
        expected: type_name::<T>(),
        found: value.type_name(),
    })
}

pub fn convert_argument<T: FromValue>(
    target: &str,
    method: &str,
    index: usize,
    value: &Value,
) -> Result<T, TargetError> {
    T::from_value(value).ok_or_else(|| TargetError::ArgumentType {
        target: target.to_string(),
        method: method.to_string(),
        index,
        expected: type_name::<T>(),
        found: value.type_name(),
    })
}

pub fn expect_arity(
    target: &str,
    method: &str,
    expected: usize,
    args: &[Value],
) -> Result<(), TargetError> {
    if args.len() != expected {
        return Err(TargetError::ArgumentCount {
            target: target.to_string(),
            method: method.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

pub fn no_such_property(target: &str, name: &str) -> TargetError {
    TargetError::NoSuchProperty {
        target: target.to_string(),
        name: name.to_string(),
    }
}

pub fn no_such_method(target: &str, name: &str) -> TargetError {
    TargetError::NoSuchMethod {
        target: target.to_string(),
        name: name.to_string(),
    }
}
