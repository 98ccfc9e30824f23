//! Post-construction rules applied to container-built objects
//!
//! An [`Inflector`] targets a kind (a type or interface name). When an object
//! reporting that kind is inflected, the inflector assigns its recorded
//! properties, invokes its recorded methods and finally runs its callback.
//! String values are treated as container identifiers whenever the bound
//! container knows them.

mod aggregate;
pub use self::aggregate::InflectorAggregate;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::container::Container;
use crate::error::{ContainerError, InflectError};
use crate::target::Inflectable;
use crate::value::Value;

type Callback = Box<dyn Fn(&mut dyn Inflectable) -> anyhow::Result<()> + Send + Sync>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct Inflector {
    id: u64,
    kind: String,
    methods: IndexMap<String, Vec<Value>>,
    properties: IndexMap<String, Value>,
    callback: Option<Callback>,
    container: Option<Weak<dyn Container>>,
    once_per_match: bool,
}

impl Inflector {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind: kind.into(),
            methods: IndexMap::new(),
            properties: IndexMap::new(),
            callback: None,
            container: None,
            once_per_match: false,
        }
    }

    /// Creates an inflector whose callback runs after every property and
    /// method step.
    pub fn with_callback<F>(kind: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut dyn Inflectable) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut inflector = Self::new(kind);
        inflector.callback = Some(Box::new(callback));
        inflector
    }

    /// Like [`Inflector::with_callback`], but the callback receives the
    /// concrete type. Objects of any other type fail the callback step.
    pub fn with_typed_callback<T, F>(kind: impl Into<String>, callback: F) -> Self
    where
        T: Inflectable,
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::with_callback(kind, move |object: &mut dyn Inflectable| {
            let label = object.type_label();
            let typed = object.downcast_mut::<T>().ok_or_else(|| {
                anyhow::anyhow!(
                    "callback expects {}, got {}",
                    std::any::type_name::<T>(),
                    label
                )
            })?;
            callback(typed)
        })
    }

    /// Binds the container used to resolve identifiers. Only a weak
    /// reference is kept.
    #[must_use]
    pub fn set_container<C: Container + 'static>(self, container: &Arc<C>) -> Self {
        let weak: Weak<C> = Arc::downgrade(container);
        let weak: Weak<dyn Container> = weak;
        self.set_container_ref(weak)
    }

    #[must_use]
    pub fn set_container_ref(mut self, container: Weak<dyn Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Records a method call. A second call for the same name replaces the
    /// arguments but keeps the original position.
    #[must_use]
    pub fn invoke_method(mut self, name: impl Into<String>, args: Vec<Value>) -> Self {
        self.methods.insert(name.into(), args);
        self
    }

    #[must_use]
    pub fn invoke_methods<I, N>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<Value>)>,
        N: Into<String>,
    {
        methods
            .into_iter()
            .fold(self, |inflector, (name, args)| inflector.invoke_method(name, args))
    }

    /// Records a property assignment, with the same overwrite rule as
    /// [`Inflector::invoke_method`].
    #[must_use]
    pub fn set_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn set_properties<I, N, V>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        properties
            .into_iter()
            .fold(self, |inflector, (name, value)| {
                inflector.set_property(name, value)
            })
    }

    /// Applies this inflector at most once to any given object.
    #[must_use]
    pub fn once_per_match(mut self) -> Self {
        self.once_per_match = true;
        self
    }

    /// Process-unique id, recorded in an object's
    /// [`InflectionMarks`](crate::InflectionMarks) by once-per-match inflectors.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn methods(&self) -> &IndexMap<String, Vec<Value>> {
        &self.methods
    }

    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    pub fn is_once_per_match(&self) -> bool {
        self.once_per_match
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn has_container(&self) -> bool {
        self.container
            .as_ref()
            .is_some_and(|container| container.strong_count() > 0)
    }

    /// Applies the recorded properties, methods and callback to `object`.
    ///
    /// With [`Inflector::once_per_match`], an object whose marks already carry
    /// this inflector is left untouched; such an inflector needs the object to
    /// have an [`InflectionMarks`](crate::InflectionMarks) field. A failing
    /// step aborts the call; earlier steps stay applied and the object is not
    /// marked.
    pub fn inflect(&self, object: &mut dyn Inflectable) -> Result<(), InflectError> {
        if !self.once_per_match {
            return self.apply(object);
        }

        let label = object.type_label();
        let seen = match object.inflection_marks() {
            Some(marks) => marks.contains(self.id),
            None => {
                return Err(InflectError::Untracked {
                    kind: self.kind.clone(),
                    target: label.to_string(),
                });
            }
        };
        if seen {
            trace!(kind = %self.kind, object = label, "Already inflected, skipping");
            return Ok(());
        }

        self.apply(object)?;
        self.mark(object);
        Ok(())
    }

    /// Applies the inflector to an object the container just built. A fresh
    /// build cannot carry marks yet, so objects without marks are accepted.
    pub(crate) fn inflect_built(&self, object: &mut dyn Inflectable) -> Result<(), InflectError> {
        self.apply(object)?;
        if self.once_per_match {
            self.mark(object);
        }
        Ok(())
    }

    fn mark(&self, object: &mut dyn Inflectable) {
        if let Some(marks) = object.inflection_marks() {
            marks.insert(self.id);
        }
    }

    fn apply(&self, object: &mut dyn Inflectable) -> Result<(), InflectError> {
        debug!(kind = %self.kind, object = object.type_label(), "Inflecting object");

        let container = self.container.as_ref().and_then(Weak::upgrade);
        let resolve_value = |value: &Value| -> Result<Value, InflectError> {
            let Some(identifier) = value.as_identifier() else {
                return Ok(value.clone());
            };
            let container =
                container
                    .as_deref()
                    .ok_or_else(|| InflectError::UnboundContainer {
                        kind: self.kind.clone(),
                        identifier: identifier.to_string(),
                    })?;
            Ok(resolve(container, value)?)
        };

        for (name, value) in &self.properties {
            let value = resolve_value(value)?;
            object.set_property(name, value)?;
        }

        for (name, args) in &self.methods {
            let args = args
                .iter()
                .map(&resolve_value)
                .collect::<Result<Vec<_>, _>>()?;
            object.invoke_method(name, args)?;
        }

        if let Some(callback) = &self.callback {
            callback(object).map_err(|source| InflectError::Callback {
                kind: self.kind.clone(),
                source,
            })?;
        }

        Ok(())
    }
}

impl fmt::Debug for Inflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inflector")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .field("callback", &self.callback.is_some())
            .field("once_per_match", &self.once_per_match)
            .finish()
    }
}

/// Substitutes a value with the container's instance when the value is an
/// identifier the container knows; any other value passes through unchanged.
///
/// A literal string that happens to equal a registered identifier is always
/// resolved.
pub fn resolve(container: &dyn Container, value: &Value) -> Result<Value, ContainerError> {
    match value.as_identifier() {
        Some(identifier) if container.has(identifier) => {
            trace!(identifier, "Resolving inflector value through container");
            container.get(identifier)
        }
        _ => Ok(value.clone()),
    }
}
