use std::any::{Any, type_name};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::ContainerConfig;
use crate::error::{ContainerError, InflectError};
use crate::inflector::{Inflector, InflectorAggregate};
use crate::lifetime::Lifetime;
use crate::target::Inflectable;
use crate::token::Token;
use crate::value::Value;

/// Resolves instances by identifier.
pub trait Container: Send + Sync {
    /// Whether `get` can produce an instance for `id`.
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Result<Value, ContainerError>;
}

impl<'a> dyn Container + 'a {
    /// Resolves `id` and downcasts the instance.
    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, ContainerError> {
        self.get(id)?
            .downcast::<T>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<T>(),
            })
    }
}

type Builder =
    Arc<dyn Fn(&DefinitionContainer, &str) -> Result<Value, ContainerError> + Send + Sync>;

#[derive(Clone)]
enum Source {
    Value(Value),
    Factory(Builder),
}

#[derive(Clone)]
struct Definition {
    lifetime: Lifetime,
    source: Source,
}

/// Container of identifier-keyed definitions that runs its inflectors on
/// every object it builds.
///
/// Always handled through an `Arc` so inflectors can keep a weak reference
/// back to it.
pub struct DefinitionContainer {
    me: Weak<DefinitionContainer>,
    config: ContainerConfig,
    definitions: RwLock<FxHashMap<String, Definition>>,
    shared: RwLock<FxHashMap<String, Value>>,
    delegates: RwLock<Vec<Arc<dyn Container>>>,
    inflectors: InflectorAggregate,
    // One resolving stack per thread building from this container
    resolving: Mutex<FxHashMap<ThreadId, Vec<String>>>,
}

impl DefinitionContainer {
    pub fn new() -> Arc<Self> {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config,
            definitions: RwLock::new(FxHashMap::default()),
            shared: RwLock::new(FxHashMap::default()),
            delegates: RwLock::new(Vec::new()),
            inflectors: InflectorAggregate::new(),
            resolving: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Registers a factory with the configured default lifetime.
    ///
    /// The factory receives the container so it can resolve its own
    /// dependencies. Every object it returns is inflected before it is
    /// handed out.
    pub fn add<T, F>(&self, id: impl Into<String>, factory: F) -> Result<(), ContainerError>
    where
        T: Inflectable,
        F: Fn(&dyn Container) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.define(id.into(), self.config.default_lifetime, factory)
    }

    pub fn add_shared<T, F>(&self, id: impl Into<String>, factory: F) -> Result<(), ContainerError>
    where
        T: Inflectable,
        F: Fn(&dyn Container) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.define(id.into(), Lifetime::Shared, factory)
    }

    pub fn add_transient<T, F>(
        &self,
        id: impl Into<String>,
        factory: F,
    ) -> Result<(), ContainerError>
    where
        T: Inflectable,
        F: Fn(&dyn Container) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.define(id.into(), Lifetime::Transient, factory)
    }

    /// Registers a ready-made value. Values are shared and never inflected.
    pub fn add_value(
        &self,
        id: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ContainerError> {
        self.insert_definition(
            id.into(),
            Definition {
                lifetime: Lifetime::Shared,
                source: Source::Value(value.into()),
            },
        )
    }

    /// Binds the inflector to this container and registers it.
    pub fn add_inflector(&self, inflector: Inflector) -> Arc<Inflector> {
        let me: Weak<dyn Container> = self.me.clone();
        self.inflectors.add(inflector.set_container_ref(me))
    }

    /// Adds a container consulted, in registration order, for identifiers
    /// this container does not define.
    pub fn delegate(&self, container: Arc<dyn Container>) {
        debug!("Registering delegate container");
        self.delegates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(container);
    }

    pub fn inflectors(&self) -> &InflectorAggregate {
        &self.inflectors
    }

    /// Runs the registered inflectors on an object built elsewhere.
    pub fn inflect(&self, object: &mut dyn Inflectable) -> Result<(), InflectError> {
        self.inflectors.inflect(object)
    }

    pub fn has(&self, id: &str) -> bool {
        self.has_definition(id) || self.delegates().iter().any(|delegate| delegate.has(id))
    }

    /// Resolves `id`. Shared definitions are built once and cached.
    pub fn get(&self, id: &str) -> Result<Value, ContainerError> {
        if let Some(value) = self.cached(id) {
            trace!(id, "Returning shared instance");
            return Ok(value);
        }

        let Some(definition) = self.definition(id) else {
            return self.get_from_delegates(id);
        };

        let value = self.build(id, &definition)?;
        if !definition.lifetime.is_shared() {
            return Ok(value);
        }

        // A re-entrant resolution may have cached the instance first; keep that one
        let mut shared = self.shared.write().unwrap_or_else(PoisonError::into_inner);
        Ok(shared.entry(id.to_string()).or_insert(value).clone())
    }

    /// Builds a fresh instance even for shared definitions, bypassing and
    /// leaving the shared cache untouched.
    pub fn get_new(&self, id: &str) -> Result<Value, ContainerError> {
        match self.definition(id) {
            Some(definition) => self.build(id, &definition),
            None => self.get_from_delegates(id),
        }
    }

    pub fn get_typed<T: Any + Send + Sync>(
        &self,
        token: &Token<T>,
    ) -> Result<Arc<T>, ContainerError> {
        let id = token.id();
        self.get(id)?
            .downcast::<T>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<T>(),
            })
    }

    fn define<T, F>(&self, id: String, lifetime: Lifetime, factory: F) -> Result<(), ContainerError>
    where
        T: Inflectable,
        F: Fn(&dyn Container) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let builder: Builder = Arc::new(move |container: &DefinitionContainer, id: &str| {
            let mut object =
                factory(container as &dyn Container).map_err(|source| ContainerError::Factory {
                    id: id.to_string(),
                    source,
                })?;
            container
                .inflectors
                .inflect_built(&mut object)
                .map_err(|source| ContainerError::Inflection {
                    id: id.to_string(),
                    source: Box::new(source),
                })?;
            Ok(Value::new(object))
        });

        self.insert_definition(
            id,
            Definition {
                lifetime,
                source: Source::Factory(builder),
            },
        )
    }

    fn insert_definition(&self, id: String, definition: Definition) -> Result<(), ContainerError> {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if definitions.contains_key(&id) {
            if !self.config.allow_overwrite {
                return Err(ContainerError::AlreadyDefined(id));
            }
            self.shared
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        }

        debug!(id = %id, lifetime = %definition.lifetime, "Registering definition");
        definitions.insert(id, definition);
        Ok(())
    }

    fn build(&self, id: &str, definition: &Definition) -> Result<Value, ContainerError> {
        match &definition.source {
            Source::Value(value) => Ok(value.clone()),
            Source::Factory(builder) => {
                let _guard = ResolvingGuard::enter(self, id)?;
                debug!(id, lifetime = %definition.lifetime, "Building instance");
                builder(self, id)
            }
        }
    }

    fn get_from_delegates(&self, id: &str) -> Result<Value, ContainerError> {
        for delegate in self.delegates() {
            if delegate.has(id) {
                trace!(id, "Resolving through delegate container");
                return delegate.get(id);
            }
        }
        Err(ContainerError::NotFound(id.to_string()))
    }

    fn has_definition(&self, id: &str) -> bool {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    fn definition(&self, id: &str) -> Option<Definition> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn cached(&self, id: &str) -> Option<Value> {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn delegates(&self) -> Vec<Arc<dyn Container>> {
        self.delegates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolving(&self) -> MutexGuard<'_, FxHashMap<ThreadId, Vec<String>>> {
        self.resolving.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Container for DefinitionContainer {
    fn has(&self, id: &str) -> bool {
        DefinitionContainer::has(self, id)
    }

    fn get(&self, id: &str) -> Result<Value, ContainerError> {
        DefinitionContainer::get(self, id)
    }
}

/// Marks an identifier as being built for as long as the guard lives.
struct ResolvingGuard<'a> {
    container: &'a DefinitionContainer,
    id: String,
}

impl<'a> ResolvingGuard<'a> {
    fn enter(container: &'a DefinitionContainer, id: &str) -> Result<Self, ContainerError> {
        let mut resolving = container.resolving();
        let stack = resolving.entry(thread::current().id()).or_default();
        if let Some(start) = stack.iter().position(|entry| entry == id) {
            let mut chain = stack[start..].to_vec();
            chain.push(id.to_string());
            return Err(ContainerError::CircularDependency {
                id: id.to_string(),
                chain,
            });
        }
        stack.push(id.to_string());
        Ok(Self {
            container,
            id: id.to_string(),
        })
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        let mut resolving = self.container.resolving();
        let thread = thread::current().id();
        if let Some(stack) = resolving.get_mut(&thread) {
            if let Some(index) = stack.iter().rposition(|entry| *entry == self.id) {
                stack.remove(index);
            }
            if stack.is_empty() {
                resolving.remove(&thread);
            }
        }
    }
}
