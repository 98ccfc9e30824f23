use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::Inflector;
use crate::error::InflectError;
use crate::target::Inflectable;

/// Ordered set of inflectors, dispatched by the kinds an object reports.
#[derive(Debug, Default)]
pub struct InflectorAggregate {
    inflectors: RwLock<Vec<Arc<Inflector>>>,
}

impl InflectorAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, inflector: Inflector) -> Arc<Inflector> {
        debug!(kind = inflector.kind(), "Registering inflector");
        let inflector = Arc::new(inflector);
        self.write().push(Arc::clone(&inflector));
        inflector
    }

    /// Applies every inflector whose kind the object reports, in
    /// registration order. The first failure aborts the remaining ones.
    pub fn inflect(&self, object: &mut dyn Inflectable) -> Result<(), InflectError> {
        for inflector in self.matching(object) {
            inflector.inflect(object)?;
        }
        Ok(())
    }

    /// Same dispatch as [`InflectorAggregate::inflect`] for an object the
    /// container has just built.
    pub(crate) fn inflect_built(&self, object: &mut dyn Inflectable) -> Result<(), InflectError> {
        for inflector in self.matching(object) {
            inflector.inflect_built(object)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the registered inflectors.
    pub fn inflectors(&self) -> Vec<Arc<Inflector>> {
        self.read().clone()
    }

    // The list is copied out so inflection may re-enter the container and
    // register or apply inflectors without holding the lock.
    fn matching(&self, object: &dyn Inflectable) -> Vec<Arc<Inflector>> {
        self.read()
            .iter()
            .filter(|inflector| object.matches(inflector.kind()))
            .cloned()
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<Inflector>>> {
        self.inflectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<Inflector>>> {
        self.inflectors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
