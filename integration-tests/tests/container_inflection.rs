//! Container driven inflection
//!
//! This test verifies:
//! 1. Objects built by the container pass through every matching inflector
//! 2. Identifiers on container-registered inflectors resolve against the same container
//! 3. Shared instances are inflected once, transient ones on every build
//! 4. Inflection failures surface as container errors naming the definition

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use graft::{
    Container, ContainerError, DefinitionContainer, InflectError, Inflectable, Inflector, Token,
    Value, invocable,
};

// ============= Services =============

#[derive(Inflectable, Default)]
pub struct Logger {
    pub prefix: String,
}

impl graft::Invocable for Logger {}

#[derive(Inflectable, Default)]
#[inflect(kind = "LoggerAware")]
pub struct Mailer {
    pub logger: Option<Arc<Logger>>,
    pub retries: u32,
}

#[invocable]
impl Mailer {
    pub fn set_logger(&mut self, logger: Arc<Logger>) {
        self.logger = Some(logger);
    }
}

#[derive(Inflectable, Default)]
#[inflect(kind = "LoggerAware")]
pub struct Reporter {
    pub logger: Option<Arc<Logger>>,
    pub runs: u32,
}

#[invocable]
impl Reporter {
    pub fn set_logger(&mut self, logger: Arc<Logger>) {
        self.logger = Some(logger);
    }

    pub fn bump(&mut self) {
        self.runs += 1;
    }
}

const LOGGER: Token<Logger> = Token::new("logger");
const MAILER: Token<Mailer> = Token::new("mailer");
const REPORTER: Token<Reporter> = Token::new("reporter");

fn container_with_logger() -> Arc<DefinitionContainer> {
    let container = DefinitionContainer::new();
    container
        .add_shared(LOGGER.id(), |_| {
            Ok(Logger {
                prefix: "[app]".to_string(),
            })
        })
        .unwrap();
    container
}

// ============= Tests =============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflector_injects_shared_dependency() {
        let container = container_with_logger();
        container.add(MAILER.id(), |_| Ok(Mailer::default())).unwrap();
        container.add(REPORTER.id(), |_| Ok(Reporter::default())).unwrap();
        container.add_inflector(
            Inflector::new("LoggerAware").invoke_method("set_logger", vec![LOGGER.into()]),
        );

        let logger = container.get_typed(&LOGGER).unwrap();
        let mailer = container.get_typed(&MAILER).unwrap();
        let reporter = container.get_typed(&REPORTER).unwrap();

        assert!(Arc::ptr_eq(mailer.logger.as_ref().unwrap(), &logger));
        assert!(Arc::ptr_eq(reporter.logger.as_ref().unwrap(), &logger));
        assert_eq!(logger.prefix, "[app]");
    }

    #[test]
    fn test_only_matching_kinds_are_inflected() {
        let container = container_with_logger();
        container.add(MAILER.id(), |_| Ok(Mailer::default())).unwrap();
        container.add(REPORTER.id(), |_| Ok(Reporter::default())).unwrap();
        container.add_inflector(Inflector::new("Reporter").invoke_method("bump", vec![]));
        container.add_inflector(Inflector::new("Mailer").set_property("retries", 3_u32));

        let mailer = container.get_typed(&MAILER).unwrap();
        let reporter = container.get_typed(&REPORTER).unwrap();

        assert_eq!(mailer.retries, 3);
        assert_eq!(reporter.runs, 1);
        assert!(mailer.logger.is_none());
    }

    #[test]
    fn test_shared_instance_is_inflected_once() {
        let container = container_with_logger();
        container
            .add_shared(REPORTER.id(), |_| Ok(Reporter::default()))
            .unwrap();
        container.add_inflector(Inflector::new("Reporter").invoke_method("bump", vec![]));

        let first = container.get_typed(&REPORTER).unwrap();
        let second = container.get_typed(&REPORTER).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.runs, 1);
    }

    #[test]
    fn test_transient_builds_are_each_inflected() {
        let container = container_with_logger();
        container
            .add_transient(REPORTER.id(), |_| Ok(Reporter::default()))
            .unwrap();
        container.add_inflector(
            Inflector::new("Reporter")
                .invoke_method("bump", vec![])
                .once_per_match(),
        );

        let first = container.get_typed(&REPORTER).unwrap();
        let second = container.get_typed(&REPORTER).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.runs, 1);
        assert_eq!(second.runs, 1);
    }

    #[test]
    fn test_get_new_runs_inflectors_again() {
        let container = container_with_logger();
        container
            .add_shared(REPORTER.id(), |_| Ok(Reporter::default()))
            .unwrap();
        container.add_inflector(Inflector::new("Reporter").invoke_method("bump", vec![]));

        let cached = container.get_typed(&REPORTER).unwrap();
        let fresh = container
            .get_new(REPORTER.id())
            .unwrap()
            .downcast::<Reporter>()
            .unwrap();

        assert!(!Arc::ptr_eq(&cached, &fresh));
        assert_eq!(fresh.runs, 1);
        // the cache still holds the original
        assert!(Arc::ptr_eq(&cached, &container.get_typed(&REPORTER).unwrap()));
    }

    #[test]
    fn test_factories_resolve_their_own_dependencies() {
        let container = container_with_logger();
        container
            .add(MAILER.id(), |c: &dyn Container| {
                Ok(Mailer {
                    logger: Some(c.get_as::<Logger>(LOGGER.id())?),
                    retries: 0,
                })
            })
            .unwrap();

        let mailer = container.get_typed(&MAILER).unwrap();
        assert_eq!(mailer.logger.as_ref().unwrap().prefix, "[app]");
    }

    #[test]
    fn test_callback_sees_built_object() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        let container = container_with_logger();
        container.add(MAILER.id(), |_| Ok(Mailer::default())).unwrap();
        container.add_inflector(Inflector::with_callback("LoggerAware", move |object| {
            assert!(object.is::<Mailer>());
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        container.get(MAILER.id()).unwrap();
        container.get(MAILER.id()).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_method_fails_the_build() {
        let container = container_with_logger();
        container.add(MAILER.id(), |_| Ok(Mailer::default())).unwrap();
        container.add_inflector(Inflector::new("Mailer").invoke_method("send_all", vec![]));

        let err = container.get(MAILER.id()).unwrap_err();
        match err {
            ContainerError::Inflection { id, source } => {
                assert_eq!(id, "mailer");
                assert!(matches!(*source, InflectError::Target(_)));
            }
            other => panic!("expected an inflection error, got {other:?}"),
        }
    }

    #[test]
    fn test_objects_built_elsewhere_can_be_inflected() {
        let container = container_with_logger();
        container.add_inflector(
            Inflector::new("LoggerAware").invoke_method("set_logger", vec![Value::from("logger")]),
        );

        let mut reporter = Reporter::default();
        container.inflect(&mut reporter).unwrap();

        let logger = container.get_typed(&LOGGER).unwrap();
        assert!(Arc::ptr_eq(reporter.logger.as_ref().unwrap(), &logger));
    }

    #[test]
    fn test_delegate_supplies_missing_identifiers() {
        let upstream = container_with_logger();
        let container = DefinitionContainer::new();
        container.delegate(upstream.clone());
        container.add(MAILER.id(), |_| Ok(Mailer::default())).unwrap();
        container.add_inflector(
            Inflector::new("LoggerAware").invoke_method("set_logger", vec![LOGGER.into()]),
        );

        let mailer = container.get_typed(&MAILER).unwrap();
        let upstream_logger = upstream.get_typed(&LOGGER).unwrap();
        assert!(Arc::ptr_eq(mailer.logger.as_ref().unwrap(), &upstream_logger));
    }
}
