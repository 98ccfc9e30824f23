//! # graft
//!
//! Runtime dependency injection with post-construction inflectors.
//!
//! A [`DefinitionContainer`] builds objects from identifier-keyed factories.
//! Every object it builds is passed through the registered [`Inflector`]s
//! whose kind the object reports, which assign properties, call setter
//! methods and run callbacks. String values recorded on an inflector are
//! resolved through the container when it knows them.
//!
//! ```rust
//! use std::sync::Arc;
//! use graft::{DefinitionContainer, Inflectable, Inflector, Token, invocable};
//!
//! #[derive(Inflectable, Default)]
//! pub struct Logger {
//!     pub prefix: String,
//! }
//! impl graft::Invocable for Logger {}
//!
//! #[derive(Inflectable, Default)]
//! #[inflect(kind = "LoggerAware")]
//! pub struct Mailer {
//!     pub logger: Option<Arc<Logger>>,
//! }
//!
//! #[invocable]
//! impl Mailer {
//!     pub fn set_logger(&mut self, logger: Arc<Logger>) {
//!         self.logger = Some(logger);
//!     }
//! }
//!
//! const MAILER: Token<Mailer> = Token::new("mailer");
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let container = DefinitionContainer::new();
//! container.add_shared("logger", |_| Ok(Logger { prefix: "[mail]".into() }))?;
//! container.add("mailer", |_| Ok(Mailer::default()))?;
//! container.add_inflector(
//!     Inflector::new("LoggerAware").invoke_method("set_logger", vec!["logger".into()]),
//! );
//!
//! let mailer = container.get_typed(&MAILER)?;
//! assert_eq!(mailer.logger.as_ref().unwrap().prefix, "[mail]");
//! # Ok(())
//! # }
//! ```

// Lets the derive macros refer to `::graft` from inside this crate
extern crate self as graft;

pub mod config;
pub mod container;
pub mod error;
pub mod inflector;
pub mod lifetime;
pub mod target;
pub mod token;
pub mod value;

pub use config::{ContainerConfig, FromEnv};
pub use container::{Container, DefinitionContainer};
pub use error::{ConfigError, ContainerError, InflectError, TargetError};
pub use inflector::{Inflector, InflectorAggregate, resolve};
pub use lifetime::Lifetime;
pub use target::{Inflectable, InflectionMarks, Invocable, Settable};
pub use token::Token;
pub use value::{FromValue, Value};

// Re-export macros
pub use graft_macros::{Inflectable, invocable};
