use thiserror::Error;

/// A target object refused a property assignment or method invocation.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("{target} has no writable property '{name}'")]
    NoSuchProperty { target: String, name: String },

    #[error("{target} has no invocable method '{name}'")]
    NoSuchMethod { target: String, name: String },

    #[error("Property '{name}' of {target} expects {expected}, got {found}")]
    PropertyType {
        target: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Argument {index} of {target}::{method} expects {expected}, got {found}")]
    ArgumentType {
        target: String,
        method: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{target}::{method} takes {expected} argument(s), {found} given")]
    ArgumentCount {
        target: String,
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("{target}::{method} failed: {message}")]
    MethodFailed {
        target: String,
        method: String,
        message: String,
    },
}

/// Failure while applying an inflector to an object.
#[derive(Debug, Error)]
pub enum InflectError {
    #[error("Inflector for '{kind}' needs a container to resolve '{identifier}' but none is bound")]
    UnboundContainer { kind: String, identifier: String },

    #[error(
        "Inflector for '{kind}' applies once per object, but {target} has no InflectionMarks field"
    )]
    Untracked { kind: String, target: String },

    #[error("Failed to resolve an inflector value: {0}")]
    Resolution(#[from] ContainerError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("Inflector callback for '{kind}' failed: {source}")]
    Callback {
        kind: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure while registering or resolving a container definition.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No definition or delegate provides '{0}'")]
    NotFound(String),

    #[error("Definition '{0}' already exists and overwriting is disabled")]
    AlreadyDefined(String),

    #[error("Circular dependency detected while resolving '{id}': {}", .chain.join(" -> "))]
    CircularDependency { id: String, chain: Vec<String> },

    #[error("Factory for '{id}' failed: {source}")]
    Factory {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Inflecting '{id}' failed: {source}")]
    Inflection {
        id: String,
        #[source]
        source: Box<InflectError>,
    },

    #[error("'{id}' does not resolve to {expected}")]
    TypeMismatch { id: String, expected: &'static str },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {message}")]
    ParseError { key: String, message: String },

    #[error("Failed to load .env file: {0}")]
    DotenvError(#[from] dotenv::Error),
}
