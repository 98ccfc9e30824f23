/// Defines how long a container definition's instance lives.
///
/// - **Transient**: built (and inflected) on every `get` (default)
/// - **Shared**: built once on first `get`, then the same `Arc` is handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Built every time it is requested. Never cached.
    ///
    /// # Example
    /// ```
    /// use graft::{DefinitionContainer, Lifetime};
    ///
    /// #[derive(graft::Inflectable)]
    /// struct Request { id: u32 }
    /// impl graft::Invocable for Request {}
    ///
    /// let container = DefinitionContainer::new();
    /// container.add_transient("request", |_| Ok(Request { id: 1 })).unwrap();
    /// let a = container.get("request").unwrap();
    /// let b = container.get("request").unwrap();
    /// assert!(!a.ptr_eq(&b));
    /// ```
    #[default]
    Transient,

    /// Built once, on first request, and reused afterwards.
    ///
    /// Inflectors run on the single build only.
    Shared,
}

impl Lifetime {
    pub fn is_shared(self) -> bool {
        matches!(self, Self::Shared)
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

impl std::str::FromStr for Lifetime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transient" => Ok(Self::Transient),
            "shared" | "singleton" => Ok(Self::Shared),
            _ => Err(format!(
                "Invalid lifetime: '{}'. Must be 'transient' or 'shared'",
                s
            )),
        }
    }
}
