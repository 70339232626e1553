//! Delegated checks for rules that cannot be decided locally.
//!
//! `code_compiles` needs a compiler and `custom` needs host-provided logic.
//! Both are injected here so they can be swapped or mocked.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::EvaluationContext;

/// Source of compile verdicts for `code_compiles` rules.
pub trait CompileOracle: Send + Sync {
    /// Whether this exact code compiles, if known.
    fn verdict(&self, code: &str) -> Option<bool>;
}

/// A named host routine backing `custom` rules.
pub type CustomCheck = Arc<dyn Fn(&EvaluationContext<'_>) -> bool + Send + Sync>;

/// Registry of delegated checks.
#[derive(Clone, Default)]
pub struct DelegateRegistry {
    compile_oracle: Option<Arc<dyn CompileOracle>>,
    custom: HashMap<String, CustomCheck>,
}

impl DelegateRegistry {
    /// Create an empty registry; every delegated rule fails closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compile oracle.
    pub fn with_compile_oracle(mut self, oracle: Arc<dyn CompileOracle>) -> Self {
        self.compile_oracle = Some(oracle);
        self
    }

    /// Register a custom check under an identifier, replacing any previous one.
    pub fn register<F>(&mut self, id: impl Into<String>, check: F)
    where
        F: Fn(&EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(id.into(), Arc::new(check));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_custom<F>(mut self, id: impl Into<String>, check: F) -> Self
    where
        F: Fn(&EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.register(id, check);
        self
    }

    /// Ask the oracle about this code.
    pub fn compiles(&self, code: &str) -> Option<bool> {
        self.compile_oracle.as_ref()?.verdict(code)
    }

    /// Run a custom check; `None` if the identifier is unknown.
    pub fn run_custom(&self, id: &str, context: &EvaluationContext<'_>) -> Option<bool> {
        self.custom.get(id).map(|check| check(context))
    }
}

impl fmt::Debug for DelegateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.custom.keys().collect();
        ids.sort();
        f.debug_struct("DelegateRegistry")
            .field("compile_oracle", &self.compile_oracle.is_some())
            .field("custom", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(bool);

    impl CompileOracle for Always {
        fn verdict(&self, _code: &str) -> Option<bool> {
            Some(self.0)
        }
    }

    #[test]
    fn test_registry() {
        let registry = DelegateRegistry::new()
            .with_compile_oracle(Arc::new(Always(true)))
            .with_custom("has_loop", |ctx| ctx.code.contains("loop"));

        assert_eq!(registry.compiles("fn main() {}"), Some(true));
        assert_eq!(
            registry.run_custom("has_loop", &EvaluationContext::new("loop {}")),
            Some(true)
        );
        assert_eq!(
            registry.run_custom("missing", &EvaluationContext::new("")),
            None
        );
    }

    #[test]
    fn test_no_oracle() {
        assert_eq!(DelegateRegistry::new().compiles("fn main() {}"), None);
    }
}
