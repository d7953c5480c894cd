//! Where modules come from.
//!
//! A [`ModuleCatalog`] maps module names to factories. It is the
//! counterpart of "the modules package": the registry asks it for a fresh
//! instance whenever a module is loaded or reloaded.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use conch_core::{BoxError, MODULES, Module, ModuleDescriptor, ModuleError, ModuleResult};

use crate::guard;

/// Creates a fresh module instance.
pub type ModuleFactory = Arc<dyn Fn() -> Result<Box<dyn Module>, BoxError> + Send + Sync>;

/// An ordered set of named module factories.
///
/// Order matters: modules with equal priority are evaluated in catalog order.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: Vec<(String, ModuleFactory)>,
}

impl ModuleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every module exported with `export_module!`, ordered by name.
    pub fn discover() -> Self {
        let mut descriptors: Vec<&ModuleDescriptor> = MODULES.iter().collect();
        descriptors.sort_by_key(|d| d.name);

        let mut catalog = Self::new();
        for desc in descriptors {
            catalog.register_descriptor(*desc);
        }
        debug!(count = catalog.len(), "Discovered modules");
        catalog
    }

    /// Adds a factory under `name` (builder pattern).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Module>, BoxError> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Adds a factory under `name`.
    ///
    /// An existing entry with the same name is replaced in place.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Module>, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: ModuleFactory = Arc::new(factory);
        match self.factories.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
    }

    /// Adds a static descriptor.
    pub fn register_descriptor(&mut self, desc: ModuleDescriptor) {
        self.register(desc.name, move || desc.instantiate());
    }

    /// Returns the catalog's module names in order.
    pub fn names(&self) -> Vec<String> {
        self.factories.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Returns `true` if a module named `name` is known.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|(n, _)| n == name)
    }

    /// Returns the number of known modules.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Creates a fresh instance of the named module.
    ///
    /// A factory that panics is reported like one that failed.
    pub fn instantiate(&self, name: &str) -> ModuleResult<Box<dyn Module>> {
        let (_, factory) = self
            .factories
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| ModuleError::Load {
                module: name.to_string(),
                cause: format!("no module named '{name}'").into(),
            })?;

        guard::hook(factory.as_ref()).map_err(|cause| ModuleError::Load {
            module: name.to_string(),
            cause,
        })
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("modules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Module for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn priority(&self) -> i32 {
            0
        }
    }

    #[test]
    fn test_register_keeps_order_and_replaces() {
        let catalog = ModuleCatalog::new()
            .with("b", || Ok(Box::new(Named("b"))))
            .with("a", || Ok(Box::new(Named("a"))))
            .with("b", || Ok(Box::new(Named("b2"))));

        assert_eq!(catalog.names(), vec!["b", "a"]);
        assert_eq!(catalog.instantiate("b").unwrap().name(), "b2");
    }

    #[test]
    fn test_unknown_module_is_load_error() {
        let err = ModuleCatalog::new().instantiate("ghost").err().unwrap();
        assert!(matches!(err, ModuleError::Load { ref module, .. } if module == "ghost"));
    }

    #[test]
    fn test_failing_factory_is_load_error() {
        let catalog = ModuleCatalog::new().with("broken", || Err("syntax error".into()));
        let err = catalog.instantiate("broken").err().unwrap();
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn test_panicking_factory_is_load_error() {
        let catalog = ModuleCatalog::new().with("fragile", || panic!("import crashed"));
        let err = catalog.instantiate("fragile").err().unwrap();
        assert!(matches!(err, ModuleError::Load { .. }));
        assert!(err.to_string().contains("import crashed"));
    }

    #[test]
    fn test_descriptor_registration() {
        let mut catalog = ModuleCatalog::new();
        catalog.register_descriptor(ModuleDescriptor {
            name: "static",
            create: || Ok(Box::new(Named("static"))),
        });
        assert!(catalog.contains("static"));
        assert_eq!(catalog.instantiate("static").unwrap().name(), "static");
    }
}
