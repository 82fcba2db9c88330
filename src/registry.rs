//! The service registry.
//!
//! Long-lived services (the display connection, the logger, ...) are registered once under their
//! capability type, usually a trait object such as `dyn Display`, and resolved by whoever needs
//! them. The registry is an ordinary value: construct it, pass it around (typically in an `Arc`)
//! and drop or [`dispose`](Registry::dispose) it when done. Several registries may coexist.

use core::any::{type_name, Any, TypeId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Nothing was registered under the capability.
    #[error("service not registered: {0}")]
    NotRegistered(&'static str),

    /// The capability has already been resolved, so its instance may no longer change.
    #[error("service already in use and cannot be replaced: {0}")]
    Sealed(&'static str),
}

struct Entry {
    /// Always an `Arc<T>` for the capability `T` the entry is keyed by.
    instance: Box<dyn Any + Send + Sync>,
    /// Set on first lookup.
    resolved: bool,
}

/// Process-wide lookup of single service instances by capability type.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers the instance for capability `T`.
    ///
    /// Replacing an instance is allowed until the capability has been resolved for the first
    /// time; afterwards the first instance stays and [`RegistryError::Sealed`] is returned.
    pub fn register<T>(&self, instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(&TypeId::of::<T>()) {
            if entry.resolved {
                return Err(RegistryError::Sealed(type_name::<T>()));
            }
        }
        entries.insert(
            TypeId::of::<T>(),
            Entry {
                instance: Box::new(instance),
                resolved: false,
            },
        );
        Ok(())
    }

    /// Returns the instance registered for capability `T`.
    pub fn resolve<T>(&self) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&TypeId::of::<T>())
            .ok_or(RegistryError::NotRegistered(type_name::<T>()))?;
        entry.resolved = true;
        let instance = entry
            .instance
            .downcast_ref::<Arc<T>>()
            .expect("registry entry stored under the wrong type");
        Ok(Arc::clone(instance))
    }

    /// Like [`resolve`](Registry::resolve), but for optional services.
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().ok()
    }

    /// Returns true if something is registered for capability `T`.
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.read().contains_key(&TypeId::of::<T>())
    }

    /// Drops every registered instance. The registry is empty (and unsealed) afterwards.
    pub fn dispose(&self) {
        let entries = core::mem::replace(&mut *self.entries.write(), HashMap::new());
        drop(entries);
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("services", &self.entries.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Display;
    use crate::headless::HeadlessDisplay;
    use crate::logger::{Logger, RecordingLogger};
    use crate::rect::Rect;

    trait RenderService: Send + Sync {
        fn frames(&self) -> usize;
    }

    struct FakeRender(usize);

    impl RenderService for FakeRender {
        fn frames(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn resolves_registered_capabilities() {
        let registry = Registry::new();
        let logger: Arc<dyn Logger> = Arc::new(RecordingLogger::default());
        registry.register::<dyn Logger>(logger.clone()).unwrap();

        let resolved = registry.resolve::<dyn Logger>().expect("logger should resolve");
        resolved.info("through the registry");
        assert!(Arc::ptr_eq(&resolved, &logger));

        // a capability may be registered after others were already resolved
        let headless = Arc::new(HeadlessDisplay::new());
        let display: Arc<dyn Display> = headless.clone();
        registry.register::<dyn Display>(display.clone()).unwrap();
        let resolved = registry.resolve::<dyn Display>().unwrap();
        assert!(Arc::ptr_eq(&resolved, &display));
        let surface = resolved.create_surface(Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(headless.surfaces(), vec![surface]);

        assert_eq!(
            registry.resolve::<dyn RenderService>().err(),
            Some(RegistryError::NotRegistered(type_name::<dyn RenderService>()))
        );
        assert!(registry.try_resolve::<dyn RenderService>().is_none());
    }

    #[test]
    fn replacement_only_before_first_use() {
        let registry = Registry::new();
        registry
            .register::<dyn RenderService>(Arc::new(FakeRender(1)))
            .unwrap();
        registry
            .register::<dyn RenderService>(Arc::new(FakeRender(2)))
            .expect("replacing before first use is allowed");
        assert_eq!(registry.resolve::<dyn RenderService>().unwrap().frames(), 2);

        let err = registry
            .register::<dyn RenderService>(Arc::new(FakeRender(3)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Sealed(_)));
        assert_eq!(
            registry.resolve::<dyn RenderService>().unwrap().frames(),
            2,
            "first resolved instance wins"
        );
    }

    #[test]
    fn concrete_and_trait_capabilities_are_distinct() {
        let registry = Registry::new();
        registry.register(Arc::new(FakeRender(7))).unwrap();
        assert!(registry.contains::<FakeRender>());
        assert!(!registry.contains::<dyn RenderService>());
        assert_eq!(registry.resolve::<FakeRender>().unwrap().0, 7);
    }

    #[test]
    fn dispose_drops_instances() {
        let registry = Registry::new();
        let render = Arc::new(FakeRender(0));
        registry.register(Arc::clone(&render)).unwrap();
        let _ = registry.resolve::<FakeRender>().unwrap();
        assert_eq!(Arc::strong_count(&render), 2);

        registry.dispose();
        assert_eq!(Arc::strong_count(&render), 1);
        assert!(matches!(
            registry.resolve::<FakeRender>(),
            Err(RegistryError::NotRegistered(_))
        ));
        registry
            .register(Arc::new(FakeRender(1)))
            .expect("disposed registry accepts new registrations");
    }

    #[test]
    fn registries_are_independent() {
        let a = Registry::new();
        let b = Registry::new();
        a.register(Arc::new(FakeRender(1))).unwrap();
        assert!(a.contains::<FakeRender>());
        assert!(!b.contains::<FakeRender>());
    }
}
