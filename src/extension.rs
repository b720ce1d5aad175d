use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

use crate::{PlaceKitError, RequestHandle, Result};

/// Builds one feature instance for a client from its request primitive.
pub type ExtensionFactory = Arc<dyn Fn(RequestHandle) -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// Operation names already provided by [`PlaceKitClient`](crate::PlaceKitClient).
pub(crate) const RESERVED_NAMES: &[&str] = &[
    "search",
    "reverse",
    "options",
    "configure",
    "has_geolocation",
    "request_geolocation",
    "clear_geolocation",
    "patch",
    "keys",
];

/// Features registered by name, instantiated for every client built with the
/// registry.
///
/// ```
/// use placekit_http::{ExtensionRegistry, PlaceKitClient, RequestHandle};
///
/// struct Ping(RequestHandle);
///
/// let mut registry = ExtensionRegistry::new();
/// registry.register("ping", Ping).unwrap();
///
/// let client = PlaceKitClient::builder("key").extensions(&registry).build().unwrap();
/// assert!(client.extension::<Ping>("ping").is_some());
/// ```
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    factories: BTreeMap<String, ExtensionFactory>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing an earlier registration.
    ///
    /// Fails when `name` is empty or shadows a built-in client operation.
    pub fn register<F, T>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(RequestHandle) -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PlaceKitError::invalid("extension name must not be empty"));
        }
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(PlaceKitError::invalid(format!(
                "extension `{name}` already exists on the client"
            )));
        }
        let factory: ExtensionFactory =
            Arc::new(move |handle: RequestHandle| Arc::new(factory(handle)) as Arc<dyn Any + Send + Sync>);
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn instantiate(
        &self,
        handle: &RequestHandle,
    ) -> BTreeMap<String, Arc<dyn Any + Send + Sync>> {
        self.factories
            .iter()
            .map(|(name, factory)| (name.clone(), factory(handle.clone())))
            .collect()
    }
}
