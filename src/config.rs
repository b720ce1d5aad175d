use std::sync::{
    atomic::{AtomicBool, Ordering},
    PoisonError, RwLock,
};

use crate::{
    locale::{language_from_locale, AmbientLocale},
    params::{COORDINATES, LANGUAGE, MAX_RESULTS},
    Params,
};

const DEFAULT_MAX_RESULTS: u32 = 5;

/// Default parameters of one client, shared by all of its clones.
///
/// The lock is held only to copy or merge the map, never across a request,
/// so configuration is eventually consistent rather than transactional: an
/// Operation works on the snapshot it read when it started.
#[derive(Debug)]
pub(crate) struct ConfigStore {
    params: RwLock<Params>,
    has_geolocation: AtomicBool,
}

impl ConfigStore {
    /// Seeds `maxResults`, then the ambient language, then `initial` on top.
    pub(crate) fn new(initial: Params, locale: Option<&dyn AmbientLocale>) -> Self {
        let mut params = Params::new().set(MAX_RESULTS, DEFAULT_MAX_RESULTS);
        if let Some(language) = locale
            .and_then(|source| source.locale())
            .and_then(|tag| language_from_locale(&tag))
        {
            params.insert(LANGUAGE, language);
        }
        params.merge(initial);

        Self {
            params: RwLock::new(params),
            has_geolocation: AtomicBool::new(false),
        }
    }

    pub(crate) fn snapshot(&self) -> Params {
        self.params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn configure(&self, patch: Params) {
        self.params
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(patch);
    }

    pub(crate) fn has_geolocation(&self) -> bool {
        self.has_geolocation.load(Ordering::Acquire)
    }

    pub(crate) fn set_coordinates(&self, coordinates: String) {
        self.params
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(COORDINATES, coordinates);
        self.has_geolocation.store(true, Ordering::Release);
    }

    pub(crate) fn clear_coordinates(&self) {
        self.has_geolocation.store(false, Ordering::Release);
        self.params
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(COORDINATES);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ConfigStore;
    use crate::Params;

    fn french() -> Option<String> {
        Some("fr-FR".to_owned())
    }

    #[test]
    fn seeds_defaults_then_locale_then_initial() {
        let store = ConfigStore::new(Params::new(), Some(&french));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("maxResults"), Some(&json!(5)));
        assert_eq!(snapshot.get("language"), Some(&json!("fr")));

        let store = ConfigStore::new(Params::new().language("es").max_results(2), Some(&french));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("maxResults"), Some(&json!(2)));
        assert_eq!(snapshot.get("language"), Some(&json!("es")));
    }

    #[test]
    fn missing_locale_leaves_language_unset() {
        let store = ConfigStore::new(Params::new(), Some(&|| None::<String>));
        assert!(store.snapshot().get("language").is_none());

        let store = ConfigStore::new(Params::new(), None);
        assert!(store.snapshot().get("language").is_none());
    }

    #[test]
    fn configure_merges_over_existing_keys() {
        let store = ConfigStore::new(Params::new().countries(["fr"]), None);
        store.configure(Params::new().language("de"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("language"), Some(&json!("de")));
        assert_eq!(snapshot.get("countries"), Some(&json!(["fr"])));
        assert_eq!(snapshot.get("maxResults"), Some(&json!(5)));
    }

    #[test]
    fn snapshot_is_detached_from_store() {
        let store = ConfigStore::new(Params::new(), None);
        let mut snapshot = store.snapshot();
        snapshot.insert("language", "xx");
        snapshot.remove("maxResults");

        let fresh = store.snapshot();
        assert!(fresh.get("language").is_none());
        assert_eq!(fresh.get("maxResults"), Some(&json!(5)));
    }

    #[test]
    fn coordinates_track_geolocation_flag() {
        let store = ConfigStore::new(Params::new(), None);
        assert!(!store.has_geolocation());

        store.set_coordinates("48.86,2.29".to_owned());
        assert!(store.has_geolocation());
        assert_eq!(store.snapshot().get("coordinates"), Some(&json!("48.86,2.29")));

        store.clear_coordinates();
        assert!(!store.has_geolocation());
        assert!(store.snapshot().get("coordinates").is_none());
    }
}
