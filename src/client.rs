use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::{
    config::ConfigStore,
    engine::Engine,
    geolocation::{self, Coordinates, DeviceLocation, PositionOptions},
    keys::Keys,
    locale::{AmbientLocale, SystemLocale},
    params::TIMEOUT,
    patch::Patches,
    ClientOptions, ExtensionRegistry, HostList, IntoParams, Params, PlaceKitError, Result,
    SearchResponse,
};

/// Core request primitive shared by the client, its sub-APIs and extensions.
///
/// Cheap to clone; all clones use the same host list and stored options.
#[derive(Clone, Debug)]
pub struct RequestHandle {
    engine: Arc<Engine>,
    config: Arc<ConfigStore>,
}

impl RequestHandle {
    /// Runs one Operation: `method` on `resource` with exactly `params`.
    ///
    /// Stored options are not merged in; use [`RequestHandle::options`] to
    /// build on them.
    pub async fn request(
        &self,
        method: Method,
        resource: &str,
        params: impl IntoParams,
    ) -> Result<JsonValue> {
        let params = params.into_params()?;
        self.engine.execute(method, resource, params).await
    }

    /// Same as [`RequestHandle::request`], decoding the body into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        resource: &str,
        params: impl IntoParams,
    ) -> Result<T> {
        let body = self.request(method, resource, params).await?;
        decode(body)
    }

    /// Snapshot of the stored options.
    pub fn options(&self) -> Params {
        self.config.snapshot()
    }

    /// Stored `timeout` only, for calls that do not take search defaults.
    pub(crate) fn transport_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(timeout) = self.config.snapshot().remove(TIMEOUT) {
            params.insert(TIMEOUT, timeout);
        }
        params
    }

    pub(crate) fn config(&self) -> &ConfigStore {
        &self.config
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: JsonValue) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|err| PlaceKitError::Decode(format!("unexpected response shape: {err}")))
}

/// Async client for the PlaceKit API.
///
/// Clones share stored options and geolocation state.
#[derive(Clone)]
pub struct PlaceKitClient {
    handle: RequestHandle,
    device_location: Option<Arc<dyn DeviceLocation>>,
    extensions: Arc<BTreeMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl fmt::Debug for PlaceKitClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceKitClient")
            .field("engine", &self.handle.engine)
            .field("options", &self.handle.options())
            .field("device_location", &self.device_location.is_some())
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PlaceKitClient {
    /// Creates a client for the production endpoint with default options.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `PLACEKIT_API_KEY` — API key
    /// - `PLACEKIT_HOSTS` — optional comma-separated host cascade
    ///
    /// **Not available on `wasm32` targets.**
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PLACEKIT_API_KEY").map_err(|_| {
            PlaceKitError::invalid("missing PLACEKIT_API_KEY environment variable")
        })?;
        if api_key.trim().is_empty() {
            return Err(PlaceKitError::invalid("PLACEKIT_API_KEY is set but empty"));
        }
        let mut builder = Self::builder(api_key);
        if let Ok(hosts) = std::env::var("PLACEKIT_HOSTS") {
            let hosts: Vec<&str> = hosts
                .split(',')
                .map(str::trim)
                .filter(|host| !host.is_empty())
                .collect();
            if !hosts.is_empty() {
                builder = builder.hosts(HostList::new(hosts)?);
            }
        }
        builder.build()
    }

    /// Searches places matching `query`.
    ///
    /// Parameters are the stored options, then `opts`, then `query`.
    pub async fn search(&self, query: &str, opts: impl IntoParams) -> Result<SearchResponse> {
        let params = self
            .handle
            .options()
            .merged(opts.into_params()?)
            .set("query", query);
        self.handle.request_as(Method::POST, "search", params).await
    }

    /// Reverse geocoding around the `coordinates` option, or the caller's IP.
    pub async fn reverse(&self, opts: impl IntoParams) -> Result<SearchResponse> {
        let params = self.handle.options().merged(opts.into_params()?);
        self.handle.request_as(Method::POST, "reverse", params).await
    }

    /// Snapshot of the stored options. Changing it does not affect the client;
    /// use [`PlaceKitClient::configure`] for that.
    pub fn options(&self) -> Params {
        self.handle.options()
    }

    /// Shallow-merges `patch` into the stored options.
    ///
    /// Fails with [`PlaceKitError::InvalidArgument`] when `patch` is not a
    /// key-value mapping; the stored options are then left untouched.
    pub fn configure(&self, patch: impl IntoParams) -> Result<()> {
        let patch = patch.into_params()?;
        self.handle.config().configure(patch);
        Ok(())
    }

    pub fn has_geolocation(&self) -> bool {
        self.handle.config().has_geolocation()
    }

    /// Asks the device location provider for the current position and stores
    /// it as the `coordinates` option.
    ///
    /// On failure the stored coordinates are cleared.
    pub async fn request_geolocation(&self, opts: PositionOptions) -> Result<Coordinates> {
        let Some(device) = self.device_location.as_deref() else {
            return Err(PlaceKitError::Geolocation {
                code: geolocation::POSITION_UNAVAILABLE,
                message: "no device location provider configured".to_owned(),
            });
        };

        match geolocation::locate(device, &opts).await {
            Ok(coords) => {
                self.handle.config().set_coordinates(coords.to_param());
                Ok(coords)
            }
            Err(err) => {
                self.handle.config().clear_coordinates();
                Err(err)
            }
        }
    }

    pub fn clear_geolocation(&self) {
        self.handle.config().clear_coordinates();
    }

    /// Place override records.
    pub fn patch(&self) -> Patches<'_> {
        Patches::new(&self.handle)
    }

    /// API key management.
    pub fn keys(&self) -> Keys<'_> {
        Keys::new(&self.handle)
    }

    /// Instance of the extension registered as `name`, if it has type `T`.
    pub fn extension<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.extensions
            .get(name)
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// The request primitive, for calls to endpoints without a wrapper.
    pub fn request_handle(&self) -> &RequestHandle {
        &self.handle
    }

    pub fn hosts(&self) -> &HostList {
        self.handle.engine.hosts()
    }
}

/// Builder for [`PlaceKitClient`].
pub struct ClientBuilder {
    api_key: String,
    hosts: Option<HostList>,
    params: Params,
    options: ClientOptions,
    locale: Option<Arc<dyn AmbientLocale>>,
    device_location: Option<Arc<dyn DeviceLocation>>,
    extensions: ExtensionRegistry,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &"<redacted>")
            .field("hosts", &self.hosts)
            .field("params", &self.params)
            .field("options", &self.options)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl ClientBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            hosts: None,
            params: Params::new(),
            options: ClientOptions::default(),
            locale: Some(Arc::new(SystemLocale)),
            device_location: None,
            extensions: ExtensionRegistry::new(),
        }
    }

    /// Host cascade; defaults to the production endpoint.
    pub fn hosts(mut self, hosts: HostList) -> Self {
        self.hosts = Some(hosts);
        self
    }

    /// Initial options, merged over the built-in defaults.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Source of the default `language`; defaults to [`SystemLocale`].
    pub fn locale(mut self, locale: impl AmbientLocale + 'static) -> Self {
        self.locale = Some(Arc::new(locale));
        self
    }

    /// Disables ambient locale detection.
    pub fn without_locale(mut self) -> Self {
        self.locale = None;
        self
    }

    pub fn device_location(mut self, device: impl DeviceLocation + 'static) -> Self {
        self.device_location = Some(Arc::new(device));
        self
    }

    pub fn extensions(mut self, registry: &ExtensionRegistry) -> Self {
        self.extensions = registry.clone();
        self
    }

    pub fn build(self) -> Result<PlaceKitClient> {
        #[cfg(feature = "tracing")]
        if self.api_key.trim().is_empty() {
            tracing::warn!("missing or empty PlaceKit API key");
        }
        let hosts = match self.hosts {
            Some(hosts) => hosts,
            None => HostList::production()?,
        };
        let engine = Engine::new(
            hosts,
            self.api_key,
            self.options.app_id,
            self.options.failover,
        );
        let config = ConfigStore::new(self.params, self.locale.as_deref());
        let handle = RequestHandle {
            engine: Arc::new(engine),
            config: Arc::new(config),
        };
        let extensions = self.extensions.instantiate(&handle);

        Ok(PlaceKitClient {
            handle,
            device_location: self.device_location,
            extensions: Arc::new(extensions),
        })
    }
}
