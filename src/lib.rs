//! `placekit-http` is an async HTTP client for the PlaceKit places search and
//! geocoding API.
//!
//! Every call runs as one Operation against an ordered host cascade: the
//! first host is tried, and timeouts or 5xx answers fail over to the next
//! host. 4xx answers and other transport errors are returned immediately.
//!
//! - [`PlaceKitClient::search`] / [`PlaceKitClient::reverse`]
//! - [`PlaceKitClient::configure`] / [`PlaceKitClient::options`]
//! - [`PlaceKitClient::patch`] / [`PlaceKitClient::keys`]
//! - [`ExtensionRegistry`] for features built on [`RequestHandle`]

mod client;
mod config;
mod engine;
mod error;
mod extension;
pub mod geolocation;
mod hosts;
mod keys;
pub mod locale;
mod options;
mod params;
mod patch;
mod types;

pub use client::{ClientBuilder, PlaceKitClient, RequestHandle};
pub use error::{ApiError, PlaceKitError};
pub use extension::{ExtensionFactory, ExtensionRegistry};
pub use hosts::{HostList, DEFAULT_HOST};
pub use keys::Keys;
pub use options::{ClientOptions, FailoverPolicy};
pub use params::{IntoParams, Params};
pub use patch::Patches;
pub use reqwest::Method;
pub use types::{
    KeyOptions, KeyRecord, KeyRole, PatchListResponse, PatchOptions, PatchRecord, PatchStatus,
    PatchUpdate, Place, PlaceType, SearchResponse, Street,
};

pub type Result<T> = std::result::Result<T, PlaceKitError>;
