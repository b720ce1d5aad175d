use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{PlaceKitError, Result};

pub(crate) const TIMEOUT: &str = "timeout";
pub(crate) const MAX_RESULTS: &str = "maxResults";
pub(crate) const LANGUAGE: &str = "language";
pub(crate) const TYPES: &str = "types";
pub(crate) const COUNTRIES: &str = "countries";
pub(crate) const COORDINATES: &str = "coordinates";
pub(crate) const FORWARD_IP: &str = "forwardIP";
pub(crate) const COUNTRY_BY_IP: &str = "countryByIP";

/// API parameter set, a flat JSON object keyed by option name.
///
/// Used both for the client's stored defaults and for per-call overrides.
/// Setters cover the options the API documents; [`Params::set`] accepts
/// anything else.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, JsonValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, builder style.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Shallow merge: keys of `patch` overwrite, other keys are kept.
    pub fn merge(&mut self, patch: Params) {
        for (key, value) in patch.0 {
            self.0.insert(key, value);
        }
    }

    /// Owned variant of [`Params::merge`].
    pub fn merged(mut self, patch: Params) -> Self {
        self.merge(patch);
        self
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.0
    }

    /// Attempt timeout in milliseconds.
    pub fn timeout(self, timeout_ms: u64) -> Self {
        self.set(TIMEOUT, timeout_ms)
    }

    pub fn max_results(self, max_results: u32) -> Self {
        self.set(MAX_RESULTS, max_results)
    }

    /// Results language (ISO 639-1).
    pub fn language(self, language: impl Into<String>) -> Self {
        self.set(LANGUAGE, language.into())
    }

    /// Type filters such as `"city"` or `"-airport"`.
    pub fn types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(TYPES, string_array(types))
    }

    /// Country allow-list (ISO 3166-1 alpha-2).
    pub fn countries<I, S>(self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(COUNTRIES, string_array(countries))
    }

    /// Coordinate bias as `"lat,lng"`.
    pub fn coordinates(self, coordinates: impl Into<String>) -> Self {
        self.set(COORDINATES, coordinates.into())
    }

    /// IP address forwarded as `x-forwarded-for`, honored with `country_by_ip`.
    pub fn forward_ip(self, ip: impl Into<String>) -> Self {
        self.set(FORWARD_IP, ip.into())
    }

    pub fn country_by_ip(self, enabled: bool) -> Self {
        self.set(COUNTRY_BY_IP, enabled)
    }
}

fn string_array<I, S>(values: I) -> JsonValue
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    JsonValue::Array(
        values
            .into_iter()
            .map(|value| JsonValue::String(value.into()))
            .collect(),
    )
}

impl From<Map<String, JsonValue>> for Params {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<Params> for JsonValue {
    fn from(params: Params) -> Self {
        JsonValue::Object(params.0)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Conversion into [`Params`] for inputs whose shape is only known at runtime.
///
/// Anything other than a key-value mapping fails with
/// [`PlaceKitError::InvalidArgument`]. `()` and `None` stand for "no options".
pub trait IntoParams {
    fn into_params(self) -> Result<Params>;
}

impl IntoParams for Params {
    fn into_params(self) -> Result<Params> {
        Ok(self)
    }
}

impl IntoParams for Map<String, JsonValue> {
    fn into_params(self) -> Result<Params> {
        Ok(Params(self))
    }
}

impl IntoParams for JsonValue {
    fn into_params(self) -> Result<Params> {
        match self {
            JsonValue::Object(map) => Ok(Params(map)),
            other => Err(PlaceKitError::invalid(format!(
                "expected an object of options, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl IntoParams for () {
    fn into_params(self) -> Result<Params> {
        Ok(Params::default())
    }
}

impl<T: IntoParams> IntoParams for Option<T> {
    fn into_params(self) -> Result<Params> {
        match self {
            Some(inner) => inner.into_params(),
            None => Ok(Params::default()),
        }
    }
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Loose truthiness for flag options, which callers may send as any JSON type.
pub(crate) fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value as JsonValue};

    use super::{is_truthy, IntoParams, Params};
    use crate::PlaceKitError;

    #[test]
    fn builder_uses_api_key_names() {
        let params = Params::new()
            .max_results(10)
            .language("fr")
            .countries(["fr", "be"])
            .types(["city", "-airport"])
            .coordinates("48.86,2.29")
            .forward_ip("1.2.3.4")
            .country_by_ip(true)
            .timeout(500);

        assert_eq!(
            JsonValue::from(params),
            json!({
                "maxResults": 10,
                "language": "fr",
                "countries": ["fr", "be"],
                "types": ["city", "-airport"],
                "coordinates": "48.86,2.29",
                "forwardIP": "1.2.3.4",
                "countryByIP": true,
                "timeout": 500
            })
        );
    }

    #[test]
    fn merge_is_shallow_and_last_write_wins() {
        let mut params = Params::new().language("en").max_results(5);
        params.merge(Params::new().language("fr").countries(["fr"]));

        assert_eq!(params.get("language"), Some(&json!("fr")));
        assert_eq!(params.get("maxResults"), Some(&json!(5)));
        assert_eq!(params.get("countries"), Some(&json!(["fr"])));
    }

    #[test]
    fn json_objects_convert_and_other_shapes_are_rejected() {
        let params = json!({"language": "de"}).into_params().expect("object converts");
        assert_eq!(params.len(), 1);

        for invalid in [json!(null), json!([1, 2]), json!("invalid"), json!(3)] {
            let err = invalid.into_params().expect_err("must reject non-object");
            assert!(matches!(err, PlaceKitError::InvalidArgument(_)));
        }
    }

    #[test]
    fn unit_and_none_mean_no_options() {
        assert!(().into_params().expect("unit converts").is_empty());
        assert!(None::<Params>.into_params().expect("none converts").is_empty());
    }

    #[test]
    fn truthiness_follows_loose_flag_semantics() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }
}
