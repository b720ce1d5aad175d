use std::{fmt, sync::Arc, time::Duration};

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};
use serde_json::{Map, Value as JsonValue};

use crate::{
    hosts::normalize_resource,
    params::{is_truthy, json_kind, COUNTRY_BY_IP, FORWARD_IP, TIMEOUT},
    ApiError, FailoverPolicy, HostList, Params, PlaceKitError, Result,
};

const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";
const API_KEY_HEADER: &str = "x-placekit-api-key";
const APP_ID_HEADER: &str = "x-placekit-app-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Result of one attempt, classified once where the transport call resolves.
#[derive(Debug)]
enum Outcome {
    Success(JsonValue),
    Timeout,
    ServerError(ApiError),
    ClientError(ApiError),
    TransportError(PlaceKitError),
}

impl Outcome {
    /// Timeouts and 5xx responses move the Operation to the next host.
    fn qualifies_for_failover(&self) -> bool {
        matches!(self, Self::Timeout | Self::ServerError(_))
    }

    fn into_result(self, url: &Url) -> Result<JsonValue> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Timeout => Err(PlaceKitError::Timeout {
                url: url.to_string(),
            }),
            Self::ServerError(err) => Err(PlaceKitError::Server(err)),
            Self::ClientError(err) => Err(PlaceKitError::Client(err)),
            Self::TransportError(err) => Err(err),
        }
    }
}

/// Payload of an Operation, with transport-only fields already removed.
#[derive(Debug)]
struct PreparedRequest {
    method: Method,
    resource: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
    payload: Payload,
}

#[derive(Debug)]
enum Payload {
    Json(String),
    Query(Vec<(String, String)>),
}

/// Issues Operations against the host cascade.
#[derive(Clone)]
pub(crate) struct Engine {
    http: reqwest::Client,
    hosts: Arc<HostList>,
    api_key: String,
    app_id: Option<String>,
    failover: FailoverPolicy,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("hosts", &self.hosts)
            .field("api_key", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("failover", &self.failover)
            .finish()
    }
}

impl Engine {
    pub(crate) fn new(
        hosts: HostList,
        api_key: String,
        app_id: Option<String>,
        failover: FailoverPolicy,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            hosts: Arc::new(hosts),
            api_key,
            app_id,
            failover,
        }
    }

    pub(crate) fn hosts(&self) -> &HostList {
        &self.hosts
    }

    /// Runs one Operation.
    ///
    /// Attempts are strictly sequential. The host cursor is local to this
    /// call and always starts at 0, so concurrent Operations never influence
    /// each other's starting host.
    pub(crate) async fn execute(
        &self,
        method: Method,
        resource: &str,
        params: Params,
    ) -> Result<JsonValue> {
        let request = self.prepare(method, resource, params)?;
        let mut cursor = 0usize;

        loop {
            let url = self.hosts.resolve(cursor, &request.resource)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(method = %request.method, %url, cursor, "sending attempt");

            let outcome = self.attempt(&url, &request).await;
            let retry = outcome.qualifies_for_failover();
            let error = match outcome.into_result(&url) {
                Ok(body) => return Ok(body),
                Err(error) => error,
            };

            if retry {
                if let Some(next) = self.failover.next_host(cursor, self.hosts.len()) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%url, next, error = %error, "failing over to next host");

                    cursor = next;
                    continue;
                }
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(%url, error = %error, "operation failed");

            return Err(error);
        }
    }

    fn prepare(&self, method: Method, resource: &str, params: Params) -> Result<PreparedRequest> {
        let mut body = params.into_map();
        let timeout = body.remove(TIMEOUT).map(parse_timeout).transpose()?.flatten();
        let forward_ip = body.remove(FORWARD_IP).and_then(|value| match value {
            JsonValue::String(ip) if !ip.is_empty() => Some(ip),
            _ => None,
        });

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value(API_KEY_HEADER, &self.api_key)?,
        );
        if let Some(app_id) = &self.app_id {
            headers.insert(
                HeaderName::from_static(APP_ID_HEADER),
                header_value(APP_ID_HEADER, app_id)?,
            );
        }
        // IP override only applies to IP-based country resolution.
        let country_by_ip = body.get(COUNTRY_BY_IP).is_some_and(is_truthy);
        if let (true, Some(ip)) = (country_by_ip, forward_ip) {
            headers.insert(
                HeaderName::from_static(FORWARDED_FOR_HEADER),
                header_value(FORWARDED_FOR_HEADER, &ip)?,
            );
        }

        let payload = if method == Method::GET || method == Method::DELETE {
            Payload::Query(query_pairs(body))
        } else {
            let json = serde_json::to_string(&body)
                .map_err(|err| PlaceKitError::Decode(format!("cannot encode request body: {err}")))?;
            Payload::Json(json)
        };

        Ok(PreparedRequest {
            method,
            resource: normalize_resource(resource).to_owned(),
            headers,
            timeout,
            payload,
        })
    }

    async fn attempt(&self, url: &Url, request: &PreparedRequest) -> Outcome {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(request.headers.clone());
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match &request.payload {
            Payload::Json(body) => builder.body(body.clone()),
            Payload::Query(pairs) if pairs.is_empty() => builder,
            Payload::Query(pairs) => builder.query(pairs),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return classify_transport(err),
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return classify_transport(err),
        };

        if status.is_success() {
            if body.trim().is_empty() {
                return Outcome::Success(JsonValue::Null);
            }
            return match serde_json::from_str(&body) {
                Ok(json) => Outcome::Success(json),
                Err(err) => Outcome::TransportError(PlaceKitError::Decode(format!(
                    "invalid response JSON: {err}; body: {body}"
                ))),
            };
        }

        let error = ApiError::from_body(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &body,
        );
        if status.is_server_error() {
            Outcome::ServerError(error)
        } else {
            Outcome::ClientError(error)
        }
    }
}

fn classify_transport(err: reqwest::Error) -> Outcome {
    if err.is_timeout() {
        Outcome::Timeout
    } else {
        Outcome::TransportError(PlaceKitError::Transport(err))
    }
}

/// `timeout` in milliseconds; `null` means no timeout, negatives clamp to zero.
/// Values too large for a [`Duration`] are rejected.
fn parse_timeout(value: JsonValue) -> Result<Option<Duration>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Number(number) => {
            let millis = number.as_f64().unwrap_or_default();
            if !millis.is_finite() || millis <= 0.0 {
                return Ok(Some(Duration::ZERO));
            }
            Duration::try_from_secs_f64(millis / 1000.0)
                .map(Some)
                .map_err(|_| {
                    PlaceKitError::invalid(format!("`timeout` of {millis} ms is out of range"))
                })
        }
        other => Err(PlaceKitError::invalid(format!(
            "`timeout` must be a number of milliseconds, got {}",
            json_kind(&other)
        ))),
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| PlaceKitError::invalid(format!("`{name}` header value is not valid")))
}

fn query_pairs(params: Map<String, JsonValue>) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| query_value(value).map(|value| (key, value)))
        .collect()
}

fn query_value(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text),
        JsonValue::Array(items) => Some(
            items
                .into_iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
