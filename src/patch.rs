use reqwest::Method;
use serde::Serialize;

use crate::{
    IntoParams, Params, PatchListResponse, PatchOptions, PatchRecord, PatchUpdate, Place,
    PlaceKitError, RequestHandle, Result,
};

/// Place override records, see [`PlaceKitClient::patch`](crate::PlaceKitClient::patch).
#[derive(Clone, Copy, Debug)]
pub struct Patches<'a> {
    handle: &'a RequestHandle,
}

impl<'a> Patches<'a> {
    pub(crate) fn new(handle: &'a RequestHandle) -> Self {
        Self { handle }
    }

    /// Lists or searches patch records (`query`, `maxResults`, `status`, ...).
    pub async fn list(&self, opts: impl IntoParams) -> Result<PatchListResponse> {
        let params = self.handle.transport_params().merged(opts.into_params()?);
        self.handle
            .request_as(Method::POST, "patch/search", params)
            .await
    }

    /// Creates a new place.
    pub async fn create(&self, record: &PatchUpdate, opts: PatchOptions) -> Result<PatchRecord> {
        let params = self.write_params(opts)?.set("record", to_json(record)?);
        self.handle.request_as(Method::POST, "patch", params).await
    }

    /// Overrides fields of an existing search result.
    pub async fn create_from_origin(
        &self,
        origin: &Place,
        update: &PatchUpdate,
        opts: PatchOptions,
    ) -> Result<PatchRecord> {
        let params = self
            .write_params(opts)?
            .set("origin", to_json(origin)?)
            .set("update", to_json(update)?);
        self.handle.request_as(Method::PUT, "patch", params).await
    }

    pub async fn get(&self, id: &str, language: Option<&str>) -> Result<PatchRecord> {
        let id = path_segment("id", id)?;
        let mut params = self.handle.transport_params();
        if let Some(language) = language {
            require("language", language)?;
            params.insert("language", language);
        }
        self.handle
            .request_as(Method::GET, &format!("patch/{id}"), params)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        update: &PatchUpdate,
        opts: PatchOptions,
    ) -> Result<PatchRecord> {
        let id = path_segment("id", id)?;
        let params = self.write_params(opts)?.set("update", to_json(update)?);
        self.handle
            .request_as(Method::PATCH, &format!("patch/{id}"), params)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = path_segment("id", id)?;
        self.handle
            .request(
                Method::DELETE,
                &format!("patch/{id}"),
                self.handle.transport_params(),
            )
            .await?;
        Ok(())
    }

    /// Deletes one translation of a patch record.
    pub async fn delete_lang(&self, id: &str, language: &str) -> Result<()> {
        let id = path_segment("id", id)?;
        let language = path_segment("language", language)?;
        self.handle
            .request(
                Method::DELETE,
                &format!("patch/{id}/language/{language}"),
                self.handle.transport_params(),
            )
            .await?;
        Ok(())
    }

    fn write_params(&self, opts: PatchOptions) -> Result<Params> {
        let mut params = self.handle.transport_params();
        if let Some(status) = opts.status {
            params.insert("status", to_json(&status)?);
        }
        if let Some(language) = opts.language {
            params.insert("language", language);
        }
        Ok(params)
    }
}

pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlaceKitError::invalid(format!(
            "`{name}` must be a non-empty string"
        )));
    }
    Ok(())
}

/// Checks a value interpolated into a resource path, so it stays one segment.
pub(crate) fn path_segment<'v>(name: &str, value: &'v str) -> Result<&'v str> {
    require(name, value)?;
    let dot_segment = matches!(value, "." | "..");
    if dot_segment || value.contains(['/', '\\', '?', '#', '%']) {
        return Err(PlaceKitError::invalid(format!(
            "`{name}` must be a single path segment, got `{value}`"
        )));
    }
    Ok(value)
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|err| PlaceKitError::Decode(format!("cannot encode request field: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{path_segment, require};
    use crate::{PatchUpdate, PlaceKitClient, PlaceKitError};

    #[test]
    fn require_rejects_blank_values() {
        assert!(require("id", "abc").is_ok());
        assert!(matches!(require("id", ""), Err(PlaceKitError::InvalidArgument(_))));
        assert!(matches!(require("id", "  "), Err(PlaceKitError::InvalidArgument(_))));
    }

    #[test]
    fn path_segment_rejects_separators_and_dot_segments() {
        assert_eq!(path_segment("id", "p_123-fr").expect("plain id"), "p_123-fr");
        for value in ["../keys", "a/b", "a\\b", "a?b", "a#b", "%2e%2e", ".", ".."] {
            assert!(
                matches!(path_segment("id", value), Err(PlaceKitError::InvalidArgument(_))),
                "{value} must be rejected"
            );
        }
    }

    #[tokio::test]
    async fn traversing_id_fails_without_request() {
        let client = PlaceKitClient::builder("k")
            .without_locale()
            .build()
            .expect("builds");

        assert!(matches!(
            client.patch().get("../keys", None).await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.patch().delete_lang("p1", "../../keys").await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.keys().delete("../patch/p1").await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn empty_id_fails_without_request() {
        let client = PlaceKitClient::builder("k")
            .without_locale()
            .build()
            .expect("builds");
        let patch = client.patch();

        assert!(matches!(
            patch.get("", None).await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            patch.update("", &PatchUpdate::default(), Default::default()).await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            patch.delete("").await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            patch.delete_lang("p1", "").await,
            Err(PlaceKitError::InvalidArgument(_))
        ));
    }
}
