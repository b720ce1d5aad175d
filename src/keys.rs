use reqwest::Method;

use crate::{
    patch::{path_segment, to_json},
    KeyOptions, KeyRecord, KeyRole, RequestHandle, Result,
};

/// API key management, see [`PlaceKitClient::keys`](crate::PlaceKitClient::keys).
#[derive(Clone, Copy, Debug)]
pub struct Keys<'a> {
    handle: &'a RequestHandle,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(handle: &'a RequestHandle) -> Self {
        Self { handle }
    }

    pub async fn list(&self) -> Result<Vec<KeyRecord>> {
        self.handle
            .request_as(Method::GET, "keys", self.handle.transport_params())
            .await
    }

    pub async fn create(&self, role: KeyRole, opts: KeyOptions) -> Result<KeyRecord> {
        let mut params = self.handle.transport_params().set("role", to_json(&role)?);
        if let Some(domains) = opts.domains {
            params.insert("domains", domains);
        }
        self.handle.request_as(Method::POST, "keys", params).await
    }

    pub async fn get(&self, id: &str) -> Result<KeyRecord> {
        let id = path_segment("id", id)?;
        self.handle
            .request_as(Method::GET, &format!("keys/{id}"), self.handle.transport_params())
            .await
    }

    pub async fn update(&self, id: &str, opts: KeyOptions) -> Result<KeyRecord> {
        let id = path_segment("id", id)?;
        let mut params = self.handle.transport_params();
        if let Some(domains) = opts.domains {
            params.insert("domains", domains);
        }
        self.handle
            .request_as(Method::PATCH, &format!("keys/{id}"), params)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = path_segment("id", id)?;
        self.handle
            .request(Method::DELETE, &format!("keys/{id}"), self.handle.transport_params())
            .await?;
        Ok(())
    }
}
