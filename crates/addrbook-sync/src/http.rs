//! HTTP backend for a remote address service.
//!
//! Endpoints, relative to the base URL:
//!
//! - `GET    /api/addresses`        list
//! - `POST   /api/addresses`        add (body: new address)
//! - `PATCH  /api/addresses`        edit (body: `{ addressId, <changed fields> }`)
//! - `DELETE /api/addresses/{id}`   delete

use addrbook_core::{AddressId, AddressRecord, NewAddress, UpdatePayload};
use addrbook_store::{AddressBackend, StoreError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SyncError> for StoreError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Http(e) => StoreError::Transport(e.to_string()),
            SyncError::Server { status, body } => StoreError::Remote { status, body },
            SyncError::Json(e) => StoreError::Json(e),
        }
    }
}

/// Address backend speaking JSON over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Create a backend for the given service base URL.
    ///
    /// `base_url` should be like `http://localhost:3000`; a trailing slash is
    /// dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/addresses", self.base_url)
    }

    fn item_url(&self, id: &AddressId) -> String {
        format!("{}/api/addresses/{}", self.base_url, id)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, SyncError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, SyncError> {
        let resp = self.send(builder).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl AddressBackend for HttpBackend {
    async fn fetch_all(&self) -> Result<Vec<AddressRecord>, StoreError> {
        let url = self.collection_url();
        info!(url = %url, "fetching addresses");
        let records: Vec<AddressRecord> = self
            .send_json(self.request(reqwest::Method::GET, &url))
            .await?;
        info!(count = records.len(), "fetched addresses");
        Ok(records)
    }

    async fn insert(&self, address: NewAddress) -> Result<AddressRecord, StoreError> {
        let url = self.collection_url();
        debug!(url = %url, "posting new address");
        let record = self
            .send_json(self.request(reqwest::Method::POST, &url).json(&address))
            .await?;
        Ok(record)
    }

    async fn patch(&self, payload: UpdatePayload) -> Result<AddressRecord, StoreError> {
        let url = self.collection_url();
        debug!(url = %url, address_id = %payload.address_id, "patching address");
        let record = self
            .send_json(self.request(reqwest::Method::PATCH, &url).json(&payload))
            .await?;
        Ok(record)
    }

    async fn remove(&self, id: &AddressId) -> Result<(), StoreError> {
        let url = self.item_url(id);
        debug!(url = %url, "deleting address");
        self.send(self.request(reqwest::Method::DELETE, &url))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrbook_core::{AddressField, AddressFields};

    #[test]
    fn backend_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:3000/");
        assert_eq!(backend.base_url(), "http://localhost:3000");
        assert_eq!(backend.collection_url(), "http://localhost:3000/api/addresses");
        assert_eq!(
            backend.item_url(&AddressId::from("12")),
            "http://localhost:3000/api/addresses/12"
        );
    }

    #[test]
    fn list_response_parses() {
        let json = r#"[
            {"id": 1, "fullName": "Asha", "phone": "0123", "street": "MG Rd",
             "landmark": "", "pinCode": "560001", "city": "Bengaluru", "state": "Karnataka"},
            {"id": "b2", "fullName": "Dev", "phone": "9876", "street": "Park St",
             "landmark": "Metro", "pinCode": "700016", "city": "Kolkata", "state": "West Bengal"}
        ]"#;
        let records: Vec<AddressRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "1");
        assert_eq!(records[0].fields.phone, "0123");
        assert_eq!(records[1].fields.state, "West Bengal");
    }

    #[test]
    fn add_body_has_no_id() {
        let body = serde_json::to_value(NewAddress(AddressFields {
            full_name: "Asha".into(),
            pin_code: "000123".into(),
            ..Default::default()
        }))
        .unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["pinCode"], "000123");
        assert_eq!(body["fullName"], "Asha");
    }

    #[test]
    fn edit_body_carries_only_changes() {
        let mut payload = UpdatePayload::new(AddressId::from("1"));
        payload.set(AddressField::City, "Y");
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body, serde_json::json!({"addressId": "1", "city": "Y"}));
    }

    #[test]
    fn server_error_maps_to_remote() {
        let err: StoreError = SyncError::Server {
            status: 422,
            body: "state is required".into(),
        }
        .into();
        assert!(matches!(err, StoreError::Remote { status: 422, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let err = backend.fetch_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
