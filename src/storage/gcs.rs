// src/storage/gcs.rs
// DOCUMENTATION: Google Cloud Storage adapter
// PURPOSE: Implement ObjectStore against the GCS JSON API over plain HTTP

use crate::errors::GalleryError;
use crate::storage::object_store::{ObjectRecord, ObjectStore};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;
use sha1::Sha1;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// RFC 3986 unreserved characters stay literal in encoded object names
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Same set, keeping path separators for public URLs
const OBJECT_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

const MAX_LISTING_RESULTS: u32 = 1000;

/// GCS-backed object store
/// DOCUMENTATION: Lists/reads/writes objects through the JSON API and signs
/// read URLs with interop HMAC keys. Without HMAC credentials signed_url
/// errors and callers fall back to the public URL.
pub struct GcsObjectStore {
    client: Client,
    base_url: String,
    bucket: String,
    access_id: Option<String>,
    secret: Option<String>,
    api_token: Option<String>,
}

/// Listing response from the JSON API
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<GcsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GcsItem {
    name: String,
    size: Option<String>,
    content_type: Option<String>,
    updated: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl GcsObjectStore {
    /// Create a new store for a bucket. Empty credential strings mean the
    /// corresponding capability is unavailable.
    pub fn new(bucket: String, access_id: String, secret: String, api_token: String) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        Self {
            client: Client::new(),
            base_url: "https://storage.googleapis.com".to_string(),
            bucket,
            access_id: non_empty(access_id),
            secret: non_empty(secret),
            api_token: non_empty(api_token),
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn encoded_name(&self, name: &str) -> String {
        utf8_percent_encode(name, OBJECT_NAME).to_string()
    }

    /// Interop-style signed URL for a fixed expiry timestamp.
    /// Split out from signed_url so the signature shape is testable.
    fn signed_url_at(&self, name: &str, expires: i64) -> Result<String, GalleryError> {
        let (access_id, secret) = match (&self.access_id, &self.secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(GalleryError::StorageError(
                    "no HMAC signing credentials configured".to_string(),
                ))
            }
        };

        let resource = format!(
            "/{}/{}",
            self.bucket,
            utf8_percent_encode(name, OBJECT_PATH)
        );
        let string_to_sign = format!("GET\n\n\n{}\n{}", expires, resource);

        let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
            .map_err(|e| GalleryError::StorageError(format!("invalid HMAC secret: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!(
            "{}?AWSAccessKeyId={}&Expires={}&Signature={}",
            self.public_url(name),
            access_id,
            expires,
            utf8_percent_encode(&signature, OBJECT_NAME)
        ))
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectRecord>, GalleryError> {
        let url = format!("{}/storage/v1/b/{}/o", self.base_url, self.bucket);

        log::debug!(
            "Listing bucket {} with prefix '{}' (single page)",
            self.bucket,
            prefix
        );

        let response = self
            .authorize(self.client.get(&url).query(&[
                ("prefix", prefix),
                ("maxResults", &MAX_LISTING_RESULTS.to_string()),
            ]))
            .send()
            .await
            .map_err(|e| GalleryError::StorageError(format!("listing request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GalleryError::StorageError(format!(
                "listing failed with {}: {}",
                status, body
            )));
        }

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|e| GalleryError::StorageError(format!("listing parse error: {}", e)))?;

        Ok(listing
            .items
            .into_iter()
            .map(|item| ObjectRecord {
                size: item
                    .size
                    .as_deref()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
                name: item.name,
                content_type: item.content_type,
                updated: item.updated,
                metadata: item.metadata,
            })
            .collect())
    }

    async fn signed_url(&self, name: &str, ttl: Duration) -> Result<String, GalleryError> {
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        self.signed_url_at(name, expires)
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.bucket,
            utf8_percent_encode(name, OBJECT_PATH)
        )
    }

    async fn download(&self, name: &str) -> Result<Vec<u8>, GalleryError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.base_url,
            self.bucket,
            self.encoded_name(name)
        );

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| GalleryError::StorageError(format!("download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GalleryError::StorageError(format!(
                "download of {} failed with {}",
                name,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GalleryError::StorageError(format!("download body error: {}", e)))?;

        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        mut metadata: HashMap<String, String>,
    ) -> Result<(), GalleryError> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=multipart",
            self.base_url, self.bucket
        );

        // "cacheControl" is a resource field, not custom metadata; callers
        // smuggle it through the metadata map.
        let cache_control = metadata.remove("cacheControl");

        let resource = serde_json::json!({
            "name": name,
            "contentType": content_type,
            "cacheControl": cache_control,
            "metadata": metadata,
        });

        let boundary = format!("gallery_{}", Uuid::new_v4().simple());
        let mut body: Vec<u8> = Vec::with_capacity(bytes.len() + 512);
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
                boundary, resource
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("--{}\r\nContent-Type: {}\r\n\r\n", boundary, content_type).as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let response = self
            .authorize(
                self.client
                    .post(&url)
                    .header(
                        "Content-Type",
                        format!("multipart/related; boundary={}", boundary),
                    )
                    .body(body),
            )
            .send()
            .await
            .map_err(|e| GalleryError::StorageError(format!("upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GalleryError::StorageError(format!(
                "upload of {} failed with {}: {}",
                name, status, body
            )));
        }

        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), GalleryError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            self.bucket,
            self.encoded_name(name)
        );

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| GalleryError::StorageError(format!("delete failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GalleryError::StorageError(format!(
                "delete of {} failed with {}",
                name,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_credentials() -> GcsObjectStore {
        GcsObjectStore::new(
            "test-bucket".to_string(),
            "GOOGTEST".to_string(),
            "secretkey".to_string(),
            String::new(),
        )
    }

    #[test]
    fn test_public_url_encodes_name_but_keeps_slashes() {
        let store = store_with_credentials();
        let url = store.public_url("boudoir/la fille_54701383010_o.jpg");

        assert_eq!(
            url,
            "https://storage.googleapis.com/test-bucket/boudoir/la%20fille_54701383010_o.jpg"
        );
    }

    #[test]
    fn test_signed_url_carries_expiry_and_access_id() {
        let store = store_with_credentials();
        let url = store.signed_url_at("photo.jpg", 1_700_000_000).unwrap();

        assert!(url.starts_with("https://storage.googleapis.com/test-bucket/photo.jpg?"));
        assert!(url.contains("AWSAccessKeyId=GOOGTEST"));
        assert!(url.contains("Expires=1700000000"));
        assert!(url.contains("Signature="));
    }

    #[test]
    fn test_signed_url_is_deterministic_for_fixed_expiry() {
        let store = store_with_credentials();
        let first = store.signed_url_at("photo.jpg", 1_700_000_000).unwrap();
        let second = store.signed_url_at("photo.jpg", 1_700_000_000).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_signed_url_without_credentials_errors() {
        let store = GcsObjectStore::new(
            "test-bucket".to_string(),
            String::new(),
            String::new(),
            String::new(),
        );

        assert!(store.signed_url_at("photo.jpg", 1_700_000_000).is_err());
    }
}
