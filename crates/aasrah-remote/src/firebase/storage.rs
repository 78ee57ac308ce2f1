//! Report photos in Cloud Storage for Firebase.

use std::sync::Arc;

use aasrah_shared::{ObjectStore, ServiceError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::auth::FirebaseAuth;
use super::{check, invalid, network, FirebaseConfig};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Public download address of an object. The object name is a single
/// path segment, so its `/` separators are percent-encoded.
pub fn download_url(
    storage_url: &str,
    bucket: &str,
    name: &str,
    token: Option<&str>,
) -> Result<String, ServiceError> {
    let base = format!("{}/b/{}/o", storage_url.trim_end_matches('/'), bucket);
    let mut url = Url::parse(&base)
        .map_err(|e| ServiceError::Storage(format!("Invalid storage URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ServiceError::Storage(format!("Storage URL '{base}' cannot hold a path")))?
        .push(name);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("alt", "media");
        if let Some(token) = token {
            query.append_pair("token", token);
        }
    }
    Ok(url.to_string())
}

pub struct FirebaseStorage {
    http: reqwest::Client,
    auth: Arc<FirebaseAuth>,
    storage_url: String,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(http: reqwest::Client, auth: Arc<FirebaseAuth>, config: &FirebaseConfig) -> Self {
        Self {
            http,
            auth,
            storage_url: config.storage_url.clone(),
            bucket: config.storage_bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        let token = self.auth.id_token().await?;
        let size = data.len();
        let url = format!(
            "{}/b/{}/o",
            self.storage_url.trim_end_matches('/'),
            self.bucket
        );
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[("uploadType", "media"), ("name", key)])
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(network)?;

        let uploaded: UploadResponse = check(resp)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?
            .json()
            .await
            .map_err(invalid)?;

        // Several tokens may be returned comma-separated; any one works.
        let token = uploaded
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next());
        let address = download_url(&self.storage_url, &self.bucket, &uploaded.name, token)?;
        debug!(key, size, "Uploaded object");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_encodes_object_name() {
        let url = download_url(
            "https://firebasestorage.googleapis.com/v0",
            "aasrah.appspot.com",
            "report-images/1700000000000_dog.jpg",
            Some("tok-123"),
        )
        .unwrap();
        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/aasrah.appspot.com/o/report-images%2F1700000000000_dog.jpg?alt=media&token=tok-123"
        );
    }

    #[test]
    fn test_download_url_without_token() {
        let url = download_url("http://localhost:9199/v0/", "bucket", "a b.png", None).unwrap();
        assert_eq!(url, "http://localhost:9199/v0/b/bucket/o/a%20b.png?alt=media");
    }

    #[test]
    fn test_upload_response_shape() {
        let body = r#"{"name":"report-images/1_x.jpg","bucket":"b","contentType":"image/jpeg",
                       "size":"42","downloadTokens":"t1,t2"}"#;
        let parsed: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.name, "report-images/1_x.jpg");
        assert_eq!(parsed.download_tokens.as_deref(), Some("t1,t2"));
    }
}
