//! Object-storage surface.
//!
//! Upload, delete and public-URL retrieval for objects addressed by bucket
//! name and path.

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use super::{expect_success, ApiError, SupabaseClient};

impl SupabaseClient {
    /// Upload an object, replacing any existing one at the same path.
    pub async fn storage_upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        let resp = self
            .request(Method::POST, &format!("/storage/v1/object/{bucket}/{path}"))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        expect_success(resp).await
    }

    /// Delete an object.
    pub async fn storage_remove(&self, bucket: &str, path: &str) -> Result<(), ApiError> {
        let resp = self
            .request(
                Method::DELETE,
                &format!("/storage/v1/object/{bucket}/{path}"),
            )
            .send()
            .await?;
        expect_success(resp).await
    }

    /// Public URL of an object in a public bucket. No request is made.
    pub fn storage_public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}

/// Content type for an uploaded file, derived from its extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
