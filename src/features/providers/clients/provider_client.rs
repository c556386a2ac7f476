use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::progress_stream::{chunked, percent, ProgressStream};
use crate::core::error::AppError;
use crate::features::providers::models::ProviderConfig;
use crate::features::storage::dtos::{
    CreateShareRequestDto, FileEntryDto, FileListResponseDto, ShareLinkDto, StorageStatsDto,
    UploadResponseDto,
};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, UPLOAD_CHUNK_SIZE};
use crate::shared::types::ErrorResponse;

const DOWNLOAD_PREALLOC_LIMIT: u64 = UPLOAD_CHUNK_SIZE as u64 * 16;

/// Bytes fetched from a provider
#[derive(Debug, Clone)]
pub struct DownloadedObject {
    pub data: Bytes,
    pub content_type: String,
    pub size: u64,
}

/// HTTP client for the provider file contract
pub struct ProviderClient {
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    fn request(&self, builder: RequestBuilder, provider: &ProviderConfig) -> RequestBuilder {
        builder.bearer_auth(&provider.credential)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        provider: &ProviderConfig,
    ) -> Result<Response, AppError> {
        let response = self.request(builder, provider).send().await.map_err(|e| {
            tracing::warn!("Provider {} unreachable: {}", provider.id, e);
            AppError::ProviderUnavailable(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());

        tracing::warn!(
            "Provider {} responded HTTP {}: {}",
            provider.id,
            status.as_u16(),
            message
        );
        Err(AppError::ProviderUnavailable(format!(
            "HTTP {}: {}",
            status.as_u16(),
            message
        )))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        provider: &ProviderConfig,
    ) -> Result<T, AppError> {
        self.send(builder, provider)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Invalid response body: {}", e)))
    }

    pub async fn list_files(
        &self,
        provider: &ProviderConfig,
        prefix: Option<&str>,
    ) -> Result<Vec<FileEntryDto>, AppError> {
        let builder = self
            .http
            .get(provider.url("/api/files"))
            .query(&[("prefix", prefix.unwrap_or(""))]);

        let listing: FileListResponseDto = self.json(builder, provider).await?;
        Ok(listing.files)
    }

    /// Uploads `data` to `path/file_name`, reporting percent sent as the
    /// body is streamed. 100 is reported once the provider acknowledges.
    pub async fn upload<F>(
        &self,
        provider: &ProviderConfig,
        path: &str,
        file_name: &str,
        data: Bytes,
        content_type: &str,
        on_progress: F,
    ) -> Result<UploadResponseDto, AppError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let total = data.len() as u64;
        let on_progress = std::sync::Arc::new(on_progress);
        let report = std::sync::Arc::clone(&on_progress);

        let chunks = chunked(data, UPLOAD_CHUNK_SIZE);
        let body = ProgressStream::new(
            futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>)),
            move |sent| report(percent(sent, total)),
        );

        let content_type = if Part::text("").mime_str(content_type).is_ok() {
            content_type
        } else {
            DEFAULT_CONTENT_TYPE
        };
        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::BadRequest(format!("Invalid content type: {}", e)))?;

        let form = Form::new().text("path", path.to_string()).part("file", part);
        let builder = self.http.post(provider.url("/api/upload")).multipart(form);

        let receipt: UploadResponseDto = self.json(builder, provider).await?;
        on_progress(100);
        Ok(receipt)
    }

    /// Downloads `key`, reporting `(bytes_so_far, total)`. Without a
    /// Content-Length the body is read whole and no progress is reported.
    pub async fn download<F>(
        &self,
        provider: &ProviderConfig,
        key: &str,
        mut on_progress: F,
    ) -> Result<DownloadedObject, AppError>
    where
        F: FnMut(u64, u64) + Send,
    {
        let builder = self
            .http
            .get(provider.url("/api/download"))
            .query(&[("key", key)]);
        let response = self.send(builder, provider).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = match response.content_length() {
            Some(total) => {
                // The advertised length is untrusted; grow past the cap on demand
                let mut buffer =
                    BytesMut::with_capacity(total.min(DOWNLOAD_PREALLOC_LIMIT) as usize);
                let stream =
                    ProgressStream::new(response.bytes_stream(), |received: u64| {
                        on_progress(received.min(total), total)
                    });
                futures::pin_mut!(stream);

                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| {
                        AppError::ProviderUnavailable(format!("Download interrupted: {}", e))
                    })?;
                    if buffer.len() as u64 + chunk.len() as u64 > total {
                        return Err(AppError::ProviderUnavailable(format!(
                            "Body exceeds advertised length of {} bytes",
                            total
                        )));
                    }
                    buffer.extend_from_slice(&chunk);
                }
                buffer.freeze()
            }
            None => response
                .bytes()
                .await
                .map_err(|e| AppError::ProviderUnavailable(format!("Download failed: {}", e)))?,
        };

        Ok(DownloadedObject {
            size: data.len() as u64,
            data,
            content_type,
        })
    }

    pub async fn delete(&self, provider: &ProviderConfig, key: &str) -> Result<(), AppError> {
        let builder = self
            .http
            .delete(provider.url("/api/files"))
            .query(&[("key", key)]);
        self.send(builder, provider).await?;
        Ok(())
    }

    pub async fn stats(&self, provider: &ProviderConfig) -> Result<StorageStatsDto, AppError> {
        let builder = self.http.get(provider.url("/api/stats"));
        self.json(builder, provider).await
    }

    pub async fn create_share(
        &self,
        provider: &ProviderConfig,
        request: &CreateShareRequestDto,
    ) -> Result<ShareLinkDto, AppError> {
        let builder = self.http.post(provider.url("/api/share")).json(request);
        self.json(builder, provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{bind_local, provider_config, spawn_provider};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn client() -> ProviderClient {
        ProviderClient::new(Duration::from_secs(10)).unwrap()
    }

    /// Serves one connection with a fixed raw HTTP response
    async fn raw_backend(response: &'static str) -> String {
        let (listener, base_url) = bind_local().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        base_url
    }

    #[tokio::test]
    async fn test_oversized_content_length_is_not_preallocated() {
        let base_url = raw_backend(
            "HTTP/1.1 200 OK\r\nContent-Length: 9000000000000000000\r\nConnection: close\r\n\r\nabc",
        )
        .await;
        let provider = provider_config("a", &base_url, "token-a");

        let result = client().download(&provider, "/huge.bin", |_, _| {}).await;
        assert!(matches!(result, Err(AppError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_download_without_length_returns_whole_body() {
        let base_url = raw_backend(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
        )
        .await;
        let provider = provider_config("a", &base_url, "token-a");

        let mut calls = 0;
        let downloaded = client()
            .download(&provider, "/greeting.txt", |_, _| calls += 1)
            .await
            .unwrap();

        assert_eq!(downloaded.data, Bytes::from_static(b"hello world"));
        assert_eq!(downloaded.size, 11);
        assert_eq!(downloaded.content_type, "text/plain");
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_upload_list_download_delete() {
        let backend = spawn_provider("token-a").await;
        let provider = provider_config("a", &backend.base_url, "token-a");
        let client = client();

        let progress = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&progress);
        let data = Bytes::from(vec![1u8; 200 * 1024]);
        let receipt = client
            .upload(&provider, "/docs", "big.bin", data.clone(), "application/octet-stream", move |p| {
                sink.lock().push(p)
            })
            .await
            .unwrap();

        assert_eq!(receipt.key, "/docs/big.bin");
        assert_eq!(receipt.size, data.len() as u64);
        let progress = progress.lock().clone();
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));

        let root = client.list_files(&provider, None).await.unwrap();
        assert_eq!(root.len(), 1);
        assert!(root[0].is_directory);

        let mut seen = Vec::new();
        let downloaded = client
            .download(&provider, "/docs/big.bin", |done, total| seen.push((done, total)))
            .await
            .unwrap();
        assert_eq!(downloaded.data, data);
        assert_eq!(seen.last(), Some(&(data.len() as u64, data.len() as u64)));

        client.delete(&provider, "/docs/big.bin").await.unwrap();
        assert!(!backend.store.contains("docs/big.bin"));
    }

    #[tokio::test]
    async fn test_wrong_credential_is_provider_unavailable() {
        let backend = spawn_provider("token-a").await;
        let provider = provider_config("a", &backend.base_url, "wrong");

        match client().stats(&provider).await {
            Err(AppError::ProviderUnavailable(msg)) => assert!(msg.contains("401")),
            other => panic!("unexpected result: {:?}", other.map(|s| s.used)),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reports_backend_error() {
        let backend = spawn_provider("token-a").await;
        let provider = provider_config("a", &backend.base_url, "token-a");

        match client().download(&provider, "/nope", |_, _| {}).await {
            Err(AppError::ProviderUnavailable(msg)) => {
                assert_eq!(msg, "HTTP 404: File not found")
            }
            other => panic!("unexpected result: {:?}", other.map(|o| o.size)),
        }
    }

    #[tokio::test]
    async fn test_stats_and_share() {
        let backend = spawn_provider("token-a").await;
        let provider = provider_config("a", &backend.base_url, "token-a");
        let client = client();

        client
            .upload(&provider, "", "a.txt", Bytes::from_static(b"hello"), "text/plain", |_| {})
            .await
            .unwrap();

        let stats = client.stats(&provider).await.unwrap();
        assert_eq!(stats.used, 5);
        assert_eq!(stats.file_count, 1);

        let link = client
            .create_share(
                &provider,
                &CreateShareRequestDto {
                    key: "/a.txt".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(link.share_url.ends_with(&format!("/s/{}", link.share_id)));

        let body = reqwest::get(&link.share_url).await.unwrap();
        assert_eq!(body.status(), 200);
        assert_eq!(
            body.headers()["content-disposition"],
            "attachment; filename=\"a.txt\""
        );
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }
}
