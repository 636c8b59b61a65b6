//! Data Lake Storage Gen2 REST backend
//!
//! Talks to `https://<account>.dfs.core.windows.net` with bearer tokens from a
//! [`TokenCredential`]. Paths are percent-encoded segment by segment.

use crate::error::{ArtifactError, BackendError};
use crate::path;
use crate::ports::{
    DataLakeService, DirectoryClient, FileClient, FileSystemClient, TokenCredential, UploadReader,
};
use adls_types::PathItem;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, IF_NONE_MATCH};
use reqwest::{Body, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// REST API version sent with every request
pub const API_VERSION: &str = "2023-11-03";

const CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Account-level REST client
#[derive(Clone)]
pub struct DataLakeRestService {
    client: reqwest::Client,
    account_url: Url,
    credential: Arc<dyn TokenCredential>,
}

impl DataLakeRestService {
    /// Build a client for `account_url`; `timeout` bounds every request.
    pub fn new(
        account_url: &str,
        credential: Arc<dyn TokenCredential>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let account_url = Url::parse(account_url)
            .map_err(|e| ArtifactError::Config(format!("invalid account URL {account_url}: {e}")))?;
        if account_url.cannot_be_a_base() {
            return Err(ArtifactError::Config(format!(
                "account URL cannot carry paths: {account_url}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::from)?;

        Ok(Self {
            client,
            account_url,
            credential,
        })
    }
}

impl DataLakeService for DataLakeRestService {
    fn file_system(&self, name: &str) -> Arc<dyn FileSystemClient> {
        Arc::new(RestFileSystem {
            inner: Arc::new(RestContext {
                service: self.clone(),
                filesystem: name.to_string(),
            }),
        })
    }
}

struct RestContext {
    service: DataLakeRestService,
    filesystem: String,
}

impl RestContext {
    /// `https://<account>/<filesystem>/<path segments...>`
    fn url(&self, path: &str) -> Result<Url, BackendError> {
        let mut url = self.service.account_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                BackendError::InvalidResponse(format!(
                    "account URL cannot carry paths: {}",
                    self.service.account_url
                ))
            })?;
            segments.clear().push(&self.filesystem);
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.service
            .client
            .request(method, url)
            .header("x-ms-version", API_VERSION)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, BackendError> {
        let token = self.service.credential.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;
        check_status(response, path).await
    }
}

async fn check_status(response: Response, path: &str) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    Err(match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(path.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Authentication(message),
        _ => BackendError::Service {
            status: status.as_u16(),
            message,
        },
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// `"<code>: <message>"` from a Data Lake JSON error body
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    Some(format!("{}: {}", parsed.error.code, parsed.error.message))
}

#[derive(Deserialize)]
struct ListPathsResponse {
    #[serde(default)]
    paths: Vec<RawPath>,
}

/// Entry of a list response; the service encodes booleans and numbers as
/// strings.
#[derive(Deserialize)]
struct RawPath {
    name: String,
    #[serde(rename = "isDirectory", default)]
    is_directory: Option<serde_json::Value>,
    #[serde(rename = "contentLength", default)]
    content_length: Option<serde_json::Value>,
}

impl RawPath {
    fn into_item(self) -> Result<PathItem, BackendError> {
        let is_directory = match &self.is_directory {
            None => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(other) => {
                return Err(BackendError::InvalidResponse(format!(
                    "isDirectory for {}: {other}",
                    self.name
                )))
            }
        };
        let content_length = match &self.content_length {
            None => None,
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => Some(s.parse::<u64>().map_err(|e| {
                BackendError::InvalidResponse(format!("contentLength for {}: {e}", self.name))
            })?),
            Some(other) => {
                return Err(BackendError::InvalidResponse(format!(
                    "contentLength for {}: {other}",
                    self.name
                )))
            }
        };

        Ok(if is_directory {
            PathItem::directory(self.name)
        } else {
            PathItem::file(self.name, content_length.unwrap_or(0))
        })
    }
}

struct RestFileSystem {
    inner: Arc<RestContext>,
}

#[async_trait]
impl FileSystemClient for RestFileSystem {
    async fn list_paths(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<PathItem>, BackendError> {
        let directory = path.trim_matches('/');
        let mut items = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut url = self.inner.url("")?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("resource", "filesystem")
                    .append_pair("recursive", if recursive { "true" } else { "false" });
                if !directory.is_empty() {
                    query.append_pair("directory", directory);
                }
                if let Some(token) = &continuation {
                    query.append_pair("continuation", token);
                }
            }

            debug!(filesystem = %self.inner.filesystem, directory, recursive, "list paths");
            let response = self
                .inner
                .send(self.inner.request(Method::GET, url), directory)
                .await?;
            continuation = response
                .headers()
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let page: ListPathsResponse = response.json().await?;
            for raw in page.paths {
                items.push(raw.into_item()?);
            }

            if continuation.is_none() {
                break;
            }
        }

        Ok(items)
    }

    fn directory(&self, path: &str) -> Box<dyn DirectoryClient> {
        Box::new(RestDirectory {
            inner: self.inner.clone(),
            path: path.trim_matches('/').to_string(),
        })
    }
}

struct RestDirectory {
    inner: Arc<RestContext>,
    path: String,
}

impl DirectoryClient for RestDirectory {
    fn path(&self) -> &str {
        &self.path
    }

    fn file(&self, relative_name: &str) -> Box<dyn FileClient> {
        Box::new(RestFile {
            inner: self.inner.clone(),
            path: path::join(&self.path, relative_name)
                .trim_matches('/')
                .to_string(),
        })
    }
}

struct RestFile {
    inner: Arc<RestContext>,
    path: String,
}

impl RestFile {
    async fn put_resource(&self, overwrite: bool) -> Result<(), BackendError> {
        let mut url = self.inner.url(&self.path)?;
        url.query_pairs_mut().append_pair("resource", "file");

        let mut request = self
            .inner
            .request(Method::PUT, url)
            .header(CONTENT_LENGTH, 0);
        if !overwrite {
            request = request.header(IF_NONE_MATCH, "*");
        }
        self.inner.send(request, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl FileClient for RestFile {
    fn path(&self) -> &str {
        &self.path
    }

    async fn create(&self) -> Result<(), BackendError> {
        debug!(path = %self.path, "create empty file");
        self.put_resource(true).await
    }

    async fn upload(
        &self,
        reader: UploadReader,
        length: u64,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        debug!(path = %self.path, length, overwrite, "upload file");
        self.put_resource(overwrite).await?;
        if length == 0 {
            return Ok(());
        }

        let mut url = self.inner.url(&self.path)?;
        url.query_pairs_mut()
            .append_pair("action", "append")
            .append_pair("position", "0");
        let request = self
            .inner
            .request(Method::PATCH, url)
            .header(CONTENT_LENGTH, length)
            .body(Body::wrap_stream(ReaderStream::new(reader)));
        self.inner.send(request, &self.path).await?;

        let mut url = self.inner.url(&self.path)?;
        url.query_pairs_mut()
            .append_pair("action", "flush")
            .append_pair("position", &length.to_string());
        let request = self
            .inner
            .request(Method::PATCH, url)
            .header(CONTENT_LENGTH, 0);
        self.inner.send(request, &self.path).await?;
        Ok(())
    }

    async fn download_to(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, BackendError> {
        let url = self.inner.url(&self.path)?;
        debug!(path = %self.path, "download file");
        let response = self
            .inner
            .send(self.inner.request(Method::GET, url), &self.path)
            .await?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StaticTokenCredential;

    fn context(filesystem: &str) -> RestContext {
        let service = DataLakeRestService::new(
            "https://acct.dfs.core.windows.net",
            Arc::new(StaticTokenCredential::new("token")),
            Duration::from_secs(5),
        )
        .unwrap();
        RestContext {
            service,
            filesystem: filesystem.to_string(),
        }
    }

    #[test]
    fn test_url_encodes_segments() {
        let ctx = context("fs");
        let url = ctx.url("runs/a b/model#1.bin").unwrap();
        assert_eq!(
            url.as_str(),
            "https://acct.dfs.core.windows.net/fs/runs/a%20b/model%231.bin"
        );
        assert_eq!(ctx.url("").unwrap().as_str(), "https://acct.dfs.core.windows.net/fs");
    }

    #[test]
    fn test_new_rejects_bad_account_url() {
        let err = DataLakeRestService::new(
            "not a url",
            Arc::new(StaticTokenCredential::new("token")),
            Duration::from_secs(5),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ArtifactError::Config(_)));
    }

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"error":{"code":"PathNotFound","message":"The specified path does not exist."}}"#;
        assert_eq!(
            error_message(body).unwrap(),
            "PathNotFound: The specified path does not exist."
        );
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn test_list_response_parsing() {
        let body = r#"{"paths":[
            {"name":"runs/1","isDirectory":"true","contentLength":"0"},
            {"name":"runs/1.txt","contentLength":"42"},
            {"name":"runs/2.txt","contentLength":7}
        ]}"#;
        let page: ListPathsResponse = serde_json::from_str(body).unwrap();
        let items: Vec<PathItem> = page
            .paths
            .into_iter()
            .map(|raw| raw.into_item().unwrap())
            .collect();
        assert_eq!(
            items,
            vec![
                PathItem::directory("runs/1"),
                PathItem::file("runs/1.txt", 42),
                PathItem::file("runs/2.txt", 7),
            ]
        );
    }

    #[test]
    fn test_list_response_rejects_bad_length() {
        let body = r#"{"paths":[{"name":"f","contentLength":"lots"}]}"#;
        let page: ListPathsResponse = serde_json::from_str(body).unwrap();
        let err = page.paths.into_iter().next().unwrap().into_item().unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[test]
    fn test_empty_list_response() {
        let page: ListPathsResponse = serde_json::from_str("{}").unwrap();
        assert!(page.paths.is_empty());
    }
}
