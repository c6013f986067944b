use std::path::Path;

use reqwest::Method;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::{
    codec::Single,
    transport::{RequestBody, TransportRequest},
    types::{build_file, File, FileLinks, TYPE_FILES},
    Client, Error,
};

/// Storage provider that holds primary files.
pub const STORAGE_PROVIDER: &str = "osfstorage";

/// Binary content to upload, streamed rather than held in memory.
pub struct Upload {
    name: String,
    body: reqwest::Body,
    content_length: Option<u64>,
}

impl Upload {
    /// Streams the file at `path`, named after its final path component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", path.display()),
                )
            })?
            .to_string();
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok(Self::from_reader(&name, file, Some(len)))
    }

    /// Streams from any async reader. Without a length the body is sent
    /// chunked.
    pub fn from_reader<R>(name: &str, reader: R, content_length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            body: reqwest::Body::wrap_stream(ReaderStream::new(reader)),
            content_length,
        }
    }

    /// Uploads bytes already in memory.
    pub fn from_bytes(name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self {
            name: name.to_string(),
            body: reqwest::Body::from(bytes),
            content_length: Some(len),
        }
    }

    /// File name the content is stored under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Strips the storage-provider prefix the storage service puts on file ids
/// (`"osfstorage/abc123"` becomes `"abc123"`).
pub fn normalize_file_id(id: &str) -> &str {
    id.strip_prefix(STORAGE_PROVIDER)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(id)
}

/// File endpoints of the API and the storage service.
pub struct Files<'a> {
    client: &'a Client,
}

impl<'a> Files<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches a file by id.
    pub async fn get(&self, id: &str) -> Result<Single<File, FileLinks>, Error> {
        let url = self.client.api_url(format!("files/{}/", id).as_str(), None)?;
        self.client
            .get_single(url, TYPE_FILES, Some(build_file))
            .await
    }

    /// Uploads a new file into the `osfstorage` provider of `resource_id`.
    /// The returned file id is as the storage service reports it, prefix
    /// included; see [`normalize_file_id`].
    pub async fn upload(
        &self,
        resource_id: &str,
        upload: Upload,
    ) -> Result<Single<File, FileLinks>, Error> {
        let mut url = self.client.storage_endpoint(
            format!("resources/{}/providers/{}/", resource_id, STORAGE_PROVIDER).as_str(),
        )?;
        url.query_pairs_mut()
            .append_pair("kind", "file")
            .append_pair("name", &upload.name);

        tracing::debug!(
            "Uploading {} ({:?} bytes) to {}",
            upload.name,
            upload.content_length,
            resource_id
        );
        let request = TransportRequest::new(Method::PUT, url).with_body(RequestBody::Stream {
            body: upload.body,
            content_length: upload.content_length,
        });
        self.client
            .request_single(request, TYPE_FILES, Some(build_file))
            .await
    }
}
