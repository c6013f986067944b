//! HTTP client for the OSF API v2.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    codec::{self, Attributes, BuildFn, Collection, RequestContext, Single},
    query::Query,
    services::{Files, PreprintProviders, Preprints},
    transport::{RequestBody, Transport, TransportRequest, TransportResponse, USER_AGENT_VALUE},
    Error,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.osf.io/v2/";
/// API root of the OSF test server.
pub const TEST_BASE_URL: &str = "https://api.test.osf.io/v2/";
/// Production storage (Waterbutler) root.
pub const DEFAULT_STORAGE_URL: &str = "https://files.osf.io/v1/";
/// Storage root of the OSF test server.
pub const TEST_STORAGE_URL: &str = "https://files.test.osf.io/v1/";

/// Connect timeout of the `reqwest::Client` built by [`Client::new`]. There is
/// no total timeout: streamed uploads run as long as the body takes, and the
/// creation workflow carries its own deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the OSF API.
///
/// Holds no mutable state: clone it or share it by reference across tasks.
/// Resource-specific calls live on the service façades returned by
/// [`Client::preprints`], [`Client::preprint_providers`] and [`Client::files`].
#[derive(Clone, Debug)]
pub struct Client {
    transport: Transport,
    /// API root. Always ends with `/`.
    base_url: Url,
    /// Storage service root used for uploads. Always ends with `/`.
    storage_url: Url,
}

impl Client {
    /// Creates an unauthenticated client pointing at the production API.
    pub fn new() -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e)
            })?;
        Self::with_http_client(http)
    }

    /// Creates a client over a pre-configured (typically authenticated)
    /// `reqwest::Client`, pointing at the production API.
    pub fn with_http_client(http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            transport: Transport::new(http),
            base_url: parse_root(DEFAULT_BASE_URL)?,
            storage_url: parse_root(DEFAULT_STORAGE_URL)?,
        })
    }

    /// Points the client at another API root. Used for the test server and
    /// for testing with wiremock.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, Error> {
        self.base_url = parse_root(base_url)?;
        Ok(self)
    }

    /// Points uploads at another storage root.
    pub fn with_storage_url(mut self, storage_url: &str) -> Result<Self, Error> {
        self.storage_url = parse_root(storage_url)?;
        Ok(self)
    }

    /// Points both roots at the OSF test server.
    pub fn with_test_server(self) -> Result<Self, Error> {
        self.with_base_url(TEST_BASE_URL)?
            .with_storage_url(TEST_STORAGE_URL)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn storage_url(&self) -> &Url {
        &self.storage_url
    }

    pub fn preprints(&self) -> Preprints<'_> {
        Preprints::new(self)
    }

    pub fn preprint_providers(&self) -> PreprintProviders<'_> {
        PreprintProviders::new(self)
    }

    pub fn files(&self) -> Files<'_> {
        Files::new(self)
    }

    /// Builds an API URL from a path relative to the API root.
    pub(crate) fn api_url(&self, path: &str, query: Option<&dyn Query>) -> Result<Url, Error> {
        let url = join_root(&self.base_url, path)?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// Builds a storage URL from a path relative to the storage root.
    pub(crate) fn storage_endpoint(&self, path: &str) -> Result<Url, Error> {
        join_root(&self.storage_url, path)
    }

    pub(crate) async fn request_single<A, L>(
        &self,
        request: TransportRequest,
        resource_type: &str,
        build: Option<BuildFn<A, L>>,
    ) -> Result<Single<A, L>, Error>
    where
        A: DeserializeOwned + Attributes,
        L: DeserializeOwned + Clone,
    {
        let (resp, ctx) = self.execute(request, resource_type).await?;
        codec::decode_single(&resp.body, &ctx, build).map_err(|e| log_decode_failure(e, &resp))
    }

    pub(crate) async fn request_many<A, L>(
        &self,
        request: TransportRequest,
        resource_type: &str,
        build: Option<BuildFn<A, L>>,
    ) -> Result<Collection<A, L>, Error>
    where
        A: DeserializeOwned + Attributes,
        L: DeserializeOwned + Clone,
    {
        let (resp, ctx) = self.execute(request, resource_type).await?;
        codec::decode_many(&resp.body, &ctx, build).map_err(|e| log_decode_failure(e, &resp))
    }

    /// Shorthand for a `GET` of a single resource.
    pub(crate) async fn get_single<A, L>(
        &self,
        url: Url,
        resource_type: &str,
        build: Option<BuildFn<A, L>>,
    ) -> Result<Single<A, L>, Error>
    where
        A: DeserializeOwned + Attributes,
        L: DeserializeOwned + Clone,
    {
        self.request_single(TransportRequest::new(Method::GET, url), resource_type, build)
            .await
    }

    /// Sends the request and turns non-success statuses into errors.
    async fn execute(
        &self,
        request: TransportRequest,
        resource_type: &str,
    ) -> Result<(TransportResponse, RequestContext), Error> {
        let resp = self.transport.send(request).await?;
        let status = resp.status;

        if !status.is_success() {
            if let Some(errors) = codec::error_document(&resp.body, status.as_u16()) {
                tracing::error!("Request failed with status {}: {}", status, errors);
                return Err(Error::Service(errors));
            }
            let snippet = truncate_body(&resp.body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let ctx = RequestContext::new(resp.url.clone(), status.as_u16()).expecting(resource_type);
        Ok((resp, ctx))
    }
}

/// Builds a request carrying a JSON:API document.
pub(crate) fn json_request(method: Method, url: Url, body: Vec<u8>) -> TransportRequest {
    TransportRequest::new(method, url).with_body(RequestBody::Json(body))
}

fn parse_root(root: &str) -> Result<Url, Error> {
    let url = Url::parse(root)?;
    if !url.path().ends_with('/') {
        return Err(Error::InvalidBaseUrl(root.to_string()));
    }
    Ok(url)
}

fn join_root(root: &Url, path: &str) -> Result<Url, Error> {
    Url::parse(format!("{}{}", root, path.trim_start_matches('/')).as_str()).map_err(|e| {
        tracing::error!("Invalid URL constructed: {}", e);
        Error::InvalidUrl(e)
    })
}

fn log_decode_failure(err: Error, resp: &TransportResponse) -> Error {
    if let Error::Decode(e) = &err {
        tracing::error!(
            "Failed to decode response from {}: {} | body: {}",
            resp.url,
            e,
            truncate_body(&resp.body)
        );
    }
    err
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 2000;
    let body = String::from_utf8_lossy(body);
    if body.len() <= MAX {
        body.into_owned()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
