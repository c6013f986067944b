//! Client for the Open Science Framework API v2 (<https://api.osf.io/v2/>).
//!
//! The API speaks JSON:API v1.0. Every call goes through the same path:
//! a service façade builds the URL, [`Client`] sends it through the
//! [`transport`], and the [`codec`] turns the response document into typed
//! values with the resource id copied into the value and pagination info
//! derived from the request.
//!
//! ```no_run
//! # async fn demo() -> Result<(), osf_api::Error> {
//! use osf_api::{Client, PreprintQuery, Query};
//!
//! let client = Client::new()?;
//! let page = client
//!     .preprints()
//!     .list(&PreprintQuery::default().with_provider("psyarxiv").with_page(2))
//!     .await?;
//! for preprint in &page.data {
//!     println!("{} {}", preprint.id, preprint.title);
//! }
//! println!("page {} of {} total", page.pagination.page, page.pagination.total);
//! # Ok(())
//! # }
//! ```
//!
//! Authentication is the caller's business: build a `reqwest::Client` with
//! the right default headers and hand it to [`Client::with_http_client`].

mod client;
pub mod codec;
pub mod envelope;
mod errors;
mod query;
pub mod services;
pub mod transport;
pub mod types;
pub mod workflow;

pub use self::client::{
    Client, DEFAULT_BASE_URL, DEFAULT_STORAGE_URL, TEST_BASE_URL, TEST_STORAGE_URL,
};
pub use self::codec::{Attributes, Collection, Single};
pub use self::errors::{DecodeError, Error, ServiceErrors};
pub use self::query::{PreprintProviderQuery, PreprintQuery, Query, QueryCommon};
pub use self::services::Upload;
pub use self::workflow::{CreatePreprint, Created, CreationError, Stage};
pub use tokio_util::sync::CancellationToken;
