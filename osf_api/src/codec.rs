//! Generic encode/decode between attribute values and JSON:API documents.
//!
//! Decoding always runs in the same order: reject documents carrying
//! `errors`, decode `data` into the caller's shapes, check the resource
//! type, copy the envelope `id` into the attribute value's primary-key slot,
//! then apply the optional build transform. The functions here are pure and
//! hold no state, so they can be called from any number of tasks at once.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    envelope::{
        PaginationLinks, PaginationMeta, RawDocument, Relationships, RequestDocument,
        RequestResource, ResourceObject,
    },
    errors::{DecodeError, ServiceErrors},
    Error,
};

/// Page size the service uses when the request does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Attribute shapes decoded from a resource's `attributes` member.
///
/// The wire format carries the identifier outside the attribute object.
/// Shapes that keep their own copy of it expose the slot here and the codec
/// fills it from the envelope `id` after decoding.
pub trait Attributes {
    /// Mutable access to the primary-key field, if the shape has one.
    fn primary_key_mut(&mut self) -> Option<&mut String> {
        None
    }
}

/// Turns a decoded resource into the value handed back to the caller. Used
/// when the value also needs data that lives outside `attributes`, such as
/// resource links.
pub type BuildFn<A, L> = fn(ResourceObject<A, L>) -> A;

/// Everything about the request/response pair the codec needs besides the body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Final URL of the request; pagination parameters are read from its query.
    pub url: Url,
    pub status: u16,
    /// Resource type the endpoint is expected to return, if checked.
    pub resource_type: Option<String>,
}

impl RequestContext {
    pub fn new(url: Url, status: u16) -> Self {
        Self {
            url,
            status,
            resource_type: None,
        }
    }

    /// Requires every decoded resource to carry this `type`.
    pub fn expecting(mut self, resource_type: &str) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self
    }
}

/// Envelope data kept next to a decoded value: identity, links and
/// relationships.
#[derive(Debug, Clone)]
pub struct ResourceMeta<L> {
    pub resource_type: String,
    pub id: Option<String>,
    pub links: Option<L>,
    pub relationships: Relationships,
}

/// A decoded single-resource response.
#[derive(Debug, Clone)]
pub struct Single<A, L> {
    pub data: A,
    pub resource: ResourceMeta<L>,
    pub status: u16,
}

/// A decoded collection response. `data` and `resources` are index-aligned
/// and in wire order.
#[derive(Debug, Clone)]
pub struct Collection<A, L> {
    pub data: Vec<A>,
    pub resources: Vec<ResourceMeta<L>>,
    pub links: Option<PaginationLinks>,
    pub pagination: PaginationMeta,
    pub status: u16,
}

impl<A, L> Collection<A, L> {
    /// Whether the service advertised a further page.
    pub fn has_next(&self) -> bool {
        self.links.as_ref().is_some_and(|l| l.next.is_some())
    }
}

/// Decodes a single-resource document.
pub fn decode_single<A, L>(
    body: &[u8],
    ctx: &RequestContext,
    build: Option<BuildFn<A, L>>,
) -> Result<Single<A, L>, Error>
where
    A: DeserializeOwned + Attributes,
    L: DeserializeOwned + Clone,
{
    let raw = parse_document(body, ctx)?;
    let data = raw.data.ok_or(DecodeError::MissingData)?;
    let object = serde_json::from_value::<ResourceObject<A, L>>(data).map_err(DecodeError::from)?;
    let (data, resource) = finish(object, ctx, build)?;
    Ok(Single {
        data,
        resource,
        status: ctx.status,
    })
}

/// Decodes a collection document and derives its pagination info.
pub fn decode_many<A, L>(
    body: &[u8],
    ctx: &RequestContext,
    build: Option<BuildFn<A, L>>,
) -> Result<Collection<A, L>, Error>
where
    A: DeserializeOwned + Attributes,
    L: DeserializeOwned + Clone,
{
    let raw = parse_document(body, ctx)?;
    let data = raw.data.ok_or(DecodeError::MissingData)?;
    let objects =
        serde_json::from_value::<Vec<ResourceObject<A, L>>>(data).map_err(DecodeError::from)?;
    let links = match raw.links {
        Some(Value::Null) | None => None,
        Some(links) => Some(
            serde_json::from_value::<PaginationLinks>(links).map_err(DecodeError::from)?,
        ),
    };

    let mut values = Vec::with_capacity(objects.len());
    let mut resources = Vec::with_capacity(objects.len());
    for object in objects {
        let (value, resource) = finish(object, ctx, build)?;
        values.push(value);
        resources.push(resource);
    }

    let pagination = pagination_meta(links.as_ref(), &ctx.url);
    Ok(Collection {
        data: values,
        resources,
        links,
        pagination,
        status: ctx.status,
    })
}

/// Serializes a request document holding one resource. `id` is left out
/// when creating, `attributes` when only relationships change.
pub fn encode_single<A: Serialize>(
    resource_type: &str,
    id: Option<&str>,
    attributes: Option<&A>,
    relationships: Option<&Relationships>,
) -> Result<Vec<u8>, Error> {
    let document = RequestDocument {
        data: RequestResource {
            resource_type,
            id,
            attributes,
            relationships,
        },
    };
    serde_json::to_vec(&document).map_err(Error::Encode)
}

/// Derives pagination info. Totals come from the response when it has them;
/// the page number, and the page size when the response is silent, come from
/// the request URL because the service does not echo them reliably.
pub fn pagination_meta(links: Option<&PaginationLinks>, request_url: &Url) -> PaginationMeta {
    let mut page_number = None;
    let mut plain_page = None;
    let mut page_size = None;
    for (key, value) in request_url.query_pairs() {
        match key.as_ref() {
            "page[number]" => page_number = value.parse::<u32>().ok(),
            "page" => plain_page = value.parse::<u32>().ok(),
            "page[size]" => page_size = value.parse::<u32>().ok(),
            _ => {}
        }
    }

    let totals = links.and_then(|l| l.meta);
    PaginationMeta {
        total: totals.and_then(|t| t.total).unwrap_or(0),
        per_page: totals
            .and_then(|t| t.per_page)
            .or(page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        page: page_number.or(plain_page).unwrap_or(1),
    }
}

/// Reads the `errors` member of a failed response, if the body is a
/// JSON:API error document at all.
pub(crate) fn error_document(body: &[u8], status: u16) -> Option<ServiceErrors> {
    let raw = serde_json::from_slice::<RawDocument>(body).ok()?;
    if raw.errors.is_empty() {
        return None;
    }
    Some(ServiceErrors {
        status,
        errors: raw.errors,
    })
}

/// Parses the outer document and surfaces a non-empty `errors` member
/// before anything looks at `data`.
fn parse_document(body: &[u8], ctx: &RequestContext) -> Result<RawDocument, Error> {
    let raw = serde_json::from_slice::<RawDocument>(body).map_err(DecodeError::from)?;
    if !raw.errors.is_empty() {
        return Err(Error::Service(ServiceErrors {
            status: ctx.status,
            errors: raw.errors,
        }));
    }
    Ok(raw)
}

fn finish<A, L>(
    mut object: ResourceObject<A, L>,
    ctx: &RequestContext,
    build: Option<BuildFn<A, L>>,
) -> Result<(A, ResourceMeta<L>), DecodeError>
where
    A: Attributes,
    L: Clone,
{
    if let Some(expected) = &ctx.resource_type {
        if &object.resource_type != expected {
            return Err(DecodeError::TypeMismatch {
                expected: expected.clone(),
                found: object.resource_type,
            });
        }
    }

    if let Some(id) = &object.id {
        if let Some(slot) = object.attributes.primary_key_mut() {
            *slot = id.clone();
        }
    }

    let resource = ResourceMeta {
        resource_type: object.resource_type.clone(),
        id: object.id.clone(),
        links: object.links.clone(),
        relationships: object.relationships.clone(),
    };
    let value = match build {
        Some(build) => build(object),
        None => object.attributes,
    };
    Ok((value, resource))
}
