//! JSON:API v1.0 document shapes shared by every endpoint.
//!
//! A response document is parsed in two steps: first into a loose
//! [`RawDocument`] so the `errors` member can be checked without touching
//! `data`, then `data` is decoded into [`ResourceObject`]s of the caller's
//! attribute and links shapes (see [`crate::codec`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Relationship name to relationship object.
pub type Relationships = BTreeMap<String, Relationship>;

/// A single resource as it appears in the `data` member of a response.
///
/// `A` is the attribute shape, `L` the resource-level links shape. The
/// identifier travels next to the attributes, never inside them.
#[derive(Deserialize, Debug, Clone)]
pub struct ResourceObject<A, L> {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: Option<String>,
    pub attributes: A,
    pub links: Option<L>,
    #[serde(default)]
    pub relationships: Relationships,
}

/// Weak reference to another resource by type and id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// Resource linkage of a relationship: to-one or to-many.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResourceLinkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// A link is either a bare URL or an object with an `href`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Link {
    Url(String),
    Object {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Map<String, Value>>,
    },
}

impl Link {
    pub fn href(&self) -> &str {
        match self {
            Link::Url(url) => url,
            Link::Object { href, .. } => href,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RelationshipLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<Link>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResourceLinkage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Relationship {
    /// A to-one relationship pointing at `resource_type`/`id`.
    pub fn to_one(resource_type: &str, id: &str) -> Self {
        Self {
            data: Some(ResourceLinkage::One(ResourceIdentifier::new(resource_type, id))),
            ..Default::default()
        }
    }

    /// The referenced resource of a to-one relationship.
    pub fn identifier(&self) -> Option<&ResourceIdentifier> {
        match &self.data {
            Some(ResourceLinkage::One(identifier)) => Some(identifier),
            _ => None,
        }
    }
}

/// `links` member of a collection document.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PaginationLinks {
    pub first: Option<String>,
    pub last: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub meta: Option<PaginationTotals>,
}

/// Totals the service reports inside the pagination links.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
pub struct PaginationTotals {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Pagination info derived from the response and the outgoing request URL.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub total: u64,
    pub per_page: u32,
    /// 1-indexed page number that was requested.
    pub page: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// One element of a document's `errors` member.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// First-pass view of a response document. `data` stays untyped until the
/// `errors` member has been checked.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct RawDocument {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
    #[serde(default)]
    pub links: Option<Value>,
}

/// Request document with a single resource in `data`.
#[derive(Serialize)]
pub(crate) struct RequestDocument<'a, A> {
    pub data: RequestResource<'a, A>,
}

#[derive(Serialize)]
pub(crate) struct RequestResource<'a, A> {
    #[serde(rename = "type")]
    pub resource_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<&'a A>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<&'a Relationships>,
}
