use reqwest::Method;

use crate::{
    client::json_request,
    codec::{encode_single, Collection, Single},
    envelope::{Relationship, Relationships},
    query::PreprintQuery,
    transport::TransportRequest,
    types::{
        build_preprint, Preprint, PreprintInput, PreprintLinks, TYPE_PREPRINTS,
        TYPE_PREPRINT_PROVIDERS,
    },
    workflow::CreatePreprint,
    Client, Error,
};

use super::Upload;

/// `/preprints` endpoints.
pub struct Preprints<'a> {
    client: &'a Client,
}

impl<'a> Preprints<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches a page of preprints matching the given query.
    pub async fn list(
        &self,
        query: &PreprintQuery,
    ) -> Result<Collection<Preprint, PreprintLinks>, Error> {
        let url = self.client.api_url("preprints/", Some(query))?;
        self.client
            .request_many(
                TransportRequest::new(Method::GET, url),
                TYPE_PREPRINTS,
                Some(build_preprint),
            )
            .await
    }

    /// Fetches a single preprint by id.
    pub async fn get(&self, id: &str) -> Result<Single<Preprint, PreprintLinks>, Error> {
        let url = self
            .client
            .api_url(format!("preprints/{}/", id).as_str(), None)?;
        self.client
            .get_single(url, TYPE_PREPRINTS, Some(build_preprint))
            .await
    }

    /// Prepares the full creation workflow: draft, primary file upload,
    /// primary file relationship and, if `input.is_published` is set,
    /// publication. Nothing is sent until [`CreatePreprint::run`] is awaited.
    pub fn create(&self, input: PreprintInput, primary_file: Upload) -> CreatePreprint<'a> {
        CreatePreprint::new(self.client, input, primary_file)
    }

    /// Creates an unpublished draft submitted to `input.provider_id`. Any
    /// publish flag in `input` is sent as-is, which the service rejects while
    /// the preprint has no primary file; [`Preprints::create`] strips it.
    pub async fn create_draft(
        &self,
        input: &PreprintInput,
    ) -> Result<Single<Preprint, PreprintLinks>, Error> {
        let mut relationships = Relationships::new();
        relationships.insert(
            "provider".to_string(),
            Relationship::to_one(TYPE_PREPRINT_PROVIDERS, &input.provider_id),
        );
        let body = encode_single(TYPE_PREPRINTS, None, Some(input), Some(&relationships))?;
        let url = self.client.api_url("preprints/", None)?;
        self.client
            .request_single(
                json_request(Method::POST, url, body),
                TYPE_PREPRINTS,
                Some(build_preprint),
            )
            .await
    }

    /// Patches a preprint. Leave `input` out for a relationship-only patch.
    pub async fn update(
        &self,
        id: &str,
        input: Option<&PreprintInput>,
        relationships: Option<&Relationships>,
    ) -> Result<Single<Preprint, PreprintLinks>, Error> {
        let body = encode_single(TYPE_PREPRINTS, Some(id), input, relationships)?;
        let url = self
            .client
            .api_url(format!("preprints/{}/", id).as_str(), None)?;
        self.client
            .request_single(
                json_request(Method::PATCH, url, body),
                TYPE_PREPRINTS,
                Some(build_preprint),
            )
            .await
    }
}
