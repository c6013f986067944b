use crate::{
    codec::{Collection, Single},
    query::PreprintProviderQuery,
    transport::TransportRequest,
    types::{
        build_preprint_provider, PreprintProvider, PreprintProviderLinks, TYPE_PREPRINT_PROVIDERS,
    },
    Client, Error,
};

/// `/preprint_providers` endpoints.
pub struct PreprintProviders<'a> {
    client: &'a Client,
}

impl<'a> PreprintProviders<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches a page of providers matching the given query.
    pub async fn list(
        &self,
        query: &PreprintProviderQuery,
    ) -> Result<Collection<PreprintProvider, PreprintProviderLinks>, Error> {
        let url = self.client.api_url("preprint_providers/", Some(query))?;
        self.client
            .request_many(
                TransportRequest::new(reqwest::Method::GET, url),
                TYPE_PREPRINT_PROVIDERS,
                Some(build_preprint_provider),
            )
            .await
    }

    /// Fetches a single provider by id.
    pub async fn get(
        &self,
        id: &str,
    ) -> Result<Single<PreprintProvider, PreprintProviderLinks>, Error> {
        let url = self
            .client
            .api_url(format!("preprint_providers/{}/", id).as_str(), None)?;
        self.client
            .get_single(url, TYPE_PREPRINT_PROVIDERS, Some(build_preprint_provider))
            .await
    }
}
