use url::Url;

use super::{common::QueryCommon, Query};

/// Query for `GET /preprint_providers/`.
#[derive(Clone, Debug, Default)]
pub struct PreprintProviderQuery {
    pub common: QueryCommon,
}

impl Query for PreprintProviderQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn add_to_url(&self, url: &Url) -> Url {
        self.common.add_to_url(url)
    }
}

impl PreprintProviderQuery {
    pub fn with_name(self, name: &str) -> Self {
        self.with_filter("name", name)
    }

    pub fn with_allow_submissions(self, allow: bool) -> Self {
        self.with_filter("allow_submissions", if allow { "true" } else { "false" })
    }
}
