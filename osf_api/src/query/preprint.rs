use url::Url;

use super::{common::QueryCommon, Query};

/// Query for `GET /preprints/`.
#[derive(Clone, Debug, Default)]
pub struct PreprintQuery {
    pub common: QueryCommon,
}

impl Query for PreprintQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn add_to_url(&self, url: &Url) -> Url {
        self.common.add_to_url(url)
    }
}

impl PreprintQuery {
    /// Only preprints submitted to this provider.
    pub fn with_provider(self, provider_id: &str) -> Self {
        self.with_filter("provider", provider_id)
    }

    /// Only preprints in this moderation state (`pending`, `accepted`, ...).
    pub fn with_reviews_state(self, state: &str) -> Self {
        self.with_filter("reviews_state", state)
    }

    pub fn with_tag(self, tag: &str) -> Self {
        self.with_filter("tags", tag)
    }

    pub fn with_published(self, is_published: bool) -> Self {
        self.with_filter("is_published", if is_published { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::query::{PreprintQuery, Query};

    #[test]
    fn test_preprint_query() {
        let url = Url::parse("https://api.osf.io/v2/preprints/").unwrap();
        let url = PreprintQuery::default()
            .with_page(2)
            .with_page_size(25)
            .with_provider("psyarxiv")
            .with_reviews_state("pending")
            .add_to_url(&url);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("page[number]".to_string(), "2".to_string()),
                ("page[size]".to_string(), "25".to_string()),
                ("filter[provider]".to_string(), "psyarxiv".to_string()),
                ("filter[reviews_state]".to_string(), "pending".to_string()),
            ]
        );
    }
}
