//! Shared query infrastructure: the [`Query`] trait and [`QueryCommon`] fields.

use url::Url;

/// Trait implemented by all list query builders. Provides URL serialization
/// and shared builder methods for pagination and filtering.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the page number (1-indexed), sent as `page[number]`.
    fn with_page(mut self, page: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = Some(page);
        self
    }

    /// Sets the number of results per page, sent as `page[size]`.
    fn with_page_size(mut self, page_size: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page_size = Some(page_size);
        self
    }

    /// Adds a `filter[<field>]=<value>` parameter.
    fn with_filter(mut self, field: &str, value: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common()
            .filters
            .push((field.to_string(), value.to_string()));
        self
    }
}

/// Fields shared by all query types: pagination and filters.
#[derive(Clone, Debug, Default)]
pub struct QueryCommon {
    /// Page number (1-indexed). `None` lets the API start at page 1.
    pub page: Option<u32>,
    /// Results per page. `None` uses the API default.
    pub page_size: Option<u32>,
    /// `(field, value)` filter pairs in the order they were added.
    pub filters: Vec<(String, String)>,
}

impl QueryCommon {
    /// Appends the pagination and filter parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(page) = self.page {
            url.query_pairs_mut()
                .append_pair("page[number]", &page.to_string());
        }
        if let Some(page_size) = self.page_size {
            url.query_pairs_mut()
                .append_pair("page[size]", &page_size.to_string());
        }
        for (field, value) in self.filters.iter() {
            url.query_pairs_mut()
                .append_pair(format!("filter[{}]", field).as_str(), value);
        }
        url
    }
}
