//! Client configuration read from the environment.

use std::time::Duration;

use anyhow::{Context, Result};
use osf_api::transport::USER_AGENT_VALUE;
use osf_api::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

pub const TOKEN_VAR: &str = "OSF_API_TOKEN";
pub const API_URL_VAR: &str = "OSF_API_URL";
pub const FILES_URL_VAR: &str = "OSF_FILES_URL";

/// Uploads can take a while, so only connecting is bounded.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct Config {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub files_url: Option<String>,
    pub test_server: bool,
}

impl Config {
    pub fn from_env(test_server: bool) -> Self {
        Self {
            token: non_empty_var(TOKEN_VAR),
            api_url: non_empty_var(API_URL_VAR),
            files_url: non_empty_var(FILES_URL_VAR),
            test_server,
        }
    }

    /// Builds the API client. Explicit URLs win over `--test-server`.
    pub fn build_client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .with_context(|| format!("{} contains characters not allowed in a header", TOKEN_VAR))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            tracing::debug!("{} not set, requests are anonymous", TOKEN_VAR);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let mut client = Client::with_http_client(http)?;
        if self.test_server {
            client = client.with_test_server()?;
        }
        if let Some(url) = &self.api_url {
            client = client
                .with_base_url(url)
                .with_context(|| format!("Invalid {}", API_URL_VAR))?;
        }
        if let Some(url) = &self.files_url {
            client = client
                .with_storage_url(url)
                .with_context(|| format!("Invalid {}", FILES_URL_VAR))?;
        }
        Ok(client)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production() {
        let client = Config::default().build_client().unwrap();
        assert_eq!(client.base_url().as_str(), osf_api::DEFAULT_BASE_URL);
        assert_eq!(client.storage_url().as_str(), osf_api::DEFAULT_STORAGE_URL);
    }

    #[test]
    fn explicit_urls_override_test_server() {
        let config = Config {
            api_url: Some("http://localhost:8000/v2/".into()),
            test_server: true,
            ..Default::default()
        };
        let client = config.build_client().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/v2/");
        assert_eq!(client.storage_url().as_str(), osf_api::TEST_STORAGE_URL);
    }

    #[test]
    fn rejects_base_url_without_trailing_slash() {
        let config = Config {
            api_url: Some("http://localhost:8000/v2".into()),
            ..Default::default()
        };
        assert!(config.build_client().is_err());
    }

    #[test]
    fn rejects_token_with_newline() {
        let config = Config {
            token: Some("abc\ndef".into()),
            ..Default::default()
        };
        assert!(config.build_client().is_err());
    }
}
