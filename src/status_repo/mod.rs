// Status page client via reqwest

mod error;

pub use error::FetchError;

use crate::models::{ServiceStatus, StatusPage};
use std::time::Duration;

/// Path appended to every configured base URL.
pub const STATUS_PATH: &str = "/api/v2/status.json";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct StatusRepo {
    client: reqwest::Client,
}

impl StatusRepo {
    /// Builds the shared HTTP client. `request_timeout` of `None` means no timeout.
    pub fn new(request_timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(t) = request_timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetches and decodes `<base>/api/v2/status.json`.
    pub async fn fetch_status(&self, base_url: &str) -> Result<ServiceStatus, FetchError> {
        let url = status_url(base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        let page: StatusPage = serde_json::from_slice(&body)?;
        Ok(page.into())
    }
}

/// `<base>/api/v2/status.json`, without doubling a trailing slash on the base.
pub fn status_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), STATUS_PATH)
}
