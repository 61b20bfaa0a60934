use anyhow::Context;
use reqwest::header::HeaderMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{Level, event, instrument};

#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
}

impl Client {
    pub fn with_headers(headers: HeaderMap) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Client { client })
    }

    #[instrument(level = "trace", skip(self, request))]
    pub async fn post<U, S, T>(&self, url: U, request: &S) -> anyhow::Result<T>
    where
        U: reqwest::IntoUrl + std::fmt::Debug,
        S: Serialize + Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(anyhow::anyhow!(
                "Request failed with status {}: {}",
                status,
                error_body
            ));
        }
        let text = response.text().await?;
        event!(Level::TRACE, response = text);

        serde_json::from_str::<T>(&text).context("Malformed response body")
    }
}
