//! HTTP dispatcher — JSON `POST` to a question-answering service.
//!
//! Sends `{"query": "..."}` and expects `{"answer": "...", "sources": [...]}`.
//! Any non-2xx status, transport failure or undecodable body becomes a
//! [`DispatchError`].

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use ragchat_config::EndpointConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::{Answer, DispatchError, QueryRequest};

pub struct HttpDispatcher {
    url: String,
    include_sources: bool,
    client: reqwest::Client,
}

impl HttpDispatcher {
    /// Dispatcher with the client defaults: no extra headers, no timeout.
    pub fn new(url: impl Into<String>, include_sources: bool) -> Self {
        Self {
            url: url.into(),
            include_sources,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(cfg: &EndpointConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        for (k, v) in &cfg.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .with_context(|| format!("invalid header name {k:?}"))?;
            let value = HeaderValue::from_str(v)
                .with_context(|| format!("invalid value for header {k:?}"))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("building HTTP client")?;

        Ok(Self {
            url: cfg.query_url(),
            include_sources: cfg.include_sources,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl crate::QueryDispatcher for HttpDispatcher {
    fn name(&self) -> &str { "http" }

    fn target(&self) -> String { self.url.clone() }

    async fn dispatch(&self, query: &str) -> Result<Answer, DispatchError> {
        debug!(url = %self.url, query_len = query.len(), "sending query");

        let resp = self
            .client
            .post(&self.url)
            .json(&QueryRequest::new(query))
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, "query transport error: {e}");
                DispatchError::from(e)
            })?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let preview: String = String::from_utf8_lossy(&body).chars().take(200).collect();
            warn!(%status, "query rejected by service");
            return Err(DispatchError::new(format!("status {status}: {preview}")));
        }

        let answer = Answer::from_payload(&body, self.include_sources).inspect_err(|e| {
            warn!("malformed answer payload: {}", e.detail);
        })?;
        debug!(
            answer_len = answer.text.len(),
            sources = answer.sources.len(),
            "query answered"
        );
        Ok(answer)
    }
}
