// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod types;
mod dispatcher;
mod http;
mod mock;

pub use types::*;
pub use dispatcher::QueryDispatcher;
pub use http::HttpDispatcher;
pub use mock::{MockDispatcher, ScriptedDispatcher};

use anyhow::bail;
use ragchat_config::EndpointConfig;

/// Construct a boxed [`QueryDispatcher`] from configuration.
///
/// Provider selection:
/// - `"http"` → [`HttpDispatcher`] posting to [`EndpointConfig::query_url`]
/// - `"mock"` → [`MockDispatcher`] (echo-back, no network)
pub fn from_config(cfg: &EndpointConfig) -> anyhow::Result<Box<dyn QueryDispatcher>> {
    match cfg.provider.as_str() {
        "http" => Ok(Box::new(HttpDispatcher::from_config(cfg)?)),
        "mock" => Ok(Box::new(MockDispatcher)),
        other => bail!("unknown endpoint provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_http_is_default() {
        let d = from_config(&EndpointConfig::default()).unwrap();
        assert_eq!(d.name(), "http");
    }

    #[test]
    fn from_config_mock() {
        let cfg = EndpointConfig { provider: "mock".into(), ..EndpointConfig::default() };
        assert_eq!(from_config(&cfg).unwrap().name(), "mock");
    }

    #[test]
    fn from_config_unknown_provider_fails() {
        let cfg = EndpointConfig { provider: "carrier-pigeon".into(), ..EndpointConfig::default() };
        let err = from_config(&cfg).err().expect("should fail");
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
