// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Serde default helper — returns `true`.
///
/// `#[serde(default)]` on a `bool` always falls back to `false`, so fields
/// that are on unless switched off need a named function.
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

/// Where questions are sent and how answers are decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Dispatcher implementation: "http" | "mock"
    pub provider: String,
    /// Scheme, host and port of the answering service.
    pub base_url: String,
    /// Path appended to `base_url` for every question.
    pub query_path: String,
    /// Render the `sources` list returned alongside an answer.
    ///
    /// When `false` every answer is shown without citations even if the
    /// service sends them.
    #[serde(default = "default_true")]
    pub include_sources: bool,
    /// Request timeout in seconds.  `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
    /// Extra static headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            provider: "http".into(),
            base_url: "http://localhost:5000".into(),
            query_path: "/query".into(),
            include_sources: true,
            timeout_secs: None,
            headers: BTreeMap::new(),
        }
    }
}

impl EndpointConfig {
    /// Full URL the dispatcher posts to.
    pub fn query_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.query_path.is_empty() {
            return base.to_string();
        }
        if self.query_path.starts_with('/') {
            format!("{base}{}", self.query_path)
        } else {
            format!("{base}/{}", self.query_path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Text shown in the header bar.
    pub title: String,
    /// Lines shown in the transcript pane before the first message.
    pub welcome: Vec<String>,
    /// Width used for transcript wrapping (0 = pane width)
    pub wrap_width: u16,
    /// Show `HH:MM` under every message.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
    /// Use plain ASCII borders/indicators instead of Unicode box-drawing and
    /// Braille characters.  Can also be forced with RAGCHAT_ASCII_BORDERS=1.
    pub ascii_borders: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            title: "RAG Assistant".into(),
            welcome: vec![
                "Welcome!".into(),
                "Ask anything about your documents.".into(),
            ],
            wrap_width: 0,
            show_timestamps: true,
            ascii_borders: false,
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────────────────

    #[test]
    fn config_default_endpoint_is_local_query_service() {
        let c = Config::default();
        assert_eq!(c.endpoint.provider, "http");
        assert_eq!(c.endpoint.query_url(), "http://localhost:5000/query");
    }

    #[test]
    fn config_default_honours_sources() {
        assert!(Config::default().endpoint.include_sources);
    }

    #[test]
    fn config_default_has_no_timeout() {
        assert!(Config::default().endpoint.timeout_secs.is_none());
    }

    #[test]
    fn config_default_shows_timestamps() {
        assert!(Config::default().tui.show_timestamps);
        assert!(!Config::default().tui.ascii_borders);
    }

    // ── URL joining ──────────────────────────────────────────────────────────

    #[test]
    fn query_url_strips_trailing_slash_from_base() {
        let e = EndpointConfig {
            base_url: "http://example.com:8080/".into(),
            ..EndpointConfig::default()
        };
        assert_eq!(e.query_url(), "http://example.com:8080/query");
    }

    #[test]
    fn query_url_adds_missing_leading_slash() {
        let e = EndpointConfig {
            query_path: "api/ask".into(),
            ..EndpointConfig::default()
        };
        assert_eq!(e.query_url(), "http://localhost:5000/api/ask");
    }

    #[test]
    fn query_url_with_empty_path_is_base() {
        let e = EndpointConfig {
            base_url: "http://h/ask".into(),
            query_path: String::new(),
            ..EndpointConfig::default()
        };
        assert_eq!(e.query_url(), "http://h/ask");
    }

    // ── TOML parsing ─────────────────────────────────────────────────────────

    #[test]
    fn partial_endpoint_table_keeps_other_defaults() {
        let c: Config = toml::from_str("[endpoint]\nbase_url = \"http://rag:9000\"\n").unwrap();
        assert_eq!(c.endpoint.base_url, "http://rag:9000");
        assert_eq!(c.endpoint.query_path, "/query");
        assert!(c.endpoint.include_sources);
    }

    #[test]
    fn include_sources_can_be_disabled() {
        let c: Config = toml::from_str("[endpoint]\ninclude_sources = false\n").unwrap();
        assert!(!c.endpoint.include_sources);
    }

    #[test]
    fn headers_table_parses() {
        let c: Config = toml::from_str(
            "[endpoint.headers]\nx-team = \"docs\"\n",
        )
        .unwrap();
        assert_eq!(c.endpoint.headers.get("x-team").map(String::as_str), Some("docs"));
    }

    #[test]
    fn tui_section_round_trips_through_toml() {
        let mut c = Config::default();
        c.tui.title = "Docs bot".into();
        c.tui.wrap_width = 72;
        let text = toml::to_string(&c).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.tui.title, "Docs bot");
        assert_eq!(back.tui.wrap_width, 72);
    }
}
