//! Authenticated session handle
//!
//! A [`SearchSession`] is the opaque handle returned by a successful
//! connection attempt. It wraps the HTTP client plus the session key issued
//! at login and is reused across polling cycles; the broker owns the only
//! authority over whether a cached session is still valid.

use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;
use trawl_core::domain::endpoint::EndpointDescriptor;
use trawl_core::domain::event::SearchEvent;
use trawl_core::domain::search::SearchQuery;

use crate::error::SearchError;

/// Authenticated, reusable channel to one search-head endpoint
#[derive(Debug, Clone)]
pub struct SearchSession {
    http: reqwest::Client,
    base_url: String,
    search_path: String,
    session_key: String,
}

impl SearchSession {
    /// Wraps a freshly negotiated login into a reusable session
    pub(crate) fn new(
        http: reqwest::Client,
        endpoint: &EndpointDescriptor,
        session_key: String,
    ) -> Self {
        // Searches run inside the owner/app namespace when both are set,
        // otherwise against the server-wide search endpoint.
        let search_path = match (&endpoint.owner, &endpoint.app) {
            (Some(owner), Some(app)) => {
                format!("/servicesNS/{}/{}/search/jobs/export", owner, app)
            }
            _ => "/services/search/jobs/export".to_string(),
        };

        Self {
            http,
            base_url: endpoint.base_url(),
            search_path,
            session_key,
        }
    }

    /// Base URL of the endpoint this session is bound to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lightweight metadata request used as the liveness probe
    ///
    /// Any failure, transport or status, means the session is no longer
    /// usable; the caller only ever needs the binary outcome.
    pub async fn server_info(&self) -> Result<(), SearchError> {
        let url = format!("{}/services/server/info?output_mode=json", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Executes the configured search and returns the resulting batch
    ///
    /// One export-style request per cycle; results arrive as line-delimited
    /// JSON and are parsed into [`SearchEvent`] records.
    pub async fn search(
        &self,
        query: &SearchQuery,
        first_cycle: bool,
    ) -> Result<Vec<SearchEvent>, SearchError> {
        let url = format!("{}{}", self.base_url, self.search_path);

        let mut form = vec![
            ("search".to_string(), query.search_string()),
            ("output_mode".to_string(), "json".to_string()),
        ];
        if let Some(earliest) = query.effective_earliest(first_cycle) {
            form.push(("earliest_time".to_string(), earliest.to_string()));
        }
        if let Some(latest) = &query.latest_time {
            form.push(("latest_time".to_string(), latest.clone()));
        }

        debug!(url = %url, mode = %query.mode, "executing search");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth_header())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_export_results(&body)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.session_key)
    }
}

/// One line of an export response
#[derive(Debug, Deserialize)]
struct ExportLine {
    #[serde(default)]
    result: Option<SearchEvent>,
}

/// Parses line-delimited export output into event records
///
/// Lines without a `result` object (preview markers, completion notices) are
/// skipped rather than treated as errors.
fn parse_export_results(body: &str) -> Result<Vec<SearchEvent>, SearchError> {
    let mut events = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: ExportLine = serde_json::from_str(line)
            .map_err(|e| SearchError::Parse(format!("bad result line: {}", e)))?;
        if let Some(event) = parsed.result {
            events.push(event);
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trawl_core::domain::endpoint::EndpointDescriptor;

    #[test]
    fn test_search_path_uses_namespace_when_configured() {
        let http = reqwest::Client::new();
        let endpoint = EndpointDescriptor::new("a", 8089, "u", "p")
            .with_owner("nobody")
            .with_app("search");
        let session = SearchSession::new(http.clone(), &endpoint, "key".into());
        assert_eq!(session.search_path, "/servicesNS/nobody/search/search/jobs/export");

        let bare = EndpointDescriptor::new("a", 8089, "u", "p");
        let session = SearchSession::new(http, &bare, "key".into());
        assert_eq!(session.search_path, "/services/search/jobs/export");
    }

    #[test]
    fn test_parse_export_results_skips_non_result_lines() {
        let body = concat!(
            "{\"preview\":false,\"lastrow\":true}\n",
            "{\"result\":{\"_raw\":\"ERROR one\"}}\n",
            "\n",
            "{\"result\":{\"_raw\":\"ERROR two\",\"_time\":\"2026-08-24T10:00:00Z\"}}\n",
        );

        let events = parse_export_results(body).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].raw, "ERROR one");
        assert_eq!(events[1].time.as_deref(), Some("2026-08-24T10:00:00Z"));
    }

    #[test]
    fn test_parse_export_results_rejects_garbage() {
        let err = parse_export_results("not json at all").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
