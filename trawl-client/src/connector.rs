//! Connection establishment
//!
//! The [`Connector`] trait is the seam between the broker's acquisition
//! algorithm and the transport that actually reaches a server. The broker
//! only ever needs two operations: establish an authenticated session and
//! cheaply probe an existing one. Tests substitute a scripted connector;
//! production wires in [`HttpConnector`].

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;
use trawl_core::domain::endpoint::EndpointDescriptor;

use crate::error::ConnectError;
use crate::session::SearchSession;

/// Establishes and probes sessions against one kind of transport
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Session handle this connector produces
    type Session: Send + Sync + 'static;

    /// Performs the authenticated handshake to one endpoint
    ///
    /// The broker bounds this call with the descriptor's timeout; the
    /// implementation itself should not enforce one.
    async fn connect(&self, endpoint: &EndpointDescriptor) -> Result<Self::Session, ConnectError>;

    /// Verifies that a cached session is still usable
    ///
    /// Failures are binary and never propagate as errors.
    async fn probe(&self, session: &Self::Session) -> bool;
}

/// HTTP connector for real search-head endpoints
///
/// Logs in with the raw credential pair as form fields and, alongside them,
/// a precomputed `Basic` token in the `Authorization` header; the server
/// honors whichever it supports. TLS is pinned to 1.2 or newer.
#[derive(Debug, Default)]
pub struct HttpConnector;

impl HttpConnector {
    /// Creates a new HTTP connector
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "sessionKey")]
    session_key: String,
}

#[async_trait]
impl Connector for HttpConnector {
    type Session = SearchSession;

    async fn connect(&self, endpoint: &EndpointDescriptor) -> Result<SearchSession, ConnectError> {
        let http = reqwest::Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(|e| ConnectError::Refused(e.to_string()))?;

        let url = format!("{}/services/auth/login", endpoint.base_url());
        debug!(endpoint = %endpoint, "attempting login");

        let mut form = vec![
            ("username", endpoint.username.as_str()),
            ("password", endpoint.password.as_str()),
            ("output_mode", "json"),
        ];
        if let Some(app) = &endpoint.app {
            form.push(("app", app.as_str()));
        }
        if let Some(owner) = &endpoint.owner {
            form.push(("owner", owner.as_str()));
        }

        let response = http
            .post(&url)
            .header(
                AUTHORIZATION,
                basic_auth_token(&endpoint.username, &endpoint.password),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| ConnectError::Refused(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ConnectError::AuthenticationFailed {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ConnectError::Refused(format!(
                "login returned status {}",
                status.as_u16()
            )));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ConnectError::Refused(format!("bad login response: {}", e)))?;

        Ok(SearchSession::new(http, endpoint, login.session_key))
    }

    async fn probe(&self, session: &SearchSession) -> bool {
        session.server_info().await.is_ok()
    }
}

/// `Basic base64(username ":" password)` token supplied alongside the raw
/// credential fields
fn basic_auth_token(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", username, password)))
}
