//! Endpoint descriptor domain model
//!
//! An [`EndpointDescriptor`] identifies one candidate search-head server
//! together with its credentials and reuse policy. Descriptors are immutable
//! value types: the session cache uses them as keys, so every field takes
//! part in equality and hashing and nothing can change after construction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport scheme used to reach a search head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    /// Parses a scheme from its configuration string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "https" => Some(Scheme::Https),
            "http" => Some(Scheme::Http),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Https => write!(f, "https"),
            Scheme::Http => write!(f, "http"),
        }
    }
}

/// Configuration identifying one remote server and its credentials/policy
///
/// The descriptor doubles as the session-cache key, so it must stay a plain
/// value: construction goes through [`EndpointDescriptor::new`] plus the
/// `with_*` builders, all of which consume and return by value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Server hostname or address
    pub host: String,

    /// Management port
    pub port: u16,

    /// Transport scheme (https by default)
    pub scheme: Scheme,

    /// Application namespace to operate in, if any
    pub app: Option<String>,

    /// Owner namespace to operate in, if any
    pub owner: Option<String>,

    /// Login username
    pub username: String,

    /// Login password
    pub password: String,

    /// Whether a cached session must pass a liveness probe before reuse
    pub check_on_borrow: bool,

    /// Connection attempt deadline in milliseconds; 0 waits unboundedly
    pub timeout_millis: u64,
}

impl EndpointDescriptor {
    /// Default management port of the search head
    pub const DEFAULT_PORT: u16 = 8089;

    /// Creates a descriptor with default scheme, namespaces, and policy
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: Scheme::Https,
            app: None,
            owner: None,
            username: username.into(),
            password: password.into(),
            check_on_borrow: false,
            timeout_millis: 0,
        }
    }

    /// Sets the transport scheme
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the application namespace
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Sets the owner namespace
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Requires a liveness probe before reusing a cached session
    pub fn with_check_on_borrow(mut self, check: bool) -> Self {
        self.check_on_borrow = check;
        self
    }

    /// Bounds each connection attempt; 0 disables the bound
    pub fn with_timeout_millis(mut self, millis: u64) -> Self {
        self.timeout_millis = millis;
        self
    }

    /// Base URL of the endpoint, e.g. `https://search.example.com:8089`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Connection deadline, or `None` when attempts wait unboundedly
    pub fn connect_timeout(&self) -> Option<Duration> {
        if self.timeout_millis == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_millis))
        }
    }
}

impl std::fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

// Manual impl so the password never lands in logs or error chains.
impl std::fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("app", &self.app)
            .field("owner", &self.owner)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("check_on_borrow", &self.check_on_borrow)
            .field("timeout_millis", &self.timeout_millis)
            .finish()
    }
}
