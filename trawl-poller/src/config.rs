//! Poller configuration
//!
//! Defines all configurable parameters for the poller: the candidate server
//! endpoints (with credentials and reuse policy), the search to run each
//! cycle, and the polling cadence.

use std::time::Duration;
use trawl_core::domain::endpoint::{EndpointDescriptor, Scheme};
use trawl_core::domain::search::{SearchMode, SearchQuery};

/// Poller configuration
///
/// Hosts are ordered: the first reachable one wins, the rest are failover
/// candidates sharing the same port, credentials, and policy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Candidate server hostnames in failover priority order
    pub hosts: Vec<String>,

    /// Management port shared by all candidates
    pub port: u16,

    /// Transport scheme shared by all candidates
    pub scheme: Scheme,

    /// Application namespace, if any
    pub app: Option<String>,

    /// Owner namespace, if any
    pub owner: Option<String>,

    /// Login username
    pub username: String,

    /// Login password
    pub password: String,

    /// Probe cached sessions before reuse
    pub check_on_borrow: bool,

    /// Connection attempt deadline in milliseconds; 0 waits unboundedly
    pub connect_timeout_millis: u64,

    /// Search execution mode
    pub mode: SearchMode,

    /// Search text, without the leading `search ` command
    pub search: String,

    /// Earliest-time bound for every cycle after the first
    pub earliest_time: Option<String>,

    /// Latest-time bound
    pub latest_time: Option<String>,

    /// Earliest-time bound for the first cycle only
    pub init_earliest_time: Option<String>,

    /// How often to poll the search head
    pub poll_interval: Duration,

    /// Capacity of the event delivery channel
    pub channel_capacity: usize,
}

impl Config {
    /// Creates a configuration with defaults for everything but the
    /// endpoint identity and search text
    pub fn new(host: String, username: String, password: String, search: String) -> Self {
        Self {
            hosts: vec![host],
            port: EndpointDescriptor::DEFAULT_PORT,
            scheme: Scheme::Https,
            app: None,
            owner: None,
            username,
            password,
            check_on_borrow: false,
            connect_timeout_millis: 0,
            mode: SearchMode::Export,
            search,
            earliest_time: None,
            latest_time: None,
            init_earliest_time: None,
            poll_interval: Duration::from_millis(300_000),
            channel_capacity: 16,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SEARCH_HOSTS (required, comma-separated failover list)
    /// - SEARCH_USERNAME (required)
    /// - SEARCH_PASSWORD (required)
    /// - SEARCH_QUERY (required)
    /// - SEARCH_PORT (optional, default: 8089)
    /// - SEARCH_SCHEME (optional, https or http, default: https)
    /// - SEARCH_APP / SEARCH_OWNER (optional)
    /// - CHECK_ON_BORROW (optional, default: false)
    /// - CONNECT_TIMEOUT_MS (optional, default: 0 = unbounded)
    /// - SEARCH_MODE (optional, default: export)
    /// - EARLIEST_TIME / LATEST_TIME / INIT_EARLIEST_TIME (optional)
    /// - POLL_INTERVAL_MS (optional, default: 300000)
    /// - CHANNEL_CAPACITY (optional, default: 16)
    pub fn from_env() -> anyhow::Result<Self> {
        let hosts = std::env::var("SEARCH_HOSTS")
            .map_err(|_| anyhow::anyhow!("SEARCH_HOSTS environment variable not set"))?;
        let hosts: Vec<String> = hosts
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        let username = std::env::var("SEARCH_USERNAME")
            .map_err(|_| anyhow::anyhow!("SEARCH_USERNAME environment variable not set"))?;

        let password = std::env::var("SEARCH_PASSWORD")
            .map_err(|_| anyhow::anyhow!("SEARCH_PASSWORD environment variable not set"))?;

        let search = std::env::var("SEARCH_QUERY")
            .map_err(|_| anyhow::anyhow!("SEARCH_QUERY environment variable not set"))?;

        let port = std::env::var("SEARCH_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(EndpointDescriptor::DEFAULT_PORT);

        let scheme = match std::env::var("SEARCH_SCHEME") {
            Ok(s) => Scheme::parse(&s)
                .ok_or_else(|| anyhow::anyhow!("SEARCH_SCHEME must be https or http"))?,
            Err(_) => Scheme::Https,
        };

        let mode = match std::env::var("SEARCH_MODE") {
            Ok(s) => SearchMode::parse(&s)
                .ok_or_else(|| anyhow::anyhow!("SEARCH_MODE '{}' is not a valid mode", s))?,
            Err(_) => SearchMode::Export,
        };

        let check_on_borrow = std::env::var("CHECK_ON_BORROW")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(false);

        let connect_timeout_millis = std::env::var("CONNECT_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let poll_interval = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(300_000));

        let channel_capacity = std::env::var("CHANNEL_CAPACITY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(16);

        Ok(Self {
            hosts,
            port,
            scheme,
            app: std::env::var("SEARCH_APP").ok(),
            owner: std::env::var("SEARCH_OWNER").ok(),
            username,
            password,
            check_on_borrow,
            connect_timeout_millis,
            mode,
            search,
            earliest_time: std::env::var("EARLIEST_TIME").ok(),
            latest_time: std::env::var("LATEST_TIME").ok(),
            init_earliest_time: std::env::var("INIT_EARLIEST_TIME").ok(),
            poll_interval,
            channel_capacity,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.hosts.is_empty() {
            anyhow::bail!("at least one host must be configured");
        }

        if self.username.is_empty() {
            anyhow::bail!("username cannot be empty");
        }

        if self.search.is_empty() {
            anyhow::bail!("search query cannot be empty");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.channel_capacity == 0 {
            anyhow::bail!("channel capacity must be greater than 0");
        }

        Ok(())
    }

    /// Builds the failover pool, one descriptor per host in order
    pub fn endpoints(&self) -> Vec<EndpointDescriptor> {
        self.hosts
            .iter()
            .map(|host| {
                let mut descriptor =
                    EndpointDescriptor::new(host, self.port, &self.username, &self.password)
                        .with_scheme(self.scheme)
                        .with_check_on_borrow(self.check_on_borrow)
                        .with_timeout_millis(self.connect_timeout_millis);
                if let Some(app) = &self.app {
                    descriptor = descriptor.with_app(app);
                }
                if let Some(owner) = &self.owner {
                    descriptor = descriptor.with_owner(owner);
                }
                descriptor
            })
            .collect()
    }

    /// Builds the search the reader runs each cycle
    pub fn query(&self) -> SearchQuery {
        let mut query = SearchQuery::new(&self.search).with_mode(self.mode);
        if let Some(earliest) = &self.earliest_time {
            query = query.with_earliest_time(earliest);
        }
        if let Some(latest) = &self.latest_time {
            query = query.with_latest_time(latest);
        }
        if let Some(init) = &self.init_earliest_time {
            query = query.with_init_earliest_time(init);
        }
        query
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            "localhost".to_string(),
            "admin".to_string(),
            "changeme".to_string(),
            "index=main".to_string(),
        )
    }
}
