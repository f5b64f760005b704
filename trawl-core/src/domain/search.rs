//! Search parameter domain types

use serde::{Deserialize, Serialize};

/// Execution mode for the configured search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Submit the search and block until it completes
    Blocking,

    /// Submit the search and poll for completion
    Normal,

    /// Stream results back as they are produced
    Export,

    /// Run the search over a realtime window
    Realtime,

    /// Dispatch a search saved on the server by name
    Saved,
}

impl SearchMode {
    /// Parses a mode from its configuration string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blocking" => Some(SearchMode::Blocking),
            "normal" => Some(SearchMode::Normal),
            "export" => Some(SearchMode::Export),
            "realtime" => Some(SearchMode::Realtime),
            "saved" => Some(SearchMode::Saved),
            _ => None,
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Blocking => write!(f, "blocking"),
            SearchMode::Normal => write!(f, "normal"),
            SearchMode::Export => write!(f, "export"),
            SearchMode::Realtime => write!(f, "realtime"),
            SearchMode::Saved => write!(f, "saved"),
        }
    }
}

/// Parameters of the search the poller runs each cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Execution mode
    pub mode: SearchMode,

    /// Raw search text, without the leading `search ` command
    pub query: String,

    /// Earliest-time bound for every cycle after the first
    pub earliest_time: Option<String>,

    /// Latest-time bound
    pub latest_time: Option<String>,

    /// Earliest-time bound used for the first cycle only, if set
    pub init_earliest_time: Option<String>,
}

impl SearchQuery {
    /// Creates an export-mode query with no time bounds
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            mode: SearchMode::Export,
            query: query.into(),
            earliest_time: None,
            latest_time: None,
            init_earliest_time: None,
        }
    }

    /// Sets the execution mode
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the earliest-time bound
    pub fn with_earliest_time(mut self, earliest: impl Into<String>) -> Self {
        self.earliest_time = Some(earliest.into());
        self
    }

    /// Sets the latest-time bound
    pub fn with_latest_time(mut self, latest: impl Into<String>) -> Self {
        self.latest_time = Some(latest.into());
        self
    }

    /// Sets the first-cycle earliest-time bound
    pub fn with_init_earliest_time(mut self, earliest: impl Into<String>) -> Self {
        self.init_earliest_time = Some(earliest.into());
        self
    }

    /// Full search string submitted to the server
    ///
    /// Saved searches are dispatched by name and keep the text as-is; every
    /// other mode gets the `search ` command prepended.
    pub fn search_string(&self) -> String {
        match self.mode {
            SearchMode::Saved => self.query.clone(),
            _ => format!("search {}", self.query),
        }
    }

    /// Earliest-time bound effective for this cycle
    ///
    /// The first cycle uses `init_earliest_time` when configured; later
    /// cycles always use `earliest_time`.
    pub fn effective_earliest(&self, first_cycle: bool) -> Option<&str> {
        if first_cycle {
            self.init_earliest_time
                .as_deref()
                .or(self.earliest_time.as_deref())
        } else {
            self.earliest_time.as_deref()
        }
    }
}
