use serde::{Deserialize, Serialize};

/// Configuration for [`crate::HttpRemote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the service, without the `/v1` prefix.
    pub base_url: String,
    /// Per-request timeout handed to the HTTP client (seconds).
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://193.136.62.24".to_string(),
            timeout_secs: 30,
            user_agent: concat!("libraryapp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RemoteConfig {
    /// Default configuration pointed at another server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
