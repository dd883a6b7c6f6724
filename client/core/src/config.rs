//! Client configuration

use serde::{Deserialize, Serialize};

/// Environment variable overriding the portal base URL, the only
/// environment contract the backend defines
pub const PORTAL_URL_ENV: &str = "GOVPOINT_PORTAL_URL";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Portal backend base URL
    pub portal_url: String,
    /// Event stream URL; derived from `portal_url` when unset
    pub ws_url: Option<String>,
    /// Fetch the server-side IAM-filtered ticket set
    pub iam_only: bool,
    /// Fixed delay between reconnect attempts, in seconds
    pub reconnect_delay_secs: u64,
    /// Logging level
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            portal_url: "http://localhost:8000".into(),
            ws_url: None,
            iam_only: false,
            reconnect_delay_secs: 3,
            log_level: "info".into(),
        }
    }
}

impl ClientConfig {
    /// Load from file
    pub fn load(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save to file
    pub fn save(&self, path: &str) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Apply the environment override for the portal base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(PORTAL_URL_ENV) {
            if !url.is_empty() {
                self.portal_url = url;
            }
        }
        self
    }

    /// Event stream URL: explicit config wins, otherwise `<portal_url>/ws`
    /// with the scheme swapped to ws/wss
    pub fn stream_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        let base = self.portal_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws_base}/ws")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.portal_url, "http://localhost:8000");
        assert_eq!(config.reconnect_delay_secs, 3);
        assert!(!config.iam_only);
    }

    #[test]
    fn test_stream_url_derived() {
        let config = ClientConfig::default();
        assert_eq!(config.stream_url(), "ws://localhost:8000/ws");

        let tls = ClientConfig {
            portal_url: "https://portal.example.com/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(tls.stream_url(), "wss://portal.example.com/ws");
    }

    #[test]
    fn test_stream_url_explicit() {
        let config = ClientConfig {
            ws_url: Some("ws://10.0.0.4:9000/events".into()),
            ..ClientConfig::default()
        };
        assert_eq!(config.stream_url(), "ws://10.0.0.4:9000/events");
    }
}
