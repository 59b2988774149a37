//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | ADMIN_API_URL | http://localhost:5000/api | REST base URL |
//! | ADMIN_SOCKET_ADDR | 127.0.0.1:5001 | Socket endpoint (host:port) |
//! | ADMIN_API_TOKEN | (unset) | Bearer token |
//! | REQUEST_TIMEOUT_MS | 30000 | Per-request HTTP timeout |
//! | SOCKET_RECONNECT_DELAY_MS | 1000 | Fixed delay between reconnect attempts |
//! | SOCKET_MAX_RECONNECT_ATTEMPTS | 0 | 0 means retry forever |
//! | SOCKET_WRITE_TIMEOUT_MS | 5000 | Upper bound for one outgoing frame write |
//! | SOCKET_CHANNEL_CAPACITY | 256 | Frame capacity of the in-memory transport |
//! | LOG_LEVEL | info | Fallback when RUST_LOG is unset |
//! | LOG_JSON | false | JSON log lines |

use std::time::Duration;

/// Socket connection configuration
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Whether to reconnect after the transport drops
    pub auto_reconnect: bool,
    /// Fixed delay between attempts
    pub reconnect_delay: Duration,
    /// Maximum consecutive failed attempts (0 = unlimited)
    pub max_reconnect_attempts: u32,
    /// Upper bound for writing one frame; a peer that stops reading
    /// fails the write with a timeout
    pub write_timeout: Duration,
    /// Frame capacity of the in-memory transport channels
    /// (`ConnectionManager::in_memory` only; TCP ignores it)
    pub channel_capacity: usize,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_attempts: 0,
            write_timeout: Duration::from_secs(5),
            channel_capacity: 256,
        }
    }
}

impl SocketConfig {
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Client configuration for connecting to the restaurant backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL (e.g., "http://localhost:5000/api")
    pub api_base_url: String,

    /// Socket address (e.g., "127.0.0.1:5001")
    pub socket_addr: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout
    pub request_timeout: Duration,

    pub socket: SocketConfig,

    /// Fallback log level
    pub log_level: String,

    /// Emit JSON log lines
    pub log_json: bool,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>, socket_addr: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            socket_addr: socket_addr.into(),
            token: None,
            request_timeout: Duration::from_secs(30),
            socket: SocketConfig::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let socket_defaults = SocketConfig::default();

        Self {
            api_base_url: std::env::var("ADMIN_API_URL").unwrap_or(defaults.api_base_url),
            socket_addr: std::env::var("ADMIN_SOCKET_ADDR").unwrap_or(defaults.socket_addr),
            token: std::env::var("ADMIN_API_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout: env_parse("REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            socket: SocketConfig {
                auto_reconnect: true,
                reconnect_delay: env_parse("SOCKET_RECONNECT_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(socket_defaults.reconnect_delay),
                max_reconnect_attempts: env_parse("SOCKET_MAX_RECONNECT_ATTEMPTS")
                    .unwrap_or(socket_defaults.max_reconnect_attempts),
                write_timeout: env_parse("SOCKET_WRITE_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(socket_defaults.write_timeout),
                channel_capacity: env_parse("SOCKET_CHANNEL_CAPACITY")
                    .unwrap_or(socket_defaults.channel_capacity),
            },
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: env_parse("LOG_JSON").unwrap_or(false),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_socket(mut self, socket: SocketConfig) -> Self {
        self.socket = socket;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000/api", "127.0.0.1:5001")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
