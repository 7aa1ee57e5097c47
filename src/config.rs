use crate::error::ExplorerError;
use alloy_primitives::U256;
use std::env;
use std::str::FromStr;
use std::time::Duration;

// Configuration for the explorer server
#[derive(Clone, Debug)]
pub struct Config {
    pub node_http_url: String, // Node JSON-RPC endpoint (HTTP)
    pub node_ws_url: String, // Node push endpoint for subscriptions
    pub bind_host: String, // Host the HTTP/WebSocket server binds to
    pub port: u16, // Port the HTTP/WebSocket server listens on
    pub rpc_timeout: Duration, // Upper bound on every single RPC call
    pub session_buffer: usize, // Per-session outbound queue depth before oldest frames are dropped; rounded up to a power of two
    pub flush_interval: Duration, // How often a session drains its queue to the socket
    pub max_inflight: usize, // Concurrent enrichment operations before new events are dropped
    pub block_reward_wei: U256, // Fixed base reward added to fees in block details
    pub latest_blocks: usize, // Number of blocks served by /api/blocks/latest
    pub address_scan_depth: u64, // Recent blocks scanned for an address's transactions
    pub upstream_retry_window: Duration, // Longest we keep retrying a lost upstream subscription
}

impl Config {
    // Loads configuration from environment variables, with defaults pointing at a local node
    pub fn from_env() -> Result<Self, ExplorerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExplorerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            node_http_url: string("GETH_NODE_URL", "http://localhost:8545"),
            node_ws_url: string("GETH_WS_URL", "ws://localhost:8546"),
            bind_host: string("BIND_HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 3000),
            rpc_timeout: Duration::from_millis(parse_or(&lookup, "RPC_TIMEOUT_MS", 10_000)),
            session_buffer: parse_or(&lookup, "SESSION_BUFFER", 256),
            flush_interval: Duration::from_millis(parse_or(&lookup, "WS_FLUSH_INTERVAL_MS", 100)),
            max_inflight: parse_or(&lookup, "MAX_INFLIGHT_ENRICHMENTS", 64),
            block_reward_wei: parse_or(
                &lookup,
                "BLOCK_REWARD_WEI",
                U256::from(2_000_000_000_000_000_000u128),
            ),
            latest_blocks: parse_or(&lookup, "LATEST_BLOCKS", 10),
            address_scan_depth: parse_or(&lookup, "ADDRESS_SCAN_DEPTH", 5),
            upstream_retry_window: Duration::from_secs(parse_or(&lookup, "UPSTREAM_RETRY_SECS", 3600)),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    fn validate(&self) -> Result<(), ExplorerError> {
        if self.node_http_url.is_empty() || self.node_ws_url.is_empty() {
            return Err(ExplorerError::Config("GETH_NODE_URL and GETH_WS_URL must not be empty".into()));
        }
        if !(self.node_ws_url.starts_with("ws://") || self.node_ws_url.starts_with("wss://")) {
            return Err(ExplorerError::Config(format!(
                "GETH_WS_URL must be a ws:// or wss:// URL, got {}",
                self.node_ws_url
            )));
        }
        if self.session_buffer == 0 || self.max_inflight == 0 {
            return Err(ExplorerError::Config(
                "SESSION_BUFFER and MAX_INFLIGHT_ENRICHMENTS must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

// Configuration for the terminal watcher
#[derive(Clone, Debug)]
pub struct WatchConfig {
    pub ws_url: String, // Explorer push endpoint
    pub max_attempts: u32, // Consecutive failed connections before giving up
    pub retry_delay: Duration, // Fixed delay between reconnect attempts
}

impl WatchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        WatchConfig {
            ws_url: lookup("EXPLORER_WS_URL").unwrap_or_else(|| "ws://127.0.0.1:3000/".to_string()),
            max_attempts: parse_or(&lookup, "RECONNECT_MAX_ATTEMPTS", 5),
            retry_delay: Duration::from_millis(parse_or(&lookup, "RECONNECT_DELAY_MS", 3000)),
        }
    }
}

// Unset or unparseable values fall back to the default
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
