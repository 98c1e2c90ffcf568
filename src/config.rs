//! Bus configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with defaults matching the historical
//! behavior of the protocol (3 s reconnect delay, `--HEARTBEAT--` sentinel).

use std::time::Duration;

/// Top-level bus configuration.
///
/// Loaded once at startup via [`BusConfig::from_env`], or built directly
/// for embedded/test use.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// WebSocket URL the connection manager dials (e.g. `ws://host:port/ws`).
    pub url: String,

    /// Delay between a connection loss and the next connect attempt.
    pub reconnect_delay: Duration,

    /// Heartbeat sentinel. An inbound text frame exactly equal to this
    /// string is echoed back verbatim and never routed.
    pub heartbeat: String,

    /// Per-call deadline after which an unsettled remote call is rejected
    /// with [`crate::error::CallError::Timeout`]. `None` disables the
    /// deadline and a call with no reply stays pending forever.
    pub call_timeout: Option<Duration>,

    /// Maximum number of signal delivery ids remembered for deduplication.
    /// The oldest id is evicted first; `0` means unbounded.
    pub dedup_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws".to_string(),
            reconnect_delay: Duration::from_millis(3000),
            heartbeat: "--HEARTBEAT--".to_string(),
            call_timeout: None,
            dedup_capacity: 4096,
        }
    }
}

impl BusConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the defaults when a variable is not set or does not
    /// parse. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file. Recognized keys:
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SIGNAL_BUS_URL` | `ws://127.0.0.1:8000/ws` |
    /// | `SIGNAL_BUS_RECONNECT_DELAY_MS` | `3000` |
    /// | `SIGNAL_BUS_HEARTBEAT` | `--HEARTBEAT--` |
    /// | `SIGNAL_BUS_CALL_TIMEOUT_MS` | `0` (disabled) |
    /// | `SIGNAL_BUS_DEDUP_CAPACITY` | `4096` (`0` = unbounded) |
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let url = std::env::var("SIGNAL_BUS_URL").unwrap_or(defaults.url);
        let heartbeat = std::env::var("SIGNAL_BUS_HEARTBEAT").unwrap_or(defaults.heartbeat);

        let reconnect_delay =
            Duration::from_millis(parse_env("SIGNAL_BUS_RECONNECT_DELAY_MS", 3000));
        let call_timeout = match parse_env("SIGNAL_BUS_CALL_TIMEOUT_MS", 0u64) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        let dedup_capacity = parse_env("SIGNAL_BUS_DEDUP_CAPACITY", 4096);

        Self {
            url,
            reconnect_delay,
            heartbeat,
            call_timeout,
            dedup_capacity,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
