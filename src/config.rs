//! Process-wide configuration constants, as a `Config` struct rather than
//! bare constants so the embedder has a documented seam to override them
//! per deployment.

use std::time::Duration;

/// Tunables shared by every `Connection` created from the same embedder.
///
/// Cheap to share by reference or `Arc` across many connections; nothing
/// here is connection-specific.
#[derive(Debug, Clone)]
pub struct Config {
    /// Once the outbound buffer exceeds this many bytes, the connection
    /// chokes: `write_buf` starts returning `false` until the buffer
    /// drains back to half this value.
    pub max_write_backlog: usize,
    /// Applied by the embedder's own timer while a server-role connection
    /// is `Idle` awaiting request reuse.
    pub idle_client_timeout: Duration,
    /// Applied by the embedder's own timer while a client-role connection
    /// is `Idle` awaiting response reuse.
    pub idle_server_timeout: Duration,
}

impl Config {
    pub fn new() -> Config {
        Config {
            max_write_backlog: 50 * 1024,
            idle_client_timeout: Duration::from_secs(120),
            idle_server_timeout: Duration::from_secs(120),
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn defaults_match_spec() {
        let c = Config::new();
        assert_eq!(c.max_write_backlog, 50 * 1024);
        assert_eq!(c.idle_client_timeout.as_secs(), 120);
        assert_eq!(c.idle_server_timeout.as_secs(), 120);
    }
}
