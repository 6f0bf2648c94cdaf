use std::time::Duration;

/// Resource limits for one satisfiability query.
///
/// ```
/// use std::time::Duration;
/// use fsmcheck::config::OracleConfig;
///
/// let config = OracleConfig::default()
///     .with_timeout(Duration::from_secs(1))
///     .with_node_limit(1 << 16);
/// assert_eq!(config.node_limit, 1 << 16);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct OracleConfig {
    /// Wall-clock limit per query. `None` disables the limit.
    pub timeout: Option<Duration>,
    /// Maximum number of decision diagram nodes per query.
    pub node_limit: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            node_limit: 1 << 20,
        }
    }
}

impl OracleConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        assert!(node_limit >= 2, "Node limit must leave room for the terminal");
        self.node_limit = node_limit;
        self
    }
}
