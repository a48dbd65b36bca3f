use std::time::Duration;

/// How a receiver reacts when a PDU declares more payload than it can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadPolicy {
    /// Reject the frame (default).
    #[default]
    Strict,
    /// Clamp the declared length to what is available and log a warning.
    ///
    /// Some deployed devices announce a `control_data_length` larger than
    /// the bytes they actually put on the wire.
    Tolerant,
}

impl PayloadPolicy {
    /// Whether oversized declared lengths are clamped instead of rejected.
    #[must_use]
    pub fn is_tolerant(self) -> bool {
        matches!(self, Self::Tolerant)
    }
}

/// Configuration for a [`ProtocolInterface`](crate::interface::ProtocolInterface)
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Validation policy for inbound declared lengths (default: strict)
    pub payload_policy: PayloadPolicy,

    /// Resolution of the executor timer driving retries, advertising and
    /// discovery expiry (default: 5ms)
    pub tick_interval: Duration,

    /// Maximum in-flight AECP commands per (controller, target) pair;
    /// further commands are queued (default: 10)
    pub max_inflight_aecp: usize,

    /// Interval between automatic global ADP Discover messages
    /// (default: zero, disabled)
    pub discovery_delay: Duration,

    /// Capacity of the protocol event bus (default: 100)
    pub event_capacity: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            payload_policy: PayloadPolicy::Strict,
            tick_interval: Duration::from_millis(5),
            max_inflight_aecp: 10,
            discovery_delay: Duration::ZERO,
            event_capacity: 100,
        }
    }
}

impl ProtocolConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ProtocolConfigBuilder {
        ProtocolConfigBuilder::default()
    }
}

/// Builder for `ProtocolConfig`
#[derive(Debug, Clone, Default)]
pub struct ProtocolConfigBuilder {
    config: ProtocolConfig,
}

impl ProtocolConfigBuilder {
    /// Set the inbound payload validation policy
    #[must_use]
    pub fn payload_policy(mut self, policy: PayloadPolicy) -> Self {
        self.config.payload_policy = policy;
        self
    }

    /// Set the executor timer resolution
    #[must_use]
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Set the AECP in-flight limit per target (at least 1)
    #[must_use]
    pub fn max_inflight_aecp(mut self, max: usize) -> Self {
        self.config.max_inflight_aecp = max.max(1);
        self
    }

    /// Enable periodic ADP Discover messages
    #[must_use]
    pub fn discovery_delay(mut self, delay: Duration) -> Self {
        self.config.discovery_delay = delay;
        self
    }

    /// Set the event bus capacity
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> ProtocolConfig {
        self.config
    }
}
