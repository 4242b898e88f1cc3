use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Session status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    /// First connection attempt in progress
    Opening,
    /// Transport open and believed healthy
    Ready,
    /// Replacing a dead transport
    Reconnecting,
    /// No usable transport; the next transaction will try to reconnect
    Degraded,
    /// Closed by the owner; terminal
    Closed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Opening => write!(f, "Opening"),
            SessionStatus::Ready => write!(f, "Ready"),
            SessionStatus::Reconnecting => write!(f, "Reconnecting"),
            SessionStatus::Degraded => write!(f, "Degraded"),
            SessionStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatistics {
    /// Guarded transactions attempted
    pub transactions: u64,
    /// Guarded transactions that returned an error
    pub failed_transactions: u64,
    /// Liveness probes that found the transport dead
    pub probe_failures: u64,
    /// Successful transport replacements
    pub reconnects: u64,
    /// Transport replacements that could not open a new connection
    pub failed_reconnects: u64,
    /// Session creation timestamp
    pub opened_at: SystemTime,
    /// Last completed exchange with the device
    pub last_activity: Option<SystemTime>,
}

impl SessionStatistics {
    pub fn new() -> Self {
        Self {
            transactions: 0,
            failed_transactions: 0,
            probe_failures: 0,
            reconnects: 0,
            failed_reconnects: 0,
            opened_at: SystemTime::now(),
            last_activity: None,
        }
    }

    pub fn record_activity(&mut self) {
        self.last_activity = Some(SystemTime::now());
    }
}

impl Default for SessionStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_display() {
        assert_eq!(SessionStatus::Opening.to_string(), "Opening");
        assert_eq!(SessionStatus::Ready.to_string(), "Ready");
        assert_eq!(SessionStatus::Reconnecting.to_string(), "Reconnecting");
        assert_eq!(SessionStatus::Degraded.to_string(), "Degraded");
        assert_eq!(SessionStatus::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_statistics_start_empty() {
        let mut stats = SessionStatistics::new();
        assert_eq!(stats.transactions, 0);
        assert_eq!(stats.reconnects, 0);
        assert!(stats.last_activity.is_none());

        stats.record_activity();
        assert!(stats.last_activity.is_some());
    }
}
