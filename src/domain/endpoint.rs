use serde::{Deserialize, Serialize};
use std::fmt;

/// Network address of a lens-control adapter.
///
/// Set once when a session is built and never changed afterwards; every
/// reconnect dials the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let endpoint = Endpoint::new("192.168.1.50", 10001);
        assert_eq!(endpoint.to_string(), "192.168.1.50:10001");
        assert_eq!(endpoint.host(), "192.168.1.50");
        assert_eq!(endpoint.port(), 10001);
    }
}
