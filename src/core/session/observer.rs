use crate::domain::endpoint::Endpoint;
use tracing::{debug, error, info, warn};

/// Lifecycle and failure events reported by a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Opening { endpoint: Endpoint },
    Opened { endpoint: Endpoint },
    OpenFailed { endpoint: Endpoint, error: String },
    ProbeFailed { error: String },
    Reconnecting,
    Reconnected,
    ReconnectFailed { error: String },
    TransactionFailed { request: String, error: String },
    StartupWarning { request: String, error: String },
    Closing,
    Closed,
}

/// Receives session events.
///
/// Sessions hold their observer for their whole life and call it inline, so
/// implementations should return quickly.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, session_id: &str, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: Fn(&str, &SessionEvent) + Send + Sync,
{
    fn on_event(&self, session_id: &str, event: &SessionEvent) {
        self(session_id, event)
    }
}

/// Observer that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_event(&self, session_id: &str, event: &SessionEvent) {
        match event {
            SessionEvent::Opening { endpoint } => {
                info!("Session '{}' opening Telnet connection to {}", session_id, endpoint)
            }
            SessionEvent::Opened { endpoint } => {
                info!("Session '{}' connected to {}", session_id, endpoint)
            }
            SessionEvent::OpenFailed { endpoint, error } => {
                error!("Session '{}' cannot open connection to {}: {}", session_id, endpoint, error)
            }
            SessionEvent::ProbeFailed { error } => {
                warn!("Session '{}' detected dead connection: {}", session_id, error)
            }
            SessionEvent::Reconnecting => {
                warn!("Session '{}' restarting connection", session_id)
            }
            SessionEvent::Reconnected => {
                info!("Session '{}' connection restored", session_id)
            }
            SessionEvent::ReconnectFailed { error } => {
                error!("Session '{}' cannot restore connection: {}", session_id, error)
            }
            SessionEvent::TransactionFailed { request, error } => {
                warn!("Session '{}' request '{}' failed: {}", session_id, request, error)
            }
            SessionEvent::StartupWarning { request, error } => {
                warn!("Session '{}' startup request '{}' failed, continuing degraded: {}", session_id, request, error)
            }
            SessionEvent::Closing => {
                debug!("Session '{}' closing connection", session_id)
            }
            SessionEvent::Closed => {
                info!("Session '{}' closed", session_id)
            }
        }
    }
}
