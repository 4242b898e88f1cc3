use crate::core::communication::{exchange, parse_response, Connector, Transport};
use crate::core::session::observer::{SessionEvent, SessionObserver};
use crate::core::session::state::{SessionStatistics, SessionStatus};
use crate::domain::{
    config::DeviceConfig,
    endpoint::Endpoint,
    error::{LensError, LensResult},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Timing knobs of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// How long to wait for a response line
    pub read_timeout: Duration,
    /// How long to wait for the reply to a liveness probe
    pub probe_timeout: Duration,
    /// Pause between closing a dead transport and opening its replacement
    pub reconnect_backoff: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(2),
            reconnect_backoff: Duration::from_secs(1),
        }
    }
}

impl From<&DeviceConfig> for SessionOptions {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            probe_timeout: config.probe_timeout(),
            reconnect_backoff: config.reconnect_backoff(),
        }
    }
}

/// Long-lived connection to one adapter.
///
/// A session owns at most one transport at a time and replaces it whenever
/// it is found dead. Every request goes through [`Session::guarded_transaction`],
/// which probes the connection first and retries once on a fresh connection
/// when the probe or the exchange fails.
///
/// Transactions take `&mut self`, so one session never has two requests in
/// flight. Call [`Session::close`] before dropping to send the exit sequence.
pub struct Session<C: Connector> {
    id: String,
    endpoint: Endpoint,
    connector: C,
    transport: Option<C::Transport>,
    status: SessionStatus,
    options: SessionOptions,
    statistics: SessionStatistics,
    observer: Arc<dyn SessionObserver>,
}

/// What the fast path learned about the current transport
enum Attempt {
    Done(LensResult<String>),
    Reconnect,
}

impl<C: Connector> Session<C> {
    /// Create a session and make the first connection attempt.
    ///
    /// A failed connection does not fail construction: the session starts
    /// degraded and the next transaction reconnects.
    pub async fn open(
        endpoint: Endpoint,
        connector: C,
        options: SessionOptions,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let mut session = Self {
            id: uuid::Uuid::new_v4().to_string(),
            endpoint,
            connector,
            transport: None,
            status: SessionStatus::Opening,
            options,
            statistics: SessionStatistics::new(),
            observer,
        };

        session.emit(SessionEvent::Opening {
            endpoint: session.endpoint.clone(),
        });

        match session.connector.connect(&session.endpoint).await {
            Ok(transport) => {
                session.transport = Some(transport);
                session.status = SessionStatus::Ready;
                session.emit(SessionEvent::Opened {
                    endpoint: session.endpoint.clone(),
                });
            }
            Err(e) => {
                session.status = SessionStatus::Degraded;
                session.emit(SessionEvent::OpenFailed {
                    endpoint: session.endpoint.clone(),
                    error: e.to_string(),
                });
            }
        }

        session
    }

    /// Send `request` and return the value from its response.
    ///
    /// The transport is probed first. If the probe or the exchange fails at
    /// the transport level the session reconnects and retries exactly once.
    /// A response without a usable token is a parse error and leaves the
    /// connection alone.
    pub async fn guarded_transaction(&mut self, request: &str) -> LensResult<String> {
        if self.status == SessionStatus::Closed {
            return Err(LensError::Closed);
        }
        validate_request(request)?;

        self.statistics.transactions += 1;
        let result = self.run_guarded(request).await;

        if let Err(e) = &result {
            self.statistics.failed_transactions += 1;
            self.emit(SessionEvent::TransactionFailed {
                request: request.to_string(),
                error: e.to_string(),
            });
        }

        result
    }

    async fn run_guarded(&mut self, request: &str) -> LensResult<String> {
        match self.attempt_on_current(request).await {
            Attempt::Done(result) => return result,
            Attempt::Reconnect => {}
        }

        if let Err(e) = self.reconnect().await {
            return Err(LensError::ConnectionLost {
                message: e.to_string(),
            });
        }

        let transport = self.transport.as_mut().ok_or_else(|| LensError::ConnectionLost {
            message: "no transport after reconnect".to_string(),
        })?;

        match exchange(transport, request, self.options.read_timeout).await {
            Ok(raw) => {
                self.statistics.record_activity();
                parse_response(&raw)
            }
            Err(e) => Err(LensError::Transaction {
                message: e.to_string(),
            }),
        }
    }

    async fn attempt_on_current(&mut self, request: &str) -> Attempt {
        let Some(transport) = self.transport.as_mut() else {
            debug!("Session '{}' has no transport, reconnecting", self.id);
            return Attempt::Reconnect;
        };

        if let Err(e) = transport.probe(self.options.probe_timeout).await {
            self.statistics.probe_failures += 1;
            self.emit(SessionEvent::ProbeFailed {
                error: e.to_string(),
            });
            return Attempt::Reconnect;
        }
        debug!("Session '{}' connection is alive", self.id);

        match exchange(transport, request, self.options.read_timeout).await {
            Ok(raw) => {
                self.statistics.record_activity();
                Attempt::Done(parse_response(&raw))
            }
            Err(e) if e.triggers_reconnect() => {
                warn!("Session '{}' request '{}' failed on live connection: {}", self.id, request, e);
                Attempt::Reconnect
            }
            Err(e) => Attempt::Done(Err(e)),
        }
    }

    /// Run the mandatory startup requests.
    ///
    /// Failures are reported as warnings and never abort the session; the
    /// number of failed requests is returned.
    pub async fn startup<I, R>(&mut self, requests: I) -> usize
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let mut failures = 0;
        for request in requests {
            let request = request.as_ref();
            if let Err(e) = self.guarded_transaction(request).await {
                failures += 1;
                self.emit(SessionEvent::StartupWarning {
                    request: request.to_string(),
                    error: e.to_string(),
                });
            }
        }
        failures
    }

    /// Replace the current transport with a fresh connection.
    ///
    /// The old transport is closed before the backoff and the new
    /// connection, so there is never more than one open socket.
    pub async fn reconnect(&mut self) -> LensResult<()> {
        if self.status == SessionStatus::Closed {
            return Err(LensError::Closed);
        }

        self.status = SessionStatus::Reconnecting;
        self.emit(SessionEvent::Reconnecting);

        if let Some(mut stale) = self.transport.take() {
            stale.close().await;
        }

        tokio::time::sleep(self.options.reconnect_backoff).await;

        match self.connector.connect(&self.endpoint).await {
            Ok(transport) => {
                self.transport = Some(transport);
                self.status = SessionStatus::Ready;
                self.statistics.reconnects += 1;
                self.emit(SessionEvent::Reconnected);
                Ok(())
            }
            Err(e) => {
                self.status = SessionStatus::Degraded;
                self.statistics.failed_reconnects += 1;
                self.emit(SessionEvent::ReconnectFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Close the transport and retire the session. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.status == SessionStatus::Closed {
            return;
        }

        self.emit(SessionEvent::Closing);
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        self.status = SessionStatus::Closed;
        self.emit(SessionEvent::Closed);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.statistics
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether a transport is held and still open. Says nothing about the peer.
    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    fn emit(&self, event: SessionEvent) {
        self.observer.on_event(&self.id, &event);
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        // Exit sequence needs async I/O; dropping the transport still releases the socket
        if self.transport.is_some() {
            warn!("Session '{}' dropped without close - exit sequence not sent", self.id);
        }
    }
}

/// Requests are single ASCII lines; the terminator is added by the transport.
fn validate_request(request: &str) -> LensResult<()> {
    if request.is_empty() {
        return Err(LensError::InvalidInput("empty request".to_string()));
    }
    if !request.is_ascii() {
        return Err(LensError::InvalidInput(format!(
            "request {:?} is not ASCII",
            request
        )));
    }
    if request.contains(['\r', '\n']) {
        return Err(LensError::InvalidInput(format!(
            "request {:?} contains a line terminator",
            request
        )));
    }
    Ok(())
}
