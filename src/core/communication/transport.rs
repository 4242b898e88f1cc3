use crate::domain::{endpoint::Endpoint, error::LensResult};
use async_trait::async_trait;
use std::time::Duration;

/// Line terminator used in both directions.
pub const TERMINATOR: &[u8; 2] = b"\r\n";

/// Telnet "interpret as command" escape.
pub const IAC: u8 = 0xFF;

/// Telnet no-operation command.
pub const NOP: u8 = 0xF1;

/// Control byte sent to ask the adapter to drop the connection.
pub const EXIT: u8 = 0x1D;

/// Payload of a liveness probe; the terminator is appended on write.
pub const PROBE_SEQUENCE: [u8; 2] = [IAC, NOP];

/// Line-oriented conversation with one adapter connection.
///
/// Implementations own their socket exclusively. Once `close` has run the
/// transport stays closed and every I/O call fails with a transport error.
#[async_trait]
pub trait Transport: Send {
    /// Write `payload` followed by the terminator.
    async fn write_line(&mut self, payload: &[u8]) -> LensResult<()>;

    /// Read up to and including the next terminator.
    async fn read_line(&mut self, timeout: Duration) -> LensResult<Vec<u8>>;

    /// Check that the peer is still answering.
    ///
    /// Any line coming back counts as alive. A timeout is a dead peer, not
    /// an unknown one.
    async fn probe(&mut self, timeout: Duration) -> LensResult<()> {
        self.write_line(&PROBE_SEQUENCE).await?;
        self.read_line(timeout).await.map(|_| ())
    }

    /// Say goodbye and release the socket. Never fails; safe to repeat.
    async fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Opens fresh transports against an endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self, endpoint: &Endpoint) -> LensResult<Self::Transport>;
}

/// Send one request and wait for its response line.
pub async fn exchange<T>(transport: &mut T, request: &str, timeout: Duration) -> LensResult<Vec<u8>>
where
    T: Transport + ?Sized,
{
    transport.write_line(request.as_bytes()).await?;
    transport.read_line(timeout).await
}
