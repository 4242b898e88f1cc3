use crate::core::communication::transport::{Connector, Transport, EXIT, TERMINATOR};
use crate::domain::{
    config::{DeviceConfig, KeepaliveConfig},
    endpoint::Endpoint,
    error::{LensError, LensResult},
};
use crate::infrastructure::tcp::{keepalive, telnet::TelnetDecoder};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Upper bound on the goodbye write so a wedged peer cannot stall close
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest unterminated input buffered before the line is rejected
const MAX_LINE_LENGTH: usize = 4096;

/// CRLF-framed transport over a Telnet byte stream.
///
/// Generic over the stream so the framing can run against in-memory
/// streams as well as TCP sockets.
pub struct LineTransport<S> {
    stream: Option<S>,
    pending: Vec<u8>,
    decoder: TelnetDecoder,
    peer: String,
}

impl<S> LineTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            pending: Vec::new(),
            decoder: TelnetDecoder::new(),
            peer: peer.into(),
        }
    }

    /// Consume the banner the adapter sends on connect.
    ///
    /// A missing banner is not an error; some firmware stays silent.
    pub async fn skip_welcome(&mut self, timeout: Duration) -> LensResult<()> {
        match self.read_line(timeout).await {
            Ok(line) => {
                debug!("Welcome from {}: {}", self.peer, String::from_utf8_lossy(&line).trim_end());
                Ok(())
            }
            Err(LensError::Timeout(_)) => {
                info!("No welcome line from {} within {:?}, continuing", self.peer, timeout);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn next_line(&mut self) -> LensResult<Vec<u8>> {
        let mut chunk = [0u8; 512];

        loop {
            if let Some(pos) = self.pending.windows(TERMINATOR.len()).position(|w| w == TERMINATOR) {
                let line: Vec<u8> = self.pending.drain(..pos + TERMINATOR.len()).collect();
                debug!("<- {} {}", self.peer, hex::encode(&line));
                return Ok(line);
            }

            if self.pending.len() > MAX_LINE_LENGTH {
                self.pending.clear();
                return Err(LensError::transport(format!(
                    "line too long: {} sent more than {} bytes without a terminator",
                    self.peer, MAX_LINE_LENGTH
                )));
            }

            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| LensError::transport(format!("connection to {} is closed", self.peer)))?;

            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|e| LensError::transport(format!("read from {} failed: {}", self.peer, e)))?;
            if n == 0 {
                return Err(LensError::transport(format!("connection closed by {}", self.peer)));
            }

            let decoded = self.decoder.decode(&chunk[..n]);
            self.pending.extend_from_slice(&decoded.data);

            if !decoded.replies.is_empty() {
                debug!("-> {} {} (option refusal)", self.peer, hex::encode(&decoded.replies));
                stream
                    .write_all(&decoded.replies)
                    .await
                    .map_err(|e| LensError::transport(format!("write to {} failed: {}", self.peer, e)))?;
            }
        }
    }
}

#[async_trait]
impl<S> Transport for LineTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_line(&mut self, payload: &[u8]) -> LensResult<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| LensError::transport(format!("connection to {} is closed", self.peer)))?;

        let mut line = Vec::with_capacity(payload.len() + TERMINATOR.len());
        line.extend_from_slice(payload);
        line.extend_from_slice(TERMINATOR);

        debug!("-> {} {}", self.peer, hex::encode(&line));
        stream
            .write_all(&line)
            .await
            .map_err(|e| LensError::transport(format!("write to {} failed: {}", self.peer, e)))?;
        stream
            .flush()
            .await
            .map_err(|e| LensError::transport(format!("flush to {} failed: {}", self.peer, e)))
    }

    async fn read_line(&mut self, timeout: Duration) -> LensResult<Vec<u8>> {
        tokio::time::timeout(timeout, self.next_line())
            .await
            .map_err(|_| LensError::Timeout(timeout))?
    }

    async fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        self.pending.clear();

        let goodbye = [EXIT, TERMINATOR[0], TERMINATOR[1]];
        let farewell = async {
            stream.write_all(&goodbye).await?;
            stream.shutdown().await?;
            Ok::<_, std::io::Error>(())
        };
        match tokio::time::timeout(CLOSE_TIMEOUT, farewell).await {
            Ok(Ok(())) => {}
            // Peer is usually already gone when we get here
            Ok(Err(e)) => debug!("Exit sequence to {} not delivered: {}", self.peer, e),
            Err(_) => debug!("Exit sequence to {} timed out", self.peer),
        }

        info!("Telnet connection to {} closed", self.peer);
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// Socket-level settings for new connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpOptions {
    pub connect_timeout: Duration,
    pub welcome_timeout: Duration,
    pub keepalive: KeepaliveConfig,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            welcome_timeout: Duration::from_secs(2),
            keepalive: KeepaliveConfig::default(),
        }
    }
}

impl From<&DeviceConfig> for TcpOptions {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            welcome_timeout: config.read_timeout(),
            keepalive: config.keepalive.clone(),
        }
    }
}

/// Opens Telnet connections to the adapter over TCP
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    options: TcpOptions,
}

impl TcpConnector {
    pub fn new(options: TcpOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Transport = LineTransport<TcpStream>;

    async fn connect(&self, endpoint: &Endpoint) -> LensResult<Self::Transport> {
        let connect_error = |message: String| LensError::Connect {
            endpoint: endpoint.to_string(),
            message,
        };

        let stream = tokio::time::timeout(
            self.options.connect_timeout,
            TcpStream::connect((endpoint.host(), endpoint.port())),
        )
        .await
        .map_err(|_| connect_error(format!("timed out after {:?}", self.options.connect_timeout)))?
        .map_err(|e| connect_error(e.to_string()))?;

        if let Err(e) = keepalive::configure(&stream, &self.options.keepalive) {
            warn!("Failed to configure TCP keep-alive for {}: {}", endpoint, e);
        }

        info!("TCP connection established to {}", endpoint);

        let mut transport = LineTransport::new(stream, endpoint.to_string());
        transport
            .skip_welcome(self.options.welcome_timeout)
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        Ok(transport)
    }
}
