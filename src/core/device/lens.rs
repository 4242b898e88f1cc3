use crate::core::communication::Connector;
use crate::core::device::command::{Drive, LensCommand};
use crate::core::session::{
    Session, SessionObserver, SessionOptions, SessionStatus, TracingObserver,
};
use crate::domain::{
    config::DeviceConfig,
    endpoint::Endpoint,
    error::{LensError, LensResult},
};
use crate::infrastructure::tcp::{TcpConnector, TcpOptions};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Motorized lens adapter
///
/// Thin command layer over a [`Session`]: each method maps to one request
/// and returns the value the adapter reported.
pub struct Lens<C: Connector = TcpConnector> {
    session: Session<C>,
}

impl Lens<TcpConnector> {
    /// Connect to the adapter described by `device`, logging through `tracing`.
    pub async fn connect(device: &DeviceConfig) -> Self {
        Self::connect_with_observer(device, Arc::new(TracingObserver)).await
    }

    pub async fn connect_with_observer(
        device: &DeviceConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self::with_connector(
            device.endpoint(),
            TcpConnector::new(TcpOptions::from(device)),
            SessionOptions::from(device),
            observer,
            device.initialize,
        )
        .await
    }
}

impl<C: Connector> Lens<C> {
    /// Open a session and, when `initialize` is set, run the startup
    /// transactions. Never fails; an unreachable adapter gives a degraded lens.
    pub async fn with_connector(
        endpoint: Endpoint,
        connector: C,
        options: SessionOptions,
        observer: Arc<dyn SessionObserver>,
        initialize: bool,
    ) -> Self {
        let session = Session::open(endpoint, connector, options, observer).await;
        let mut lens = Self { session };
        if initialize {
            lens.initialize().await;
        }
        lens
    }

    /// Initialize the aperture motor and learn the focus range.
    ///
    /// Returns `true` when both steps succeeded.
    pub async fn initialize(&mut self) -> bool {
        let requests = LensCommand::STARTUP.map(|command| command.request());
        let failures = self.session.startup(requests).await;
        if failures == 0 {
            info!("Lens at {} initialized", self.session.endpoint());
        }
        failures == 0
    }

    pub async fn execute(&mut self, command: LensCommand) -> LensResult<String> {
        self.session.guarded_transaction(&command.request()).await
    }

    /// Send an arbitrary single-line request
    pub async fn raw(&mut self, request: &str) -> LensResult<String> {
        self.session.guarded_transaction(request).await
    }

    pub async fn version(&mut self) -> LensResult<String> {
        self.execute(LensCommand::Version).await
    }

    pub async fn serial_number(&mut self) -> LensResult<String> {
        self.execute(LensCommand::SerialNumber).await
    }

    pub async fn get_focus(&mut self) -> LensResult<String> {
        self.execute(LensCommand::GetFocus).await
    }

    /// Move focus; `-1` drives to infinity and `0` to the near stop.
    pub async fn set_focus(&mut self, value: i64) -> LensResult<String> {
        self.execute(LensCommand::SetFocus(Drive::from(value))).await
    }

    pub async fn get_aperture(&mut self) -> LensResult<String> {
        self.execute(LensCommand::GetAperture).await
    }

    /// Move aperture; `-1` opens fully and `0` closes fully.
    pub async fn set_aperture(&mut self, value: i64) -> LensResult<String> {
        self.execute(LensCommand::SetAperture(Drive::from(value))).await
    }

    pub async fn lens_info(&mut self) -> LensResult<String> {
        self.execute(LensCommand::LensInfo).await
    }

    pub async fn lens_present(&mut self) -> LensResult<String> {
        self.execute(LensCommand::LensPresent).await
    }

    /// Read every identification and position value the adapter exposes.
    ///
    /// Once the connection is lost the remaining readings are skipped
    /// instead of reconnecting once per field.
    pub async fn report(&mut self) -> LensReport {
        let commands = [
            LensCommand::SerialNumber,
            LensCommand::Version,
            LensCommand::LensPresent,
            LensCommand::LensInfo,
            LensCommand::GetFocus,
            LensCommand::GetAperture,
        ];

        let mut readings = Vec::with_capacity(commands.len());
        let mut lost: Option<String> = None;
        for command in commands {
            let reading = match &lost {
                Some(reason) => Reading::failed(format!("skipped: {}", reason)),
                None => match self.execute(command).await {
                    Ok(value) => Reading::value(value),
                    Err(e) => {
                        if matches!(e, LensError::ConnectionLost { .. } | LensError::Closed) {
                            lost = Some(e.to_string());
                        }
                        Reading::failed(e.to_string())
                    }
                },
            };
            readings.push(reading);
        }

        let mut readings = readings.into_iter();
        let mut next = || readings.next().unwrap_or_default();
        LensReport {
            endpoint: self.session.endpoint().to_string(),
            session_id: self.session.id().to_string(),
            serial_number: next(),
            version: next(),
            lens_present: next(),
            lens_info: next(),
            focus: next(),
            aperture: next(),
            status: self.session.status(),
        }
    }

    /// Close the connection. Safe to call repeatedly.
    pub async fn close(&mut self) {
        self.session.close().await;
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }
}

/// One value in a [`LensReport`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reading {
    pub fn value(value: String) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, &self.error) {
            (Some(value), _) => write!(f, "{}", value),
            (None, Some(error)) => write!(f, "<{}>", error),
            (None, None) => write!(f, "-"),
        }
    }
}

/// Snapshot of adapter identity and lens position
#[derive(Debug, Clone, Serialize)]
pub struct LensReport {
    pub endpoint: String,
    pub session_id: String,
    pub status: SessionStatus,
    pub serial_number: Reading,
    pub version: Reading,
    pub lens_present: Reading,
    pub lens_info: Reading,
    pub focus: Reading,
    pub aperture: Reading,
}

impl LensReport {
    /// Label/value pairs in display order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Endpoint", self.endpoint.clone()),
            ("Status", self.status.to_string()),
            ("Serial number", self.serial_number.to_string()),
            ("Version", self.version.to_string()),
            ("Lens present", self.lens_present.to_string()),
            ("Lens info", self.lens_info.to_string()),
            ("Focus", self.focus.to_string()),
            ("Aperture", self.aperture.to_string()),
        ]
    }
}
