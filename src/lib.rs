//! LensCtl Library
//!
//! Session management for motorized lens-control adapters reached over a
//! Telnet-framed TCP connection: keep-alive, liveness probing, transparent
//! reconnection and the adapter's command vocabulary.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::communication::{Connector, Transport};
pub use crate::core::device::{Drive, Lens, LensCommand, LensReport};
pub use crate::core::session::{Session, SessionEvent, SessionObserver, SessionOptions, SessionStatus};
pub use domain::config::{DeviceConfig, LensConfig};
pub use domain::endpoint::Endpoint;
pub use domain::error::{LensError, LensResult};
pub use infrastructure::tcp::{TcpConnector, TcpOptions};
