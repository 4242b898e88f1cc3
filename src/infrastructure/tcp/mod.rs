// TCP module - Telnet-framed TCP transport
pub mod client;
pub mod keepalive;
pub mod telnet;

pub use client::{LineTransport, TcpConnector, TcpOptions};
