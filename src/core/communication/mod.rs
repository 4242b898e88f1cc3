// Communication module - Transport abstraction and response framing
pub mod response;
pub mod transport;

pub use response::parse_response;
pub use transport::{exchange, Connector, Transport};
