// Session module - Connection lifecycle and guarded transactions
pub mod observer;
pub mod session;
pub mod state;

pub use observer::{SessionEvent, SessionObserver, TracingObserver};
pub use session::{Session, SessionOptions};
pub use state::{SessionStatistics, SessionStatus};
