// Core module - Protocol, session management and device vocabulary
pub mod communication;
pub mod device;
pub mod session;
