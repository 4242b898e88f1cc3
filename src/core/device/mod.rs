// Device module - Lens adapter command vocabulary
pub mod command;
pub mod lens;

pub use command::{Drive, LensCommand};
pub use lens::{Lens, LensReport, Reading};
