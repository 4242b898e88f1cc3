use serde::{Deserialize, Serialize};
use std::fmt;

/// Target position for a focus or aperture move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Drive {
    /// Far mechanical stop: infinity focus, aperture fully open
    Limit,
    /// Near mechanical stop: minimum focus, aperture fully closed
    Zero,
    /// Absolute motor position
    Absolute(i64),
}

impl From<i64> for Drive {
    /// `-1` and `0` are the sentinel values for the two mechanical stops.
    fn from(value: i64) -> Self {
        match value {
            -1 => Drive::Limit,
            0 => Drive::Zero,
            n => Drive::Absolute(n),
        }
    }
}

/// Requests understood by the lens adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensCommand {
    InitAperture,
    LearnFocus,
    Version,
    SerialNumber,
    GetFocus,
    SetFocus(Drive),
    GetAperture,
    SetAperture(Drive),
    LensInfo,
    LensPresent,
}

impl LensCommand {
    /// Transactions every session runs right after connecting
    pub const STARTUP: [LensCommand; 2] = [LensCommand::InitAperture, LensCommand::LearnFocus];

    /// Wire text, without terminator
    pub fn request(&self) -> String {
        match self {
            LensCommand::InitAperture => "in".to_string(),
            LensCommand::LearnFocus => "la".to_string(),
            LensCommand::Version => "lv".to_string(),
            LensCommand::SerialNumber => "sn".to_string(),
            LensCommand::GetFocus => "pf".to_string(),
            LensCommand::SetFocus(Drive::Limit) => "mi".to_string(),
            LensCommand::SetFocus(Drive::Zero) => "mz".to_string(),
            LensCommand::SetFocus(Drive::Absolute(n)) => format!("fa {}", n),
            LensCommand::GetAperture => "pa".to_string(),
            LensCommand::SetAperture(Drive::Limit) => "mo".to_string(),
            LensCommand::SetAperture(Drive::Zero) => "mc".to_string(),
            LensCommand::SetAperture(Drive::Absolute(n)) => format!("ma {}", n),
            LensCommand::LensInfo => "lc".to_string(),
            LensCommand::LensPresent => "lp".to_string(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LensCommand::InitAperture => "initialize aperture motor",
            LensCommand::LearnFocus => "learn focus range",
            LensCommand::Version => "read library version",
            LensCommand::SerialNumber => "read serial number",
            LensCommand::GetFocus => "read focus",
            LensCommand::SetFocus(_) => "set focus",
            LensCommand::GetAperture => "read aperture",
            LensCommand::SetAperture(_) => "set aperture",
            LensCommand::LensInfo => "read extended lens information",
            LensCommand::LensPresent => "check lens presence",
        }
    }
}

impl fmt::Display for LensCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request())
    }
}
