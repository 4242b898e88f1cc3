//! Minimal Telnet receive-side handling.
//!
//! The adapter speaks through a Telnet server. Incoming command sequences are
//! stripped from the data stream and every option the server offers is
//! refused, which keeps the session in plain NVT mode.

use crate::core::communication::transport::IAC;

pub const SE: u8 = 240;
pub const SB: u8 = 250;
pub const WILL: u8 = 251;
pub const WONT: u8 = 252;
pub const DO: u8 = 253;
pub const DONT: u8 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Command,
    Negotiation(u8),
    Subnegotiation,
    SubnegotiationCommand,
}

/// Output of one decoding step
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Application bytes with Telnet commands removed
    pub data: Vec<u8>,
    /// Negotiation replies to write back to the peer
    pub replies: Vec<u8>,
}

/// Incremental Telnet command filter.
///
/// State is kept between calls, so a command split across two reads is
/// still recognised.
#[derive(Debug, Default)]
pub struct TelnetDecoder {
    state: State,
}

impl TelnetDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, input: &[u8]) -> Decoded {
        let mut out = Decoded::default();

        for &byte in input {
            self.state = match self.state {
                State::Data if byte == IAC => State::Command,
                State::Data => {
                    out.data.push(byte);
                    State::Data
                }
                State::Command => match byte {
                    IAC => {
                        out.data.push(IAC);
                        State::Data
                    }
                    WILL | WONT | DO | DONT => State::Negotiation(byte),
                    SB => State::Subnegotiation,
                    // NOP, GA, AYT and friends carry no data
                    _ => State::Data,
                },
                State::Negotiation(verb) => {
                    match verb {
                        DO => out.replies.extend_from_slice(&[IAC, WONT, byte]),
                        WILL => out.replies.extend_from_slice(&[IAC, DONT, byte]),
                        _ => {}
                    }
                    State::Data
                }
                State::Subnegotiation if byte == IAC => State::SubnegotiationCommand,
                State::Subnegotiation => State::Subnegotiation,
                State::SubnegotiationCommand if byte == SE => State::Data,
                State::SubnegotiationCommand => State::Subnegotiation,
            };
        }

        out
    }
}
