use crate::domain::error::{LensError, LensResult};

/// Extract the value from a raw response line.
///
/// The adapter echoes the command and status text ahead of the value, so
/// the value is the last whitespace-separated token.
pub fn parse_response(raw: &[u8]) -> LensResult<String> {
    let text = String::from_utf8_lossy(raw);
    text.split_whitespace()
        .last()
        .map(str::to_string)
        .ok_or_else(|| LensError::Parse {
            response: text.into_owned(),
        })
}
