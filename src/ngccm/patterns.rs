//! Response patterns for the ngccm tool's text output.
//!
//! The tool answers a command by printing `<command> #<payload>`. A payload that
//! starts with whitespace is a value; one that starts with `E` is an error.
//! Lines such as `get fec1-ctrl #completions = 65844` are tab-completion noise
//! and must not be taken as the answer.

use regex::bytes::Regex;

/// Matches the end of the answer to `cmd`, or any error line.
pub fn raw_response(cmd: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{} #\s|E.*\n", regex::escape(cmd)))
}

/// Matches the full answer line to `cmd`, capturing the payload as `result`.
pub fn parsed_response(cmd: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{} #(?P<result>(?:\s|E).*)\n", regex::escape(cmd)))
}

/// Matches a single-bit answer to `cmd`, capturing the bit as `result`.
pub fn bit_response(cmd: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{} # (?P<result>[01])", regex::escape(cmd)))
}

/// Pull the trimmed answer to `cmd` out of a block of tool output.
pub fn extract_result(cmd: &str, text: &str) -> Result<Option<String>, regex::Error> {
    let pattern = parsed_response(cmd)?;
    Ok(capture(&pattern, text).map(|r| r.trim().to_string()))
}

/// Pull a single-bit answer to `cmd` out of a block of tool output.
pub fn extract_bit(cmd: &str, text: &str) -> Result<Option<u8>, regex::Error> {
    let pattern = bit_response(cmd)?;
    Ok(capture(&pattern, text).and_then(|b| b.parse().ok()))
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text.as_bytes())
        .and_then(|caps| caps.name("result"))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}
