use crate::entropy::EntropySource;
use crate::plugin::ReadError;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const ENTROPY_AVAIL: &str = "sys/kernel/random/entropy_avail";
const MAX_READ_BYTES: u64 = 63;

/// Entropy estimate from the procfs available-entropy counter.
pub struct ProcFsSource {
    proc: String,
}

impl ProcFsSource {
    pub fn new(proc: &str) -> Self {
        ProcFsSource { proc: proc.to_string() }
    }
}

impl EntropySource for ProcFsSource {
    fn read(&self) -> Result<f64, ReadError> {
        let path = Path::new(&self.proc).join(ENTROPY_AVAIL);
        let file = File::open(path).map_err(ReadError::SourceUnavailable)?;

        let mut buffer = Vec::with_capacity(MAX_READ_BYTES as usize);
        file.take(MAX_READ_BYTES)
            .read_to_end(&mut buffer)
            .map_err(ReadError::ReadFailure)?;
        if buffer.is_empty() {
            return Err(ReadError::ReadFailure(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no data in entropy counter",
            )));
        }

        Ok(parse_gauge(&String::from_utf8_lossy(&buffer)))
    }
}

/// Parses the leading numeric prefix of `text`: leading whitespace is
/// skipped, trailing garbage ignored, and input with no numeric prefix
/// yields 0.0 rather than an error.
fn parse_gauge(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut pos = 0;
    let mut end = 0;
    let mut saw_digit = false;

    if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        pos += 1;
    }
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
        saw_digit = true;
        end = pos;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
            saw_digit = true;
            end = pos;
        }
    }
    if saw_digit && pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        // The exponent only counts when at least one digit follows it.
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let mut saw_exp_digit = false;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
            saw_exp_digit = true;
        }
        if saw_exp_digit {
            end = exp;
        }
    }

    if !saw_digit {
        return 0.0;
    }
    trimmed[..end].parse().unwrap_or(0.0)
}
