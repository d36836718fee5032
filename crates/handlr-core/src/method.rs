//! HTTP method primitives.
//!
//! Statistics slots are indexed by [`HttpMethod::index`]. Extension methods
//! that are not in the standard set parse to [`HttpMethod::Unknown`], which
//! never owns a slot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HandlrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Delete,
    Get,
    Head,
    Post,
    Put,
    Patch,
    Options,
    Connect,
    Trace,
    Unknown,
}

impl HttpMethod {
    /// Number of standard methods (the ones that can own a statistics slot).
    pub const COUNT: usize = 9;

    /// All standard methods in slot order.
    pub const STANDARD: [HttpMethod; Self::COUNT] = [
        HttpMethod::Delete,
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Connect,
        HttpMethod::Trace,
    ];

    /// Slot index, `None` for [`HttpMethod::Unknown`].
    pub fn index(self) -> Option<usize> {
        match self {
            HttpMethod::Unknown => None,
            m => Some(m as usize),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Unknown => "UNKNOWN",
        }
    }

    /// Lenient parse used on the request path: anything unrecognised is `Unknown`.
    pub fn parse(s: &str) -> Self {
        HttpMethod::STANDARD
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(HttpMethod::Unknown)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse used for configuration.
impl FromStr for HttpMethod {
    type Err = HandlrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match HttpMethod::parse(s) {
            HttpMethod::Unknown => Err(HandlrError::BadRequest(format!("unknown http method: {s}"))),
            m => Ok(m),
        }
    }
}
