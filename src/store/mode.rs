//! Access modes
//!
//! Downloads only ever read; uploads either truncate (`w`) or append (`a`).

use std::fmt;
use std::str::FromStr;

use crate::error::ServeError;

/// Access discipline for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Read,
    Write,
    Append,
}

/// Direction of a store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl Mode {
    /// Wire spelling used in the `X-Mode` header
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::Append => "a",
        }
    }

    pub const fn is_allowed_for(self, direction: Direction) -> bool {
        match direction {
            Direction::Read => matches!(self, Self::Read),
            Direction::Write => matches!(self, Self::Write | Self::Append),
        }
    }
}

impl Direction {
    /// Mode assumed when a request carries no `X-Mode` header
    pub const fn default_mode(self) -> Mode {
        match self {
            Self::Read => Mode::Read,
            Self::Write => Mode::Write,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ServeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "read" => Ok(Self::Read),
            "w" | "write" => Ok(Self::Write),
            "a" | "append" => Ok(Self::Append),
            other => Err(ServeError::bad_request(format!("unsupported mode: {other}"))),
        }
    }
}

/// Reject a mode that the operation direction does not accept
pub fn check(mode: Mode, direction: Direction) -> Result<(), ServeError> {
    if mode.is_allowed_for(direction) {
        Ok(())
    } else {
        Err(ServeError::bad_request(format!("unsupported mode: {mode}")))
    }
}
