// Server readiness state
// Lifecycle phases of the server core and their display names

use std::fmt;

/// Readiness state of a [`Server`](super::Server)
///
/// ```text
/// init -> ready -> listening -> closing -> closed
///           ^                                |
///           +----------- reset() ------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Init,
    Ready,
    Listening,
    Closing,
    Closed,
}

impl ServerState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Ready => "ready",
            Self::Listening => "listening",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
