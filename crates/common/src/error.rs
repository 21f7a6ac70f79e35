//! Common error types for the reconfiguration components.

use std::fmt;

/// A specialized Result type for reconfiguration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for reconfiguration operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Switch driver error: {0}")]
    Switch(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Packet error: {0}")]
    Packet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new transport error.
    pub fn transport(msg: impl fmt::Display) -> Self {
        Error::Transport(msg.to_string())
    }

    /// Create a new switch driver error.
    pub fn switch(msg: impl fmt::Display) -> Self {
        Error::Switch(msg.to_string())
    }

    /// Create a new topology error.
    pub fn topology(msg: impl fmt::Display) -> Self {
        Error::Topology(msg.to_string())
    }

    /// Create a new packet error.
    pub fn packet(msg: impl fmt::Display) -> Self {
        Error::Packet(msg.to_string())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new other error.
    pub fn other(msg: impl fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        let err = Error::switch("channel 88 rejected");
        assert!(matches!(err, Error::Switch(_)));
        assert_eq!(err.to_string(), "Switch driver error: channel 88 rejected");

        let err = Error::topology("unknown host 7");
        assert_eq!(err.to_string(), "Topology error: unknown host 7");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "raw socket");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
