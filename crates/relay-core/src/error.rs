use thiserror::Error;

/// Top-level error type for Relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Error from the AI completion provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error fetching the situational context.
    #[error("context error: {0}")]
    Context(String),

    /// Error from the outbound messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Persistence error.
    #[error("memory error: {0}")]
    Memory(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let relay_err = RelayError::from(io_err);
        let display = format!("{relay_err}");
        assert!(
            display.contains("io error"),
            "expected 'io error' in display, got: {display}"
        );
        assert!(
            display.contains("file missing"),
            "expected 'file missing' in display, got: {display}"
        );
    }

    #[test]
    fn test_channel_error_display() {
        let err = RelayError::Channel("test".into());
        assert_eq!(format!("{err}"), "channel error: test");
    }

    #[test]
    fn test_memory_error_display() {
        let err = RelayError::Memory("disk full".into());
        assert_eq!(format!("{err}"), "memory error: disk full");
    }
}
