use thiserror::Error;

/// Errors raised while building configuration at process start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No {name} set for the environment")]
    MissingVar { name: &'static str },

    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid pipeline topology: {reason}")]
    InvalidTopology { reason: String },
}

/// Errors related to reading the telemetry archive
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Archive unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Access denied to {location}")]
    AccessDenied { location: String },

    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("I/O failure on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Classifies an I/O error raised while touching `location`.
    pub fn from_io(location: impl Into<String>, source: std::io::Error) -> Self {
        let location = location.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => SourceError::AccessDenied { location },
            std::io::ErrorKind::NotFound => SourceError::NotFound { key: location },
            _ => SourceError::Io { location, source },
        }
    }
}

/// Errors related to submitting telemetry to the gateway
#[derive(Debug, Error)]
pub enum TransmissionError {
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Connection failed: {reason}")]
    Connect { reason: String },

    #[error("Gateway rejected submission with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {reason}")]
    Request { reason: String },
}

impl TransmissionError {
    /// Short label used for metric dimensions.
    pub fn kind(&self) -> &'static str {
        match self {
            TransmissionError::Timeout { .. } => "timeout",
            TransmissionError::Connect { .. } => "connect",
            TransmissionError::Status { .. } => "status",
            TransmissionError::Request { .. } => "request",
        }
    }
}

/// Errors related to host metrics collection
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Error collecting system metrics: {reason}")]
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_message_names_variable() {
        let err = ConfigError::MissingVar {
            name: "API_GATEWAY_URL",
        };
        assert_eq!(
            err.to_string(),
            "No API_GATEWAY_URL set for the environment"
        );
    }

    #[test]
    fn test_io_errors_are_classified() {
        let denied = SourceError::from_io(
            "archive/aws-1.json",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, SourceError::AccessDenied { .. }));

        let missing = SourceError::from_io(
            "archive/aws-2.json",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(missing, SourceError::NotFound { key } if key == "archive/aws-2.json"));

        let other = SourceError::from_io("archive", std::io::Error::other("disk on fire"));
        assert!(matches!(other, SourceError::Io { .. }));
    }

    #[test]
    fn test_transmission_error_kinds() {
        assert_eq!(TransmissionError::Timeout { timeout_ms: 10 }.kind(), "timeout");
        assert_eq!(
            TransmissionError::Status {
                status: 502,
                body: String::new()
            }
            .kind(),
            "status"
        );
    }
}
