use std::fmt;

/// Errors raised around the kernel: selector parsing, lane frame validation and
/// config persistence. The cell arithmetic itself never fails.
#[derive(Debug)]
pub enum KernelError {
    UnknownActivation(String),
    LaneMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    NonContiguous(&'static str),
    IoError(std::io::Error),
    SerializationError(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::UnknownActivation(name) => {
                write!(f, "Unknown activation '{}' (expected identity, sigmoid, tanh or relu)", name)
            }
            KernelError::LaneMismatch { field, expected, got } => {
                write!(f, "Lane count mismatch for {}: expected {}, got {}", field, expected, got)
            }
            KernelError::NonContiguous(field) => write!(f, "Array {} is not contiguous", field),
            KernelError::IoError(err) => write!(f, "IO error: {}", err),
            KernelError::SerializationError(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KernelError {
    fn from(error: std::io::Error) -> Self {
        KernelError::IoError(error)
    }
}

impl From<serde_json::Error> for KernelError {
    fn from(error: serde_json::Error) -> Self {
        KernelError::SerializationError(error.to_string())
    }
}

impl From<bincode::Error> for KernelError {
    fn from(error: bincode::Error) -> Self {
        KernelError::SerializationError(error.to_string())
    }
}
