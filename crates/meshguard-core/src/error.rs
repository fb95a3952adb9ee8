//! Error types for MeshGuard

/// Result type alias using MeshGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for governance operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure reaching the gateway (connect, DNS, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status returned by the gateway
    #[error("gateway error: status {status}: {message}")]
    Gateway { status: u16, message: String },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new gateway error
    pub fn gateway(status: u16, message: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
