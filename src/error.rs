//! Error types for the FHEVM SDK.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client registry, the encrypt/decrypt facades and the key cache.
#[derive(Error, Debug)]
pub enum Error {
    /// `get()` was called on a registry that was never initialized.
    #[error("FHEVM client not initialized. Call initialize first.")]
    NotInitialized,

    /// Plaintext does not fit the requested bit width.
    #[error("Value {value} out of range for {bits}-bit encryption (0 to {max})")]
    Range { value: String, bits: u32, max: String },

    /// Bit width outside {8, 16, 32, 64, 128, 256}.
    #[error("Unsupported bit size: {0}")]
    UnsupportedWidth(u32),

    /// Authorized decryption needs a signature or a signing provider.
    #[error("Provider required for signature generation")]
    ProviderRequired,

    /// Client construction failed.
    #[error("Failed to initialize FHEVM client: {0}")]
    Initialization(String),

    #[error("invalid encrypted handle: {0}")]
    InvalidHandle(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing or malformed environment configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Opaque failure reported by the wrapped FHE instance or gateway.
    #[error("FHE instance error: {0}")]
    Instance(String),

    /// JSON-RPC transport or node error.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Persistent key store failure.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than by a downstream service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Range { .. }
                | Error::UnsupportedWidth(_)
                | Error::ProviderRequired
                | Error::InvalidHandle(_)
                | Error::InvalidAddress(_)
                | Error::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Rpc(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
