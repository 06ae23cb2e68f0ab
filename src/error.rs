//! Error types and handling for the socket protection hook

use thiserror::Error;

/// Main error type for socket protection operations
#[derive(Error, Debug)]
pub enum VpnError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The raw connection refused access to its native descriptor
    #[error("RawConn.Control on {conn_type}: {source}")]
    RawConnControl {
        /// Concrete type of the raw connection handle
        conn_type: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The host environment rejected a protect request
    #[error("Socket protect failed: {0}")]
    Protect(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for socket protection operations
pub type Result<T> = std::result::Result<T, VpnError>;

/// Helper trait for converting errors to VpnError
pub trait IntoVpnError<T> {
    fn into_vpn_error(self, context: &str) -> Result<T>;
}

impl<T, E> IntoVpnError<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn into_vpn_error(self, context: &str) -> Result<T> {
        self.map_err(|e| VpnError::Other(format!("{context}: {e}")))
    }
}

impl From<toml::de::Error> for VpnError {
    fn from(err: toml::de::Error) -> Self {
        VpnError::Config(format!("TOML parsing error: {err}"))
    }
}
