use thiserror::Error;

/// Typed gateway failures, carried inside anyhow so the coordinator can
/// classify them into claim reason codes.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The destination chain evaluated the claim and said no.
    #[error("claim rejected by destination chain: {0}")]
    Rejected(String),

    /// No response inside the submission window.
    #[error("claim submission timed out")]
    Timeout,

    /// The request never reached the chain.
    #[error("transport failure: {0}")]
    Transport(String),
}
