//! Error types for the discovery transport.

use thiserror::Error;

/// Error type for SSDP transport operations.
///
/// Only socket-level failures surface here. Datagrams that cannot be parsed
/// are dropped by the receive loops and never become errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to create or bind a UDP socket
    #[error("failed to bind UDP socket: {0}")]
    SocketBind(#[source] std::io::Error),

    /// Failed to join the SSDP multicast group
    #[error("failed to join SSDP multicast group: {0}")]
    MulticastJoin(#[source] std::io::Error),

    /// Failed to send an M-SEARCH request
    #[error("failed to send M-SEARCH: {0}")]
    SendSearch(#[source] std::io::Error),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
