//! Error types for device resolution and the device manager.

use thiserror::Error;

/// An announcement that cannot be processed.
///
/// The announcement is dropped; this never stops the event router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedAnnouncement {
    /// The unique service name is not of the form `uuid:<id>::<rest>`
    #[error("malformed unique service name: {0:?}")]
    InvalidUsn(String),

    /// The announcement has no description location to resolve
    #[error("announcement {0:?} carries no description location")]
    MissingLocation(String),
}

/// Failure while listing a device's sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The device does not advertise the required service
    #[error("device does not advertise {0}")]
    MissingService(&'static str),

    /// The SOAP call failed
    #[error(transparent)]
    Soap(#[from] soap_client::SoapError),

    /// The response did not contain a usable source list
    #[error("invalid source list: {0}")]
    InvalidSourceList(String),

    /// The blocking SOAP worker could not be joined
    #[error("source enumeration task failed: {0}")]
    Task(String),
}

/// Failure to turn a description location into a [`Device`](crate::Device).
///
/// Any of these aborts the whole resolution; no partial device is produced.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The description document could not be fetched
    #[error("failed to fetch device description: {0}")]
    Fetch(String),

    /// The description document could not be parsed or is incomplete
    #[error("failed to parse device description: {0}")]
    Parse(String),

    /// The device's source list could not be obtained
    #[error("failed to enumerate sources: {0}")]
    SourceEnumeration(#[from] SourceError),
}

/// Errors returned by the [`DeviceManager`](crate::DeviceManager) facade.
#[derive(Debug, Error)]
pub enum DeviceManagerError {
    /// The discovery transport could not be started
    #[error("discovery transport failed: {0}")]
    Discovery(#[from] openhome_discovery::DiscoveryError),

    /// The HTTP client for description fetches could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    /// The router task ended abnormally
    #[error("event router task failed: {0}")]
    Router(String),
}

/// Result type for device manager operations
pub type Result<T> = std::result::Result<T, DeviceManagerError>;
