//! SSDP transport for OpenHome renderer discovery
//!
//! This crate listens for SSDP announcements on the local network and turns
//! them into typed [`DiscoveryEvent`]s delivered over a tokio channel. It
//! also issues active searches (M-SEARCH) on request.
//!
//! It does not fetch device descriptions or keep any device state; that is
//! the job of the consumer of the event stream.
//!
//! # Quick Start
//!
//! ```no_run
//! use openhome_discovery::{ActiveSearch, DiscoveryEvent, SsdpConfig, SsdpTransport};
//!
//! # async fn run() -> openhome_discovery::Result<()> {
//! let (transport, mut events) = SsdpTransport::bind(SsdpConfig::default()).await?;
//! transport.search("urn:av-openhome-org:service:Product:1").await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         DiscoveryEvent::Available(a) => println!("alive: {}", a.usn),
//!         DiscoveryEvent::Unavailable(a) => println!("byebye: {}", a.usn),
//!         DiscoveryEvent::Found(a) => println!("search response: {}", a.usn),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod ssdp;

pub use error::{DiscoveryError, Result};
pub use ssdp::{SsdpConfig, SsdpMessage, SsdpTransport, SSDP_MULTICAST_ADDR, SSDP_PORT};

use async_trait::async_trait;

/// A single SSDP announcement.
///
/// Produced once per received datagram and consumed once by the event
/// handler; nothing retains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Unique service name, e.g. `uuid:4c494e4e-...::urn:av-openhome-org:service:Playlist:1`
    pub usn: String,
    /// Notification type (NT) for NOTIFY messages, search target (ST) for search responses
    pub target: String,
    /// Device description location. `ssdp:byebye` messages carry none.
    pub location: Option<String>,
}

impl Announcement {
    /// Create an announcement that carries a description location.
    pub fn new(
        usn: impl Into<String>,
        target: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            usn: usn.into(),
            target: target.into(),
            location: Some(location.into()),
        }
    }
}

/// Events emitted by the discovery transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A device announced itself (`NOTIFY` with `NTS: ssdp:alive`)
    Available(Announcement),
    /// A device is leaving the network (`NOTIFY` with `NTS: ssdp:byebye`)
    Unavailable(Announcement),
    /// A device answered an active search (M-SEARCH response)
    Found(Announcement),
}

impl DiscoveryEvent {
    /// The announcement carried by this event.
    pub fn announcement(&self) -> &Announcement {
        match self {
            DiscoveryEvent::Available(a)
            | DiscoveryEvent::Unavailable(a)
            | DiscoveryEvent::Found(a) => a,
        }
    }
}

/// Ability to trigger one active search for a search target.
///
/// Implemented by [`SsdpTransport`]; consumers depend on this trait so that a
/// different transport (or a test double) can be substituted.
#[async_trait]
pub trait ActiveSearch: Send + Sync {
    /// Send one search request for `search_target`. Responses arrive later as
    /// [`DiscoveryEvent::Found`] events.
    async fn search(&self, search_target: &str) -> Result<()>;
}
