//! Live registry of OpenHome renderers
//!
//! This crate turns SSDP announcements into fully described [`Device`]
//! records and keeps them in a [`Registry`] keyed by [`DeviceId`]:
//!
//! 1. an `ssdp:alive` for `urn:av-openhome-org:service:Playlist:1` starts a
//!    resolution: the device description is fetched, its services are
//!    collected, its sources are listed through the Product service and one
//!    icon is picked;
//! 2. a successful resolution is written to the registry, replacing any
//!    earlier record of the same device;
//! 3. an `ssdp:byebye` removes the device right away.
//!
//! Search responses are resolved and logged but never change the registry.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use openhome_devices::{DeviceManager, DeviceManagerConfig};
//!
//! #[tokio::main]
//! async fn main() -> openhome_devices::Result<()> {
//!     let manager = DeviceManager::start(DeviceManagerConfig::default()).await?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     for id in manager.get_devices() {
//!         println!("{}", id);
//!     }
//!
//!     manager.shutdown().await
//! }
//! ```

mod config;
mod description;
mod device;
mod error;
mod icon;
mod identifier;
mod manager;
mod registry;
mod resolver;
mod router;
mod services;
mod sources;

pub mod logging;

pub use config::{DeviceManagerConfig, ResolutionOrdering, DEFAULT_NOTIFICATION_TYPE, DEFAULT_SEARCH_TARGET};
pub use description::{DeviceDescription, IconDescriptor, ServiceDescription};
pub use device::Device;
pub use error::{DeviceManagerError, MalformedAnnouncement, ResolveError, Result, SourceError};
pub use icon::{select_icon, Icon, MAX_ICON_HEIGHT};
pub use identifier::{extract_identifier, DeviceId};
pub use manager::DeviceManager;
pub use registry::Registry;
pub use resolver::{DeviceResolver, Resolve};
pub use services::{DeviceServices, ServiceEndpoint, ServiceEndpoints, PRODUCT_SERVICE};
pub use sources::{parse_source_list, ProductSourceEnumerator, Source, SourceEnumerator};

// Discovery types callers need to drive the manager themselves
pub use openhome_discovery::{ActiveSearch, Announcement, DiscoveryEvent, SsdpConfig};
