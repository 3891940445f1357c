//! Resolved device record

use url::Url;

use crate::icon::Icon;
use crate::identifier::DeviceId;
use crate::services::DeviceServices;
use crate::sources::Source;

/// A renderer resolved from its description, as held by the registry.
///
/// Immutable once built: a later resolution of the same device replaces
/// the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: DeviceId,
    /// Friendly name from the description, e.g. `Living Room:Majik DSM`
    pub name: String,
    /// Description location the device was resolved from
    pub url_root: Url,
    pub source_list: Vec<Source>,
    /// Representative icon; `None` when no icon fits the height limit
    pub icon: Option<Icon>,
    pub services: DeviceServices,
}

impl Device {
    /// Visible sources only, in device order.
    pub fn visible_sources(&self) -> impl Iterator<Item = &Source> {
        self.source_list.iter().filter(|s| s.visible)
    }
}
