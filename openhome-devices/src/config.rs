//! Device manager configuration

use std::time::Duration;

use openhome_discovery::SsdpConfig;

/// Search target used for the startup active search.
pub const DEFAULT_SEARCH_TARGET: &str = "urn:av-openhome-org:service:Product:1";

/// Notification type that available/unavailable announcements must carry.
pub const DEFAULT_NOTIFICATION_TYPE: &str = "urn:av-openhome-org:service:Playlist:1";

/// How completed resolutions are applied to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionOrdering {
    /// Apply every successful resolution as it completes.
    ///
    /// Concurrent resolutions of one device race: the last to finish wins,
    /// and a resolution finishing after the device's unavailable event puts
    /// it back.
    #[default]
    CompletionOrder,
    /// Apply a resolution only if its triggering event is still the newest
    /// event seen for that device.
    ArrivalOrder,
}

/// Configuration for [`DeviceManager`](crate::DeviceManager).
#[derive(Debug, Clone)]
pub struct DeviceManagerConfig {
    /// Target of the startup active search; also filters search responses
    pub search_target: String,
    /// Notification type available/unavailable events must match
    pub notification_type: String,
    /// Timeout for fetching a device description
    pub fetch_timeout: Duration,
    pub ordering: ResolutionOrdering,
    /// Capacity of the event channel between transport and router
    pub channel_capacity: usize,
    /// SSDP socket settings, used by [`DeviceManager::start`](crate::DeviceManager::start)
    pub ssdp: SsdpConfig,
}

impl Default for DeviceManagerConfig {
    fn default() -> Self {
        Self {
            search_target: DEFAULT_SEARCH_TARGET.to_string(),
            notification_type: DEFAULT_NOTIFICATION_TYPE.to_string(),
            fetch_timeout: Duration::from_secs(5),
            ordering: ResolutionOrdering::default(),
            channel_capacity: 64,
            ssdp: SsdpConfig::default(),
        }
    }
}

impl DeviceManagerConfig {
    pub fn with_search_target(mut self, target: impl Into<String>) -> Self {
        self.search_target = target.into();
        self
    }

    pub fn with_notification_type(mut self, nt: impl Into<String>) -> Self {
        self.notification_type = nt.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_ordering(mut self, ordering: ResolutionOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_ssdp(mut self, ssdp: SsdpConfig) -> Self {
        self.ssdp = ssdp;
        self
    }
}
