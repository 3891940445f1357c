//! Device manager - public entry point wiring transport, router and registry

use std::sync::Arc;

use openhome_discovery::{ActiveSearch, DiscoveryEvent, SsdpTransport};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::DeviceManagerConfig;
use crate::device::Device;
use crate::error::{DeviceManagerError, Result};
use crate::identifier::DeviceId;
use crate::registry::Registry;
use crate::resolver::{DeviceResolver, Resolve};
use crate::router::Router;

/// Keeps a live registry of OpenHome renderers on the local network.
///
/// The manager owns a background router task that turns discovery events
/// into registry updates. Queries read the registry directly and never
/// block on the network.
///
/// # Example
///
/// ```rust,no_run
/// use openhome_devices::{DeviceManager, DeviceManagerConfig};
///
/// # async fn run() -> openhome_devices::Result<()> {
/// let manager = DeviceManager::start(DeviceManagerConfig::default()).await?;
///
/// tokio::time::sleep(std::time::Duration::from_secs(3)).await;
/// for id in manager.get_devices() {
///     if let Some(device) = manager.get_device(&id) {
///         println!("{}: {}", id, device.name);
///     }
/// }
///
/// manager.shutdown().await?;
/// # Ok(())
/// # }
/// ```
///
/// Dropping the manager stops the router as well, without waiting for it.
pub struct DeviceManager {
    registry: Registry,
    shutdown: Option<oneshot::Sender<()>>,
    router: Option<JoinHandle<()>>,
}

impl DeviceManager {
    /// Bind the SSDP transport and start tracking devices.
    ///
    /// Issues one active search for `config.search_target` right away.
    pub async fn start(config: DeviceManagerConfig) -> Result<Self> {
        let mut ssdp = config.ssdp.clone();
        ssdp.channel_capacity = config.channel_capacity;

        let (transport, events) = SsdpTransport::bind(ssdp).await?;
        let resolver = DeviceResolver::new(config.fetch_timeout)?;

        tracing::info!("Device manager started");

        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            events,
            Arc::new(resolver),
        ))
    }

    /// Start tracking devices from any event source.
    ///
    /// `search` receives the startup active search and is kept alive as
    /// long as the router runs. Must be called within a tokio runtime.
    pub fn with_transport(
        config: DeviceManagerConfig,
        search: Arc<dyn ActiveSearch>,
        events: mpsc::Receiver<DiscoveryEvent>,
        resolver: Arc<dyn Resolve>,
    ) -> Self {
        let registry = Registry::new();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let router = Router::new(&config, registry.clone(), resolver);
        let handle = tokio::spawn(router.run(search, events, shutdown_rx));

        Self {
            registry,
            shutdown: Some(shutdown_tx),
            router: Some(handle),
        }
    }

    /// Look up a registered device.
    pub fn get_device(&self, id: &DeviceId) -> Option<Device> {
        self.registry.get(id)
    }

    /// Identifiers of all registered devices.
    pub fn get_devices(&self) -> Vec<DeviceId> {
        self.registry.list()
    }

    /// Read-only handle onto the registry, usable from other threads.
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    /// Stop accepting events and wait until in-flight resolutions have been
    /// applied.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            // The router may already have stopped on its own
            let _ = shutdown.send(());
        }

        if let Some(handle) = self.router.take() {
            handle
                .await
                .map_err(|e| DeviceManagerError::Router(e.to_string()))?;
        }

        tracing::info!("Device manager stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::services::{DeviceServices, ServiceEndpoints};
    use async_trait::async_trait;
    use openhome_discovery::Announcement;
    use url::Url;

    struct NoSearch;

    #[async_trait]
    impl ActiveSearch for NoSearch {
        async fn search(&self, _search_target: &str) -> openhome_discovery::Result<()> {
            Ok(())
        }
    }

    struct StubResolver;

    #[async_trait]
    impl Resolve for StubResolver {
        async fn resolve(&self, id: &DeviceId, location: &str) -> std::result::Result<Device, ResolveError> {
            let url_root = Url::parse(location).map_err(|e| ResolveError::Parse(e.to_string()))?;
            Ok(Device {
                id: id.clone(),
                name: "Stub".to_string(),
                url_root: url_root.clone(),
                source_list: Vec::new(),
                icon: None,
                services: DeviceServices::new(url_root, ServiceEndpoints::default()),
            })
        }
    }

    #[tokio::test]
    async fn test_shutdown_applies_pending_events() {
        let (tx, rx) = mpsc::channel(8);
        let manager = DeviceManager::with_transport(
            DeviceManagerConfig::default(),
            Arc::new(NoSearch),
            rx,
            Arc::new(StubResolver),
        );
        let registry = manager.registry();

        tx.send(DiscoveryEvent::Available(Announcement::new(
            "uuid:ABC-123::urn:av-openhome-org:service:Playlist:1",
            "urn:av-openhome-org:service:Playlist:1",
            "http://10.0.0.5:55178/Ds/device.xml",
        )))
        .await
        .unwrap();
        drop(tx);

        manager.shutdown().await.unwrap();

        assert_eq!(registry.list(), vec![DeviceId::new("ABC-123")]);
    }

    #[tokio::test]
    async fn test_empty_manager() {
        let (_tx, rx) = mpsc::channel(8);
        let manager = DeviceManager::with_transport(
            DeviceManagerConfig::default(),
            Arc::new(NoSearch),
            rx,
            Arc::new(StubResolver),
        );

        assert!(manager.get_devices().is_empty());
        assert!(manager.get_device(&DeviceId::new("nope")).is_none());
        manager.shutdown().await.unwrap();
    }
}
