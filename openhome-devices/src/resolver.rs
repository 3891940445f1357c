//! Turns a description location into a complete [`Device`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::description::DeviceDescription;
use crate::device::Device;
use crate::error::{DeviceManagerError, ResolveError};
use crate::icon::{select_icon, Icon};
use crate::identifier::DeviceId;
use crate::services::DeviceServices;
use crate::sources::{ProductSourceEnumerator, SourceEnumerator};

/// Resolves an announced device into a registry record.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Fetch and assemble the device described at `location`.
    ///
    /// `id` only stamps the resulting record. Either a complete device is
    /// returned or an error; never a partial record.
    async fn resolve(&self, id: &DeviceId, location: &str) -> Result<Device, ResolveError>;
}

/// Default [`Resolve`] implementation: HTTP description fetch followed by
/// source enumeration.
pub struct DeviceResolver {
    http_client: reqwest::Client,
    sources: Arc<dyn SourceEnumerator>,
}

impl DeviceResolver {
    /// Create a resolver whose description fetches give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeviceManagerError> {
        Self::with_enumerator(timeout, Arc::new(ProductSourceEnumerator::default()))
    }

    /// Create a resolver with a custom source enumerator.
    pub fn with_enumerator(
        timeout: Duration,
        sources: Arc<dyn SourceEnumerator>,
    ) -> Result<Self, DeviceManagerError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeviceManagerError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            sources,
        })
    }

    async fn fetch_description(&self, location: &Url) -> Result<DeviceDescription, ResolveError> {
        let response = self
            .http_client
            .get(location.clone())
            .send()
            .await
            .map_err(|e| ResolveError::Fetch(format!("{}: {}", location, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Fetch(format!("{}: HTTP {}", location, status)));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| ResolveError::Fetch(format!("Failed to read response body: {}", e)))?;

        DeviceDescription::from_xml(&xml)
    }
}

#[async_trait]
impl Resolve for DeviceResolver {
    async fn resolve(&self, id: &DeviceId, location: &str) -> Result<Device, ResolveError> {
        let url_root = Url::parse(location)
            .map_err(|e| ResolveError::Parse(format!("invalid location {:?}: {}", location, e)))?;

        let description = self.fetch_description(&url_root).await?;
        let services = DeviceServices::new(url_root.clone(), description.endpoints());

        let source_list = self.sources.sources(&services).await?;

        let icon = select_icon(description.icons()).and_then(|descriptor| {
            Icon::resolve(descriptor, &url_root)
                .map_err(|e| {
                    tracing::warn!("Dropping icon {:?} of {}: {}", descriptor.url, id, e);
                })
                .ok()
        });

        Ok(Device {
            id: id.clone(),
            name: description.friendly_name,
            url_root,
            source_list,
            icon,
            services,
        })
    }
}
