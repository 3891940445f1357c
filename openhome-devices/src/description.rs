//! Device description parsing.
//!
//! This module handles parsing the UPnP device description XML served at an
//! announcement's location into the parts the resolver needs: friendly name,
//! service list and icon list.

use serde::Deserialize;

use crate::error::ResolveError;
use crate::services::{ServiceEndpoint, ServiceEndpoints};

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
pub struct Root {
    pub device: DeviceDescription,
}

/// Device description parsed from XML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    #[serde(default)]
    pub friendly_name: String,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: Option<String>,
    #[serde(default)]
    pub service_list: ServiceList,
    pub icon_list: Option<IconList>,
}

/// `<serviceList>` element.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceDescription>,
}

/// One `<service>` entry of the service list.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDescription {
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "serviceId", default)]
    pub service_id: String,
    #[serde(rename = "SCPDURL", default)]
    pub scpd_url: String,
    #[serde(rename = "controlURL", default)]
    pub control_url: String,
    #[serde(rename = "eventSubURL", default)]
    pub event_sub_url: String,
}

/// `<iconList>` element. Holds one or many icons.
#[derive(Debug, Default, Deserialize)]
pub struct IconList {
    #[serde(rename = "icon", default)]
    pub icons: Vec<IconDescriptor>,
}

/// One `<icon>` entry, with the values exactly as written in the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IconDescriptor {
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub depth: String,
    #[serde(default)]
    pub url: String,
}

impl DeviceDescription {
    /// Parse device description from XML.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Parse` if the XML is malformed or the device has
    /// no friendly name.
    pub fn from_xml(xml: &str) -> Result<Self, ResolveError> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| ResolveError::Parse(format!("Failed to parse device XML: {}", e)))?;

        if root.device.friendly_name.trim().is_empty() {
            return Err(ResolveError::Parse("device has no friendlyName".to_string()));
        }

        Ok(root.device)
    }

    /// Service endpoints keyed by service type. A repeated service type
    /// replaces the earlier entry.
    pub fn endpoints(&self) -> ServiceEndpoints {
        self.service_list
            .services
            .iter()
            .map(|s| ServiceEndpoint {
                service_type: s.service_type.clone(),
                service_id: s.service_id.clone(),
                scpd_url: s.scpd_url.clone(),
                control_url: s.control_url.clone(),
                event_sub_url: s.event_sub_url.clone(),
            })
            .collect()
    }

    /// Icons in source order; empty when the description has no icon list.
    pub fn icons(&self) -> &[IconDescriptor] {
        self.icon_list
            .as_ref()
            .map(|list| list.icons.as_slice())
            .unwrap_or(&[])
    }
}
