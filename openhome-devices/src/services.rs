//! Service endpoints advertised by a device and the control handle built from them.

use std::collections::HashMap;

use url::Url;

/// Service type of the OpenHome Product service.
pub const PRODUCT_SERVICE: &str = "urn:av-openhome-org:service:Product:1";

/// One advertised service of a device, with URLs as written in the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub service_type: String,
    pub service_id: String,
    pub scpd_url: String,
    pub control_url: String,
    pub event_sub_url: String,
}

/// Service endpoints keyed by service type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEndpoints(HashMap<String, ServiceEndpoint>);

impl ServiceEndpoints {
    /// Insert an endpoint, replacing any earlier one with the same service type.
    pub fn insert(&mut self, endpoint: ServiceEndpoint) {
        self.0.insert(endpoint.service_type.clone(), endpoint);
    }

    pub fn get(&self, service_type: &str) -> Option<&ServiceEndpoint> {
        self.0.get(service_type)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn service_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<ServiceEndpoint> for ServiceEndpoints {
    fn from_iter<I: IntoIterator<Item = ServiceEndpoint>>(iter: I) -> Self {
        let mut endpoints = ServiceEndpoints::default();
        for endpoint in iter {
            endpoints.insert(endpoint);
        }
        endpoints
    }
}

/// Handle to a resolved device's services.
///
/// Turns the relative URLs of the description into absolute ones so that
/// callers can invoke actions or subscribe to events on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceServices {
    location: Url,
    endpoints: ServiceEndpoints,
}

impl DeviceServices {
    pub fn new(location: Url, endpoints: ServiceEndpoints) -> Self {
        Self {
            location,
            endpoints,
        }
    }

    /// Description location the relative URLs are resolved against.
    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub fn has_service(&self, service_type: &str) -> bool {
        self.endpoints.get(service_type).is_some()
    }

    /// Absolute control URL of a service, if advertised and well formed.
    pub fn control_url(&self, service_type: &str) -> Option<Url> {
        self.resolve(service_type, |e| &e.control_url)
    }

    /// Absolute event subscription URL of a service.
    pub fn event_sub_url(&self, service_type: &str) -> Option<Url> {
        self.resolve(service_type, |e| &e.event_sub_url)
    }

    /// Absolute service description (SCPD) URL of a service.
    pub fn scpd_url(&self, service_type: &str) -> Option<Url> {
        self.resolve(service_type, |e| &e.scpd_url)
    }

    fn resolve(&self, service_type: &str, pick: impl Fn(&ServiceEndpoint) -> &String) -> Option<Url> {
        let endpoint = self.endpoints.get(service_type)?;
        let relative = pick(endpoint);
        if relative.is_empty() {
            return None;
        }
        self.location.join(relative).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(service_type: &str, control_url: &str) -> ServiceEndpoint {
        ServiceEndpoint {
            service_type: service_type.to_string(),
            service_id: format!("{}-id", service_type),
            scpd_url: "service.xml".to_string(),
            control_url: control_url.to_string(),
            event_sub_url: String::new(),
        }
    }

    #[test]
    fn test_from_iter_last_write_wins() {
        let endpoints: ServiceEndpoints = vec![
            endpoint(PRODUCT_SERVICE, "/first"),
            endpoint(PRODUCT_SERVICE, "/second"),
        ]
        .into_iter()
        .collect();

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints.get(PRODUCT_SERVICE).unwrap().control_url, "/second");
    }

    #[test]
    fn test_control_url_resolves_against_location() {
        let location = Url::parse("http://192.168.1.136:55178/Ds/device.xml").unwrap();
        let services = DeviceServices::new(
            location,
            vec![endpoint(PRODUCT_SERVICE, "/Ds/Product/control")].into_iter().collect(),
        );

        assert_eq!(
            services.control_url(PRODUCT_SERVICE).unwrap().as_str(),
            "http://192.168.1.136:55178/Ds/Product/control"
        );
        // Relative to the description's directory
        assert_eq!(
            services.scpd_url(PRODUCT_SERVICE).unwrap().as_str(),
            "http://192.168.1.136:55178/Ds/service.xml"
        );
        assert_eq!(services.event_sub_url(PRODUCT_SERVICE), None);
        assert!(services.has_service(PRODUCT_SERVICE));
        assert_eq!(services.control_url("urn:unknown"), None);
    }

    #[test]
    fn test_absolute_control_url_is_kept() {
        let location = Url::parse("http://10.0.0.1:80/desc.xml").unwrap();
        let services = DeviceServices::new(
            location,
            vec![endpoint(PRODUCT_SERVICE, "http://10.0.0.2:8080/ctl")].into_iter().collect(),
        );

        assert_eq!(
            services.control_url(PRODUCT_SERVICE).unwrap().as_str(),
            "http://10.0.0.2:8080/ctl"
        );
    }
}
