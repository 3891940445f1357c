//! Private SOAP client for UPnP action invocation
//!
//! This crate provides a minimal, blocking SOAP client for calling actions on
//! UPnP services such as the OpenHome `Product` service. Callers pass the
//! absolute control URL advertised in the device description.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::Element;

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a SOAP client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Send a SOAP request and return the parsed `<{action}Response>` element
    ///
    /// # Arguments
    /// * `control_url` - Absolute control URL of the service
    /// * `service_uri` - Service type, e.g. `urn:av-openhome-org:service:Product:1`
    /// * `action` - Action name, e.g. `SourceXml`
    /// * `payload` - Pre-serialized action arguments (may be empty)
    pub fn call(
        &self,
        control_url: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
    <s:Body>
        <u:{action} xmlns:u="{service_uri}">{payload}</u:{action}>
    </s:Body>
</s:Envelope>"#,
            action = action,
            service_uri = service_uri,
            payload = payload
        );

        let soap_action = format!("\"{}#{}\"", service_uri, action);

        let xml_text = match self
            .agent
            .post(control_url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body)
        {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            // UPnP devices report faults with HTTP 500 and a fault envelope
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                return Err(Element::parse(text.as_bytes())
                    .ok()
                    .and_then(|xml| match self.extract_response(&xml, action) {
                        Err(fault @ SoapError::Fault(_)) => Some(fault),
                        _ => None,
                    })
                    .unwrap_or(SoapError::HttpStatus(status)));
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        self.extract_response(&xml, action)
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        if let Some(fault) = body.get_child("Fault") {
            let error_code = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")))
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.trim().parse::<u16>().ok())
                .unwrap_or(500);
            return Err(SoapError::Fault(error_code));
        }

        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT: &str = "urn:av-openhome-org:service:Product:1";

    #[test]
    fn test_extract_response_with_valid_response() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <u:SourceXmlResponse xmlns:u="urn:av-openhome-org:service:Product:1">
                        <Value>&lt;SourceList/&gt;</Value>
                    </u:SourceXmlResponse>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        let response = client.extract_response(&xml, "SourceXml").unwrap();

        assert_eq!(response.name, "SourceXmlResponse");
        let value = response.get_child("Value").and_then(|v| v.get_text()).unwrap();
        assert_eq!(value, "<SourceList/>");
    }

    #[test]
    fn test_extract_response_with_soap_fault() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Client</faultcode>
                        <faultstring>UPnPError</faultstring>
                        <detail>
                            <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
                                <errorCode>401</errorCode>
                                <errorDescription>Invalid Action</errorDescription>
                            </UPnPError>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "SourceXml").unwrap_err() {
            SoapError::Fault(code) => assert_eq!(code, 401),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_body() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "SourceXml").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing SOAP Body")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_action_response() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "SourceXml").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing SourceXmlResponse element")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_call_posts_envelope_with_soapaction() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/Ds/Product/control")
            .match_header("SOAPACTION", "\"urn:av-openhome-org:service:Product:1#SourceXml\"")
            .match_body(mockito::Matcher::Regex("<u:SourceXml".to_string()))
            .with_status(200)
            .with_body(
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
                <u:SourceXmlResponse xmlns:u="urn:av-openhome-org:service:Product:1"><Value>x</Value></u:SourceXmlResponse>
                </s:Body></s:Envelope>"#,
            )
            .create();

        let client = SoapClient::new();
        let url = format!("{}/Ds/Product/control", server.url());
        let response = client.call(&url, PRODUCT, "SourceXml", "").unwrap();

        assert_eq!(response.name, "SourceXmlResponse");
        mock.assert();
    }

    #[test]
    fn test_call_maps_http_500_fault() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/ctl")
            .with_status(500)
            .with_body(
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault>
                <faultcode>s:Client</faultcode><detail><UPnPError><errorCode>801</errorCode></UPnPError></detail>
                </s:Fault></s:Body></s:Envelope>"#,
            )
            .create();

        let client = SoapClient::new();
        let url = format!("{}/ctl", server.url());
        match client.call(&url, PRODUCT, "SourceXml", "").unwrap_err() {
            SoapError::Fault(code) => assert_eq!(code, 801),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_call_maps_plain_http_error() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/ctl").with_status(404).create();

        let client = SoapClient::new();
        let url = format!("{}/ctl", server.url());
        match client.call(&url, PRODUCT, "SourceXml", "").unwrap_err() {
            SoapError::HttpStatus(status) => assert_eq!(status, 404),
            other => panic!("Expected SoapError::HttpStatus, got {:?}", other),
        }
    }
}
