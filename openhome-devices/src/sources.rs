//! Source enumeration through the OpenHome Product service.
//!
//! A device's playable inputs are listed by the `SourceXml` action of
//! `urn:av-openhome-org:service:Product:1`, which returns an escaped XML
//! document:
//!
//! ```xml
//! <SourceList>
//!   <Source><Name>Playlist</Name><Type>Playlist</Type><Visible>true</Visible></Source>
//!   <Source><Name>Radio</Name><Type>Radio</Type><Visible>true</Visible></Source>
//! </SourceList>
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use soap_client::SoapClient;

use crate::error::SourceError;
use crate::services::{DeviceServices, PRODUCT_SERVICE};

/// One playable input of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Position in the device's source list, used by `SetSourceIndex`
    #[serde(skip_deserializing)]
    pub index: usize,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub source_type: String,
    #[serde(rename = "Visible", default)]
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
struct SourceList {
    #[serde(rename = "Source", default)]
    sources: Vec<Source>,
}

/// Parse the document returned by `SourceXml`.
pub fn parse_source_list(xml: &str) -> Result<Vec<Source>, SourceError> {
    let list: SourceList = quick_xml::de::from_str(xml)
        .map_err(|e| SourceError::InvalidSourceList(e.to_string()))?;

    Ok(list
        .sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| Source { index, ..source })
        .collect())
}

/// Lists the playable sources of a resolved device.
#[async_trait]
pub trait SourceEnumerator: Send + Sync {
    async fn sources(&self, services: &DeviceServices) -> Result<Vec<Source>, SourceError>;
}

/// [`SourceEnumerator`] calling `Product:1#SourceXml` over SOAP.
///
/// The SOAP client is blocking, so each call runs on tokio's blocking pool.
#[derive(Debug, Clone, Default)]
pub struct ProductSourceEnumerator {
    client: SoapClient,
}

impl ProductSourceEnumerator {
    pub fn new(client: SoapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceEnumerator for ProductSourceEnumerator {
    async fn sources(&self, services: &DeviceServices) -> Result<Vec<Source>, SourceError> {
        let control_url = services
            .control_url(PRODUCT_SERVICE)
            .ok_or(SourceError::MissingService(PRODUCT_SERVICE))?;

        tracing::debug!("Getting sources at {}", control_url);

        let client = self.client.clone();
        let response = tokio::task::spawn_blocking(move || {
            client.call(control_url.as_str(), PRODUCT_SERVICE, "SourceXml", "")
        })
        .await
        .map_err(|e| SourceError::Task(e.to_string()))??;

        let value = response
            .get_child("Value")
            .and_then(|v| v.get_text())
            .ok_or_else(|| SourceError::InvalidSourceList("missing Value in SourceXml response".to_string()))?;

        parse_source_list(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_list() {
        let xml = r#"<SourceList>
            <Source><Name>Playlist</Name><Type>Playlist</Type><Visible>true</Visible></Source>
            <Source><Name>Radio</Name><Type>Radio</Type><Visible>true</Visible></Source>
            <Source><Name>Front Aux</Name><Type>Analog</Type><Visible>false</Visible></Source>
        </SourceList>"#;

        let sources = parse_source_list(xml).unwrap();

        assert_eq!(sources.len(), 3);
        assert_eq!(
            sources[2],
            Source {
                index: 2,
                name: "Front Aux".to_string(),
                source_type: "Analog".to_string(),
                visible: false,
            }
        );
        assert_eq!(sources[0].index, 0);
        assert!(sources[1].visible);
    }

    #[test]
    fn test_parse_empty_source_list() {
        assert!(parse_source_list("<SourceList></SourceList>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_source_list() {
        assert!(matches!(
            parse_source_list("<SourceList><Source><Type>Radio</Type></Source></SourceList>"),
            Err(SourceError::InvalidSourceList(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_product_service() {
        let location = url::Url::parse("http://127.0.0.1:1/device.xml").unwrap();
        let services = DeviceServices::new(location, Default::default());

        let result = ProductSourceEnumerator::default().sources(&services).await;

        assert!(matches!(result, Err(SourceError::MissingService(PRODUCT_SERVICE))));
    }
}
