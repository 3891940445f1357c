//! Device identity

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MalformedAnnouncement;

/// Stable identifier of a physical device.
///
/// Extracted from the `uuid:<id>::...` unique service name, so every
/// announcement for the same device yields the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId::new(s)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        DeviceId::new(s)
    }
}

/// Extract the device identifier from a unique service name.
///
/// The USN must look like `uuid:<id>::<rest>`. `<id>` ends at the first
/// `::` and must not be empty; `<rest>` is ignored.
///
/// Unlike a greedy `uuid:(.*)::` match, `uuid:ABC::urn:x::extra` yields `ABC`,
/// and leading text before `uuid:` is rejected.
///
/// ```
/// use openhome_devices::extract_identifier;
///
/// let id = extract_identifier("uuid:ABC-123::urn:av-openhome-org:service:Playlist:1").unwrap();
/// assert_eq!(id.as_str(), "ABC-123");
/// assert!(extract_identifier("upnp:rootdevice").is_err());
/// ```
pub fn extract_identifier(usn: &str) -> Result<DeviceId, MalformedAnnouncement> {
    usn.strip_prefix("uuid:")
        .and_then(|rest| rest.split_once("::"))
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .map(DeviceId::new)
        .ok_or_else(|| MalformedAnnouncement::InvalidUsn(usn.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("uuid:ABC-123::urn:av-openhome-org:service:Playlist:1", "ABC-123")]
    #[case(
        "uuid:4c494e4e-0026-0f21-cc9a-01320147013f::urn:av-openhome-org:service:Product:1",
        "4c494e4e-0026-0f21-cc9a-01320147013f"
    )]
    #[case("uuid:ABC::", "ABC")]
    #[case("uuid:ABC::urn:x::extra", "ABC")]
    fn test_extracts_identifier(#[case] usn: &str, #[case] expected: &str) {
        assert_eq!(extract_identifier(usn).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("uuid:ABC-123")]
    #[case("uuid:::urn:x")]
    #[case("UUID:ABC::urn:x")]
    #[case("upnp:rootdevice")]
    #[case(" uuid:ABC::urn:x")]
    fn test_rejects_malformed(#[case] usn: &str) {
        assert_eq!(
            extract_identifier(usn),
            Err(MalformedAnnouncement::InvalidUsn(usn.to_string()))
        );
    }

    #[test]
    fn test_display() {
        let id = DeviceId::new("ABC-123");
        assert_eq!(format!("{}", id), "ABC-123");
    }

    proptest! {
        #[test]
        fn prop_well_formed_usn_yields_id(
            id in "[A-Za-z0-9_-]{1,40}",
            rest in ".*",
        ) {
            let usn = format!("uuid:{}::{}", id, rest);
            let extracted = extract_identifier(&usn).unwrap();
            prop_assert_eq!(extracted.as_str(), id.as_str());
        }

        #[test]
        fn prop_without_uuid_prefix_is_rejected(usn in "[^u].*") {
            prop_assert!(extract_identifier(&usn).is_err());
        }
    }
}
