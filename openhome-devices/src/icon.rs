//! Representative icon selection

use url::Url;

use crate::description::IconDescriptor;

/// Icons taller than this are skipped; the registry keeps thumbnails only.
pub const MAX_ICON_HEIGHT: f64 = 50.0;

/// The icon retained for a device, with its URL made absolute.
///
/// Dimensions are kept as written in the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub mimetype: String,
    pub width: String,
    pub height: String,
    pub depth: String,
    pub url: Url,
}

impl Icon {
    /// Build an icon from its descriptor, joining the URL onto `location`.
    pub fn resolve(descriptor: &IconDescriptor, location: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            mimetype: descriptor.mimetype.clone(),
            width: descriptor.width.clone(),
            height: descriptor.height.clone(),
            depth: descriptor.depth.clone(),
            url: location.join(&descriptor.url)?,
        })
    }
}

/// Pick the first icon, in source order, that is not taller than
/// [`MAX_ICON_HEIGHT`].
///
/// A height that is not a number does not count as too tall.
pub fn select_icon(icons: &[IconDescriptor]) -> Option<&IconDescriptor> {
    icons.iter().find(|icon| !exceeds_max_height(icon))
}

fn exceeds_max_height(icon: &IconDescriptor) -> bool {
    icon.height
        .trim()
        .parse::<f64>()
        .map(|h| h > MAX_ICON_HEIGHT)
        .unwrap_or(false)
}
