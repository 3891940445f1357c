//! Watch OpenHome renderers come and go, printing the registry as JSON
//!
//! Usage: cargo run -p openhome-sdk-devices --example watch_devices [interval_secs]
//!
//! Set `OPENHOME_LOG_MODE=development` to see discovery logs on stderr.

use serde::Serialize;
use std::time::Duration;

use openhome_devices::{logging, Device, DeviceManager, DeviceManagerConfig};

#[derive(Serialize)]
struct RendererInfo {
    id: String,
    name: String,
    location: String,
    icon: Option<String>,
    sources: Vec<String>,
}

impl From<Device> for RendererInfo {
    fn from(d: Device) -> Self {
        let sources = d.visible_sources().map(|s| s.name.clone()).collect();
        Self {
            id: d.id.to_string(),
            name: d.name,
            location: d.url_root.to_string(),
            icon: d.icon.map(|i| i.url.to_string()),
            sources,
        }
    }
}

/// Refresh period from the first argument; 5s by default, never zero.
fn refresh_interval(arg: Option<String>) -> Duration {
    let secs = arg.and_then(|s| s.parse::<u64>().ok()).unwrap_or(5).max(1);
    Duration::from_secs(secs)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    let interval = refresh_interval(std::env::args().nth(1));

    let manager = DeviceManager::start(DeviceManagerConfig::default()).await?;
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut renderers: Vec<RendererInfo> = manager
                    .get_devices()
                    .iter()
                    .filter_map(|id| manager.get_device(id))
                    .map(RendererInfo::from)
                    .collect();
                renderers.sort_by(|a, b| a.name.cmp(&b.name));

                println!("{}", serde_json::to_string_pretty(&renderers)?);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    manager.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_interval() {
        assert_eq!(refresh_interval(None), Duration::from_secs(5));
        assert_eq!(refresh_interval(Some("2".to_string())), Duration::from_secs(2));
        assert_eq!(refresh_interval(Some("0".to_string())), Duration::from_secs(1));
        assert_eq!(refresh_interval(Some("soon".to_string())), Duration::from_secs(5));
    }
}
