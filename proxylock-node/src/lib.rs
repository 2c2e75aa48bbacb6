//! ProxyLock Node - std/tokio side of the phone proxy
//!
//! This crate provides the pieces that need a filesystem or a runtime:
//! the JSON settings file, the lock IP file, and the async monitor that
//! drives the proximity engine from a stream of position samples.

mod advertiser;
mod file_store;
mod home;
mod ip_file;
mod monitor;

pub use advertiser::LogAdvertiser;
pub use file_store::{FileStore, FileStoreError};
pub use home::{HOME_ENV, IP_FILE, SETTINGS_FILE, proxylock_home};
pub use ip_file::{IpFile, IpFileError};
pub use monitor::{Monitor, MonitorError};

// Re-export commonly used types
pub use proxylock_core::{
    Advertiser, BroadcastSignal, GeoPoint, HomeGeofence, HomeStore, PositionSample,
    ProximityState, StoreError,
};

/// Home-radius store over the settings file in `home`
pub fn open_store(home: &std::path::Path) -> HomeStore<FileStore> {
    HomeStore::new(FileStore::in_home(home))
}

/// Parse a `lat,lon[,accuracy]` line as produced by location loggers
pub fn parse_sample(line: &str) -> Result<PositionSample, String> {
    let mut parts = line.split(',').map(str::trim);
    let lat = parts.next().filter(|s| !s.is_empty()).ok_or("missing latitude")?;
    let lon = parts.next().ok_or("missing longitude")?;

    let lat: f64 = lat.parse().map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
    let lon: f64 = lon.parse().map_err(|e| format!("bad longitude {lon:?}: {e}"))?;
    let accuracy_meters = match parts.next() {
        Some(a) if !a.is_empty() => {
            Some(a.parse().map_err(|e| format!("bad accuracy {a:?}: {e}"))?)
        }
        _ => None,
    };

    let point = GeoPoint::new(lat, lon).map_err(|e| e.to_string())?;
    Ok(PositionSample {
        point,
        accuracy_meters,
        timestamp: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sample_lines() {
        let s = parse_sample("37.0, -122.0").unwrap();
        assert_eq!(s.point, GeoPoint::new(37.0, -122.0).unwrap());
        assert_eq!(s.accuracy_meters, None);

        let s = parse_sample("37.0,-122.0,12.5").unwrap();
        assert_eq!(s.accuracy_meters, Some(12.5));

        assert!(parse_sample("").is_err());
        assert!(parse_sample("37.0").is_err());
        assert!(parse_sample("north,-122").is_err());
        assert!(parse_sample("95,0").is_err());
    }
}
