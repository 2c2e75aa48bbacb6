//! ProxyLock Core
//!
//! Platform-independent logic for a phone acting as a BLE proxy key.
//!
//! This crate provides:
//! - haversine distance and the home geofence types
//! - the home-radius store over a durable key-value trait
//! - the debounced proximity decision engine
//! - the BLE advertiser trait
//!
//! # Example
//!
//! ```
//! use proxylock_core::{BroadcastSignal, GeoPoint, HomeStore, MemoryStore, ProximityEngine};
//!
//! let mut store = HomeStore::new(MemoryStore::new());
//! store.set_home(GeoPoint::new(37.0, -122.0).unwrap(), 100.0).unwrap();
//!
//! let mut engine = ProximityEngine::new();
//! let home = store.get_home().unwrap();
//! let here = GeoPoint::new(37.0, -122.0).unwrap();
//! assert_eq!(engine.update(here, home.as_ref()), Some(BroadcastSignal::Unlock));
//! assert_eq!(engine.update(here, home.as_ref()), None);
//! ```
//!
//! # Note
//! No I/O and no async runtime here. `proxylock-node` provides the file-backed
//! store and the monitor loop, `proxylock-ble` the btleplug advertiser.

pub mod ble;
pub mod engine;
pub mod geo;
pub mod storage;
pub mod store;

pub use ble::*;
pub use engine::*;
pub use geo::*;
pub use storage::*;
pub use store::*;

/// A position fix from the location provider. Only the coordinates feed the
/// decision; accuracy and timestamp are carried for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub point: GeoPoint,
    pub accuracy_meters: Option<f64>,
    pub timestamp: Option<u64>,
}

impl PositionSample {
    pub fn new(point: GeoPoint) -> Self {
        Self { point, accuracy_meters: None, timestamp: None }
    }
}

impl From<GeoPoint> for PositionSample {
    fn from(point: GeoPoint) -> Self {
        Self::new(point)
    }
}
