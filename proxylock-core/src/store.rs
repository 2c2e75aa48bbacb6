//! Home-radius store - the single home geofence and the auto-unlock flag

use log::*;
use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, HomeGeofence, ValidationError};
use crate::storage::KeyValueStore;

pub const HOME_LOCATION_KEY: &str = "home_location";
pub const AUTO_UNLOCK_ENABLED_KEY: &str = "auto_unlock_enabled";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid home location: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("stored home location is unreadable: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

/// On-disk form of the home geofence
#[derive(Debug, Serialize, Deserialize)]
struct HomeRecord {
    latitude: f64,
    longitude: f64,
    radius: f64,
}

impl From<&HomeGeofence> for HomeRecord {
    fn from(fence: &HomeGeofence) -> Self {
        let center = fence.center();
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius: fence.radius_meters(),
        }
    }
}

impl TryFrom<HomeRecord> for HomeGeofence {
    type Error = ValidationError;

    fn try_from(record: HomeRecord) -> Result<Self, Self::Error> {
        HomeGeofence::new(GeoPoint::new(record.latitude, record.longitude)?, record.radius)
    }
}

/// Reads and writes go straight to the collaborator on every call; nothing
/// is cached here.
#[derive(Debug)]
pub struct HomeStore<S> {
    storage: S,
}

impl<S: KeyValueStore> HomeStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validate and overwrite the home geofence. On validation failure the
    /// stored value is left untouched.
    pub fn set_home(&mut self, point: GeoPoint, radius_meters: f64) -> Result<(), StoreError> {
        let fence = HomeGeofence::new(point, radius_meters)?;
        let data = serde_json::to_string(&HomeRecord::from(&fence))
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        self.storage
            .set(HOME_LOCATION_KEY, &data)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        info!(
            "Home location saved: ({:.6}, {:.6}) radius {}m",
            point.latitude, point.longitude, radius_meters
        );
        Ok(())
    }

    pub fn get_home(&self) -> Result<Option<HomeGeofence>, StoreError> {
        let data = match self.storage.get(HOME_LOCATION_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return Ok(None),
            Err(e) => {
                error!("Error getting home location: {e}");
                return Err(StoreError::Storage(e.to_string()));
            }
        };

        let record: HomeRecord =
            serde_json::from_str(&data).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let fence = HomeGeofence::try_from(record).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Some(fence))
    }

    pub fn clear_home(&mut self) -> Result<(), StoreError> {
        self.storage
            .remove(HOME_LOCATION_KEY)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    pub fn set_auto_unlock_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        let value = if enabled { "true" } else { "false" };
        self.storage
            .set(AUTO_UNLOCK_ENABLED_KEY, value)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        info!("Auto-unlock setting saved: {enabled}");
        Ok(())
    }

    /// Fails open to `false`: an unreadable flag means no auto-unlock.
    pub fn is_auto_unlock_enabled(&self) -> bool {
        match self.storage.get(AUTO_UNLOCK_ENABLED_KEY) {
            Ok(Some(value)) => serde_json::from_str::<bool>(&value).unwrap_or_else(|e| {
                warn!("Ignoring unreadable auto-unlock setting {value:?}: {e}");
                false
            }),
            Ok(None) => false,
            Err(e) => {
                warn!("Error getting auto-unlock setting: {e}");
                false
            }
        }
    }

    /// `false` when no home is set
    pub fn is_within_home_radius(&self, point: &GeoPoint) -> Result<bool, StoreError> {
        Ok(self.get_home()?.is_some_and(|fence| fence.contains(point)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    /// Store whose every operation fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        type Error = String;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err("disk unavailable".to_string())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err("disk unavailable".to_string())
        }

        fn remove(&mut self, _key: &str) -> Result<(), Self::Error> {
            Err("disk unavailable".to_string())
        }
    }

    fn home() -> GeoPoint {
        GeoPoint::new(37.0, -122.0).unwrap()
    }

    #[test]
    fn get_home_unset_is_none() {
        let store = HomeStore::new(MemoryStore::new());
        assert!(store.get_home().unwrap().is_none());
    }

    #[test]
    fn set_then_get_home() {
        let mut store = HomeStore::new(MemoryStore::new());
        store.set_home(home(), 100.0).unwrap();

        let fence = store.get_home().unwrap().unwrap();
        assert_eq!(fence.center(), home());
        assert_eq!(fence.radius_meters(), 100.0);
    }

    #[test]
    fn negative_radius_rejected_and_previous_kept() {
        let mut store = HomeStore::new(MemoryStore::new());
        store.set_home(home(), 100.0).unwrap();

        let err = store.set_home(GeoPoint::new(10.0, 10.0).unwrap(), -5.0).unwrap_err();
        assert!(err.is_validation());

        let fence = store.get_home().unwrap().unwrap();
        assert_eq!(fence.center(), home());
        assert_eq!(fence.radius_meters(), 100.0);
    }

    #[test]
    fn out_of_range_point_rejected() {
        let mut store = HomeStore::new(MemoryStore::new());
        let bad = GeoPoint { latitude: 91.0, longitude: 0.0 };
        assert!(store.set_home(bad, 100.0).unwrap_err().is_validation());
        assert!(store.get_home().unwrap().is_none());
    }

    #[test]
    fn record_uses_documented_fields() {
        let mut store = HomeStore::new(MemoryStore::new());
        store.set_home(home(), 250.0).unwrap();

        let raw = store.storage().get(HOME_LOCATION_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["latitude"], 37.0);
        assert_eq!(json["longitude"], -122.0);
        assert_eq!(json["radius"], 250.0);
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let mut mem = MemoryStore::new();
        mem.set(HOME_LOCATION_KEY, "{not json").unwrap();
        let store = HomeStore::new(mem);
        assert!(matches!(store.get_home(), Err(StoreError::Corrupt(_))));

        let mut mem = MemoryStore::new();
        mem.set(HOME_LOCATION_KEY, r#"{"latitude":1,"longitude":2,"radius":0}"#).unwrap();
        let store = HomeStore::new(mem);
        assert!(matches!(store.get_home(), Err(StoreError::Corrupt(_))));

        let mut mem = MemoryStore::new();
        mem.set(HOME_LOCATION_KEY, r#"{"latitude":123.0,"longitude":2,"radius":50}"#).unwrap();
        let store = HomeStore::new(mem);
        assert!(matches!(store.get_home(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn clear_home_removes_record() {
        let mut store = HomeStore::new(MemoryStore::new());
        store.set_home(home(), 100.0).unwrap();
        store.clear_home().unwrap();
        assert!(store.get_home().unwrap().is_none());
    }

    #[test]
    fn auto_unlock_defaults_to_false() {
        let mut store = HomeStore::new(MemoryStore::new());
        assert!(!store.is_auto_unlock_enabled());

        store.set_auto_unlock_enabled(true).unwrap();
        assert!(store.is_auto_unlock_enabled());

        store.set_auto_unlock_enabled(false).unwrap();
        assert!(!store.is_auto_unlock_enabled());
    }

    #[test]
    fn auto_unlock_garbage_fails_open() {
        let mut mem = MemoryStore::new();
        mem.set(AUTO_UNLOCK_ENABLED_KEY, "maybe").unwrap();
        assert!(!HomeStore::new(mem).is_auto_unlock_enabled());
    }

    #[test]
    fn broken_storage() {
        let mut store = HomeStore::new(BrokenStore);
        assert!(!store.is_auto_unlock_enabled());
        assert!(matches!(store.get_home(), Err(StoreError::Storage(_))));
        assert!(matches!(store.set_home(home(), 100.0), Err(StoreError::Storage(_))));
        assert!(matches!(store.set_auto_unlock_enabled(true), Err(StoreError::Storage(_))));
        // validation runs before any write
        assert!(store.set_home(home(), -1.0).unwrap_err().is_validation());
    }

    #[test]
    fn within_home_radius() {
        let mut store = HomeStore::new(MemoryStore::new());
        let near = GeoPoint::new(37.0005, -122.0).unwrap();
        assert!(!store.is_within_home_radius(&near).unwrap());

        store.set_home(home(), 100.0).unwrap();
        assert!(store.is_within_home_radius(&near).unwrap());
        assert!(!store.is_within_home_radius(&GeoPoint::new(38.0, -122.0).unwrap()).unwrap());
    }
}
