//! BLE GATT Service Constants for ProxyLock
//!
//! The lock firmware looks for this service and reads the signal
//! characteristic to decide between locking and unlocking.

/// BLE Service UUID
pub const SERVICE_UUID: &str = "4fafc201-1fb5-459e-8fcc-c5c9c331914b";

/// Signal Characteristic UUID (read/write), value is `LOCK_BYTES` or `UNLOCK_BYTES`
pub const SIGNAL_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26a8";

/// Advertised local name of the phone side, and name prefix of locks
pub const DEVICE_NAME: &str = "ProxyLock";

/// Match "ProxyLock-xxx" or "nimble [ProxyLock-xxx]" style names
pub fn is_proxylock_name(name: &str) -> bool {
    name.starts_with(DEVICE_NAME) || name.contains(&format!("[{DEVICE_NAME}"))
}
