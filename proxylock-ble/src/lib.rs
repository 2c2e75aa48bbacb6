//! ProxyLock BLE
//!
//! btleplug-based client that delivers LOCK/UNLOCK signals to a lock.
//!
//! # Example
//!
//! ```ignore
//! use proxylock_ble::ble;
//! use proxylock_proto::BroadcastSignal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Scan for locks
//!     for device in ble::scan(5).await? {
//!         println!("{} ({})", device.name, device.address);
//!     }
//!
//!     // Unlock the first lock found
//!     ble::send_signal(None, BroadcastSignal::Unlock).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod ble;

pub use ble::{BleError, GattAdvertiser, LockDevice};
