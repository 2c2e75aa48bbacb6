//! BLE client for ProxyLock locks
//!
//! Provides functions to scan for locks and to write or read the signal
//! characteristic, plus an `Advertiser` that keeps one lock connection open.

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use log::*;
use std::time::Duration;
use uuid::Uuid;

use proxylock_core::Advertiser;
use proxylock_proto::BroadcastSignal;
use proxylock_proto::ble::is_proxylock_name;

/// 4fafc201-1fb5-459e-8fcc-c5c9c331914b
pub const SERVICE: Uuid = Uuid::from_u128(0x4fafc201_1fb5_459e_8fcc_c5c9c331914b);

/// beb5483e-36e1-4688-b7f5-ea07361b26a8
pub const SIGNAL: Uuid = Uuid::from_u128(0xbeb5483e_36e1_4688_b7f5_ea07361b26a8);

pub const DEFAULT_SCAN_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum BleError {
    #[error("no Bluetooth adapter found")]
    NoAdapter,
    #[error("no ProxyLock device found")]
    NotFound,
    #[error("signal characteristic not found on {0}")]
    CharacteristicMissing(String),
    #[error("lock reported an unknown signal value: {0}")]
    BadSignal(#[from] std::io::Error),
    #[error("bluetooth: {0}")]
    Btleplug(#[from] btleplug::Error),
}

/// A discovered BLE device
#[derive(Debug, Clone)]
pub struct LockDevice {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
    pub is_proxylock: bool,
}

/// Get the default Bluetooth adapter
pub async fn get_adapter() -> Result<Adapter, BleError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters.into_iter().next().ok_or(BleError::NoAdapter)
}

/// Scan for BLE devices
///
/// Returns every discovered device. ProxyLock locks have `is_proxylock = true`.
pub async fn scan(duration_secs: u64) -> Result<Vec<LockDevice>, BleError> {
    let adapter = get_adapter().await?;

    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(Duration::from_secs(duration_secs)).await;

    let peripherals = adapter.peripherals().await?;
    let mut devices = Vec::new();

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_else(|| "Unknown".to_string());
            let address = peripheral.address().to_string();
            let is_proxylock = is_proxylock_name(&name) || props.services.contains(&SERVICE);

            devices.push(LockDevice { name, address, rssi: props.rssi, is_proxylock });
        }
    }

    adapter.stop_scan().await?;
    Ok(devices)
}

/// Find a lock by name/address pattern, or any lock exposing the ProxyLock service
pub async fn find_lock(target: Option<&str>, duration_secs: u64) -> Result<Peripheral, BleError> {
    let adapter = get_adapter().await?;

    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(Duration::from_secs(duration_secs)).await;

    let peripherals = adapter.peripherals().await?;

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_default();
            let addr = peripheral.address().to_string();

            let matches = match target {
                Some(t) => name.contains(t) || addr.contains(t),
                None => is_proxylock_name(&name) || props.services.contains(&SERVICE),
            };

            if matches {
                adapter.stop_scan().await?;
                debug!("Found lock {name} ({addr})");
                return Ok(peripheral);
            }
        }
    }

    adapter.stop_scan().await?;
    Err(BleError::NotFound)
}

async fn signal_characteristic(device: &Peripheral) -> Result<Characteristic, BleError> {
    if !device.is_connected().await? {
        device.connect().await?;
    }
    device.discover_services().await?;

    device
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == SIGNAL)
        .ok_or_else(|| BleError::CharacteristicMissing(device.address().to_string()))
}

/// Connect to a lock, write `signal`, disconnect
pub async fn send_signal(target: Option<&str>, signal: BroadcastSignal) -> Result<(), BleError> {
    let device = find_lock(target, DEFAULT_SCAN_SECS).await?;
    let characteristic = signal_characteristic(&device).await?;

    device.write(&characteristic, signal.as_bytes(), WriteType::WithResponse).await?;
    info!("Sent {signal} to {}", device.address());

    let _ = device.disconnect().await;
    Ok(())
}

/// Connect to a lock and read back the current signal value
pub async fn read_signal(target: Option<&str>) -> Result<BroadcastSignal, BleError> {
    let device = find_lock(target, DEFAULT_SCAN_SECS).await?;
    let characteristic = signal_characteristic(&device).await?;

    let value = device.read(&characteristic).await;
    let _ = device.disconnect().await;

    Ok(BroadcastSignal::from_bytes(&value?)?)
}

/// `Advertiser` that delivers each signal by writing it to the lock's
/// signal characteristic. The connection is kept between signals and
/// re-established on the next signal after a failure.
pub struct GattAdvertiser {
    target: Option<String>,
    scan_secs: u64,
    connected: Option<(Peripheral, Characteristic)>,
}

impl GattAdvertiser {
    pub fn new(target: Option<String>) -> Self {
        Self { target, scan_secs: DEFAULT_SCAN_SECS, connected: None }
    }

    pub fn with_scan_secs(mut self, scan_secs: u64) -> Self {
        self.scan_secs = scan_secs;
        self
    }

    async fn connection(&mut self) -> Result<(Peripheral, Characteristic), BleError> {
        if let Some((device, characteristic)) = &self.connected {
            if device.is_connected().await.unwrap_or(false) {
                return Ok((device.clone(), characteristic.clone()));
            }
        }

        let device = find_lock(self.target.as_deref(), self.scan_secs).await?;
        let characteristic = signal_characteristic(&device).await?;
        self.connected = Some((device.clone(), characteristic.clone()));
        Ok((device, characteristic))
    }
}

#[async_trait::async_trait]
impl Advertiser for GattAdvertiser {
    type Error = BleError;

    async fn advertise(&mut self, signal: BroadcastSignal) -> Result<(), Self::Error> {
        let (device, characteristic) = self.connection().await?;

        if let Err(e) = device.write(&characteristic, signal.as_bytes(), WriteType::WithResponse).await {
            self.connected = None;
            return Err(e.into());
        }

        info!("Advertised {signal} to {}", device.address());
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        if let Some((device, _)) = self.connected.take() {
            device.disconnect().await?;
        }
        Ok(())
    }
}
