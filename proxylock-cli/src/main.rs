//! ProxyLock - phone-side proxy key for a BLE door lock
//!
//! Usage:
//!   PROXYLOCK_HOME=/tmp/proxylock cargo run -p proxylock -- <command>
//!
//! Settings:
//!   home set --lat LAT --lon LON [--radius M]
//!   home show | home clear
//!   auto-unlock on | off | status
//!   ip set ADDR | ip show | ip clear
//!
//! Proximity:
//!   evaluate --lat LAT --lon LON   - One-shot decision from the start state
//!   monitor [--dry-run] [--device NAME]
//!                                  - Read `lat,lon[,accuracy]` lines from stdin
//!
//! BLE:
//!   scan [--duration SECS]
//!   lock [--device NAME] | unlock [--device NAME] | status [--device NAME]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use proxylock_ble::{GattAdvertiser, ble};
use proxylock_core::{Advertiser, BroadcastSignal, GeoPoint, evaluate, haversine_distance};
use proxylock_node::{IpFile, LogAdvertiser, Monitor, PositionSample, ProximityState, open_store, parse_sample};

/// Auto-unlock distance used when none is given
const DEFAULT_RADIUS_METERS: f64 = 100.0;

#[derive(Parser)]
#[command(name = "proxylock")]
#[command(about = "Phone-side proxy key for a BLE door lock")]
struct Cli {
    /// Settings directory (default: $PROXYLOCK_HOME or ~/.proxylock)
    #[arg(long = "home-dir", global = true)]
    home_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Home geofence
    Home {
        #[command(subcommand)]
        action: HomeCommands,
    },
    /// Auto-unlock when arriving home
    AutoUnlock {
        #[command(subcommand)]
        action: ToggleCommands,
    },
    /// Lock IP address file
    Ip {
        #[command(subcommand)]
        action: IpCommands,
    },
    /// Evaluate a single position against the home geofence
    Evaluate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Follow positions from stdin and signal the lock on every transition
    Monitor {
        /// Log signals instead of sending them over BLE
        #[arg(long)]
        dry_run: bool,
        /// Lock name or address to connect to
        #[arg(short, long)]
        device: Option<String>,
        /// Scan duration in seconds when looking for the lock
        #[arg(long, default_value = "5")]
        scan_secs: u64,
    },
    /// Scan for locks
    Scan {
        /// Scan duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Send LOCK to a lock
    Lock {
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Send UNLOCK to a lock
    Unlock {
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Read the signal currently held by a lock
    Status {
        #[arg(short, long)]
        device: Option<String>,
    },
}

#[derive(Subcommand)]
enum HomeCommands {
    /// Set the home geofence
    Set {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Radius in meters
        #[arg(long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: f64,
    },
    /// Show the home geofence
    Show,
    /// Remove the home geofence
    Clear,
}

#[derive(Subcommand)]
enum ToggleCommands {
    On,
    Off,
    Status,
}

#[derive(Subcommand)]
enum IpCommands {
    /// Save the lock IP address
    Set { addr: String },
    Show,
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let home = proxylock_node::proxylock_home(cli.home_dir)?;

    match cli.command {
        Commands::Home { action } => run_home(&home, action)?,
        Commands::AutoUnlock { action } => run_auto_unlock(&home, action)?,
        Commands::Ip { action } => run_ip(&home, action)?,
        Commands::Evaluate { lat, lon } => run_evaluate(&home, lat, lon)?,
        Commands::Monitor { dry_run, device, scan_secs } => {
            if dry_run {
                run_monitor(&home, LogAdvertiser::new()).await?;
            } else {
                run_monitor(&home, GattAdvertiser::new(device).with_scan_secs(scan_secs)).await?;
            }
        }
        Commands::Scan { duration } => {
            println!("Scanning for locks ({} seconds)...", duration);
            let devices = ble::scan(duration).await?;
            println!("\nFound {} devices:", devices.len());
            for device in devices {
                let rssi = device.rssi.map(|r| format!("{} dBm", r)).unwrap_or_else(|| "N/A".to_string());
                let marker = if device.is_proxylock { " [PROXYLOCK]" } else { "" };
                println!("  {} ({}) RSSI: {}{}", device.name, device.address, rssi, marker);
            }
        }
        Commands::Lock { device } => {
            ble::send_signal(device.as_deref(), BroadcastSignal::Lock).await?;
            println!("LOCK sent.");
        }
        Commands::Unlock { device } => {
            ble::send_signal(device.as_deref(), BroadcastSignal::Unlock).await?;
            println!("UNLOCK sent.");
        }
        Commands::Status { device } => {
            let signal = ble::read_signal(device.as_deref()).await?;
            println!("Lock holds: {}", signal);
        }
    }

    Ok(())
}

fn run_home(home: &Path, action: HomeCommands) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(home);

    match action {
        HomeCommands::Set { lat, lon, radius } => {
            let point = GeoPoint { latitude: lat, longitude: lon };
            store.set_home(point, radius)?;
            println!("Home set to ({:.6}, {:.6}), radius {} m", lat, lon, radius);
        }
        HomeCommands::Show => match store.get_home()? {
            Some(fence) => {
                let center = fence.center();
                println!("Latitude:  {:.6}", center.latitude);
                println!("Longitude: {:.6}", center.longitude);
                println!("Radius:    {} m", fence.radius_meters());
            }
            None => println!("No home location set"),
        },
        HomeCommands::Clear => {
            store.clear_home()?;
            println!("Home location cleared");
        }
    }

    Ok(())
}

fn run_auto_unlock(home: &Path, action: ToggleCommands) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(home);

    match action {
        ToggleCommands::On => store.set_auto_unlock_enabled(true)?,
        ToggleCommands::Off => store.set_auto_unlock_enabled(false)?,
        ToggleCommands::Status => {}
    }

    let enabled = store.is_auto_unlock_enabled();
    println!("Auto-unlock: {}", if enabled { "on" } else { "off" });
    Ok(())
}

fn run_ip(home: &Path, action: IpCommands) -> Result<(), Box<dyn std::error::Error>> {
    let file = IpFile::in_home(home);

    match action {
        IpCommands::Set { addr } => {
            let addr = file.write(&addr)?;
            println!("Lock IP set to {}", addr);
        }
        IpCommands::Show => match file.read()? {
            Some(addr) => println!("{}", addr),
            None => println!("No lock IP set"),
        },
        IpCommands::Clear => {
            file.delete()?;
            println!("Lock IP cleared");
        }
    }

    Ok(())
}

fn run_evaluate(home: &Path, lat: f64, lon: f64) -> Result<(), Box<dyn std::error::Error>> {
    let sample = GeoPoint::new(lat, lon)?;
    let fence = open_store(home).get_home()?;

    match &fence {
        Some(fence) => {
            let distance = haversine_distance(&fence.center(), &sample);
            println!("Distance to home: {:.1} m (radius {} m)", distance, fence.radius_meters());
        }
        None => println!("No home location set"),
    }

    let (state, signal) = evaluate(sample, fence.as_ref(), ProximityState::default());
    println!("Near home: {}", state.is_near_home);
    match signal {
        Some(signal) => println!("Signal: {}", signal),
        None => println!("Signal: none"),
    }

    Ok(())
}

async fn run_monitor<A: Advertiser>(home: &Path, advertiser: A) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(home);
    if !store.is_auto_unlock_enabled() {
        println!("Auto-unlock is off; samples will be ignored until it is turned on.");
    }
    if store.get_home()?.is_none() {
        println!("No home location set; the lock will stay locked.");
    }
    log::debug!("Settings file: {}", store.storage().path().display());

    let mut monitor = Monitor::new(store, advertiser);
    monitor.start().await?;

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(forward_samples(tokio::io::BufReader::new(tokio::io::stdin()), tx));

    println!("Waiting for positions on stdin (lat,lon[,accuracy])...");
    let monitor = monitor.run(rx).await;
    println!("Final state: near home = {}", monitor.state().is_near_home);

    Ok(())
}

/// Parse `lat,lon[,accuracy]` lines and send them to the monitor. Blank lines,
/// `#` comments, unparsable lines and lines that are not UTF-8 are skipped.
async fn forward_samples<R: AsyncBufRead + Unpin>(reader: R, tx: mpsc::Sender<PositionSample>) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() || line.starts_with('#') => continue,
            Ok(Some(line)) => match parse_sample(&line) {
                Ok(sample) => {
                    if tx.send(sample).await.is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("Skipping {line:?}: {e}"),
            },
            Ok(None) => break,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                log::warn!("Skipping unreadable input line: {e}");
            }
            Err(e) => {
                log::error!("Error reading stdin: {e}");
                break;
            }
        }
    }
}
