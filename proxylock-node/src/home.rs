//! PROXYLOCK_HOME resolution

use std::fs;
use std::io;
use std::path::PathBuf;

pub const HOME_ENV: &str = "PROXYLOCK_HOME";
pub const SETTINGS_FILE: &str = "settings.json";
pub const IP_FILE: &str = "ip.txt";

/// Get the ProxyLock home directory, creating it if needed
///
/// `explicit` wins, then `$PROXYLOCK_HOME`, then `~/.proxylock`.
pub fn proxylock_home(explicit: Option<PathBuf>) -> io::Result<PathBuf> {
    let home = match explicit {
        Some(path) => path,
        None => match std::env::var_os(HOME_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?
                .join(".proxylock"),
        },
    };

    if !home.exists() {
        fs::create_dir_all(&home)?;
        log::debug!("Created {}", home.display());
    }

    Ok(home)
}
