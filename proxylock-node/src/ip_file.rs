//! Lock IP address, kept as a plain text file in PROXYLOCK_HOME

use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IpFileError {
    #[error("ip file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("not an IP address: {0:?}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct IpFile {
    path: PathBuf,
}

impl IpFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(crate::home::IP_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, ip: &str) -> Result<IpAddr, IpFileError> {
        let ip = ip.trim();
        let addr: IpAddr = ip.parse().map_err(|_| IpFileError::Invalid(ip.to_string()))?;
        fs::write(&self.path, addr.to_string())?;
        log::info!("Wrote lock IP {addr} to {}", self.path.display());
        Ok(addr)
    }

    /// `None` when the file does not exist
    pub fn read(&self) -> Result<Option<IpAddr>, IpFileError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data = data.trim();
        data.parse()
            .map(Some)
            .map_err(|_| IpFileError::Invalid(data.to_string()))
    }

    /// Deleting a missing file is a no-op
    pub fn delete(&self) -> Result<(), IpFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Deleted {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
