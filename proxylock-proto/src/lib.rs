//! ProxyLock wire protocol - broadcast signals and their byte patterns
//!
//! The phone hands exactly one of two signals to the BLE layer. The lock
//! firmware only has to tell the two byte patterns apart.

pub mod ble;

use std::fmt;
use std::io;

/// "LK"
pub const LOCK_BYTES: [u8; 2] = [0x4C, 0x4B];
/// "UN"
pub const UNLOCK_BYTES: [u8; 2] = [0x55, 0x4E];

/// Signal broadcast to the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastSignal {
    Lock,
    Unlock,
}

impl BroadcastSignal {
    pub fn as_bytes(&self) -> &'static [u8; 2] {
        match self {
            BroadcastSignal::Lock => &LOCK_BYTES,
            BroadcastSignal::Unlock => &UNLOCK_BYTES,
        }
    }

    /// Parse a characteristic value. Anything other than the two exact
    /// patterns is rejected.
    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data == LOCK_BYTES {
            Ok(BroadcastSignal::Lock)
        } else if data == UNLOCK_BYTES {
            Ok(BroadcastSignal::Unlock)
        } else {
            Err(io::Error::new(io::ErrorKind::InvalidData, "unknown signal bytes"))
        }
    }

    /// Hex form used by peripheral stacks that take string characteristic values
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for BroadcastSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastSignal::Lock => f.write_str("LOCK"),
            BroadcastSignal::Unlock => f.write_str("UNLOCK"),
        }
    }
}
