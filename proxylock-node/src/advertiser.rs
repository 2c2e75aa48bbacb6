use std::convert::Infallible;

use proxylock_core::{Advertiser, BroadcastSignal};

/// Dry-run advertiser: logs the signal instead of putting it on the air
#[derive(Debug, Default)]
pub struct LogAdvertiser {
    current: Option<BroadcastSignal>,
}

impl LogAdvertiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// What would currently be advertised
    pub fn current(&self) -> Option<BroadcastSignal> {
        self.current
    }
}

#[async_trait::async_trait]
impl Advertiser for LogAdvertiser {
    type Error = Infallible;

    async fn advertise(&mut self, signal: BroadcastSignal) -> Result<(), Self::Error> {
        log::info!("[dry-run] advertising {signal} ({})", signal.to_hex());
        self.current = Some(signal);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        log::info!("[dry-run] advertising stopped");
        self.current = None;
        Ok(())
    }
}
