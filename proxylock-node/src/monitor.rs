//! Proximity monitor - feeds position samples through the engine and hands
//! the resulting signals to an advertiser

use log::*;
use tokio::sync::mpsc;

use proxylock_core::{
    Advertiser, BroadcastSignal, HomeStore, KeyValueStore, PositionSample, ProximityEngine,
    ProximityState, StoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to advertise {signal}: {message}")]
    Advertise {
        signal: BroadcastSignal,
        message: String,
    },
}

/// Owns the engine state, so samples are evaluated one at a time.
pub struct Monitor<S, A> {
    store: HomeStore<S>,
    advertiser: A,
    engine: ProximityEngine,
}

impl<S: KeyValueStore, A: Advertiser> Monitor<S, A> {
    pub fn new(store: HomeStore<S>, advertiser: A) -> Self {
        Self {
            store,
            advertiser,
            engine: ProximityEngine::new(),
        }
    }

    pub fn state(&self) -> ProximityState {
        self.engine.state()
    }

    pub fn store(&self) -> &HomeStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HomeStore<S> {
        &mut self.store
    }

    pub fn advertiser(&self) -> &A {
        &self.advertiser
    }

    /// Put LOCK on the air until the first position decides otherwise.
    /// Engine state is not touched.
    pub async fn start(&mut self) -> Result<(), MonitorError> {
        self.advertise(BroadcastSignal::Lock).await
    }

    /// Evaluate one sample. Returns the signal that was advertised, if any.
    ///
    /// With auto-unlock disabled the engine is not consulted at all.
    pub async fn handle_sample(
        &mut self,
        sample: PositionSample,
    ) -> Result<Option<BroadcastSignal>, MonitorError> {
        if !self.store.is_auto_unlock_enabled() {
            trace!("Auto-unlock disabled, ignoring sample {:?}", sample.point);
            return Ok(None);
        }

        let home = self.store.get_home()?;
        let Some(signal) = self.engine.update(sample.point, home.as_ref()) else {
            return Ok(None);
        };

        info!(
            "Near home: {} -> advertising {signal} (accuracy {:?}m)",
            self.engine.state().is_near_home,
            sample.accuracy_meters
        );
        self.advertise(signal).await?;
        Ok(Some(signal))
    }

    /// Consume samples until the sender side is dropped, then stop advertising.
    /// Per-sample errors are logged and the loop continues.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PositionSample>) -> Self {
        while let Some(sample) = rx.recv().await {
            if let Err(e) = self.handle_sample(sample).await {
                error!("Error handling position sample: {e}");
            }
        }

        info!("Position source closed");
        if let Err(e) = self.advertiser.stop().await {
            warn!("Error stopping advertising: {e}");
        }
        self
    }

    async fn advertise(&mut self, signal: BroadcastSignal) -> Result<(), MonitorError> {
        self.advertiser
            .advertise(signal)
            .await
            .map_err(|e| MonitorError::Advertise {
                signal,
                message: e.to_string(),
            })
    }
}
