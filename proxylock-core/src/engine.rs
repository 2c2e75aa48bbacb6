//! Proximity decision engine
//!
//! Turns position samples into LOCK/UNLOCK transitions. The decision is a pure
//! function of the sample, the geofence and the previous state; only a change
//! of the near-home boolean produces a signal.

use proxylock_proto::BroadcastSignal;

use crate::geo::{GeoPoint, HomeGeofence};

/// Most recently emitted signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastSignal {
    #[default]
    None,
    Lock,
    Unlock,
}

impl From<BroadcastSignal> for LastSignal {
    fn from(signal: BroadcastSignal) -> Self {
        match signal {
            BroadcastSignal::Lock => LastSignal::Lock,
            BroadcastSignal::Unlock => LastSignal::Unlock,
        }
    }
}

/// Transient engine state. `Default` is the process-start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProximityState {
    pub is_near_home: bool,
    pub last_signal: LastSignal,
}

/// Whether `sample` is inside `geofence`. No geofence or a malformed sample
/// resolves to "not near home".
pub fn classify(sample: &GeoPoint, geofence: Option<&HomeGeofence>) -> bool {
    match geofence {
        Some(fence) if sample.is_valid() => fence.contains(sample),
        _ => false,
    }
}

/// One evaluation step. Returns the next state and the signal to emit, if the
/// near-home boolean flipped.
pub fn evaluate(
    sample: GeoPoint,
    geofence: Option<&HomeGeofence>,
    state: ProximityState,
) -> (ProximityState, Option<BroadcastSignal>) {
    let within = classify(&sample, geofence);

    if within == state.is_near_home {
        return (state, None);
    }

    let signal = if within {
        BroadcastSignal::Unlock
    } else {
        BroadcastSignal::Lock
    };

    (
        ProximityState {
            is_near_home: within,
            last_signal: signal.into(),
        },
        Some(signal),
    )
}

/// Owns a `ProximityState` and feeds it through `evaluate`
#[derive(Debug, Default)]
pub struct ProximityEngine {
    state: ProximityState,
}

impl ProximityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProximityState {
        self.state
    }

    pub fn update(
        &mut self,
        sample: GeoPoint,
        geofence: Option<&HomeGeofence>,
    ) -> Option<BroadcastSignal> {
        let (state, signal) = evaluate(sample, geofence, self.state);
        self.state = state;
        signal
    }

    /// Back to the process-start state
    pub fn reset(&mut self) {
        self.state = ProximityState::default();
    }
}
