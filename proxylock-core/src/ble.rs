//! BLE advertising collaborator trait
//!
//! Protocol constants (UUIDs, signal bytes) are in proxylock_proto.

pub use proxylock_proto::BroadcastSignal;

/// Trait for whatever puts a `BroadcastSignal` on the air
///
/// Platform crates implement this with their BLE stack. Permission prompts and
/// adapter power-on are preconditions the caller satisfies first.
#[async_trait::async_trait]
pub trait Advertiser: Send {
    /// Error type for BLE operations
    type Error: std::fmt::Display + Send;

    /// Replace whatever is currently advertised with `signal`
    async fn advertise(&mut self, signal: BroadcastSignal) -> Result<(), Self::Error>;

    /// Stop advertising
    async fn stop(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
