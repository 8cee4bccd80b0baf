//! Provider implementations.
//!
//! Only simulated providers live here; real transport-level delivery is out
//! of scope for this service and adapters for it would slot in through the
//! same [`Provider`](crate::Provider) trait.

mod mock;

pub use mock::{MockProvider, ProviderConfig, StaticProvider};
