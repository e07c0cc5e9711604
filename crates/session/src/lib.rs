//! Session crate for YourSpace artist discovery.
//!
//! Wires a collaborator backend (the function endpoints or an offline
//! catalog) into a `DiscoveryStack` and an `AnalyticsAggregator`.

pub mod remote;
pub mod session;

pub use remote::RemoteBackend;
pub use session::{DiscoverySession, SessionOptions};
