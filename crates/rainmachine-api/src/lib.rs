// rainmachine-api: Async Rust client for RainMachine irrigation controllers (local + cloud relay)

pub mod auth;
pub mod cloud;
pub mod controller;
pub mod discovery;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{Backend, CloudEndpoints, LocalTarget};
pub use controller::{Controller, RequestOptions};
pub use discovery::{DiscoveredController, DiscoveryConfig, discover};
pub use error::{DiscoveryFailure, Error, ErrorKind};
pub use transport::{HttpSession, PendingRequest, Transport, TransportConfig};
