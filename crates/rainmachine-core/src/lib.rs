// rainmachine-core: Controller registry between rainmachine-api and consumers (CLI).

pub mod client;
pub mod config;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, LoadOutcome, RemoteLoadSummary};
pub use config::{ClientConfig, ConnectTarget};

// Re-export the API surface callers need alongside the registry.
pub use rainmachine_api::{CloudEndpoints, Controller, Error, ErrorKind, LocalTarget};
