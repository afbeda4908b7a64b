use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;

#[derive(Deserialize)]
struct LogEnvelope {
    #[serde(default)]
    log: String,
}

/// Device health and logs.
pub struct Diagnostics<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics { controller: self }
    }
}

impl Diagnostics<'_> {
    /// Current diagnostic state (uptime, memory, cloud/internet status, ...).
    ///
    /// `GET diag`
    ///
    /// Returns loosely-typed JSON because the field set varies by
    /// hardware generation and firmware.
    pub async fn current(&self) -> Result<Value, Error> {
        debug!("fetching diagnostics");
        self.controller.get("diag").await
    }

    /// The device's system log as one text blob.
    ///
    /// `GET diag/log`
    pub async fn log(&self) -> Result<String, Error> {
        debug!("fetching diagnostic log");
        let envelope: LogEnvelope = self.controller.get("diag/log").await?;
        Ok(envelope.log)
    }
}
