use serde_json::json;
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, DeviceName, ProvisionSettings, WifiSettings};

/// Device provisioning: name, network, system and location settings.
pub struct Provisioning<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn provisioning(&self) -> Provisioning<'_> {
        Provisioning { controller: self }
    }
}

impl Provisioning<'_> {
    /// `GET provision`
    pub async fn settings(&self) -> Result<ProvisionSettings, Error> {
        debug!("fetching provisioning settings");
        self.controller.get("provision").await
    }

    /// `GET provision/name`
    pub async fn device_name(&self) -> Result<String, Error> {
        debug!("fetching device name");
        let resp: DeviceName = self.controller.get("provision/name").await?;
        Ok(resp.name)
    }

    /// `POST provision/name` with `{"name": name}`
    pub async fn set_name(&self, name: &str) -> Result<Ack, Error> {
        debug!(name, "renaming device");
        self.controller
            .post("provision/name", json!({ "name": name }))
            .await
    }

    /// Network identity; the MAC address here keys the client registry.
    ///
    /// `GET provision/wifi`
    pub async fn wifi(&self) -> Result<WifiSettings, Error> {
        debug!("fetching wifi settings");
        self.controller.get("provision/wifi").await
    }
}
