use serde_json::json;
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, FirmwareUpdate};

/// Firmware and power control.
pub struct Machine<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn machine(&self) -> Machine<'_> {
        Machine { controller: self }
    }
}

impl Machine<'_> {
    /// Firmware update state, refreshed first when the device can check.
    ///
    /// Issues `POST machine/update/check` and then `GET machine/update`.
    /// An unsupported check (generation-1 hardware, or a device that
    /// reports the call as unimplemented) is skipped; any other failure
    /// is returned.
    pub async fn firmware_update_status(&self) -> Result<FirmwareUpdate, Error> {
        match self.check_firmware_update().await {
            Ok(_) => {}
            Err(e) if e.is_unsupported() => {
                debug!("update check unsupported, reading cached status");
            }
            Err(e) => return Err(e),
        }
        self.controller.get("machine/update").await
    }

    /// Ask the device to look for new firmware. Not available on
    /// generation-1 hardware.
    ///
    /// `POST machine/update/check`
    pub async fn check_firmware_update(&self) -> Result<Ack, Error> {
        self.controller.ensure_supported("machine/update/check")?;
        debug!("checking for firmware update");
        self.controller
            .post("machine/update/check", json!({}))
            .await
    }

    /// Install pending firmware.
    ///
    /// `POST machine/update`
    pub async fn update_firmware(&self) -> Result<Ack, Error> {
        debug!("starting firmware update");
        self.controller.post("machine/update", json!({})).await
    }

    /// `POST machine/reboot`
    pub async fn reboot(&self) -> Result<Ack, Error> {
        debug!("rebooting controller");
        self.controller.post("machine/reboot", json!({})).await
    }
}
