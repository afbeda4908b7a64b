use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::date_segment;
use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, PastRun, QueuedRun, WaterLogDay};

#[derive(Deserialize)]
struct WaterLogEnvelope {
    #[serde(rename = "waterLog", default)]
    water_log: WaterLog,
}

#[derive(Deserialize, Default)]
struct WaterLog {
    #[serde(default)]
    days: Vec<WaterLogDay>,
}

#[derive(Deserialize)]
struct PastValuesEnvelope {
    #[serde(rename = "pastValues", default)]
    past_values: Vec<PastRun>,
}

#[derive(Deserialize)]
struct QueueEnvelope {
    #[serde(default)]
    queue: Vec<QueuedRun>,
}

/// Watering history, queue and global pause/stop.
pub struct Watering<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn watering(&self) -> Watering<'_> {
        Watering { controller: self }
    }
}

fn log_path(date: Option<NaiveDate>, days: u32, details: bool) -> String {
    let date = date_segment(date);
    if details {
        format!("watering/log/details/{date}/{days}")
    } else {
        format!("watering/log/{date}/{days}")
    }
}

impl Watering<'_> {
    /// Watering log for `days` days starting at `date` (today if `None`).
    ///
    /// `GET watering/log[/details]/{date}/{days}`
    pub async fn log(
        &self,
        date: Option<NaiveDate>,
        days: u32,
        details: bool,
    ) -> Result<Vec<WaterLogDay>, Error> {
        let path = log_path(date, days, details);
        debug!(%path, "fetching watering log");
        let envelope: WaterLogEnvelope = self.controller.get(&path).await?;
        Ok(envelope.water_log.days)
    }

    /// Past watering runs with the weather values used to compute them.
    ///
    /// `GET watering/past/{date}/{days}`
    pub async fn runs(&self, date: Option<NaiveDate>, days: u32) -> Result<Vec<PastRun>, Error> {
        let path = format!("watering/past/{}/{days}", date_segment(date));
        debug!(%path, "fetching past runs");
        let envelope: PastValuesEnvelope = self.controller.get(&path).await?;
        Ok(envelope.past_values)
    }

    /// `GET watering/queue`
    pub async fn queue(&self) -> Result<Vec<QueuedRun>, Error> {
        debug!("fetching watering queue");
        let envelope: QueueEnvelope = self.controller.get("watering/queue").await?;
        Ok(envelope.queue)
    }

    /// Pause all watering for `seconds`. Zero resumes.
    ///
    /// `POST watering/pauseall` with `{"duration": seconds}`
    pub async fn pause_all(&self, seconds: u32) -> Result<Ack, Error> {
        debug!(seconds, "pausing all watering");
        self.controller
            .post("watering/pauseall", json!({ "duration": seconds }))
            .await
    }

    pub async fn unpause_all(&self) -> Result<Ack, Error> {
        self.pause_all(0).await
    }

    /// `POST watering/stopall`
    pub async fn stop_all(&self) -> Result<Ack, Error> {
        debug!("stopping all watering");
        self.controller
            .post("watering/stopall", json!({ "all": true }))
            .await
    }

    /// Flow sensor readings. Not available on generation-1 hardware.
    ///
    /// `GET watering/flowmeter`
    pub async fn flowmeter(&self) -> Result<Value, Error> {
        self.controller.ensure_supported("watering/flowmeter")?;
        debug!("fetching flowmeter");
        self.controller.get("watering/flowmeter").await
    }
}
