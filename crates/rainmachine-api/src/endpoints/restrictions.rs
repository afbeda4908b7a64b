use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, CurrentRestrictions, HourlyRestriction, RainDelay};

/// Seconds per day, for converting rain delay days.
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Deserialize)]
struct HourlyEnvelope {
    #[serde(rename = "hourlyRestrictions", default)]
    hourly_restrictions: Vec<HourlyRestriction>,
}

/// Watering restrictions.
pub struct Restrictions<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn restrictions(&self) -> Restrictions<'_> {
        Restrictions { controller: self }
    }
}

impl RainDelay {
    /// Whole days left, rounded up; zero when no delay is active.
    pub fn days_remaining(&self) -> i64 {
        if self.delay_counter <= 0 {
            return 0;
        }
        let days = self.delay_counter / SECONDS_PER_DAY;
        if self.delay_counter % SECONDS_PER_DAY == 0 {
            days
        } else {
            days + 1
        }
    }
}

impl Restrictions<'_> {
    /// Restrictions in effect right now.
    ///
    /// `GET restrictions/currently`
    pub async fn current(&self) -> Result<CurrentRestrictions, Error> {
        debug!("fetching current restrictions");
        self.controller.get("restrictions/currently").await
    }

    /// Hourly restriction windows. Not available on generation-1 hardware.
    ///
    /// `GET restrictions/hourly`
    pub async fn hourly(&self) -> Result<Vec<HourlyRestriction>, Error> {
        self.controller.ensure_supported("restrictions/hourly")?;
        debug!("fetching hourly restrictions");
        let envelope: HourlyEnvelope = self.controller.get("restrictions/hourly").await?;
        Ok(envelope.hourly_restrictions)
    }

    /// `GET restrictions/raindelay`
    pub async fn raindelay(&self) -> Result<RainDelay, Error> {
        debug!("fetching rain delay");
        self.controller.get("restrictions/raindelay").await
    }

    /// Delay all watering for `days` days. Zero clears the delay.
    ///
    /// `POST restrictions/raindelay` with `{"rainDelay": days}`
    pub async fn set_raindelay(&self, days: u32) -> Result<Ack, Error> {
        debug!(days, "setting rain delay");
        self.controller
            .post("restrictions/raindelay", json!({ "rainDelay": days }))
            .await
    }

    /// Restrictions that apply to every program (freeze protection,
    /// hot days, restricted months/weekdays, ...).
    ///
    /// `GET restrictions/global`
    pub async fn universal(&self) -> Result<Value, Error> {
        debug!("fetching global restrictions");
        self.controller.get("restrictions/global").await
    }

    /// `POST restrictions/global` with a partial settings object.
    pub async fn set_universal(&self, payload: Value) -> Result<Ack, Error> {
        debug!("updating global restrictions");
        self.controller.post("restrictions/global", payload).await
    }
}
